/*!
Typed raw records. Untyped source items are checked here, at the
streaming boundary, so the rest of the crate never looks at loose maps.
 */

use serde_json::Value;

use crate::{
    source::{Sample, SourceItem},
    DatasetError, Result,
};

/// One image of a classification set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    /// The webdataset key, usually the original file stem.
    pub key: String,

    /// Encoded image bytes.
    pub jpeg: Vec<u8>,

    /// Ground truth class index when the archive carries one.
    pub label: Option<i64>,
}

impl ImageRecord {
    pub(crate) fn from_sample(dataset: &str, mut sample: Sample) -> Result<Self> {
        let jpeg = match sample.members.remove("jpeg") {
            Some(data) => data,
            None => sample.members.remove("jpg").ok_or_else(|| {
                DatasetError::malformed(
                    dataset,
                    format!(
                        "sample {:?} has no jpeg member, found {:?}",
                        sample.key,
                        sample.members.keys().collect::<Vec<_>>()
                    ),
                )
            })?,
        };

        let label = match sample.members.get("cls") {
            Some(raw) => Some(parse_label(raw).ok_or_else(|| {
                DatasetError::malformed(
                    dataset,
                    format!("sample {:?} has an unreadable class label", sample.key),
                )
            })?),
            None => None,
        };

        Ok(Self {
            key: sample.key,
            jpeg,
            label,
        })
    }
}

fn parse_label(raw: &[u8]) -> Option<i64> {
    std::str::from_utf8(raw).ok()?.trim().parse().ok()
}

/// A question about a context paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRecord {
    pub context: String,
    pub question: String,
}

impl QuestionRecord {
    pub fn new(context: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            question: question.into(),
        }
    }

    /// Read a flat row with `question` and `context` columns.
    pub(crate) fn from_row(dataset: &str, row: &Value) -> Result<Self> {
        Ok(Self {
            context: string_field(dataset, row, "context")?.to_owned(),
            question: string_field(dataset, row, "question")?.to_owned(),
        })
    }
}

pub(crate) fn string_field<'v>(dataset: &str, value: &'v Value, field: &str) -> Result<&'v str> {
    value
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| DatasetError::malformed(dataset, format!("missing string field {:?}", field)))
}

pub(crate) fn array_field<'v>(
    dataset: &str,
    value: &'v Value,
    field: &str,
) -> Result<&'v Vec<Value>> {
    value
        .get(field)
        .and_then(Value::as_array)
        .ok_or_else(|| DatasetError::malformed(dataset, format!("missing array field {:?}", field)))
}

/// A record of any supported dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawRecord {
    Image(ImageRecord),
    Question(QuestionRecord),
}

impl RawRecord {
    pub fn kind(&self) -> &'static str {
        match self {
            RawRecord::Image(_) => "image",
            RawRecord::Question(_) => "question",
        }
    }

    pub(crate) fn image(dataset: &str, item: SourceItem) -> Result<Self> {
        match item {
            SourceItem::Sample(sample) => ImageRecord::from_sample(dataset, sample).map(Self::Image),
            other => Err(DatasetError::malformed(
                dataset,
                format!("expected a webdataset sample, got a {}", other.kind()),
            )),
        }
    }

    pub(crate) fn question(dataset: &str, item: SourceItem) -> Result<Self> {
        match item {
            SourceItem::Row(row) => QuestionRecord::from_row(dataset, &row).map(Self::Question),
            other => Err(DatasetError::malformed(
                dataset,
                format!("expected a row, got a {}", other.kind()),
            )),
        }
    }
}

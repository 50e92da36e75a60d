/*!
SQuAD question answering validation sets.

Both flavours produce [`QuestionRecord`]s and share the same transform;
they only differ in where the data comes from. [`SquadV1_1`] reads the
raw dev document and flattens its nested articles, [`SquadHub`] streams
already flat rows from a hosted dataset.
 */

use serde_json::Value;

use super::{Dataset, Records};
use crate::{
    binding::{check_keys, InputBinding},
    preprocess::{Preprocessor, MAX_SEQUENCE_LENGTH},
    record::{array_field, string_field, QuestionRecord, RawRecord},
    source::{ItemStream, LoadRequest, SourceFormat, SourceItem},
    DatasetError, Result,
};

fn transform_question(
    dataset: &str,
    inputs: &[String],
    record: RawRecord,
    preprocess: Preprocessor<'_>,
) -> Result<InputBinding> {
    let record = match record {
        RawRecord::Question(record) => record,
        other => {
            return Err(DatasetError::ContractMismatch(format!(
                "{} can't transform a {} record",
                dataset,
                other.kind()
            )))
        }
    };

    let preprocess = match preprocess {
        Preprocessor::Text(f) => f,
        other => {
            return Err(DatasetError::ContractMismatch(format!(
                "{} needs a text preprocessor, got {}",
                dataset,
                other.kind()
            )))
        }
    };

    let binding = preprocess
        .preprocess(&record.question, &record.context, MAX_SEQUENCE_LENGTH)
        .map_err(DatasetError::Preprocess)?;

    check_keys(inputs, &binding)?;
    Ok(binding)
}

/// SQuAD v1.1 dev set, read from the original JSON document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquadV1_1 {
    url: String,
}

impl SquadV1_1 {
    pub const URL: &'static str =
        "https://raw.githubusercontent.com/rajpurkar/SQuAD-explorer/master/dataset/dev-v1.1.json";
    pub const NAME: &'static str = "squad-v1.1";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locator(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

impl Default for SquadV1_1 {
    fn default() -> Self {
        Self {
            url: Self::URL.to_owned(),
        }
    }
}

impl Dataset for SquadV1_1 {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn locator(&self) -> &str {
        &self.url
    }

    fn load_request(&self) -> LoadRequest {
        LoadRequest::new(SourceFormat::Json, &self.url, "val").with_field("data")
    }

    fn records(&self, items: ItemStream) -> Records {
        Box::new(FlattenArticles::new(Self::NAME, items))
    }

    fn transform(
        &self,
        inputs: &[String],
        record: RawRecord,
        preprocess: Preprocessor<'_>,
    ) -> Result<InputBinding> {
        transform_question(Self::NAME, inputs, record, preprocess)
    }
}

/// Collect the `(context, question)` pairs of one article, paragraphs
/// first and questions in order within each paragraph.
fn flatten_article(dataset: &str, article: &Value) -> Result<Vec<QuestionRecord>> {
    let mut records = vec![];

    for paragraph in array_field(dataset, article, "paragraphs")? {
        let context = string_field(dataset, paragraph, "context")?;

        for qa in array_field(dataset, paragraph, "qas")? {
            let question = string_field(dataset, qa, "question")?;
            records.push(QuestionRecord::new(context, question));
        }
    }

    Ok(records)
}

/// Lazily flattens streamed articles into one record per question.
struct FlattenArticles {
    dataset: &'static str,
    items: ItemStream,
    pending: std::vec::IntoIter<QuestionRecord>,
}

impl FlattenArticles {
    fn new(dataset: &'static str, items: ItemStream) -> Self {
        Self {
            dataset,
            items,
            pending: vec![].into_iter(),
        }
    }
}

impl Iterator for FlattenArticles {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.pending.next() {
                return Some(Ok(RawRecord::Question(record)));
            }

            let article = match self.items.next()? {
                Ok(SourceItem::Row(article)) => article,
                Ok(other) => {
                    return Some(Err(DatasetError::malformed(
                        self.dataset,
                        format!("expected an article row, got a {}", other.kind()),
                    )))
                }
                Err(e) => return Some(Err(DatasetError::Stream(e))),
            };

            match flatten_article(self.dataset, &article) {
                Ok(records) => self.pending = records.into_iter(),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// SQuAD from a dataset hub, addressed by its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquadHub {
    id: String,
}

impl SquadHub {
    pub const ID: &'static str = "squad";
    pub const NAME: &'static str = "squad-hf";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locator(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

impl Default for SquadHub {
    fn default() -> Self {
        Self {
            id: Self::ID.to_owned(),
        }
    }
}

impl Dataset for SquadHub {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn locator(&self) -> &str {
        &self.id
    }

    fn load_request(&self) -> LoadRequest {
        LoadRequest::new(SourceFormat::Hub, &self.id, "validation")
    }

    fn records(&self, items: ItemStream) -> Records {
        Box::new(items.map(|item| {
            let item = item.map_err(DatasetError::Stream)?;
            RawRecord::question(Self::NAME, item)
        }))
    }

    fn transform(
        &self,
        inputs: &[String],
        record: RawRecord,
        preprocess: Preprocessor<'_>,
    ) -> Result<InputBinding> {
        transform_question(Self::NAME, inputs, record, preprocess)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticSource;
    use serde_json::json;
    use tract_core::prelude::Tensor;

    fn article() -> Value {
        json!({
            "title": "Normans",
            "paragraphs": [
                {
                    "context": "The Normans were in Normandy.",
                    "qas": [
                        {"id": "1", "question": "In what country is Normandy?", "answers": []},
                        {"id": "2", "question": "Who was in Normandy?", "answers": []}
                    ]
                },
                {
                    "context": "Rollo was a Viking.",
                    "qas": [
                        {"id": "3", "question": "Who was Rollo?", "answers": []}
                    ]
                }
            ]
        })
    }

    fn tokenize(question: &str, context: &str, max_length: usize) -> anyhow::Result<InputBinding> {
        assert_eq!(max_length, MAX_SEQUENCE_LENGTH);
        let len = (question.len() + context.len()).min(max_length);

        let mut binding = InputBinding::new();
        binding.insert("input_ids".to_owned(), Tensor::zero::<i64>(&[1, len])?);
        binding.insert("attention_mask".to_owned(), Tensor::zero::<i64>(&[1, len])?);
        Ok(binding)
    }

    fn question() -> RawRecord {
        RawRecord::Question(QuestionRecord::new("Rollo was a Viking.", "Who was Rollo?"))
    }

    #[test]
    fn flatten_in_nesting_order() {
        let records = flatten_article("test", &article()).unwrap();
        assert_eq!(
            records,
            vec![
                QuestionRecord::new("The Normans were in Normandy.", "In what country is Normandy?"),
                QuestionRecord::new("The Normans were in Normandy.", "Who was in Normandy?"),
                QuestionRecord::new("Rollo was a Viking.", "Who was Rollo?"),
            ]
        );
    }

    #[test]
    fn flatten_across_articles() {
        let second = json!({
            "paragraphs": [{"context": "c", "qas": [{"question": "q"}]}]
        });
        let empty = json!({"paragraphs": []});
        let source = StaticSource::new(vec![
            SourceItem::Row(article()),
            SourceItem::Row(empty),
            SourceItem::Row(second),
        ]);

        let records: Vec<_> = SquadV1_1::new()
            .open(&source)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(records.len(), 4);
        assert_eq!(records[3], RawRecord::Question(QuestionRecord::new("c", "q")));
    }

    #[test]
    fn flatten_missing_paragraphs() {
        let source = StaticSource::new(vec![SourceItem::Row(json!({"title": "t"}))]);
        let mut stream = SquadV1_1::new().open(&source).unwrap();
        let err = stream.next_record().unwrap_err();
        assert!(matches!(err, DatasetError::MalformedRecord { .. }));
    }

    #[test]
    fn load_requests() {
        let request = SquadV1_1::new().load_request();
        assert_eq!(request.format, SourceFormat::Json);
        assert_eq!(request.field.as_deref(), Some("data"));
        assert_eq!(request.split, "val");

        let request = SquadHub::new().load_request();
        assert_eq!(request.format, SourceFormat::Hub);
        assert_eq!(request.location, "squad");
        assert_eq!(request.split, "validation");
        assert_eq!(request.field, None);
    }

    #[test]
    fn transform_keys_match() {
        let inputs = vec!["input_ids".to_owned(), "attention_mask".to_owned()];
        for dataset in [
            &SquadV1_1::new() as &dyn Dataset,
            &SquadHub::new() as &dyn Dataset,
        ] {
            let binding = dataset
                .transform(&inputs, question(), Preprocessor::Text(&tokenize))
                .unwrap();

            let keys: Vec<_> = binding.keys().cloned().collect();
            assert_eq!(keys, vec!["attention_mask", "input_ids"]);
        }
    }

    #[test]
    fn transform_keys_mismatch() {
        let inputs = vec!["input_ids".to_owned(), "token_type_ids".to_owned()];
        let err = SquadHub::new()
            .transform(&inputs, question(), Preprocessor::Text(&tokenize))
            .unwrap_err();

        assert!(matches!(err, DatasetError::ContractMismatch(_)));
        assert!(err.to_string().contains("token_type_ids"));
    }

    #[test]
    fn transform_with_image_preprocessor() {
        let image = |_: &[u8]| -> anyhow::Result<Tensor> { Ok(Tensor::zero::<f32>(&[1])?) };
        let err = SquadV1_1::new()
            .transform(&["input_ids".to_owned()], question(), Preprocessor::Image(&image))
            .unwrap_err();
        assert!(matches!(err, DatasetError::ContractMismatch(_)));
    }

    #[test]
    fn hub_rows() {
        let source = StaticSource::new(vec![
            SourceItem::Row(json!({"id": "a", "question": "q1", "context": "c1"})),
            SourceItem::Row(json!({"id": "b", "question": "q2", "context": "c2"})),
        ]);

        let records: Vec<_> = SquadHub::new()
            .open(&source)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(
            records,
            vec![
                RawRecord::Question(QuestionRecord::new("c1", "q1")),
                RawRecord::Question(QuestionRecord::new("c2", "q2")),
            ]
        );
    }
}

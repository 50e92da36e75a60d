/*!
The streaming source is the collaborator that turns a locator into a lazy
sequence of untyped items. Datasets describe what they want with a
[`LoadRequest`]; the source decides how to fetch and parse it.
 */

use std::collections::BTreeMap;

/// How the data behind a locator is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    /// A tar archive where files sharing a stem form one sample.
    WebDataset,

    /// A JSON document, optionally narrowed down to one top-level field.
    Json,

    /// A hosted dataset addressed by a short identifier.
    Hub,
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFormat::WebDataset => f.pad("webdataset"),
            SourceFormat::Json => f.pad("json"),
            SourceFormat::Hub => f.pad("hub"),
        }
    }
}

/// A request for a streamed split of a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub format: SourceFormat,

    /// Data file URL, local path or hosted identifier; passed verbatim.
    pub location: String,

    pub split: String,

    /// Top-level field holding the records of a JSON document.
    pub field: Option<String>,
}

impl LoadRequest {
    pub fn new(format: SourceFormat, location: impl Into<String>, split: impl Into<String>) -> Self {
        Self {
            format,
            location: location.into(),
            split: split.into(),
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

/// One webdataset sample: all archive members sharing a key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sample {
    pub key: String,

    /// Member payloads keyed by lowercased extension, e.g. `jpeg` or `cls`.
    pub members: BTreeMap<String, Vec<u8>>,
}

impl Sample {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            members: BTreeMap::new(),
        }
    }

    pub fn with_member(mut self, extension: &str, data: impl Into<Vec<u8>>) -> Self {
        self.members.insert(extension.to_lowercase(), data.into());
        self
    }
}

/// An untyped item as produced by a streaming source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceItem {
    Sample(Sample),
    Row(serde_json::Value),
}

impl SourceItem {
    pub fn kind(&self) -> &'static str {
        match self {
            SourceItem::Sample(_) => "sample",
            SourceItem::Row(_) => "row",
        }
    }
}

/// A lazy, single-pass sequence of items.
pub type ItemStream = Box<dyn Iterator<Item = anyhow::Result<SourceItem>> + Send>;

/// Opens streamed splits for a [`LoadRequest`].
pub trait StreamSource {
    /// Open a new stream. Every call starts from the first item.
    fn stream(&self, request: &LoadRequest) -> anyhow::Result<ItemStream>;
}

impl<F> StreamSource for F
where
    F: Fn(&LoadRequest) -> anyhow::Result<ItemStream>,
{
    fn stream(&self, request: &LoadRequest) -> anyhow::Result<ItemStream> {
        (self)(request)
    }
}

/// A source serving a fixed set of items for every request.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    items: Vec<SourceItem>,
}

impl StaticSource {
    pub fn new(items: Vec<SourceItem>) -> Self {
        Self { items }
    }
}

impl StreamSource for StaticSource {
    fn stream(&self, _request: &LoadRequest) -> anyhow::Result<ItemStream> {
        Ok(Box::new(self.items.clone().into_iter().map(Ok)))
    }
}

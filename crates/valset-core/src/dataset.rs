/*!
Datasets are the main access-point for valset. Regardless of where the
data lives, every dataset offers the same capabilities: open a lazy stream
of raw records, turn one record into an input binding, and report a
stable name.

| Dataset           | Source                     | Records                    |
| ----------------- | -------------------------- | -------------------------- |
| [`ImageNet2012Val`] | webdataset tar archive     | [`ImageRecord`](crate::record::ImageRecord)    |
| [`SquadV1_1`]       | explicit JSON document     | [`QuestionRecord`](crate::record::QuestionRecord) |
| [`SquadHub`]        | hosted dataset identifier  | [`QuestionRecord`](crate::record::QuestionRecord) |

[`ValidationSet`] is the closed set of all of the above, for drivers that
pick a dataset at runtime.
 */

use crate::{
    binding::InputBinding,
    preprocess::Preprocessor,
    record::RawRecord,
    source::{ItemStream, LoadRequest, StreamSource},
    DatasetError, Result,
};

mod imagenet;
mod squad;

pub use imagenet::ImageNet2012Val;
pub use squad::{SquadHub, SquadV1_1};

/// Typed records produced from a source stream.
pub type Records = Box<dyn Iterator<Item = Result<RawRecord>> + Send>;

/// The capability set shared by every dataset.
pub trait Dataset {
    /// Stable identifier used for reporting.
    fn name(&self) -> &str;

    /// The URL or identifier the data is loaded from.
    fn locator(&self) -> &str;

    /// Describe the streamed split this dataset reads.
    fn load_request(&self) -> LoadRequest;

    /// Convert untyped source items into this dataset's records.
    fn records(&self, items: ItemStream) -> Records;

    /// Turn a record into named model inputs using `preprocess`.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::ContractMismatch`] when the produced inputs
    /// don't match `inputs`, or when the record or preprocessor is of the
    /// wrong kind for this dataset.
    fn transform(
        &self,
        inputs: &[String],
        record: RawRecord,
        preprocess: Preprocessor<'_>,
    ) -> Result<InputBinding>;

    /// Open a fresh stream over the dataset, starting at the first record.
    ///
    /// # Errors
    ///
    /// Failures to open the source are reported as
    /// [`DatasetError::SourceUnavailable`] and are not retried.
    fn open(&self, source: &dyn StreamSource) -> Result<RecordStream> {
        log::info!("loading dataset {} from {}", self.name(), self.locator());

        let request = self.load_request();
        let items = source
            .stream(&request)
            .map_err(|source| DatasetError::SourceUnavailable {
                locator: request.location.clone(),
                source,
            })?;

        Ok(RecordStream::new(self.records(items)))
    }
}

/// Where a [`RecordStream`] is in its single pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Streaming,
    Exhausted,
}

/// A single-pass handle over the records of an opened dataset.
pub struct RecordStream {
    records: Records,
    state: StreamState,
}

impl RecordStream {
    pub fn new(records: Records) -> Self {
        Self {
            records,
            state: StreamState::Streaming,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Advance by one record.
    ///
    /// Returns [`DatasetError::Exhausted`] once the stream has ended, and
    /// on every call after that.
    pub fn next_record(&mut self) -> Result<RawRecord> {
        if self.state == StreamState::Exhausted {
            return Err(DatasetError::Exhausted);
        }

        match self.records.next() {
            Some(record) => record,
            None => {
                self.state = StreamState::Exhausted;
                Err(DatasetError::Exhausted)
            }
        }
    }
}

impl Iterator for RecordStream {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_record() {
            Err(DatasetError::Exhausted) => None,
            other => Some(other),
        }
    }
}

impl std::fmt::Debug for RecordStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStream")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Any of the supported validation sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationSet {
    ImageNet(ImageNet2012Val),
    Squad(SquadV1_1),
    SquadHub(SquadHub),
}

impl ValidationSet {
    /// Names accepted by [`ValidationSet::from_name`].
    pub const NAMES: [&'static str; 3] = [
        ImageNet2012Val::NAME,
        SquadV1_1::NAME,
        SquadHub::NAME,
    ];

    /// Look up a validation set by its reporting name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            ImageNet2012Val::NAME => Some(Self::ImageNet(ImageNet2012Val::new())),
            SquadV1_1::NAME => Some(Self::Squad(SquadV1_1::new())),
            SquadHub::NAME => Some(Self::SquadHub(SquadHub::new())),
            _ => None,
        }
    }

    /// Replace the default locator, e.g. to read from a mirror.
    pub fn with_locator(self, locator: impl Into<String>) -> Self {
        match self {
            Self::ImageNet(d) => Self::ImageNet(d.with_locator(locator)),
            Self::Squad(d) => Self::Squad(d.with_locator(locator)),
            Self::SquadHub(d) => Self::SquadHub(d.with_locator(locator)),
        }
    }

    fn inner(&self) -> &dyn Dataset {
        match self {
            Self::ImageNet(d) => d,
            Self::Squad(d) => d,
            Self::SquadHub(d) => d,
        }
    }
}

impl std::str::FromStr for ValidationSet {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| {
            anyhow::anyhow!(
                "unknown dataset {:?}, expected one of {:?}",
                s,
                Self::NAMES
            )
        })
    }
}

impl Dataset for ValidationSet {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn locator(&self) -> &str {
        self.inner().locator()
    }

    fn load_request(&self) -> LoadRequest {
        self.inner().load_request()
    }

    fn records(&self, items: ItemStream) -> Records {
        self.inner().records(items)
    }

    fn transform(
        &self,
        inputs: &[String],
        record: RawRecord,
        preprocess: Preprocessor<'_>,
    ) -> Result<InputBinding> {
        self.inner().transform(inputs, record, preprocess)
    }
}

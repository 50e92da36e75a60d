/*!
A lazily opened cursor over a dataset.

The cursor starts out uninitialized and only opens its stream on the
first request. Once exhausted it stays exhausted until [`Cursor::reset`]
is called, after which the next request starts a new pass from the first
record.
 */

use crate::{
    dataset::{Dataset, RecordStream, StreamState},
    record::RawRecord,
    source::StreamSource,
    Result,
};

/// Lifecycle of a [`Cursor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    Uninitialized,
    Streaming,
    Exhausted,
}

pub struct Cursor<'s, D: Dataset> {
    dataset: D,
    source: &'s dyn StreamSource,
    stream: Option<RecordStream>,
}

impl<'s, D: Dataset> Cursor<'s, D> {
    pub fn new(dataset: D, source: &'s dyn StreamSource) -> Self {
        Self {
            dataset,
            source,
            stream: None,
        }
    }

    pub fn dataset(&self) -> &D {
        &self.dataset
    }

    pub fn state(&self) -> CursorState {
        match self.stream.as_ref().map(RecordStream::state) {
            None => CursorState::Uninitialized,
            Some(StreamState::Streaming) => CursorState::Streaming,
            Some(StreamState::Exhausted) => CursorState::Exhausted,
        }
    }

    /// Fetch the next record, opening the stream first if needed.
    pub fn next_record(&mut self) -> Result<RawRecord> {
        let stream = match self.stream.take() {
            Some(stream) => stream,
            None => self.dataset.open(self.source)?,
        };

        self.stream.insert(stream).next_record()
    }

    /// Drop the current stream; the next request opens a new one.
    pub fn reset(&mut self) {
        self.stream = None;
    }

    pub fn into_inner(self) -> D {
        self.dataset
    }
}

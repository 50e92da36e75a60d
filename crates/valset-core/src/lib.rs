/*!

# Valset Core

This crate contains the dataset abstraction we use to push validation
sets through an inference engine. A single evaluation loop can walk an
image classification set or a question answering set without knowing
where the records come from:

```no_run
# use valset_core::prelude::*;
# fn source() -> valset_core::source::StaticSource { Default::default() }
# fn preprocess(jpeg: &[u8]) -> anyhow::Result<tract_core::prelude::Tensor> { unimplemented!() }
let dataset = ImageNet2012Val::new();
let source = source();
let inputs = vec!["input0".to_owned()];

let mut stream = dataset.open(&source)?;
let record = stream.next_record()?;
let binding = dataset.transform(&inputs, record, Preprocessor::Image(&preprocess))?;
# Ok::<(), Box<dyn std::error::Error>>(())
```

Fetching and parsing remote data is delegated to a [`source::StreamSource`],
running the bindings to an [`engine::Engine`].
 */

#![warn(rust_2018_idioms)]

pub use tract_core;

pub mod binding;
pub mod cursor;
pub mod dataset;
pub mod engine;
mod error;
pub mod preprocess;
pub mod record;
pub mod source;

#[doc(inline)]
pub use crate::error::DatasetError;

/// Result alias for dataset operations.
pub type Result<T, E = DatasetError> = std::result::Result<T, E>;

/// Most core utilities are re-exported here.
pub mod prelude {
    pub use super::binding::{InputBinding, Outputs};
    pub use super::cursor::{Cursor, CursorState};
    pub use super::dataset::{
        Dataset, ImageNet2012Val, RecordStream, SquadHub, SquadV1_1, StreamState, ValidationSet,
    };
    pub use super::engine::{evaluate, Engine, EvalOptions, Report};
    pub use super::preprocess::{ImagePreprocessor, Preprocessor, TextPreprocessor};
    pub use super::record::{ImageRecord, QuestionRecord, RawRecord};
    pub use super::source::{
        ItemStream, LoadRequest, Sample, SourceFormat, SourceItem, StaticSource, StreamSource,
    };
    pub use super::DatasetError;
}

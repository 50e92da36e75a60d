/*!

# Valset Source

A [`StreamSource`] that actually goes out and gets data. Webdataset tar
archives and JSON documents are read from local paths, `file://` or
`http(s)://` locators; hosted datasets are paged in from a rows API.

```no_run
use valset_core::prelude::*;
use valset_source::{LoaderConfig, StreamingLoader};

let loader = StreamingLoader::remote(LoaderConfig::default())?;
let mut records = SquadHub::new().open(&loader)?;
let first = records.next_record()?;
# Ok::<(), Box<dyn std::error::Error>>(())
```

Nothing is downloaded up front: archives are read as they stream in and
hosted rows are fetched one page at a time.
 */

#![warn(rust_2018_idioms)]

use anyhow::{Context, Result};
use std::sync::Arc;
use valset_core::source::{ItemStream, LoadRequest, SourceFormat, StreamSource};

mod config;
pub mod fetch;
pub mod hub;
mod json;
mod webdataset;

pub use config::LoaderConfig;
pub use fetch::{AnyFetch, Body, Fetch, HttpFetch, LocalFetch, MemoryFetch};

/// Opens [`LoadRequest`]s by fetching through `F` and parsing by format.
pub struct StreamingLoader<F> {
    fetch: Arc<F>,
    config: LoaderConfig,
}

impl<F: Fetch + 'static> StreamingLoader<F> {
    pub fn new(fetch: F) -> Self {
        Self::with_config(fetch, LoaderConfig::default())
    }

    pub fn with_config(fetch: F, config: LoaderConfig) -> Self {
        Self {
            fetch: Arc::new(fetch),
            config,
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }
}

impl StreamingLoader<AnyFetch> {
    /// A loader reading from disk and the network.
    pub fn remote(config: LoaderConfig) -> Result<Self> {
        let fetch = AnyFetch::new(&config)?;
        Ok(Self::with_config(fetch, config))
    }
}

impl<F: Fetch + 'static> StreamSource for StreamingLoader<F> {
    fn stream(&self, request: &LoadRequest) -> Result<ItemStream> {
        log::debug!(
            "opening {} split {:?} of {}",
            request.format,
            request.split,
            request.location
        );

        match request.format {
            SourceFormat::WebDataset => {
                let body = self.fetch.fetch(&request.location)?;
                webdataset::stream(body, &request.location)
            }
            SourceFormat::Json => {
                let body = self.fetch.fetch(&request.location)?;
                json::stream(body, &request.location, request.field.as_deref())
            }
            SourceFormat::Hub => {
                let fetch: Arc<dyn Fetch> = self.fetch.clone();
                hub::stream(fetch, &self.config, &request.location, &request.split)
                    .with_context(|| format!("failed to open hosted dataset {}", request.location))
            }
        }
    }
}

impl<F> std::fmt::Debug for StreamingLoader<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingLoader")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

use anyhow::Result;
use clap::{Args, Parser};
use std::time::Duration;
use valset_core::dataset::ValidationSet;
use valset_source::{AnyFetch, LoaderConfig, StreamingLoader};

mod api;
mod classify;
mod eval;
mod stream;

/// The command to run.
#[derive(Parser, Debug)]
pub(crate) enum Command {
    Api(api::ApiArgs),
    Stream(stream::Args),
    Eval(eval::Args),
    Classify(classify::Args),
}

pub(crate) fn run(command: Command) -> Result<()> {
    match command {
        Command::Api(config) => api::describe_api(config),
        Command::Stream(config) => stream::stream(config),
        Command::Eval(config) => eval::eval(config),
        Command::Classify(config) => classify::classify(config),
    }
}

fn dataset_parser(name: &str) -> Result<ValidationSet, String> {
    ValidationSet::from_name(name).ok_or_else(|| {
        format!(
            "unknown dataset {:?}, expected one of: {}",
            name,
            ValidationSet::NAMES.join(", ")
        )
    })
}

/// Where and how validation data is fetched.
#[derive(Args, Debug, Clone)]
pub(crate) struct SourceArgs {
    /// Read the dataset from this URL, path or hub identifier instead.
    #[clap(long)]
    locator: Option<String>,

    /// Base URL of the hosted dataset rows API.
    #[clap(long, default_value = LoaderConfig::DEFAULT_HUB_ENDPOINT)]
    hub_endpoint: String,

    /// Hub config to read; defaults to the first one with the split.
    #[clap(long)]
    hub_config: Option<String>,

    /// Request timeout in seconds.
    #[clap(long, default_value = "300")]
    timeout: u64,
}

impl SourceArgs {
    fn apply(&self, dataset: ValidationSet) -> ValidationSet {
        match &self.locator {
            Some(locator) => dataset.with_locator(locator.as_str()),
            None => dataset,
        }
    }

    fn loader_config(&self) -> LoaderConfig {
        let mut config = LoaderConfig::default()
            .with_hub_endpoint(self.hub_endpoint.as_str())
            .with_timeout(Duration::from_secs(self.timeout));

        if let Some(hub_config) = &self.hub_config {
            config = config.with_hub_config(hub_config.as_str());
        }

        config
    }

    fn loader(&self) -> Result<StreamingLoader<AnyFetch>> {
        StreamingLoader::remote(self.loader_config())
    }
}

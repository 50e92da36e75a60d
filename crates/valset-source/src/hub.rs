/*!
Hosted datasets, read page by page from a dataset viewer rows API.

Only the `/splits` and `/rows` endpoints are used. A page is fetched when
the previous one has been consumed, so nothing beyond the current page
is held in memory.
 */

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use url::Url;
use valset_core::source::{ItemStream, SourceItem};

use crate::{fetch::Fetch, LoaderConfig};

#[derive(Deserialize, Debug)]
struct SplitsResponse {
    splits: Vec<SplitEntry>,
}

#[derive(Deserialize, Debug)]
struct SplitEntry {
    config: String,
    split: String,
}

#[derive(Deserialize, Debug)]
struct RowsResponse {
    rows: Vec<RowEntry>,
    num_rows_total: Option<usize>,
}

#[derive(Deserialize, Debug)]
struct RowEntry {
    row: Value,
}

/// URL builder for a rows API endpoint.
#[derive(Debug, Clone)]
pub struct HubEndpoint {
    base: Url,
}

impl HubEndpoint {
    pub fn new(base: &str) -> Result<Self> {
        let mut base =
            Url::parse(base).with_context(|| format!("invalid hub endpoint {}", base))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self { base })
    }

    pub fn splits_url(&self, dataset: &str) -> Result<Url> {
        let mut url = self.base.join("splits")?;
        url.query_pairs_mut().append_pair("dataset", dataset);
        Ok(url)
    }

    pub fn rows_url(
        &self,
        dataset: &str,
        config: &str,
        split: &str,
        offset: usize,
        length: usize,
    ) -> Result<Url> {
        let mut url = self.base.join("rows")?;
        url.query_pairs_mut()
            .append_pair("dataset", dataset)
            .append_pair("config", config)
            .append_pair("split", split)
            .append_pair("offset", &offset.to_string())
            .append_pair("length", &length.to_string());
        Ok(url)
    }
}

fn fetch_json<T: for<'de> Deserialize<'de>>(fetch: &dyn Fetch, url: &Url) -> Result<T> {
    let body = fetch.fetch(url.as_str())?;
    serde_json::from_reader(body).with_context(|| format!("unexpected response from {}", url))
}

/// Find the first config offering `split`.
fn resolve_config(
    fetch: &dyn Fetch,
    endpoint: &HubEndpoint,
    dataset: &str,
    split: &str,
) -> Result<String> {
    let response: SplitsResponse = fetch_json(fetch, &endpoint.splits_url(dataset)?)?;

    match response.splits.into_iter().find(|entry| entry.split == split) {
        Some(entry) => Ok(entry.config),
        None => bail!("dataset {:?} has no split {:?}", dataset, split),
    }
}

struct HubRows {
    fetch: Arc<dyn Fetch>,
    endpoint: HubEndpoint,
    dataset: String,
    config: String,
    split: String,
    page_size: usize,
    offset: usize,
    total: Option<usize>,
    page: std::vec::IntoIter<RowEntry>,
    done: bool,
}

impl HubRows {
    fn fetch_page(&mut self) -> Result<()> {
        let url = self.endpoint.rows_url(
            &self.dataset,
            &self.config,
            &self.split,
            self.offset,
            self.page_size,
        )?;

        log::debug!(
            "fetching rows {}..{} of {}",
            self.offset,
            self.offset + self.page_size,
            self.dataset
        );

        let response: RowsResponse = fetch_json(&*self.fetch, &url)?;
        if response.num_rows_total.is_some() {
            self.total = response.num_rows_total;
        }

        if response.rows.is_empty() {
            self.done = true;
        }

        self.offset += response.rows.len();
        self.page = response.rows.into_iter();
        Ok(())
    }

    fn has_more(&self) -> bool {
        !self.done && self.total.map_or(true, |total| self.offset < total)
    }
}

impl Iterator for HubRows {
    type Item = Result<SourceItem>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.page.next() {
                return Some(Ok(SourceItem::Row(entry.row)));
            }

            if !self.has_more() {
                return None;
            }

            if let Err(e) = self.fetch_page() {
                self.done = true;
                return Some(Err(e));
            }
        }
    }
}

/// Open `dataset`'s `split`. The first page is fetched right away so an
/// unreachable hub fails the open rather than the first read.
pub(crate) fn stream(
    fetch: Arc<dyn Fetch>,
    config: &LoaderConfig,
    dataset: &str,
    split: &str,
) -> Result<ItemStream> {
    let endpoint = HubEndpoint::new(&config.hub_endpoint)?;

    let hub_config = match &config.hub_config {
        Some(hub_config) => hub_config.clone(),
        None => resolve_config(&*fetch, &endpoint, dataset, split)?,
    };

    let mut rows = HubRows {
        fetch,
        endpoint,
        dataset: dataset.to_owned(),
        config: hub_config,
        split: split.to_owned(),
        page_size: config.page_size,
        offset: 0,
        total: None,
        page: vec![].into_iter(),
        done: false,
    };

    rows.fetch_page()?;
    Ok(Box::new(rows))
}

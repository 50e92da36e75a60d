/*!
Byte access for the loader. Everything above this layer only sees readers.
 */

use anyhow::{bail, Context, Result};
use std::{
    collections::HashMap,
    fs::File,
    io::{Cursor, Read},
    path::PathBuf,
    sync::Arc,
};
use url::Url;

use crate::LoaderConfig;

/// A reader over a fetched document.
pub type Body = Box<dyn Read + Send>;

/// Opens a reader for a locator.
pub trait Fetch: Send + Sync {
    fn fetch(&self, location: &str) -> Result<Body>;
}

impl<T: Fetch + ?Sized> Fetch for Arc<T> {
    fn fetch(&self, location: &str) -> Result<Body> {
        (**self).fetch(location)
    }
}

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Blocking HTTP(S) fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetch {
    client: reqwest::blocking::Client,
}

impl HttpFetch {
    pub fn new(config: &LoaderConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self { client })
    }
}

impl Fetch for HttpFetch {
    fn fetch(&self, location: &str) -> Result<Body> {
        log::debug!("GET {}", location);

        let response = self
            .client
            .get(location)
            .send()
            .with_context(|| format!("request to {} failed", location))?;

        let status = response.status();
        if !status.is_success() {
            bail!("request to {} failed with status {}", location, status);
        }

        Ok(Box::new(response))
    }
}

/// Reads plain paths and `file://` URLs from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFetch;

impl LocalFetch {
    fn path_for(location: &str) -> Result<PathBuf> {
        if location.starts_with("file:") {
            let url = Url::parse(location).with_context(|| format!("invalid URL {}", location))?;
            return url
                .to_file_path()
                .map_err(|_| anyhow::anyhow!("not a local file URL: {}", location));
        }

        Ok(PathBuf::from(location))
    }
}

impl Fetch for LocalFetch {
    fn fetch(&self, location: &str) -> Result<Body> {
        let path = Self::path_for(location)?;
        let file = File::open(&path).with_context(|| format!("failed to open {:?}", path))?;
        Ok(Box::new(file))
    }
}

/// Serves documents registered in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryFetch {
    documents: HashMap<String, Arc<Vec<u8>>>,
}

impl MemoryFetch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, location: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.documents
            .insert(location.into(), Arc::new(data.into()));
    }

    pub fn with(mut self, location: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.insert(location, data);
        self
    }
}

impl Fetch for MemoryFetch {
    fn fetch(&self, location: &str) -> Result<Body> {
        match self.documents.get(location) {
            Some(data) => Ok(Box::new(Cursor::new(data.as_ref().clone()))),
            None => bail!("no document registered for {:?}", location),
        }
    }
}

/// Routes `http(s)://` locators to the network and everything else to disk.
#[derive(Debug, Clone)]
pub struct AnyFetch {
    http: HttpFetch,
    local: LocalFetch,
}

impl AnyFetch {
    pub fn new(config: &LoaderConfig) -> Result<Self> {
        Ok(Self {
            http: HttpFetch::new(config)?,
            local: LocalFetch,
        })
    }
}

impl Fetch for AnyFetch {
    fn fetch(&self, location: &str) -> Result<Body> {
        if is_remote(location) {
            self.http.fetch(location)
        } else {
            self.local.fetch(location)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn read_all(mut body: Body) -> Vec<u8> {
        let mut buf = vec![];
        body.read_to_end(&mut buf).unwrap();
        buf
    }

    #[test]
    fn memory_roundtrip() {
        let fetch = MemoryFetch::new().with("mem://doc", b"hello".to_vec());
        assert_eq!(read_all(fetch.fetch("mem://doc").unwrap()), b"hello");
        assert!(fetch.fetch("mem://other").is_err());
    }

    #[test]
    fn local_path_and_file_url() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{}").unwrap();

        let path = file.path().to_str().unwrap().to_owned();
        assert_eq!(read_all(LocalFetch.fetch(&path).unwrap()), b"{}");

        let url = Url::from_file_path(file.path()).unwrap();
        assert_eq!(read_all(LocalFetch.fetch(url.as_str()).unwrap()), b"{}");
    }

    #[test]
    fn local_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(LocalFetch.fetch(missing.to_str().unwrap()).is_err());
    }

    #[test]
    fn remote_detection() {
        assert!(is_remote("https://image-net.org/data/x.tar"));
        assert!(is_remote("http://localhost/x"));
        assert!(!is_remote("/data/x.tar"));
        assert!(!is_remote("file:///data/x.tar"));
        assert!(!is_remote("squad"));
    }
}

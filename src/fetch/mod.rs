use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, info};
use url::Url;

use crate::error::{EtlError, Result};

/// Where a text resource lives
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Http(Url),
    File(PathBuf),
}

impl Source {
    /// Classify `location` as an HTTP(S) URL, a `file://` URL or a plain path.
    pub fn parse(location: &str) -> Result<Self> {
        match Url::parse(location) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Source::Http(url)),
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map(Source::File)
                .map_err(|_| EtlError::Config(format!("{location:?} is not a usable file URL"))),
            // Anything else, including Windows drive letters that parse as a scheme
            _ => Ok(Source::File(PathBuf::from(location))),
        }
    }
}

/// Blocking fetcher for remote pages and local fixtures.
///
/// Single attempt, no retry. The request timeout is disabled so a slow origin
/// stalls the run instead of failing it.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(None::<Duration>)
            .user_agent(concat!("banks-etl/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(EtlError::Client)?;

        Ok(Self { client })
    }

    /// Read the whole resource at `location` as text
    pub fn fetch_text(&self, location: &str) -> Result<String> {
        match Source::parse(location)? {
            Source::Http(url) => self.get(url),
            Source::File(path) => {
                debug!("Reading {}", path.display());
                std::fs::read_to_string(&path).map_err(|e| EtlError::io(path, e))
            }
        }
    }

    fn get(&self, url: Url) -> Result<String> {
        info!("🌐 GET {}", url);
        let url_text = url.to_string();
        let network = |source| EtlError::Network {
            url: url_text.clone(),
            source,
        };

        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(network)?;
        let body = response.text().map_err(network)?;

        debug!("Fetched {} bytes from {}", body.len(), url_text);
        Ok(body)
    }
}

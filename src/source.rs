//! Where original files come from.
//!
//! [`ImageSource`] is the one thing the coordinator asks of the outside
//! world: "write the bytes of file *N* into this writer".
//!
//! - [`MediaWikiSource`] asks a MediaWiki API for the file's original URL
//!   (`action=query&prop=imageinfo&iiprop=url`) and streams it.
//! - [`LocalSource`] reads from a directory, for offline runs and tests.

use crate::config::WikiConfig;
use crate::naming::wiki_title;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unexpected API response: {0}")]
    Api(String),
    #[error("File not found on wiki: {0}")]
    NotFound(String),
}

/// Something that can produce the original bytes of a named file.
pub trait ImageSource {
    fn download(&self, name: &str, dest: &mut dyn Write) -> Result<u64, SourceError>;
}

/// Downloads originals through the MediaWiki action API.
pub struct MediaWikiSource {
    client: Client,
    api_url: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    query: Option<Query>,
}

#[derive(Debug, Deserialize)]
struct Query {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    imageinfo: Vec<ImageInfo>,
}

#[derive(Debug, Deserialize)]
struct ImageInfo {
    url: String,
}

impl MediaWikiSource {
    pub fn new(config: &WikiConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
        })
    }

    /// Look up the original-resolution URL of `name`.
    fn original_url(&self, name: &str) -> Result<String, SourceError> {
        let title = wiki_title(name);
        let body = self
            .client
            .get(&self.api_url)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("formatversion", "2"),
                ("prop", "imageinfo"),
                ("iiprop", "url"),
                ("titles", title.as_str()),
            ])
            .send()?
            .error_for_status()?
            .text()?;
        parse_original_url(&body, &title)
    }
}

/// Pull the first `imageinfo[].url` out of a `formatversion=2` query response.
fn parse_original_url(body: &str, title: &str) -> Result<String, SourceError> {
    let response: QueryResponse =
        serde_json::from_str(body).map_err(|e| SourceError::Api(e.to_string()))?;
    let page = response
        .query
        .and_then(|q| q.pages.into_iter().next())
        .ok_or_else(|| SourceError::Api(format!("no page returned for {title}")))?;
    if page.missing && page.imageinfo.is_empty() {
        return Err(SourceError::NotFound(page.title));
    }
    page.imageinfo
        .into_iter()
        .next()
        .map(|info| info.url)
        .ok_or(SourceError::NotFound(page.title))
}

impl ImageSource for MediaWikiSource {
    fn download(&self, name: &str, dest: &mut dyn Write) -> Result<u64, SourceError> {
        let url = self.original_url(name)?;
        log::info!("Downloading {name} from {url}");
        let mut response = self.client.get(&url).send()?.error_for_status()?;
        let bytes = response.copy_to(dest)?;
        Ok(bytes)
    }
}

/// Reads originals from a local directory.
#[derive(Debug, Clone)]
pub struct LocalSource {
    root: PathBuf,
}

impl LocalSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ImageSource for LocalSource {
    fn download(&self, name: &str, dest: &mut dyn Write) -> Result<u64, SourceError> {
        let bare = name
            .split_once(':')
            .filter(|(ns, _)| ns.eq_ignore_ascii_case("file") || ns.eq_ignore_ascii_case("image"))
            .map_or(name, |(_, rest)| rest);
        let mut file = std::fs::File::open(self.root.join(bare))?;
        Ok(std::io::copy(&mut file, dest)?)
    }
}

// src/repository/client.rs

//! HTTP client for mirror operations
//!
//! Provides a wrapper around reqwest with retry support for fetching
//! `PACKAGES` indexes, release pages and `Last-Modified` headers.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use reqwest::blocking::{Client, Response};
use reqwest::header::LAST_MODIFIED;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Default timeout for HTTP requests (60 seconds, CRAN's index is large)
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Maximum attempts for a failed request
const MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds, multiplied by the attempt number
const RETRY_DELAY_MS: u64 = 1000;

/// HTTP client wrapper with retry support
pub struct MirrorClient {
    client: Client,
    max_retries: u32,
}

impl MirrorClient {
    /// Create a new mirror client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(concat!("bioarch-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::InitError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_retries: MAX_RETRIES,
        })
    }

    /// Send a GET request, retrying transport failures
    ///
    /// A non-success status is returned as an error immediately: a 404 from a
    /// mirror does not get better on retry.
    fn get(&self, url: &str) -> Result<Response> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.client.get(url).send() {
                Ok(response) => {
                    if !response.status().is_success() {
                        return Err(Error::DownloadError(format!(
                            "HTTP {} from {}",
                            response.status(),
                            url
                        )));
                    }
                    return Ok(response);
                }
                Err(e) => {
                    if attempt >= self.max_retries {
                        return Err(Error::DownloadError(format!(
                            "Failed to fetch {url} after {attempt} attempts: {e}"
                        )));
                    }
                    warn!("Fetch attempt {} for {} failed: {}, retrying...", attempt, url, e);
                    std::thread::sleep(Duration::from_millis(RETRY_DELAY_MS * attempt as u64));
                }
            }
        }
    }

    /// Fetch a URL as text
    pub fn get_text(&self, url: &str) -> Result<String> {
        debug!("Fetching {}", url);
        self.get(url)?
            .text()
            .map_err(|e| Error::DownloadError(format!("Failed to read response from {url}: {e}")))
    }

    /// Download a URL into `dest`
    ///
    /// The body is streamed into a temporary file next to `dest` and renamed
    /// into place, so an interrupted download leaves the old file intact.
    pub fn download_to_file(&self, url: &str, dest: &Path) -> Result<u64> {
        let dir = dest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;

        let mut response = self.get(url)?;
        let mut temp = NamedTempFile::new_in(dir)?;
        let written = io::copy(&mut response, temp.as_file_mut())
            .map_err(|e| Error::DownloadError(format!("Failed to read response from {url}: {e}")))?;
        temp.as_file_mut().flush()?;
        temp.persist(dest)
            .map_err(|e| Error::IoError(format!("Failed to write {}: {}", dest.display(), e)))?;

        debug!("Downloaded {} bytes from {} to {}", written, url, dest.display());
        Ok(written)
    }

    /// `Last-Modified` of a remote file, if the server sends one
    pub fn last_modified(&self, url: &str) -> Result<Option<DateTime<Utc>>> {
        let response = self
            .client
            .head(url)
            .send()
            .map_err(|e| Error::DownloadError(format!("Failed to query {url}: {e}")))?;

        let Some(value) = response.headers().get(LAST_MODIFIED) else {
            return Ok(None);
        };
        let value = value
            .to_str()
            .map_err(|e| Error::ParseError(format!("Invalid Last-Modified from {url}: {e}")))?;
        parse_http_date(value).map(Some)
    }

    /// Whether the remote file is newer than the local copy
    ///
    /// True when the local file is absent; false when the server does not
    /// report a modification time.
    pub fn remote_is_newer(&self, url: &str, local: &Path) -> Result<bool> {
        let Ok(file) = File::open(local) else {
            return Ok(true);
        };
        let Some(remote) = self.last_modified(url)? else {
            return Ok(false);
        };
        let local: DateTime<Utc> = file.metadata()?.modified()?.into();
        Ok(remote > local)
    }
}

/// Parse an RFC 2822 HTTP date (`Wed, 21 Oct 2015 07:28:00 GMT`)
pub fn parse_http_date(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::ParseError(format!("Invalid HTTP date '{}': {}", value, e)))
}

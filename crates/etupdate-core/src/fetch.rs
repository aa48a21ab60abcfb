//! HTTP retrieval of the version number, digest and archive.

use std::io::Write;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::blocking::Response;

use crate::Result;
use crate::UpdateError;
use crate::UpdaterConfig;

/// Source of remote content.
///
/// The updater only talks to the network through this trait, so tests can
/// substitute an in-memory implementation.
pub trait Fetcher {
    /// Fetches the full body of `url`.
    ///
    /// # Errors
    ///
    /// Returns `UpdateError::Network` on transport failure or a non-success
    /// status.
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;

    /// Fetches `url` and decodes the body as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns `UpdateError::Network` if the request fails or the body is not
    /// valid UTF-8.
    fn fetch_text(&self, url: &str) -> Result<String> {
        let body = self.fetch(url)?;
        String::from_utf8(body).map_err(|e| UpdateError::Network {
            url: url.to_string(),
            reason: format!("response is not valid UTF-8: {e}"),
        })
    }

    /// Streams the body of `url` into `sink`, returning the number of bytes
    /// written.
    ///
    /// # Errors
    ///
    /// Returns `UpdateError::Network` if the request fails, or
    /// `UpdateError::Io` if writing to `sink` fails.
    fn download(&self, url: &str, sink: &mut dyn Write) -> Result<u64> {
        let body = self.fetch(url)?;
        sink.write_all(&body)?;
        Ok(body.len() as u64)
    }
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        (**self).fetch(url)
    }

    fn fetch_text(&self, url: &str) -> Result<String> {
        (**self).fetch_text(url)
    }

    fn download(&self, url: &str, sink: &mut dyn Write) -> Result<u64> {
        (**self).download(url, sink)
    }
}

/// Blocking HTTP client that labels every request with the updater's user
/// agent.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a client sending `user_agent` and giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend or resolver cannot be initialized.
    pub fn new(user_agent: &str, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    /// Builds a client from the user agent and timeout in `config`.
    ///
    /// # Errors
    ///
    /// See [`HttpFetcher::new`].
    pub fn from_config(config: &UpdaterConfig) -> reqwest::Result<Self> {
        Self::new(&config.user_agent, config.timeout)
    }

    fn get(&self, url: &str) -> Result<Response> {
        self.client
            .get(url)
            .send()
            .and_then(Response::error_for_status)
            .map_err(|e| network_error(url, &e))
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let body = self
            .get(url)?
            .bytes()
            .map_err(|e| network_error(url, &e))?;
        Ok(body.to_vec())
    }

    fn download(&self, url: &str, sink: &mut dyn Write) -> Result<u64> {
        let mut response = self.get(url)?;
        response
            .copy_to(sink)
            .map_err(|e| network_error(url, &e))
    }
}

fn network_error(url: &str, err: &reqwest::Error) -> UpdateError {
    let reason = if let Some(status) = err.status() {
        format!("server responded with {status}")
    } else if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    };

    UpdateError::Network {
        url: url.to_string(),
        reason,
    }
}

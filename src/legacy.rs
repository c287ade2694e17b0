//! Legacy HTTP TTS endpoint, used as a fallback when Azure is not set up.
//!
//! Plain GET with a bounded number of attempts. Failures are logged and
//! retried immediately; the caller only ever sees bytes or `None`.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::LegacyConfig;

pub const MAX_ATTEMPTS: usize = 3;
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("HTTP status {0}")]
    Status(StatusCode),
}

/// Blocking HTTP GET returning the body of a 2xx response.
pub trait HttpFetch: Send + Sync {
    fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
        timeout: Duration,
    ) -> Result<Vec<u8>, FetchError>;
}

pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for ReqwestFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetch for ReqwestFetcher {
    fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
        timeout: Duration,
    ) -> Result<Vec<u8>, FetchError> {
        let mut request = self.client.get(url).timeout(timeout);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        Ok(response.bytes()?.to_vec())
    }
}

pub struct LegacyRequester<F> {
    config: LegacyConfig,
    fetcher: F,
}

impl LegacyRequester<ReqwestFetcher> {
    pub fn from_config(config: LegacyConfig) -> Self {
        Self::new(config, ReqwestFetcher::new())
    }
}

impl<F: HttpFetch> LegacyRequester<F> {
    pub fn new(config: LegacyConfig, fetcher: F) -> Self {
        Self { config, fetcher }
    }

    /// Fetch audio for `text` from the legacy endpoint.
    /// Returns `None` once every attempt has failed.
    pub fn request(&self, text: &str, anchor_type: &str) -> Option<Vec<u8>> {
        let url = self.config.tts_url(text, anchor_type);
        let headers = self.config.tts_headers();

        for attempt in 1..=MAX_ATTEMPTS {
            debug!("Legacy TTS request attempt {attempt}/{MAX_ATTEMPTS}");
            match self.fetcher.get(&url, &headers, REQUEST_TIMEOUT) {
                Ok(body) => return Some(body),
                Err(e) => warn!("Legacy TTS request failed: {e}, retrying..."),
            }
        }

        warn!("Legacy TTS request failed {MAX_ATTEMPTS} times, giving up");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::capture_logs;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Fails a fixed number of times, then serves `body`.
    struct FlakyFetcher {
        failures: usize,
        body: Vec<u8>,
        calls: Mutex<Vec<(String, Vec<(String, String)>, Duration)>>,
    }

    impl FlakyFetcher {
        fn new(failures: usize, body: &[u8]) -> Self {
            Self {
                failures,
                body: body.to_vec(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl HttpFetch for FlakyFetcher {
        fn get(
            &self,
            url: &str,
            headers: &[(String, String)],
            timeout: Duration,
        ) -> Result<Vec<u8>, FetchError> {
            let mut calls = self.calls.lock().unwrap();
            calls.push((url.to_string(), headers.to_vec(), timeout));
            if calls.len() <= self.failures {
                Err(FetchError::Status(StatusCode::BAD_GATEWAY))
            } else {
                Ok(self.body.clone())
            }
        }
    }

    fn legacy_config() -> LegacyConfig {
        LegacyConfig {
            url: "http://legacy.local/tts?text={text}&type={anchor_type}".into(),
            headers: HashMap::from([("Authorization".to_string(), "Bearer t".to_string())]),
        }
    }

    #[test]
    fn first_success_returns_without_retrying() {
        let requester = LegacyRequester::new(legacy_config(), FlakyFetcher::new(0, b"audio"));

        assert_eq!(requester.request("hi", "news"), Some(b"audio".to_vec()));
        assert_eq!(requester.fetcher.call_count(), 1);

        let calls = requester.fetcher.calls.lock().unwrap();
        let (url, headers, timeout) = &calls[0];
        assert_eq!(url, "http://legacy.local/tts?text=hi&type=news");
        assert_eq!(headers, &vec![("Authorization".to_string(), "Bearer t".to_string())]);
        assert_eq!(*timeout, Duration::from_secs(120));
    }

    #[test]
    fn succeeds_on_third_attempt() {
        let requester = LegacyRequester::new(legacy_config(), FlakyFetcher::new(2, b"audio"));

        let (result, logs) = capture_logs(|| requester.request("hi", "news"));

        assert_eq!(result, Some(b"audio".to_vec()));
        assert_eq!(requester.fetcher.call_count(), 3);
        assert_eq!(
            logs.matches("Legacy TTS request failed: HTTP status 502 Bad Gateway, retrying...")
                .count(),
            2,
            "logs: {logs}"
        );
        assert!(!logs.contains("giving up"));
    }

    #[test]
    fn gives_up_after_three_failures() {
        let requester = LegacyRequester::new(legacy_config(), FlakyFetcher::new(usize::MAX, b""));

        let (result, logs) = capture_logs(|| requester.request("hi", "news"));

        assert_eq!(result, None);
        assert_eq!(requester.fetcher.call_count(), MAX_ATTEMPTS);
        assert!(logs.contains("Legacy TTS request failed 3 times, giving up"), "logs: {logs}");
    }
}

//! HTTP transport seam.
//!
//! The engine consumes the [`HttpTransport`] trait only; the bundled
//! [`ReqwestTransport`] is the default implementation. Connection and read
//! timeouts are a transport concern, not the engine's.

use std::time::Duration;

use crate::error::{Error, Result};

/// Extra request headers as name/value pairs.
pub type HeaderPairs<'a> = &'a [(&'a str, &'a str)];

/// A completed HTTP exchange.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Response body as text, lossy on invalid UTF-8.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Response headers with case-insensitive lookup.
#[derive(Debug, Clone, Default)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Headers {
        Headers(Vec::new())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// First value of the named header, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// `Retry-After` in seconds. HTTP-date values are not supported and
    /// read as absent.
    pub fn retry_after(&self) -> Option<Duration> {
        let secs = self.get("retry-after")?.trim().parse::<u64>().ok()?;
        Some(Duration::from_secs(secs))
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Headers(
            iter.into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        )
    }
}

/// Blocking HTTP client used by the engine.
///
/// Implementations report transport-level failures (connect, timeout, TLS)
/// as errors; any completed exchange is returned as an [`HttpResponse`]
/// regardless of status code, since status interpretation is per call site.
pub trait HttpTransport: Send + Sync {
    fn get(&self, url: &str, extra_headers: HeaderPairs<'_>) -> Result<HttpResponse>;

    fn post(&self, url: &str, body: &str, extra_headers: HeaderPairs<'_>) -> Result<HttpResponse>;
}

/// Default transport over a blocking reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<ReqwestTransport> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| Error::Transport(err.to_string()))?;

        Ok(ReqwestTransport { client })
    }

    fn convert(res: reqwest::blocking::Response) -> Result<HttpResponse> {
        let status = res.status().as_u16();

        let mut headers = Headers::new();
        for (name, value) in res.headers() {
            if let Ok(value) = value.to_str() {
                headers.insert(name.as_str(), value);
            }
        }

        let body = res
            .bytes()
            .map_err(|err| Error::Transport(err.to_string()))?
            .to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    fn execute(&self, req: reqwest::blocking::RequestBuilder) -> Result<HttpResponse> {
        let res = req.send().map_err(|err| Error::Transport(err.to_string()))?;
        Self::convert(res)
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &str, extra_headers: HeaderPairs<'_>) -> Result<HttpResponse> {
        log::trace!("GET {url}");

        let mut req = self.client.get(url);
        for (name, value) in extra_headers {
            req = req.header(*name, *value);
        }

        self.execute(req)
    }

    fn post(&self, url: &str, body: &str, extra_headers: HeaderPairs<'_>) -> Result<HttpResponse> {
        log::trace!("POST {url}");

        let mut req = self.client.post(url).body(body.to_owned());
        for (name, value) in extra_headers {
            req = req.header(*name, *value);
        }

        self.execute(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let headers: Headers = [("Replay-Nonce", "abc")].into_iter().collect();
        assert_eq!(headers.get("replay-nonce"), Some("abc"));
        assert_eq!(headers.get("REPLAY-NONCE"), Some("abc"));
        assert_eq!(headers.get("location"), None);
    }

    #[test]
    fn test_retry_after_seconds() {
        let headers: Headers = [("Retry-After", "5")].into_iter().collect();
        assert_eq!(headers.retry_after(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_retry_after_absent_or_unparseable() {
        assert_eq!(Headers::new().retry_after(), None);

        let headers: Headers = [("Retry-After", "Fri, 31 Dec 1999 23:59:59 GMT")]
            .into_iter()
            .collect();
        assert_eq!(headers.retry_after(), None);
    }
}

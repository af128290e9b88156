//! Data sources for the background and sample readings.
//!
//! A source is either an HTTP endpoint returning a JSON table or a local
//! file. Both produce the first row of the table as a [`SpectralRow`].

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value as JsonValue;

use crate::data::loader::{self, LoadError};
use crate::data::model::SpectralRow;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("could not decode response from {url}: {source}")]
    Decode { url: String, source: LoadError },

    #[error(transparent)]
    File(#[from] LoadError),
}

/// Anything that can produce one spectral row per call.
pub trait RowSource {
    fn fetch(&self) -> Result<SpectralRow, FetchError>;

    /// Human-readable location for logs and error messages.
    fn describe(&self) -> String;
}

// ---------------------------------------------------------------------------
// Source location (config / CLI string)
// ---------------------------------------------------------------------------

/// Where a reading comes from, parsed from a config or CLI string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    Http(String),
    File(PathBuf),
}

impl SourceSpec {
    /// `http://` and `https://` strings are endpoints, everything else a path.
    pub fn parse(spec: &str) -> Self {
        let trimmed = spec.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            SourceSpec::Http(trimmed.to_string())
        } else {
            SourceSpec::File(PathBuf::from(trimmed))
        }
    }

    /// Build the concrete source.
    pub fn into_source(self, timeout: Duration) -> Result<Box<dyn RowSource>, FetchError> {
        Ok(match self {
            SourceSpec::Http(url) => Box::new(HttpSource::new(url, timeout)?),
            SourceSpec::File(path) => Box::new(FileSource::new(path)),
        })
    }
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSpec::Http(url) => write!(f, "{url}"),
            SourceSpec::File(path) => write!(f, "{}", path.display()),
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP source
// ---------------------------------------------------------------------------

/// Blocking HTTP GET of a JSON table. Non-success status is an error; no
/// retries.
pub struct HttpSource {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let url = url.into();
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;
        Ok(Self { client, url })
    }
}

impl RowSource for HttpSource {
    fn fetch(&self) -> Result<SpectralRow, FetchError> {
        log::debug!("GET {}", self.url);
        let transport = |source: reqwest::Error| FetchError::Transport {
            url: self.url.clone(),
            source,
        };

        let response = self.client.get(&self.url).send().map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().map_err(transport)?;
        let decode = |source: LoadError| FetchError::Decode {
            url: self.url.clone(),
            source,
        };
        let body: JsonValue = serde_json::from_slice(&bytes).map_err(|e| decode(LoadError::Json(e)))?;
        loader::decode_json_row(&body).map_err(decode)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

// ---------------------------------------------------------------------------
// File source
// ---------------------------------------------------------------------------

/// Reads the first row of a local `.json`, `.csv` or `.parquet` table.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RowSource for FileSource {
    fn fetch(&self) -> Result<SpectralRow, FetchError> {
        Ok(loader::load_file(&self.path)?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve exactly one canned HTTP response on a random local port.
    fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 4096];
            let mut request = Vec::new();
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{addr}/bgdata")
    }

    #[test]
    fn test_source_spec_parse() {
        assert_eq!(
            SourceSpec::parse("https://example.com/bgdata"),
            SourceSpec::Http("https://example.com/bgdata".into())
        );
        assert_eq!(
            SourceSpec::parse("  HTTP://example.com/x "),
            SourceSpec::Http("HTTP://example.com/x".into())
        );
        assert_eq!(
            SourceSpec::parse("data/background.json"),
            SourceSpec::File(PathBuf::from("data/background.json"))
        );
    }

    #[test]
    fn test_http_success() {
        let url = serve_once("HTTP/1.1 200 OK", r#"[{"400": 2.0, "500": "4.0"}]"#);
        let source = HttpSource::new(url, Duration::from_secs(5)).unwrap();

        let row = source.fetch().unwrap();
        assert_eq!(row.get("400"), Some(Some(2.0)));
        assert_eq!(row.get("500"), Some(Some(4.0)));
    }

    #[test]
    fn test_http_error_status() {
        let url = serve_once("HTTP/1.1 503 Service Unavailable", "{}");
        let source = HttpSource::new(url, Duration::from_secs(5)).unwrap();

        match source.fetch() {
            Err(FetchError::Status { status, .. }) => assert_eq!(status, 503),
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[test]
    fn test_http_undecodable_payload() {
        let url = serve_once("HTTP/1.1 200 OK", "[]");
        let source = HttpSource::new(url, Duration::from_secs(5)).unwrap();
        assert!(matches!(source.fetch(), Err(FetchError::Decode { .. })));
    }

    #[test]
    fn test_http_non_json_body() {
        let url = serve_once("HTTP/1.1 200 OK", "<html>oops</html>");
        let source = HttpSource::new(url, Duration::from_secs(5)).unwrap();
        assert!(matches!(
            source.fetch(),
            Err(FetchError::Decode {
                source: LoadError::Json(_),
                ..
            })
        ));
    }

    #[test]
    fn test_missing_file() {
        let source = FileSource::new("/nonexistent/background.json");
        assert!(matches!(
            source.fetch(),
            Err(FetchError::File(LoadError::Io { .. }))
        ));
    }
}

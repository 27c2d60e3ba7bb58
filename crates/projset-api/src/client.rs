// Project settings HTTP client
//
// Wraps `reqwest::Client` with URL construction and response decoding.
// Endpoint methods live in `projects.rs` as inherent methods so this
// module stays focused on transport mechanics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::ErrorBody;
use crate::transport::TransportConfig;

/// HTTP client for the project settings API.
///
/// The base URL is the API root (e.g. `https://errors.example.com/api/0/`);
/// every endpoint is resolved relative to it. Non-success responses are
/// decoded into [`Error`] variants, with per-field validation messages
/// surfaced as [`Error::Validation`].
#[derive(Clone)]
pub struct ProjectClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ProjectClient {
    /// Create a client from a `TransportConfig` (TLS, timeout, token).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { http, base_url }
    }

    /// Parse `base` and wrap an existing `reqwest::Client`.
    pub fn from_reqwest(base: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self::with_client(http, Url::parse(base)?))
    }

    /// The API root every endpoint is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/{seg}/{seg}/.../` with each segment percent-encoded.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?;
            path.pop_if_empty();
            path.extend(segments);
            path.push("");
        }
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        Self::decode(resp).await
    }

    /// Send a PUT request with a JSON body and decode the JSON reply.
    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        debug!("PUT {}", url);
        let resp = self
            .http
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;
        Self::decode(resp).await
    }

    /// Decode a success body, or map a failure status into an [`Error`].
    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        let path = resp.url().path().to_owned();
        let body = resp.text().await.map_err(Error::Transport)?;

        if status.is_success() {
            return serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body,
            });
        }

        debug!(status = status.as_u16(), %path, "request failed");
        Err(failure(status, path, &body))
    }
}

fn failure(status: reqwest::StatusCode, path: String, body: &str) -> Error {
    let code = status.as_u16();
    match status {
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
            Error::Authentication {
                message: ErrorBody::detail(body)
                    .unwrap_or_else(|| "token missing, expired, or lacking scope".into()),
            }
        }
        reqwest::StatusCode::NOT_FOUND => Error::NotFound { path },
        _ => match ErrorBody::field_errors(body, code) {
            Some(errors) => Error::Validation {
                status: code,
                errors,
            },
            None => Error::Api {
                status: code,
                message: ErrorBody::detail(body).unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("unexpected response")
                        .to_owned()
                }),
            },
        },
    }
}

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Method, header::HeaderMap, redirect::Policy};

use super::error::{ConfigurationError, TransportError};

/// Redirect hops followed before giving up.
const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Clone)]
pub struct ProbeRequest {
    pub method: Method,
    pub url: String,
    pub follow_redirects: bool,
    pub timeout: Duration,
    /// The client may stop reading the body after this many bytes.
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

/// The one capability the probe needs from an HTTP stack.
pub trait HttpClient: Send + Sync + 'static {
    fn send(
        &self,
        request: ProbeRequest,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send;
}

/// `HttpClient` backed by reqwest. Holds no cookie store, so requests share
/// pooled connections and nothing else.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    following: Client,
    direct: Client,
}

impl ReqwestClient {
    pub fn new(user_agent: &str) -> Result<Self, ConfigurationError> {
        let build = |policy: Policy| {
            Client::builder()
                .user_agent(user_agent)
                .redirect(policy)
                .build()
                .map_err(|e| ConfigurationError::Client(super::report(&e)))
        };
        Ok(Self {
            following: build(Policy::limited(MAX_REDIRECTS))?,
            direct: build(Policy::none())?,
        })
    }
}

impl HttpClient for ReqwestClient {
    async fn send(&self, request: ProbeRequest) -> Result<RawResponse, TransportError> {
        let client = if request.follow_redirects {
            &self.following
        } else {
            &self.direct
        };

        let mut response = client
            .request(request.method, &request.url)
            .timeout(request.timeout)
            .send()
            .await?;

        let status_code = response.status().as_u16();
        let headers = flatten_headers(response.headers());

        let mut body = Vec::new();
        while body.len() < request.max_body_bytes {
            match response.chunk().await {
                Ok(Some(chunk)) => body.extend_from_slice(&chunk),
                Ok(None) => break,
                Err(e) => {
                    log::warn!(
                        "Failed to read body of {} after {} bytes: {}",
                        request.url,
                        body.len(),
                        super::report(&e)
                    );
                    break;
                }
            }
        }

        Ok(RawResponse {
            status_code,
            headers,
            body,
        })
    }
}

/// Collapse a header map to one lossily-decoded value per name, joining
/// repeated headers with ", ".
pub fn flatten_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut flat: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        flat.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }
    flat
}

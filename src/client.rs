use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::Stream;
use futures::future;
use futures::stream::StreamExt;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::client_logger::ClientLogger;
use crate::error::{Error, Result};
use crate::ndjson::process_ndjson;
use crate::observability::{CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS};
use crate::types::{
    ChatChunk, ChatRequest, ErrorBody, Message, ModelDescriptor, ModelListResponse, PullProgress,
    PullRequest,
};

/// Address the Ollama daemon listens on by default.
pub const DEFAULT_HOST: &str = "http://127.0.0.1:11434";
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A lazy stream of chat response fragments.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// A lazy stream of model download progress events.
pub type PullStream = Pin<Box<dyn Stream<Item = Result<PullProgress>> + Send>>;

/// The three daemon operations the command-line front-end depends on.
///
/// [`Ollama`] talks to a real daemon over HTTP; tests substitute in-memory
/// implementations.
#[async_trait::async_trait]
pub trait InferenceClient: Send + Sync {
    /// Start a streaming chat completion over the full conversation.
    async fn chat(&self, model: &str, messages: &[Message]) -> Result<FragmentStream>;

    /// List the models installed on the daemon.
    async fn list(&self) -> Result<Vec<ModelDescriptor>>;

    /// Start downloading a model, streaming progress events.
    async fn pull(&self, model: &str) -> Result<PullStream>;
}

/// Client for the Ollama HTTP API.
#[derive(Clone)]
pub struct Ollama {
    client: ReqwestClient,
    base_url: Url,
    connect_timeout: Duration,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl Ollama {
    /// Create a client for the daemon at [`DEFAULT_HOST`].
    pub fn new() -> Result<Self> {
        Self::with_options(None, None)
    }

    /// Create a new client with custom settings.
    ///
    /// `host` may omit the scheme (`localhost:11434`), in which case `http` is
    /// assumed. Only the connection phase is bounded by `connect_timeout`;
    /// generations and downloads may take arbitrarily long.
    pub fn with_options(host: Option<&str>, connect_timeout: Option<Duration>) -> Result<Self> {
        let base_url = normalize_host(host.unwrap_or(DEFAULT_HOST))?;
        let connect_timeout = connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT);
        let client = ReqwestClient::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            client,
            base_url,
            connect_timeout,
            logger: None,
        })
    }

    /// Attach a logger that observes every request and stream item.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Base URL all endpoints are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Create and return default headers for API requests.
    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/x-ndjson"),
        );
        headers
    }

    /// Send a request, recording metrics and mapping transport and status errors.
    async fn execute(&self, method: &str, url: Url, request: RequestBuilder) -> Result<Response> {
        CLIENT_REQUESTS.click();
        if let Some(logger) = &self.logger {
            logger.log_request(method, url.as_str());
        }
        let start = Instant::now();
        let result = request.headers(Self::default_headers()).send().await;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

        let outcome = match result {
            Ok(response) if response.status().is_success() => Ok(response),
            Ok(response) => Err(Self::process_error_response(response).await),
            Err(e) => Err(self.map_send_error(e)),
        };
        if let Err(err) = &outcome {
            CLIENT_REQUEST_ERRORS.click();
            if let Some(logger) = &self.logger {
                logger.log_error(err);
            }
        }
        outcome
    }

    fn map_send_error(&self, e: reqwest::Error) -> Error {
        if e.is_connect() {
            Error::connection(
                format!("could not reach Ollama at {}: {}", self.base_url, e),
                Some(Box::new(e)),
            )
        } else if e.is_timeout() {
            Error::timeout(format!(
                "Request timed out after {:.0}s: {}",
                self.connect_timeout.as_secs_f64(),
                e
            ))
        } else {
            Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
        }
    }

    /// Process error responses and convert to our Error type.
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {}", e),
                    Some(Box::new(e)),
                );
            }
        };

        let message = serde_json::from_str::<ErrorBody>(&error_body)
            .map(|body| body.error)
            .unwrap_or_else(|_| error_body.trim().to_string());

        match status_code {
            400 => Error::bad_request(message),
            404 => Error::not_found(message),
            408 => Error::timeout(message),
            500 => Error::internal_server(message),
            502..=504 => Error::service_unavailable(message),
            _ => Error::api(status_code, message),
        }
    }

    /// POST a streaming request and decode the NDJSON response body.
    async fn post_streaming<B, T>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<T>> + Send>>>
    where
        B: serde::Serialize + Sync,
        T: DeserializeOwned + Send + 'static,
    {
        let url = self.endpoint(path)?;
        let request = self.client.post(url.clone()).json(body);
        let response = self.execute("POST", url, request).await?;
        Ok(Box::pin(process_ndjson(Box::pin(response.bytes_stream()))))
    }

    fn log_stream_error<T>(&self, item: &Result<T>) {
        if let (Err(err), Some(logger)) = (item, &self.logger) {
            logger.log_error(err);
        }
    }
}

impl fmt::Debug for Ollama {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ollama")
            .field("base_url", &self.base_url.as_str())
            .field("connect_timeout", &self.connect_timeout)
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

#[async_trait::async_trait]
impl InferenceClient for Ollama {
    async fn chat(&self, model: &str, messages: &[Message]) -> Result<FragmentStream> {
        let request = ChatRequest::streaming(model, messages.to_vec());
        let chunks = self.post_streaming::<_, ChatChunk>("api/chat", &request).await?;
        let this = self.clone();
        let fragments = chunks.filter_map(move |chunk| {
            this.log_stream_error(&chunk);
            let fragment = match chunk {
                Ok(chunk) => {
                    if let (true, Some(logger)) = (chunk.done, &this.logger) {
                        logger.log_chat_done(&chunk);
                    }
                    chunk.fragment().map(|text| Ok(text.to_string()))
                }
                Err(err) => Some(Err(err)),
            };
            future::ready(fragment)
        });
        Ok(Box::pin(fragments))
    }

    async fn list(&self) -> Result<Vec<ModelDescriptor>> {
        let url = self.endpoint("api/tags")?;
        let request = self.client.get(url.clone());
        let response = self.execute("GET", url, request).await?;
        let list = response.json::<ModelListResponse>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse model list: {}", e),
                Some(Box::new(e)),
            )
        })?;
        Ok(list.models)
    }

    async fn pull(&self, model: &str) -> Result<PullStream> {
        let request = PullRequest::streaming(model);
        let events = self
            .post_streaming::<_, PullProgress>("api/pull", &request)
            .await?;
        let this = self.clone();
        let events = events.inspect(move |event| {
            this.log_stream_error(event);
            if let (Ok(event), Some(logger)) = (event, &this.logger) {
                logger.log_pull_event(event);
            }
        });
        Ok(Box::pin(events))
    }
}

/// Turns a user-supplied host into a base URL that endpoint paths can be joined onto.
fn normalize_host(host: &str) -> Result<Url> {
    let host = host.trim();
    let mut url = if host.contains("://") {
        Url::parse(host)?
    } else {
        Url::parse(&format!("http://{host}"))?
    };
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

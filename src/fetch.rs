use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, PoisonError},
};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

pub use reqwest::Method;

use crate::{
    error::{ClientError, ClientResult},
    session::SessionStore,
    ui::notify::{Navigator, Notifier, Page, ToastLevel},
};

/// Header carrying the per-call correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

// --- Request / Response Shapes ---

/// PartContent
///
/// One field of a multipart form: a text value or a named file.
#[derive(Debug, Clone, PartialEq)]
pub enum PartContent {
    Text(String),
    File {
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultipartPart {
    pub name: String,
    pub content: PartContent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<MultipartPart>),
}

/// ApiRequest
///
/// A transport-neutral description of one REST call. `path` is relative to the
/// configured API base and already percent-encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn queries(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn json<T: Serialize>(mut self, payload: &T) -> ClientResult<Self> {
        self.body = RequestBody::Json(serde_json::to_value(payload)?);
        Ok(self)
    }

    pub fn multipart(mut self, parts: Vec<MultipartPart>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }

    /// Case-insensitive header lookup.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value.as_str())
    }
}

/// ErrorBody
///
/// The loosely specified error envelope of the backend. Endpoints disagree on
/// whether they use `message` or `error`, so both are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json_value(status: u16, value: &serde_json::Value) -> Self {
        Self::new(status, value.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> ClientResult<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Decodes a JSON array; `null` or an empty body is an empty list.
    pub fn json_list<T: DeserializeOwned>(&self) -> ClientResult<Vec<T>> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        let list: Option<Vec<T>> = serde_json::from_slice(&self.body)?;
        Ok(list.unwrap_or_default())
    }

    /// `None` when the body is not a JSON object.
    pub fn error_body(&self) -> Option<ErrorBody> {
        serde_json::from_slice::<ErrorBody>(&self.body).ok()
    }

    /// error_message
    ///
    /// The body's `message` field, then its `error` field, then a plain-text body,
    /// then `fallback`.
    pub fn error_message(&self, fallback: &str) -> String {
        if let Some(body) = self.error_body() {
            return body
                .message
                .filter(|m| !m.trim().is_empty())
                .or(body.error.filter(|e| !e.trim().is_empty()))
                .unwrap_or_else(|| fallback.to_string());
        }
        let text = self.text();
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.starts_with('{') || trimmed.starts_with('[') {
            fallback.to_string()
        } else {
            trimmed.to_string()
        }
    }

    pub fn into_error(self, fallback: &str) -> ClientError {
        let message = self.error_message(fallback);
        ClientError::request_failed(self.status, message)
    }
}

// 1. Transport Contract
/// Transport
///
/// Delivers one request and returns whatever the server answered. A non-2xx status
/// is still `Ok`; only failures to obtain a response are errors. Swapping the real
/// reqwest client for the scripted mock leaves every caller untouched.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> ClientResult<ApiResponse>;
}

// 2. The Real Implementation
/// ReqwestTransport
///
/// Resolves paths against the API base URL. No explicit timeout or retry: the
/// reqwest defaults apply.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn build_form(parts: Vec<MultipartPart>) -> ClientResult<Form> {
    let mut form = Form::new();
    for MultipartPart { name, content } in parts {
        form = match content {
            PartContent::Text(value) => form.text(name, value),
            PartContent::File {
                file_name,
                content_type,
                bytes,
            } => {
                let part = Part::bytes(bytes)
                    .file_name(file_name.clone())
                    .mime_str(&content_type)
                    .map_err(|_| {
                        ClientError::ValidationFailed(format!(
                            "{} has an invalid content type ({})",
                            file_name, content_type
                        ))
                    })?;
                form.part(name, part)
            }
        };
    }
    Ok(form)
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.client.request(request.method, url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(parts) => builder.multipart(build_form(parts)?),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(ApiResponse::new(status, body.to_vec()))
    }
}

// 3. The Mock Implementation
/// MockTransport
///
/// Replays scripted answers in FIFO order and records every request it received,
/// so client flows can be exercised without a backend. Running out of script is a
/// transport error.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Result<ApiResponse, String>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, response: ApiResponse) -> &Self {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Ok(response));
        self
    }

    pub fn push_json(&self, status: u16, value: serde_json::Value) -> &Self {
        self.push_response(ApiResponse::json_value(status, &value))
    }

    pub fn push_text(&self, status: u16, text: &str) -> &Self {
        self.push_response(ApiResponse::new(status, text))
    }

    pub fn push_status(&self, status: u16) -> &Self {
        self.push_response(ApiResponse::new(status, Vec::new()))
    }

    /// The next call fails before any response is produced.
    pub fn push_failure(&self, message: &str) -> &Self {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Err(message.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_request(&self) -> Option<ApiRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
        let label = format!("{} {}", request.method, request.path);
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        let next = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        match next {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(ClientError::Transport(message)),
            None => Err(ClientError::Transport(format!(
                "no scripted response for {}",
                label
            ))),
        }
    }
}

/// AuthenticatedFetch
///
/// The single chokepoint for authorized calls. It attaches the bearer token and
/// JSON content type, and owns the centralized reaction to 401 and 403 so no
/// resource client has to repeat it.
pub struct AuthenticatedFetch {
    transport: Arc<dyn Transport>,
    session: Arc<SessionStore>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl AuthenticatedFetch {
    pub fn new(
        transport: Arc<dyn Transport>,
        session: Arc<SessionStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            transport,
            session,
            notifier,
            navigator,
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    fn prepare(&self, mut request: ApiRequest, with_token: bool) -> (ApiRequest, String) {
        let is_multipart = matches!(request.body, RequestBody::Multipart(_));
        if !is_multipart && request.header_value("content-type").is_none() {
            request = request.header("Content-Type", "application/json");
        }
        if with_token {
            if let Some(token) = self.session.get_token() {
                request = request.header("Authorization", format!("Bearer {}", token));
            }
        }
        let request_id = Uuid::new_v4().to_string();
        (request.header(REQUEST_ID_HEADER, request_id.clone()), request_id)
    }

    async fn dispatch(&self, request: ApiRequest, request_id: String) -> ClientResult<ApiResponse> {
        let method = request.method.clone();
        let path = request.path.clone();
        let response = self.transport.send(request).await.map_err(|e| {
            tracing::warn!(%method, %path, req_id = %request_id, error = %e, "Request failed in transport");
            e
        })?;
        tracing::debug!(%method, %path, req_id = %request_id, status = response.status, "API call");
        Ok(response)
    }

    /// send
    ///
    /// 401 clears the session, redirects to login and fails with
    /// `AuthenticationRequired`; 403 shows a notice and fails with
    /// `PermissionDenied`. Every other answer goes back to the caller as-is.
    pub async fn send(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
        let (request, request_id) = self.prepare(request, true);
        let response = self.dispatch(request, request_id).await?;

        match response.status {
            401 => {
                if let Err(e) = self.session.clear() {
                    tracing::warn!(error = %e, "Could not persist session clear after 401");
                }
                self.navigator.redirect(Page::Login);
                Err(ClientError::AuthenticationRequired)
            }
            403 => {
                self.notifier.notify("Permission denied", ToastLevel::Error);
                Err(ClientError::PermissionDenied)
            }
            _ => Ok(response),
        }
    }

    /// send_public
    ///
    /// For calls made without a session (login, register). No token, and a 401 is
    /// just another response for the caller to interpret.
    pub async fn send_public(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
        let (request, request_id) = self.prepare(request, false);
        self.dispatch(request, request_id).await
    }

    /// Authorized read decoded into `T`; non-2xx becomes `RequestFailed`.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        fallback: &str,
    ) -> ClientResult<T> {
        let response = self.send(request).await?;
        if !response.is_success() {
            return Err(response.into_error(fallback));
        }
        response.json()
    }

    /// Like `fetch_json` for list endpoints, tolerating a `null` body.
    pub async fn fetch_list<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        fallback: &str,
    ) -> ClientResult<Vec<T>> {
        let response = self.send(request).await?;
        if !response.is_success() {
            return Err(response.into_error(fallback));
        }
        response.json_list()
    }

    /// Mutation whose body is irrelevant; non-2xx becomes `RequestFailed`.
    pub async fn expect_success(&self, request: ApiRequest, fallback: &str) -> ClientResult<ApiResponse> {
        let response = self.send(request).await?;
        if !response.is_success() {
            return Err(response.into_error(fallback));
        }
        Ok(response)
    }
}

//! HTTP client for network-based API calls

use crate::{ClientConfig, ClientError, ClientResult};
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::ApiResponse;

/// HTTP client for the access-control backend
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the current token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let request = self.client.request(method, url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        Self::send(self.request(Method::GET, path)).await
    }

    /// Make a GET request with query parameters
    pub async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> ClientResult<T> {
        Self::send(self.request(Method::GET, path).query(query)).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        Self::send(self.request(Method::POST, path).json(body)).await
    }

    /// Make a PUT request with JSON body
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        Self::send(self.request(Method::PUT, path).json(body)).await
    }

    /// Make a PATCH request with JSON body
    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        Self::send(self.request(Method::PATCH, path).json(body)).await
    }

    /// Make a DELETE request
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        Self::send(self.request(Method::DELETE, path)).await
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> ClientResult<T> {
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Handle the HTTP response
    ///
    /// Failure statuses prefer the backend's error envelope when the body
    /// carries one.
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::warn!(status = %status, "Backend request failed");
            let envelope = serde_json::from_str::<ApiResponse<serde_json::Value>>(&text).ok();
            return Err(match envelope.and_then(|e| e.to_error()) {
                Some(err) => ClientError::Api(err),
                None => ClientError::from_status(status, text),
            });
        }

        // 204 and empty 200 bodies decode as an empty object
        let body = if text.trim().is_empty() { "{}" } else { text.as_str() };
        serde_json::from_str(body).map_err(Into::into)
    }
}

/// Unwrap an envelope that must carry data
pub(crate) fn into_data<T>(response: ApiResponse<T>, what: &str) -> ClientResult<T> {
    if let Some(err) = response.to_error() {
        return Err(ClientError::Api(err));
    }
    response
        .data
        .ok_or_else(|| ClientError::InvalidResponse(format!("Missing {what} data")))
}

/// Check an envelope whose data is irrelevant
pub(crate) fn into_unit<T>(response: ApiResponse<T>) -> ClientResult<()> {
    match response.to_error() {
        Some(err) => Err(ClientError::Api(err)),
        None => Ok(()),
    }
}

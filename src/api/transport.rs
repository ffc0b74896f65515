use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use std::sync::Arc;

use crate::core::{DocgenConfig, DocgenError, DocgenResult};
use crate::models::GenerationRequest;

/// Sends one generation request and returns the rendered file.
#[async_trait]
pub trait GenerationTransport: Send + Sync {
    async fn generate(&self, url: &str, request: &GenerationRequest) -> DocgenResult<Bytes>;
}

pub type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

/// `reqwest` transport to the file handler.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    auth_token: Option<String>,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl HttpTransport {
    pub fn new(config: &DocgenConfig) -> DocgenResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(HttpTransport {
            client: builder.build()?,
            auth_token: config.auth_token.clone(),
            on_unauthorized: None,
        })
    }

    /// Called whenever the file handler answers 401, e.g. to ask the user to log in again.
    pub fn on_unauthorized(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_unauthorized = Some(Arc::new(hook));
        self
    }
}

/// `Authorization` value for a stored token; tokens already carrying the scheme are kept as is.
pub fn bearer_header(token: &str) -> String {
    if token.starts_with("Bearer ") {
        token.to_string()
    } else {
        format!("Bearer {}", token)
    }
}

#[async_trait]
impl GenerationTransport for HttpTransport {
    async fn generate(&self, url: &str, request: &GenerationRequest) -> DocgenResult<Bytes> {
        let mut call = self
            .client
            .post(url)
            .header(ACCEPT, request.format.content_type())
            .json(request);

        if let Some(token) = self.auth_token.as_deref().filter(|t| !t.is_empty()) {
            call = call.header(AUTHORIZATION, bearer_header(token));
        }

        tracing::debug!(url, template = %request.template_name, "posting generation request");
        let response = call.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            if let Some(hook) = &self.on_unauthorized {
                hook();
            }
            return Err(DocgenError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DocgenError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        tracing::debug!(template = %request.template_name, size_bytes = bytes.len(), "generation response received");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EnhancedDocumentData;

    #[test]
    fn test_bearer_header_prefixes_once() {
        assert_eq!(bearer_header("abc"), "Bearer abc");
        assert_eq!(bearer_header("Bearer abc"), "Bearer abc");
    }

    #[tokio::test]
    async fn test_empty_base_url_is_a_transport_failure() {
        let transport = HttpTransport::new(&DocgenConfig::default()).unwrap();
        let request = GenerationRequest::docx(&EnhancedDocumentData::new(), "claim").unwrap();

        let err = transport.generate("", &request).await.unwrap_err();
        assert!(matches!(err, DocgenError::Transport(_)));
    }
}

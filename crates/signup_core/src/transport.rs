use async_trait::async_trait;
use reqwest::Client;
use shared::protocol::SignupRequest;
use tracing::debug;
use url::Url;

use crate::{config::SignupSettings, outcome::SubmissionError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// One attempt per call; implementations never retry.
#[async_trait]
pub trait SignupTransport: Send + Sync {
    async fn post_signup(&self, request: &SignupRequest)
        -> Result<TransportResponse, SubmissionError>;
}

pub struct HttpSignupTransport {
    http: Client,
    endpoint: Url,
}

impl HttpSignupTransport {
    pub fn new(settings: &SignupSettings) -> Result<Self, SubmissionError> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| SubmissionError::Transport(format!("failed to build http client: {err}")))?;
        Ok(Self {
            http,
            endpoint: settings.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl SignupTransport for HttpSignupTransport {
    async fn post_signup(
        &self,
        request: &SignupRequest,
    ) -> Result<TransportResponse, SubmissionError> {
        debug!(endpoint = %self.endpoint, "posting signup request");
        let res = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|err| SubmissionError::Transport(err.to_string()))?;
        let status = res.status().as_u16();
        let body = res
            .bytes()
            .await
            .map_err(|err| SubmissionError::Transport(format!("failed to read response body: {err}")))?;
        Ok(TransportResponse {
            status,
            body: body.to_vec(),
        })
    }
}

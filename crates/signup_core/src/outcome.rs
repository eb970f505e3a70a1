use serde_json::Value;
use shared::protocol::SignupErrorBody;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{config::StatusMessages, transport::TransportResponse};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Success(String),
    Failure(String),
}

impl SubmissionOutcome {
    pub fn message(&self) -> &str {
        match self {
            SubmissionOutcome::Success(message) | SubmissionOutcome::Failure(message) => message,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Success(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("server rejected signup with status {status}: {}", .detail.as_deref().unwrap_or("<no error field>"))]
    ServerRejection { status: u16, detail: Option<String> },
    #[error("signup request failed: {0}")]
    Transport(String),
}

impl SubmissionError {
    pub fn into_outcome(self, messages: &StatusMessages) -> SubmissionOutcome {
        match self {
            SubmissionError::ServerRejection { detail, .. } => {
                let detail = detail.unwrap_or_else(|| messages.missing_error_detail.clone());
                SubmissionOutcome::Failure(format!("{}{detail}", messages.error_prefix))
            }
            SubmissionError::Transport(_) => {
                SubmissionOutcome::Failure(messages.transport_failure.clone())
            }
        }
    }
}

// The body is parsed before the status is checked: non-JSON is a transport failure even on 2xx.
pub fn resolve_response(response: &TransportResponse) -> Result<(), SubmissionError> {
    let body: Value = serde_json::from_slice(&response.body).map_err(|err| {
        SubmissionError::Transport(format!(
            "response body (status {}) is not valid JSON: {err}",
            response.status
        ))
    })?;
    info!(status = response.status, body = %body, "signup endpoint responded");

    if (200..300).contains(&response.status) {
        return Ok(());
    }

    let error_body = match body {
        Value::Object(_) => serde_json::from_value::<SignupErrorBody>(body).unwrap_or_default(),
        _ => SignupErrorBody::default(),
    };
    Err(SubmissionError::ServerRejection {
        status: response.status,
        detail: error_body.detail(),
    })
}

pub fn outcome_from(
    result: Result<TransportResponse, SubmissionError>,
    messages: &StatusMessages,
) -> SubmissionOutcome {
    match result.and_then(|response| resolve_response(&response)) {
        Ok(()) => SubmissionOutcome::Success(messages.success.clone()),
        Err(err) => {
            match &err {
                SubmissionError::ServerRejection { status, detail } => {
                    warn!(status, detail = ?detail, "signup rejected by server")
                }
                SubmissionError::Transport(reason) => error!("signup request failed: {reason}"),
            }
            err.into_outcome(messages)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> TransportResponse {
        TransportResponse {
            status,
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn success_ignores_body_fields() {
        let messages = StatusMessages::default();
        let outcome = outcome_from(Ok(response(201, r#"{"id":5,"token":"abc"}"#)), &messages);
        assert_eq!(
            outcome,
            SubmissionOutcome::Success("Cadastro Concluído com Sucesso!".to_string())
        );
    }

    #[test]
    fn rejection_surfaces_server_error_with_prefix() {
        let messages = StatusMessages::default();
        let outcome = outcome_from(
            Ok(response(409, r#"{"error":"Email already exists"}"#)),
            &messages,
        );
        assert_eq!(outcome.message(), "Erro: Email already exists");
        assert!(!outcome.is_success());
    }

    #[test]
    fn rejection_without_error_field_uses_fallback_detail() {
        let messages = StatusMessages::default();
        let outcome = outcome_from(Ok(response(400, r#"{"message":"bad"}"#)), &messages);
        assert_eq!(outcome.message(), "Erro: erro desconhecido");

        let outcome = outcome_from(Ok(response(500, "[1,2]")), &messages);
        assert_eq!(outcome.message(), "Erro: erro desconhecido");
    }

    #[test]
    fn non_json_body_is_transport_failure_even_on_success_status() {
        let messages = StatusMessages::default();
        let err = resolve_response(&response(200, "<html>ok</html>")).expect_err("not json");
        assert!(matches!(err, SubmissionError::Transport(_)));
        assert_eq!(
            outcome_from(Ok(response(200, "<html>ok</html>")), &messages).message(),
            "Erro na solicitação."
        );
        assert_eq!(
            outcome_from(Ok(response(502, "Bad Gateway")), &messages).message(),
            "Erro na solicitação."
        );
    }

    #[test]
    fn transport_error_maps_to_generic_message() {
        let messages = StatusMessages::default();
        let outcome = outcome_from(
            Err(SubmissionError::Transport("connection refused".to_string())),
            &messages,
        );
        assert_eq!(outcome, SubmissionOutcome::Failure("Erro na solicitação.".to_string()));
    }
}

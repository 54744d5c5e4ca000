use thiserror::Error;

pub const SAFETY_BLOCKED_MESSAGE: &str =
    "A análise foi bloqueada por filtros de segurança. Tente termos mais específicos.";
pub const GENERIC_FAILURE_MESSAGE: &str = "Falha ao analisar a partida.";

/// Failures of one model round-trip. None of them is fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("analysis blocked by safety filters")]
    SafetyBlocked,
    #[error("network failure: {0}")]
    NetworkFailure(String),
}

impl AnalysisError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse(reason.into())
    }

    pub fn network(reason: impl Into<String>) -> Self {
        Self::NetworkFailure(reason.into())
    }

    /// The single line shown in the error banner.
    pub fn user_message(&self) -> String {
        match self {
            Self::SafetyBlocked => SAFETY_BLOCKED_MESSAGE.to_string(),
            Self::MalformedResponse(reason) => match reason.as_str() {
                "no structured payload found" => {
                    "Formato inválido. A IA não gerou a análise estruturada.".to_string()
                }
                "unparseable payload" => "Erro ao processar os dados da análise.".to_string(),
                "empty response" => "A IA não retornou conteúdo. Tente novamente.".to_string(),
                other if other.trim().is_empty() => GENERIC_FAILURE_MESSAGE.to_string(),
                other => other.to_string(),
            },
            Self::NetworkFailure(reason) => {
                if reason.trim().is_empty() {
                    GENERIC_FAILURE_MESSAGE.to_string()
                } else {
                    reason.clone()
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("{0}")]
    AuthRejected(String),
}

impl AuthError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::AuthRejected(reason.into())
    }

    pub fn message(&self) -> &str {
        match self {
            Self::AuthRejected(reason) => reason,
        }
    }
}

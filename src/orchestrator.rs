use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::AnalysisError;
use crate::normalize::normalize;
use crate::report::AnalysisResult;
use crate::risk::should_alert;

/// Raw reply of the model collaborator, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModelReply {
    pub text: String,
    pub citations: Vec<String>,
}

/// Anything that turns a match query into a model reply.
pub trait MatchAnalyst: Send + Sync {
    fn analyze(&self, query: &str) -> Result<ModelReply, AnalysisError>;
}

/// Identity of one query cycle. Cancelling it marks any late completion as stale.
#[derive(Debug, Clone)]
pub struct QueryToken {
    id: u64,
    cancelled: Arc<AtomicBool>,
}

impl QueryToken {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub primary: Result<AnalysisResult, AnalysisError>,
    /// `Some` only in comparison mode.
    pub secondary: Option<Result<AnalysisResult, AnalysisError>>,
}

impl QueryOutcome {
    pub fn is_comparison(&self) -> bool {
        self.secondary.is_some()
    }

    pub fn results(&self) -> impl Iterator<Item = &AnalysisResult> {
        self.primary
            .as_ref()
            .ok()
            .into_iter()
            .chain(self.secondary.as_ref().and_then(|r| r.as_ref().ok()))
    }

    pub fn has_results(&self) -> bool {
        self.results().next().is_some()
    }

    /// One banner line covering every failed slot, or `None` when all succeeded.
    pub fn error_message(&self) -> Option<String> {
        let primary = self.primary.as_ref().err().map(AnalysisError::user_message);
        let Some(secondary) = self.secondary.as_ref() else {
            return primary;
        };
        let secondary = secondary.as_ref().err().map(AnalysisError::user_message);
        match (primary, secondary) {
            (None, None) => None,
            (Some(a), None) => Some(format!("Jogo A: {a}")),
            (None, Some(b)) => Some(format!("Jogo B: {b}")),
            (Some(a), Some(b)) if a == b => Some(a),
            (Some(a), Some(b)) => Some(format!("Jogo A: {a} | Jogo B: {b}")),
        }
    }

    /// True when any delivered report carries a high-risk signal.
    pub fn should_alert(&self) -> bool {
        self.results().any(|result| should_alert(Some(result)))
    }
}

/// Runs one query cycle. Returns `None` (nothing started) for a blank primary query.
///
/// With a non-blank secondary query both requests are in flight at the same
/// time and fail independently.
pub fn run_query(
    analyst: &dyn MatchAnalyst,
    primary: &str,
    secondary: Option<&str>,
) -> Option<QueryOutcome> {
    let primary = primary.trim();
    if primary.is_empty() {
        return None;
    }
    let secondary = secondary.map(str::trim).filter(|s| !s.is_empty());

    let outcome = match secondary {
        Some(secondary) => {
            let (a, b) = rayon::join(
                || analyze_one(analyst, primary),
                || analyze_one(analyst, secondary),
            );
            QueryOutcome {
                primary: a,
                secondary: Some(b),
            }
        }
        None => QueryOutcome {
            primary: analyze_one(analyst, primary),
            secondary: None,
        },
    };
    Some(outcome)
}

pub fn analyze_one(analyst: &dyn MatchAnalyst, query: &str) -> Result<AnalysisResult, AnalysisError> {
    let result = analyst
        .analyze(query)
        .and_then(|reply| normalize(&reply.text, &reply.citations));
    if let Err(err) = &result {
        tracing::warn!(query, error = %err, "analysis failed");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_token_is_shared_between_clones() {
        let token = QueryToken::new(7);
        let worker_copy = token.clone();
        assert!(!worker_copy.is_cancelled());
        token.cancel();
        assert!(worker_copy.is_cancelled());
        assert_eq!(worker_copy.id(), 7);
    }

    #[test]
    fn identical_failures_collapse_into_one_message() {
        let outcome = QueryOutcome {
            primary: Err(AnalysisError::SafetyBlocked),
            secondary: Some(Err(AnalysisError::SafetyBlocked)),
        };
        assert_eq!(
            outcome.error_message().as_deref(),
            Some(crate::error::SAFETY_BLOCKED_MESSAGE)
        );
        assert!(!outcome.has_results());
    }
}

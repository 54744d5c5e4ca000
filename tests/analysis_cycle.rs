use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::mpsc;
use std::time::Duration;

use betmind_terminal::demo_analyst::DemoAnalyst;
use betmind_terminal::error::{AnalysisError, SAFETY_BLOCKED_MESSAGE};
use betmind_terminal::orchestrator::{
    MatchAnalyst, ModelReply, QueryOutcome, QueryToken, run_query,
};
use betmind_terminal::provider::run_cycle;
use betmind_terminal::report::AnalysisResult;
use betmind_terminal::state::{AppState, CyclePhase, Delta, apply_delta};

/// Scripted analyst: one canned reply per query, every call recorded.
struct ScriptedAnalyst {
    replies: HashMap<String, Result<ModelReply, AnalysisError>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedAnalyst {
    fn new() -> Self {
        Self {
            replies: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn reply(mut self, query: &str, text: &str) -> Self {
        self.replies.insert(
            query.to_string(),
            Ok(ModelReply {
                text: text.to_string(),
                citations: vec!["https://fonte".to_string()],
            }),
        );
        self
    }

    fn fail(mut self, query: &str, err: AnalysisError) -> Self {
        self.replies.insert(query.to_string(), Err(err));
        self
    }

    fn calls(&self) -> Vec<String> {
        let mut calls = self.calls.lock().expect("calls lock").clone();
        calls.sort();
        calls
    }
}

impl MatchAnalyst for ScriptedAnalyst {
    fn analyze(&self, query: &str) -> Result<ModelReply, AnalysisError> {
        self.calls.lock().expect("calls lock").push(query.to_string());
        self.replies
            .get(query)
            .cloned()
            .unwrap_or_else(|| Err(AnalysisError::network("unscripted query")))
    }
}

fn report_json(title: &str, volatility: &str) -> String {
    format!(
        r#"```json
{{"matchTitle": "{title}", "probabilities": {{"winA": "55%"}}, "risks": {{"volatility": "{volatility}"}}}}
```"#
    )
}

fn result_titled(title: &str, volatility: &str) -> AnalysisResult {
    let mut result = AnalysisResult {
        match_title: title.to_string(),
        ..AnalysisResult::default()
    };
    result.risks.volatility = volatility.to_string();
    result
}

#[test]
fn blank_primary_never_calls_analyst() {
    let analyst = ScriptedAnalyst::new();
    assert!(run_query(&analyst, "   ", Some("B vs C")).is_none());
    assert!(analyst.calls().is_empty());
}

#[test]
fn single_query_normalizes_reply() {
    let analyst = ScriptedAnalyst::new().reply("A vs B", &report_json("A vs B", "Baixa"));
    let outcome = run_query(&analyst, " A vs B ", None).expect("started");
    assert!(!outcome.is_comparison());
    let result = outcome.primary.expect("primary ok");
    assert_eq!(result.match_title, "A vs B");
    assert_eq!(result.probabilities.win_a, 55.0);
    assert_eq!(result.grounding_urls, Some(vec!["https://fonte".to_string()]));
}

#[test]
fn comparison_issues_both_queries() {
    let analyst = ScriptedAnalyst::new()
        .reply("A vs B", &report_json("A vs B", "Baixa"))
        .reply("C vs D", &report_json("C vs D", "Alta"));
    let outcome = run_query(&analyst, "A vs B", Some("C vs D")).expect("started");
    assert_eq!(analyst.calls(), vec!["A vs B", "C vs D"]);
    assert!(outcome.is_comparison());
    assert_eq!(outcome.results().count(), 2);
    assert!(outcome.error_message().is_none());
    assert!(outcome.should_alert());
}

#[test]
fn blank_secondary_runs_single_query() {
    let analyst = ScriptedAnalyst::new().reply("A vs B", &report_json("A vs B", "Baixa"));
    let outcome = run_query(&analyst, "A vs B", Some("  ")).expect("started");
    assert!(!outcome.is_comparison());
    assert_eq!(analyst.calls(), vec!["A vs B"]);
}

#[test]
fn one_failure_keeps_the_other_report() {
    let analyst = ScriptedAnalyst::new()
        .reply("A vs B", &report_json("A vs B", "Baixa"))
        .fail("C vs D", AnalysisError::SafetyBlocked);
    let outcome = run_query(&analyst, "A vs B", Some("C vs D")).expect("started");
    assert!(outcome.has_results());
    assert_eq!(
        outcome.error_message(),
        Some(format!("Jogo B: {SAFETY_BLOCKED_MESSAGE}"))
    );
}

#[test]
fn malformed_reply_surfaces_its_message() {
    let analyst = ScriptedAnalyst::new().reply("A vs B", "sem json aqui");
    let outcome = run_query(&analyst, "A vs B", None).expect("started");
    assert!(!outcome.has_results());
    assert_eq!(
        outcome.error_message().as_deref(),
        Some("Formato inválido. A IA não gerou a análise estruturada.")
    );
}

#[test]
fn demo_analyst_reply_survives_normalization() {
    let analyst = DemoAnalyst::with_latency(Duration::ZERO);
    let outcome = run_query(&analyst, "Flamengo vs Palmeiras", None).expect("started");
    let result = outcome.primary.expect("demo reply normalizes");
    assert!(result.match_title.contains("Flamengo"));
    assert!(result.probabilities.win_a > 0.0);
    let urls = result.grounding_urls.expect("citations");
    let mut deduped = urls.clone();
    deduped.dedup();
    assert_eq!(urls, deduped);
}

#[test]
fn cancelled_cycle_publishes_nothing() {
    let analyst = ScriptedAnalyst::new().reply("A vs B", &report_json("A vs B", "Alta"));
    let (tx, rx) = mpsc::channel();

    let token = QueryToken::new(1);
    token.cancel();
    run_cycle(&analyst, &token, "A vs B", None, &tx);
    assert!(rx.try_recv().is_err());

    let live = QueryToken::new(2);
    run_cycle(&analyst, &live, "A vs B", None, &tx);
    match rx.try_recv().expect("delta sent") {
        Delta::AnalysisFinished { query_id, outcome } => {
            assert_eq!(query_id, 2);
            assert!(outcome.has_results());
        }
        other => panic!("unexpected delta: {other:?}"),
    }
}

#[test]
fn superseded_completion_is_dropped() {
    let mut state = AppState::new();
    state.query = "A vs B".to_string();
    state.begin_query().expect("first cycle");
    let stale_id = state.active_query_id().expect("id");

    state.query = "C vs D".to_string();
    state.begin_query().expect("second cycle");
    let live_id = state.active_query_id().expect("id");
    assert_ne!(stale_id, live_id);

    apply_delta(
        &mut state,
        Delta::AnalysisFinished {
            query_id: stale_id,
            outcome: QueryOutcome {
                primary: Ok(result_titled("A vs B", "Baixa")),
                secondary: None,
            },
        },
    );
    assert_eq!(state.phase, CyclePhase::Loading);
    assert!(state.data.is_none());

    apply_delta(
        &mut state,
        Delta::AnalysisFinished {
            query_id: live_id,
            outcome: QueryOutcome {
                primary: Ok(result_titled("C vs D", "Baixa")),
                secondary: None,
            },
        },
    );
    assert_eq!(state.phase, CyclePhase::Success);
    assert_eq!(state.data.as_ref().map(|r| r.match_title.as_str()), Some("C vs D"));
}

#[test]
fn blank_query_starts_no_cycle() {
    let mut state = AppState::new();
    state.query = "   ".to_string();
    assert!(state.begin_query().is_none());
    assert_eq!(state.phase, CyclePhase::Idle);
    assert!(state.active_query_id().is_none());
}

#[test]
fn alert_fires_once_and_only_when_enabled() {
    let finish = |state: &mut AppState| {
        let query_id = state.active_query_id().expect("active");
        apply_delta(
            state,
            Delta::AnalysisFinished {
                query_id,
                outcome: QueryOutcome {
                    primary: Ok(result_titled("A vs B", "Volatilidade alta")),
                    secondary: None,
                },
            },
        );
    };

    let mut state = AppState::new();
    state.query = "A vs B".to_string();
    state.begin_query().expect("cycle");
    finish(&mut state);
    assert!(state.take_pending_alert());
    assert!(!state.take_pending_alert());

    state.toggle_sound();
    state.begin_query().expect("cycle");
    finish(&mut state);
    assert!(!state.take_pending_alert());

    let mut quiet = AppState::new();
    quiet.alerts_configured = false;
    quiet.query = "A vs B".to_string();
    quiet.begin_query().expect("cycle");
    finish(&mut quiet);
    assert!(!quiet.take_pending_alert());
}

#[test]
fn total_failure_ends_in_error_phase() {
    let mut state = AppState::new();
    state.query = "A vs B".to_string();
    state.begin_query().expect("cycle");
    let query_id = state.active_query_id().expect("id");
    apply_delta(
        &mut state,
        Delta::AnalysisFinished {
            query_id,
            outcome: QueryOutcome {
                primary: Err(AnalysisError::SafetyBlocked),
                secondary: None,
            },
        },
    );
    assert_eq!(state.phase, CyclePhase::Error);
    assert_eq!(state.error.as_deref(), Some(SAFETY_BLOCKED_MESSAGE));
    assert!(state.data.is_none());
}

#[test]
fn logout_clears_results() {
    let mut state = AppState::new();
    state.query = "A vs B".to_string();
    state.data = Some(result_titled("A vs B", "Baixa"));
    state.push_log("[INFO] antes");
    state.reset_for_logout();
    assert!(state.data.is_none());
    assert!(state.query.is_empty());
    assert_eq!(state.logs.len(), 1);
}

use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::export::export_reports;
use crate::orchestrator::{MatchAnalyst, QueryToken, run_query};
use crate::state::{Delta, ProviderCommand};

/// Background worker fed by the UI's command channel.
///
/// Every analysis cycle gets its own thread so a hung request never holds
/// back a newer one. The loop ends when the UI drops its sender.
pub fn spawn_analysis_provider(
    analyst: Arc<dyn MatchAnalyst>,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                ProviderCommand::Analyze {
                    token,
                    primary,
                    secondary,
                } => {
                    let analyst = Arc::clone(&analyst);
                    let tx = tx.clone();
                    thread::spawn(move || {
                        run_cycle(analyst.as_ref(), &token, &primary, secondary.as_deref(), &tx);
                    });
                }
                ProviderCommand::Export { path, reports } => {
                    match export_reports(&path, &reports) {
                        Ok(sheets) => {
                            let _ = tx.send(Delta::ExportFinished { path, sheets });
                        }
                        Err(err) => {
                            tracing::warn!(error = %err, "export failed");
                            let _ = tx.send(Delta::ExportFailed(format!("{err:#}")));
                        }
                    }
                }
            }
        }
    })
}

/// Runs one cycle and publishes it unless the token was cancelled meanwhile.
pub fn run_cycle(
    analyst: &dyn MatchAnalyst,
    token: &QueryToken,
    primary: &str,
    secondary: Option<&str>,
    tx: &Sender<Delta>,
) {
    let Some(outcome) = run_query(analyst, primary, secondary) else {
        return;
    };
    if token.is_cancelled() {
        tracing::debug!(query_id = token.id(), "dropping superseded analysis");
        return;
    }
    let _ = tx.send(Delta::AnalysisFinished {
        query_id: token.id(),
        outcome,
    });
}

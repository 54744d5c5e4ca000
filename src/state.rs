use std::collections::VecDeque;
use std::path::PathBuf;

use crate::orchestrator::{QueryOutcome, QueryToken};
use crate::report::{AnalysisResult, ViewMode};
use crate::store::AppConfig;

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Dashboard,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    Name,
    Email,
    Password,
    Confirm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryField {
    Primary,
    Secondary,
}

/// One query cycle: `Idle -> Loading -> Success | Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub focus: AuthField,
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub show_password: bool,
    pub error: Option<String>,
}

impl Default for AuthForm {
    fn default() -> Self {
        Self {
            mode: AuthMode::Login,
            focus: AuthField::Email,
            name: String::new(),
            email: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            show_password: false,
            error: None,
        }
    }
}

impl AuthForm {
    pub fn fields(&self) -> &'static [AuthField] {
        match self.mode {
            AuthMode::Login => &[AuthField::Email, AuthField::Password],
            AuthMode::Register => &[
                AuthField::Name,
                AuthField::Email,
                AuthField::Password,
                AuthField::Confirm,
            ],
        }
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        };
        self.error = None;
        self.focus = self.fields()[0];
    }

    pub fn focus_next(&mut self) {
        let fields = self.fields();
        let idx = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(idx + 1) % fields.len()];
    }

    pub fn focus_prev(&mut self) {
        let fields = self.fields();
        let idx = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(idx + fields.len() - 1) % fields.len()];
    }

    pub fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            AuthField::Name => &mut self.name,
            AuthField::Email => &mut self.email,
            AuthField::Password => &mut self.password,
            AuthField::Confirm => &mut self.confirm_password,
        }
    }

    pub fn clear(&mut self) {
        *self = Self {
            mode: self.mode,
            ..Self::default()
        };
        self.focus = self.fields()[0];
    }
}

#[derive(Debug, Clone, Default)]
pub struct AdminForm {
    pub config: AppConfig,
    pub focus: usize,
    pub status: Option<String>,
}

impl AdminForm {
    pub const FIELDS: usize = 3;

    pub fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            0 => &mut self.config.logo_url,
            1 => &mut self.config.login_bg_url,
            _ => &mut self.config.app_bg_url,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub auth: AuthForm,
    pub admin: AdminForm,
    pub query: String,
    pub query2: String,
    pub editing: Option<QueryField>,
    pub compare_mode: bool,
    pub sound_enabled: bool,
    pub alerts_configured: bool,
    pub sidebar_open: bool,
    pub view_mode: ViewMode,
    pub phase: CyclePhase,
    pub active_token: Option<QueryToken>,
    pub next_query_id: u64,
    pub data: Option<AnalysisResult>,
    pub data2: Option<AnalysisResult>,
    pub error: Option<String>,
    pub pending_alert: bool,
    pub export_status: Option<String>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub report_scroll: u16,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Login,
            auth: AuthForm::default(),
            admin: AdminForm::default(),
            query: String::new(),
            query2: String::new(),
            editing: Some(QueryField::Primary),
            compare_mode: false,
            sound_enabled: true,
            alerts_configured: true,
            sidebar_open: true,
            view_mode: ViewMode::Dashboard,
            phase: CyclePhase::Idle,
            active_token: None,
            next_query_id: 1,
            data: None,
            data2: None,
            error: None,
            pending_alert: false,
            export_status: None,
            logs: VecDeque::with_capacity(MAX_LOGS),
            help_overlay: false,
            report_scroll: 0,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        if self.logs.len() >= MAX_LOGS {
            self.logs.pop_front();
        }
        self.logs.push_back(msg.into());
    }

    pub fn is_loading(&self) -> bool {
        self.phase == CyclePhase::Loading
    }

    pub fn active_query_id(&self) -> Option<u64> {
        self.active_token.as_ref().map(QueryToken::id)
    }

    /// Starts a new cycle from any phase. A blank primary query starts nothing.
    ///
    /// The previous cycle's token is cancelled so its late completion is dropped.
    pub fn begin_query(&mut self) -> Option<ProviderCommand> {
        let primary = self.query.trim().to_string();
        if primary.is_empty() {
            return None;
        }
        let secondary = if self.compare_mode {
            Some(self.query2.trim().to_string()).filter(|s| !s.is_empty())
        } else {
            None
        };

        if let Some(prev) = self.active_token.take() {
            prev.cancel();
        }
        let token = QueryToken::new(self.next_query_id);
        self.next_query_id += 1;
        self.active_token = Some(token.clone());

        self.phase = CyclePhase::Loading;
        self.data = None;
        self.data2 = None;
        self.error = None;
        self.pending_alert = false;
        self.view_mode = ViewMode::Dashboard;
        self.report_scroll = 0;
        self.editing = None;

        let label = match &secondary {
            Some(second) => format!("[INFO] Comparando: {primary} | {second}"),
            None => format!("[INFO] Analisando: {primary}"),
        };
        self.push_log(label);

        Some(ProviderCommand::Analyze {
            token,
            primary,
            secondary,
        })
    }

    pub fn toggle_compare(&mut self) {
        self.compare_mode = !self.compare_mode;
        if !self.compare_mode {
            self.data2 = None;
            if self.editing == Some(QueryField::Secondary) {
                self.editing = Some(QueryField::Primary);
            }
        }
    }

    pub fn toggle_sound(&mut self) {
        self.sound_enabled = !self.sound_enabled;
    }

    pub fn alerts_active(&self) -> bool {
        self.alerts_configured && self.sound_enabled
    }

    /// True once per cycle when the finished cycle asked for an alert.
    pub fn take_pending_alert(&mut self) -> bool {
        std::mem::take(&mut self.pending_alert)
    }

    pub fn focused_query_mut(&mut self) -> Option<&mut String> {
        match self.editing? {
            QueryField::Primary => Some(&mut self.query),
            QueryField::Secondary => Some(&mut self.query2),
        }
    }

    pub fn cycle_query_focus(&mut self) {
        self.editing = match self.editing {
            Some(QueryField::Primary) if self.compare_mode => Some(QueryField::Secondary),
            _ => Some(QueryField::Primary),
        };
    }

    pub fn next_view(&mut self) {
        self.view_mode = self.view_mode.next();
        self.report_scroll = 0;
    }

    pub fn prev_view(&mut self) {
        self.view_mode = self.view_mode.prev();
        self.report_scroll = 0;
    }

    /// Drops every per-user trace: results, queries, pending cycle.
    pub fn reset_for_logout(&mut self) {
        if let Some(token) = self.active_token.take() {
            token.cancel();
        }
        let logs = std::mem::take(&mut self.logs);
        let alerts_configured = self.alerts_configured;
        *self = Self::new();
        self.logs = logs;
        self.alerts_configured = alerts_configured;
    }

    pub fn reports(&self) -> Vec<&AnalysisResult> {
        self.data.iter().chain(self.data2.iter()).collect()
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    AnalysisFinished {
        query_id: u64,
        outcome: QueryOutcome,
    },
    ExportFinished {
        path: PathBuf,
        sheets: usize,
    },
    ExportFailed(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    Analyze {
        token: QueryToken,
        primary: String,
        secondary: Option<String>,
    },
    Export {
        path: PathBuf,
        reports: Vec<AnalysisResult>,
    },
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::AnalysisFinished { query_id, outcome } => {
            if state.active_query_id() != Some(query_id) || state.phase != CyclePhase::Loading {
                state.push_log(format!("[INFO] Resultado descartado (consulta #{query_id} superada)"));
                return;
            }
            state.active_token = None;
            state.error = outcome.error_message();
            state.pending_alert = state.alerts_active() && outcome.should_alert();

            let QueryOutcome { primary, secondary } = outcome;
            state.data = primary.ok();
            state.data2 = secondary.and_then(Result::ok);

            if state.data.is_some() || state.data2.is_some() {
                state.phase = CyclePhase::Success;
                let titles = state
                    .reports()
                    .iter()
                    .map(|r| r.match_title.clone())
                    .collect::<Vec<_>>()
                    .join(" | ");
                state.push_log(format!("[INFO] Análise pronta: {titles}"));
            } else {
                state.phase = CyclePhase::Error;
            }
            if let Some(err) = state.error.clone() {
                state.push_log(format!("[WARN] {err}"));
            }
        }
        Delta::ExportFinished { path, sheets } => {
            let msg = format!("Exportado {sheets} planilhas para {}", path.display());
            state.push_log(format!("[INFO] {msg}"));
            state.export_status = Some(msg);
        }
        Delta::ExportFailed(err) => {
            state.push_log(format!("[WARN] Export error: {err}"));
            state.export_status = Some(format!("Falha na exportação: {err}"));
        }
    }
}

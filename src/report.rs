use serde::{Deserialize, Serialize};

pub const PROBABILITY_KEYS: [&str; 8] = [
    "winA",
    "draw",
    "winB",
    "over15",
    "over25",
    "btts",
    "goalFirstHalf",
    "goalAfter75",
];

pub const MAX_GROUNDING_URLS: usize = 5;

/// One normalized report for a single match query.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisResult {
    pub match_title: String,
    pub high_value_tips: Vec<HighValueTip>,
    pub statistics: Statistics,
    pub probabilities: Probabilities,
    pub hidden_patterns: HiddenPatterns,
    pub trends: Trends,
    pub psychology: Psychology,
    pub safe_entries: SafeEntries,
    pub risks: Risks,
    pub strategy: Strategy,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grounding_urls: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HighValueTip {
    pub market: String,
    pub selection: String,
    /// Free text as the model wrote it, e.g. "85%".
    pub probability: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Statistics {
    pub recent_performance: String,
    pub last5_games_form: String,
    pub avg_goals_scored_conceded: String,
    pub home_away_strength: String,
    pub defensive_consistency: String,
    pub offensive_aggression: String,
    pub goal_patterns: String,
    pub open_closed_game_trends: String,
}

/// Percentages in [0, 100] by intent; the range is not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Probabilities {
    pub win_a: f64,
    pub draw: f64,
    pub win_b: f64,
    pub over15: f64,
    pub over25: f64,
    pub btts: f64,
    pub goal_first_half: f64,
    pub goal_after75: f64,
}

impl Probabilities {
    /// Sets a field by its wire name. Unknown keys are ignored.
    pub fn set(&mut self, key: &str, value: f64) {
        match key {
            "winA" => self.win_a = value,
            "draw" => self.draw = value,
            "winB" => self.win_b = value,
            "over15" => self.over15 = value,
            "over25" => self.over25 = value,
            "btts" => self.btts = value,
            "goalFirstHalf" => self.goal_first_half = value,
            "goalAfter75" => self.goal_after75 = value,
            _ => {}
        }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        match key {
            "winA" => Some(self.win_a),
            "draw" => Some(self.draw),
            "winB" => Some(self.win_b),
            "over15" => Some(self.over15),
            "over25" => Some(self.over25),
            "btts" => Some(self.btts),
            "goalFirstHalf" => Some(self.goal_first_half),
            "goalAfter75" => Some(self.goal_after75),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HiddenPatterns {
    pub early_goal_team: String,
    pub late_goal_team: String,
    pub concede_late_team: String,
    pub shutoff_after_goal_team: String,
    pub pressure_peaks: String,
    pub dangerous_moments: String,
    pub live_entry_minutes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Trends {
    pub win_loss_sequence: String,
    pub games_without_scoring: String,
    pub games_without_conceding: String,
    pub performance_vs_similar: String,
    pub evolution_or_decline: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Psychology {
    pub motivation_pressure: String,
    pub squad_morale: String,
    pub match_type: String,
    pub physical_wear: String,
    pub travel_fatigue: String,
    pub psychological_climate: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SafeEntries {
    pub best_pre_live: String,
    pub best_live: String,
    pub recommended_minutes: String,
    pub most_reliable_type: String,
    pub indicated_line: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Risks {
    pub volatility: String,
    pub inconsistency: String,
    pub unpredictable_history: String,
    pub common_betting_gaffes: String,
    pub underdog_signals: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Strategy {
    pub entry_plan: String,
    pub exit_plan: String,
    pub suggested_stake: String,
    pub avoid: String,
    pub final_read: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Dashboard,
    Stats,
    Probs,
    Patterns,
    Trends,
    Psych,
    Safe,
    Risks,
    Strategy,
    Summary,
}

impl ViewMode {
    pub const ALL: [ViewMode; 10] = [
        ViewMode::Dashboard,
        ViewMode::Stats,
        ViewMode::Probs,
        ViewMode::Patterns,
        ViewMode::Trends,
        ViewMode::Psych,
        ViewMode::Safe,
        ViewMode::Risks,
        ViewMode::Strategy,
        ViewMode::Summary,
    ];

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn shows(self, section: ViewMode) -> bool {
        self == ViewMode::Dashboard || self == section
    }
}

pub fn view_mode_label(mode: ViewMode) -> &'static str {
    match mode {
        ViewMode::Dashboard => "Painel Geral",
        ViewMode::Stats => "Estatísticas",
        ViewMode::Probs => "Probabilidades",
        ViewMode::Patterns => "Padrões Ocultos",
        ViewMode::Trends => "Tendências",
        ViewMode::Psych => "Psicológico",
        ViewMode::Safe => "Entradas Seguras",
        ViewMode::Risks => "Riscos",
        ViewMode::Strategy => "Estratégia",
        ViewMode::Summary => "Resumo",
    }
}

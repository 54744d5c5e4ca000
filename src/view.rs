use crate::report::{AnalysisResult, Probabilities, ViewMode};
use crate::risk::{RiskTier, classify};

pub const EMPTY_FIELD: &str = "-";

/// A titled card of label/value rows, ready for a `Paragraph` or a sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionView {
    pub mode: ViewMode,
    pub title: &'static str,
    pub rows: Vec<(&'static str, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Strong,
    Medium,
    Weak,
}

pub fn tone(value: f64) -> Tone {
    if value > 65.0 {
        Tone::Strong
    } else if value > 40.0 {
        Tone::Medium
    } else {
        Tone::Weak
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityBar {
    pub label: &'static str,
    pub value: f64,
    pub tone: Tone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskMeter {
    pub tier: RiskTier,
    /// Lit cells out of three.
    pub filled: u8,
}

/// Highlight card shown on the dashboard ahead of the sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub best_entry: String,
    pub reliable_type: String,
    pub stake: String,
}

pub fn display(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        EMPTY_FIELD.to_string()
    } else {
        value.to_string()
    }
}

/// Percentage as drawn on a gauge: clamped to [0, 100] and rounded.
pub fn gauge_percent(value: f64) -> u16 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 100.0).round() as u16
}

pub fn outcome_bars(p: &Probabilities) -> [ProbabilityBar; 3] {
    [
        bar("Vitória A", p.win_a),
        bar("Empate", p.draw),
        bar("Vitória B", p.win_b),
    ]
}

pub fn market_bars(p: &Probabilities) -> [ProbabilityBar; 5] {
    [
        bar("Over 1.5", p.over15),
        bar("Over 2.5", p.over25),
        bar("BTTS", p.btts),
        bar("Gol 1T", p.goal_first_half),
        bar("Gol >75'", p.goal_after75),
    ]
}

fn bar(label: &'static str, value: f64) -> ProbabilityBar {
    ProbabilityBar {
        label,
        value,
        tone: tone(value),
    }
}

pub fn risk_meter(result: &AnalysisResult) -> RiskMeter {
    let tier = classify(&result.risks.volatility);
    RiskMeter {
        tier,
        filled: tier.level(),
    }
}

/// The alert glyph next to the meter: sound on and a High tier.
pub fn shows_alert_glyph(result: &AnalysisResult, sound_enabled: bool) -> bool {
    sound_enabled && classify(&result.risks.volatility) == RiskTier::High
}

pub fn ticket(result: &AnalysisResult) -> Ticket {
    Ticket {
        best_entry: display(&result.safe_entries.best_pre_live),
        reliable_type: display(&result.safe_entries.most_reliable_type),
        stake: display(&result.strategy.suggested_stake),
    }
}

/// Cards visible in `mode`, in display order. `Dashboard` yields all of them.
pub fn sections(result: &AnalysisResult, mode: ViewMode) -> Vec<SectionView> {
    all_sections(result)
        .into_iter()
        .filter(|section| mode.shows(section.mode))
        .collect()
}

pub fn all_sections(r: &AnalysisResult) -> Vec<SectionView> {
    let p = &r.probabilities;
    vec![
        section(
            ViewMode::Stats,
            "Estatísticas",
            [
                ("Desempenho", &r.statistics.recent_performance),
                ("Forma", &r.statistics.last5_games_form),
                ("Médias", &r.statistics.avg_goals_scored_conceded),
                ("Casa/Fora", &r.statistics.home_away_strength),
                ("Consistência", &r.statistics.defensive_consistency),
                ("Ataque", &r.statistics.offensive_aggression),
                ("Padrão", &r.statistics.goal_patterns),
                ("Jogo aberto/fechado", &r.statistics.open_closed_game_trends),
            ],
        ),
        SectionView {
            mode: ViewMode::Probs,
            title: "Probabilidades",
            rows: outcome_bars(p)
                .into_iter()
                .chain(market_bars(p))
                .map(|b| (b.label, format!("{:.0}%", b.value)))
                .collect(),
        },
        section(
            ViewMode::Patterns,
            "Padrões",
            [
                ("Marca Cedo", &r.hidden_patterns.early_goal_team),
                ("Marca Tarde", &r.hidden_patterns.late_goal_team),
                ("Sofre Final", &r.hidden_patterns.concede_late_team),
                ("Recua após gol", &r.hidden_patterns.shutoff_after_goal_team),
                ("Pressão", &r.hidden_patterns.pressure_peaks),
                ("Momentos perigosos", &r.hidden_patterns.dangerous_moments),
                ("Minutos ao vivo", &r.hidden_patterns.live_entry_minutes),
            ],
        ),
        section(
            ViewMode::Trends,
            "Tendências",
            [
                ("Sequência", &r.trends.win_loss_sequence),
                ("Sem marcar", &r.trends.games_without_scoring),
                ("Sem sofrer", &r.trends.games_without_conceding),
                ("Vs similares", &r.trends.performance_vs_similar),
                ("Evolução", &r.trends.evolution_or_decline),
            ],
        ),
        section(
            ViewMode::Psych,
            "Psicológico",
            [
                ("Motivação", &r.psychology.motivation_pressure),
                ("Moral", &r.psychology.squad_morale),
                ("Tipo de jogo", &r.psychology.match_type),
                ("Desgaste", &r.psychology.physical_wear),
                ("Viagem", &r.psychology.travel_fatigue),
                ("Clima", &r.psychology.psychological_climate),
            ],
        ),
        section(
            ViewMode::Safe,
            "Entradas Seguras",
            [
                ("Pré-live", &r.safe_entries.best_pre_live),
                ("Ao vivo", &r.safe_entries.best_live),
                ("Minutos", &r.safe_entries.recommended_minutes),
                ("Mais confiável", &r.safe_entries.most_reliable_type),
                ("Linha", &r.safe_entries.indicated_line),
            ],
        ),
        section(
            ViewMode::Risks,
            "Riscos",
            [
                ("Volatilidade", &r.risks.volatility),
                ("Inconsistência", &r.risks.inconsistency),
                ("Histórico imprevisível", &r.risks.unpredictable_history),
                ("Armadilhas", &r.risks.common_betting_gaffes),
                ("Zebra", &r.risks.underdog_signals),
            ],
        ),
        section(
            ViewMode::Strategy,
            "Estratégia",
            [
                ("Plano de Entrada", &r.strategy.entry_plan),
                ("Plano de Saída", &r.strategy.exit_plan),
                ("Stake", &r.strategy.suggested_stake),
                ("Evitar", &r.strategy.avoid),
                ("Leitura final", &r.strategy.final_read),
            ],
        ),
        section(ViewMode::Summary, "Resumo", [("Resumo", &r.summary)]),
    ]
}

fn section<const N: usize>(
    mode: ViewMode,
    title: &'static str,
    fields: [(&'static str, &String); N],
) -> SectionView {
    SectionView {
        mode,
        title,
        rows: fields
            .into_iter()
            .map(|(label, value)| (label, display(value)))
            .collect(),
    }
}

pub fn tip_lines(result: &AnalysisResult) -> Vec<String> {
    result
        .high_value_tips
        .iter()
        .map(|tip| {
            format!(
                "{} · {} ({}) {}",
                display(&tip.market),
                display(&tip.selection),
                display(&tip.probability),
                tip.reason.trim()
            )
            .trim_end()
            .to_string()
        })
        .collect()
}

pub fn sources(result: &AnalysisResult) -> &[String] {
    result.grounding_urls.as_deref().unwrap_or(&[])
}

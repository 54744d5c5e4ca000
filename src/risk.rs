use crate::report::AnalysisResult;

const HIGH_VOLATILITY: &[&str] = &["alta", "high", "extrema"];
const MEDIUM_VOLATILITY: &[&str] = &["média", "media", "moderada"];
const UNDERDOG_ALERT: &[&str] = &["alta", "grande", "chance real"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn level(self) -> u8 {
        match self {
            RiskTier::Low => 1,
            RiskTier::Medium => 2,
            RiskTier::High => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskTier::Low => "LOW",
            RiskTier::Medium => "MEDIUM",
            RiskTier::High => "HIGH",
        }
    }
}

/// Tier from free-text volatility commentary. High wins over Medium.
pub fn classify(volatility: &str) -> RiskTier {
    let text = volatility.to_lowercase();
    if contains_any(&text, HIGH_VOLATILITY) {
        RiskTier::High
    } else if contains_any(&text, MEDIUM_VOLATILITY) {
        RiskTier::Medium
    } else {
        RiskTier::Low
    }
}

pub fn is_underdog_alert_worthy(underdog: &str) -> bool {
    contains_any(&underdog.to_lowercase(), UNDERDOG_ALERT)
}

pub fn should_alert(result: Option<&AnalysisResult>) -> bool {
    let Some(result) = result else {
        return false;
    };
    classify(&result.risks.volatility) == RiskTier::High
        || is_underdog_alert_worthy(&result.risks.underdog_signals)
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_checks_high_before_medium() {
        assert_eq!(classify("Média para Alta"), RiskTier::High);
        assert_eq!(classify("EXTREMA"), RiskTier::High);
        assert_eq!(classify("Moderada"), RiskTier::Medium);
        assert_eq!(classify("MÉDIA"), RiskTier::Medium);
        assert_eq!(classify("media"), RiskTier::Medium);
    }

    #[test]
    fn classify_defaults_to_low() {
        assert_eq!(classify(""), RiskTier::Low);
        assert_eq!(classify("Baixa"), RiskTier::Low);
        assert_eq!(classify("estável"), RiskTier::Low);
        assert_eq!(RiskTier::Low.level(), 1);
    }

    #[test]
    fn underdog_keywords() {
        assert!(is_underdog_alert_worthy("Chance REAL de zebra"));
        assert!(is_underdog_alert_worthy("Grande"));
        assert!(!is_underdog_alert_worthy("Baixa"));
        assert!(!is_underdog_alert_worthy(""));
    }

    #[test]
    fn should_alert_without_report_is_false() {
        assert!(!should_alert(None));
    }

    #[test]
    fn underdog_signal_alerts_on_low_volatility() {
        let mut result = AnalysisResult::default();
        result.risks.volatility = "Baixa".to_string();
        result.risks.underdog_signals = "chance real de zebra".to_string();
        assert_eq!(classify(&result.risks.volatility), RiskTier::Low);
        assert!(should_alert(Some(&result)));

        result.risks.underdog_signals = "Nenhum sinal".to_string();
        assert!(!should_alert(Some(&result)));

        result.risks.volatility = "Alta".to_string();
        assert!(should_alert(Some(&result)));
    }
}

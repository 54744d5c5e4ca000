use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::AnalysisError;
use crate::report::{
    AnalysisResult, HiddenPatterns, HighValueTip, MAX_GROUNDING_URLS, PROBABILITY_KEYS,
    Probabilities, Psychology, Risks, SafeEntries, Statistics, Strategy, Trends,
};

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"```[A-Za-z0-9_+\-]*[ \t]*\r?\n?").expect("valid code fence pattern")
});

/// Reduces a raw model reply to a typed report.
///
/// The reply is untrusted: prose around the payload, markdown fences, trailing
/// commas and stringly-typed percentages are all tolerated. The eight
/// probability fields always come out numeric.
pub fn normalize(raw_text: &str, citations: &[String]) -> Result<AnalysisResult, AnalysisError> {
    let cleaned = strip_code_fences(raw_text);
    let payload = extract_payload(&cleaned)?;
    let root = parse_payload(payload)?;

    let mut result = build_result(&root);
    result.grounding_urls = dedupe_citations(citations);
    Ok(result)
}

pub fn strip_code_fences(raw: &str) -> String {
    CODE_FENCE.replace_all(raw, "").into_owned()
}

fn extract_payload(text: &str) -> Result<&str, AnalysisError> {
    let (Some(first), Some(last)) = (text.find('{'), text.rfind('}')) else {
        return Err(AnalysisError::malformed("no structured payload found"));
    };
    if last < first {
        return Err(AnalysisError::malformed("no structured payload found"));
    }
    Ok(&text[first..=last])
}

fn parse_payload(payload: &str) -> Result<Map<String, Value>, AnalysisError> {
    let parsed = match serde_json::from_str::<Value>(payload) {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!(error = %err, "payload rejected, retrying without trailing commas");
            let repaired = strip_trailing_commas(payload);
            serde_json::from_str::<Value>(&repaired)
                .map_err(|_| AnalysisError::malformed("unparseable payload"))?
        }
    };
    match parsed {
        Value::Object(map) => Ok(map),
        _ => Err(AnalysisError::malformed("unparseable payload")),
    }
}

/// Drops commas that sit directly before a closing `}` or `]`, ignoring
/// whitespace in between. String literals are copied untouched.
pub fn strip_trailing_commas(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    let mut in_string = false;
    let mut escaped = false;

    for (idx, &ch) in chars.iter().enumerate() {
        if in_string {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => {
                in_string = true;
                out.push(ch);
            }
            ',' => {
                let next = chars[idx + 1..].iter().find(|c| !c.is_whitespace());
                if !matches!(next, Some('}') | Some(']')) {
                    out.push(ch);
                }
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Numeric percentage for one probability slot; anything unusable becomes 0.
pub fn coerce_percentage(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(num)) => num.as_f64().unwrap_or(0.0),
        Some(Value::String(raw)) => parse_percentage_text(raw).unwrap_or(0.0),
        _ => 0.0,
    }
}

fn parse_percentage_text(raw: &str) -> Option<f64> {
    let kept: String = raw
        .chars()
        .filter(|ch| ch.is_ascii_digit() || *ch == '.' || *ch == ',')
        .collect();
    let kept = kept.replacen(',', ".", 1);

    // Longest prefix that still reads as a decimal number.
    let mut end = 0;
    let mut seen_dot = false;
    for (idx, ch) in kept.char_indices() {
        match ch {
            '0'..='9' => end = idx + 1,
            '.' if !seen_dot => {
                seen_dot = true;
                end = idx + 1;
            }
            _ => break,
        }
    }
    let num = kept[..end].parse::<f64>().ok()?;
    num.is_finite().then_some(num)
}

pub fn dedupe_citations(citations: &[String]) -> Option<Vec<String>> {
    let mut seen = HashSet::new();
    let urls: Vec<String> = citations
        .iter()
        .map(|url| url.trim())
        .filter(|url| !url.is_empty())
        .filter(|url| seen.insert(url.to_string()))
        .take(MAX_GROUNDING_URLS)
        .map(str::to_string)
        .collect();
    if urls.is_empty() { None } else { Some(urls) }
}

fn build_result(root: &Map<String, Value>) -> AnalysisResult {
    let empty = Map::new();
    let section = |key: &str| root.get(key).and_then(Value::as_object).unwrap_or(&empty);

    let statistics = section("statistics");
    let patterns = section("hiddenPatterns");
    let trends = section("trends");
    let psychology = section("psychology");
    let safe = section("safeEntries");
    let risks = section("risks");
    let strategy = section("strategy");

    AnalysisResult {
        match_title: text(root, "matchTitle"),
        high_value_tips: parse_tips(root.get("highValueTips")),
        statistics: Statistics {
            recent_performance: text(statistics, "recentPerformance"),
            last5_games_form: text(statistics, "last5GamesForm"),
            avg_goals_scored_conceded: text(statistics, "avgGoalsScoredConceded"),
            home_away_strength: text(statistics, "homeAwayStrength"),
            defensive_consistency: text(statistics, "defensiveConsistency"),
            offensive_aggression: text(statistics, "offensiveAggression"),
            goal_patterns: text(statistics, "goalPatterns"),
            open_closed_game_trends: text(statistics, "openClosedGameTrends"),
        },
        probabilities: parse_probabilities(root.get("probabilities")),
        hidden_patterns: HiddenPatterns {
            early_goal_team: text(patterns, "earlyGoalTeam"),
            late_goal_team: text(patterns, "lateGoalTeam"),
            concede_late_team: text(patterns, "concedeLateTeam"),
            shutoff_after_goal_team: text(patterns, "shutoffAfterGoalTeam"),
            pressure_peaks: text(patterns, "pressurePeaks"),
            dangerous_moments: text(patterns, "dangerousMoments"),
            live_entry_minutes: text(patterns, "liveEntryMinutes"),
        },
        trends: Trends {
            win_loss_sequence: text(trends, "winLossSequence"),
            games_without_scoring: text(trends, "gamesWithoutScoring"),
            games_without_conceding: text(trends, "gamesWithoutConceding"),
            performance_vs_similar: text(trends, "performanceVsSimilar"),
            evolution_or_decline: text(trends, "evolutionOrDecline"),
        },
        psychology: Psychology {
            motivation_pressure: text(psychology, "motivationPressure"),
            squad_morale: text(psychology, "squadMorale"),
            match_type: text(psychology, "matchType"),
            physical_wear: text(psychology, "physicalWear"),
            travel_fatigue: text(psychology, "travelFatigue"),
            psychological_climate: text(psychology, "psychologicalClimate"),
        },
        safe_entries: SafeEntries {
            best_pre_live: text(safe, "bestPreLive"),
            best_live: text(safe, "bestLive"),
            recommended_minutes: text(safe, "recommendedMinutes"),
            most_reliable_type: text(safe, "mostReliableType"),
            indicated_line: text(safe, "indicatedLine"),
        },
        risks: Risks {
            volatility: text(risks, "volatility"),
            inconsistency: text(risks, "inconsistency"),
            unpredictable_history: text(risks, "unpredictableHistory"),
            common_betting_gaffes: text(risks, "commonBettingGaffes"),
            underdog_signals: text(risks, "underdogSignals"),
        },
        strategy: Strategy {
            entry_plan: text(strategy, "entryPlan"),
            exit_plan: text(strategy, "exitPlan"),
            suggested_stake: text(strategy, "suggestedStake"),
            avoid: text(strategy, "avoid"),
            final_read: text(strategy, "finalRead"),
        },
        summary: text(root, "summary"),
        grounding_urls: None,
    }
}

fn parse_probabilities(value: Option<&Value>) -> Probabilities {
    let mut probs = Probabilities::default();
    let Some(obj) = value.and_then(Value::as_object) else {
        return probs;
    };
    for key in PROBABILITY_KEYS {
        probs.set(key, coerce_percentage(obj.get(key)));
    }
    probs
}

fn parse_tips(value: Option<&Value>) -> Vec<HighValueTip> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_object)
        .map(|tip| HighValueTip {
            market: text(tip, "market"),
            selection: text(tip, "selection"),
            probability: text(tip, "probability"),
            reason: text(tip, "reason"),
        })
        .collect()
}

fn text(obj: &Map<String, Value>, key: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn strips_fences_with_and_without_language_tag() {
        let raw = "```json\n{\"a\":1}\n```";
        assert_eq!(strip_code_fences(raw).trim(), "{\"a\":1}");
        assert_eq!(strip_code_fences("```{}```"), "{}");
    }

    #[test]
    fn repair_keeps_commas_inside_strings() {
        let raw = r#"{"a": "x,}", "b": [1, 2,],}"#;
        let fixed = strip_trailing_commas(raw);
        assert_eq!(fixed, r#"{"a": "x,}", "b": [1, 2]}"#);
    }

    #[test]
    fn repair_handles_escaped_quotes() {
        let raw = r#"{"a": "say \"hi\",", }"#;
        assert_eq!(strip_trailing_commas(raw), r#"{"a": "say \"hi\"," }"#);
    }

    #[test]
    fn percentage_strings_are_coerced() {
        assert_eq!(coerce_percentage(Some(&json!("72%"))), 72.0);
        assert_eq!(coerce_percentage(Some(&json!("1.234"))), 1.234);
        assert_eq!(coerce_percentage(Some(&json!("1,5"))), 1.5);
        assert_eq!(coerce_percentage(Some(&json!("~ 45.5 %"))), 45.5);
        assert_eq!(coerce_percentage(Some(&json!("1.2.3"))), 1.2);
        assert_eq!(coerce_percentage(Some(&json!(63))), 63.0);
    }

    #[test]
    fn unusable_percentages_become_zero() {
        assert_eq!(coerce_percentage(Some(&json!("alta"))), 0.0);
        assert_eq!(coerce_percentage(Some(&json!("."))), 0.0);
        assert_eq!(coerce_percentage(Some(&json!(null))), 0.0);
        assert_eq!(coerce_percentage(Some(&json!(true))), 0.0);
        assert_eq!(coerce_percentage(Some(&json!([50]))), 0.0);
        assert_eq!(coerce_percentage(None), 0.0);
    }

    #[test]
    fn citations_are_deduped_and_capped() {
        let urls: Vec<String> = ["a", "b", "a", "c", "d", "b", "e", "f"]
            .iter()
            .map(|s| format!("https://{s}.example"))
            .collect();
        let out = dedupe_citations(&urls).expect("non-empty");
        assert_eq!(
            out,
            vec![
                "https://a.example",
                "https://b.example",
                "https://c.example",
                "https://d.example",
                "https://e.example",
            ]
        );
        assert!(dedupe_citations(&[]).is_none());
    }

    #[test]
    fn reversed_braces_are_rejected() {
        let err = normalize("} nada {", &[]).unwrap_err();
        assert_eq!(err, AnalysisError::malformed("no structured payload found"));
    }

    #[test]
    fn non_string_text_fields_are_rendered() {
        let out = normalize(r#"{"matchTitle": 42, "summary": null}"#, &[]).expect("parses");
        assert_eq!(out.match_title, "42");
        assert_eq!(out.summary, "");
    }
}

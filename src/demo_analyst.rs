use std::thread;
use std::time::Duration;

use rand::Rng;
use serde_json::json;

use crate::error::AnalysisError;
use crate::orchestrator::{MatchAnalyst, ModelReply};

const VOLATILITY: &[&str] = &["Baixa", "Média", "Alta"];
const UNDERDOG: &[&str] = &[
    "Baixa - favorito consistente",
    "Moderada - visitante perigoso em contra-ataques",
    "Chance real de zebra - mandante em má fase",
];

/// Offline stand-in for the model. Replies the way a chatty model does:
/// prose, a fenced payload, string percentages and a trailing comma.
pub struct DemoAnalyst {
    latency: Duration,
}

impl Default for DemoAnalyst {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoAnalyst {
    pub fn new() -> Self {
        Self {
            latency: Duration::from_millis(900),
        }
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }
}

impl MatchAnalyst for DemoAnalyst {
    fn analyze(&self, query: &str) -> Result<ModelReply, AnalysisError> {
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
        let mut rng = rand::thread_rng();
        let (home, away) = split_teams(query);

        let (win_a, draw, win_b) = seed_result_probs(&mut rng);
        let over15 = rng.gen_range(55..90);
        let over25 = rng.gen_range(30..over15);
        let btts = rng.gen_range(35..70);
        let volatility = VOLATILITY[rng.gen_range(0..VOLATILITY.len())];
        let underdog = UNDERDOG[rng.gen_range(0..UNDERDOG.len())];

        let payload = json!({
            "matchTitle": format!("{home} vs {away}"),
            "highValueTips": [
                {
                    "market": "Gols",
                    "selection": "Over 1.5",
                    "probability": format!("{over15}%"),
                    "reason": "Média combinada acima de 2.6 gols nos últimos 5 jogos"
                },
                {
                    "market": "Escanteios",
                    "selection": "Over 8.5 Cantos",
                    "probability": "71%",
                    "reason": format!("{home} força jogo pelas pontas")
                },
                {
                    "market": "Resultado",
                    "selection": format!("{home} ou Empate"),
                    "probability": format!("{}%", (win_a + draw).round()),
                    "reason": "Mandante invicto em casa na temporada"
                }
            ],
            "statistics": {
                "recentPerformance": format!("{home} oscilando, {away} em recuperação"),
                "last5GamesForm": "V-E-D-V-V",
                "avgGoalsScoredConceded": "1.6 pró / 0.9 contra",
                "homeAwayStrength": format!("{home} forte em casa"),
                "defensiveConsistency": "Defesa sólida nas bolas aéreas",
                "offensiveAggression": "Pressão alta nos primeiros 20 minutos",
                "goalPatterns": "+gols no 2º tempo",
                "openClosedGameTrends": "Aberto"
            },
            "probabilities": {
                "winA": format!("{win_a:.0}%"),
                "draw": draw.round(),
                "winB": format!("{win_b:.0}"),
                "over15": over15,
                "over25": format!("{over25}%"),
                "btts": btts,
                "goalFirstHalf": rng.gen_range(50..80),
                "goalAfter75": format!("{},0", rng.gen_range(25..60))
            },
            "hiddenPatterns": {
                "earlyGoalTeam": home,
                "lateGoalTeam": away,
                "concedeLateTeam": away,
                "shutoffAfterGoalTeam": home,
                "pressurePeaks": "15'-30' e 70'-85'",
                "dangerousMoments": "Bolas paradas após os 60'",
                "liveEntryMinutes": "Entre 20' e 30'"
            },
            "trends": {
                "winLossSequence": "3 vitórias seguidas",
                "gamesWithoutScoring": "0",
                "gamesWithoutConceding": "2",
                "performanceVsSimilar": "Bom desempenho contra times do meio da tabela",
                "evolutionOrDecline": "Em evolução"
            },
            "psychology": {
                "motivationPressure": "Briga por vaga continental",
                "squadMorale": "Alta após vitória no clássico",
                "matchType": "Decisivo",
                "physicalWear": "4 dias de descanso",
                "travelFatigue": format!("{away} vem de viagem longa"),
                "psychologicalClimate": "Ambiente estável"
            },
            "safeEntries": {
                "bestPreLive": "Over 1.5 gols",
                "bestLive": "Próximo gol do mandante após 60'",
                "recommendedMinutes": "20'-35'",
                "mostReliableType": "Mercado de gols",
                "indicatedLine": "Over 2.0 asiático"
            },
            "risks": {
                "volatility": volatility,
                "inconsistency": "Rotação de elenco",
                "unpredictableHistory": "Confrontos diretos equilibrados",
                "commonBettingGaffes": "Evitar placar exato",
                "underdogSignals": underdog
            },
            "strategy": {
                "entryPlan": "Entrada pré-jogo em Over 1.5",
                "exitPlan": "Cashout parcial após o primeiro gol",
                "suggestedStake": "1.5 Unidades",
                "avoid": "Handicaps altos",
                "finalRead": format!("{home} deve controlar, mas {away} pune erros")
            },
            "summary": format!("Jogo com tendência de gols. {home} leve favorito.")
        });

        let body = serde_json::to_string_pretty(&payload)
            .map_err(|err| AnalysisError::malformed(err.to_string()))?;
        // Models love a dangling comma before the final brace.
        let body = match body.rfind('}') {
            Some(idx) => format!("{},\n}}", body[..idx].trim_end()),
            None => body,
        };
        let text = format!("Aqui está a análise solicitada:\n```json\n{body}\n```\nBoa sorte!");

        let slug = slugify(query);
        let citations = vec![
            format!("https://www.flashscore.com.br/busca/{slug}"),
            format!("https://www.sofascore.com/search/{slug}"),
            format!("https://www.flashscore.com.br/busca/{slug}"),
        ];
        Ok(ModelReply { text, citations })
    }
}

pub fn split_teams(query: &str) -> (String, String) {
    let trimmed = query.trim();
    for sep in [" vs ", " VS ", " x ", " X ", " - "] {
        if let Some((home, away)) = trimmed.split_once(sep) {
            let (home, away) = (home.trim(), away.trim());
            if !home.is_empty() && !away.is_empty() {
                return (home.to_string(), away.to_string());
            }
        }
    }
    (trimmed.to_string(), "Adversário".to_string())
}

fn seed_result_probs(rng: &mut impl Rng) -> (f64, f64, f64) {
    let home = 42.0 + rng.gen_range(-8.0..8.0);
    let draw = 28.0 + rng.gen_range(-4.0..4.0);
    let away = 30.0 + rng.gen_range(-8.0..8.0);
    let sum: f64 = home + draw + away;
    (home / sum * 100.0, draw / sum * 100.0, away / sum * 100.0)
}

fn slugify(query: &str) -> String {
    query
        .trim()
        .to_lowercase()
        .chars()
        .map(|ch| if ch.is_alphanumeric() { ch } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_teams_handles_common_separators() {
        assert_eq!(
            split_teams("Flamengo x Palmeiras"),
            ("Flamengo".to_string(), "Palmeiras".to_string())
        );
        assert_eq!(
            split_teams(" Real Madrid vs Barcelona "),
            ("Real Madrid".to_string(), "Barcelona".to_string())
        );
        assert_eq!(
            split_teams("https://flashscore.com/jogo/abc").1,
            "Adversário".to_string()
        );
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Grêmio  x Inter!"), "grêmio-x-inter");
    }
}

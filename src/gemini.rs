use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::{Value, json};

use crate::error::AnalysisError;
use crate::http_client::http_client;
use crate::orchestrator::{MatchAnalyst, ModelReply};

const API_KEY_HEADER: &str = "x-goog-api-key";
const BLOCKING_FINISH_REASONS: &[&str] = &["SAFETY", "PROHIBITED_CONTENT", "BLOCKLIST", "SPII"];

pub const SYSTEM_PROMPT: &str = r#"
Você é o BetMind Pro, um sistema de inteligência artificial especializado em análise de apostas esportivas.
Sua missão é fornecer uma análise tática e estatística detalhada para o confronto solicitado.

MODO DE URL/LINK:
Se o usuário fornecer um LINK ou URL (ex: bet365.com/..., flashscore.com/...), você deve:
1. Identificar imediatamente os times e o campeonato através do contexto do link.
2. Ignorar parâmetros de URL irrelevantes.
3. Realizar a análise completa para esse jogo identificado.

REGRAS CRÍTICAS DE SAÍDA:
1. Você deve retornar APENAS um objeto JSON válido.
2. NÃO inclua blocos de código markdown (```json).
3. NÃO escreva texto introdutório ou conclusivo fora do JSON.
4. Se a ferramenta de busca não retornar dados suficientes, use seu conhecimento interno e estatístico para PREENCHER TODOS OS CAMPOS com as melhores estimativas possíveis. NUNCA retorne um JSON incompleto ou vazio.
5. Os campos numéricos em "probabilities" devem ser números inteiros (ex: 45, não "45%").
6. Em "highValueTips", cruze tendências recentes com estatísticas para encontrar as 3 melhores oportunidades matemáticas.
7. CRUCIAL: No campo "strategy.suggestedStake", seja numérico e direto (Ex: "1.5 Unidades" ou "2% da Banca").

Estrutura do JSON (Preencha todos os campos em Português do Brasil):
{
  "matchTitle": "Time A vs Time B - Campeonato",
  "highValueTips": [
    {
      "market": "Mercado (ex: Escanteios, Gols, Resultado)",
      "selection": "Aposta (ex: Over 9.5 Cantos)",
      "probability": "Probabilidade estimada (ex: 85%)",
      "reason": "Motivo curto baseado em estatística"
    },
    { "market": "...", "selection": "...", "probability": "...", "reason": "..." },
    { "market": "...", "selection": "...", "probability": "...", "reason": "..." }
  ],
  "statistics": {
     "recentPerformance": "Texto curto sobre fase recente",
     "last5GamesForm": "Ex: V-E-D-V-V",
     "avgGoalsScoredConceded": "Ex: 1.5 pró / 0.8 contra",
     "homeAwayStrength": "Texto sobre força mandante/visitante",
     "defensiveConsistency": "Análise da defesa",
     "offensiveAggression": "Análise do ataque",
     "goalPatterns": "Padrão (ex: +gols no 2º tempo)",
     "openClosedGameTrends": "Tendência (Aberto/Truncado)"
  },
  "probabilities": {
    "winA": 0,
    "draw": 0,
    "winB": 0,
    "over15": 0,
    "over25": 0,
    "btts": 0,
    "goalFirstHalf": 0,
    "goalAfter75": 0
  },
  "hiddenPatterns": {
    "earlyGoalTeam": "Quem costuma marcar cedo",
    "lateGoalTeam": "Quem marca no final",
    "concedeLateTeam": "Quem sofre no final",
    "shutoffAfterGoalTeam": "Quem recua após gol",
    "pressurePeaks": "Minutos de maior pressão",
    "dangerousMoments": "Momentos críticos",
    "liveEntryMinutes": "Melhor momento para entrar ao vivo"
  },
  "trends": {
    "winLossSequence": "Sequência atual",
    "gamesWithoutScoring": "Jogos sem marcar",
    "gamesWithoutConceding": "Jogos sem sofrer",
    "performanceVsSimilar": "Desempenho em jogos parecidos",
    "evolutionOrDecline": "Momento atual"
  },
  "psychology": {
    "motivationPressure": "Motivação e pressão (Identifique o porquê)",
    "squadMorale": "Moral do elenco (Alta/Baixa e motivo)",
    "matchType": "Tipo de jogo (Decisivo/Amistoso/Clássico)",
    "physicalWear": "Desgaste físico (Dias de descanso)",
    "travelFatigue": "Impacto de viagens recentes",
    "psychologicalClimate": "Clima interno/Notícias recentes"
  },
  "safeEntries": {
    "bestPreLive": "A MELHOR aposta pré-jogo (Seja específico)",
    "bestLive": "Melhor oportunidade ao vivo",
    "recommendedMinutes": "Minutos para observar",
    "mostReliableType": "Mercado mais seguro",
    "indicatedLine": "Linha recomendada (ex: Over 2.0)"
  },
  "risks": {
    "volatility": "Baixa/Média/Alta/Extrema",
    "inconsistency": "Fatores de inconsistência",
    "unpredictableHistory": "Histórico direto",
    "commonBettingGaffes": "O que evitar",
    "underdogSignals": "Chance de zebra (Alta/Baixa e justificativa)"
  },
  "strategy": {
    "entryPlan": "Resumo da entrada principal",
    "exitPlan": "Plano de saída/Cashout",
    "suggestedStake": "VALOR DA APOSTA (Ex: 1 Unidade, 2%, 0.5u)",
    "avoid": "Mercados para evitar",
    "finalRead": "Leitura final resumida"
  },
  "summary": "Resumo executivo da análise em 2 frases."
}
"#;

/// Gemini `generateContent` with the Google Search tool enabled.
pub struct GeminiAnalyst {
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiAnalyst {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn endpoint_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn post(&self, client: &Client, body: &Value) -> Result<String, AnalysisError> {
        let resp = client
            .post(self.endpoint_url())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(body)
            .send()
            .map_err(|err| AnalysisError::network(format!("request failed: {}", err.without_url())))?;
        let status = resp.status();
        let text = resp
            .text()
            .map_err(|err| {
                AnalysisError::network(format!("failed reading body: {}", err.without_url()))
            })?;
        if !status.is_success() {
            if text.contains("SAFETY") {
                return Err(AnalysisError::SafetyBlocked);
            }
            return Err(AnalysisError::network(format!(
                "http {}: {}",
                status,
                error_message(&text)
            )));
        }
        Ok(text)
    }
}

impl MatchAnalyst for GeminiAnalyst {
    fn analyze(&self, query: &str) -> Result<ModelReply, AnalysisError> {
        let client = http_client(self.timeout).map_err(|err| AnalysisError::network(err.to_string()))?;
        let body = build_request_body(query);
        tracing::info!(model = %self.model, "sending analysis request");
        let raw = self.post(client, &body)?;
        let reply = parse_generate_content(&raw)?;
        tracing::debug!(chars = reply.text.len(), citations = reply.citations.len(), "model replied");
        Ok(reply)
    }
}

pub fn build_request_body(query: &str) -> Value {
    json!({
        "systemInstruction": {
            "parts": [{ "text": SYSTEM_PROMPT }]
        },
        "contents": [{
            "role": "user",
            "parts": [{
                "text": format!("Analise o seguinte pedido (pode ser nome do jogo ou LINK/URL): {query}")
            }]
        }],
        "tools": [{ "google_search": {} }]
    })
}

/// Pulls reply text and grounding citations out of a `generateContent` body.
pub fn parse_generate_content(raw: &str) -> Result<ModelReply, AnalysisError> {
    let root: Value = serde_json::from_str(raw)
        .map_err(|err| AnalysisError::network(format!("invalid response envelope: {err}")))?;

    if root
        .get("promptFeedback")
        .and_then(|v| v.get("blockReason"))
        .and_then(Value::as_str)
        .is_some_and(|reason| !reason.is_empty())
    {
        return Err(AnalysisError::SafetyBlocked);
    }

    let candidate = root
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|c| c.first())
        .unwrap_or(&Value::Null);

    let text = candidate
        .get("content")
        .and_then(|c| c.get("parts"))
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect::<String>()
        })
        .unwrap_or_default();

    let finish_reason = candidate
        .get("finishReason")
        .and_then(Value::as_str)
        .unwrap_or_default();
    // A safety stop wins even when partial text came through.
    if BLOCKING_FINISH_REASONS.contains(&finish_reason) {
        return Err(AnalysisError::SafetyBlocked);
    }
    if text.trim().is_empty() {
        return Err(AnalysisError::malformed("empty response"));
    }

    let citations = candidate
        .get("groundingMetadata")
        .and_then(|m| m.get("groundingChunks"))
        .and_then(Value::as_array)
        .map(|chunks| {
            chunks
                .iter()
                .filter_map(|chunk| chunk.get("web").and_then(|w| w.get("uri")))
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(ModelReply { text, citations })
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_carries_prompt_query_and_search_tool() {
        let body = build_request_body("Flamengo x Palmeiras");
        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"].as_str(),
            Some(SYSTEM_PROMPT)
        );
        let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.ends_with("Flamengo x Palmeiras"));
        assert!(body["tools"][0].get("google_search").is_some());
    }

    #[test]
    fn prompt_block_is_safety() {
        let raw = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        assert_eq!(parse_generate_content(raw), Err(AnalysisError::SafetyBlocked));
    }

    #[test]
    fn empty_candidate_with_safety_finish_is_safety() {
        let raw = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        assert_eq!(parse_generate_content(raw), Err(AnalysisError::SafetyBlocked));
    }

    #[test]
    fn empty_text_is_malformed() {
        let raw = r#"{"candidates": [{"content": {"parts": []}, "finishReason": "STOP"}]}"#;
        assert_eq!(
            parse_generate_content(raw),
            Err(AnalysisError::malformed("empty response"))
        );
    }

    #[test]
    fn endpoint_url_keeps_key_out_of_the_url() {
        let analyst = GeminiAnalyst::new("SECRET_KEY_123", "m", "http://127.0.0.1:1/", Duration::from_secs(10));
        let url = analyst.endpoint_url();
        assert_eq!(url, "http://127.0.0.1:1/models/m:generateContent");
        assert!(!url.contains("SECRET_KEY_123"));
    }

    #[test]
    fn transport_failure_does_not_leak_key() {
        let analyst = GeminiAnalyst::new("SECRET_KEY_123", "m", "http://127.0.0.1:1", Duration::from_secs(10));
        let err = analyst.analyze("A vs B").unwrap_err();
        assert!(matches!(err, AnalysisError::NetworkFailure(_)));
        assert!(!err.user_message().contains("SECRET_KEY_123"));
        assert!(!err.to_string().contains("SECRET_KEY_123"));
    }

    #[test]
    fn error_message_prefers_api_message() {
        assert_eq!(
            error_message(r#"{"error": {"code": 400, "message": "API key not valid"}}"#),
            "API key not valid"
        );
        assert_eq!(error_message("gateway down"), "gateway down");
    }
}

// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gemini `generateContent` client.
//!
//! Serves two roles: closed-set intent classification and short free-text
//! answers to questions about the service.

use std::time::Duration;

use async_trait::async_trait;
use meterwise_config::model::ClassifierConfig;
use meterwise_core::{
    AdapterType, FaqResponder, HealthStatus, Intent, IntentClassifier, MeterwiseError,
    PluginAdapter,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Reply used when no API key is configured.
pub const FAQ_UNAVAILABLE: &str = "Lo siento, mi módulo de IA no está disponible en este momento.";

const CLASSIFY_PROMPT: &str = r#"Eres el asistente de un servicio de monitoreo de energía eléctrica.
Clasifica el mensaje del usuario en UNA de estas categorías y responde SOLAMENTE con un objeto JSON {"intent": "<categoría>"}.

- "soporte_humano": está frustrado, quiere cancelar o pide hablar con una persona.
- "pedir_proyeccion_pago": cuánto va a pagar en su próximo recibo.
- "pedir_diagnostico_fuga_tierra": si tiene una fuga de corriente a tierra.
- "pedir_diagnostico_fantasma": consumo fantasma, vampiro o consumo base nocturno.
- "pedir_diagnostico_voltaje": si su voltaje es normal, alto o bajo.
- "pedir_hora_pico": a qué hora del día consume más.
- "pedir_fecha_corte_cfe": cuándo es su fecha de corte con la compañía eléctrica.
- "pedir_pago_cuentatron": cuándo se renueva o paga su suscripción al servicio.
- "faq_servicios_empresa": servicios que no ofrecemos (instalaciones, reparaciones).
- "pedir_consumo_hoy": cuánto ha consumido hoy.
- "pedir_consumo_ayer": cuánto consumió ayer.
- "pedir_voltaje": el voltaje actual.
- "pedir_watts": la potencia actual en watts.
- "pedir_grafica_ayer": una gráfica del consumo de ayer.
- "pedir_grafica_semanal": una gráfica del consumo de la semana.
- "desconocido": saludos, agradecimientos o cualquier otra cosa.

Mensaje del usuario:
"#;

const FAQ_PROMPT: &str = "Eres el asistente de un servicio de monitoreo de energía eléctrica. \
Nuestro servicio solo monitorea el consumo; NO reparamos ni instalamos nada. \
Responde la pregunta del usuario de forma breve y amable, dejando claro que solo monitoreamos.\n\nPregunta:\n";

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IntentReply {
    #[serde(alias = "intencion")]
    intent: String,
}

/// Gemini client. Without an API key it classifies everything as
/// [`Intent::Unknown`] and answers FAQs with [`FAQ_UNAVAILABLE`].
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(config: &ClassifierConfig) -> Result<Self, MeterwiseError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MeterwiseError::Classifier {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Sends one prompt and returns the concatenated text parts.
    async fn generate(
        &self,
        api_key: &str,
        prompt: String,
        json_output: bool,
    ) -> Result<String, MeterwiseError> {
        let mut body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });
        if json_output {
            body["generationConfig"] = json!({ "responseMimeType": "application/json" });
        }

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.endpoint, self.model
            ))
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| MeterwiseError::Classifier {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MeterwiseError::classifier(format!(
                "Gemini returned {status}: {body}"
            )));
        }

        let parsed: GenerateResponse =
            response.json().await.map_err(|e| MeterwiseError::Classifier {
                message: format!("failed to parse Gemini response: {e}"),
                source: Some(Box::new(e)),
            })?;
        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(MeterwiseError::classifier("Gemini returned no text"));
        }
        Ok(text)
    }
}

/// Removes markdown code fences the model sometimes wraps JSON in.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

/// Parses `{"intent": "<label>"}`; unrecognised labels become `Unknown`.
pub fn parse_intent_reply(text: &str) -> Result<Intent, MeterwiseError> {
    let reply: IntentReply =
        serde_json::from_str(strip_code_fences(text)).map_err(|e| MeterwiseError::Classifier {
            message: format!("unparseable classifier output: {text}"),
            source: Some(Box::new(e)),
        })?;
    Ok(Intent::from_label(&reply.intent))
}

#[async_trait]
impl PluginAdapter for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Classifier
    }

    async fn health_check(&self) -> Result<HealthStatus, MeterwiseError> {
        Ok(if self.is_configured() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded("no classifier API key configured".into())
        })
    }

    async fn shutdown(&self) -> Result<(), MeterwiseError> {
        Ok(())
    }
}

#[async_trait]
impl IntentClassifier for GeminiClient {
    async fn classify(&self, text: &str) -> Result<Intent, MeterwiseError> {
        let Some(api_key) = &self.api_key else {
            warn!("classifier API key missing, treating message as unknown");
            return Ok(Intent::Unknown);
        };
        let raw = self
            .generate(api_key, format!("{CLASSIFY_PROMPT}\"{text}\""), true)
            .await?;
        let intent = parse_intent_reply(&raw)?;
        debug!(intent = intent.label(), "message classified");
        Ok(intent)
    }
}

#[async_trait]
impl FaqResponder for GeminiClient {
    async fn answer(&self, question: &str) -> Result<String, MeterwiseError> {
        let Some(api_key) = &self.api_key else {
            return Ok(FAQ_UNAVAILABLE.to_string());
        };
        let text = self
            .generate(api_key, format!("{FAQ_PROMPT}\"{question}\""), false)
            .await?;
        Ok(text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fence() {
        assert_eq!(
            strip_code_fences("```json\n{\"intent\": \"pedir_watts\"}\n```"),
            "{\"intent\": \"pedir_watts\"}"
        );
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {}  "), "{}");
    }

    #[test]
    fn parses_intent_and_legacy_key() {
        assert_eq!(
            parse_intent_reply("{\"intent\": \"pedir_hora_pico\"}").unwrap(),
            Intent::PeakHour
        );
        assert_eq!(
            parse_intent_reply("```json\n{\"intencion\": \"soporte_humano\"}\n```").unwrap(),
            Intent::HumanSupport
        );
    }

    #[test]
    fn unknown_label_is_unknown_not_error() {
        assert_eq!(
            parse_intent_reply("{\"intent\": \"pedir_pizza\"}").unwrap(),
            Intent::Unknown
        );
    }

    #[test]
    fn prose_is_an_error() {
        assert!(parse_intent_reply("Creo que quiere saber su voltaje").is_err());
    }
}

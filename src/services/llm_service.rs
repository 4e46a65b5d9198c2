//! Text-generation service - capability layer.
//!
//! Expands one free-text bug description into a structured report. Several
//! providers are tried in a fixed preference order: an OpenAI-compatible API
//! (when a key is configured), a local g4f HTTP server, and finally a
//! deterministic canned answer so the pipeline never dies just because no
//! provider is reachable.
//!
//! ## Stack
//! - `async-openai` for OpenAI-compatible endpoints
//! - `reqwest` for the g4f fallback server

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::BugReport;
use crate::services::report_parser;

/// Prompt that asks the model for the structure the parser expects.
const BASE_PROMPT: &str = "Ты помощник QA-инженера. Разверни краткое описание бага \
в структурированный отчет строго в таком формате:\n\
**Название:** <краткое название>\n\
**Описание:** <подробное описание>\n\
**Шаги для воспроизведения:** <нумерованные шаги>\n\
**Ожидаемый результат:** <что должно происходить>\n\
**Фактический результат:** <что происходит на самом деле>\n\
**Тестовое окружение:** <приложение, ОС, оборудование>\n\n\
Вот мое описание бага:";

/// One provider in the chain.
enum Provider {
    OpenAi {
        client: Client<OpenAIConfig>,
        model: String,
    },
    G4f {
        http: reqwest::Client,
        base_url: String,
    },
    /// Last resort: a canned structured answer built from the input itself.
    Mock,
}

impl Provider {
    fn name(&self) -> &'static str {
        match self {
            Provider::OpenAi { .. } => "openai",
            Provider::G4f { .. } => "g4f",
            Provider::Mock => "mock",
        }
    }
}

#[derive(Deserialize)]
struct G4fResponse {
    response: String,
}

/// Text-generation provider chain.
pub struct LlmService {
    providers: Vec<Provider>,
}

impl LlmService {
    pub fn new(config: &Config) -> Self {
        let mut providers = Vec::new();

        if !config.llm_api_key.is_empty() {
            let openai_config = OpenAIConfig::new()
                .with_api_key(&config.llm_api_key)
                .with_api_base(&config.llm_api_base_url);
            providers.push(Provider::OpenAi {
                client: Client::with_config(openai_config),
                model: config.llm_model_name.clone(),
            });
        }

        providers.push(Provider::G4f {
            http: reqwest::Client::new(),
            base_url: config.g4f_server_url.clone(),
        });
        providers.push(Provider::Mock);

        Self { providers }
    }

    /// Sends the prompt down the chain until some provider answers.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let mut last_error = String::new();

        for provider in &self.providers {
            debug!("trying provider: {}", provider.name());
            match self.call_provider(provider, prompt).await {
                Ok(response) => {
                    info!("✓ provider {} answered", provider.name());
                    return Ok(response);
                }
                Err(e) => {
                    warn!("provider {} failed: {}", provider.name(), e);
                    last_error = e.to_string();
                }
            }
        }

        Err(AppError::Llm(last_error))
    }

    /// Expands free text into a structured bug report.
    pub async fn expand_bug_description(&self, free_text: &str) -> Result<BugReport> {
        let prompt = format!("{}\n{}", BASE_PROMPT, free_text);
        let response = self.generate(&prompt).await?;
        report_parser::extract_report(&response).ok_or(AppError::ReportParse)
    }

    async fn call_provider(&self, provider: &Provider, prompt: &str) -> Result<String> {
        match provider {
            Provider::OpenAi { client, model } => {
                let user_msg = ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt)
                    .build()
                    .map_err(|e| AppError::Llm(e.to_string()))?;

                let request = CreateChatCompletionRequestArgs::default()
                    .model(model)
                    .messages(vec![ChatCompletionRequestMessage::User(user_msg)])
                    .temperature(0.3)
                    .max_tokens(1024u32)
                    .build()
                    .map_err(|e| AppError::Llm(e.to_string()))?;

                let response = client
                    .chat()
                    .create(request)
                    .await
                    .map_err(|e| AppError::Llm(e.to_string()))?;

                response
                    .choices
                    .first()
                    .and_then(|choice| choice.message.content.clone())
                    .map(|content| content.trim().to_string())
                    .ok_or_else(|| AppError::Llm("empty completion".to_string()))
            }
            Provider::G4f { http, base_url } => {
                let body: G4fResponse = http
                    .post(format!("{}/chat", base_url))
                    .json(&serde_json::json!({ "prompt": prompt }))
                    .send()
                    .await
                    .map_err(|e| AppError::Llm(e.to_string()))?
                    .error_for_status()
                    .map_err(|e| AppError::Llm(e.to_string()))?
                    .json()
                    .await
                    .map_err(|e| AppError::Llm(e.to_string()))?;
                Ok(body.response)
            }
            Provider::Mock => Ok(mock_response(prompt)),
        }
    }
}

/// Canned structured answer derived from the prompt's bug description.
fn mock_response(prompt: &str) -> String {
    let description = prompt
        .split("Вот мое описание бага:")
        .nth(1)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("Неизвестная проблема");

    let title: String = description.chars().take(50).collect();

    format!(
        "**Название:** {title}\n\
         **Описание:** {description}\n\
         **Шаги для воспроизведения:** 1. Открыть приложение\n2. Воспроизвести условия\n3. Наблюдать за результатом\n\
         **Ожидаемый результат:** Система работает корректно\n\
         **Фактический результат:** {description}\n\
         **Тестовое окружение:** Приложение: LTO 2.0, ОС: Android 10+, Оборудование: лазертаг система"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_response_embeds_the_reported_problem() {
        let prompt = format!("{}\nэкран мигает при входе", BASE_PROMPT);
        let response = mock_response(&prompt);
        assert!(response.contains("**Название:** экран мигает при входе"));
        assert!(response.contains("**Тестовое окружение:**"));
    }

    #[tokio::test]
    async fn chain_always_ends_with_a_usable_answer() {
        // No API key and no g4f server running: the mock must still answer.
        let config = Config {
            g4f_server_url: "http://127.0.0.1:1".to_string(),
            ..Config::default()
        };
        let service = LlmService::new(&config);
        let report = service
            .expand_bug_description("кнопка выхода не работает")
            .await
            .unwrap();
        assert!(report.title.contains("кнопка выхода"));
    }
}

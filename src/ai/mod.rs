/// Writing assistance backed by an external language model
///
/// Prompts are sanitized, wrapped in a fixed persona and forwarded to a
/// [`TextCompletion`] backend. Failures are logged and reported as
/// `AppError::Upstream`; nothing is retried.

mod client;
mod persona;

pub use client::{CompletionRequest, OpenAiClient, TextCompletion};

use crate::{
    account::User,
    config::AiConfig,
    error::{AppError, AppResult},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Longest prompt forwarded upstream, in characters
pub const MAX_PROMPT_CHARS: usize = 4000;
/// Longest term accepted by the explainer
pub const MAX_TERM_CHARS: usize = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct AssistRequest {
    pub prompt: String,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistResponse {
    pub suggestion: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExplainRequest {
    pub word: String,
    #[serde(default)]
    pub context: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainResponse {
    pub explanation: String,
}

/// Strip control characters other than newline and tab, trim, and cap length
pub fn sanitize(input: &str, max_chars: usize) -> String {
    input
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect::<String>()
        .trim()
        .chars()
        .take(max_chars)
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Language model proxy
#[derive(Clone)]
pub struct AiAssistant {
    backend: Option<Arc<dyn TextCompletion>>,
    max_tokens: u32,
}

impl AiAssistant {
    /// Build from configuration; without an API key every call fails upstream
    pub fn new(config: &AiConfig) -> AppResult<Self> {
        let backend = match config.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => {
                let client: Arc<dyn TextCompletion> =
                    Arc::new(OpenAiClient::new(config, key.to_string())?);
                Some(client)
            }
            _ => {
                tracing::warn!("LLM_API_KEY not set, AI endpoints will fail");
                None
            }
        };

        Ok(Self {
            backend,
            max_tokens: config.max_tokens,
        })
    }

    pub fn with_backend(backend: Arc<dyn TextCompletion>, max_tokens: u32) -> Self {
        Self {
            backend: Some(backend),
            max_tokens,
        }
    }

    /// Suggest wording for a review, optionally given the current draft
    pub async fn assist(&self, user: &User, req: AssistRequest) -> AppResult<AssistResponse> {
        let prompt = sanitize(&req.prompt, MAX_PROMPT_CHARS);
        if prompt.is_empty() {
            return Err(AppError::Validation("prompt must not be empty".to_string()));
        }
        let context = req
            .context
            .map(|c| sanitize(&c, MAX_PROMPT_CHARS))
            .filter(|c| !c.is_empty());

        let suggestion = self
            .complete(
                "assist",
                persona::WRITING_ASSISTANT,
                persona::assist_prompt(&prompt, context.as_deref()),
            )
            .await?;

        tracing::debug!("AI suggestion generated for user {}", user.id);

        Ok(AssistResponse { suggestion })
    }

    /// Explain a game term in the sentence it appeared in
    pub async fn explain(&self, req: ExplainRequest) -> AppResult<ExplainResponse> {
        let word = sanitize(&req.word, MAX_TERM_CHARS);
        if word.is_empty() {
            return Err(AppError::Validation("word must not be empty".to_string()));
        }
        let context = sanitize(&req.context, MAX_PROMPT_CHARS);

        let explanation = self
            .complete(
                "explain",
                persona::TERM_EXPLAINER,
                persona::explain_prompt(&word, &context),
            )
            .await?;

        Ok(ExplainResponse { explanation })
    }

    async fn complete(&self, kind: &str, system: &str, prompt: String) -> AppResult<String> {
        let Some(backend) = &self.backend else {
            tracing::error!("AI {} failed: no language model configured", kind);
            return Err(AppError::Upstream("No language model configured".to_string()));
        };

        let request = CompletionRequest {
            system: system.to_string(),
            prompt,
            max_tokens: self.max_tokens,
        };

        backend.complete(request).await.map_err(|e| {
            tracing::error!("AI {} failed: {}", kind, e);
            match e {
                AppError::Upstream(_) => e,
                other => AppError::Upstream(other.to_string()),
            }
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    /// Records requests and answers with a canned reply
    pub(crate) struct FakeCompletion {
        reply: Option<String>,
        pub seen: Mutex<Vec<CompletionRequest>>,
    }

    impl FakeCompletion {
        pub(crate) fn replying(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                reply: None,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextCompletion for FakeCompletion {
        async fn complete(&self, request: CompletionRequest) -> AppResult<String> {
            self.seen.lock().unwrap().push(request);
            self.reply
                .clone()
                .ok_or_else(|| AppError::Upstream("connection reset".to_string()))
        }
    }

    fn user() -> User {
        User {
            id: "u1".to_string(),
            email: "u1@example.com".to_string(),
            username: "writer".to_string(),
            bio: None,
            avatar_url: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("  hello\u{0}\u{7} world \n", 100), "hello world");
        assert_eq!(sanitize("line one\nline\ttwo", 100), "line one\nline\ttwo");
        assert_eq!(sanitize("abcdef", 3), "abc");
        assert_eq!(sanitize("\u{1b}  ", 10), "");
    }

    #[tokio::test]
    async fn test_assist_prefixes_context() {
        let fake = Arc::new(FakeCompletion::replying("Daha canlı bir giriş deneyin."));
        let assistant = AiAssistant::with_backend(fake.clone(), 200);

        let response = assistant
            .assist(
                &user(),
                AssistRequest {
                    prompt: "Girişi güçlendir".to_string(),
                    context: Some("Bu oyun harika.".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(response.suggestion, "Daha canlı bir giriş deneyin.");

        let seen = fake.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].system, persona::WRITING_ASSISTANT);
        assert_eq!(seen[0].max_tokens, 200);
        let draft_at = seen[0].prompt.find("Bu oyun harika.").unwrap();
        let request_at = seen[0].prompt.find("Girişi güçlendir").unwrap();
        assert!(draft_at < request_at);
    }

    #[tokio::test]
    async fn test_assist_without_context_sends_prompt_only() {
        let fake = Arc::new(FakeCompletion::replying("ok"));
        let assistant = AiAssistant::with_backend(fake.clone(), 200);

        assistant
            .assist(
                &user(),
                AssistRequest {
                    prompt: "Bir başlık öner".to_string(),
                    context: Some("   ".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(fake.seen.lock().unwrap()[0].prompt, "Bir başlık öner");
    }

    #[tokio::test]
    async fn test_explain_uses_explainer_persona() {
        let fake = Arc::new(FakeCompletion::replying("Nerf, bir karakterin zayıflatılmasıdır."));
        let assistant = AiAssistant::with_backend(fake.clone(), 200);

        let response = assistant
            .explain(ExplainRequest {
                word: "nerf".to_string(),
                context: "Son yamada kılıç nerf yedi.".to_string(),
            })
            .await
            .unwrap();
        assert!(response.explanation.starts_with("Nerf"));

        let seen = fake.seen.lock().unwrap();
        assert_eq!(seen[0].system, persona::TERM_EXPLAINER);
        assert!(seen[0].prompt.contains("\"nerf\""));
    }

    #[tokio::test]
    async fn test_failures_surface_as_upstream() {
        let assistant = AiAssistant::with_backend(Arc::new(FakeCompletion::failing()), 200);
        let result = assistant
            .explain(ExplainRequest {
                word: "meta".to_string(),
                context: String::new(),
            })
            .await;
        assert!(matches!(result, Err(AppError::Upstream(_))));

        let unconfigured = AiAssistant::new(&crate::config::test_config().ai).unwrap();
        let result = unconfigured
            .assist(
                &user(),
                AssistRequest {
                    prompt: "help".to_string(),
                    context: None,
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Upstream(_))));
    }

    #[tokio::test]
    async fn test_blank_prompt_rejected_before_upstream() {
        let fake = Arc::new(FakeCompletion::replying("unused"));
        let assistant = AiAssistant::with_backend(fake.clone(), 200);

        let result = assistant
            .assist(
                &user(),
                AssistRequest {
                    prompt: "\u{0} ".to_string(),
                    context: None,
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(fake.seen.lock().unwrap().is_empty());
    }
}

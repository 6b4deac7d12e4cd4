//! Conversation log between the user and the audit assistant

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use obra_core::ConstructionState;

use crate::{build_prompt, state_digest, LanguageModel, SYSTEM_INSTRUCTION};

pub const GREETING: &str = "¡Hola! Soy tu Asistente de Control de Obra. Puedo analizar el desvío \
entre el avance físico y el financiero de tus expedientes. ¿Qué obra te preocupa hoy?";

/// Reply used when the model returns no text
pub const EMPTY_REPLY: &str = "No pude analizar los datos.";

/// Reply used when the model call fails
pub const CONNECTION_ERROR_REPLY: &str = "Hubo un error al conectar con el cerebro IA.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    fn new(role: Role, content: impl Into<String>) -> Self {
        ChatMessage {
            role,
            content: content.into(),
        }
    }
}

/// Question/answer session over a language model.
///
/// Model failures never surface as errors: they are logged and a fixed
/// reply is appended, so every accepted question gets exactly one answer.
pub struct Assistant {
    model: Arc<dyn LanguageModel>,
    messages: Vec<ChatMessage>,
}

impl Assistant {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Assistant {
            model,
            messages: vec![ChatMessage::new(Role::Assistant, GREETING)],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Ask a question about `state`. Blank questions are ignored and
    /// return `None`; otherwise the appended reply is returned.
    pub async fn ask(&mut self, question: &str, state: &ConstructionState) -> Option<&ChatMessage> {
        let question = question.trim();
        if question.is_empty() {
            return None;
        }
        self.messages.push(ChatMessage::new(Role::User, question));

        let prompt = build_prompt(&state_digest(state), question);
        let reply = match self.model.generate(SYSTEM_INSTRUCTION, &prompt).await {
            Ok(text) if text.trim().is_empty() => EMPTY_REPLY.to_string(),
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "assistant call failed");
                CONNECTION_ERROR_REPLY.to_string()
            }
        };
        info!(messages = self.messages.len() + 1, "assistant replied");

        self.messages.push(ChatMessage::new(Role::Assistant, reply));
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AssistantError, AssistantResult};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Returns canned replies in order and records the prompts it saw
    struct ScriptedModel {
        replies: Mutex<Vec<AssistantResult<String>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        fn new(replies: Vec<AssistantResult<String>>) -> Arc<Self> {
            Arc::new(ScriptedModel {
                replies: Mutex::new(replies.into_iter().rev().collect()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn generate(&self, system: &str, prompt: &str) -> AssistantResult<String> {
            assert_eq!(system, SYSTEM_INSTRUCTION);
            self.prompts.lock().push(prompt.to_string());
            self.replies.lock().pop().unwrap_or(Ok(String::new()))
        }
    }

    #[tokio::test]
    async fn test_starts_with_greeting() {
        let assistant = Assistant::new(ScriptedModel::new(vec![]));
        assert_eq!(
            assistant.messages(),
            &[ChatMessage::new(Role::Assistant, GREETING)]
        );
    }

    #[tokio::test]
    async fn test_question_and_reply_appended() {
        let model = ScriptedModel::new(vec![Ok("Sin desvíos.".to_string())]);
        let mut assistant = Assistant::new(model.clone());

        let reply = assistant
            .ask("  ¿Hay deuda?  ", &ConstructionState::default())
            .await
            .unwrap();
        assert_eq!(reply.content, "Sin desvíos.");

        let messages = assistant.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1], ChatMessage::new(Role::User, "¿Hay deuda?"));

        let prompts = model.prompts.lock();
        assert!(prompts[0].starts_with("CONTEXTO DE DATOS:\nPROYECTOS: "));
        assert!(prompts[0].ends_with("PREGUNTA USUARIO: ¿Hay deuda?"));
    }

    #[tokio::test]
    async fn test_blank_question_ignored() {
        let model = ScriptedModel::new(vec![]);
        let mut assistant = Assistant::new(model.clone());

        assert!(assistant.ask("   ", &ConstructionState::default()).await.is_none());
        assert_eq!(assistant.messages().len(), 1);
        assert!(model.prompts.lock().is_empty());
    }

    #[tokio::test]
    async fn test_empty_and_failed_replies() {
        let model = ScriptedModel::new(vec![
            Ok(" ".to_string()),
            Err(AssistantError::Api {
                status: 500,
                body: "boom".into(),
            }),
        ]);
        let mut assistant = Assistant::new(model);
        let state = ConstructionState::default();

        let first = assistant.ask("uno", &state).await.unwrap().content.clone();
        assert_eq!(first, EMPTY_REPLY);

        let second = assistant.ask("dos", &state).await.unwrap().content.clone();
        assert_eq!(second, CONNECTION_ERROR_REPLY);
        assert_eq!(assistant.messages().len(), 5);
    }
}

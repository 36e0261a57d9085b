//! Per-conversation state and turn driving.
//!
//! A `ChatSession` owns its settings and transcript exclusively; it is
//! created on conversation start, passed into the handlers that need it,
//! and dropped when the session ends. Nothing here is shared across
//! sessions, so no locking discipline is required.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{ParleyError, Result};
use crate::llm::{ChatRequest, LanguageModel, TextStream};
use crate::memory::ConversationMemory;
use crate::message::Message;
use crate::persona::Persona;
use crate::prompt;
use crate::settings::ChatSettings;

pub struct ChatSession<M: LanguageModel> {
    id: Uuid,
    model: Arc<M>,
    profile: Persona,
    settings: ChatSettings,
    memory: ConversationMemory,
}

impl<M: LanguageModel> ChatSession<M> {
    pub fn new(model: Arc<M>, profile: Persona, settings: ChatSettings) -> Self {
        Self {
            id: Uuid::new_v4(),
            model,
            profile,
            settings,
            memory: ConversationMemory::default(),
        }
    }

    /// Best-effort restoration from resumption metadata. Malformed or
    /// missing fields fall back to defaults; resuming never fails.
    pub fn resume(model: Arc<M>, metadata: &Value) -> Self {
        let profile = metadata
            .get("profile")
            .and_then(Value::as_str)
            .map(Persona::parse)
            .unwrap_or_default();
        let settings = metadata
            .get("settings")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default();
        Self::new(model, profile, settings)
    }

    /// Metadata blob handed to the host for session resumption.
    pub fn metadata(&self) -> Value {
        json!({
            "profile": self.profile.tag(),
            "settings": self.settings,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn profile(&self) -> Persona {
        self.profile
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    pub fn history(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn welcome_banner(&self) -> String {
        format!(
            "{} assistant initialized with {}",
            self.profile.title(),
            self.settings.summary()
        )
    }

    /// Apply a settings-panel update. Takes effect on the next turn; the
    /// returned notice is shown to the user.
    pub fn update_settings(&mut self, settings: ChatSettings) -> String {
        self.settings = settings;
        format!("Settings updated! Now using {}", self.settings.summary())
    }

    /// Run one non-streaming turn and commit it to history.
    pub async fn complete_turn(&mut self, user_input: &str) -> Result<String> {
        let request = self.turn_request(user_input);
        let completion = self.model.complete(&request).await?;
        let content = completion.content.ok_or_else(|| {
            ParleyError::Protocol("model returned an empty completion".into())
        })?;
        self.commit(user_input, &content);
        Ok(content)
    }

    /// Run one streaming turn. The returned stream yields fragments in
    /// arrival order; when it is exhausted the concatenated reply is
    /// committed to history as a single assistant message. Dropping the
    /// stream before the end discards the partial turn entirely.
    pub async fn stream_turn(&mut self, user_input: &str) -> Result<ReplyStream<'_>> {
        let request = self.turn_request(user_input);
        let inner = self.model.stream(&request).await?;
        Ok(ReplyStream {
            memory: &mut self.memory,
            user_input: user_input.to_string(),
            inner,
            collected: String::new(),
            state: ReplyState::Streaming,
        })
    }

    fn turn_request(&self, user_input: &str) -> ChatRequest {
        let messages = prompt::assemble(
            self.profile,
            &self.settings,
            self.memory.messages(),
            user_input,
        );
        ChatRequest::from_settings(&self.settings, messages)
    }

    fn commit(&mut self, user_input: &str, reply: &str) {
        self.memory.push(Message::user(user_input));
        self.memory.push(Message::assistant(reply));
    }
}

enum ReplyState {
    Streaming,
    Failed,
    Committed,
}

/// One turn's worth of streamed reply text.
///
/// Borrows the session's memory for the duration of the turn, which also
/// enforces the single-writer rule: no second turn can start while this
/// stream is alive.
pub struct ReplyStream<'a> {
    memory: &'a mut ConversationMemory,
    user_input: String,
    inner: TextStream,
    collected: String,
    state: ReplyState,
}

impl Stream for ReplyStream<'_> {
    type Item = Result<String>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match this.state {
            ReplyState::Failed | ReplyState::Committed => return Poll::Ready(None),
            ReplyState::Streaming => {}
        }
        match this.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(fragment))) => {
                this.collected.push_str(&fragment);
                Poll::Ready(Some(Ok(fragment)))
            }
            Poll::Ready(Some(Err(err))) => {
                // A failed turn is never committed; the user resubmits.
                this.state = ReplyState::Failed;
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(None) => {
                this.memory.push(Message::user(&this.user_input));
                this.memory
                    .push(Message::assistant(&this.collected));
                this.state = ReplyState::Committed;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

//! UI-agnostic chat state types
//!
//! These are shared by the router, the chat session, and any front end that
//! renders a conversation. Nothing here depends on a UI framework.

use serde::{Deserialize, Serialize};

/// A single chat bubble
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    /// Rendered verbatim. May carry `**bold**`, `*italic*` and `` `code` `` markup.
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Bot,
            content: content.into(),
        }
    }
}

/// The author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Bot,
}

/// Which slot of a reply a message fills. The shell times each stage separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStage {
    Primary,
    Suggestion,
}

/// Bot output for one user message.
///
/// Always has a primary message; product lookups add a suggestion that must
/// be shown after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub primary: ChatMessage,
    pub suggestion: Option<ChatMessage>,
}

impl Reply {
    pub fn single(content: impl Into<String>) -> Self {
        Self {
            primary: ChatMessage::bot(content),
            suggestion: None,
        }
    }

    pub fn with_suggestion(content: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self {
            primary: ChatMessage::bot(content),
            suggestion: Some(ChatMessage::bot(suggestion)),
        }
    }

    /// Messages in display order, tagged with their stage
    pub fn messages(&self) -> impl Iterator<Item = (ReplyStage, &ChatMessage)> {
        std::iter::once((ReplyStage::Primary, &self.primary))
            .chain(self.suggestion.iter().map(|m| (ReplyStage::Suggestion, m)))
    }

    pub fn into_messages(self) -> Vec<(ReplyStage, ChatMessage)> {
        let mut out = vec![(ReplyStage::Primary, self.primary)];
        if let Some(suggestion) = self.suggestion {
            out.push((ReplyStage::Suggestion, suggestion));
        }
        out
    }

    pub fn len(&self) -> usize {
        1 + usize::from(self.suggestion.is_some())
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

//! OpenAI-compatible chat completion chunk definitions
//!
//! Only the fields needed to tell whether a streamed chunk carries text are
//! modelled; everything is optional so usage-only and role-only chunks still
//! parse.

use serde::Deserialize;

/// Streaming chunk (`object: "chat.completion.chunk"`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamChunk {
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
}

/// Streaming choice
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamChoice {
    #[serde(default)]
    pub delta: Option<Delta>,
}

/// Streaming delta
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Delta {
    #[serde(default)]
    pub content: Option<String>,
}

impl StreamChunk {
    /// True if any choice carries non-empty delta text
    pub fn has_content(&self) -> bool {
        self.choices.iter().any(|choice| {
            choice
                .delta
                .as_ref()
                .and_then(|d| d.content.as_deref())
                .is_some_and(|c| !c.is_empty())
        })
    }
}

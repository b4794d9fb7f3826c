//! Prompt builder: one synthesized system message + untouched history.

use std::fmt::Write as _;

use ai_llm_service::ChatMessage;

use crate::retrieve::ScoredChunk;

/// Project label used in the context notice when none is configured.
pub const DEFAULT_PROJECT: &str = "Stockfish";

/// Turns a retrieval result into a system message and prepends it to history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptAssembler {
    project: String,
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_PROJECT)
    }
}

impl PromptAssembler {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// `[system(context), history...]`.
    ///
    /// `history` is copied as-is; the caller keeps ownership.
    ///
    /// # Example
    /// ```
    /// use ai_llm_service::{ChatMessage, ChatRole};
    /// use code_retriever::PromptAssembler;
    ///
    /// let history = [ChatMessage::user("hi")];
    /// let out = PromptAssembler::default().assemble(&[], &history);
    /// assert_eq!(out.len(), 2);
    /// assert_eq!(out[0].role, ChatRole::System);
    /// assert_eq!(out[1], history[0]);
    /// ```
    pub fn assemble(&self, retrieved: &[ScoredChunk], history: &[ChatMessage]) -> Vec<ChatMessage> {
        let mut out = Vec::with_capacity(history.len() + 1);
        out.push(ChatMessage::system(self.context_block(retrieved)));
        out.extend_from_slice(history);
        out
    }

    /// Content of the synthesized system message.
    pub fn context_block(&self, retrieved: &[ScoredChunk]) -> String {
        if retrieved.is_empty() {
            return format!(
                "No relevant {} context found, answer from general knowledge.",
                self.project
            );
        }

        let mut out = format!(
            "Here are relevant snippets from the {} source, best match first.\n\n",
            self.project
        );
        for (i, s) in retrieved.iter().enumerate() {
            let c = &s.chunk;
            let fence = fence_for(&c.text);
            // `write!` into a String cannot fail.
            let _ = writeln!(
                out,
                "[{}] {} (lines {}-{})",
                i + 1,
                c.path,
                c.start_line,
                c.end_line
            );
            let _ = writeln!(out, "{fence}");
            out.push_str(&c.text);
            if !c.text.ends_with('\n') {
                out.push('\n');
            }
            let _ = writeln!(out, "{fence}\n");
        }
        out.push_str(
            "Use them to answer the user. When a snippet is relevant, quote the code \
             verbatim (with its file and line range) before explaining it.",
        );
        out
    }
}

/// Backtick fence longer than any run inside `text` (minimum three).
fn fence_for(text: &str) -> String {
    let mut longest = 0usize;
    let mut run = 0usize;
    for ch in text.chars() {
        if ch == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}

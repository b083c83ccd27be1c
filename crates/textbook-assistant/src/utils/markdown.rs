//! Best-effort markdown formatting for assistant answers.
//!
//! A fixed chain of regex substitutions, not a parser. Order matters: bold
//! runs before italics so `**` is consumed first. Nested or overlapping
//! emphasis is not guaranteed to come out right.

use chrono::Local;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::ChatMessage;

static BOLD_STARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());
static BOLD_UNDERSCORES: Lazy<Regex> = Lazy::new(|| Regex::new(r"__(.*?)__").unwrap());
static ITALIC_STAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.*?)\*").unwrap());
static ITALIC_UNDERSCORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"_(.*?)_").unwrap());
static BLOCKQUOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^>\s*(.*)$").unwrap());
static SOURCE_CITATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[Source:\s*([^\]]+)\]").unwrap());

pub fn render_markdown(text: &str) -> String {
    let html = BOLD_STARS.replace_all(text, "<strong>$1</strong>");
    let html = BOLD_UNDERSCORES.replace_all(&html, "<strong>$1</strong>");
    let html = ITALIC_STAR.replace_all(&html, "<em>$1</em>");
    let html = ITALIC_UNDERSCORE.replace_all(&html, "<em>$1</em>");
    let html = BLOCKQUOTE.replace_all(&html, "<blockquote>$1</blockquote>");
    let html = SOURCE_CITATION.replace_all(&html, "");
    html.replace('\n', "<br />")
}

/// Display-ready form of a [`ChatMessage`].
#[derive(Debug, Clone, PartialEq)]
pub struct MessageView {
    pub html: String,
    pub sources: Vec<String>,
    pub confidence_badge: Option<String>,
    pub timestamp: String,
}

impl MessageView {
    pub fn from_message(message: &ChatMessage) -> Self {
        let sources = message
            .sources
            .iter()
            .flatten()
            .map(|s| format!("{} ({}% relevant)", s.label(), s.relevance_percent()))
            .collect();

        Self {
            html: render_markdown(&message.content),
            sources,
            confidence_badge: message
                .confidence
                .as_ref()
                .map(|c| format!("{} confidence", c)),
            timestamp: message
                .created_at
                .with_timezone(&Local)
                .format("%H:%M")
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChatResponse, Source};

    #[test]
    fn test_bold_and_italics() {
        assert_eq!(
            render_markdown("**hi** *there*"),
            "<strong>hi</strong> <em>there</em>"
        );
        assert_eq!(
            render_markdown("__bold__ and _soft_"),
            "<strong>bold</strong> and <em>soft</em>"
        );
    }

    #[test]
    fn test_blockquote_per_line() {
        assert_eq!(
            render_markdown("intro\n> quoted line\nafter"),
            "intro<br /><blockquote>quoted line</blockquote><br />after"
        );
    }

    #[test]
    fn test_strips_source_citations() {
        assert_eq!(
            render_markdown("Gazebo simulates physics [Source: Week 6, Gazebo]."),
            "Gazebo simulates physics ."
        );
    }

    #[test]
    fn test_emphasis_does_not_span_lines() {
        assert_eq!(render_markdown("a *b\nc* d"), "a *b<br />c* d");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(render_markdown("nothing to do"), "nothing to do");
    }

    #[test]
    fn test_message_view() {
        let message = ChatMessage::from_response(ChatResponse {
            answer: "**URDF** describes robots".to_string(),
            sources: vec![Source {
                excerpt_num: 2,
                week: 4,
                section: "Robot Description".to_string(),
                score: 0.92,
            }],
            has_answer: true,
            confidence: Some("medium".to_string()),
            num_sources: 1,
            query_processed: "urdf".to_string(),
        });

        let view = MessageView::from_message(&message);
        assert_eq!(view.html, "<strong>URDF</strong> describes robots");
        assert_eq!(view.sources, vec!["Week 4 - Robot Description (92% relevant)"]);
        assert_eq!(view.confidence_badge.as_deref(), Some("medium confidence"));
        assert_eq!(view.timestamp.len(), 5);
    }

    #[test]
    fn test_message_view_without_sources() {
        let view = MessageView::from_message(&ChatMessage::welcome());
        assert!(view.sources.is_empty());
        assert!(view.confidence_badge.is_none());
    }
}

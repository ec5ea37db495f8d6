//! Utilities module for Tinted Notes
//!
//! Shared helper functions:
//! - ISO-8601 timestamps
//! - Text utilities for serialized editor content
//! - Writing statistics (word count, words per minute)

use chrono::{SecondsFormat, Utc};
use std::time::Duration;
use tokio::time::Instant;

/// Current time as an ISO-8601 string with millisecond precision, e.g.
/// `2024-03-01T12:00:00.000Z`
pub fn iso_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Text utilities
pub mod text {
    /// Count words in text
    pub fn word_count(text: &str) -> usize {
        text.split_whitespace().count()
    }

    /// Strip markup tags from serialized rich text, leaving the visible text.
    /// Block-level closing tags become line breaks.
    pub fn plain_text(markup: &str) -> String {
        let mut out = String::with_capacity(markup.len());
        let mut in_tag = false;
        let mut tag = String::new();

        for c in markup.chars() {
            match c {
                '<' => {
                    in_tag = true;
                    tag.clear();
                }
                '>' if in_tag => {
                    in_tag = false;
                    let name = tag.trim_start_matches('/');
                    let name = name.split_whitespace().next().unwrap_or("");
                    if matches!(name, "p" | "br" | "br/" | "h1" | "h2" | "h3" | "li" | "div") {
                        out.push('\n');
                    }
                }
                _ if in_tag => tag.push(c),
                _ => out.push(c),
            }
        }

        out.replace("&nbsp;", " ")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&amp;", "&")
    }

    /// First non-empty line of the text, if any
    pub fn first_line(text: &str) -> Option<&str> {
        text.lines().map(str::trim).find(|l| !l.is_empty())
    }

    /// Truncate string with ellipsis (on a character boundary)
    pub fn truncate(s: &str, max_len: usize) -> String {
        if s.chars().count() <= max_len {
            s.to_string()
        } else if max_len <= 3 {
            "...".to_string()
        } else {
            let head: String = s.chars().take(max_len - 3).collect();
            format!("{}...", head)
        }
    }
}

/// Typing statistics for the current editing session
#[derive(Debug, Clone, Default)]
pub struct WritingStats {
    started: Option<Instant>,
    word_count: usize,
    wpm: u32,
}

impl WritingStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record new content. The clock starts at the first recorded edit.
    pub fn record(&mut self, content: &str, now: Instant) {
        if self.started.is_none() {
            self.started = Some(now);
        }
        self.word_count = text::word_count(&text::plain_text(content));
    }

    /// Recompute words per minute. Skipped while a save is in flight.
    pub fn tick(&mut self, now: Instant, saving: bool) {
        if saving {
            return;
        }
        let Some(started) = self.started else {
            return;
        };
        let elapsed = now.saturating_duration_since(started);
        if elapsed > Duration::ZERO {
            let minutes = elapsed.as_secs_f64() / 60.0;
            self.wpm = (self.word_count as f64 / minutes).round() as u32;
        }
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn wpm(&self) -> u32 {
        self.wpm
    }

    /// Forget the session, e.g. when another note is selected
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

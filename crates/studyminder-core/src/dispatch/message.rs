//! Reminder message rendering.

use crate::error::ValidationError;
use crate::host::StudyCounts;
use crate::storage::ReminderConfig;

pub const CELEBRATION_TITLE: &str = "Study Complete";
pub const CELEBRATION_BODY: &str = "🎉 Great job! You've completed all your reviews for now.";
pub const FALLBACK_TITLE: &str = "Study Reminder";
pub const FALLBACK_BODY: &str =
    "📚 It's time for your study session!\n\nOpen your decks to continue learning.";

/// Per-fire snapshot of the host's counts. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FireDecision {
    pub due_count: u32,
    pub new_count: u32,
    pub learning_count: u32,
    pub should_celebrate: bool,
}

impl FireDecision {
    pub fn from_counts(counts: StudyCounts) -> Self {
        Self {
            due_count: counts.due,
            new_count: counts.new,
            learning_count: counts.learning,
            should_celebrate: counts.due == 0 && counts.new == 0,
        }
    }

    /// Cards substituted for `{cards}`.
    pub fn actionable(&self) -> u32 {
        self.due_count
            .saturating_add(self.new_count)
            .saturating_add(self.learning_count)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Reminder,
    Celebration,
}

/// A title/body pair ready for any channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub kind: MessageKind,
    pub title: String,
    pub body: String,
}

impl RenderedMessage {
    pub fn icon(&self) -> &'static str {
        match self.kind {
            MessageKind::Reminder => "📚",
            MessageKind::Celebration => "🎉",
        }
    }

    /// Generic reminder used when the host could not report counts.
    pub fn fallback() -> Self {
        Self {
            kind: MessageKind::Reminder,
            title: FALLBACK_TITLE.to_string(),
            body: FALLBACK_BODY.to_string(),
        }
    }
}

/// Render the message for `decision`. Never fails: a template that cannot
/// be formatted is replaced by a built-in headline.
pub fn render(decision: &FireDecision, config: &ReminderConfig) -> RenderedMessage {
    if decision.should_celebrate {
        return RenderedMessage {
            kind: MessageKind::Celebration,
            title: CELEBRATION_TITLE.to_string(),
            body: CELEBRATION_BODY.to_string(),
        };
    }

    let cards = decision.actionable();
    let headline = format_template(&config.message_template, cards).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "falling back to built-in reminder text");
        format!("You have {cards} cards to review!")
    });

    let mut clauses = Vec::new();
    if decision.new_count > 0 {
        clauses.push(format!("• {} new cards to learn", decision.new_count));
    }
    if decision.due_count > 0 {
        clauses.push(format!("• {} cards to review", decision.due_count));
    }

    let mut body = headline;
    if !clauses.is_empty() {
        body.push_str("\n\n");
        body.push_str(&clauses.join("\n"));
    }

    let streak = config.streak.current();
    if config.streak_enabled && streak > 0 {
        let unit = if streak == 1 { "day" } else { "days" };
        body.push_str(&format!("\n\n🔥 Current streak: {streak} {unit}"));
    }

    RenderedMessage {
        kind: MessageKind::Reminder,
        title: config.notification_title.clone(),
        body,
    }
}

/// Substitute `{cards}`. `{{` and `}}` are literal braces; any other
/// placeholder or an unbalanced brace is an error.
pub fn format_template(template: &str, cards: u32) -> Result<String, ValidationError> {
    let invalid = |message: String| ValidationError::InvalidTemplate { message };

    let mut out = String::with_capacity(template.len() + 8);
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => name.push(ch),
                        None => return Err(invalid("unclosed '{'".into())),
                    }
                }
                if name != "cards" {
                    return Err(invalid(format!("unknown placeholder '{{{name}}}'")));
                }
                out.push_str(&cards.to_string());
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => return Err(invalid("unmatched '}'".into())),
            other => out.push(other),
        }
    }
    Ok(out)
}

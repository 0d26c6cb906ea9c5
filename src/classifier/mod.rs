//! Reply classifier — maps an inbound text to a reply.
//!
//! The input is normalized (trimmed, lowercased) and run through an ordered
//! rule table; the first matching rule produces the reply. When nothing
//! matches, the reply is the original input reversed.

pub mod math;
pub mod replies;
pub mod rules;

pub use math::{MathError, evaluate};
pub use rules::{ReplyRule, Responder, Trigger, default_rules};

/// Name reported for the reverse-text fallback.
pub const DEFAULT_RULE: &str = "reverse";

/// A reply plus the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub rule: &'static str,
    pub reply: String,
}

/// Trim and lowercase text for matching.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Reverse text character by character.
pub fn reverse_text(text: &str) -> String {
    text.chars().rev().collect()
}

/// Stateless keyword classifier over an ordered rule table.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<ReplyRule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier {
    /// Create a classifier with the standard rule table.
    pub fn new() -> Self {
        Self::with_rules(default_rules())
    }

    /// Create a classifier with a custom rule table, evaluated in order.
    pub fn with_rules(rules: Vec<ReplyRule>) -> Self {
        Self { rules }
    }

    /// Rule names in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name).collect()
    }

    /// Produce the reply for `text`.
    pub fn classify(&self, text: &str) -> String {
        self.classify_with_rule(text).reply
    }

    /// Produce the reply for `text` along with the matching rule's name.
    pub fn classify_with_rule(&self, text: &str) -> Classification {
        let normalized = normalize(text);

        for rule in &self.rules {
            if let Some(reply) = rule.apply(&normalized) {
                return Classification {
                    rule: rule.name,
                    reply,
                };
            }
        }

        Classification {
            rule: DEFAULT_RULE,
            reply: reverse_text(text),
        }
    }
}

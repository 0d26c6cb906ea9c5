//! Ordered keyword rule table.
//!
//! Rules are evaluated top to bottom against the normalized text and the
//! first match wins. The table is a `Vec`, not a map: reordering entries
//! changes behavior (e.g. "hi, tell me a joke" must hit the greeting rule
//! before the joke rule).

use super::math;
use super::replies;

/// Which input a rule's predicate inspects.
#[derive(Debug, Clone, Copy)]
pub enum Trigger {
    /// Normalized text contains any of the phrases.
    AnyPhrase(&'static [&'static str]),
    /// Normalized text contains any of the characters.
    AnyChar(&'static [char]),
    /// Normalized text is empty.
    Empty,
}

impl Trigger {
    fn matches(&self, normalized: &str) -> bool {
        match self {
            Trigger::AnyPhrase(phrases) => phrases.iter().any(|p| normalized.contains(*p)),
            Trigger::AnyChar(chars) => normalized.contains(*chars),
            Trigger::Empty => normalized.is_empty(),
        }
    }
}

/// How a rule produces its reply.
#[derive(Debug, Clone, Copy)]
pub enum Responder {
    /// A fixed reply.
    Fixed(&'static str),
    /// Evaluate the normalized text as arithmetic.
    Arithmetic,
}

impl Responder {
    fn reply(&self, normalized: &str) -> String {
        match self {
            Responder::Fixed(text) => (*text).to_string(),
            Responder::Arithmetic => match math::evaluate(normalized) {
                Ok(value) => format!("{}{}", replies::MATH_RESULT_PREFIX, value),
                Err(e) => {
                    tracing::debug!(error = %e, input = %normalized, "Arithmetic evaluation failed");
                    replies::MATH_ERROR.to_string()
                }
            },
        }
    }
}

/// A single (predicate, reply producer) pair.
#[derive(Debug, Clone)]
pub struct ReplyRule {
    /// Short identifier, used in logs.
    pub name: &'static str,
    pub trigger: Trigger,
    pub responder: Responder,
}

impl ReplyRule {
    /// Reply for `normalized` if this rule matches it.
    pub fn apply(&self, normalized: &str) -> Option<String> {
        self.trigger
            .matches(normalized)
            .then(|| self.responder.reply(normalized))
    }
}

/// The standard rule table, in evaluation order.
pub fn default_rules() -> Vec<ReplyRule> {
    vec![
        ReplyRule {
            name: "weather",
            trigger: Trigger::AnyPhrase(&["weather"]),
            responder: Responder::Fixed(replies::WEATHER),
        },
        ReplyRule {
            name: "introduction",
            trigger: Trigger::AnyPhrase(&["who are you", "introduce yourself"]),
            responder: Responder::Fixed(replies::INTRODUCTION),
        },
        ReplyRule {
            name: "fun_fact",
            trigger: Trigger::AnyPhrase(&["tell me something cool", "fun fact"]),
            responder: Responder::Fixed(replies::FUN_FACT),
        },
        ReplyRule {
            name: "abilities",
            trigger: Trigger::AnyPhrase(&["list abilities", "what can you do"]),
            responder: Responder::Fixed(replies::ABILITIES),
        },
        ReplyRule {
            name: "greeting",
            trigger: Trigger::AnyPhrase(&["hi", "hello", "hey"]),
            responder: Responder::Fixed(replies::GREETING),
        },
        ReplyRule {
            name: "joke",
            trigger: Trigger::AnyPhrase(&["joke"]),
            responder: Responder::Fixed(replies::JOKE),
        },
        ReplyRule {
            name: "help",
            trigger: Trigger::AnyPhrase(&["help"]),
            responder: Responder::Fixed(replies::HELP),
        },
        // Also fires on hyphenated words ("top-notch"); those fall to MATH_ERROR.
        ReplyRule {
            name: "arithmetic",
            trigger: Trigger::AnyChar(&['+', '-', '*', '/']),
            responder: Responder::Arithmetic,
        },
        ReplyRule {
            name: "farewell",
            trigger: Trigger::AnyPhrase(&["goodbye", "bye"]),
            responder: Responder::Fixed(replies::FAREWELL),
        },
        ReplyRule {
            name: "empty",
            trigger: Trigger::Empty,
            responder: Responder::Fixed(replies::EMPTY),
        },
    ]
}

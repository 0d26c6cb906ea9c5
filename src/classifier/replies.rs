//! Canned reply texts.

pub const WEATHER: &str =
    "I can't check live weather yet, but it looks like a great day to code! ☀️";

pub const INTRODUCTION: &str =
    "I'm a friendly bot here to chat! I can reverse your text, tell fun facts, and more! 🤖";

pub const FUN_FACT: &str = "Did you know? Honey never spoils! Archaeologists have found pots of honey in ancient Egyptian tombs that are over 3,000 years old and still perfectly good. 🍯";

pub const ABILITIES: &str = "Here's what I can do:\n\
- Reverse any text you send me 🔄\n\
- Solve simple math like 2 + 2 ➕\n\
- Tell you a fun fact 🍯\n\
- Tell you a joke 😄\n\
- Say hello and goodbye 👋";

pub const GREETING: &str = "Hello there! 👋 How can I help you today?";

pub const JOKE: &str =
    "Why do programmers prefer dark mode? Because light attracts bugs! 🐛";

pub const HELP: &str = "Try saying \"fun fact\", \"tell me a joke\", \"what can you do\", or a math problem like \"3 * 7\". Anything else, I'll send back reversed!";

/// Prefix for a successful arithmetic reply; the value follows directly.
pub const MATH_RESULT_PREFIX: &str = "The result is: ";

pub const MATH_ERROR: &str = "Sorry, I couldn't understand that math expression. 🤔";

pub const FAREWELL: &str = "Goodbye! 👋 Come back anytime!";

pub const EMPTY: &str = "You didn't say anything! Try typing a message. 🙂";

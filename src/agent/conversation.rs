//! Owned, windowed conversation history for a single role.
//!
//! History is an explicit value held by the orchestrator and passed into
//! each call, rather than hidden state inside a client. Only the command
//! finder retains history within a question; it is cleared once a command
//! is validated or the question flow ends.

use super::message::{ChatMessage, assistant_message, user_message};

/// Ordered user/assistant turns scoped to one role.
///
/// Growth is bounded: once the turn count exceeds the window, the oldest
/// user/assistant pair is evicted.
#[derive(Debug, Clone)]
pub struct Conversation {
    turns: Vec<ChatMessage>,
    window: usize,
}

impl Conversation {
    /// Creates an empty conversation bounded to `window` turns.
    ///
    /// A `window` of 0 disables retention entirely: every push is a no-op.
    #[must_use]
    pub const fn new(window: usize) -> Self {
        Self {
            turns: Vec::new(),
            window,
        }
    }

    /// Appends a user/assistant exchange, evicting the oldest pair if the
    /// window is exceeded.
    pub fn push_exchange(&mut self, user: &str, assistant: &str) {
        if self.window == 0 {
            return;
        }
        self.turns.push(user_message(user));
        self.turns.push(assistant_message(assistant));
        while self.turns.len() > self.window {
            // Evict in pairs so the history always starts on a user turn.
            self.turns.drain(..2);
        }
    }

    /// The retained turns, oldest first.
    #[must_use]
    pub fn turns(&self) -> &[ChatMessage] {
        &self.turns
    }

    /// Whether any turns are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Number of retained turns (user and assistant counted separately).
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Discards all retained turns.
    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::message::Speaker;

    #[test]
    fn test_push_exchange_appends_pair() {
        let mut conv = Conversation::new(10);
        conv.push_exchange("wrong answer", "repeat");
        assert_eq!(conv.len(), 2);
        assert_eq!(conv.turns()[0].speaker, Speaker::User);
        assert_eq!(conv.turns()[1].speaker, Speaker::Assistant);
        assert_eq!(conv.turns()[1].content, "repeat");
    }

    #[test]
    fn test_window_evicts_oldest_pair() {
        let mut conv = Conversation::new(4);
        conv.push_exchange("a", "1");
        conv.push_exchange("b", "2");
        conv.push_exchange("c", "3");
        assert_eq!(conv.len(), 4);
        assert_eq!(conv.turns()[0].content, "b");
        assert_eq!(conv.turns()[3].content, "3");
    }

    #[test]
    fn test_zero_window_retains_nothing() {
        let mut conv = Conversation::new(0);
        conv.push_exchange("a", "1");
        assert!(conv.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut conv = Conversation::new(10);
        conv.push_exchange("a", "1");
        conv.clear();
        assert!(conv.is_empty());
    }
}

//! Rolling conversation history sent alongside each question.
//!
//! The answering service gives better follow-up answers when it can see the
//! last few turns ("what about cotton?" after a wheat question).  The window
//! is capped so prompts stay small on slow rural connections.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// Who said what in one conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// ConversationHistory
// ---------------------------------------------------------------------------

/// Rolling window of the most recent conversation turns.
///
/// Oldest messages are dropped once the window exceeds `max_messages`.
#[derive(Debug)]
pub struct ConversationHistory {
    messages: VecDeque<Message>,
    max_messages: usize,
}

impl ConversationHistory {
    pub fn new(max_messages: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(max_messages + 1),
            max_messages,
        }
    }

    /// Record the user's question.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Message::user(content));
    }

    /// Record the assistant's spoken answer.
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(Message::assistant(content));
    }

    fn push(&mut self, message: Message) {
        self.messages.push_back(message);
        while self.messages.len() > self.max_messages {
            self.messages.pop_front();
        }
    }

    /// The window, oldest first.
    pub fn messages(&self) -> Vec<Message> {
        self.messages.iter().cloned().collect()
    }

    /// Clear the window (e.g. on a language switch — mixed-language context
    /// confuses the answering model more than no context).
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let h = ConversationHistory::new(6);
        assert!(h.is_empty());
        assert!(h.messages().is_empty());
    }

    #[test]
    fn keeps_turns_in_order() {
        let mut h = ConversationHistory::new(6);
        h.push_user("when to sow wheat?");
        h.push_assistant("Oct 15–Nov 15");

        let msgs = h.messages();
        assert_eq!(msgs[0], Message::user("when to sow wheat?"));
        assert_eq!(msgs[1], Message::assistant("Oct 15–Nov 15"));
    }

    #[test]
    fn window_caps_at_max_messages() {
        let mut h = ConversationHistory::new(4);
        for i in 0..6 {
            h.push_user(format!("question {i}"));
        }

        assert_eq!(h.len(), 4);
        let msgs = h.messages();
        assert_eq!(msgs[0].content, "question 2");
        assert_eq!(msgs[3].content, "question 5");
    }

    #[test]
    fn clear_empties_the_window() {
        let mut h = ConversationHistory::new(6);
        h.push_user("q");
        h.push_assistant("a");
        h.clear();
        assert!(h.is_empty());
    }
}

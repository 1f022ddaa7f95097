// Chat session history - one interactive session's question/answer pairs
//
// Append-only and strictly in-memory: history dies with the session and is
// never shared across sessions. The stateless HTTP endpoint does not use it.

/// One question/answer pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatExchange {
    pub question: String,
    pub answer: String,
}

/// Ordered history of a single interactive session
#[derive(Debug, Default)]
pub struct ChatSession {
    exchanges: Vec<ChatExchange>,
}

impl ChatSession {
    pub fn new() -> Self {
        ChatSession::default()
    }

    /// Record a completed exchange at the end of the history
    pub fn push(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.exchanges.push(ChatExchange {
            question: question.into(),
            answer: answer.into(),
        });
    }

    /// Full history in ask order, oldest first
    pub fn exchanges(&self) -> &[ChatExchange] {
        &self.exchanges
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_starts_empty() {
        let session = ChatSession::new();
        assert!(session.is_empty());
        assert_eq!(session.len(), 0);
    }

    #[test]
    fn test_push_preserves_ask_order() {
        let mut session = ChatSession::new();
        session.push("first?", "one");
        session.push("second?", "two");
        session.push("third?", "three");

        let exchanges = session.exchanges();
        assert_eq!(exchanges.len(), 3);
        assert_eq!(exchanges[0].question, "first?");
        assert_eq!(exchanges[0].answer, "one");
        assert_eq!(exchanges[2].question, "third?");
    }
}

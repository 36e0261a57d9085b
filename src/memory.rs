use crate::message::{Message, Role};

pub const DEFAULT_WINDOW_TURNS: usize = 20;

/// In-memory transcript storage, bounded to the most recent turns.
///
/// A turn is one user message plus everything that follows it up to the
/// next user message (the assistant reply and any synthetic tool entries
/// in between). Truncation drops whole turns, oldest first, so a human/ai
/// pair is never split and tool context never orphaned.
#[derive(Clone, Debug)]
pub struct ConversationMemory {
    messages: Vec<Message>,
    window: usize,
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::bounded(DEFAULT_WINDOW_TURNS)
    }
}

impl ConversationMemory {
    pub fn bounded(window: usize) -> Self {
        Self {
            messages: Vec::new(),
            window: window.max(1),
        }
    }

    pub fn with_messages(messages: Vec<Message>, window: usize) -> Self {
        let mut memory = Self {
            messages,
            window: window.max(1),
        };
        memory.enforce_window();
        memory
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.enforce_window();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Message> + '_ {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of user turns currently held.
    pub fn turns(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role == Role::User)
            .count()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    fn enforce_window(&mut self) {
        while self.turns() > self.window {
            // Drop the oldest turn: everything up to (not including) the
            // second user message in the transcript.
            let end = self
                .messages
                .iter()
                .enumerate()
                .skip(1)
                .find(|(_, m)| m.role == Role::User)
                .map(|(i, _)| i)
                .unwrap_or(self.messages.len());
            self.messages.drain(..end);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange(n: usize) -> [Message; 2] {
        [
            Message::user(format!("question {n}")),
            Message::assistant(format!("answer {n}")),
        ]
    }

    #[test]
    fn window_never_exceeded() {
        let mut memory = ConversationMemory::bounded(3);
        for n in 0..10 {
            for message in exchange(n) {
                memory.push(message);
            }
        }
        assert_eq!(memory.turns(), 3);
        assert_eq!(memory.len(), 6);
        assert_eq!(memory.messages()[0].content, "question 7");
    }

    #[test]
    fn truncation_never_splits_a_pair() {
        let mut memory = ConversationMemory::bounded(2);
        for n in 0..5 {
            for message in exchange(n) {
                memory.push(message);
            }
        }
        // After truncation the transcript always starts with a user message
        // and alternates cleanly.
        assert_eq!(memory.messages()[0].role, Role::User);
        assert_eq!(memory.messages()[1].role, Role::Assistant);
        assert_eq!(memory.len() % 2, 0);
    }

    #[test]
    fn tool_entries_travel_with_their_turn() {
        let mut memory = ConversationMemory::bounded(1);
        memory.push(Message::user("old question"));
        memory.push(Message::tool(
            "web_search",
            serde_json::Value::String("old result".into()),
            None,
        ));
        memory.push(Message::assistant("old answer"));
        memory.push(Message::user("new question"));

        // The old turn, tool entry included, is gone as one unit.
        assert_eq!(memory.len(), 1);
        assert_eq!(memory.messages()[0].content, "new question");
    }
}

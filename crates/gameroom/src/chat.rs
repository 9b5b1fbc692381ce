use crate::PlayerId;
use dealroom_core::CHAT_HISTORY_CAP;
use dealroom_core::ID;
use std::collections::VecDeque;

pub struct ChatMessageMarker;
pub type ChatMessageId = ID<ChatMessageMarker>;

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: ChatMessageId,
    pub sender_id: PlayerId,
    pub sender_name: String,
    pub content: String,
    pub timestamp_ms: u64,
}

/// Bounded FIFO of the last `CHAT_HISTORY_CAP` messages for a room.
#[derive(Debug, Default)]
pub struct ChatHistory {
    messages: VecDeque<ChatMessage>,
}

impl ChatHistory {
    pub fn push(&mut self, message: ChatMessage) {
        if self.messages.len() >= CHAT_HISTORY_CAP {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
    }
    pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }
    pub fn len(&self) -> usize {
        self.messages.len()
    }
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(n: u64) -> ChatMessage {
        ChatMessage {
            id: ChatMessageId::default(),
            sender_id: PlayerId::default(),
            sender_name: "Alice".into(),
            content: format!("message {n}"),
            timestamp_ms: n,
        }
    }

    #[test]
    fn retains_at_most_cap_messages() {
        let mut history = ChatHistory::default();
        for n in 0..(CHAT_HISTORY_CAP as u64 + 10) {
            history.push(msg(n));
        }
        assert_eq!(history.len(), CHAT_HISTORY_CAP);
        // oldest 10 were evicted; the earliest remaining is message 10.
        let first = history.iter().next().unwrap();
        assert_eq!(first.content, "message 10");
    }

    #[test]
    fn preserves_insertion_order() {
        let mut history = ChatHistory::default();
        history.push(msg(1));
        history.push(msg(2));
        let contents: Vec<_> = history.iter().map(|m| m.content.clone()).collect();
        assert_eq!(contents, vec!["message 1", "message 2"]);
    }
}

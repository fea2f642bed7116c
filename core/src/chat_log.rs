//! Capped, store-ordered chat log.

use crate::constants::CHAT_LOG_CAP;
use crate::types::ChatMessage;

/// Keeps the most recent room messages, ordered by the store-assigned
/// sequence number rather than arrival order, deduplicated by message id.
#[derive(Debug, Default)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a message in sequence order. Returns `false` for duplicates.
    pub fn push(&mut self, message: ChatMessage) -> bool {
        if self.messages.iter().any(|m| m.id == message.id) {
            return false;
        }

        let at = self
            .messages
            .partition_point(|m| m.seq <= message.seq);
        self.messages.insert(at, message);

        if self.messages.len() > CHAT_LOG_CAP {
            let overflow = self.messages.len() - CHAT_LOG_CAP;
            self.messages.drain(..overflow);
        }
        true
    }

    /// Messages oldest-first.
    pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    pub fn latest(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(id: &str, seq: u64) -> ChatMessage {
        ChatMessage {
            id: id.to_string(),
            player_id: "p".to_string(),
            player_name: "P".to_string(),
            text: format!("message {seq}"),
            seq,
            timestamp: seq * 1000,
        }
    }

    #[test]
    fn orders_by_sequence_not_arrival() {
        let mut log = ChatLog::new();
        log.push(msg("b", 2));
        log.push(msg("a", 1));
        log.push(msg("c", 3));
        let order: Vec<u64> = log.iter().map(|m| m.seq).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn duplicates_by_id_are_dropped() {
        let mut log = ChatLog::new();
        assert!(log.push(msg("a", 1)));
        assert!(!log.push(msg("a", 1)));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn keeps_only_the_newest_cap_messages() {
        let mut log = ChatLog::new();
        for i in 0..(CHAT_LOG_CAP as u64 + 10) {
            log.push(msg(&format!("m{i}"), i));
        }
        assert_eq!(log.len(), CHAT_LOG_CAP);
        assert_eq!(log.iter().next().unwrap().seq, 10);
        assert_eq!(log.latest().unwrap().seq, CHAT_LOG_CAP as u64 + 9);
    }

    #[test]
    fn clear_empties_the_log() {
        let mut log = ChatLog::new();
        log.push(msg("a", 1));
        log.clear();
        assert!(log.is_empty());
    }
}

use serde::{Deserialize, Serialize};

/// One room-scoped chat line.
///
/// `seq` is assigned by the shared store, not the sender; display order
/// follows it so every participant sees the same global order regardless of
/// network reordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub player_id: String,
    pub player_name: String,
    pub text: String,
    pub seq: u64,
    pub timestamp: u64,
}

//! Contract for the shared, eventually-consistent room-state store.
//!
//! Implementations deliver asynchronous results as [`StoreEvent`]s over an
//! `mpsc` sender; the synchronizer drains them once per frame, outside the
//! engine step. Each participant writes only its own presence record, so
//! field-level last-writer-wins reads are safe by construction.

use std::sync::mpsc::Sender;

use anyhow::Result;

use crate::types::{ChatMessage, Direction, Emote, PresenceRecord};

/// Monotonically increasing room-membership counter. Events and writes tagged
/// with a stale epoch are ignored, which makes callback-ordering races with
/// in-flight operations harmless.
pub type Epoch = u64;

/// Handle for cancelling a roster or chat subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Asynchronous notification from the store.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// Full snapshot of a room's presence records.
    Roster {
        epoch: Epoch,
        room_id: String,
        players: Vec<PresenceRecord>,
    },
    /// One appended chat message (incremental; history arrives the same way
    /// when a subscription seeds the last N).
    Chat { epoch: Epoch, message: ChatMessage },
    /// A subscription or delivery failure, surfaced once.
    SubscriptionError { epoch: Epoch, message: String },
}

/// Partial presence update; `None` fields are left untouched.
/// `Some(None)` on an optional field clears it.
#[derive(Debug, Clone, Default)]
pub struct PresencePatch {
    pub position: Option<(f32, f32, Direction)>,
    pub moving: Option<bool>,
    pub target: Option<(f32, f32)>,
    pub emote: Option<Option<Emote>>,
    pub hat: Option<Option<String>>,
    pub glasses: Option<Option<String>>,
    pub color: Option<String>,
}

impl PresencePatch {
    /// Applies this patch to a presence record in place.
    pub fn apply(&self, record: &mut PresenceRecord) {
        if let Some((x, y, facing)) = self.position {
            record.x = x;
            record.y = y;
            record.facing = facing;
        }
        if let Some(moving) = self.moving {
            record.moving = moving;
        }
        if let Some((tx, ty)) = self.target {
            record.target_x = Some(tx);
            record.target_y = Some(ty);
        }
        if let Some(emote) = self.emote {
            record.emote = emote;
        }
        if let Some(hat) = &self.hat {
            record.hat = hat.clone();
        }
        if let Some(glasses) = &self.glasses {
            record.glasses = glasses.clone();
        }
        if let Some(color) = &self.color {
            record.color = color.clone();
        }
    }
}

/// Backing service for the presence synchronizer.
///
/// Presence records are keyed by `(room_id, player_id)`. Updating a record
/// that does not exist (e.g. a write completing after teardown removed it)
/// must be a no-op, not an error.
pub trait RoomStore: Send + Sync {
    fn set_presence(&self, room_id: &str, record: PresenceRecord) -> Result<()>;

    fn update_presence(&self, room_id: &str, player_id: &str, patch: PresencePatch) -> Result<()>;

    fn remove_presence(&self, room_id: &str, player_id: &str);

    /// Arms crash-safety removal: the store deletes the record if the owning
    /// connection drops without a clean disconnect.
    fn register_disconnect_removal(&self, room_id: &str, player_id: &str);

    fn cancel_disconnect_removal(&self, room_id: &str, player_id: &str);

    /// Subscribes to full roster snapshots for a room. The current snapshot
    /// is delivered immediately.
    fn subscribe_roster(
        &self,
        room_id: &str,
        epoch: Epoch,
        events: Sender<StoreEvent>,
    ) -> SubscriptionId;

    /// Subscribes to chat, seeding the last `last_n` messages and then
    /// delivering additions incrementally. Full history is never re-read.
    fn subscribe_chat(
        &self,
        room_id: &str,
        epoch: Epoch,
        last_n: usize,
        events: Sender<StoreEvent>,
    ) -> SubscriptionId;

    fn unsubscribe(&self, subscription: SubscriptionId);

    /// Appends to the room's message log. Ordering (`seq`) and timestamps are
    /// assigned by the store, never by the sender.
    fn append_message(
        &self,
        room_id: &str,
        player_id: &str,
        player_name: &str,
        text: &str,
    ) -> Result<()>;
}

//! Remote presence synchronizer.
//!
//! Bridges local intents to the shared room store and publishes a single
//! merged roster. One `RoomSync` instance represents the local participant;
//! room membership is modelled explicitly so teardown, optimistic projection,
//! and late asynchronous results cannot race each other.

pub mod memory;
pub mod store;

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;

use crate::chat_log::ChatLog;
use crate::constants::{CHAT_LOG_CAP, MAX_CHAT_LEN};
use crate::types::{ChatMessage, Direction, Emote, PresenceRecord};

pub use memory::MemoryRoomStore;
pub use store::{Epoch, PresencePatch, RoomStore, StoreEvent, SubscriptionId};

/// Event published to the rest of the app, drained once per frame.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// A room membership began; the roster holds the optimistic projection so
    /// the room is never visibly empty while the join write is in flight.
    RoomJoined {
        room_id: String,
        players: Vec<PresenceRecord>,
    },
    /// Validated, merged roster snapshot for the current room.
    Roster {
        room_id: String,
        players: Vec<PresenceRecord>,
    },
    Chat(ChatMessage),
    /// A store failure, surfaced once. Membership is left unchanged and
    /// nothing is retried automatically.
    Error { message: String },
}

/// Cosmetic state written into the local presence record.
#[derive(Debug, Clone, Default)]
pub struct Appearance {
    pub name: String,
    pub color: String,
    pub hat: Option<String>,
    pub glasses: Option<String>,
}

struct Membership {
    epoch: Epoch,
    room_id: String,
    events: Receiver<StoreEvent>,
    roster_sub: SubscriptionId,
    chat_sub: SubscriptionId,
    /// Local shadow of our presence record, substituted into the roster until
    /// the store echoes a valid entry for us.
    projection: Option<PresenceRecord>,
    /// Latched once the store has echoed our entry; the projection is never
    /// resurrected afterwards, even if a later snapshot omits us.
    caught_up: bool,
    chat: ChatLog,
    roster: Vec<PresenceRecord>,
}

/// The local participant's connection to the shared room state.
pub struct RoomSync {
    store: Arc<dyn RoomStore>,
    player_id: String,
    appearance: Appearance,
    epoch: Epoch,
    membership: Option<Membership>,
    pending: VecDeque<SyncEvent>,
}

impl RoomSync {
    pub fn new(store: Arc<dyn RoomStore>, player_id: String, appearance: Appearance) -> Self {
        Self {
            store,
            player_id,
            appearance,
            epoch: 0,
            membership: None,
            pending: VecDeque::new(),
        }
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn room_id(&self) -> Option<&str> {
        self.membership.as_ref().map(|m| m.room_id.as_str())
    }

    /// The last published roster for the current room.
    pub fn roster(&self) -> &[PresenceRecord] {
        self.membership
            .as_ref()
            .map(|m| m.roster.as_slice())
            .unwrap_or(&[])
    }

    pub fn chat(&self) -> impl Iterator<Item = &ChatMessage> {
        self.membership.as_ref().into_iter().flat_map(|m| m.chat.iter())
    }

    /// Whether the store has confirmed our presence record in this room.
    pub fn is_caught_up(&self) -> bool {
        self.membership.as_ref().is_some_and(|m| m.caught_up)
    }

    /// Joins a room, tearing down any previous membership first.
    ///
    /// The teardown is unconditional: this client must never be present in two
    /// rooms' rosters at once. The previous membership's event channel and
    /// epoch die with it, so anything still in flight lands on the floor.
    pub fn join_room(&mut self, room_id: &str, spawn: (i32, i32), facing: Direction) {
        self.teardown();

        self.epoch += 1;
        let epoch = self.epoch;

        let record = PresenceRecord {
            id: self.player_id.clone(),
            name: self.appearance.name.clone(),
            color: self.appearance.color.clone(),
            room: room_id.to_string(),
            x: spawn.0 as f32,
            y: spawn.1 as f32,
            facing,
            moving: false,
            target_x: None,
            target_y: None,
            hat: self.appearance.hat.clone(),
            glasses: self.appearance.glasses.clone(),
            emote: None,
            last_message: None,
        };

        // Publish the projected roster before any network round-trip so the
        // local avatar never disappears while the write is in flight.
        self.pending.push_back(SyncEvent::RoomJoined {
            room_id: room_id.to_string(),
            players: vec![record.clone()],
        });

        if let Err(e) = self.store.set_presence(room_id, record.clone()) {
            log::error!("presence write failed joining '{room_id}': {e}");
            self.pending.push_back(SyncEvent::Error {
                message: format!("Failed to join {room_id}: {e}"),
            });
        }
        self.store.register_disconnect_removal(room_id, &self.player_id);

        let (tx, rx) = channel();
        let roster_sub = self.store.subscribe_roster(room_id, epoch, tx.clone());
        let chat_sub = self
            .store
            .subscribe_chat(room_id, epoch, CHAT_LOG_CAP, tx);

        self.membership = Some(Membership {
            epoch,
            room_id: room_id.to_string(),
            events: rx,
            roster_sub,
            chat_sub,
            roster: vec![record.clone()],
            projection: Some(record),
            caught_up: false,
            chat: ChatLog::new(),
        });
    }

    /// Leaves the current room and removes our presence record.
    pub fn disconnect(&mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        let Some(m) = self.membership.take() else {
            return;
        };
        self.store.unsubscribe(m.roster_sub);
        self.store.unsubscribe(m.chat_sub);
        self.store.remove_presence(&m.room_id, &self.player_id);
        self.store
            .cancel_disconnect_removal(&m.room_id, &self.player_id);
        log::debug!("left room '{}' (epoch {})", m.room_id, m.epoch);
    }

    /// Publishes the local position and facing.
    ///
    /// The optimistic projection (and the published roster's local entry) is
    /// updated synchronously so our own roster entry is never stale, then the
    /// write goes to the store. Movement clears any transient emote.
    pub fn move_to(&mut self, x: i32, y: i32, facing: Direction) {
        let Some(m) = self.membership.as_mut() else {
            return;
        };

        let (fx, fy) = (x as f32, y as f32);
        if let Some(projection) = m.projection.as_mut() {
            projection.x = fx;
            projection.y = fy;
            projection.facing = facing;
        }
        if let Some(entry) = m.roster.iter_mut().find(|p| p.id == self.player_id) {
            entry.x = fx;
            entry.y = fy;
            entry.facing = facing;
        }

        let patch = PresencePatch {
            position: Some((fx, fy, facing)),
            moving: Some(true),
            target: Some((fx, fy)),
            emote: Some(None),
            ..PresencePatch::default()
        };
        if let Err(e) = self.store.update_presence(&m.room_id, &self.player_id, patch) {
            log::warn!("position write failed: {e}");
            self.pending.push_back(SyncEvent::Error {
                message: format!("Sync error: {e}"),
            });
        }
    }

    /// Appends a chat line to the current room's log.
    pub fn send_chat(&mut self, text: &str) {
        let Some(m) = self.membership.as_ref() else {
            return;
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return;
        }
        let clipped: String = trimmed.chars().take(MAX_CHAT_LEN).collect();
        if let Err(e) = self.store.append_message(
            &m.room_id,
            &self.player_id,
            &self.appearance.name,
            &clipped,
        ) {
            log::warn!("chat send failed: {e}");
            self.pending.push_back(SyncEvent::Error {
                message: format!("Chat error: {e}"),
            });
        }
    }

    /// Shows a transient emote on our avatar.
    pub fn send_emote(&mut self, emote: Emote) {
        self.patch_self(PresencePatch {
            emote: Some(Some(emote)),
            ..PresencePatch::default()
        });
    }

    /// Pushes updated cosmetics to peers in the room and remembers them for
    /// subsequent joins.
    pub fn update_visuals(&mut self, hat: Option<String>, glasses: Option<String>, color: String) {
        self.appearance.hat = hat.clone();
        self.appearance.glasses = glasses.clone();
        self.appearance.color = color.clone();
        self.patch_self(PresencePatch {
            hat: Some(hat),
            glasses: Some(glasses),
            color: Some(color),
            ..PresencePatch::default()
        });
    }

    fn patch_self(&mut self, patch: PresencePatch) {
        let Some(m) = self.membership.as_mut() else {
            return;
        };
        if let Some(projection) = m.projection.as_mut() {
            patch.apply(projection);
        }
        if let Err(e) = self.store.update_presence(&m.room_id, &self.player_id, patch) {
            log::warn!("presence update failed: {e}");
            self.pending.push_back(SyncEvent::Error {
                message: format!("Sync error: {e}"),
            });
        }
    }

    /// Drains store notifications and publishes merged events. Call once per
    /// frame; never blocks.
    pub fn poll(&mut self) -> Vec<SyncEvent> {
        let mut out: Vec<SyncEvent> = self.pending.drain(..).collect();

        loop {
            let Some(m) = self.membership.as_ref() else {
                break;
            };
            let Ok(event) = m.events.try_recv() else {
                break;
            };
            if let Some(published) = self.handle_event(event) {
                out.push(published);
            }
        }

        out
    }

    /// Applies one store event to the membership. Events tagged with a stale
    /// epoch are dropped: they belong to a room we already left.
    fn handle_event(&mut self, event: StoreEvent) -> Option<SyncEvent> {
        let m = self.membership.as_mut()?;
        match event {
            StoreEvent::Roster {
                epoch,
                room_id,
                players,
            } => {
                if epoch != m.epoch {
                    log::debug!("dropping stale roster for '{room_id}' (epoch {epoch})");
                    return None;
                }

                let mut valid: Vec<PresenceRecord> = players
                    .into_iter()
                    .filter(|p| {
                        let ok = p.is_valid();
                        if !ok {
                            log::debug!("dropping malformed roster entry in '{room_id}'");
                        }
                        ok
                    })
                    .collect();

                let local_present = valid.iter().any(|p| p.id == self.player_id);
                if local_present {
                    if !m.caught_up {
                        // The store caught up with our join; from here on the
                        // server entry is the only source for our roster row.
                        m.caught_up = true;
                        m.projection = None;
                    }
                } else if let Some(projection) = &m.projection {
                    valid.push(projection.clone());
                }

                m.roster = valid.clone();
                Some(SyncEvent::Roster {
                    room_id: m.room_id.clone(),
                    players: valid,
                })
            }
            StoreEvent::Chat { epoch, message } => {
                if epoch != m.epoch {
                    return None;
                }
                if m.chat.push(message.clone()) {
                    Some(SyncEvent::Chat(message))
                } else {
                    None
                }
            }
            StoreEvent::SubscriptionError { epoch, message } => {
                if epoch != m.epoch {
                    return None;
                }
                log::error!("room subscription error: {message}");
                Some(SyncEvent::Error { message })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;

    fn sync_with_store() -> (RoomSync, Arc<MemoryRoomStore>) {
        let store = Arc::new(MemoryRoomStore::new());
        let sync = RoomSync::new(
            store.clone(),
            "me".to_string(),
            Appearance {
                name: "Waddles".to_string(),
                color: "#3b82f6".to_string(),
                hat: None,
                glasses: None,
            },
        );
        (sync, store)
    }

    fn rosters(events: &[SyncEvent]) -> Vec<&Vec<PresenceRecord>> {
        events
            .iter()
            .filter_map(|e| match e {
                SyncEvent::Roster { players, .. } => Some(players),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn join_publishes_projection_before_server_confirms() {
        let (mut sync, _store) = sync_with_store();
        sync.join_room("quad", (64, 64), Direction::Down);

        let events = sync.poll();
        match &events[0] {
            SyncEvent::RoomJoined { room_id, players } => {
                assert_eq!(room_id, "quad");
                assert_eq!(players.len(), 1);
                assert_eq!(players[0].id, "me");
            }
            other => panic!("expected RoomJoined first, got {other:?}"),
        }
    }

    #[test]
    fn projection_clears_once_server_echoes_and_never_returns() {
        let (mut sync, store) = sync_with_store();
        sync.join_room("quad", (64, 64), Direction::Down);

        let _ = sync.poll();
        assert!(sync.is_caught_up(), "memory store echoes synchronously");

        // A later snapshot that omits us must not resurrect the projection.
        store.remove_presence("quad", "me");
        let events = sync.poll();
        let last = rosters(&events).last().cloned().expect("roster published");
        assert!(
            !last.iter().any(|p| p.id == "me"),
            "projection must not be re-substituted after catch-up"
        );
    }

    #[test]
    fn malformed_roster_entries_are_dropped_silently() {
        let (mut sync, store) = sync_with_store();
        sync.join_room("quad", (64, 64), Direction::Down);

        let mut ghost = PresenceRecord {
            id: "ghost".to_string(),
            name: String::new(),
            color: "#fff".to_string(),
            room: "quad".to_string(),
            x: 0.0,
            y: 0.0,
            facing: Direction::Down,
            moving: false,
            target_x: None,
            target_y: None,
            hat: None,
            glasses: None,
            emote: None,
            last_message: None,
        };
        store.set_presence("quad", ghost.clone()).unwrap();
        ghost.id = "nan".to_string();
        ghost.name = "NaN".to_string();
        ghost.x = f32::NAN;
        store.set_presence("quad", ghost).unwrap();

        let events = sync.poll();
        let last = rosters(&events).last().cloned().expect("roster published");
        assert_eq!(last.len(), 1, "only the valid local entry survives");
        assert!(events
            .iter()
            .all(|e| !matches!(e, SyncEvent::Error { .. })));
    }

    #[test]
    fn switching_rooms_isolates_rosters() {
        let (mut sync, store) = sync_with_store();

        // Another participant lives in room A.
        let mut other = PresenceRecord {
            id: "other".to_string(),
            name: "Other".to_string(),
            color: "#fff".to_string(),
            room: "quad".to_string(),
            x: 10.0,
            y: 10.0,
            facing: Direction::Down,
            moving: false,
            target_x: None,
            target_y: None,
            hat: None,
            glasses: None,
            emote: None,
            last_message: None,
        };
        store.set_presence("quad", other.clone()).unwrap();

        sync.join_room("quad", (64, 64), Direction::Down);
        let events = sync.poll();
        assert!(rosters(&events)
            .last()
            .unwrap()
            .iter()
            .any(|p| p.id == "other"));

        sync.join_room("cafe", (32, 32), Direction::Up);
        // Churn in the old room after we left must not leak through.
        other.x = 99.0;
        store.set_presence("quad", other).unwrap();

        let events = sync.poll();
        for roster in rosters(&events) {
            assert!(
                roster.iter().all(|p| p.id != "other"),
                "room A entry leaked into room B roster"
            );
        }
        assert_eq!(sync.room_id(), Some("cafe"));

        // And our record is gone from room A on the store side.
        let (tx, rx) = std::sync::mpsc::channel();
        store.subscribe_roster("quad", 99, tx);
        match rx.try_recv().unwrap() {
            StoreEvent::Roster { players, .. } => {
                assert!(players.iter().all(|p| p.id != "me"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn stale_epoch_events_are_ignored() {
        let (mut sync, _store) = sync_with_store();
        sync.join_room("quad", (64, 64), Direction::Down);
        let _ = sync.poll();

        let stale = StoreEvent::Roster {
            epoch: 0,
            room_id: "entrance".to_string(),
            players: vec![],
        };
        assert_eq!(sync.handle_event(stale), None);

        let stale_chat = StoreEvent::Chat {
            epoch: 0,
            message: ChatMessage {
                id: "m1".to_string(),
                player_id: "x".to_string(),
                player_name: "X".to_string(),
                text: "late".to_string(),
                seq: 1,
                timestamp: 0,
            },
        };
        assert_eq!(sync.handle_event(stale_chat), None);
    }

    #[test]
    fn move_updates_projection_and_clears_emote() {
        let (mut sync, store) = sync_with_store();
        sync.join_room("quad", (64, 64), Direction::Down);
        sync.send_emote(Emote::Wave);

        sync.move_to(96, 64, Direction::Right);

        // Local roster entry reflects the move synchronously.
        let me = sync
            .roster()
            .iter()
            .find(|p| p.id == "me")
            .cloned()
            .expect("local entry present");
        assert_eq!((me.x, me.y), (96.0, 64.0));
        assert_eq!(me.facing, Direction::Right);

        // And the store record shows the move with the emote cleared.
        let (tx, rx) = std::sync::mpsc::channel();
        store.subscribe_roster("quad", 99, tx);
        match rx.try_recv().unwrap() {
            StoreEvent::Roster { players, .. } => {
                let p = players.iter().find(|p| p.id == "me").unwrap();
                assert_eq!((p.x, p.y), (96.0, 64.0));
                assert!(p.moving);
                assert_eq!(p.emote, None);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn chat_round_trip_respects_store_order() {
        let (mut sync, store) = sync_with_store();
        sync.join_room("quad", (64, 64), Direction::Down);
        let _ = sync.poll();

        store.append_message("quad", "a", "A", "first").unwrap();
        sync.send_chat("  second  ");
        sync.send_chat("   ");

        let events = sync.poll();
        let chats: Vec<&ChatMessage> = events
            .iter()
            .filter_map(|e| match e {
                SyncEvent::Chat(m) => Some(m),
                _ => None,
            })
            .collect();
        assert_eq!(chats.len(), 2, "blank chat lines are not sent");
        assert_eq!(chats[0].text, "first");
        assert_eq!(chats[1].text, "second");
        assert!(chats[0].seq < chats[1].seq);

        let history: Vec<&ChatMessage> = sync.chat().collect();
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn writes_without_membership_are_no_ops() {
        let (mut sync, store) = sync_with_store();
        sync.move_to(10, 10, Direction::Up);
        sync.send_chat("hello");
        sync.send_emote(Emote::Heart);
        assert!(sync.poll().is_empty());

        // Nothing landed in the store either.
        let (tx, rx) = std::sync::mpsc::channel();
        store.subscribe_roster("quad", 1, tx);
        match rx.try_recv().unwrap() {
            StoreEvent::Roster { players, .. } => assert!(players.is_empty()),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn disconnect_removes_presence_and_membership() {
        let (mut sync, store) = sync_with_store();
        sync.join_room("quad", (64, 64), Direction::Down);
        sync.disconnect();

        assert_eq!(sync.room_id(), None);
        let (tx, rx) = std::sync::mpsc::channel();
        store.subscribe_roster("quad", 9, tx);
        match rx.try_recv().unwrap() {
            StoreEvent::Roster { players, .. } => assert!(players.is_empty()),
            other => panic!("unexpected event {other:?}"),
        }
    }
}

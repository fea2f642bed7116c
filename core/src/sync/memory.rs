//! In-process reference implementation of [`RoomStore`].
//!
//! Used for offline play and as the test double for the synchronizer. Also
//! hosts the campus-bot simulation so offline rooms don't feel empty; bots
//! are ordinary presence records stepped explicitly by the frame loop.

use std::collections::{HashMap, HashSet};
use std::sync::mpsc::Sender;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use rand::Rng;

use crate::constants::TILE_SIZE;
use crate::sync::store::{Epoch, PresencePatch, RoomStore, StoreEvent, SubscriptionId};
use crate::types::{ChatMessage, Direction, PresenceRecord};

const BOT_ID_PREFIX: &str = "bot-";

const BOT_NAMES: &[&str] = &[
    "Frosty", "Pingu", "Waddles", "Snowball", "IceCube", "Flipper", "Slippy",
];
const BOT_COLORS: &[&str] = &[
    "#3b82f6", "#ef4444", "#10b981", "#f59e0b", "#8b5cf6", "#ec4899",
];
const BOT_MESSAGES: &[&str] = &[
    "Anyone want to play hide and seek?",
    "This room is cool!",
    "Where is the secret party?",
    "Hello everyone!",
    "Brr it's cold.",
    "Check out my new color!",
    "Let's go to the beach!",
];

/// Frames between bot wander moves / chat attempts at ~60fps. The intervals
/// are coprime so one frame never lands on both branches.
const BOT_MOVE_INTERVAL: u64 = 120;
const BOT_CHAT_INTERVAL: u64 = 253;

struct Subscriber {
    id: u64,
    epoch: Epoch,
    tx: Sender<StoreEvent>,
}

#[derive(Default)]
struct RoomState {
    players: HashMap<String, PresenceRecord>,
    messages: Vec<ChatMessage>,
    roster_subs: Vec<Subscriber>,
    chat_subs: Vec<Subscriber>,
    disconnect_marks: HashSet<String>,
    /// Pixel area bots wander within; set when bots are populated.
    bot_area: Option<(i32, i32)>,
}

#[derive(Default)]
struct Inner {
    rooms: HashMap<String, RoomState>,
    subscriptions: HashMap<u64, String>,
    next_subscription: u64,
    next_seq: u64,
    next_message: u64,
    bot_frame: u64,
}

/// Shared room state held in this process.
#[derive(Default)]
pub struct MemoryRoomStore {
    inner: Mutex<Inner>,
}

impl MemoryRoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn now_millis() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    fn broadcast_roster(room_id: &str, room: &mut RoomState) {
        let players: Vec<PresenceRecord> = room.players.values().cloned().collect();
        room.roster_subs.retain(|sub| {
            sub.tx
                .send(StoreEvent::Roster {
                    epoch: sub.epoch,
                    room_id: room_id.to_string(),
                    players: players.clone(),
                })
                .is_ok()
        });
    }

    fn broadcast_message(room: &mut RoomState, message: &ChatMessage) {
        room.chat_subs.retain(|sub| {
            sub.tx
                .send(StoreEvent::Chat {
                    epoch: sub.epoch,
                    message: message.clone(),
                })
                .is_ok()
        });
    }

    /// Simulates the owning connection of `player_id` dropping: every armed
    /// disconnect-removal for it fires.
    pub fn simulate_disconnect(&self, player_id: &str) {
        let mut inner = self.inner.lock().expect("store mutex");
        for (room_id, room) in inner.rooms.iter_mut() {
            if room.disconnect_marks.remove(player_id) && room.players.remove(player_id).is_some() {
                let room_id = room_id.clone();
                Self::broadcast_roster(&room_id, room);
            }
        }
    }

    /// Seeds wandering bots into a room if it has none yet. `width`/`height`
    /// bound the area they roam.
    pub fn populate_bots<R: Rng>(
        &self,
        room_id: &str,
        count: usize,
        width: i32,
        height: i32,
        rng: &mut R,
    ) {
        let mut inner = self.inner.lock().expect("store mutex");
        let room = inner.rooms.entry(room_id.to_string()).or_default();
        room.bot_area = Some((width, height));
        if room.players.keys().any(|id| id.starts_with(BOT_ID_PREFIX)) {
            return;
        }

        for i in 0..count {
            let margin = TILE_SIZE * 2;
            let x = rng.gen_range(margin..(width - margin).max(margin + 1)) as f32;
            let y = rng.gen_range(margin..(height - margin).max(margin + 1)) as f32;
            let bot = PresenceRecord {
                id: format!("{BOT_ID_PREFIX}{i}"),
                name: BOT_NAMES[i % BOT_NAMES.len()].to_string(),
                color: BOT_COLORS[i % BOT_COLORS.len()].to_string(),
                room: room_id.to_string(),
                x,
                y,
                facing: Direction::Down,
                moving: false,
                target_x: None,
                target_y: None,
                hat: None,
                glasses: None,
                emote: None,
                last_message: None,
            };
            room.players.insert(bot.id.clone(), bot);
        }
        Self::broadcast_roster(room_id, room);
    }

    /// Advances the bot simulation by one frame for `room_id`. Call once per
    /// render tick; bots occasionally wander and chat.
    pub fn step_bots<R: Rng>(&self, room_id: &str, rng: &mut R) {
        let mut inner = self.inner.lock().expect("store mutex");
        inner.bot_frame += 1;
        let frame = inner.bot_frame;

        if frame % BOT_MOVE_INTERVAL == 0 {
            let Some(room) = inner.rooms.get_mut(room_id) else {
                return;
            };
            let Some((width, height)) = room.bot_area else {
                return;
            };
            let bot_ids: Vec<String> = room
                .players
                .keys()
                .filter(|id| id.starts_with(BOT_ID_PREFIX))
                .cloned()
                .collect();
            if let Some(id) = pick(&bot_ids, rng) {
                let margin = TILE_SIZE * 2;
                let tx = rng.gen_range(margin..(width - margin).max(margin + 1)) as f32;
                let ty = rng.gen_range(margin..(height - margin).max(margin + 1)) as f32;
                if let Some(bot) = room.players.get_mut(id) {
                    bot.target_x = Some(tx);
                    bot.target_y = Some(ty);
                    bot.moving = true;
                    bot.facing = if tx < bot.x {
                        Direction::Left
                    } else {
                        Direction::Right
                    };
                    bot.x = tx;
                    bot.y = ty;
                }
                Self::broadcast_roster(room_id, room);
            }
            return;
        }

        if frame % BOT_CHAT_INTERVAL == 0 && rng.gen_bool(0.3) {
            let seq = {
                inner.next_seq += 1;
                inner.next_seq
            };
            let msg_nr = {
                inner.next_message += 1;
                inner.next_message
            };
            let Some(room) = inner.rooms.get_mut(room_id) else {
                return;
            };
            let bots: Vec<(String, String)> = room
                .players
                .iter()
                .filter(|(id, _)| id.starts_with(BOT_ID_PREFIX))
                .map(|(id, p)| (id.clone(), p.name.clone()))
                .collect();
            if let Some((id, name)) = pick(&bots, rng) {
                let message = ChatMessage {
                    id: format!("m{msg_nr}"),
                    player_id: id.clone(),
                    player_name: name.clone(),
                    text: BOT_MESSAGES[rng.gen_range(0..BOT_MESSAGES.len())].to_string(),
                    seq,
                    timestamp: Self::now_millis(),
                };
                room.messages.push(message.clone());
                Self::broadcast_message(room, &message);
            }
        }
    }
}

fn pick<'a, T, R: Rng>(items: &'a [T], rng: &mut R) -> Option<&'a T> {
    if items.is_empty() {
        None
    } else {
        Some(&items[rng.gen_range(0..items.len())])
    }
}

impl RoomStore for MemoryRoomStore {
    fn set_presence(&self, room_id: &str, record: PresenceRecord) -> Result<()> {
        let mut inner = self.inner.lock().expect("store mutex");
        let room = inner.rooms.entry(room_id.to_string()).or_default();
        room.players.insert(record.id.clone(), record);
        Self::broadcast_roster(room_id, room);
        Ok(())
    }

    fn update_presence(&self, room_id: &str, player_id: &str, patch: PresencePatch) -> Result<()> {
        let mut inner = self.inner.lock().expect("store mutex");
        let Some(room) = inner.rooms.get_mut(room_id) else {
            return Ok(());
        };
        // A record can legitimately be gone by the time an update lands
        // (teardown raced the write); treat that as a no-op.
        let Some(record) = room.players.get_mut(player_id) else {
            return Ok(());
        };
        patch.apply(record);
        Self::broadcast_roster(room_id, room);
        Ok(())
    }

    fn remove_presence(&self, room_id: &str, player_id: &str) {
        let mut inner = self.inner.lock().expect("store mutex");
        if let Some(room) = inner.rooms.get_mut(room_id) {
            if room.players.remove(player_id).is_some() {
                Self::broadcast_roster(room_id, room);
            }
        }
    }

    fn register_disconnect_removal(&self, room_id: &str, player_id: &str) {
        let mut inner = self.inner.lock().expect("store mutex");
        let room = inner.rooms.entry(room_id.to_string()).or_default();
        room.disconnect_marks.insert(player_id.to_string());
    }

    fn cancel_disconnect_removal(&self, room_id: &str, player_id: &str) {
        let mut inner = self.inner.lock().expect("store mutex");
        if let Some(room) = inner.rooms.get_mut(room_id) {
            room.disconnect_marks.remove(player_id);
        }
    }

    fn subscribe_roster(
        &self,
        room_id: &str,
        epoch: Epoch,
        events: Sender<StoreEvent>,
    ) -> SubscriptionId {
        let mut inner = self.inner.lock().expect("store mutex");
        inner.next_subscription += 1;
        let id = inner.next_subscription;
        inner
            .subscriptions
            .insert(id, room_id.to_string());

        let room = inner.rooms.entry(room_id.to_string()).or_default();
        let players: Vec<PresenceRecord> = room.players.values().cloned().collect();
        let _ = events.send(StoreEvent::Roster {
            epoch,
            room_id: room_id.to_string(),
            players,
        });
        room.roster_subs.push(Subscriber { id, epoch, tx: events });
        SubscriptionId(id)
    }

    fn subscribe_chat(
        &self,
        room_id: &str,
        epoch: Epoch,
        last_n: usize,
        events: Sender<StoreEvent>,
    ) -> SubscriptionId {
        let mut inner = self.inner.lock().expect("store mutex");
        inner.next_subscription += 1;
        let id = inner.next_subscription;
        inner
            .subscriptions
            .insert(id, room_id.to_string());

        let room = inner.rooms.entry(room_id.to_string()).or_default();
        let start = room.messages.len().saturating_sub(last_n);
        for message in &room.messages[start..] {
            let _ = events.send(StoreEvent::Chat {
                epoch,
                message: message.clone(),
            });
        }
        room.chat_subs.push(Subscriber { id, epoch, tx: events });
        SubscriptionId(id)
    }

    fn unsubscribe(&self, subscription: SubscriptionId) {
        let mut inner = self.inner.lock().expect("store mutex");
        let Some(room_id) = inner.subscriptions.remove(&subscription.0) else {
            return;
        };
        if let Some(room) = inner.rooms.get_mut(&room_id) {
            room.roster_subs.retain(|s| s.id != subscription.0);
            room.chat_subs.retain(|s| s.id != subscription.0);
        }
    }

    fn append_message(
        &self,
        room_id: &str,
        player_id: &str,
        player_name: &str,
        text: &str,
    ) -> Result<()> {
        let mut inner = self.inner.lock().expect("store mutex");
        inner.next_seq += 1;
        inner.next_message += 1;
        let seq = inner.next_seq;
        let msg_nr = inner.next_message;

        let room = inner.rooms.entry(room_id.to_string()).or_default();
        let message = ChatMessage {
            id: format!("m{msg_nr}"),
            player_id: player_id.to_string(),
            player_name: player_name.to_string(),
            text: text.to_string(),
            seq,
            timestamp: Self::now_millis(),
        };
        room.messages.push(message.clone());
        Self::broadcast_message(room, &message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn record(id: &str, room: &str) -> PresenceRecord {
        PresenceRecord {
            id: id.to_string(),
            name: id.to_string(),
            color: "#fff".to_string(),
            room: room.to_string(),
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
        }
    }

    #[test]
    fn subscribe_delivers_current_snapshot_then_updates() {
        let store = MemoryRoomStore::new();
        store.set_presence("quad", record("a", "quad")).unwrap();

        let (tx, rx) = mpsc::channel();
        store.subscribe_roster("quad", 1, tx);

        match rx.try_recv().unwrap() {
            StoreEvent::Roster { players, epoch, .. } => {
                assert_eq!(epoch, 1);
                assert_eq!(players.len(), 1);
            }
            other => panic!("unexpected event {other:?}"),
        }

        store.set_presence("quad", record("b", "quad")).unwrap();
        match rx.try_recv().unwrap() {
            StoreEvent::Roster { players, .. } => assert_eq!(players.len(), 2),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn update_of_missing_record_is_a_no_op() {
        let store = MemoryRoomStore::new();
        let (tx, rx) = mpsc::channel();
        store.subscribe_roster("quad", 1, tx);
        let _ = rx.try_recv();

        store
            .update_presence("quad", "ghost", PresencePatch::default())
            .unwrap();
        assert!(rx.try_recv().is_err(), "no broadcast for a no-op update");
    }

    #[test]
    fn chat_messages_get_store_assigned_increasing_seq() {
        let store = MemoryRoomStore::new();
        let (tx, rx) = mpsc::channel();
        store.subscribe_chat("quad", 1, 50, tx);

        store.append_message("quad", "a", "A", "first").unwrap();
        store.append_message("quad", "a", "A", "second").unwrap();

        let mut seqs = Vec::new();
        while let Ok(StoreEvent::Chat { message, .. }) = rx.try_recv() {
            seqs.push(message.seq);
        }
        assert_eq!(seqs.len(), 2);
        assert!(seqs[0] < seqs[1]);
    }

    #[test]
    fn chat_subscription_seeds_only_last_n() {
        let store = MemoryRoomStore::new();
        for i in 0..10 {
            store
                .append_message("quad", "a", "A", &format!("msg {i}"))
                .unwrap();
        }

        let (tx, rx) = mpsc::channel();
        store.subscribe_chat("quad", 1, 3, tx);

        let mut texts = Vec::new();
        while let Ok(StoreEvent::Chat { message, .. }) = rx.try_recv() {
            texts.push(message.text);
        }
        assert_eq!(texts, vec!["msg 7", "msg 8", "msg 9"]);
    }

    #[test]
    fn disconnect_removal_fires_only_when_registered() {
        let store = MemoryRoomStore::new();
        store.set_presence("quad", record("a", "quad")).unwrap();
        store.register_disconnect_removal("quad", "a");

        store.set_presence("cafe", record("a", "cafe")).unwrap();
        // Not registered in the cafe.

        store.simulate_disconnect("a");

        let (tx, rx) = mpsc::channel();
        store.subscribe_roster("quad", 1, tx.clone());
        match rx.try_recv().unwrap() {
            StoreEvent::Roster { players, .. } => assert!(players.is_empty()),
            other => panic!("unexpected event {other:?}"),
        }

        store.subscribe_roster("cafe", 2, tx);
        match rx.try_recv().unwrap() {
            StoreEvent::Roster { players, .. } => assert_eq!(players.len(), 1),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn cancelled_disconnect_removal_does_not_fire() {
        let store = MemoryRoomStore::new();
        store.set_presence("quad", record("a", "quad")).unwrap();
        store.register_disconnect_removal("quad", "a");
        store.cancel_disconnect_removal("quad", "a");

        store.simulate_disconnect("a");

        let (tx, rx) = mpsc::channel();
        store.subscribe_roster("quad", 1, tx);
        match rx.try_recv().unwrap() {
            StoreEvent::Roster { players, .. } => assert_eq!(players.len(), 1),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let store = MemoryRoomStore::new();
        let (tx, rx) = mpsc::channel();
        let sub = store.subscribe_roster("quad", 1, tx);
        let _ = rx.try_recv();

        store.unsubscribe(sub);
        store.set_presence("quad", record("a", "quad")).unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn bots_populate_once_and_wander() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let store = MemoryRoomStore::new();
        let mut rng = StdRng::seed_from_u64(42);
        store.populate_bots("quad", 3, 640, 640, &mut rng);
        store.populate_bots("quad", 3, 640, 640, &mut rng);

        let (tx, rx) = mpsc::channel();
        store.subscribe_roster("quad", 1, tx);
        match rx.try_recv().unwrap() {
            StoreEvent::Roster { players, .. } => {
                assert_eq!(players.len(), 3);
                assert!(players.iter().all(|p| p.is_valid()));
            }
            other => panic!("unexpected event {other:?}"),
        }

        for _ in 0..BOT_MOVE_INTERVAL {
            store.step_bots("quad", &mut rng);
        }
        let moved = matches!(rx.try_recv(), Ok(StoreEvent::Roster { .. }));
        assert!(moved, "a bot move should have broadcast a roster snapshot");
    }
}

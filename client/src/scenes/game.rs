mod overlays;
mod world_render;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use egui_sdl2::egui;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sdl2::keyboard::Keycode;
use sdl2::{event::Event, render::Canvas, video::Window};

use campus_core::catalog::RoomCatalog;
use campus_core::constants::{CHAT_BUBBLE_MS, ROOM_ENTRANCE};
use campus_core::engine::{EngineEvent, FrameInput, GridActor};
use campus_core::interact::{self, Interaction};
use campus_core::learning::QuizSession;
use campus_core::minigame::{AimZone, MinigameKind, PenaltyOutcome, SprintRun, SprintSide};
use campus_core::points;
use campus_core::sync::{Appearance, RoomSync, SyncEvent};
use campus_core::types::{
    Department, Direction, PresenceRecord, ProfilePatch, RoomDefinition, UserProfile,
};

use crate::input::InputState;
use crate::scenes::scene::{Scene, SceneType};
use crate::state::AppState;

const LEVEL_UP_TOAST: Duration = Duration::from_secs(3);
const OFFLINE_BOT_COUNT: usize = 4;

/// What the learning overlay was opened for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StudyAction {
    Study,
    Quiz,
}

enum LearningStage {
    PickCourse,
    Note { course_name: String, text: String },
    Quiz { session: QuizSession },
}

struct LearningState {
    department: Option<Department>,
    action: StudyAction,
    stage: LearningStage,
}

enum MinigameState {
    Penalty {
        aim: AimZone,
        outcome: Option<PenaltyOutcome>,
    },
    Sprint {
        run: SprintRun,
        started: bool,
    },
}

/// Profile editor form state.
struct EditForm {
    bio: String,
    major: String,
    year: String,
    enrolled: Vec<String>,
    hat: String,
    glasses: String,
    color: String,
    dorm_floor: String,
    dorm_bed: String,
}

impl EditForm {
    fn from_profile(profile: &UserProfile) -> Self {
        let dorm = profile.dorm_config.clone().unwrap_or_default();
        Self {
            bio: profile.bio.clone(),
            major: profile.major.clone(),
            year: profile.year.clone(),
            enrolled: profile.enrolled_courses.clone(),
            hat: profile.hat.clone().unwrap_or_default(),
            glasses: profile.glasses.clone().unwrap_or_default(),
            color: profile.color.clone().unwrap_or_else(|| "#3b82f6".to_string()),
            dorm_floor: dorm.floor_color,
            dorm_bed: dorm.bed_color,
        }
    }
}

enum Overlay {
    None,
    Dialogue { npc_name: String, line: String },
    Profile { profile: UserProfile, is_self: bool },
    EditProfile(EditForm),
    Learning(LearningState),
    Minigame(MinigameState),
}

struct Bubble {
    text: String,
    shown_at: Instant,
}

/// The gameplay scene: frame loop over the movement engine, presence
/// synchronizer, renderer, and the egui overlays.
pub struct GameScene {
    actor: GridActor,
    room: Option<RoomDefinition>,
    roster: Vec<PresenceRecord>,
    /// Smoothed render positions for remote avatars.
    remote_positions: HashMap<String, (f32, f32)>,
    bubbles: HashMap<String, Bubble>,
    input: InputState,
    chat_input: String,
    chat_open: bool,
    /// Whether an egui text field currently owns the keyboard.
    text_focused: bool,
    show_roster: bool,
    show_emotes: bool,
    show_friends: bool,
    friends_cache: Vec<UserProfile>,
    overlay: Overlay,
    rng: StdRng,
    level_up_until: Option<Instant>,
    logout_requested: bool,
}

impl GameScene {
    pub fn new() -> Self {
        Self {
            actor: GridActor::new(),
            room: None,
            roster: Vec::new(),
            remote_positions: HashMap::new(),
            bubbles: HashMap::new(),
            input: InputState::default(),
            chat_input: String::new(),
            chat_open: false,
            text_focused: false,
            show_roster: false,
            show_emotes: false,
            show_friends: false,
            friends_cache: Vec::new(),
            overlay: Overlay::None,
            rng: StdRng::from_entropy(),
            level_up_until: None,
            logout_requested: false,
        }
    }

    fn local_id(&self, app_state: &AppState) -> String {
        app_state.player_id().unwrap_or_default().to_string()
    }

    fn populate_bots(&mut self, app_state: &mut AppState, room_id: &str) {
        let Some(store) = app_state.services.offline_store.clone() else {
            return;
        };
        let room = app_state.catalog.room_details(room_id);
        store.populate_bots(room_id, OFFLINE_BOT_COUNT, room.width, room.height, &mut self.rng);
    }

    fn apply_sync_events(&mut self, app_state: &mut AppState, events: Vec<SyncEvent>) {
        let local_id = self.local_id(app_state);
        for event in events {
            match event {
                SyncEvent::RoomJoined { room_id, players } => {
                    log::info!("joined room '{room_id}'");
                    self.room = Some(app_state.catalog.room_details(&room_id));
                    self.bubbles.clear();
                    self.remote_positions.clear();
                    // New room, new actor: the spawn is authoritative.
                    self.actor = GridActor::new();
                    if let Some(me) = players.iter().find(|p| p.id == local_id) {
                        self.actor.sync_authoritative(me.x, me.y, me.facing);
                    }
                    self.roster = players;
                }
                SyncEvent::Roster { players, .. } => {
                    if let Some(me) = players.iter().find(|p| p.id == local_id) {
                        self.actor.sync_authoritative(me.x, me.y, me.facing);
                    }
                    self.roster = players;
                }
                SyncEvent::Chat(message) => {
                    self.bubbles.insert(
                        message.player_id.clone(),
                        Bubble {
                            text: message.text.clone(),
                            shown_at: Instant::now(),
                        },
                    );
                }
                SyncEvent::Error { message } => {
                    app_state.last_error = Some(message);
                }
            }
        }
    }

    fn dispatch_engine_events(&mut self, app_state: &mut AppState, events: Vec<EngineEvent>) {
        for event in events {
            match event {
                EngineEvent::PositionUpdate { x, y, facing } => {
                    if let Some(sync) = app_state.sync.as_mut() {
                        sync.move_to(x, y, facing);
                    }
                    // Walking away dismisses conversation and study overlays.
                    if matches!(self.overlay, Overlay::Dialogue { .. } | Overlay::Learning(_)) {
                        self.overlay = Overlay::None;
                    }
                }
                EngineEvent::RoomChange {
                    target_room,
                    x,
                    y,
                    facing,
                } => {
                    let target = if target_room == campus_core::constants::DORM_WARP_TARGET {
                        RoomCatalog::dorm_room_id(&self.local_id(app_state))
                    } else {
                        target_room.to_string()
                    };
                    if let Some(sync) = app_state.sync.as_mut() {
                        sync.join_room(&target, (x, y), facing);
                    }
                    self.populate_bots(app_state, &target);
                }
                EngineEvent::Interact => self.run_interaction(app_state),
            }
        }
    }

    fn run_interaction(&mut self, app_state: &mut AppState) {
        let Some(room) = self.room.as_ref() else {
            return;
        };
        let local_id = self.local_id(app_state);
        let (px, py) = self.actor.pixel();
        let center = (
            px as f32 + campus_core::constants::TILE_SIZE as f32 / 2.0,
            py as f32 + campus_core::constants::TILE_SIZE as f32 / 2.0,
        );

        let Some(interaction) =
            interact::resolve(room, center, &self.roster, &local_id, &mut self.rng)
        else {
            return;
        };

        match interaction {
            Interaction::Study { department } => {
                self.overlay = Overlay::Learning(LearningState {
                    department,
                    action: StudyAction::Study,
                    stage: LearningStage::PickCourse,
                });
            }
            Interaction::StartQuiz { department } => {
                self.overlay = Overlay::Learning(LearningState {
                    department: Some(department),
                    action: StudyAction::Quiz,
                    stage: LearningStage::PickCourse,
                });
            }
            Interaction::Dialogue { npc_name, line, .. } => {
                self.overlay = Overlay::Dialogue {
                    npc_name: npc_name.to_string(),
                    line: line.to_string(),
                };
            }
            Interaction::OpenProfile { player_id } => {
                self.open_profile(app_state, &player_id);
            }
            Interaction::Minigame(kind) => {
                self.overlay = Overlay::Minigame(match kind {
                    MinigameKind::Penalty => MinigameState::Penalty {
                        aim: AimZone::Center,
                        outcome: None,
                    },
                    MinigameKind::Sprint => MinigameState::Sprint {
                        run: SprintRun::new(),
                        started: false,
                    },
                });
            }
        }
    }

    fn open_profile(&mut self, app_state: &mut AppState, player_id: &str) {
        let local_id = self.local_id(app_state);
        if player_id == local_id {
            if let Some(profile) = app_state.profile().cloned() {
                self.overlay = Overlay::Profile {
                    profile,
                    is_self: true,
                };
            }
            return;
        }

        let profile = match app_state.services.profiles.profile(player_id) {
            Ok(Some(profile)) => profile,
            Ok(None) | Err(_) => {
                // A presence record can outlive its profile document; show a
                // placeholder instead of an error.
                let name = self
                    .roster
                    .iter()
                    .find(|p| p.id == player_id)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| "Student".to_string());
                UserProfile {
                    id: player_id.to_string(),
                    name,
                    major: "Student".to_string(),
                    year: "Unknown".to_string(),
                    bio: "Profile unavailable.".to_string(),
                    enrolled_courses: vec![],
                    friends: vec![],
                    xp: 0,
                    level: 1,
                    hat: None,
                    glasses: None,
                    color: None,
                    dorm_config: None,
                }
            }
        };
        self.overlay = Overlay::Profile {
            profile,
            is_self: false,
        };
    }

    /// Grants XP, persists the new totals, and raises the level-up toast.
    fn grant_xp(&mut self, app_state: &mut AppState, reward: i64) {
        if reward <= 0 {
            return;
        }
        let Some(session) = app_state.session.as_mut() else {
            return;
        };

        let update = points::apply_reward(session.profile.xp, session.profile.level, reward);
        session.profile.xp = update.xp;
        session.profile.level = update.level;
        if update.leveled_up {
            self.level_up_until = Some(Instant::now() + LEVEL_UP_TOAST);
        }

        let patch = ProfilePatch {
            xp: Some(update.xp),
            level: Some(update.level),
            ..ProfilePatch::default()
        };
        let id = session.profile.id.clone();
        if let Err(e) = app_state.services.profiles.update_profile(&id, patch) {
            log::warn!("failed to persist XP: {e}");
            app_state.last_error = Some("Could not save progress".to_string());
        }
    }

    fn close_overlays(&mut self) {
        self.overlay = Overlay::None;
        self.chat_open = false;
        self.show_roster = false;
        self.show_emotes = false;
        self.show_friends = false;
    }

    /// Smooths remote avatars toward their roster positions.
    fn smooth_remote_positions(&mut self, local_id: &str) {
        for player in &self.roster {
            if player.id == local_id {
                continue;
            }
            let entry = self
                .remote_positions
                .entry(player.id.clone())
                .or_insert((player.x, player.y));
            let (dx, dy) = (player.x - entry.0, player.y - entry.1);
            if dx.abs() < 1.0 && dy.abs() < 1.0 {
                *entry = (player.x, player.y);
            } else {
                entry.0 += dx * 0.2;
                entry.1 += dy * 0.2;
            }
        }
        self.remote_positions
            .retain(|id, _| self.roster.iter().any(|p| &p.id == id));

        let now = Instant::now();
        self.bubbles.retain(|_, bubble| {
            now.duration_since(bubble.shown_at) < Duration::from_millis(CHAT_BUBBLE_MS)
        });
    }
}

impl Scene for GameScene {
    fn on_enter(&mut self, app_state: &mut AppState) {
        let Some(profile) = app_state.profile().cloned() else {
            log::error!("entered game scene without a session");
            return;
        };

        *self = GameScene::new();

        let appearance = Appearance {
            name: profile.name.clone(),
            color: profile
                .color
                .clone()
                .unwrap_or_else(|| "#3b82f6".to_string()),
            hat: profile.hat.clone(),
            glasses: profile.glasses.clone(),
        };
        let mut sync = RoomSync::new(
            app_state.services.room_store.clone(),
            profile.id.clone(),
            appearance,
        );

        let entrance = app_state.catalog.room_details(ROOM_ENTRANCE);
        sync.join_room(
            ROOM_ENTRANCE,
            (entrance.spawn.x, entrance.spawn.y),
            Direction::Down,
        );
        app_state.sync = Some(sync);
        self.populate_bots(app_state, ROOM_ENTRANCE);
    }

    fn on_exit(&mut self, app_state: &mut AppState) {
        if let Some(sync) = app_state.sync.as_mut() {
            sync.disconnect();
        }
        app_state.sync = None;
    }

    fn handle_event(&mut self, _app_state: &mut AppState, event: &Event) -> Option<SceneType> {
        match event {
            Event::KeyDown {
                keycode: Some(key),
                repeat: false,
                ..
            } => {
                // Minigames own the keyboard while open.
                if let Overlay::Minigame(minigame) = &mut self.overlay {
                    match minigame {
                        MinigameState::Penalty { aim, outcome } if outcome.is_none() => match *key {
                            Keycode::Left => *aim = AimZone::Left,
                            Keycode::Right => *aim = AimZone::Right,
                            Keycode::Up | Keycode::Down => *aim = AimZone::Center,
                            Keycode::Space => {
                                *outcome =
                                    Some(campus_core::minigame::resolve_penalty(*aim, &mut self.rng))
                            }
                            _ => {}
                        },
                        MinigameState::Sprint { run, started } if *started => match *key {
                            Keycode::Left => {
                                run.tap(SprintSide::Left);
                            }
                            Keycode::Right => {
                                run.tap(SprintSide::Right);
                            }
                            _ => {}
                        },
                        _ => {}
                    }
                    if *key == Keycode::Escape {
                        self.overlay = Overlay::None;
                    }
                    return None;
                }

                match *key {
                    Keycode::Escape => {
                        self.close_overlays();
                        self.input.clear_keys();
                    }
                    Keycode::Y if !self.text_focused && matches!(self.overlay, Overlay::None) => {
                        self.chat_open = true;
                    }
                    _ if !self.text_focused => self.input.key_down(*key),
                    _ => {}
                }
            }
            Event::KeyUp {
                keycode: Some(key), ..
            } => {
                self.input.key_up(*key);
            }
            _ => {}
        }
        None
    }

    fn update(&mut self, app_state: &mut AppState, dt: Duration) -> Option<SceneType> {
        if self.logout_requested {
            self.logout_requested = false;
            app_state.session = None;
            app_state.preferences.identity_token = None;
            app_state.preferences.save();
            return Some(SceneType::Login);
        }
        if app_state.session.is_none() {
            return Some(SceneType::Login);
        }

        let local_id = self.local_id(app_state);

        // Step the offline bot simulation for the current room.
        if let (Some(store), Some(sync)) = (
            app_state.services.offline_store.clone(),
            app_state.sync.as_ref(),
        ) {
            if let Some(room_id) = sync.room_id() {
                let room_id = room_id.to_string();
                store.step_bots(&room_id, &mut self.rng);
            }
        }

        // Asynchronous store results arrive here, outside the engine step.
        let events = app_state
            .sync
            .as_mut()
            .map(|sync| sync.poll())
            .unwrap_or_default();
        self.apply_sync_events(app_state, events);

        // Pure decide step...
        let controls_enabled =
            matches!(self.overlay, Overlay::None) && !self.text_focused && !self.chat_open;
        let frame_input = FrameInput {
            direction: self.input.direction(),
            interact: self.input.take_interact(),
            controls_enabled,
        };
        let engine_events = match self.room.as_ref() {
            Some(room) => self.actor.step(room, &frame_input),
            None => Vec::new(),
        };
        // ...then effect execution.
        self.dispatch_engine_events(app_state, engine_events);

        if let Overlay::Minigame(MinigameState::Sprint { run, started: true }) = &mut self.overlay {
            run.tick(dt.as_secs_f32());
        }

        if let Some(until) = self.level_up_until {
            if Instant::now() >= until {
                self.level_up_until = None;
            }
        }

        self.smooth_remote_positions(&local_id);
        None
    }

    fn render_world(
        &mut self,
        app_state: &mut AppState,
        canvas: &mut Canvas<Window>,
    ) -> Result<(), String> {
        world_render::render(self, app_state, canvas)
    }

    fn render_ui(&mut self, app_state: &mut AppState, ctx: &egui::Context) -> Option<SceneType> {
        overlays::render(self, app_state, ctx)
    }
}

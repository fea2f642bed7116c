//! Constants module - gameplay, layout, and progression constants shared by
//! the engine, synchronizer, and client.

// =============================================================================
// Grid & movement
// =============================================================================

/// Side length of one grid tile, in pixels. All collision and movement are
/// quantized to this.
pub const TILE_SIZE: i32 = 32;

/// Pixels a transitioning actor advances per frame. Must divide `TILE_SIZE`.
pub const MOVEMENT_SPEED: i32 = 2;

/// Manhattan tile distance beyond which an authoritative position is treated
/// as a teleport and the local actor hard-snaps instead of interpolating.
pub const SNAP_DISTANCE_TILES: i32 = 2;

// =============================================================================
// View
// =============================================================================

/// Logical view size (16:9 retro resolution); the window scales this up.
pub const VIEW_WIDTH: i32 = 480;
pub const VIEW_HEIGHT: i32 = 270;

// =============================================================================
// Interaction
// =============================================================================

/// Radius (pixels) within which the interaction resolver considers a target.
pub const INTERACTION_RANGE: f32 = (TILE_SIZE * 2) as f32;

/// Radius (pixels) for showing sign labels and NPC hints.
pub const HINT_RANGE: f32 = TILE_SIZE as f32 * 1.5;

// =============================================================================
// Chat
// =============================================================================

/// Maximum chat messages retained in memory per room.
pub const CHAT_LOG_CAP: usize = 50;

/// Maximum characters accepted in a single chat message.
pub const MAX_CHAT_LEN: usize = 200;

/// How long a chat bubble stays above an avatar, in milliseconds.
pub const CHAT_BUBBLE_MS: u64 = 5_000;

// =============================================================================
// Progression
// =============================================================================

/// XP required per level; `level = xp / XP_PER_LEVEL + 1`.
pub const XP_PER_LEVEL: i64 = 100;

/// Questions per quiz.
pub const QUIZ_LEN: usize = 5;

/// Fraction of questions that must be answered correctly to pass a quiz.
pub const QUIZ_PASS_RATIO: f64 = 0.6;

/// Player level at which quizzes move to tier 2 (intermediate).
pub const TIER2_LEVEL: u32 = 3;
/// Player level at which quizzes move to tier 3 (advanced).
pub const TIER3_LEVEL: u32 = 6;

/// XP granted per question, multiplied by the quiz tier (1..=3).
pub const XP_PER_QUESTION_BASE: i64 = 10;

// =============================================================================
// Minigames
// =============================================================================

/// XP when the keeper saves a penalty shot.
pub const PENALTY_SAVE_XP: i64 = 10;
/// XP for a scored penalty goal.
pub const PENALTY_GOAL_XP: i64 = 100;

/// Sprint progress gained per valid (alternating) tap, in percent.
pub const SPRINT_TAP_PROGRESS: f32 = 5.0;
/// Sprint finish-time thresholds (seconds) and their rewards.
pub const SPRINT_FAST_SECS: f32 = 8.0;
pub const SPRINT_GOOD_SECS: f32 = 12.0;
pub const SPRINT_FAST_XP: i64 = 100;
pub const SPRINT_GOOD_XP: i64 = 50;
pub const SPRINT_SLOW_XP: i64 = 20;

// =============================================================================
// Rooms
// =============================================================================

pub const ROOM_ENTRANCE: &str = "entrance";
pub const ROOM_QUAD: &str = "quad";
pub const ROOM_LIBRARY: &str = "library";
pub const ROOM_CAFE: &str = "cafe";
pub const ROOM_TRACK: &str = "track";
pub const ROOM_COURSE_CS: &str = "course_cs";
pub const ROOM_COURSE_MATH: &str = "course_math";
pub const ROOM_COURSE_ART: &str = "course_art";
pub const ROOM_COURSE_HISTORY: &str = "course_history";

/// Generic warp target that the client redirects to the local player's own
/// private room (`DORM_PREFIX + player id`).
pub const DORM_WARP_TARGET: &str = "dorm";

/// Prefix for synthesized per-player private rooms.
pub const DORM_PREFIX: &str = "dorm_";

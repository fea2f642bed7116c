pub mod chat;
pub mod course;
pub mod direction;
pub mod geometry;
pub mod npc;
pub mod object;
pub mod presence;
pub mod profile;
pub mod quiz;
pub mod room;

pub use chat::ChatMessage;
pub use course::{course_by_id, courses_in, Course, Department, COURSE_CATALOG};
pub use direction::Direction;
pub use geometry::{Position, Rect};
pub use npc::{Npc, NpcRole};
pub use object::{ObjectAction, ObjectKind, PlacedObject, PropKind, Surface};
pub use presence::{Emote, LastMessage, PresenceRecord};
pub use profile::{DormConfig, ProfilePatch, UserProfile};
pub use quiz::{Question, Quiz, Tier};
pub use room::{RoomClass, RoomDefinition, Warp};

use crate::types::course::Department;
use crate::types::direction::Direction;
use crate::types::geometry::Position;

/// What an NPC does when activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NpcRole {
    Professor,
    Student,
    Visitor,
    /// Offers a quiz in its department instead of plain dialogue.
    QuizMaster,
}

/// A non-player character pinned to a room.
#[derive(Debug, Clone, Copy)]
pub struct Npc {
    pub id: &'static str,
    pub name: &'static str,
    pub position: Position,
    pub facing: Direction,
    pub color: &'static str,
    pub role: NpcRole,
    pub department: Option<Department>,
    pub dialogues: &'static [&'static str],
}

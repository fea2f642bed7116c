use serde::{Deserialize, Serialize};

use crate::types::direction::Direction;

/// Transient emote shown above an avatar until cleared or until the player
/// moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emote {
    Wave,
    Dance,
    Heart,
    Exclaim,
}

/// Last chat line a participant sent, for the speech-bubble overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastMessage {
    pub text: String,
    pub timestamp: u64,
}

/// One participant's live presence in a room: the unit of real-time
/// synchronization. The local player's entry is advisory only; local
/// authority stays with the movement engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceRecord {
    pub id: String,
    pub name: String,
    pub color: String,
    pub room: String,
    pub x: f32,
    pub y: f32,
    pub facing: Direction,
    #[serde(default)]
    pub moving: bool,
    #[serde(default)]
    pub target_x: Option<f32>,
    #[serde(default)]
    pub target_y: Option<f32>,
    #[serde(default)]
    pub hat: Option<String>,
    #[serde(default)]
    pub glasses: Option<String>,
    #[serde(default)]
    pub emote: Option<Emote>,
    #[serde(default)]
    pub last_message: Option<LastMessage>,
}

impl PresenceRecord {
    /// Entries failing this check are dropped from the roster rather than
    /// rendered: identity and name must be non-empty, coordinates finite.
    pub fn is_valid(&self) -> bool {
        !self.id.is_empty() && !self.name.is_empty() && self.x.is_finite() && self.y.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PresenceRecord {
        PresenceRecord {
            id: "p1".into(),
            name: "Waddles".into(),
            color: "#3b82f6".into(),
            room: "quad".into(),
            x: 64.0,
            y: 96.0,
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
    fn well_formed_record_is_valid() {
        assert!(record().is_valid());
    }

    #[test]
    fn empty_identity_or_name_is_invalid() {
        let mut r = record();
        r.id.clear();
        assert!(!r.is_valid());

        let mut r = record();
        r.name.clear();
        assert!(!r.is_valid());
    }

    #[test]
    fn non_finite_coordinates_are_invalid() {
        let mut r = record();
        r.x = f32::NAN;
        assert!(!r.is_valid());

        let mut r = record();
        r.y = f32::INFINITY;
        assert!(!r.is_valid());
    }
}

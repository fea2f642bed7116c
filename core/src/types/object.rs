use crate::types::geometry::Rect;

/// Walkable surface variants used as room base terrain and floor overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Grass,
    Wood,
    Tile,
    Stone,
    Clay,
}

/// Small decorative table-top props. Never collide, never interact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropKind {
    Laptop,
    Easel,
    Globe,
    Books,
    Papers,
    Coffee,
    Plant,
}

/// Closed set of placeable object kinds.
///
/// Walkability and interactivity are decided here, in one place, instead of
/// by string comparisons scattered through collision and render code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Floor(Surface),
    /// Decorative archway spanning the entrance. Walkable despite its size.
    Gate,
    Flower,
    /// Penalty marker. Decorative copies are excluded from interaction.
    PenaltySpot {
        decorative: bool,
    },
    Prop(PropKind),
    Blackboard,
    Wall,
    Building,
    Desk,
    StudyDesk,
    Tree,
    Bush,
    Water,
    Bench,
    Column,
    Chair,
    Computer,
    SoccerGoal,
    Sign,
    Flag,
    /// The checkered sprint-start flag on the track. Solid, interactive.
    SprintFlag,
    StadiumSeating,
    Bed,
}

/// Effect an interactive object triggers when activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectAction {
    Study,
    Penalty,
    Sprint,
}

impl ObjectKind {
    /// Whether a tile overlapping this object rejects movement.
    pub fn blocks(self) -> bool {
        !matches!(
            self,
            ObjectKind::Floor(_)
                | ObjectKind::Gate
                | ObjectKind::Flower
                | ObjectKind::PenaltySpot { .. }
                | ObjectKind::Prop(_)
                | ObjectKind::Blackboard
        )
    }

    pub fn is_floor(self) -> bool {
        matches!(self, ObjectKind::Floor(_))
    }

    /// Small props render above same-row furniture in the depth sort.
    pub fn is_prop(self) -> bool {
        matches!(self, ObjectKind::Prop(_))
    }

    /// The interaction this object offers, if any.
    pub fn action(self) -> Option<ObjectAction> {
        match self {
            ObjectKind::StudyDesk => Some(ObjectAction::Study),
            ObjectKind::PenaltySpot { decorative: false } => Some(ObjectAction::Penalty),
            ObjectKind::SprintFlag => Some(ObjectAction::Sprint),
            _ => None,
        }
    }
}

/// An object placed into a room at a fixed pixel rect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedObject {
    pub rect: Rect,
    pub kind: ObjectKind,
    pub color: Option<&'static str>,
    pub label: Option<&'static str>,
}

impl PlacedObject {
    pub const fn new(rect: Rect, kind: ObjectKind) -> Self {
        Self {
            rect,
            kind,
            color: None,
            label: None,
        }
    }

    pub const fn colored(rect: Rect, kind: ObjectKind, color: &'static str) -> Self {
        Self {
            rect,
            kind,
            color: Some(color),
            label: None,
        }
    }

    pub const fn labeled(rect: Rect, kind: ObjectKind, label: &'static str) -> Self {
        Self {
            rect,
            kind,
            color: None,
            label: Some(label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floors_and_small_decor_walkable() {
        assert!(!ObjectKind::Floor(Surface::Stone).blocks());
        assert!(!ObjectKind::Gate.blocks());
        assert!(!ObjectKind::Flower.blocks());
        assert!(!ObjectKind::Prop(PropKind::Coffee).blocks());
        assert!(!ObjectKind::PenaltySpot { decorative: true }.blocks());
        assert!(!ObjectKind::Blackboard.blocks());
    }

    #[test]
    fn scenery_blocks() {
        for kind in [
            ObjectKind::Wall,
            ObjectKind::Building,
            ObjectKind::Desk,
            ObjectKind::StudyDesk,
            ObjectKind::Water,
            ObjectKind::Bed,
            ObjectKind::SprintFlag,
            ObjectKind::SoccerGoal,
        ] {
            assert!(kind.blocks(), "{kind:?} should block");
        }
    }

    #[test]
    fn decorative_penalty_spot_is_not_interactive() {
        assert_eq!(
            ObjectKind::PenaltySpot { decorative: true }.action(),
            None
        );
        assert_eq!(
            ObjectKind::PenaltySpot { decorative: false }.action(),
            Some(ObjectAction::Penalty)
        );
    }
}

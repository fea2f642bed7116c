use anyhow::{bail, Result};

use crate::constants::TILE_SIZE;
use crate::types::direction::Direction;
use crate::types::geometry::{Position, Rect};
use crate::types::npc::Npc;
use crate::types::object::{PlacedObject, Surface};

/// Informational room category. Affects overlays only, never physics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomClass {
    Public,
    Course,
    Private,
}

/// A zone that redirects an actor entering it to another room.
#[derive(Debug, Clone, Copy)]
pub struct Warp {
    pub rect: Rect,
    pub target_room: &'static str,
    pub target_position: Position,
    pub target_facing: Direction,
    pub label: Option<&'static str>,
}

/// Immutable definition of one room: bounds, terrain, placed objects, NPCs,
/// and warp zones.
#[derive(Debug, Clone)]
pub struct RoomDefinition {
    pub id: String,
    pub name: String,
    pub width: i32,
    pub height: i32,
    pub spawn: Position,
    pub class: RoomClass,
    pub base_tile: Surface,
    pub objects: Vec<PlacedObject>,
    pub npcs: Vec<Npc>,
    pub warps: Vec<Warp>,
}

impl RoomDefinition {
    /// Validates intra-room invariants. Malformed room data is a fatal
    /// configuration error; callers must not render a room that fails here.
    pub fn validate(&self) -> Result<()> {
        if self.width <= 0 || self.height <= 0 {
            bail!("room '{}' has non-positive dimensions", self.id);
        }
        if self.width % TILE_SIZE != 0 || self.height % TILE_SIZE != 0 {
            bail!(
                "room '{}' dimensions {}x{} are not tile-aligned",
                self.id,
                self.width,
                self.height
            );
        }

        let bounds = Rect::new(0, 0, self.width, self.height);
        if self.spawn.x < 0
            || self.spawn.y < 0
            || self.spawn.x >= self.width
            || self.spawn.y >= self.height
        {
            bail!("room '{}' spawn is out of bounds", self.id);
        }

        for obj in &self.objects {
            // Blocking geometry must sit on whole tiles; decorative sub-tile
            // objects are exempt because they never participate in collision.
            if obj.kind.blocks() && !obj.rect.is_tile_aligned() {
                bail!(
                    "room '{}': blocking {:?} at ({}, {}) is not tile-aligned",
                    self.id,
                    obj.kind,
                    obj.rect.x,
                    obj.rect.y
                );
            }
            if obj.kind.blocks() && !obj.rect.overlaps(&bounds) {
                bail!(
                    "room '{}': blocking {:?} lies entirely outside the room",
                    self.id,
                    obj.kind
                );
            }
        }

        for warp in &self.warps {
            if !warp.rect.is_tile_aligned() {
                bail!("room '{}': warp to '{}' is not tile-aligned", self.id, warp.target_room);
            }
            if !warp.rect.overlaps(&bounds) {
                bail!("room '{}': warp to '{}' is out of bounds", self.id, warp.target_room);
            }
        }

        Ok(())
    }
}

//! Grid movement & collision engine.
//!
//! Translates directional intent into a deterministic sequence of one-tile
//! transitions and produces move/warp events. The step function is pure with
//! respect to I/O: callers dispatch the returned events to the synchronizer.

use crate::constants::{MOVEMENT_SPEED, SNAP_DISTANCE_TILES, TILE_SIZE};
use crate::types::{Direction, Rect, RoomDefinition, Warp};

/// Combined per-frame input, already merged by the caller (virtual pad takes
/// priority over keyboard when both are held).
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    pub direction: Option<Direction>,
    pub interact: bool,
    pub controls_enabled: bool,
}

/// Events one engine step can emit. At most one movement event per step.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Broadcast the local position and facing to peers.
    PositionUpdate {
        x: i32,
        y: i32,
        facing: Direction,
    },
    /// The actor finished a step onto a warp zone.
    RoomChange {
        target_room: &'static str,
        x: i32,
        y: i32,
        facing: Direction,
    },
    /// The activate key fired while at rest; run the interaction resolver.
    Interact,
}

/// The local player's authoritative movement state.
///
/// Exactly one of {at rest, transitioning} holds at any time. While
/// transitioning, `pixel` position equals the linear interpolation between
/// the resting cell and the target cell at `progress / TILE_SIZE`.
#[derive(Debug, Clone)]
pub struct GridActor {
    grid_x: i32,
    grid_y: i32,
    pixel_x: i32,
    pixel_y: i32,
    target_x: i32,
    target_y: i32,
    moving: bool,
    progress: i32,
    facing: Direction,
    initialized: bool,
}

impl Default for GridActor {
    fn default() -> Self {
        Self::new()
    }
}

impl GridActor {
    pub fn new() -> Self {
        Self {
            grid_x: 0,
            grid_y: 0,
            pixel_x: 0,
            pixel_y: 0,
            target_x: 0,
            target_y: 0,
            moving: false,
            progress: 0,
            facing: Direction::Down,
            initialized: false,
        }
    }

    pub fn grid(&self) -> (i32, i32) {
        (self.grid_x, self.grid_y)
    }

    pub fn pixel(&self) -> (i32, i32) {
        (self.pixel_x, self.pixel_y)
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// Reconciles against the authoritative remote position.
    ///
    /// Hard-snaps (no interpolation) on first load or when the remote cell is
    /// more than `SNAP_DISTANCE_TILES` away in Manhattan distance — a warp,
    /// spawn, or teleport. Small disagreements are ignored; local prediction
    /// stays authoritative for ordinary movement.
    pub fn sync_authoritative(&mut self, x: f32, y: f32, facing: Direction) {
        let gx = (x / TILE_SIZE as f32).round() as i32;
        let gy = (y / TILE_SIZE as f32).round() as i32;

        let dist = (gx - self.grid_x).abs() + (gy - self.grid_y).abs();
        if dist > SNAP_DISTANCE_TILES || !self.initialized {
            self.grid_x = gx;
            self.grid_y = gy;
            self.pixel_x = gx * TILE_SIZE;
            self.pixel_y = gy * TILE_SIZE;
            self.target_x = self.pixel_x;
            self.target_y = self.pixel_y;
            self.moving = false;
            self.progress = 0;
            self.facing = facing;
            self.initialized = true;
        }
    }

    /// Advances the actor by one frame.
    pub fn step(&mut self, room: &RoomDefinition, input: &FrameInput) -> Vec<EngineEvent> {
        let mut events = Vec::new();

        if self.moving {
            // Motion is atomic per tile: no new input until the transition
            // completes. This prevents diagonal drift and double-counted
            // warps.
            self.progress += MOVEMENT_SPEED;
            if self.progress >= TILE_SIZE {
                self.pixel_x = self.target_x;
                self.pixel_y = self.target_y;
                self.grid_x = self.target_x / TILE_SIZE;
                self.grid_y = self.target_y / TILE_SIZE;
                self.moving = false;
                self.progress = 0;

                if let Some(w) = warp_at(room, self.grid_x, self.grid_y) {
                    events.push(EngineEvent::RoomChange {
                        target_room: w.target_room,
                        x: w.target_position.x,
                        y: w.target_position.y,
                        facing: w.target_facing,
                    });
                } else {
                    events.push(EngineEvent::PositionUpdate {
                        x: self.pixel_x,
                        y: self.pixel_y,
                        facing: self.facing,
                    });
                }
            } else {
                match self.facing {
                    Direction::Up => self.pixel_y -= MOVEMENT_SPEED,
                    Direction::Down => self.pixel_y += MOVEMENT_SPEED,
                    Direction::Left => self.pixel_x -= MOVEMENT_SPEED,
                    Direction::Right => self.pixel_x += MOVEMENT_SPEED,
                }
            }
            return events;
        }

        if !input.controls_enabled {
            return events;
        }

        // Activation only fires at rest.
        if input.interact {
            events.push(EngineEvent::Interact);
        }

        if let Some(dir) = input.direction {
            let (dx, dy) = dir.delta();
            let next_gx = self.grid_x + dx;
            let next_gy = self.grid_y + dy;
            let prev_facing = self.facing;
            self.facing = dir;

            if !is_blocked(room, next_gx, next_gy) {
                self.moving = true;
                self.target_x = next_gx * TILE_SIZE;
                self.target_y = next_gy * TILE_SIZE;
                // Broadcast immediately so peers see the facing and intent
                // without waiting for tile completion.
                events.push(EngineEvent::PositionUpdate {
                    x: self.pixel_x,
                    y: self.pixel_y,
                    facing: self.facing,
                });
            } else if prev_facing != dir {
                // Turn in place: still broadcast so peers see the new facing.
                events.push(EngineEvent::PositionUpdate {
                    x: self.pixel_x,
                    y: self.pixel_y,
                    facing: self.facing,
                });
            }
        }

        events
    }
}

/// The warp occupying grid cell `(gx, gy)`, if any.
pub fn warp_at(room: &RoomDefinition, gx: i32, gy: i32) -> Option<&Warp> {
    let cell = Rect::tile(gx, gy);
    room.warps.iter().find(|w| w.rect.overlaps(&cell))
}

/// Whether grid cell `(gx, gy)` rejects movement.
///
/// Check order is fixed: boundary, then warp override (a door tile is never
/// blocked by scenery drawn beneath it), then object overlap.
pub fn is_blocked(room: &RoomDefinition, gx: i32, gy: i32) -> bool {
    if gx < 0 || gy < 0 || gx * TILE_SIZE >= room.width || gy * TILE_SIZE >= room.height {
        return true;
    }

    if warp_at(room, gx, gy).is_some() {
        return false;
    }

    let cell = Rect::tile(gx, gy);
    for obj in &room.objects {
        if !obj.kind.blocks() {
            continue;
        }
        // Degenerate geometry is ambiguous; fail safe and block the tile the
        // rect anchors to rather than letting it be walked through.
        if obj.rect.w <= 0 || obj.rect.h <= 0 {
            if cell.overlaps(&Rect::new(obj.rect.x, obj.rect.y, 1, 1)) {
                return true;
            }
            continue;
        }
        if obj.rect.overlaps(&cell) {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ObjectKind, PlacedObject, Position, RoomClass, Surface};

    /// A bare 10x10 test room.
    fn test_room() -> RoomDefinition {
        RoomDefinition {
            id: "test".to_string(),
            name: "Test Room".to_string(),
            width: 10 * TILE_SIZE,
            height: 10 * TILE_SIZE,
            spawn: Position::new(5 * TILE_SIZE, 5 * TILE_SIZE),
            class: RoomClass::Public,
            base_tile: Surface::Grass,
            objects: vec![],
            npcs: vec![],
            warps: vec![],
        }
    }

    fn actor_at(gx: i32, gy: i32) -> GridActor {
        let mut actor = GridActor::new();
        actor.sync_authoritative((gx * TILE_SIZE) as f32, (gy * TILE_SIZE) as f32, Direction::Down);
        actor
    }

    fn input(direction: Option<Direction>) -> FrameInput {
        FrameInput {
            direction,
            interact: false,
            controls_enabled: true,
        }
    }

    const FRAMES_PER_TILE: i32 = TILE_SIZE / MOVEMENT_SPEED;

    #[test]
    fn straight_walk_completes_with_one_final_update() {
        let room = test_room();
        let mut actor = actor_at(5, 5);

        // First frame starts the transition and broadcasts intent.
        let events = actor.step(&room, &input(Some(Direction::Up)));
        assert_eq!(
            events,
            vec![EngineEvent::PositionUpdate {
                x: 5 * TILE_SIZE,
                y: 5 * TILE_SIZE,
                facing: Direction::Up,
            }]
        );
        assert!(actor.is_moving());

        // Keep holding the key; no further events until the tile completes.
        let mut completion_events = Vec::new();
        for _ in 0..FRAMES_PER_TILE {
            completion_events.extend(actor.step(&room, &input(Some(Direction::Up))));
        }

        assert_eq!(actor.grid(), (5, 4));
        assert_eq!(actor.facing(), Direction::Up);
        assert_eq!(
            completion_events,
            vec![EngineEvent::PositionUpdate {
                x: 5 * TILE_SIZE,
                y: 4 * TILE_SIZE,
                facing: Direction::Up,
            }]
        );
    }

    #[test]
    fn pixels_snap_to_grid_after_each_transition() {
        let room = test_room();
        let mut actor = actor_at(5, 5);

        for dir in [Direction::Right, Direction::Down, Direction::Left] {
            actor.step(&room, &input(Some(dir)));
            for _ in 0..FRAMES_PER_TILE {
                actor.step(&room, &input(None));
            }
            let (gx, gy) = actor.grid();
            assert_eq!(actor.pixel(), (gx * TILE_SIZE, gy * TILE_SIZE));
            assert!(!actor.is_moving());
        }
    }

    #[test]
    fn no_input_accepted_mid_transition() {
        let room = test_room();
        let mut actor = actor_at(5, 5);

        actor.step(&room, &input(Some(Direction::Right)));
        assert!(actor.is_moving());

        // Trying to reverse mid-flight must not change the target.
        for _ in 0..3 {
            let events = actor.step(&room, &input(Some(Direction::Left)));
            assert!(events.is_empty());
            assert_eq!(actor.facing(), Direction::Right);
        }

        for _ in 0..FRAMES_PER_TILE {
            actor.step(&room, &input(Some(Direction::Left)));
        }
        // The original transition completed; only then is new input read.
        assert_eq!(actor.grid().0, 6);
    }

    #[test]
    fn blocked_walk_turns_in_place_and_broadcasts() {
        let mut room = test_room();
        room.objects.push(PlacedObject::new(
            Rect::tile(6, 5),
            ObjectKind::Wall,
        ));
        let mut actor = actor_at(5, 5);

        let events = actor.step(&room, &input(Some(Direction::Right)));
        assert!(!actor.is_moving());
        assert_eq!(actor.facing(), Direction::Right);
        assert_eq!(
            events,
            vec![EngineEvent::PositionUpdate {
                x: 5 * TILE_SIZE,
                y: 5 * TILE_SIZE,
                facing: Direction::Right,
            }]
        );

        // Same blocked direction again: facing unchanged, nothing to say.
        let events = actor.step(&room, &input(Some(Direction::Right)));
        assert!(events.is_empty());
    }

    #[test]
    fn boundary_cells_are_rejected() {
        let room = test_room();
        assert!(is_blocked(&room, -1, 0));
        assert!(is_blocked(&room, 0, -1));
        assert!(is_blocked(&room, 10, 0));
        assert!(is_blocked(&room, 0, 10));
        assert!(!is_blocked(&room, 0, 0));
        assert!(!is_blocked(&room, 9, 9));
    }

    #[test]
    fn warp_overrides_blocking_object() {
        let mut room = test_room();
        room.objects.push(PlacedObject::new(
            Rect::tile(3, 3),
            ObjectKind::Building,
        ));
        assert!(is_blocked(&room, 3, 3));

        room.warps.push(Warp {
            rect: Rect::tile(3, 3),
            target_room: "test",
            target_position: Position::new(0, 0),
            target_facing: Direction::Down,
            label: None,
        });
        assert!(!is_blocked(&room, 3, 3));
    }

    #[test]
    fn stepping_onto_warp_emits_room_change_only() {
        let mut room = test_room();
        room.warps.push(Warp {
            rect: Rect::tile(5, 4),
            target_room: "quad",
            target_position: Position::new(2 * TILE_SIZE, 3 * TILE_SIZE),
            target_facing: Direction::Up,
            label: None,
        });
        let mut actor = actor_at(5, 5);

        actor.step(&room, &input(Some(Direction::Up)));
        let mut events = Vec::new();
        for _ in 0..FRAMES_PER_TILE {
            events.extend(actor.step(&room, &input(None)));
        }

        assert_eq!(
            events,
            vec![EngineEvent::RoomChange {
                target_room: "quad",
                x: 2 * TILE_SIZE,
                y: 3 * TILE_SIZE,
                facing: Direction::Up,
            }]
        );
    }

    #[test]
    fn walkable_decor_does_not_block() {
        let mut room = test_room();
        room.objects.push(PlacedObject::new(
            Rect::tile(4, 5),
            ObjectKind::Flower,
        ));
        room.objects.push(PlacedObject::new(
            Rect::tile(6, 5),
            ObjectKind::Floor(Surface::Stone),
        ));
        assert!(!is_blocked(&room, 4, 5));
        assert!(!is_blocked(&room, 6, 5));
    }

    #[test]
    fn degenerate_geometry_blocks_its_anchor_tile() {
        let mut room = test_room();
        room.objects.push(PlacedObject::new(
            Rect::new(4 * TILE_SIZE, 5 * TILE_SIZE, 0, 0),
            ObjectKind::Wall,
        ));
        assert!(is_blocked(&room, 4, 5));
        assert!(!is_blocked(&room, 3, 5));
    }

    #[test]
    fn interact_only_fires_at_rest() {
        let room = test_room();
        let mut actor = actor_at(5, 5);

        let events = actor.step(
            &room,
            &FrameInput {
                direction: None,
                interact: true,
                controls_enabled: true,
            },
        );
        assert_eq!(events, vec![EngineEvent::Interact]);

        actor.step(&room, &input(Some(Direction::Down)));
        assert!(actor.is_moving());
        let events = actor.step(
            &room,
            &FrameInput {
                direction: None,
                interact: true,
                controls_enabled: true,
            },
        );
        assert!(!events.contains(&EngineEvent::Interact));
    }

    #[test]
    fn disabled_controls_still_finish_current_transition() {
        let room = test_room();
        let mut actor = actor_at(5, 5);

        actor.step(&room, &input(Some(Direction::Down)));
        assert!(actor.is_moving());

        let disabled = FrameInput {
            direction: Some(Direction::Down),
            interact: true,
            controls_enabled: false,
        };
        let mut events = Vec::new();
        for _ in 0..FRAMES_PER_TILE {
            events.extend(actor.step(&room, &disabled));
        }
        // The in-flight tile completes and publishes, but no new motion or
        // interaction is accepted afterwards.
        assert_eq!(actor.grid(), (5, 6));
        assert_eq!(events.len(), 1);
        let events = actor.step(&room, &disabled);
        assert!(events.is_empty());
        assert!(!actor.is_moving());
    }

    #[test]
    fn authoritative_sync_snaps_only_on_large_disagreement() {
        let mut actor = actor_at(5, 5);

        // Two tiles away: within tolerance, ignored.
        actor.sync_authoritative(
            (7 * TILE_SIZE) as f32,
            (5 * TILE_SIZE) as f32,
            Direction::Left,
        );
        assert_eq!(actor.grid(), (5, 5));
        assert_eq!(actor.facing(), Direction::Down);

        // Three tiles away: teleport, hard snap.
        actor.sync_authoritative(
            (8 * TILE_SIZE) as f32,
            (5 * TILE_SIZE) as f32,
            Direction::Left,
        );
        assert_eq!(actor.grid(), (8, 5));
        assert_eq!(actor.pixel(), (8 * TILE_SIZE, 5 * TILE_SIZE));
        assert_eq!(actor.facing(), Direction::Left);
        assert!(!actor.is_moving());
    }
}

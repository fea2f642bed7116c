//! Camera clamping and draw-order rules.
//!
//! These are pure functions so the render loop stays a deterministic consumer
//! of state, and so the rules other systems rely on (what is visible, what
//! occludes what) stay testable without a window.

use crate::constants::{TILE_SIZE, VIEW_HEIGHT, VIEW_WIDTH};
use crate::types::{ObjectKind, PlacedObject, RoomDefinition};

/// Top-left world coordinate of the camera for an actor at `(pixel_x,
/// pixel_y)`.
///
/// Centers on the actor, clamps to the room bounds, and centers the room
/// itself (negative origin) when it is smaller than the view.
pub fn camera_origin(pixel_x: i32, pixel_y: i32, room_width: i32, room_height: i32) -> (i32, i32) {
    let mut cam_x = pixel_x + TILE_SIZE / 2 - VIEW_WIDTH / 2;
    let mut cam_y = pixel_y + TILE_SIZE / 2 - VIEW_HEIGHT / 2;

    cam_x = cam_x.clamp(0, (room_width - VIEW_WIDTH).max(0));
    cam_y = cam_y.clamp(0, (room_height - VIEW_HEIGHT).max(0));

    if room_width < VIEW_WIDTH {
        cam_x = -(VIEW_WIDTH - room_width) / 2;
    }
    if room_height < VIEW_HEIGHT {
        cam_y = -(VIEW_HEIGHT - room_height) / 2;
    }

    (cam_x, cam_y)
}

/// Floor overlays, drawn before everything else in data order.
pub fn floor_objects(room: &RoomDefinition) -> impl Iterator<Item = &PlacedObject> {
    room.objects.iter().filter(|o| o.kind.is_floor())
}

/// Non-floor scenery in draw order: sorted by y so lower objects occlude
/// higher ones, with small props above same-row furniture; the gate archway
/// draws above everything.
pub fn scenery_order(room: &RoomDefinition) -> Vec<&PlacedObject> {
    let mut scenery: Vec<&PlacedObject> = room
        .objects
        .iter()
        .filter(|o| !o.kind.is_floor() && o.kind != ObjectKind::Gate)
        .collect();

    scenery.sort_by(|a, b| {
        a.rect
            .y
            .cmp(&b.rect.y)
            .then_with(|| a.kind.is_prop().cmp(&b.kind.is_prop()))
    });

    scenery.extend(
        room.objects
            .iter()
            .filter(|o| o.kind == ObjectKind::Gate),
    );
    scenery
}

/// Sorts character indices by their y position for depth.
pub fn character_order<T>(characters: &[T], y_of: impl Fn(&T) -> f32) -> Vec<usize> {
    let mut order: Vec<usize> = (0..characters.len()).collect();
    order.sort_by(|&a, &b| {
        y_of(&characters[a])
            .partial_cmp(&y_of(&characters[b]))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PropKind, Rect};

    #[test]
    fn camera_centers_on_actor_inside_large_room() {
        let (cx, cy) = camera_origin(640, 640, 2048, 2048);
        assert_eq!(cx, 640 + 16 - VIEW_WIDTH / 2);
        assert_eq!(cy, 640 + 16 - VIEW_HEIGHT / 2);
    }

    #[test]
    fn camera_clamps_to_room_edges() {
        let (cx, cy) = camera_origin(0, 0, 1024, 1024);
        assert_eq!((cx, cy), (0, 0));

        let (cx, cy) = camera_origin(1000, 1000, 1024, 1024);
        assert_eq!(cx, 1024 - VIEW_WIDTH);
        assert_eq!(cy, 1024 - VIEW_HEIGHT);
    }

    #[test]
    fn small_rooms_are_centered_in_view() {
        // A 320x192 dorm-sized room is smaller than the 480x270 view.
        let (cx, cy) = camera_origin(64, 64, 320, 192);
        assert_eq!(cx, -(VIEW_WIDTH - 320) / 2);
        assert_eq!(cy, -(VIEW_HEIGHT - 192) / 2);
    }

    fn room_with(objects: Vec<PlacedObject>) -> RoomDefinition {
        RoomDefinition {
            id: "test".to_string(),
            name: "Test".to_string(),
            width: 640,
            height: 640,
            spawn: crate::types::Position::new(0, 0),
            class: crate::types::RoomClass::Public,
            base_tile: crate::types::Surface::Grass,
            objects,
            npcs: vec![],
            warps: vec![],
        }
    }

    #[test]
    fn scenery_sorts_by_y_with_props_on_top_and_gate_last() {
        let desk_low = PlacedObject::new(Rect::new(0, 96, 64, 32), ObjectKind::Desk);
        let desk_high = PlacedObject::new(Rect::new(0, 32, 64, 32), ObjectKind::Desk);
        let prop_same_row = PlacedObject::new(
            Rect::new(8, 32, 32, 32),
            ObjectKind::Prop(PropKind::Coffee),
        );
        let gate = PlacedObject::new(Rect::new(0, 0, 448, 128), ObjectKind::Gate);
        let floor = PlacedObject::new(
            Rect::new(0, 0, 640, 640),
            ObjectKind::Floor(crate::types::Surface::Stone),
        );

        let room = room_with(vec![gate, desk_low, prop_same_row, desk_high, floor]);
        let order = scenery_order(&room);
        let kinds: Vec<ObjectKind> = order.iter().map(|o| o.kind).collect();

        assert_eq!(
            kinds,
            vec![
                ObjectKind::Desk, // y=32 furniture first
                ObjectKind::Prop(PropKind::Coffee), // same row, prop on top
                ObjectKind::Desk, // y=96
                ObjectKind::Gate, // always last
            ]
        );
    }

    #[test]
    fn floors_are_excluded_from_scenery() {
        let floor = PlacedObject::new(
            Rect::new(0, 0, 640, 640),
            ObjectKind::Floor(crate::types::Surface::Stone),
        );
        let room = room_with(vec![floor]);
        assert!(scenery_order(&room).is_empty());
        assert_eq!(floor_objects(&room).count(), 1);
    }

    #[test]
    fn characters_sort_by_y() {
        let ys = [50.0_f32, 10.0, 30.0];
        let order = character_order(&ys, |y| *y);
        assert_eq!(order, vec![1, 2, 0]);
    }
}

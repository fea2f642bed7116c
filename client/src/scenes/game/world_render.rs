//! Canvas rendering of the room world: terrain, scenery, warps, avatars.
//! All art is procedural rects in a fixed retro palette; text and overlays
//! are drawn by the egui layer on top.

use std::time::{SystemTime, UNIX_EPOCH};

use sdl2::pixels::Color;
use sdl2::rect::Rect as SdlRect;
use sdl2::render::{BlendMode, Canvas};
use sdl2::video::Window;

use campus_core::camera;
use campus_core::catalog::RoomCatalog;
use campus_core::constants::TILE_SIZE;
use campus_core::types::{Direction, ObjectKind, PlacedObject, PropKind, Surface};

use super::GameScene;
use crate::color;
use crate::state::AppState;

const SCALE: i32 = crate::PIXEL_SCALE as i32;

/// World-to-screen transform for the current camera.
#[derive(Clone, Copy)]
pub(super) struct Viewport {
    pub cam_x: i32,
    pub cam_y: i32,
}

impl Viewport {
    pub(super) fn for_scene(scene: &GameScene) -> Option<Viewport> {
        let room = scene.room.as_ref()?;
        let (px, py) = scene.actor.pixel();
        let (cam_x, cam_y) = camera::camera_origin(px, py, room.width, room.height);
        Some(Viewport { cam_x, cam_y })
    }

    pub(super) fn to_screen(&self, x: f32, y: f32) -> (f32, f32) {
        (
            (x - self.cam_x as f32) * SCALE as f32,
            (y - self.cam_y as f32) * SCALE as f32,
        )
    }

    fn rect(&self, x: i32, y: i32, w: i32, h: i32) -> SdlRect {
        SdlRect::new(
            (x - self.cam_x) * SCALE,
            (y - self.cam_y) * SCALE,
            (w * SCALE).max(1) as u32,
            (h * SCALE).max(1) as u32,
        )
    }
}

fn surface_color(surface: Surface) -> Color {
    match surface {
        Surface::Grass => Color::RGB(0x4a, 0xde, 0x80),
        Surface::Wood => Color::RGB(0xb4, 0x53, 0x09),
        Surface::Tile => Color::RGB(0xe5, 0xe7, 0xeb),
        Surface::Stone => Color::RGB(0xd6, 0xd3, 0xd1),
        Surface::Clay => Color::RGB(0xc2, 0x41, 0x0c),
    }
}

struct CharacterSprite {
    x: f32,
    y: f32,
    color: Color,
    facing: Direction,
    moving: bool,
    has_hat: bool,
    has_glasses: bool,
    idle_bounce: bool,
}

pub(super) fn render(
    scene: &GameScene,
    app_state: &AppState,
    canvas: &mut Canvas<Window>,
) -> Result<(), String> {
    canvas.set_draw_color(Color::BLACK);
    canvas.clear();
    canvas.set_blend_mode(BlendMode::Blend);

    let Some(room) = scene.room.as_ref() else {
        return Ok(());
    };
    let Some(view) = Viewport::for_scene(scene) else {
        return Ok(());
    };
    let now_millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    // Base terrain, with the player's dorm palette applied in their own room.
    let own_dorm = app_state
        .player_id()
        .map(|id| room.id == RoomCatalog::dorm_room_id(id))
        .unwrap_or(false);
    let dorm_config = app_state.profile().and_then(|p| p.dorm_config.clone());

    let base = if own_dorm {
        dorm_config
            .as_ref()
            .map(|d| color::sdl(&d.floor_color))
            .unwrap_or_else(|| surface_color(room.base_tile))
    } else {
        surface_color(room.base_tile)
    };
    canvas.set_draw_color(base);
    canvas.fill_rect(view.rect(0, 0, room.width, room.height))?;

    // Subtle checker so large floors don't read as flat color fields.
    canvas.set_draw_color(Color::RGBA(0, 0, 0, 10));
    for gy in 0..(room.height / TILE_SIZE) {
        for gx in 0..(room.width / TILE_SIZE) {
            if (gx + gy) % 2 == 0 {
                canvas.fill_rect(view.rect(gx * TILE_SIZE, gy * TILE_SIZE, TILE_SIZE, TILE_SIZE))?;
            }
        }
    }

    for obj in camera::floor_objects(room) {
        let fill = match (obj.color, obj.kind) {
            (Some(c), _) => color::sdl(c),
            (None, ObjectKind::Floor(surface)) => surface_color(surface),
            (None, _) => Color::WHITE,
        };
        canvas.set_draw_color(fill);
        canvas.fill_rect(view.rect(obj.rect.x, obj.rect.y, obj.rect.w, obj.rect.h))?;
    }

    for obj in camera::scenery_order(room) {
        draw_scenery(canvas, &view, obj, now_millis, own_dorm, &dorm_config)?;
    }

    // Warp zones glow faintly so doors are discoverable.
    for warp in &room.warps {
        canvas.set_draw_color(Color::RGBA(255, 255, 255, 40));
        canvas.fill_rect(view.rect(warp.rect.x, warp.rect.y, warp.rect.w, warp.rect.h))?;
    }

    draw_characters(scene, app_state, canvas, &view, now_millis)?;

    Ok(())
}

fn draw_scenery(
    canvas: &mut Canvas<Window>,
    view: &Viewport,
    obj: &PlacedObject,
    now_millis: u64,
    own_dorm: bool,
    dorm_config: &Option<campus_core::types::DormConfig>,
) -> Result<(), String> {
    let r = obj.rect;
    match obj.kind {
        ObjectKind::Wall => {
            canvas.set_draw_color(
                obj.color
                    .map(color::sdl)
                    .unwrap_or(Color::RGB(0x47, 0x55, 0x69)),
            );
            canvas.fill_rect(view.rect(r.x, r.y, r.w, r.h))?;
            canvas.set_draw_color(Color::RGBA(0, 0, 0, 60));
            canvas.fill_rect(view.rect(r.x, r.y + r.h - 4, r.w, 4))?;
        }
        ObjectKind::Building => {
            let body = obj.color.map(color::sdl).unwrap_or(Color::RGB(0x33, 0x41, 0x55));
            canvas.set_draw_color(body);
            canvas.fill_rect(view.rect(r.x, r.y, r.w, r.h))?;
            // Roof band.
            canvas.set_draw_color(Color::RGB(0x1e, 0x29, 0x3b));
            canvas.fill_rect(view.rect(r.x, r.y, r.w, 12))?;
            // Door centered on the bottom edge.
            let door_w = TILE_SIZE;
            let door_x = r.x + r.w / 2 - door_w / 2;
            canvas.set_draw_color(Color::RGB(0x02, 0x06, 0x17));
            canvas.fill_rect(view.rect(door_x, r.y + r.h - TILE_SIZE, door_w, TILE_SIZE))?;
            // Windows.
            canvas.set_draw_color(Color::RGB(0x3b, 0x82, 0xf6));
            let mut wx = r.x + 10;
            while wx + 12 < r.x + r.w - 10 {
                if wx + 12 < door_x || wx > door_x + door_w {
                    canvas.fill_rect(view.rect(wx, r.y + 20, 12, 20))?;
                }
                wx += 26;
            }
        }
        ObjectKind::Desk | ObjectKind::StudyDesk => {
            canvas.set_draw_color(Color::RGB(0x92, 0x40, 0x0e));
            canvas.fill_rect(view.rect(r.x, r.y, r.w, r.h))?;
            canvas.set_draw_color(Color::RGB(0x71, 0x3f, 0x12));
            canvas.fill_rect(view.rect(r.x, r.y + r.h - 4, r.w, 4))?;
            if obj.kind == ObjectKind::StudyDesk {
                // Open book.
                canvas.set_draw_color(Color::RGB(0xf8, 0xfa, 0xfc));
                canvas.fill_rect(view.rect(r.x + 10, r.y + 2, 12, 8))?;
            }
        }
        ObjectKind::Bed => {
            canvas.set_draw_color(Color::RGB(0x78, 0x35, 0x0f));
            canvas.fill_rect(view.rect(r.x, r.y, r.w, r.h))?;
            canvas.set_draw_color(Color::RGB(0xf8, 0xfa, 0xfc));
            canvas.fill_rect(view.rect(r.x + 2, r.y + 2, r.w - 4, r.h - 4))?;
            let blanket = if own_dorm {
                dorm_config
                    .as_ref()
                    .map(|d| color::sdl(&d.bed_color))
                    .unwrap_or(Color::RGB(0x3b, 0x82, 0xf6))
            } else {
                Color::RGB(0x3b, 0x82, 0xf6)
            };
            canvas.set_draw_color(blanket);
            canvas.fill_rect(view.rect(r.x + 2, r.y + 32, r.w - 4, (r.h - 34).max(2)))?;
        }
        ObjectKind::Chair => {
            canvas.set_draw_color(Color::RGB(0x78, 0x35, 0x0f));
            canvas.fill_rect(view.rect(r.x + 4, r.y, r.w - 8, r.h - 8))?;
            canvas.set_draw_color(Color::RGB(0xb4, 0x53, 0x09));
            canvas.fill_rect(view.rect(r.x + 2, r.y + 12, r.w - 4, 6))?;
        }
        ObjectKind::Tree => {
            canvas.set_draw_color(Color::RGB(0x15, 0x80, 0x3d));
            canvas.fill_rect(view.rect(r.x + 2, r.y + 2, r.w - 4, r.h - 8))?;
            canvas.set_draw_color(Color::RGB(0x22, 0xc5, 0x5e));
            canvas.fill_rect(view.rect(r.x + 6, r.y + 6, 8, 8))?;
        }
        ObjectKind::Bush => {
            canvas.set_draw_color(Color::RGB(0x15, 0x80, 0x3d));
            canvas.fill_rect(view.rect(r.x + 4, r.y + 8, r.w - 8, r.h - 12))?;
            canvas.fill_rect(view.rect(r.x + 8, r.y + 4, r.w - 16, r.h - 8))?;
        }
        ObjectKind::Water => {
            canvas.set_draw_color(Color::RGB(0x3b, 0x82, 0xf6));
            canvas.fill_rect(view.rect(r.x, r.y, r.w, r.h))?;
            // Drifting ripples.
            let shift = ((now_millis / 500) % 8) as i32;
            canvas.set_draw_color(Color::RGBA(255, 255, 255, 90));
            let mut y = r.y + 4 + shift;
            while y < r.y + r.h - 2 {
                canvas.fill_rect(view.rect(r.x + 4, y, r.w - 8, 2))?;
                y += 12;
            }
        }
        ObjectKind::Bench => {
            canvas.set_draw_color(Color::RGB(0xb4, 0x53, 0x09));
            canvas.fill_rect(view.rect(r.x, r.y + 8, r.w, r.h - 12))?;
        }
        ObjectKind::Column => {
            canvas.set_draw_color(Color::RGB(0xd6, 0xd3, 0xd1));
            canvas.fill_rect(view.rect(r.x + 8, r.y, r.w - 16, r.h))?;
        }
        ObjectKind::Computer => {
            canvas.set_draw_color(Color::RGB(0x1e, 0x29, 0x3b));
            canvas.fill_rect(view.rect(r.x, r.y, r.w, r.h))?;
            // Blinking status lights.
            let green_on = now_millis % 1000 < 500;
            canvas.set_draw_color(if green_on {
                Color::RGB(0x10, 0xb9, 0x81)
            } else {
                Color::RGB(0x05, 0x96, 0x69)
            });
            canvas.fill_rect(view.rect(r.x + 4, r.y + 4, 4, 4))?;
            canvas.set_draw_color(Color::RGB(0xef, 0x44, 0x44));
            canvas.fill_rect(view.rect(r.x + 12, r.y + 4, 4, 4))?;
        }
        ObjectKind::Blackboard => {
            canvas.set_draw_color(Color::RGB(0x1e, 0x29, 0x3b));
            canvas.fill_rect(view.rect(r.x, r.y, r.w, r.h))?;
            canvas.set_draw_color(Color::RGB(0x0f, 0x17, 0x2a));
            canvas.fill_rect(view.rect(r.x + 2, r.y + 2, r.w - 4, r.h - 4))?;
            canvas.set_draw_color(Color::RGBA(255, 255, 255, 150));
            canvas.fill_rect(view.rect(r.x + 8, r.y + 10, r.w / 3, 2))?;
            canvas.fill_rect(view.rect(r.x + 8, r.y + 18, r.w / 4, 2))?;
        }
        ObjectKind::SoccerGoal => {
            canvas.set_draw_color(Color::RGBA(255, 255, 255, 70));
            canvas.fill_rect(view.rect(r.x, r.y, r.w, r.h))?;
            canvas.set_draw_color(Color::WHITE);
            canvas.draw_rect(view.rect(r.x, r.y, r.w, r.h))?;
        }
        ObjectKind::PenaltySpot { decorative } => {
            let (cx, cy) = (r.x + r.w / 2, r.y + r.h / 2);
            canvas.set_draw_color(obj.color.map(color::sdl).unwrap_or(Color::WHITE));
            canvas.fill_rect(view.rect(cx - 6, cy - 6, 12, 12))?;
            if !decorative {
                canvas.set_draw_color(Color::BLACK);
                canvas.fill_rect(view.rect(cx - 3, cy - 3, 6, 6))?;
            }
        }
        ObjectKind::Flag => {
            let cx = r.x + r.w / 2;
            let base = r.y + r.h;
            canvas.set_draw_color(Color::RGB(0xcb, 0xd5, 0xe1));
            canvas.fill_rect(view.rect(cx - 1, base - 24, 2, 24))?;
            canvas.set_draw_color(obj.color.map(color::sdl).unwrap_or(Color::RGB(0xef, 0x44, 0x44)));
            canvas.fill_rect(view.rect(cx, base - 24, 14, 10))?;
        }
        ObjectKind::SprintFlag => {
            let cx = r.x + r.w / 2;
            let base = r.y + r.h;
            canvas.set_draw_color(Color::RGB(0xcb, 0xd5, 0xe1));
            canvas.fill_rect(view.rect(cx - 1, base - 24, 2, 24))?;
            // Checkered start banner.
            for row in 0..3 {
                for col in 0..4 {
                    let dark = (row + col) % 2 == 0;
                    canvas.set_draw_color(if dark { Color::BLACK } else { Color::WHITE });
                    canvas.fill_rect(view.rect(cx + col * 5, base - 24 + row * 5, 5, 5))?;
                }
            }
        }
        ObjectKind::StadiumSeating => {
            canvas.set_draw_color(Color::RGB(0x1e, 0x29, 0x3b));
            canvas.fill_rect(view.rect(r.x, r.y, r.w, r.h))?;
            canvas.set_draw_color(Color::RGBA(255, 255, 255, 35));
            let mut y = r.y + 6;
            while y < r.y + r.h {
                canvas.fill_rect(view.rect(r.x, y, r.w, 2))?;
                y += 10;
            }
        }
        ObjectKind::Sign => {
            let cx = r.x + r.w / 2;
            let base = r.y + r.h;
            canvas.set_draw_color(Color::RGB(0x78, 0x35, 0x0f));
            canvas.fill_rect(view.rect(cx - 2, base - 16, 4, 16))?;
            canvas.set_draw_color(Color::RGB(0xb4, 0x53, 0x09));
            canvas.fill_rect(view.rect(cx - 14, base - 24, 28, 12))?;
        }
        ObjectKind::Gate => {
            // Archway: two pillars and a banner spanning them.
            canvas.set_draw_color(Color::RGB(0x9c, 0xa3, 0xaf));
            canvas.fill_rect(view.rect(r.x, r.y, TILE_SIZE * 2, r.h))?;
            canvas.fill_rect(view.rect(r.x + r.w - TILE_SIZE * 2, r.y, TILE_SIZE * 2, r.h))?;
            canvas.set_draw_color(Color::RGB(0x4c, 0x1d, 0x95));
            canvas.fill_rect(view.rect(r.x, r.y, r.w, 14))?;
        }
        ObjectKind::Flower => {
            let (cx, cy) = (r.x + r.w / 2, r.y + r.h / 2);
            let sway = (((now_millis + r.x as u64) / 600) % 3) as i32 - 1;
            canvas.set_draw_color(Color::RGB(0x22, 0xc5, 0x5e));
            canvas.fill_rect(view.rect(cx - 1 + sway, cy, 2, 8))?;
            canvas.set_draw_color(obj.color.map(color::sdl).unwrap_or(Color::RGB(0xec, 0x48, 0x99)));
            canvas.fill_rect(view.rect(cx - 3 + sway, cy - 6, 6, 6))?;
        }
        ObjectKind::Prop(kind) => {
            let fill = match kind {
                PropKind::Laptop => Color::RGB(0x94, 0xa3, 0xb8),
                PropKind::Easel => Color::RGB(0xfe, 0xf3, 0xc7),
                PropKind::Globe => Color::RGB(0x3b, 0x82, 0xf6),
                PropKind::Books => Color::RGB(0xef, 0x44, 0x44),
                PropKind::Papers => Color::RGB(0xf8, 0xfa, 0xfc),
                PropKind::Coffee => Color::RGB(0xff, 0xff, 0xff),
                PropKind::Plant => Color::RGB(0x16, 0xa3, 0x4a),
            };
            canvas.set_draw_color(fill);
            canvas.fill_rect(view.rect(r.x + 4, r.y + 4, (r.w - 8).max(4), (r.h - 8).max(4)))?;
        }
        ObjectKind::Floor(_) => {}
    }
    Ok(())
}

fn draw_characters(
    scene: &GameScene,
    app_state: &AppState,
    canvas: &mut Canvas<Window>,
    view: &Viewport,
    now_millis: u64,
) -> Result<(), String> {
    let Some(room) = scene.room.as_ref() else {
        return Ok(());
    };
    let local_id = app_state.player_id().unwrap_or_default();

    let mut sprites: Vec<CharacterSprite> = Vec::new();

    for npc in &room.npcs {
        sprites.push(CharacterSprite {
            x: npc.position.x as f32,
            y: npc.position.y as f32,
            color: color::sdl(npc.color),
            facing: npc.facing,
            moving: false,
            has_hat: false,
            has_glasses: false,
            idle_bounce: true,
        });
    }

    for player in &scene.roster {
        if player.id == local_id {
            continue;
        }
        let (x, y) = scene
            .remote_positions
            .get(&player.id)
            .copied()
            .unwrap_or((player.x, player.y));
        sprites.push(CharacterSprite {
            x,
            y,
            color: color::sdl(&player.color),
            facing: player.facing,
            moving: player.moving,
            has_hat: player.hat.as_deref().is_some_and(|h| !h.is_empty()),
            has_glasses: player.glasses.as_deref().is_some_and(|g| !g.is_empty()),
            idle_bounce: false,
        });
    }

    if app_state.session.is_some() {
        let (px, py) = scene.actor.pixel();
        let profile = app_state.profile();
        sprites.push(CharacterSprite {
            x: px as f32,
            y: py as f32,
            color: profile
                .and_then(|p| p.color.as_deref())
                .map(color::sdl)
                .unwrap_or(Color::RGB(0x3b, 0x82, 0xf6)),
            facing: scene.actor.facing(),
            moving: scene.actor.is_moving(),
            has_hat: profile
                .and_then(|p| p.hat.as_deref())
                .is_some_and(|h| !h.is_empty()),
            has_glasses: profile
                .and_then(|p| p.glasses.as_deref())
                .is_some_and(|g| !g.is_empty()),
            idle_bounce: false,
        });
    }

    for index in camera::character_order(&sprites, |s| s.y) {
        draw_avatar(canvas, view, &sprites[index], now_millis)?;
    }
    Ok(())
}

fn draw_avatar(
    canvas: &mut Canvas<Window>,
    view: &Viewport,
    sprite: &CharacterSprite,
    now_millis: u64,
) -> Result<(), String> {
    let x = sprite.x as i32;
    let mut y = sprite.y as i32;

    if sprite.moving && (now_millis / 200) % 2 == 0 {
        y -= 1;
    }
    if sprite.idle_bounce && (now_millis / 500) % 2 == 0 {
        y -= 1;
    }

    // Shadow.
    canvas.set_draw_color(Color::RGBA(0, 0, 0, 60));
    canvas.fill_rect(view.rect(x + 6, y + 26, 20, 5))?;

    // Body and head.
    canvas.set_draw_color(sprite.color);
    canvas.fill_rect(view.rect(x + 8, y + 2, 16, 12))?;
    canvas.fill_rect(view.rect(x + 6, y + 10, 20, 18))?;

    // Belly, hidden when facing away.
    if sprite.facing != Direction::Up {
        canvas.set_draw_color(Color::WHITE);
        canvas.fill_rect(view.rect(x + 11, y + 14, 10, 12))?;
    }

    // Eyes and beak by facing.
    canvas.set_draw_color(Color::BLACK);
    match sprite.facing {
        Direction::Down => {
            canvas.fill_rect(view.rect(x + 11, y + 6, 3, 3))?;
            canvas.fill_rect(view.rect(x + 18, y + 6, 3, 3))?;
        }
        Direction::Left => {
            canvas.fill_rect(view.rect(x + 9, y + 6, 3, 3))?;
        }
        Direction::Right => {
            canvas.fill_rect(view.rect(x + 20, y + 6, 3, 3))?;
        }
        Direction::Up => {}
    }
    if sprite.facing != Direction::Up {
        canvas.set_draw_color(Color::RGB(0xf9, 0x73, 0x16));
        let beak_x = match sprite.facing {
            Direction::Left => x + 6,
            Direction::Right => x + 23,
            _ => x + 14,
        };
        canvas.fill_rect(view.rect(beak_x, y + 9, 4, 3))?;
    }

    if sprite.has_glasses && sprite.facing != Direction::Up {
        canvas.set_draw_color(Color::RGB(0x1f, 0x29, 0x37));
        canvas.fill_rect(view.rect(x + 9, y + 6, 14, 2))?;
    }
    if sprite.has_hat {
        canvas.set_draw_color(Color::RGB(0xdc, 0x26, 0x26));
        canvas.fill_rect(view.rect(x + 7, y - 2, 18, 5))?;
    }

    Ok(())
}

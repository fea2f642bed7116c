//! egui layer over the world canvas: HUD, world text (nameplates, bubbles,
//! hints), chat, panels, and the modal overlays (dialogue, profiles,
//! study/quiz, minigames).

use egui_sdl2::egui;

use campus_core::constants::{HINT_RANGE, INTERACTION_RANGE, TILE_SIZE};
use campus_core::learning::{self, QuizSession};
use campus_core::minigame::{self, AimZone, SprintSide};
use campus_core::types::{
    course_by_id, Department, DormConfig, Emote, ProfilePatch, COURSE_CATALOG,
};

use super::world_render::Viewport;
use super::{
    EditForm, GameScene, LearningStage, LearningState, MinigameState, Overlay, StudyAction,
};
use crate::color;
use crate::scenes::scene::SceneType;
use crate::state::AppState;

const HAT_OPTIONS: &[(&str, &str)] = &[
    ("", "None"),
    ("cap", "Baseball Cap"),
    ("grad", "Graduation Cap"),
    ("party", "Party Hat"),
];
const GLASSES_OPTIONS: &[(&str, &str)] = &[("", "None"), ("round", "Round"), ("shades", "Shades")];
const COLOR_OPTIONS: &[&str] = &[
    "#3b82f6", "#ef4444", "#10b981", "#f59e0b", "#8b5cf6", "#ec4899", "#64748b", "#1f2937",
];
const DORM_FLOOR_OPTIONS: &[&str] = &["#fef3c7", "#e0f2fe", "#fce7f3", "#dcfce7", "#e5e7eb"];

pub(super) fn render(
    scene: &mut GameScene,
    app_state: &mut AppState,
    ctx: &egui::Context,
) -> Option<SceneType> {
    scene.text_focused = false;

    draw_world_labels(scene, app_state, ctx);
    draw_hud(scene, app_state, ctx);
    draw_error_banner(app_state, ctx);
    draw_virtual_pad(scene, ctx);

    if scene.chat_open {
        draw_chat(scene, app_state, ctx);
    }
    if scene.show_roster {
        draw_roster_panel(scene, app_state, ctx);
    }
    if scene.show_friends {
        draw_friends_panel(scene, ctx);
    }
    if scene.show_emotes {
        draw_emote_picker(scene, app_state, ctx);
    }

    draw_overlay(scene, app_state, ctx);

    if scene.level_up_until.is_some() {
        egui::Area::new("level_up_toast".into())
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, -60.0))
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new("LEVEL UP!")
                        .size(30.0)
                        .strong()
                        .color(egui::Color32::from_rgb(250, 204, 21)),
                );
            });
    }

    None
}

/// Names, chat bubbles, emotes, and interaction hints, drawn in world space.
fn draw_world_labels(scene: &GameScene, app_state: &AppState, ctx: &egui::Context) {
    let Some(view) = Viewport::for_scene(scene) else {
        return;
    };
    let Some(room) = scene.room.as_ref() else {
        return;
    };
    let local_id = app_state.player_id().unwrap_or_default();
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Background,
        egui::Id::new("world_labels"),
    ));
    let font = egui::FontId::proportional(11.0);
    let small = egui::FontId::proportional(10.0);

    let label_at = |x: f32, y: f32, text: &str, color: egui::Color32| {
        let (sx, sy) = view.to_screen(x, y);
        painter.text(
            egui::pos2(sx, sy),
            egui::Align2::CENTER_BOTTOM,
            text,
            font.clone(),
            color,
        );
    };

    // Nameplates.
    for npc in &room.npcs {
        label_at(
            npc.position.x as f32 + TILE_SIZE as f32 / 2.0,
            npc.position.y as f32,
            npc.name,
            egui::Color32::from_rgb(253, 224, 71),
        );
    }
    for player in &scene.roster {
        let (x, y) = if player.id == local_id {
            let (px, py) = scene.actor.pixel();
            (px as f32, py as f32)
        } else {
            scene
                .remote_positions
                .get(&player.id)
                .copied()
                .unwrap_or((player.x, player.y))
        };
        label_at(
            x + TILE_SIZE as f32 / 2.0,
            y,
            &player.name,
            egui::Color32::WHITE,
        );

        if let Some(emote) = player.emote {
            let symbol = match emote {
                Emote::Wave => "~",
                Emote::Dance => "♪",
                Emote::Heart => "♥",
                Emote::Exclaim => "!",
            };
            label_at(
                x + TILE_SIZE as f32 / 2.0,
                y - 12.0,
                symbol,
                egui::Color32::from_rgb(250, 204, 21),
            );
        }

        if let Some(bubble) = scene.bubbles.get(&player.id) {
            let (sx, sy) = view.to_screen(x + TILE_SIZE as f32 / 2.0, y - 14.0);
            let anchor = egui::pos2(sx, sy);
            // Measure by painting once, then draw the backdrop and repaint
            // the text on top of it.
            let text_rect = painter.text(
                anchor,
                egui::Align2::CENTER_BOTTOM,
                &bubble.text,
                small.clone(),
                egui::Color32::BLACK,
            );
            painter.rect_filled(
                text_rect.expand2(egui::vec2(5.0, 3.0)),
                4.0,
                egui::Color32::from_white_alpha(230),
            );
            painter.text(
                anchor,
                egui::Align2::CENTER_BOTTOM,
                &bubble.text,
                small.clone(),
                egui::Color32::BLACK,
            );
        }
    }

    // Interaction hints around the resting actor.
    let (apx, apy) = scene.actor.pixel();
    let actor_center = (
        apx as f32 + TILE_SIZE as f32 / 2.0,
        apy as f32 + TILE_SIZE as f32 / 2.0,
    );
    let dist = |cx: f32, cy: f32| {
        ((actor_center.0 - cx).powi(2) + (actor_center.1 - cy).powi(2)).sqrt()
    };

    let hint_color = egui::Color32::from_rgb(134, 239, 172);
    for obj in &room.objects {
        let (cx, cy) = obj.rect.center();
        if obj.kind.action().is_some() && dist(cx, cy) <= INTERACTION_RANGE {
            label_at(cx, obj.rect.y as f32 - 2.0, "[E]", hint_color);
        } else if obj.kind == campus_core::types::ObjectKind::Sign {
            if let Some(label) = obj.label {
                if dist(cx, cy) <= HINT_RANGE {
                    label_at(cx, obj.rect.y as f32 - 2.0, label, egui::Color32::WHITE);
                }
            }
        }
    }
    for npc in &room.npcs {
        let cx = npc.position.x as f32 + TILE_SIZE as f32 / 2.0;
        let cy = npc.position.y as f32 + TILE_SIZE as f32 / 2.0;
        if dist(cx, cy) <= HINT_RANGE {
            label_at(cx, npc.position.y as f32 - 12.0, "[E]", hint_color);
        }
    }

    // Door labels.
    for warp in &room.warps {
        if let Some(label) = warp.label {
            let (cx, _) = warp.rect.center();
            label_at(
                cx,
                warp.rect.y as f32 + warp.rect.h as f32 / 2.0,
                label,
                egui::Color32::from_white_alpha(180),
            );
        }
    }
}

fn draw_hud(scene: &mut GameScene, app_state: &mut AppState, ctx: &egui::Context) {
    egui::TopBottomPanel::top("hud").show(ctx, |ui| {
        ui.horizontal(|ui| {
            let room_name = scene
                .room
                .as_ref()
                .map(|r| r.name.clone())
                .unwrap_or_else(|| "...".to_string());
            ui.label(egui::RichText::new(room_name).strong());
            // Informational only; the class never changes physics.
            if let Some(room) = scene.room.as_ref() {
                let badge = match room.class {
                    campus_core::types::RoomClass::Public => "campus",
                    campus_core::types::RoomClass::Course => "course hall",
                    campus_core::types::RoomClass::Private => "private room",
                };
                ui.label(egui::RichText::new(badge).weak().small());
            }

            ui.separator();

            if ui.button("Chat [Y]").clicked() {
                scene.chat_open = !scene.chat_open;
            }
            if ui.button("Nearby").clicked() {
                scene.show_roster = !scene.show_roster;
            }
            if ui.button("Friends").clicked() {
                scene.show_friends = !scene.show_friends;
                if scene.show_friends {
                    refresh_friends(scene, app_state);
                }
            }
            if ui.button("Emote").clicked() {
                scene.show_emotes = !scene.show_emotes;
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Log Out").clicked() {
                    scene.logout_requested = true;
                }
                if let Some(profile) = app_state.profile() {
                    if ui
                        .button(format!("{} · Lv {} · {} XP", profile.name, profile.level, profile.xp))
                        .clicked()
                    {
                        scene.overlay = Overlay::Profile {
                            profile: profile.clone(),
                            is_self: true,
                        };
                    }
                }
            });
        });
    });
}

fn draw_error_banner(app_state: &mut AppState, ctx: &egui::Context) {
    if app_state.last_error.is_none() {
        return;
    }
    egui::TopBottomPanel::top("error_banner").show(ctx, |ui| {
        ui.horizontal(|ui| {
            let message = app_state.last_error.clone().unwrap_or_default();
            ui.colored_label(egui::Color32::from_rgb(248, 113, 113), message);
            if ui.small_button("dismiss").clicked() {
                app_state.last_error = None;
            }
        });
    });
}

/// On-screen pad for touch/mouse play. Held pad buttons take priority over
/// the keyboard.
fn draw_virtual_pad(scene: &mut GameScene, ctx: &egui::Context) {
    use campus_core::types::Direction;

    let mut held: Option<Direction> = None;
    egui::Area::new("virtual_pad".into())
        .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-12.0, -12.0))
        .show(ctx, |ui| {
            let pad_button = |ui: &mut egui::Ui, text: &str| {
                ui.add_sized(egui::vec2(34.0, 34.0), egui::Button::new(text))
            };
            ui.vertical(|ui| {
                ui.horizontal(|ui| {
                    ui.add_space(38.0);
                    if pad_button(ui, "▲").is_pointer_button_down_on() {
                        held = Some(Direction::Up);
                    }
                });
                ui.horizontal(|ui| {
                    if pad_button(ui, "◀").is_pointer_button_down_on() {
                        held = Some(Direction::Left);
                    }
                    if pad_button(ui, "▼").is_pointer_button_down_on() {
                        held = Some(Direction::Down);
                    }
                    if pad_button(ui, "▶").is_pointer_button_down_on() {
                        held = Some(Direction::Right);
                    }
                    if pad_button(ui, "E").clicked() {
                        scene.input.queue_interact();
                    }
                });
            });
        });
    scene.input.set_pad_direction(held);
}

fn draw_chat(scene: &mut GameScene, app_state: &mut AppState, ctx: &egui::Context) {
    egui::Window::new("Chat")
        .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(12.0, -12.0))
        .resizable(false)
        .collapsible(false)
        .show(ctx, |ui| {
            ui.set_width(260.0);
            egui::ScrollArea::vertical()
                .max_height(140.0)
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    if let Some(sync) = app_state.sync.as_ref() {
                        for message in sync.chat() {
                            ui.horizontal_wrapped(|ui| {
                                ui.label(
                                    egui::RichText::new(format!("{}:", message.player_name))
                                        .strong()
                                        .color(egui::Color32::from_rgb(147, 197, 253)),
                                );
                                ui.label(&message.text);
                            });
                        }
                    }
                });

            ui.horizontal(|ui| {
                let response = ui.text_edit_singleline(&mut scene.chat_input);
                if response.has_focus() {
                    scene.text_focused = true;
                }
                let submitted =
                    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if submitted || ui.button("Send").clicked() {
                    if let Some(sync) = app_state.sync.as_mut() {
                        sync.send_chat(&scene.chat_input);
                    }
                    scene.chat_input.clear();
                    response.request_focus();
                }
            });
        });
}

fn draw_roster_panel(scene: &mut GameScene, app_state: &mut AppState, ctx: &egui::Context) {
    let mut open_profile: Option<String> = None;
    egui::Window::new("Nearby")
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(12.0, 40.0))
        .resizable(false)
        .collapsible(false)
        .show(ctx, |ui| {
            let local_id = app_state.player_id().unwrap_or_default().to_string();
            for player in &scene.roster {
                ui.horizontal(|ui| {
                    let (rect, _) =
                        ui.allocate_exact_size(egui::vec2(10.0, 10.0), egui::Sense::hover());
                    ui.painter()
                        .rect_filled(rect, 2.0, color::egui(&player.color));
                    let suffix = if player.id == local_id { " (you)" } else { "" };
                    if ui
                        .link(format!("{}{}", player.name, suffix))
                        .clicked()
                    {
                        open_profile = Some(player.id.clone());
                    }
                });
            }
        });
    if let Some(id) = open_profile {
        scene.open_profile(app_state, &id);
    }
}

fn refresh_friends(scene: &mut GameScene, app_state: &AppState) {
    let Some(profile) = app_state.profile() else {
        return;
    };
    match app_state.services.profiles.profiles(&profile.friends) {
        Ok(friends) => scene.friends_cache = friends,
        Err(e) => log::warn!("failed to load friends: {e}"),
    }
}

fn draw_friends_panel(scene: &mut GameScene, ctx: &egui::Context) {
    egui::Window::new("Friends")
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(140.0, 40.0))
        .resizable(false)
        .collapsible(false)
        .show(ctx, |ui| {
            if scene.friends_cache.is_empty() {
                ui.label("No friends yet. Walk up to someone and press E!");
            }
            for friend in &scene.friends_cache {
                ui.label(format!(
                    "{} · {} · Lv {}",
                    friend.name, friend.major, friend.level
                ));
            }
        });
}

fn draw_emote_picker(scene: &mut GameScene, app_state: &mut AppState, ctx: &egui::Context) {
    egui::Window::new("Emote")
        .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -60.0))
        .resizable(false)
        .collapsible(false)
        .title_bar(false)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                for (emote, label) in [
                    (Emote::Wave, "Wave"),
                    (Emote::Dance, "Dance"),
                    (Emote::Heart, "Heart"),
                    (Emote::Exclaim, "!"),
                ] {
                    if ui.button(label).clicked() {
                        if let Some(sync) = app_state.sync.as_mut() {
                            sync.send_emote(emote);
                        }
                        scene.show_emotes = false;
                    }
                }
            });
        });
}

fn draw_overlay(scene: &mut GameScene, app_state: &mut AppState, ctx: &egui::Context) {
    let mut overlay = std::mem::replace(&mut scene.overlay, Overlay::None);
    let mut close = false;
    let mut claim_xp: Option<i64> = None;
    let mut edit_form: Option<EditForm> = None;

    match &mut overlay {
        Overlay::None => {}
        Overlay::Dialogue { npc_name, line } => {
            egui::Window::new(npc_name.as_str())
                .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -40.0))
                .resizable(false)
                .collapsible(false)
                .show(ctx, |ui| {
                    ui.set_width(300.0);
                    ui.label(line.as_str());
                    if ui.button("Close").clicked() {
                        close = true;
                    }
                });
        }
        Overlay::Profile { profile, is_self } => {
            egui::Window::new(format!("{}'s Profile", profile.name))
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .resizable(false)
                .collapsible(false)
                .show(ctx, |ui| {
                    ui.set_width(280.0);
                    ui.label(format!("{} · {}", profile.major, profile.year));
                    ui.label(format!("Level {} ({} XP)", profile.level, profile.xp));
                    ui.separator();
                    ui.label(&profile.bio);
                    if !profile.enrolled_courses.is_empty() {
                        ui.separator();
                        ui.label(egui::RichText::new("Courses").strong());
                        for id in &profile.enrolled_courses {
                            if let Some(course) = course_by_id(id) {
                                ui.label(format!("• {}", course.name));
                            }
                        }
                    }
                    ui.separator();
                    ui.horizontal(|ui| {
                        if *is_self {
                            if ui.button("Edit Profile").clicked() {
                                if let Some(own) = app_state.profile() {
                                    edit_form = Some(EditForm::from_profile(own));
                                }
                            }
                        } else {
                            let already_friend = app_state
                                .profile()
                                .map(|p| p.friends.contains(&profile.id))
                                .unwrap_or(false);
                            if already_friend {
                                ui.label("✓ Friends");
                            } else if ui.button("Add Friend").clicked() {
                                add_friend(app_state, &profile.id);
                            }
                        }
                        if ui.button("Close").clicked() {
                            close = true;
                        }
                    });
                });
        }
        Overlay::EditProfile(form) => {
            let mut save = false;
            egui::Window::new("Edit Profile")
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .resizable(false)
                .collapsible(false)
                .show(ctx, |ui| {
                    ui.set_width(320.0);

                    ui.label("Bio");
                    if ui.text_edit_multiline(&mut form.bio).has_focus() {
                        scene.text_focused = true;
                    }
                    ui.horizontal(|ui| {
                        ui.label("Major");
                        if ui.text_edit_singleline(&mut form.major).has_focus() {
                            scene.text_focused = true;
                        }
                    });
                    ui.horizontal(|ui| {
                        ui.label("Year");
                        if ui.text_edit_singleline(&mut form.year).has_focus() {
                            scene.text_focused = true;
                        }
                    });

                    ui.separator();
                    egui::ComboBox::from_label("Hat")
                        .selected_text(
                            HAT_OPTIONS
                                .iter()
                                .find(|(v, _)| *v == form.hat)
                                .map(|(_, l)| *l)
                                .unwrap_or("None"),
                        )
                        .show_ui(ui, |ui| {
                            for (value, label) in HAT_OPTIONS {
                                ui.selectable_value(&mut form.hat, value.to_string(), *label);
                            }
                        });
                    egui::ComboBox::from_label("Glasses")
                        .selected_text(
                            GLASSES_OPTIONS
                                .iter()
                                .find(|(v, _)| *v == form.glasses)
                                .map(|(_, l)| *l)
                                .unwrap_or("None"),
                        )
                        .show_ui(ui, |ui| {
                            for (value, label) in GLASSES_OPTIONS {
                                ui.selectable_value(&mut form.glasses, value.to_string(), *label);
                            }
                        });

                    ui.label("Feathers");
                    ui.horizontal_wrapped(|ui| {
                        for option in COLOR_OPTIONS {
                            color_swatch(ui, option, &mut form.color);
                        }
                    });
                    ui.label("Dorm floor");
                    ui.horizontal_wrapped(|ui| {
                        for option in DORM_FLOOR_OPTIONS {
                            color_swatch(ui, option, &mut form.dorm_floor);
                        }
                    });
                    ui.label("Dorm bed");
                    ui.horizontal_wrapped(|ui| {
                        for option in COLOR_OPTIONS {
                            color_swatch(ui, option, &mut form.dorm_bed);
                        }
                    });

                    ui.separator();
                    ui.label(egui::RichText::new("Courses").strong());
                    for course in COURSE_CATALOG {
                        let mut enrolled = form.enrolled.iter().any(|id| id == course.id);
                        if ui.checkbox(&mut enrolled, course.name).changed() {
                            if enrolled {
                                form.enrolled.push(course.id.to_string());
                            } else {
                                form.enrolled.retain(|id| id != course.id);
                            }
                        }
                    }

                    ui.separator();
                    ui.horizontal(|ui| {
                        if ui.button("Save").clicked() {
                            save = true;
                        }
                        if ui.button("Cancel").clicked() {
                            close = true;
                        }
                    });
                });
            if save {
                save_profile(app_state, form);
                close = true;
            }
        }
        Overlay::Learning(state) => {
            draw_learning(scene, app_state, ctx, state, &mut close, &mut claim_xp);
        }
        Overlay::Minigame(minigame) => {
            draw_minigame(scene, ctx, minigame, &mut close, &mut claim_xp);
        }
    }

    if let Some(form) = edit_form {
        overlay = Overlay::EditProfile(form);
    }
    if !close {
        scene.overlay = overlay;
    }
    if let Some(xp) = claim_xp {
        scene.grant_xp(app_state, xp);
    }
}

fn color_swatch(ui: &mut egui::Ui, option: &str, selected: &mut String) {
    let (rect, response) = ui.allocate_exact_size(egui::vec2(18.0, 18.0), egui::Sense::click());
    if selected == option {
        ui.painter()
            .rect_filled(rect.expand(2.0), 4.0, egui::Color32::WHITE);
    }
    ui.painter().rect_filled(rect, 3.0, color::egui(option));
    if response.clicked() {
        *selected = option.to_string();
    }
}

fn add_friend(app_state: &mut AppState, friend_id: &str) {
    let Some(session) = app_state.session.as_mut() else {
        return;
    };
    let id = session.profile.id.clone();
    if let Err(e) = app_state.services.profiles.add_friend(&id, friend_id) {
        log::warn!("friend add failed: {e}");
        app_state.last_error = Some("Could not add friend".to_string());
        return;
    }
    if !session.profile.friends.iter().any(|f| f == friend_id) {
        session.profile.friends.push(friend_id.to_string());
    }
}

fn save_profile(app_state: &mut AppState, form: &EditForm) {
    let Some(session) = app_state.session.as_mut() else {
        return;
    };

    let hat = if form.hat.is_empty() {
        None
    } else {
        Some(form.hat.clone())
    };
    let glasses = if form.glasses.is_empty() {
        None
    } else {
        Some(form.glasses.clone())
    };
    let dorm = DormConfig {
        floor_color: form.dorm_floor.clone(),
        bed_color: form.dorm_bed.clone(),
    };

    let patch = ProfilePatch {
        bio: Some(form.bio.clone()),
        major: Some(form.major.clone()),
        year: Some(form.year.clone()),
        enrolled_courses: Some(form.enrolled.clone()),
        hat: Some(hat.clone()),
        glasses: Some(glasses.clone()),
        color: Some(form.color.clone()),
        dorm_config: Some(dorm.clone()),
        ..ProfilePatch::default()
    };
    patch.apply(&mut session.profile);

    let id = session.profile.id.clone();
    if let Err(e) = app_state.services.profiles.update_profile(&id, patch) {
        log::warn!("profile save failed: {e}");
        app_state.last_error = Some("Could not save profile".to_string());
    }

    // Peers in the room see the new look without waiting on a profile fetch.
    if let Some(sync) = app_state.sync.as_mut() {
        sync.update_visuals(hat, glasses, form.color.clone());
    }
}

fn draw_learning(
    scene: &mut GameScene,
    app_state: &mut AppState,
    ctx: &egui::Context,
    state: &mut LearningState,
    close: &mut bool,
    claim_xp: &mut Option<i64>,
) {
    let action = state.action;
    let department = state.department;
    let title = match action {
        StudyAction::Study => "Study",
        StudyAction::Quiz => "Quiz",
    };
    let level = app_state.profile().map(|p| p.level).unwrap_or(1);

    let mut next_stage: Option<LearningStage> = None;
    egui::Window::new(title)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .resizable(false)
        .collapsible(false)
        .show(ctx, |ui| {
            ui.set_width(340.0);
            match &mut state.stage {
                LearningStage::PickCourse => {
                    let enrolled: Vec<&'static campus_core::types::Course> = app_state
                        .profile()
                        .map(|p| {
                            p.enrolled_courses
                                .iter()
                                .filter_map(|id| course_by_id(id))
                                .filter(|c| match department {
                                    Some(dept) => c.department == dept,
                                    None => true,
                                })
                                .collect()
                        })
                        .unwrap_or_default();

                    if enrolled.is_empty() {
                        let where_hint = match department {
                            Some(dept) => format!("the {} department", dept.as_str()),
                            None => "any department".to_string(),
                        };
                        ui.label(format!(
                            "You aren't enrolled in any courses from {where_hint}. \
                             Edit your profile to enroll."
                        ));
                    } else {
                        ui.label("Pick a course:");
                        for course in enrolled {
                            if ui.button(course.name).clicked() {
                                next_stage = Some(start_course_session(
                                    scene, app_state, action, department, course, level,
                                ));
                            }
                        }
                    }
                    if ui.button("Close").clicked() {
                        *close = true;
                    }
                }
                LearningStage::Note { course_name, text } => {
                    ui.label(egui::RichText::new(course_name.as_str()).strong());
                    ui.separator();
                    ui.label(text.as_str());
                    ui.separator();
                    if ui.button("Done").clicked() {
                        *close = true;
                    }
                }
                LearningStage::Quiz { session } => {
                    draw_quiz(ui, session, close, claim_xp);
                }
            }
        });

    if let Some(stage) = next_stage {
        state.stage = stage;
    }
}

fn start_course_session(
    scene: &mut GameScene,
    app_state: &AppState,
    action: StudyAction,
    department: Option<Department>,
    course: &'static campus_core::types::Course,
    level: u32,
) -> LearningStage {
    let service = app_state.services.content.as_ref();
    match action {
        StudyAction::Study => LearningStage::Note {
            course_name: course.name.to_string(),
            text: learning::study_note(service, course, level),
        },
        StudyAction::Quiz => {
            let department = department.or(Some(course.department));
            let quiz =
                learning::build_quiz(service, department, Some(course), level, &mut scene.rng);
            LearningStage::Quiz {
                session: QuizSession::new(quiz),
            }
        }
    }
}

fn draw_quiz(
    ui: &mut egui::Ui,
    session: &mut QuizSession,
    close: &mut bool,
    claim_xp: &mut Option<i64>,
) {
    let total = session.quiz().questions.len();

    if total == 0 {
        ui.label("No questions are available for this course right now.");
        if ui.button("Close").clicked() {
            *close = true;
        }
        return;
    }

    ui.label(
        egui::RichText::new(format!(
            "{} · {}",
            session.quiz().topic,
            session.quiz().difficulty()
        ))
        .strong(),
    );

    if session.is_completed() {
        ui.separator();
        ui.label(format!("Score: {} / {}", session.score(), total));
        if session.passed() {
            ui.colored_label(
                egui::Color32::from_rgb(74, 222, 128),
                format!("Passed! +{} XP", session.reward()),
            );
            if ui.button("Claim Reward").clicked() {
                *claim_xp = Some(session.reward());
                *close = true;
            }
        } else {
            ui.colored_label(
                egui::Color32::from_rgb(248, 113, 113),
                "Not quite. Study and try again!",
            );
            if ui.button("Close").clicked() {
                *close = true;
            }
        }
        return;
    }

    if let Some(question) = session.current_question().cloned() {
        ui.label(format!("Question {} of {}", session.question_number(), total));
        ui.separator();
        ui.label(&question.prompt);
        ui.add_space(6.0);
        for (i, option) in question.options.iter().enumerate() {
            if ui.button(option).clicked() {
                session.answer(i);
            }
        }
    }
}

fn draw_minigame(
    scene: &mut GameScene,
    ctx: &egui::Context,
    minigame: &mut MinigameState,
    close: &mut bool,
    claim_xp: &mut Option<i64>,
) {
    match minigame {
        MinigameState::Penalty { aim, outcome } => {
            egui::Window::new("Penalty Shootout")
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .resizable(false)
                .collapsible(false)
                .show(ctx, |ui| {
                    ui.set_width(300.0);
                    match outcome {
                        None => {
                            ui.label("Aim with ◀ ▲ ▶ (or arrow keys), then shoot!");
                            ui.horizontal(|ui| {
                                for (zone, label) in [
                                    (AimZone::Left, "◀"),
                                    (AimZone::Center, "▲"),
                                    (AimZone::Right, "▶"),
                                ] {
                                    let selected = *aim == zone;
                                    if ui.selectable_label(selected, label).clicked() {
                                        *aim = zone;
                                    }
                                }
                            });
                            if ui.button("SHOOT!").clicked() {
                                *outcome =
                                    Some(minigame::resolve_penalty(*aim, &mut scene.rng));
                            }
                        }
                        Some(result) => {
                            if result.saved {
                                ui.label("SAVED! The keeper blocked it.");
                            } else {
                                ui.label("GOAL!!! What a strike!");
                            }
                            ui.colored_label(
                                egui::Color32::from_rgb(74, 222, 128),
                                format!("+{} XP", result.xp),
                            );
                            if ui.button("Continue").clicked() {
                                *claim_xp = Some(result.xp);
                                *close = true;
                            }
                        }
                    }
                });
        }
        MinigameState::Sprint { run, started } => {
            egui::Window::new("100m Dash")
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .resizable(false)
                .collapsible(false)
                .show(ctx, |ui| {
                    ui.set_width(300.0);
                    if !*started {
                        ui.label("Alternate LEFT/RIGHT (keys or buttons) as fast as you can!");
                        if ui.button("START").clicked() {
                            *started = true;
                        }
                        return;
                    }

                    ui.add(egui::ProgressBar::new(run.progress() / 100.0));
                    ui.label(format!("TIME: {:.1}s", run.elapsed()));

                    if run.is_finished() {
                        ui.label(run.verdict());
                        ui.colored_label(
                            egui::Color32::from_rgb(74, 222, 128),
                            format!("+{} XP", run.xp()),
                        );
                        if ui.button("Continue").clicked() {
                            *claim_xp = Some(run.xp());
                            *close = true;
                        }
                    } else {
                        ui.horizontal(|ui| {
                            if ui
                                .add_sized(egui::vec2(120.0, 50.0), egui::Button::new("L"))
                                .clicked()
                            {
                                run.tap(SprintSide::Left);
                            }
                            if ui
                                .add_sized(egui::vec2(120.0, 50.0), egui::Button::new("R"))
                                .clicked()
                            {
                                run.tap(SprintSide::Right);
                            }
                        });
                    }
                });
        }
    }
}

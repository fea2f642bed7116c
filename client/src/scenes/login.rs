use std::time::Duration;

use egui_sdl2::egui;
use sdl2::{event::Event, render::Canvas, video::Window};

use campus_core::accounts::AuthSuccess;
use sdl2::pixels::Color;

use crate::scenes::scene::{Scene, SceneType};
use crate::state::{AppState, Session};

/// Avatar colors offered at signup.
const PLAYER_COLORS: &[&str] = &[
    "#3b82f6", "#ef4444", "#10b981", "#f59e0b", "#8b5cf6", "#ec4899", "#64748b", "#1f2937",
];

/// Login / account creation form.
pub struct LoginScene {
    name: String,
    password: String,
    color_index: usize,
    error: Option<String>,
    tried_resume: bool,
}

impl LoginScene {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            password: String::new(),
            color_index: 0,
            error: None,
            tried_resume: false,
        }
    }

    fn finish_login(&mut self, app_state: &mut AppState, auth: AuthSuccess) -> Option<SceneType> {
        log::info!("logged in as '{}' ({})", auth.profile.name, auth.profile.id);

        app_state.preferences.identity_token = Some(auth.token.clone());
        app_state.preferences.save();
        app_state.session = Some(Session {
            token: auth.token,
            profile: auth.profile,
        });
        self.error = None;
        self.password.clear();
        Some(SceneType::Game)
    }

    fn attempt_resume(&mut self, app_state: &mut AppState) -> Option<SceneType> {
        let Some(token) = app_state.preferences.identity_token.clone() else {
            return None;
        };
        match app_state.services.auth.resume(&token) {
            Ok(auth) => self.finish_login(app_state, auth),
            Err(e) => {
                log::info!("session resume failed: {e}");
                app_state.preferences.identity_token = None;
                app_state.preferences.save();
                None
            }
        }
    }
}

impl Scene for LoginScene {
    fn on_enter(&mut self, _app_state: &mut AppState) {
        self.tried_resume = false;
    }

    fn handle_event(&mut self, _app_state: &mut AppState, _event: &Event) -> Option<SceneType> {
        None
    }

    fn update(&mut self, app_state: &mut AppState, _dt: Duration) -> Option<SceneType> {
        if !self.tried_resume {
            self.tried_resume = true;
            return self.attempt_resume(app_state);
        }
        None
    }

    fn render_world(
        &mut self,
        _app_state: &mut AppState,
        canvas: &mut Canvas<Window>,
    ) -> Result<(), String> {
        canvas.set_draw_color(Color::RGB(15, 23, 42));
        canvas.clear();
        Ok(())
    }

    fn render_ui(&mut self, app_state: &mut AppState, ctx: &egui::Context) -> Option<SceneType> {
        let mut next_scene = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(60.0);
                ui.heading(
                    egui::RichText::new("BIRDIE CAMPUS")
                        .size(32.0)
                        .color(egui::Color32::from_rgb(250, 204, 21)),
                );
                ui.label("a tiny university for tiny birds");
                ui.add_space(24.0);

                ui.group(|ui| {
                    ui.set_width(320.0);

                    ui.label("Name");
                    ui.text_edit_singleline(&mut self.name);

                    ui.label("Password (leave empty to visit as a guest)");
                    ui.add(egui::TextEdit::singleline(&mut self.password).password(true));

                    ui.add_space(8.0);
                    ui.label("Feathers");
                    ui.horizontal_wrapped(|ui| {
                        for (i, color) in PLAYER_COLORS.iter().enumerate() {
                            let selected = i == self.color_index;
                            let size = egui::vec2(22.0, 22.0);
                            let (rect, response) =
                                ui.allocate_exact_size(size, egui::Sense::click());
                            if selected {
                                ui.painter().rect_filled(
                                    rect.expand(2.0),
                                    4.0,
                                    egui::Color32::WHITE,
                                );
                            }
                            ui.painter()
                                .rect_filled(rect, 3.0, crate::color::egui(color));
                            if response.clicked() {
                                self.color_index = i;
                            }
                        }
                    });

                    ui.add_space(12.0);
                    ui.horizontal(|ui| {
                        if ui.button("Enter Campus").clicked() {
                            let password = if self.password.trim().is_empty() {
                                None
                            } else {
                                Some(self.password.as_str())
                            };
                            match app_state.services.auth.signup(
                                &self.name,
                                password,
                                PLAYER_COLORS[self.color_index],
                            ) {
                                Ok(auth) => next_scene = self.finish_login(app_state, auth),
                                Err(e) => self.error = Some(e.message),
                            }
                        }

                        if ui.button("Log In").clicked() {
                            match app_state
                                .services
                                .auth
                                .login(&self.name, &self.password)
                            {
                                Ok(auth) => next_scene = self.finish_login(app_state, auth),
                                Err(e) => self.error = Some(e.message),
                            }
                        }
                    });

                    if let Some(error) = &self.error {
                        ui.add_space(8.0);
                        ui.colored_label(egui::Color32::from_rgb(248, 113, 113), error);
                    }
                });
            });
        });

        next_scene
    }
}

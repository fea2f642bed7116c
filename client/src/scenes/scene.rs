use std::{collections::HashMap, time::Duration};

use egui_sdl2::egui;
use sdl2::{event::Event, render::Canvas, video::Window};

use crate::state::AppState;

/// Trait implemented by each scene (login, gameplay, exit).
///
/// The scene manager drives the lifecycle: `on_enter` → frame loop
/// (`handle_event`, `update`, `render_world`, `render_ui`) → `on_exit`.
/// Returning `Some(SceneType)` from any frame method requests a transition.
pub trait Scene {
    /// Called once when the scene becomes active.
    fn on_enter(&mut self, _app_state: &mut AppState) {}

    /// Called once when the scene is about to be replaced by another.
    fn on_exit(&mut self, _app_state: &mut AppState) {}

    /// Processes a single SDL event.
    fn handle_event(&mut self, app_state: &mut AppState, event: &Event) -> Option<SceneType>;

    /// Per-frame logic update. `dt` is the time elapsed since the last frame.
    fn update(&mut self, app_state: &mut AppState, dt: Duration) -> Option<SceneType>;

    /// Renders non-UI world elements onto the SDL canvas.
    fn render_world(
        &mut self,
        app_state: &mut AppState,
        canvas: &mut Canvas<Window>,
    ) -> Result<(), String>;

    /// Renders the egui overlay. Returns `Some(SceneType)` to request a scene
    /// change.
    fn render_ui(&mut self, app_state: &mut AppState, ctx: &egui::Context) -> Option<SceneType>;
}

/// Identifies which scene is active.
#[derive(Hash, Eq, PartialEq, Debug, Copy, Clone)]
pub enum SceneType {
    Login,
    Game,
    Exit,
}

/// Owns all scene instances and drives enter/update/render/exit.
///
/// Exactly one scene is active at a time.
pub struct SceneManager {
    active_scene: SceneType,
    scenes: HashMap<SceneType, Box<dyn Scene>>,
}

impl Default for SceneManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneManager {
    /// Creates a manager pre-populated with all scenes; login is active
    /// first.
    pub fn new() -> Self {
        let mut scene_map: HashMap<SceneType, Box<dyn Scene>> = HashMap::new();

        scene_map.insert(
            SceneType::Login,
            Box::new(crate::scenes::login::LoginScene::new()),
        );
        scene_map.insert(
            SceneType::Game,
            Box::new(crate::scenes::game::GameScene::new()),
        );
        scene_map.insert(SceneType::Exit, Box::new(crate::scenes::exit::ExitScene));

        SceneManager {
            active_scene: SceneType::Login,
            scenes: scene_map,
        }
    }

    pub fn get_scene(&self) -> SceneType {
        self.active_scene
    }

    /// Forwards an SDL event to the active scene and applies any resulting
    /// scene change.
    pub fn handle_event(&mut self, app_state: &mut AppState, event: &Event) {
        if self.active_scene == SceneType::Exit {
            return;
        }

        let next = self
            .scenes
            .get_mut(&self.active_scene)
            .expect("active scene registered")
            .handle_event(app_state, event);

        self.apply_scene_change(next, app_state);
    }

    pub fn update(&mut self, app_state: &mut AppState, dt: Duration) {
        if self.active_scene == SceneType::Exit {
            return;
        }

        let next = self
            .scenes
            .get_mut(&self.active_scene)
            .expect("active scene registered")
            .update(app_state, dt);

        self.apply_scene_change(next, app_state);
    }

    pub fn render_world(&mut self, app_state: &mut AppState, canvas: &mut Canvas<Window>) {
        if self.active_scene == SceneType::Exit {
            return;
        }

        self.scenes
            .get_mut(&self.active_scene)
            .expect("active scene registered")
            .render_world(app_state, canvas)
            .unwrap_or_else(|err| log::error!("Error rendering world: {}", err));
    }

    pub fn render_ui(&mut self, app_state: &mut AppState, ctx: &egui::Context) {
        if self.active_scene == SceneType::Exit {
            return;
        }

        let next = self
            .scenes
            .get_mut(&self.active_scene)
            .expect("active scene registered")
            .render_ui(app_state, ctx);

        self.apply_scene_change(next, app_state);
    }

    /// Externally requests a scene transition (e.g. from the main loop on
    /// quit).
    pub fn request_scene_change(&mut self, scene_type: SceneType, app_state: &mut AppState) {
        self.apply_scene_change(Some(scene_type), app_state);
    }

    fn apply_scene_change(&mut self, next_scene: Option<SceneType>, app_state: &mut AppState) {
        let Some(scene_type) = next_scene else {
            return;
        };
        if scene_type == self.active_scene {
            return;
        }

        log::info!("Switching to scene: {:?}", scene_type);

        if let Some(current) = self.scenes.get_mut(&self.active_scene) {
            current.on_exit(app_state);
        }

        self.active_scene = scene_type;

        if let Some(next) = self.scenes.get_mut(&self.active_scene) {
            next.on_enter(app_state);
        }
    }
}

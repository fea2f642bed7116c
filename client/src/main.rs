use std::process;
use std::time::{Duration, Instant};

use egui_sdl2::egui;

use crate::scenes::scene::SceneType;
use crate::state::AppState;

mod color;
mod hosts;
mod input;
mod network;
mod preferences;
mod scenes;
mod state;

/// World pixels are drawn at this integer scale; the window is sized to fit
/// exactly one 480x270 view.
pub const PIXEL_SCALE: u32 = 2;

const WINDOW_WIDTH: u32 = campus_core::constants::VIEW_WIDTH as u32 * PIXEL_SCALE;
const WINDOW_HEIGHT: u32 = campus_core::constants::VIEW_HEIGHT as u32 * PIXEL_SCALE;

fn main() -> Result<(), String> {
    campus_core::initialize_logger(log::LevelFilter::Info, Some("birdie-campus-client.log"))
        .unwrap_or_else(|e| {
            eprintln!("Failed to initialize logger: {}. Exiting.", e);
            process::exit(1);
        });

    // Malformed room data is a fatal configuration error; refuse to start
    // rather than render a broken campus.
    let mut app_state = match AppState::new() {
        Ok(state) => state,
        Err(e) => {
            log::error!("failed to initialize app state: {e:#}");
            process::exit(1);
        }
    };

    log::info!("Initializing SDL2 context...");
    let sdl_context = sdl2::init()?;
    let video = sdl_context.video()?;

    let window = video
        .window("Birdie Campus", WINDOW_WIDTH, WINDOW_HEIGHT)
        .position_centered()
        .allow_highdpi()
        .build()
        .map_err(|e| e.to_string())?;

    let mut event_pump = sdl_context.event_pump()?;

    log::info!("Initializing canvas...");
    let mut egui = egui_sdl2::EguiCanvas::new(window);

    if let Ok(video_subsystem) = sdl_context.video() {
        log::info!(
            "Current video driver: {}",
            video_subsystem.current_video_driver()
        );
    }

    let mut scene_manager = scenes::scene::SceneManager::new();
    let mut last_frame = Instant::now();

    'running: loop {
        let now = Instant::now();
        let dt = now.duration_since(last_frame);
        last_frame = now;

        for event in event_pump.poll_iter() {
            if let sdl2::event::Event::Quit { .. } = event {
                scene_manager.request_scene_change(SceneType::Exit, &mut app_state);
            }

            let _ = egui.on_event(&event);
            scene_manager.handle_event(&mut app_state, &event);

            if scene_manager.get_scene() == SceneType::Exit {
                break 'running;
            }
        }

        scene_manager.update(&mut app_state, dt);
        scene_manager.render_world(&mut app_state, &mut egui.painter.canvas);

        egui.run(|ctx: &egui::Context| {
            scene_manager.render_ui(&mut app_state, ctx);
        });

        if scene_manager.get_scene() == SceneType::Exit {
            break 'running;
        }

        egui.paint();
        egui.present();

        std::thread::sleep(Duration::from_millis(16));
    }

    // Clean disconnect removes our presence record instead of waiting for the
    // store's expiry mechanism.
    if let Some(sync) = app_state.sync.as_mut() {
        sync.disconnect();
    }

    Ok(())
}

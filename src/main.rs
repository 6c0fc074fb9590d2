//! Bubble Buster entry point
//!
//! Runs the simulation headless on a fixed-size surface with the autopilot
//! playing, logging progress. Usage: `bubble-buster [seed] [frames]`.

use bubble_buster::Viewport;
use bubble_buster::audio::LogAudio;
use bubble_buster::driver::{Collaborators, FrameDriver};
use bubble_buster::persistence::PreferencesStore;
use bubble_buster::platform::{RenderSurface, SessionLifecycle};
use bubble_buster::sim::SessionState;
use bubble_buster::tuning::Tuning;

/// Frames between progress lines (about 5 s of play)
const REPORT_EVERY: u64 = 300;
/// Frames spent on the game-over screen before returning home
const CELEBRATION_FRAMES: u64 = 240;

struct HeadlessSurface {
    viewport: Viewport,
    frames: u64,
    last_phase: Option<bubble_buster::sim::GamePhase>,
}

impl RenderSurface for HeadlessSurface {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn render(&mut self, state: &SessionState) {
        self.frames += 1;
        if self.last_phase != Some(state.phase) {
            log::info!("Phase: {:?}", state.phase);
            self.last_phase = Some(state.phase);
        }
        if self.frames % REPORT_EVERY == 0 {
            log::info!(
                "[{}] score {} | bubbles {} rocks {} witches {} | inventory {} | meter {:.1}",
                state.elapsed_display(),
                state.score,
                state.bubbles.len(),
                state.rocks.len(),
                state.witches.len(),
                state.inventory.len(),
                state.bullet_meter,
            );
        }
    }
}

struct LogLifecycle;

impl SessionLifecycle for LogLifecycle {
    fn on_return_home(&mut self, final_score: u64) {
        log::info!("Back at the home screen, final score {}", final_score);
    }
}

fn main() {
    env_logger::init();
    log::info!("Bubble Buster (headless) starting...");

    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(rand::random::<u64>);
    let max_frames = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(60 * 60 * 10);

    let tuning = match std::env::var("BUBBLE_BUSTER_TUNING") {
        Ok(path) => match std::fs::read_to_string(&path) {
            Ok(json) => Tuning::from_json_or_default(&json),
            Err(e) => {
                log::warn!("Could not read tuning file {}: {}", path, e);
                Tuning::default()
            }
        },
        Err(_) => Tuning::default(),
    };

    let prefs = PreferencesStore::open_default();
    log::info!(
        "Theme: {}",
        if prefs.dark_theme() { "dark" } else { "light" }
    );

    let collab = Collaborators {
        surface: Box::new(HeadlessSurface {
            viewport: Viewport::new(1080.0, 1920.0),
            frames: 0,
            last_phase: None,
        }),
        audio: Box::new(LogAudio::new()),
        scores: Box::new(prefs),
        lifecycle: Box::new(LogLifecycle),
    };

    let mut driver = FrameDriver::new(collab, tuning, seed);
    driver.set_idle(true);

    let mut frames = 0;
    while frames < max_frames && !driver.session().is_some_and(SessionState::is_over) {
        frames += driver.run_headless(1);
    }

    let Some(score) = driver.session().map(|s| s.score) else {
        return;
    };
    if driver.session().is_some_and(SessionState::is_over) {
        // Let the game-over screen play out before leaving
        driver.run_headless(CELEBRATION_FRAMES);
        driver.return_home();
    } else {
        log::info!("Stopped after {} frames still playing, score {}", frames, score);
    }
}

//! Frame driver
//!
//! Owns the session and is the only code that mutates it. Input arrives from
//! other threads as `Command`s over a channel and is folded into the next
//! tick's intent, so entity collections are never shared. Each frame: drain
//! input, tick, dispatch events to the collaborators, render, sleep.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use crate::audio::{AudioSink, SoundEffect};
use crate::consts::*;
use crate::highscores::{HighScoreStore, record_final_score};
use crate::platform::{PointerAction, PointerEvent, PointerMapper, RenderSurface, SessionLifecycle};
use crate::sim::{GameEvent, GamePhase, SessionState, TickInput, tick};
use crate::tuning::Tuning;

/// Messages from the input side
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Pointer(PointerEvent),
    /// Activate an inventory slot directly (keyboard, tests)
    ActivatePowerUp(usize),
    /// Toggle the autopilot
    SetIdle(bool),
    /// Leave the game-over screen
    ReturnHome,
    /// Stop the frame loop
    Stop,
}

/// Cloneable handle for posting input from any thread
#[derive(Debug, Clone)]
pub struct InputSender {
    tx: Sender<Command>,
}

impl InputSender {
    /// Post a command; false once the driver is gone
    pub fn send(&self, command: Command) -> bool {
        self.tx.send(command).is_ok()
    }

    pub fn pointer(&self, event: PointerEvent) -> bool {
        self.send(Command::Pointer(event))
    }
}

/// Host-provided collaborators
pub struct Collaborators {
    pub surface: Box<dyn RenderSurface>,
    pub audio: Box<dyn AudioSink>,
    pub scores: Box<dyn HighScoreStore>,
    pub lifecycle: Box<dyn SessionLifecycle>,
}

pub struct FrameDriver {
    collab: Collaborators,
    session: Option<SessionState>,
    mapper: PointerMapper,
    pending: TickInput,
    idle: bool,
    stopped: bool,
    home_requested: bool,
    tx: Sender<Command>,
    rx: Receiver<Command>,
}

impl FrameDriver {
    pub fn new(collab: Collaborators, tuning: Tuning, seed: u64) -> Self {
        let (tx, rx) = mpsc::channel();
        log::info!(
            "New session (seed {}, stored high score {})",
            seed,
            collab.scores.high_score()
        );
        Self {
            collab,
            session: Some(SessionState::new(seed, tuning)),
            mapper: PointerMapper::default(),
            pending: TickInput::default(),
            idle: false,
            stopped: false,
            home_requested: false,
            tx,
            rx,
        }
    }

    pub fn input_sender(&self) -> InputSender {
        InputSender {
            tx: self.tx.clone(),
        }
    }

    /// The live session, `None` once the player went home
    pub fn session(&self) -> Option<&SessionState> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut SessionState> {
        self.session.as_mut()
    }

    pub fn set_idle(&mut self, idle: bool) {
        self.idle = idle;
    }

    /// Run one frame. Returns false when there is nothing left to drive.
    pub fn step(&mut self, dt_ms: u64) -> bool {
        self.drain_commands();
        if self.stopped {
            return false;
        }
        let Some(session) = self.session.as_mut() else {
            return false;
        };

        let viewport = self.collab.surface.viewport();
        let mut input = std::mem::take(&mut self.pending);
        input.idle_mode = self.idle;
        tick(session, &input, dt_ms.min(MAX_TICK_DT_MS), viewport);

        for event in session.drain_events() {
            match event {
                GameEvent::Sound(effect) => self.collab.audio.play(effect),
                GameEvent::Frozen(cause) => log::debug!("Frozen by {:?}", cause),
                GameEvent::GameOver { score } => {
                    if record_final_score(self.collab.scores.as_mut(), score) {
                        session.new_high_score = true;
                        self.collab.audio.play(SoundEffect::VictoryTrumpet);
                    }
                }
            }
        }

        self.collab.surface.render(session);

        if std::mem::take(&mut self.home_requested) {
            self.return_home();
        }
        self.session.is_some()
    }

    fn drain_commands(&mut self) {
        loop {
            let command = match self.rx.try_recv() {
                Ok(command) => command,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            };
            match command {
                Command::Pointer(event) => {
                    let Some(session) = self.session.as_ref() else {
                        continue;
                    };
                    let action = self.mapper.map(
                        event,
                        self.collab.surface.viewport(),
                        session.phase,
                        session.inventory.len(),
                    );
                    match action {
                        PointerAction::None => {}
                        PointerAction::Intent(intent) => self.pending.merge(intent),
                        PointerAction::ReturnHome => self.home_requested = true,
                    }
                }
                Command::ActivatePowerUp(slot) => self.pending.activate_slots.push(slot),
                Command::SetIdle(idle) => self.idle = idle,
                Command::ReturnHome => self.home_requested = true,
                Command::Stop => self.stopped = true,
            }
        }
    }

    /// Leave the game-over screen: read the final score, cancel pending
    /// power-up reverts, notify the host and discard the session. Ignored
    /// outside GameOver.
    pub fn return_home(&mut self) -> Option<u64> {
        if self.session.as_ref().map(|s| s.phase) != Some(GamePhase::GameOver) {
            log::debug!("Return home ignored outside game over");
            return None;
        }
        let mut session = self.session.take()?;
        let score = session.score;
        session.powerups.cancel_all();
        log::info!(
            "Returning home with score {} after {}",
            score,
            session.elapsed_display()
        );
        self.collab.lifecycle.on_return_home(score);
        Some(score)
    }

    /// Real-time loop: measured frame delta, fixed sleep, no catch-up
    pub fn run(&mut self) {
        let mut last = Instant::now();
        loop {
            let now = Instant::now();
            let dt_ms = now.duration_since(last).as_millis() as u64;
            last = now;
            if !self.step(dt_ms) {
                break;
            }
            thread::sleep(Duration::from_millis(TICK_MS));
        }
        log::info!("Frame loop stopped");
    }

    /// Fixed-delta loop without sleeping; returns the frames run
    pub fn run_headless(&mut self, max_frames: u64) -> u64 {
        let mut frames = 0;
        while frames < max_frames {
            frames += 1;
            if !self.step(TICK_MS) {
                break;
            }
        }
        frames
    }
}

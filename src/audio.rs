//! Audio output
//!
//! The simulation only names cues; a sink decides how (or whether) they are
//! heard. Playback is fire-and-forget: a sink never reports back and never
//! blocks a tick.

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SoundEffect {
    /// Cannon fired
    Shoot,
    /// Bubble popped, hazard destroyed
    BubbleBurst,
    /// TNT bubble or hazard contact
    BombExplode,
    /// Rock entered play
    RockLaugh,
    /// Witch entered play
    WitchCackle,
    /// Power-up caught by a bullet
    PowerUpCollect,
    /// Power-up activated from inventory
    PowerUpActivate,
    /// New high score
    VictoryTrumpet,
    /// Celebration firework launched
    FireworkShot,
}

impl SoundEffect {
    /// Relative loudness of each cue
    pub fn gain(self) -> f32 {
        match self {
            SoundEffect::Shoot => 0.4,
            SoundEffect::BubbleBurst => 0.6,
            SoundEffect::BombExplode => 1.0,
            SoundEffect::RockLaugh | SoundEffect::WitchCackle => 0.7,
            SoundEffect::PowerUpCollect | SoundEffect::PowerUpActivate => 0.6,
            SoundEffect::VictoryTrumpet => 0.9,
            SoundEffect::FireworkShot => 0.3,
        }
    }
}

/// Something that can play a cue
pub trait AudioSink {
    fn play(&self, effect: SoundEffect);
}

/// Sink that reports cues through the `log` facade
pub struct LogAudio {
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for LogAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl LogAudio {
    pub fn new() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Volume a cue would be played at, 0 when muted
    pub fn effective_volume(&self, effect: SoundEffect) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume * effect.gain()
        }
    }
}

impl AudioSink for LogAudio {
    fn play(&self, effect: SoundEffect) {
        let vol = self.effective_volume(effect);
        if vol <= 0.0 {
            return;
        }
        log::debug!("play {:?} at {:.2}", effect, vol);
    }
}

/// Discards every cue
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&self, _effect: SoundEffect) {}
}

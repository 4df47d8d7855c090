use std::sync::{Arc, Mutex, MutexGuard};

use crate::message_log::{LogEntry, MessageLog};
use crate::particles::{Particle, ParticleSystem};
use crate::terminal::Viewport;
use crate::{RenderConfig, Result, VizError};

/// Intensity lost per tick; a single event keeps the meter lit for 20 ticks.
const INTENSITY_DECAY: f32 = 0.05;

/// Everything the two activities share: the event ingest writes log entries,
/// the sound name and new particles, the render loop advances physics and
/// the frame counter.
#[derive(Debug)]
pub struct VisualizationState {
    pub log: MessageLog,
    pub particles: ParticleSystem,
    pub last_sound: String,
    pub intensity: f32,
    pub frame: u64,
    /// Geometry measured by the most recent tick, used to place new
    /// particles. Refreshed every tick, never trusted for drawing.
    pub viewport: Viewport,
}

impl VisualizationState {
    pub fn new(log_capacity: usize, particles: ParticleSystem) -> Self {
        Self {
            log: MessageLog::with_capacity(log_capacity),
            particles,
            last_sound: String::new(),
            intensity: 0.0,
            frame: 0,
            viewport: Viewport::default(),
        }
    }

    /// Raises the intensity meter to at least `level`.
    pub fn excite(&mut self, level: f32) {
        self.intensity = self.intensity.max(level.clamp(0.0, 1.0));
    }

    /// One render tick worth of state changes: bump the frame counter, record
    /// the fresh geometry and advance the particles within it.
    pub fn advance(&mut self, viewport: Viewport, life_decay: f32) {
        self.frame += 1;
        self.viewport = viewport;
        self.particles
            .tick(life_decay, viewport.rows.saturating_sub(1) as f32);
        self.intensity = (self.intensity - INTENSITY_DECAY).max(0.0);
    }

    /// Copies out what a frame needs so drawing can happen without the lock.
    pub fn snapshot(&self, log_lines: usize) -> Snapshot {
        Snapshot {
            frame: self.frame,
            log_len: self.log.len(),
            log_capacity: self.log.capacity(),
            recent: self.log.recent(log_lines).cloned().collect(),
            particles: self.particles.iter().cloned().collect(),
            last_sound: self.last_sound.clone(),
            intensity: self.intensity,
        }
    }
}

/// Owned copy of the state for a single frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub frame: u64,
    pub log_len: usize,
    pub log_capacity: usize,
    pub recent: Vec<LogEntry>,
    pub particles: Vec<Particle>,
    pub last_sound: String,
    pub intensity: f32,
}

/// Cloneable handle to the state, handed to the event ingest at construction
/// time and kept by the render loop.
#[derive(Clone)]
pub struct SharedState {
    shared: Arc<Mutex<VisualizationState>>,
}

impl SharedState {
    pub fn new(config: &RenderConfig) -> Self {
        Self::from_state(VisualizationState::new(
            config.log_capacity,
            ParticleSystem::new(),
        ))
    }

    pub fn from_state(state: VisualizationState) -> Self {
        Self {
            shared: Arc::new(Mutex::new(state)),
        }
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, VisualizationState>> {
        self.shared
            .lock()
            .map_err(|_| VizError::Poisoned("visualisation state"))
    }
}

impl std::fmt::Debug for SharedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedState").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> VisualizationState {
        VisualizationState::new(20, ParticleSystem::seeded(42))
    }

    #[test]
    fn advance_counts_frames_and_records_viewport() {
        let mut state = state();
        let viewport = Viewport::new(120, 40);

        state.advance(viewport, 0.02);
        state.advance(viewport, 0.02);

        assert_eq!(state.frame, 2);
        assert_eq!(state.viewport, viewport);
    }

    #[test]
    fn intensity_decays_to_zero() {
        let mut state = state();
        state.excite(3.0);
        assert_eq!(state.intensity, 1.0);

        for _ in 0..25 {
            state.advance(Viewport::default(), 0.02);
        }
        assert_eq!(state.intensity, 0.0);
    }

    #[test]
    fn snapshot_is_detached_from_state() {
        let mut state = state();
        state.log.append(LogEntry::new("10:00:00", "/play2 ['bd']"));
        state.particles.spawn(Viewport::default());
        state.last_sound = "bd".to_string();

        let snapshot = state.snapshot(10);
        state.log.append(LogEntry::new("10:00:01", "/play2 ['sn']"));
        state.advance(Viewport::default(), 1.0);

        assert_eq!(snapshot.log_len, 1);
        assert_eq!(snapshot.recent.len(), 1);
        assert_eq!(snapshot.particles.len(), 1);
        assert_eq!(snapshot.last_sound, "bd");
        assert!(state.particles.is_empty());
    }

    #[test]
    fn shared_handles_see_the_same_state() {
        let shared = SharedState::from_state(state());
        let other = shared.clone();

        other.lock().unwrap().last_sound = "cp".to_string();
        assert_eq!(shared.lock().unwrap().last_sound, "cp");
    }
}

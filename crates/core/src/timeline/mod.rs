use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::render::{self, DisplayMode};
use crate::state::SharedState;
use crate::terminal::TerminalBackend;
use crate::{RenderConfig, Result};

/// Paces the render loop.
pub trait TickClock {
    /// Blocks until the next tick is due.
    fn wait_next(&mut self);
}

/// Fixed-rate clock. Deadlines advance by whole intervals so a slow frame
/// does not shift every later one; if the loop falls more than a tick
/// behind it resynchronises instead of bursting.
#[derive(Debug, Clone)]
pub struct IntervalClock {
    interval: Duration,
    next_deadline: Instant,
}

impl IntervalClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_deadline: Instant::now() + interval,
        }
    }
}

impl TickClock for IntervalClock {
    fn wait_next(&mut self) {
        let now = Instant::now();
        if let Some(remaining) = self.next_deadline.checked_duration_since(now) {
            std::thread::sleep(remaining);
            self.next_deadline += self.interval;
        } else {
            self.next_deadline = now + self.interval;
        }
    }
}

/// Cloneable stop flag observed once per tick.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// What a single tick decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Quit,
}

/// Why the loop stopped and how far it got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub reason: StopReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    QuitKey,
    Cancelled,
}

/// Drives the fixed-rate render loop: physics, mode selection, drawing and
/// the quit check, once per tick.
pub struct Scheduler<B, C> {
    state: SharedState,
    backend: B,
    clock: C,
    cancel: CancelToken,
    config: RenderConfig,
}

impl<B: TerminalBackend, C: TickClock> Scheduler<B, C> {
    pub fn new(state: SharedState, backend: B, clock: C, config: RenderConfig) -> Self {
        Self {
            state,
            backend,
            clock,
            cancel: CancelToken::new(),
            config,
        }
    }

    /// Handle that stops the loop at the start of its next tick.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Runs until a quit key is seen or the loop is cancelled.
    pub fn run(&mut self) -> Result<RunSummary> {
        self.backend.hide_cursor()?;
        let mut ticks = 0;

        let reason = loop {
            if self.cancel.is_cancelled() {
                break StopReason::Cancelled;
            }
            let outcome = self.tick()?;
            ticks += 1;
            if outcome == TickOutcome::Quit {
                break StopReason::QuitKey;
            }
            self.clock.wait_next();
        };

        self.backend.show_cursor()?;
        self.backend.flush()?;
        tracing::info!(ticks, ?reason, "render loop stopped");
        Ok(RunSummary { ticks, reason })
    }

    /// One frame. Geometry is measured fresh every time since the terminal
    /// can be resized between ticks.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        let viewport = self.backend.size()?;

        // Hold the lock only long enough to advance and copy the state; the
        // listener must never wait on terminal output.
        let snapshot = {
            let mut state = self.state.lock()?;
            state.advance(viewport, self.config.life_decay);
            state.snapshot(self.config.visible_log_lines)
        };

        let canvas = render::compose(&snapshot, viewport);
        self.backend.clear()?;
        self.backend.draw_border()?;
        for command in canvas.commands() {
            self.backend.write(command)?;
        }
        self.backend.flush()?;

        tracing::trace!(
            frame = snapshot.frame,
            mode = DisplayMode::for_frame(snapshot.frame).label(),
            "frame drawn"
        );

        match self.backend.poll_key()? {
            Some(key) if key.is_quit() => Ok(TickOutcome::Quit),
            _ => Ok(TickOutcome::Continue),
        }
    }
}

//! Core library for the OSC ASCII visualiser.
//!
//! Two activities share one [`VisualizationState`]: the [`OscListener`]
//! thread feeds decoded network events through [`EventIngest`], while the
//! [`Scheduler`] advances particle physics and redraws the terminal at a
//! fixed rate. All access goes through the mutex inside [`SharedState`];
//! the render loop copies a [`Snapshot`] out before drawing so the listener
//! never waits on terminal output.

pub mod config;
pub mod error;
pub mod ingest;
pub mod listener;
pub mod message_log;
pub mod palette;
pub mod particles;
pub mod render;
pub mod state;
pub mod terminal;
pub mod timeline;

pub use config::{AppConfig, ListenConfig, RenderConfig};
pub use error::{Result, VizError};
pub use ingest::{Event, EventArg, EventIngest};
pub use listener::OscListener;
pub use message_log::{LogEntry, MessageLog};
pub use particles::{Particle, ParticleSystem};
pub use render::{Canvas, DisplayMode, DrawCommand};
pub use state::{SharedState, Snapshot, VisualizationState};
pub use terminal::{CrosstermTerminal, KeyPress, TerminalBackend, Viewport};
pub use timeline::{CancelToken, IntervalClock, RunSummary, Scheduler, StopReason, TickClock};

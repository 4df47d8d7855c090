//! Turns decoded network events into state changes.
//!
//! Every event adds one log entry and spawns one particle. Events that look
//! like sound triggers also update the "last sound" status line.

use std::fmt;

use chrono::{DateTime, Local};

use crate::state::SharedState;
use crate::LogEntry;

/// A single decoded argument. Anything the decoder cannot classify arrives
/// as [`EventArg::Other`] holding its best-effort text form.
#[derive(Debug, Clone, PartialEq)]
pub enum EventArg {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Other(String),
}

impl EventArg {
    fn as_str(&self) -> Option<&str> {
        match self {
            EventArg::Str(value) => Some(value),
            _ => None,
        }
    }

    fn as_f32(&self) -> Option<f32> {
        match self {
            EventArg::Int(value) => Some(*value as f32),
            EventArg::Float(value) => Some(*value as f32),
            _ => None,
        }
    }

    /// Quoted form used inside log entries, e.g. `'bd'` or `0.5`.
    fn log_repr(&self) -> String {
        match self {
            EventArg::Str(value) => format!("'{value}'"),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for EventArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventArg::Str(value) | EventArg::Other(value) => f.write_str(value),
            EventArg::Int(value) => write!(f, "{value}"),
            EventArg::Float(value) => write!(f, "{value}"),
            EventArg::Bool(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for EventArg {
    fn from(value: &str) -> Self {
        EventArg::Str(value.to_string())
    }
}

/// Decoded network notification. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    address: String,
    args: Vec<EventArg>,
    received_at: DateTime<Local>,
}

impl Event {
    /// Creates an event stamped with the current local time.
    pub fn new(address: impl Into<String>, args: Vec<EventArg>) -> Self {
        Self::received_at(address, args, Local::now())
    }

    pub fn received_at(
        address: impl Into<String>,
        args: Vec<EventArg>,
        received_at: DateTime<Local>,
    ) -> Self {
        Self {
            address: address.into(),
            args,
            received_at,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn args(&self) -> &[EventArg] {
        &self.args
    }

    /// Summary line for the message log.
    pub fn log_entry(&self) -> LogEntry {
        let mut text = self.address.clone();
        if !self.args.is_empty() {
            let args: Vec<String> = self.args.iter().map(EventArg::log_repr).collect();
            text.push_str(&format!(" [{}]", args.join(", ")));
        }
        LogEntry::new(self.received_at.format("%H:%M:%S").to_string(), text)
    }
}

/// Whether an address names a sound notification.
///
/// Three overlapping checks, kept together for compatibility with existing
/// senders: the raw bytes contain `s`, the decoded address equals or
/// contains `s`, or it contains `sound` ignoring case.
pub fn is_sound_address(raw: &[u8]) -> bool {
    let decoded = String::from_utf8_lossy(raw);
    raw.contains(&b's')
        || decoded == "s"
        || decoded.contains('s')
        || decoded.to_lowercase().contains("sound")
}

/// Name of the sound an event triggers, if any.
///
/// A sound address contributes its first argument. Other addresses still
/// name a sound through Tidal-style `s`/`sound` key-value arguments.
pub fn sound_name(event: &Event) -> Option<String> {
    if is_sound_address(event.address.as_bytes()) {
        return event.args.first().map(EventArg::to_string);
    }

    event.args.windows(2).find_map(|pair| {
        let key = pair[0].as_str()?;
        (key.eq_ignore_ascii_case("s") || key.eq_ignore_ascii_case("sound"))
            .then(|| pair[1].to_string())
    })
}

/// Level the intensity meter jumps to for this event: its numeric `gain`
/// argument when present, full scale otherwise.
fn gain(event: &Event) -> f32 {
    event
        .args
        .windows(2)
        .find_map(|pair| match pair[0].as_str() {
            Some(key) if key.eq_ignore_ascii_case("gain") => pair[1].as_f32(),
            _ => None,
        })
        .unwrap_or(1.0)
}

/// Writer side of the shared state, owned by the network listener.
#[derive(Debug, Clone)]
pub struct EventIngest {
    state: SharedState,
}

impl EventIngest {
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    /// Applies one event. Never fails: if the state is unusable the event is
    /// dropped, which only costs one log line and one particle.
    pub fn on_event(&self, event: &Event) {
        let entry = event.log_entry();
        let sound = sound_name(event);
        let gain = gain(event);

        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(err) => {
                tracing::warn!(address = event.address(), %err, "dropping event");
                return;
            }
        };

        state.log.append(entry);
        if let Some(sound) = sound {
            state.last_sound = sound;
        }
        state.excite(gain);
        let bounds = state.viewport;
        state.particles.spawn(bounds);
    }
}

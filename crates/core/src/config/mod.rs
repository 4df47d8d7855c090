use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Result, VizError};

/// Port TidalCycles uses for its outbound notification stream.
pub const DEFAULT_PORT: u16 = 6010;

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub listen: ListenConfig,
    pub render: RenderConfig,
}

impl AppConfig {
    pub fn live_defaults() -> Self {
        Self::default()
    }

    /// Overrides the listen endpoint, leaving render settings untouched.
    pub fn with_listen(mut self, host: IpAddr, port: u16) -> Self {
        self.listen = ListenConfig { host, port };
        self
    }

    /// Rejects settings the render loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.render.tick_interval_ms == 0 {
            return Err(VizError::InvalidInput("tick interval must be at least 1 ms"));
        }
        if self.render.log_capacity == 0 {
            return Err(VizError::InvalidInput("message log capacity must be non-zero"));
        }
        if self.render.life_decay.is_nan() || self.render.life_decay <= 0.0 {
            return Err(VizError::InvalidInput("particle life decay must be positive"));
        }
        Ok(())
    }
}

/// Where the OSC listener binds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListenConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl ListenConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
        }
    }
}

/// Configuration specific to the render loop and the state it animates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub tick_interval_ms: u64,
    pub log_capacity: usize,
    pub visible_log_lines: usize,
    pub life_decay: f32,
}

impl RenderConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 16,
            log_capacity: 20,
            visible_log_lines: 10,
            life_decay: 0.02,
        }
    }
}

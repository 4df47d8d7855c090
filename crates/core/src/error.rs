use std::net::SocketAddr;

/// Result alias that carries the custom [`VizError`] type.
pub type Result<T> = std::result::Result<T, VizError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum VizError {
    /// Wrapper around standard IO errors, mostly from the terminal backend.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// The OSC listener could not claim its socket. Fatal at startup.
    #[error("failed to bind OSC listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    /// Configuration or argument rejected before any work started.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// A thread panicked while holding the shared visualisation state.
    #[error("{0} has been poisoned")]
    Poisoned(&'static str),
}

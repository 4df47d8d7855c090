//! UDP listener that decodes OSC packets and feeds them to the ingest.

use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rosc::{OscMessage, OscPacket, OscType};
use tracing::{debug, error, info};

use crate::{Event, EventArg, EventIngest, Result, VizError};

/// Largest datagram we accept; anything bigger is truncated by the OS.
const RECV_BUFFER_SIZE: usize = 65_536;
/// How long the receive thread sleeps when no datagram is waiting. Bounds
/// how quickly [`OscListener::stop`] returns.
const IDLE_POLL: Duration = Duration::from_millis(10);

/// Background OSC receiver. The socket is released when the listener is
/// stopped or dropped.
pub struct OscListener {
    local_addr: SocketAddr,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl OscListener {
    /// Binds `addr` and starts delivering events to `ingest`. Failing to
    /// bind is reported before any thread is started.
    pub fn bind(addr: SocketAddr, ingest: EventIngest) -> Result<Self> {
        let socket = UdpSocket::bind(addr).map_err(|source| VizError::Bind { addr, source })?;
        socket.set_nonblocking(true)?;
        let local_addr = socket.local_addr()?;

        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();
        let worker = thread::Builder::new()
            .name("osc-listener".to_string())
            .spawn(move || receive_loop(socket, flag, ingest))?;

        info!(%local_addr, "OSC listener started");
        Ok(Self {
            local_addr,
            running,
            worker: Some(worker),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stops the receive thread and waits for it to drop the socket.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("OSC listener thread panicked");
            }
            info!(local_addr = %self.local_addr, "OSC listener stopped");
        }
    }
}

impl Drop for OscListener {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for OscListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OscListener")
            .field("local_addr", &self.local_addr)
            .field("running", &self.is_running())
            .finish()
    }
}

fn receive_loop(socket: UdpSocket, running: Arc<AtomicBool>, ingest: EventIngest) {
    let mut buf = vec![0u8; RECV_BUFFER_SIZE];

    while running.load(Ordering::SeqCst) {
        match socket.recv_from(&mut buf) {
            Ok((size, from)) => match rosc::decoder::decode_udp(&buf[..size]) {
                Ok((_, packet)) => {
                    for event in events_from_packet(packet) {
                        ingest.on_event(&event);
                    }
                }
                Err(err) => debug!(%from, ?err, "dropping undecodable OSC packet"),
            },
            Err(ref err) if err.kind() == ErrorKind::WouldBlock => thread::sleep(IDLE_POLL),
            Err(ref err) if err.kind() == ErrorKind::Interrupted => {}
            Err(err) => {
                error!(%err, "OSC socket error, listener exiting");
                running.store(false, Ordering::SeqCst);
                break;
            }
        }
    }
}

/// Flattens a packet into events, one per message, bundles included.
pub fn events_from_packet(packet: OscPacket) -> Vec<Event> {
    let mut events = Vec::new();
    collect_events(packet, &mut events);
    events
}

fn collect_events(packet: OscPacket, events: &mut Vec<Event>) {
    match packet {
        OscPacket::Message(message) => events.push(event_from_message(message)),
        OscPacket::Bundle(bundle) => {
            for inner in bundle.content {
                collect_events(inner, events);
            }
        }
    }
}

fn event_from_message(message: OscMessage) -> Event {
    let args = message.args.into_iter().map(event_arg).collect();
    Event::new(message.addr, args)
}

/// Best-effort conversion: anything without a natural scalar form is kept
/// as text rather than rejected.
fn event_arg(arg: OscType) -> EventArg {
    match arg {
        OscType::String(value) => EventArg::Str(value),
        OscType::Int(value) => EventArg::Int(value.into()),
        OscType::Long(value) => EventArg::Int(value),
        // Via the shortest decimal form so 0.4f32 logs as 0.4.
        OscType::Float(value) => {
            EventArg::Float(value.to_string().parse().unwrap_or_else(|_| value.into()))
        }
        OscType::Double(value) => EventArg::Float(value),
        OscType::Bool(value) => EventArg::Bool(value),
        OscType::Char(value) => EventArg::Str(value.to_string()),
        OscType::Blob(bytes) => EventArg::Str(String::from_utf8_lossy(&bytes).into_owned()),
        OscType::Nil => EventArg::Other("nil".to_string()),
        OscType::Inf => EventArg::Other("inf".to_string()),
        other => EventArg::Other(format!("{other:?}")),
    }
}

//! # Subscriber Client
//!
//! A generic subscriber which receives JSON messages on a background thread and keeps only the
//! most recent one. The owner polls [`SubClient::take_latest`] once per cycle, so any samples
//! received between two polls except the last are dropped.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{error, warn};
use serde::de::DeserializeOwned;
use std::{
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex, MutexGuard,
    },
    thread::{self, JoinHandle},
};

use super::{zmq, MonitoredSocket, MonitoredSocketError, SocketOptions};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Subscribes to an endpoint publishing JSON serialised `T`s.
pub struct SubClient<T> {
    bg_jh: Option<JoinHandle<()>>,
    bg_run: Arc<AtomicBool>,
    connected: Arc<AtomicBool>,
    num_received: Arc<AtomicU64>,
    latest: Arc<Mutex<Option<T>>>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SubClientError {
    #[error("Socket error: {0}")]
    SocketError(#[from] MonitoredSocketError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<T> SubClient<T>
where
    T: DeserializeOwned + Send + 'static,
{
    /// Connect a new client to the given endpoint and start its background thread.
    ///
    /// The client does not wait for the publisher to be up.
    pub fn new(ctx: &zmq::Context, endpoint: &str) -> Result<Self, SubClientError> {
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: 10,
            send_timeout: 10,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(ctx, zmq::SUB, socket_options, endpoint)?;

        let bg_run = Arc::new(AtomicBool::new(true));
        let connected = Arc::new(AtomicBool::new(false));
        let num_received = Arc::new(AtomicU64::new(0));
        let latest = Arc::new(Mutex::new(None));

        let bg_run_clone = bg_run.clone();
        let connected_clone = connected.clone();
        let num_received_clone = num_received.clone();
        let latest_clone = latest.clone();
        let endpoint = endpoint.to_string();

        let bg_jh = Some(thread::spawn(move || {
            bg_thread(
                socket,
                endpoint,
                bg_run_clone,
                connected_clone,
                num_received_clone,
                latest_clone,
            )
        }));

        Ok(Self {
            bg_jh,
            bg_run,
            connected,
            num_received,
            latest,
        })
    }
}

impl<T> SubClient<T> {
    /// Take the most recent message received since the last call, if any.
    pub fn take_latest(&self) -> Option<T> {
        lock(&self.latest).take()
    }

    /// Returns true if the underlying socket is connected to the publisher.
    pub fn connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    /// Total number of valid messages received by the client.
    pub fn num_received(&self) -> u64 {
        self.num_received.load(Ordering::Relaxed)
    }
}

impl<T> Drop for SubClient<T> {
    fn drop(&mut self) {
        self.bg_run.store(false, Ordering::Relaxed);

        if let Some(jh) = self.bg_jh.take() {
            jh.join().ok();
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Lock the latest value, recovering the data if another thread panicked while holding it.
fn lock<T>(latest: &Mutex<Option<T>>) -> MutexGuard<'_, Option<T>> {
    match latest.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Background thread, replaces the latest value whenever the publisher sends something new.
fn bg_thread<T: DeserializeOwned>(
    socket: MonitoredSocket,
    endpoint: String,
    run: Arc<AtomicBool>,
    connected: Arc<AtomicBool>,
    num_received: Arc<AtomicU64>,
    latest: Arc<Mutex<Option<T>>>,
) {
    while run.load(Ordering::Relaxed) {
        connected.store(socket.connected(), Ordering::Relaxed);

        let msg = match socket.recv_string(0) {
            Ok(Ok(s)) => s,
            Ok(Err(_)) => {
                warn!("Non UTF-8 message from {}", endpoint);
                continue;
            }
            Err(zmq::Error::EAGAIN) => continue,
            Err(e) => {
                error!("Error receiving message from {}: {}", endpoint, e);
                break;
            }
        };

        let data: T = match serde_json::from_str(&msg) {
            Ok(d) => d,
            Err(e) => {
                warn!("Error deserialising message from {}: {}", endpoint, e);
                continue;
            }
        };

        *lock(&latest) = Some(data);
        num_received.fetch_add(1, Ordering::Relaxed);
    }

    connected.store(false, Ordering::Relaxed);
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::eqpt::arm::HumanInput;
    use std::time::{Duration, Instant};

    #[test]
    fn test_latest_wins() {
        let ctx = zmq::Context::new();
        let endpoint = "inproc://sub_client_test";

        let publisher = MonitoredSocket::new(
            &ctx,
            zmq::PUB,
            SocketOptions {
                bind: true,
                block_on_first_connect: false,
                linger: 0,
                ..Default::default()
            },
            endpoint,
        )
        .unwrap();

        let client: SubClient<HumanInput> = SubClient::new(&ctx, endpoint).unwrap();

        // Keep publishing until the subscription has propagated
        let deadline = Instant::now() + Duration::from_secs(5);
        while client.num_received() == 0 && Instant::now() < deadline {
            let msg = serde_json::to_string(&HumanInput::now(1.0, 2.0, 3.0)).unwrap();
            publisher.send(&msg, 0).unwrap();
            thread::sleep(Duration::from_millis(10));
        }

        let msg = serde_json::to_string(&HumanInput::now(4.0, 5.0, 6.0)).unwrap();
        publisher.send(&msg, 0).unwrap();

        // Earlier samples may still be in flight, the last one published must win
        let mut latest = None;
        while latest.is_none() && Instant::now() < deadline {
            match client.take_latest() {
                Some(h) if h.position() == [4.0, 5.0, 6.0] => latest = Some(h),
                _ => thread::sleep(Duration::from_millis(1)),
            }
        }
        assert!(latest.is_some());

        // Taking clears the slot
        assert!(client.take_latest().is_none());
    }
}

//! Fixed-window rate limiting keyed by client address
//!
//! The first request from a client opens a window. Requests inside the
//! window increment its count; the first request after the window has
//! elapsed starts a new one. Requests counted beyond `max` are rejected.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use parking_lot::Mutex;

use crate::error::{AppError, Result};

/// Key used when the peer address is unavailable
const UNKNOWN_CLIENT: &str = "unknown";

struct Window {
    count: u32,
    started: Instant,
}

struct Clients {
    windows: HashMap<String, Window>,
    last_sweep: Instant,
}

struct Inner {
    window: Duration,
    max: u32,
    clients: Mutex<Clients>,
}

/// Per-client fixed-window counter
#[derive(Clone)]
pub struct FixedWindowLimiter {
    inner: Arc<Inner>,
}

impl FixedWindowLimiter {
    pub fn new(window: Duration, max: u32) -> Self {
        Self {
            inner: Arc::new(Inner {
                window,
                max,
                clients: Mutex::new(Clients {
                    windows: HashMap::new(),
                    last_sweep: Instant::now(),
                }),
            }),
        }
    }

    /// Record a request from `client`; `false` when it exceeds the limit
    pub fn check(&self, client: &str) -> bool {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: &str, now: Instant) -> bool {
        let mut clients = self.inner.clients.lock();
        self.sweep(&mut clients, now);

        let window = clients.windows.entry(client.to_string()).or_insert(Window {
            count: 0,
            started: now,
        });

        if now.duration_since(window.started) > self.inner.window {
            window.count = 1;
            window.started = now;
        } else {
            window.count = window.count.saturating_add(1);
        }

        window.count <= self.inner.max
    }

    /// Forget clients whose window has elapsed, at most once per window length
    fn sweep(&self, clients: &mut Clients, now: Instant) {
        if now.duration_since(clients.last_sweep) <= self.inner.window {
            return;
        }

        let window = self.inner.window;
        clients
            .windows
            .retain(|_, w| now.duration_since(w.started) <= window);
        clients.last_sweep = now;
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.inner.clients.lock().windows.len()
    }
}

fn client_key(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Reject requests once the client has used up its window
pub async fn enforce_rate_limit(
    State(limiter): State<FixedWindowLimiter>,
    request: Request,
    next: Next,
) -> Result<Response> {
    let client = client_key(&request);
    if !limiter.check(&client) {
        tracing::warn!(%client, path = %request.uri().path(), "Rate limit exceeded");
        return Err(AppError::RateLimited);
    }

    Ok(next.run(request).await)
}

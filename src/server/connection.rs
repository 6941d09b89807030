// Connection handling module
// Accepts TCP connections and serves HTTP/1.1 on each one

use std::cell::Cell;
use std::net::SocketAddr;
use std::pin::pin;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use tokio::net::TcpStream;
use tokio::time::Instant;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// How often an open connection is checked against the keep-alive limit
const IDLE_CHECK_INTERVAL: Duration = Duration::from_millis(250);

/// Accept a connection, enforcing the connection limit.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `state` - Shared application state
/// * `conn_counter` - Active connection counter
pub fn accept_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    conn_counter: &Arc<AtomicUsize>,
) {
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection from {peer_addr} rejected."
            ));
            drop(stream);
            return;
        }
    }

    logger::log_connection_accepted(&peer_addr);
    handle_connection(stream, peer_addr, Arc::clone(state), Arc::clone(conn_counter));
}

/// Serve one connection in a local task.
///
/// Request headers must arrive within `read_timeout`. A keep-alive connection
/// that has seen no request for `keep_alive_timeout` is shut down gracefully,
/// so a response in flight is always completed. The counter is decremented
/// however the connection ends.
fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    conn_counter: Arc<AtomicUsize>,
) {
    tokio::task::spawn_local(async move {
        let io = TokioIo::new(stream);

        let perf = &state.config.performance;
        let keep_alive = perf.keep_alive_timeout > 0;
        let idle_limit = Duration::from_secs(perf.keep_alive_timeout);

        let mut builder = http1::Builder::new();
        builder
            .timer(TokioTimer::new())
            .header_read_timeout(Duration::from_secs(perf.read_timeout))
            .keep_alive(keep_alive);

        let last_activity = Rc::new(Cell::new(Instant::now()));
        let service_state = Arc::clone(&state);
        let service_activity = Rc::clone(&last_activity);
        let service = service_fn(move |req| {
            let state = Arc::clone(&service_state);
            let activity = Rc::clone(&service_activity);
            async move {
                activity.set(Instant::now());
                let response = handler::handle_request(req, state, peer_addr).await;
                activity.set(Instant::now());
                response
            }
        });

        let mut conn = pin!(builder.serve_connection(io, service));
        let mut idle_check = tokio::time::interval(IDLE_CHECK_INTERVAL);
        let mut closing = false;

        let result = loop {
            tokio::select! {
                result = conn.as_mut() => break result,
                _ = idle_check.tick(), if keep_alive && !closing => {
                    if last_activity.get().elapsed() >= idle_limit {
                        conn.as_mut().graceful_shutdown();
                        closing = true;
                    }
                }
            }
        };

        match result {
            Ok(()) => {}
            Err(err) if err.is_timeout() => logger::log_debug(&format!(
                "Connection from {peer_addr} sent no request headers within {}s",
                perf.read_timeout
            )),
            Err(err) => logger::log_connection_error(&err),
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}

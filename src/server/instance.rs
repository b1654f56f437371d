//! Per-instance accept loop
//!
//! Each configured server runs one of these loops on its own listener.
//! Connections are served on spawned tasks; nothing here shares mutable
//! state across requests.

use crate::handler::{self, InstanceState};
use crate::logger;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};

/// Accept connections forever, serving each on its own task.
pub async fn run_instance(listener: TcpListener, state: Arc<InstanceState>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                logger::log_connection_accepted(&peer_addr);
                handle_connection(stream, Arc::clone(&state));
            }
            Err(e) => {
                logger::log_error(&format!("Failed to accept connection: {e}"));
            }
        }
    }
}

/// Serve a single connection on a spawned task.
fn handle_connection(stream: TcpStream, state: Arc<InstanceState>) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);
        let conn = http1::Builder::new().keep_alive(true).serve_connection(
            io,
            service_fn(move |req| {
                let state = Arc::clone(&state);
                async move { handler::handle_request(req, state).await }
            }),
        );

        if let Err(err) = conn.await {
            logger::log_connection_error(&err);
        }
    });
}

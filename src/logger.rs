//! Logger module
//!
//! Plain stdout/stderr logging for server lifecycle, access logs and
//! configuration errors. Request handling failures are never logged; they
//! surface to the client as 404s only.

use crate::config::{ConfigError, ServerInstance, ServerMode};
use chrono::Local;
use hyper::{Method, Uri, Version};
use std::net::SocketAddr;

fn timestamp() -> String {
    Local::now().format("%d/%b/%Y:%H:%M:%S %z").to_string()
}

pub fn log_server_start(addr: &SocketAddr, instance: &ServerInstance) {
    println!("======================================");
    match &instance.mode {
        ServerMode::Static { root, .. } => {
            println!("Static server started successfully");
            println!("Serving files from: {root}");
        }
        ServerMode::Proxy { upstream } => {
            println!("Proxy server started successfully");
            println!("Forwarding to upstream: {upstream}");
        }
    }
    println!("Listening on: http://{addr}");
    if instance.location != "/" {
        println!("Mounted under: /{}", instance.location);
    }
    println!("======================================\n");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    println!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    eprintln!("[ERROR] Failed to serve connection: {err:?}");
}

pub fn log_request(method: &Method, uri: &Uri, version: Version) {
    println!("[{}] [Request] {method} {uri} {version:?}", timestamp());
}

pub fn log_response(status: u16, size: u64) {
    println!("[Response] Sent {status} ({size} bytes)");
}

pub fn log_error(message: &str) {
    eprintln!("[ERROR] {message}");
}

pub fn log_warning(message: &str) {
    eprintln!("[WARN] {message}");
}

/// Red `[ERROR]:` line naming the failing server's ordinal.
pub fn log_config_error(err: &ConfigError) {
    eprintln!("\x1b[31m[ERROR]:\x1b[0m {err}");
}

/// Printed after all configuration errors, right before exiting.
pub fn log_exit() {
    println!("Program has exited.");
}

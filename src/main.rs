use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

mod config;
mod handler;
mod http;
mod logger;
mod server;

const DEFAULT_CONFIG_PATH: &str = "config/servers.json";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let entries = config::load_raw(Path::new(&config_path))?;

    // Batch-atomic validation: every entry is checked before any listener
    // binds, so one bad entry stops the whole startup with all errors
    // reported at once.
    let instances = match config::validate_all(&entries) {
        Ok(instances) => instances,
        Err(errors) => {
            for error in &errors {
                logger::log_config_error(error);
            }
            logger::log_exit();
            std::process::exit(1);
        }
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve_all(instances))
}

async fn serve_all(
    instances: Vec<config::ServerInstance>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut servers = Vec::with_capacity(instances.len());

    for instance in instances {
        let addr = SocketAddr::from(([0, 0, 0, 0], instance.port));
        let listener = server::create_reusable_listener(addr)?;
        logger::log_server_start(&addr, &instance);

        let state = Arc::new(handler::InstanceState::new(instance));
        servers.push(tokio::spawn(server::run_instance(listener, state)));
    }

    // Accept loops never return; this blocks for the process lifetime.
    for handle in servers {
        handle.await?;
    }
    Ok(())
}

//! Request routing dispatch module
//!
//! Entry point for HTTP request processing. Every method and path lands in
//! the same catch-all; the configured mode decides what happens next.

use crate::config::{ServerInstance, ServerMode};
use crate::handler::{proxy, static_files};
use crate::http::{self, ResponseBody};
use crate::logger;
use hyper::body::{Body, Incoming};
use hyper::{Request, Response};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::convert::Infallible;
use std::sync::Arc;

/// Per-instance state shared by every connection: the validated
/// configuration plus, for proxy instances, a reusable upstream client.
pub struct InstanceState {
    pub config: ServerInstance,
    proxy_client: Option<Client<HttpConnector, Incoming>>,
}

impl InstanceState {
    pub fn new(config: ServerInstance) -> Self {
        let proxy_client = config
            .is_proxy()
            .then(|| Client::builder(TokioExecutor::new()).build_http());
        Self {
            config,
            proxy_client,
        }
    }
}

/// Main entry point for HTTP request handling.
pub async fn handle_request(
    req: Request<Incoming>,
    state: Arc<InstanceState>,
) -> Result<Response<ResponseBody>, Infallible> {
    logger::log_request(req.method(), req.uri(), req.version());

    let response = match &state.config.mode {
        ServerMode::Proxy { upstream } => match &state.proxy_client {
            Some(client) => proxy::forward(req, &state.config, upstream, client).await,
            // Unreachable for a validated proxy instance.
            None => http::build_500_response(),
        },
        ServerMode::Static {
            root,
            headers,
            file_filter,
        } => {
            let path = req.uri().path().to_string();
            let mut response =
                static_files::serve(&state.config, root, file_filter.as_ref(), &path).await;
            for (name, value) in headers {
                response.headers_mut().insert(name.clone(), value.clone());
            }
            response
        }
    };

    let size = response.body().size_hint().exact().unwrap_or(0);
    logger::log_response(response.status().as_u16(), size);
    Ok(response)
}

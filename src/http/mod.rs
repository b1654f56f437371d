//! HTTP protocol layer module
//!
//! Response building and MIME detection, decoupled from routing logic.

pub mod mime;
pub mod response;

pub use response::{
    build_403_response, build_404_response, build_500_response, build_error_page,
    build_file_response, build_redirect_response, full_body,
};

use http_body_util::combinators::BoxBody;
use hyper::body::Bytes;

/// Unified response body type.
///
/// Static responses are buffered `Full` bodies; proxied responses stream
/// the upstream `Incoming` body. Both box to this.
pub type ResponseBody = BoxBody<Bytes, hyper::Error>;

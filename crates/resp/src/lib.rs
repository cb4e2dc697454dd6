//! RESP2 wire protocol pieces for a Redis-compatible server: a streaming
//! request parser that consumes complete frames from a read buffer, and the
//! closed set of reply shapes a server writes back.

pub mod error;
pub mod reply;
pub mod request;

pub use error::ParseError;
pub use reply::Reply;
pub use request::parse_request;

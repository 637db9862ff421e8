// Framework-neutral handler pipeline: request type, middleware chaining and
// the bridge into axum routes.
pub use adapter::{into_route_handler, MAX_BODY_BYTES};
pub use chain::{chain, Chain};
pub use handler::{handler_fn, middleware_fn, Handler, Middleware, Request};
pub use payload::{decode_payload, Payload};

mod adapter;
mod chain;
mod handler;
mod payload;

//! HTTP middleware and request guards

pub mod auth;

pub use auth::{CallbackAuth, GatewayUser};

//! HTTP surface of the companion service.
//!
//! Defines the router, middleware, JSON API and static assets.

pub mod api;
pub mod assets;
mod middleware;
mod router;

pub use router::create_app;

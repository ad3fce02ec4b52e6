//! HTTP/SSE control surface
//!
//! A pure consumer of the [`SessionStore`](crate::state::SessionStore):
//! handlers read snapshots and forward commands; nothing here mutates the
//! session directly.

pub mod handlers;
pub mod server;
pub mod sse;

pub use server::{create_router, run, AppContext};

//! HTTP gateway: router, handlers, and backend selection.

mod builder;
mod routes;

pub use builder::{Beancounter, BeancounterBuilder};
pub use routes::build_router;

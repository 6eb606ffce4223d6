//! otk-daemon library surface.
//!
//! Exposed so the scenario tests in `tests/` can build the router and state
//! in-process without binding a socket.

pub mod api_types;
pub mod routes;
pub mod state;

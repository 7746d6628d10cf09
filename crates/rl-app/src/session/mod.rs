//! Link session: state machine, read-loop, reconnection and dispatch.

mod config;
mod dispatcher;
mod event_bus;
mod manager;
mod read_loop;
mod supervisor;
mod tasks;

pub use config::SessionConfig;
pub use manager::{LinkSessionManager, LinkStatus};

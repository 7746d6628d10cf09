//! RoboLink application shell: configuration, tracing, wiring and the
//! operator console on top of the link session.

pub mod bootstrap;
pub mod console;

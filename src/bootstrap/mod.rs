pub mod config;
pub mod run;
pub mod tracing;
pub mod wiring;

pub use config::{default_config_path, load_config, resolve_config};
pub use run::run_app;
pub use wiring::{wire_link, LinkRuntime};

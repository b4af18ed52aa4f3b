//! CLI command implementations.

mod common;
mod config;
mod doctor;
mod init;
mod layout;
mod render;
mod serve;
mod transcribe;

pub use config::run_config;
pub use doctor::run_doctor;
pub use init::run_init;
pub use layout::run_layout;
pub use render::run_render;
pub use serve::run_serve;
pub use transcribe::run_transcribe;

//! Configuration module for Subburn.
//!
//! Settings are read from a TOML file; every section and field is optional
//! and falls back to its default.

mod settings;

pub use settings::{
    GeneralSettings, LayoutSettings, MediaSettings, ServerSettings, Settings,
    TranscriptionProvider, TranscriptionSettings,
};

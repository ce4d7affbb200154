//! data_runtime: config schemas and loaders for the match server.
//!
//! Keep this crate free of sim dependencies; callers convert the string
//! kinds and raw tables into their own runtime types as needed. Every
//! loader falls back to built-in defaults when the data file is absent so
//! tests and tools run from any checkout.

pub mod loader;

pub mod configs {
    pub mod match_rules;
    pub mod telemetry;
    pub mod waves;
    pub mod weapons;
}

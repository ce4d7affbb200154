//! `net_core`: wire contracts for the match server.
//!
//! Scope
//! - Little-endian encode/decode traits for commands and notifications
//! - Versioned length framing so streams can delimit messages
//! - A minimal in-proc byte channel for the local loop
//!
//! Inner payloads carry a leading tag byte; the frame carries the version.

#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

pub mod channel;
pub mod command;
pub mod frame;
pub mod snapshot;

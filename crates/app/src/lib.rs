//! Read n Rise server and command line.
//!
//! `api` serves the play loop and catalog over HTTP; `cli` wires the
//! subcommands of the `readrise` binary.

#![forbid(unsafe_code)]

pub mod api;
pub mod cli;
pub mod telemetry;

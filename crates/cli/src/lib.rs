//! Library half of the `jscomm` binary, split out so the commands can be
//! tested without spawning a process.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod ops;
pub mod output;

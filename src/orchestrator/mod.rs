//! Application-level orchestration.
//!
//! `run` owns a single algorithm's thread, pacing and timing; `race` runs
//! every algorithm side by side and ranks them; `controller` owns the session
//! lifecycle (start/restart/quit) that UI and CLI layers drive.

mod controller;
mod race;
mod run;

pub(crate) use controller::{run_controller, SessionEvent, UiCommand};
pub use run::{LaneView, RunStatus};

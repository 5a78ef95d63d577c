//! Deterministic test harness for HTS stream testing.
//!
//! Scripted receivers, a manual clock, and line fixtures. Everything here is
//! driven by the test, so runs are reproducible without sockets or wall-clock
//! time.

#![forbid(unsafe_code)]

pub mod clock;
pub mod fixtures;
pub mod model;
pub mod scripted;

pub use clock::ManualClock;
pub use fixtures::{landmarks_line, sample_landmarks, sample_pose, wrist_line};
pub use model::{ModelAssembler, ModelFrame, Operation};
pub use scripted::{ScriptedReceiver, Step};

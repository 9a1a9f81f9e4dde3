//! Game-process orchestration for the grid rule engine.
//!
//! This crate layers players, level layouts and the per-tick step order on
//! top of `gridrule-core`. Consumers build an [`ObjectGenerator`] and a
//! [`Scenario`], register players on a [`GameProcess`], then drive it with
//! [`GameProcess::step`].
//!
//! Modules are organized by responsibility:
//! - [`process`] hosts the orchestrator
//! - [`scenario`] describes what is placed on init and reset
//! - [`player`] and [`step`] are the types callers read back
//!
//! [`ObjectGenerator`]: gridrule_core::ObjectGenerator
pub mod config;
pub mod error;
pub mod player;
pub mod process;
pub mod scenario;
pub mod step;

pub use config::RuntimeConfig;
pub use error::{Result, RuntimeError};
pub use player::Player;
pub use process::GameProcess;
pub use scenario::{ObjectPlacement, Scenario};
pub use step::StepResult;

//! Loading of STRIPS planning problems.
//!
//! Problems are read from a textual description (see [`edn`] and [`loader`]) into immutable
//! [`PlanningProblem`]s whose facts, preconditions and effects are written in a pluggable
//! [`Logic`], first-order logic ([`Fol`]) by default.

pub mod action;
pub mod config;
pub mod edn;
pub mod errors;
pub mod loader;
pub mod logic;
pub mod problem;
pub mod state;
mod sym;
pub(crate) mod utils;

pub use action::{Action, Actions};
pub use config::{LoaderConfig, PlanFailurePolicy, RecordFailurePolicy};
pub use errors::LoadError;
pub use loader::{LoadFailure, PlanningProblemLoader};
pub use logic::{Fol, Logic};
pub use problem::PlanningProblem;
pub use state::{FormulaSet, State};
pub use sym::Sym;

pub type Res<T> = anyhow::Result<T>;

//! Box-model time integration.
//!
//! Provides:
//! - The flow-function contract fluxes are evaluated through
//! - Per-step mass-balance derivatives over the reservoir/flux store
//! - Fixed-step forward Euler integrator
//! - `Model`, owning the store and the results of its latest run

pub mod balance;
pub mod error;
pub mod flow;
pub mod integrator;
pub mod model;
pub mod results;
pub mod run;

// Re-exports for public API
pub use balance::MassBalance;
pub use error::{SimError, SimResult};
pub use flow::{FlowFunction, FluxGraph, FluxRecorder, ModelState};
pub use integrator::{ForwardEuler, Integrator, TransientModel};
pub use model::{Model, Units};
pub use results::{FluxHistory, FluxSample, MassRecord, RunResults, RunSummary};
pub use run::{Overwrite, RunOptions, RunProgress, time_grid};

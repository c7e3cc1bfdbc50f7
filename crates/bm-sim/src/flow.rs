//! Flow functions: how a flux turns model state into a mass flow rate.

use bm_core::{FluxKey, ReservoirKey};
use bm_graph::{ColumnMap, ModelGraph, Reservoir};
use nalgebra::DVector;

use crate::results::FluxSample;

/// Store type a [`crate::Model`] keeps its reservoirs and fluxes in.
pub type FluxGraph = ModelGraph<Box<dyn FlowFunction>>;

/// Mass flow law attached to a flux.
///
/// Called exactly once per flux per step with the pre-step state. The
/// returned rate (mass/time) is moved from the source to the destination.
/// When `recorder.is_recording()` the function is expected to log what it
/// computed through the recorder; the helpers in this module do so.
pub trait FlowFunction {
    fn flow(&self, state: &ModelState<'_>, t: f64, recorder: &mut FluxRecorder<'_>) -> f64;
}

impl<T> FlowFunction for T
where
    T: Fn(&ModelState<'_>, f64, &mut FluxRecorder<'_>) -> f64,
{
    fn flow(&self, state: &ModelState<'_>, t: f64, recorder: &mut FluxRecorder<'_>) -> f64 {
        self(state, t, recorder)
    }
}

/// Read-only view of the model handed to a flow function.
///
/// Masses are the snapshot taken before the current step, so every flux of a
/// step sees the same state regardless of evaluation order.
#[derive(Clone, Copy)]
pub struct ModelState<'a> {
    pub(crate) graph: &'a FluxGraph,
    pub(crate) columns: &'a ColumnMap,
    pub(crate) masses: &'a DVector<f64>,
    pub(crate) flux: FluxKey,
    pub(crate) source: usize,
    pub(crate) destination: usize,
}

impl<'a> ModelState<'a> {
    /// Mass of any reservoir, `None` for unknown keys.
    pub fn mass(&self, key: impl Into<ReservoirKey>) -> Option<f64> {
        let column = self.columns.column(key)?;
        self.masses.get(column).copied()
    }

    /// Mass of the reservoir the evaluated flux drains.
    pub fn source_mass(&self) -> f64 {
        self.masses[self.source]
    }

    /// Mass of the reservoir the evaluated flux fills.
    pub fn destination_mass(&self) -> f64 {
        self.masses[self.destination]
    }

    /// Full mass vector in column order.
    pub fn masses(&self) -> &'a DVector<f64> {
        self.masses
    }

    pub fn columns(&self) -> &'a ColumnMap {
        self.columns
    }

    /// Key of the flux being evaluated.
    pub fn flux(&self) -> FluxKey {
        self.flux
    }

    pub fn reservoirs(&self) -> &'a [Reservoir] {
        self.graph.reservoirs()
    }

    pub fn reservoir(&self, key: impl Into<ReservoirKey>) -> Option<&'a Reservoir> {
        self.graph.reservoir(key)
    }
}

/// Write channel into the evaluated flux's own history.
pub struct FluxRecorder<'a> {
    history: Option<&'a mut Vec<FluxSample>>,
}

impl<'a> FluxRecorder<'a> {
    pub(crate) fn recording(history: &'a mut Vec<FluxSample>) -> Self {
        Self {
            history: Some(history),
        }
    }

    /// A recorder that drops everything, for probing flows outside a run.
    pub fn discard() -> Self {
        Self { history: None }
    }

    pub fn is_recording(&self) -> bool {
        self.history.is_some()
    }

    /// Append `(t, flow)` when recording; no-op otherwise.
    pub fn record(&mut self, t: f64, flow: f64) {
        if let Some(history) = self.history.as_mut() {
            history.push(FluxSample { t, flow });
        }
    }
}

/// Pin a closure to the [`FlowFunction`] signature.
///
/// Needed for closures passed straight to `add_flux`, whose argument types
/// cannot be inferred through the blanket impl.
pub fn from_fn<F>(f: F) -> F
where
    F: Fn(&ModelState<'_>, f64, &mut FluxRecorder<'_>) -> f64,
{
    f
}

/// Flow law that records its own value on every recorded call.
#[derive(Clone, Debug)]
pub struct Recorded<F>(F);

/// Wrap a plain `(state, t) -> rate` law so its history is kept.
pub fn recorded<F>(f: F) -> Recorded<F>
where
    F: Fn(&ModelState<'_>, f64) -> f64,
{
    Recorded(f)
}

impl<F> FlowFunction for Recorded<F>
where
    F: Fn(&ModelState<'_>, f64) -> f64,
{
    fn flow(&self, state: &ModelState<'_>, t: f64, recorder: &mut FluxRecorder<'_>) -> f64 {
        let value = (self.0)(state, t);
        recorder.record(t, value);
        value
    }
}

/// Fixed rate, independent of state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Constant {
    pub rate: f64,
}

pub fn constant(rate: f64) -> Constant {
    Constant { rate }
}

impl FlowFunction for Constant {
    fn flow(&self, _state: &ModelState<'_>, t: f64, recorder: &mut FluxRecorder<'_>) -> f64 {
        recorder.record(t, self.rate);
        self.rate
    }
}

/// First-order transfer: `k * source mass`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Proportional {
    pub k: f64,
}

pub fn proportional(k: f64) -> Proportional {
    Proportional { k }
}

impl FlowFunction for Proportional {
    fn flow(&self, state: &ModelState<'_>, t: f64, recorder: &mut FluxRecorder<'_>) -> f64 {
        let value = self.k * state.source_mass();
        recorder.record(t, value);
        value
    }
}

/// Rate varying linearly in time: `rate + slope * t`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Linear {
    pub rate: f64,
    pub slope: f64,
}

pub fn linear(rate: f64, slope: f64) -> Linear {
    Linear { rate, slope }
}

impl FlowFunction for Linear {
    fn flow(&self, _state: &ModelState<'_>, t: f64, recorder: &mut FluxRecorder<'_>) -> f64 {
        let value = self.rate + self.slope * t;
        recorder.record(t, value);
        value
    }
}

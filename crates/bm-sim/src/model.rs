//! The box model: a reservoir/flux store plus the results of its last run.

use bm_core::{FluxId, ReservoirId, ReservoirKey};
use bm_graph::{Flux, ModelGraph, Reservoir};
use nalgebra::DMatrix;

use crate::balance::MassBalance;
use crate::error::{SimError, SimResult};
use crate::flow::{FlowFunction, FluxGraph};
use crate::integrator::{ForwardEuler, Integrator};
use crate::results::{FluxHistory, RunResults};
use crate::run::{Overwrite, RunOptions, RunProgress, time_grid};

/// Unit labels carried for display; no conversion is ever applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Units {
    pub mass: String,
    pub time: String,
}

impl Default for Units {
    fn default() -> Self {
        Self {
            mass: "T".to_string(),
            time: "yr".to_string(),
        }
    }
}

/// A compartmental mass-balance model.
///
/// Starts empty (no results). `run` fills in results; running again only
/// replaces them when the options allow it or a confirmation callback agrees.
pub struct Model {
    name: String,
    units: Units,
    graph: FluxGraph,
    results: Option<RunResults>,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name)
            .field("units", &self.units)
            .field("graph", &self.graph)
            .field("has_results", &self.results.is_some())
            .finish()
    }
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            units: Units::default(),
            graph: ModelGraph::new(),
            results: None,
        }
    }

    pub fn with_units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn units(&self) -> &Units {
        &self.units
    }

    pub fn graph(&self) -> &FluxGraph {
        &self.graph
    }

    /// Register a reservoir; see [`ModelGraph::add_reservoir`].
    pub fn add_reservoir(
        &mut self,
        key: impl Into<ReservoirKey>,
        name: impl Into<String>,
        initial_mass: f64,
    ) -> SimResult<ReservoirId> {
        Ok(self.graph.add_reservoir(key, name, initial_mass)?)
    }

    /// Register a reservoir starting at [`bm_graph::DEFAULT_INITIAL_MASS`].
    pub fn add_reservoir_default(
        &mut self,
        key: impl Into<ReservoirKey>,
        name: impl Into<String>,
    ) -> SimResult<ReservoirId> {
        Ok(self.graph.add_reservoir_default(key, name)?)
    }

    /// Register a flux; see [`ModelGraph::add_flux`].
    pub fn add_flux(
        &mut self,
        from: impl Into<ReservoirKey>,
        to: impl Into<ReservoirKey>,
        flow: impl FlowFunction + 'static,
        name: impl Into<String>,
    ) -> SimResult<FluxId> {
        Ok(self.graph.add_flux(from, to, Box::new(flow), name)?)
    }

    pub fn reservoirs(&self) -> &[Reservoir] {
        self.graph.reservoirs()
    }

    pub fn fluxes(&self) -> &[Flux<Box<dyn FlowFunction>>] {
        self.graph.fluxes()
    }

    /// Graphviz DOT text of the model, titled with its name.
    pub fn to_dot(&self) -> String {
        self.graph.to_dot(&self.name)
    }

    pub fn results(&self) -> Option<&RunResults> {
        self.results.as_ref()
    }

    /// Remove and return the results, leaving the model empty.
    pub fn take_results(&mut self) -> Option<RunResults> {
        self.results.take()
    }

    pub fn clear_results(&mut self) {
        self.results = None;
    }

    /// Integrate over the options' time range.
    pub fn run(&mut self, opts: &RunOptions) -> SimResult<&RunResults> {
        self.run_inner(opts, None, None)
    }

    /// [`Model::run`], reporting progress every `opts.progress_interval` steps.
    pub fn run_with_progress(
        &mut self,
        opts: &RunOptions,
        on_progress: Option<&mut dyn FnMut(RunProgress)>,
    ) -> SimResult<&RunResults> {
        self.run_inner(opts, None, on_progress)
    }

    /// [`Model::run_with_progress`], asking `confirm` before replacing
    /// existing results when `opts.overwrite` is [`Overwrite::Deny`].
    pub fn run_with_confirmation(
        &mut self,
        opts: &RunOptions,
        confirm: &mut dyn FnMut(&RunResults) -> bool,
        on_progress: Option<&mut dyn FnMut(RunProgress)>,
    ) -> SimResult<&RunResults> {
        self.run_inner(opts, Some(confirm), on_progress)
    }

    fn run_inner(
        &mut self,
        opts: &RunOptions,
        confirm: Option<&mut dyn FnMut(&RunResults) -> bool>,
        mut on_progress: Option<&mut dyn FnMut(RunProgress)>,
    ) -> SimResult<&RunResults> {
        if let Some(existing) = &self.results {
            let replace = match opts.overwrite {
                Overwrite::Allow => true,
                Overwrite::Deny => confirm.is_some_and(|ask| ask(existing)),
            };
            if !replace {
                return Err(SimError::ResultsExist);
            }
        }

        let grid = time_grid(opts.t_start, opts.t_end, opts.t_step)?;
        let mut balance = MassBalance::new(&self.graph)?;
        let total = grid.len();
        let n_columns = balance.columns().len();

        tracing::info!(
            model = %self.name,
            steps = total,
            reservoirs = n_columns,
            fluxes = self.graph.flux_count(),
            "starting run"
        );

        let mut masses = DMatrix::zeros(total + 1, n_columns);
        let mut x = balance.initial_state();
        masses.set_row(0, &x.transpose());

        for (i, &t) in grid.iter().enumerate() {
            x = ForwardEuler.step(&mut balance, t, &x, opts.t_step)?;
            masses.set_row(i + 1, &x.transpose());

            let step = i + 1;
            if opts.progress_interval > 0 && step % opts.progress_interval == 0 {
                let progress = RunProgress {
                    step,
                    total,
                    t: t + opts.t_step,
                };
                tracing::debug!(step, total, "{} / {} calculated", step, total);
                if let Some(callback) = on_progress.as_mut() {
                    callback(progress);
                }
            }
        }

        let mut times = grid;
        let last = times[total - 1];
        times.push(last + opts.t_step);

        let columns = balance.columns().clone();
        let flux_histories = balance
            .into_histories()
            .into_iter()
            .map(|(key, name, samples)| FluxHistory { key, name, samples })
            .collect();

        tracing::info!(model = %self.name, rows = total + 1, "run finished");

        Ok(self.results.insert(RunResults {
            times,
            masses,
            columns,
            flux_histories,
        }))
    }
}

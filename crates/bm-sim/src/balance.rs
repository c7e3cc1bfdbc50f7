//! Mass-balance right-hand side of a box model.

use bm_core::{FluxKey, ReservoirKey};
use bm_graph::{ColumnMap, GraphError};
use nalgebra::DVector;

use crate::error::SimResult;
use crate::flow::{FluxGraph, FluxRecorder, ModelState};
use crate::integrator::TransientModel;
use crate::results::FluxSample;

/// Resolved view of a store for one run.
///
/// Holds the key-to-column mapping, each flux's endpoint columns and the
/// flux histories being filled during the run.
pub struct MassBalance<'a> {
    graph: &'a FluxGraph,
    columns: ColumnMap,
    endpoints: Vec<(usize, usize)>,
    histories: Vec<Vec<FluxSample>>,
}

impl<'a> MassBalance<'a> {
    /// Resolve flux endpoints against the store.
    ///
    /// Fails with [`GraphError::DanglingReference`] before anything is
    /// evaluated if a flux names a missing reservoir.
    pub fn new(graph: &'a FluxGraph) -> SimResult<Self> {
        graph.validate()?;
        let columns = graph.column_map();
        let endpoints = graph
            .fluxes()
            .iter()
            .map(|flux| {
                let column = |key: ReservoirKey| {
                    columns
                        .column(key)
                        .ok_or(GraphError::DanglingReference {
                            flux: flux.key(),
                            key,
                        })
                };
                Ok((column(flux.from)?, column(flux.to)?))
            })
            .collect::<Result<Vec<_>, GraphError>>()?;
        let histories = vec![Vec::new(); endpoints.len()];

        Ok(Self {
            graph,
            columns,
            endpoints,
            histories,
        })
    }

    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    /// Initial state vector in column order.
    pub fn initial_state(&self) -> DVector<f64> {
        DVector::from_vec(self.graph.initial_masses())
    }

    /// Net rate of change of every reservoir at time `t`.
    ///
    /// Each flux is evaluated once with recording on; contributions are
    /// summed in flux insertion order.
    pub fn derivatives(&mut self, t: f64, masses: &DVector<f64>) -> DVector<f64> {
        let mut d = DVector::zeros(masses.len());
        let fluxes = self.graph.fluxes();
        for ((flux, &(source, destination)), history) in fluxes
            .iter()
            .zip(&self.endpoints)
            .zip(self.histories.iter_mut())
        {
            let state = ModelState {
                graph: self.graph,
                columns: &self.columns,
                masses,
                flux: flux.key(),
                source,
                destination,
            };
            let mut recorder = FluxRecorder::recording(history);
            let rate = flux.flow.flow(&state, t, &mut recorder);
            d[source] -= rate;
            d[destination] += rate;
        }
        d
    }

    /// Consume the balance, returning each flux's key, name and history.
    pub fn into_histories(self) -> Vec<(FluxKey, String, Vec<FluxSample>)> {
        self.graph
            .fluxes()
            .iter()
            .zip(self.histories)
            .map(|(flux, samples)| (flux.key(), flux.name.clone(), samples))
            .collect()
    }
}

impl TransientModel for MassBalance<'_> {
    type State = DVector<f64>;

    fn rhs(&mut self, t: f64, x: &DVector<f64>) -> SimResult<DVector<f64>> {
        Ok(self.derivatives(t, x))
    }

    fn add(&self, a: &DVector<f64>, b: &DVector<f64>) -> DVector<f64> {
        a + b
    }

    fn scale(&self, a: &DVector<f64>, scale: f64) -> DVector<f64> {
        a * scale
    }
}

//! Core store data structures.

use std::collections::HashMap;
use std::fmt;

use bm_core::{FluxId, FluxKey, ReservoirId, ReservoirKey};

use crate::error::{GraphError, GraphResult};
use crate::indexing::ColumnMap;
use crate::validate;

/// Initial mass used when the caller does not give one.
pub const DEFAULT_INITIAL_MASS: f64 = 1.0;

/// Name of the pre-created boundary reservoir.
pub const EXTERNAL_NAME: &str = "external";

/// A mass stock.
///
/// Only the static definition lives here; the evolving mass belongs to the
/// integrator's state vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Reservoir {
    pub id: ReservoirId,
    pub key: ReservoirKey,
    pub name: String,
    /// `+inf` for the external reservoir, finite otherwise.
    pub initial_mass: f64,
}

impl Reservoir {
    pub fn is_external(&self) -> bool {
        self.key.is_external()
    }
}

/// A directed mass flow from one reservoir to another.
///
/// `F` is the flow payload, typically a boxed flow function supplied by the
/// integrator crate.
#[derive(Clone)]
pub struct Flux<F> {
    pub id: FluxId,
    pub from: ReservoirKey,
    pub to: ReservoirKey,
    pub name: String,
    pub flow: F,
}

impl<F> Flux<F> {
    pub fn key(&self) -> FluxKey {
        FluxKey {
            from: self.from,
            to: self.to,
        }
    }
}

impl<F> fmt::Debug for Flux<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flux")
            .field("id", &self.id)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Append-only store of reservoirs and fluxes.
///
/// Both arenas keep insertion order, which is also the order of the
/// integrator's state columns and derivative accumulation.
pub struct ModelGraph<F> {
    reservoirs: Vec<Reservoir>,
    fluxes: Vec<Flux<F>>,
    reservoir_lookup: HashMap<ReservoirKey, ReservoirId>,
    flux_lookup: HashMap<FluxKey, FluxId>,
}

impl<F> Default for ModelGraph<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> fmt::Debug for ModelGraph<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelGraph")
            .field("reservoirs", &self.reservoirs)
            .field("fluxes", &self.fluxes)
            .finish()
    }
}

impl<F> ModelGraph<F> {
    /// Create a store holding only the external reservoir (key 0).
    pub fn new() -> Self {
        let external = Reservoir {
            id: ReservoirId::from_index(0),
            key: ReservoirKey::EXTERNAL,
            name: EXTERNAL_NAME.to_string(),
            initial_mass: f64::INFINITY,
        };
        let mut reservoir_lookup = HashMap::new();
        reservoir_lookup.insert(external.key, external.id);
        Self {
            reservoirs: vec![external],
            fluxes: Vec::new(),
            reservoir_lookup,
            flux_lookup: HashMap::new(),
        }
    }

    /// Register a reservoir under a caller-chosen key.
    ///
    /// Fails without touching the store if the key is taken or the mass is
    /// not finite.
    pub fn add_reservoir(
        &mut self,
        key: impl Into<ReservoirKey>,
        name: impl Into<String>,
        initial_mass: f64,
    ) -> GraphResult<ReservoirId> {
        let key = key.into();
        if self.reservoir_lookup.contains_key(&key) {
            return Err(GraphError::DuplicateKey { key });
        }
        if !initial_mass.is_finite() {
            return Err(GraphError::NonFiniteMass {
                key,
                value: initial_mass,
            });
        }

        let id = ReservoirId::from_index(self.reservoirs.len() as u32);
        self.reservoirs.push(Reservoir {
            id,
            key,
            name: name.into(),
            initial_mass,
        });
        self.reservoir_lookup.insert(key, id);
        Ok(id)
    }

    /// Register a reservoir with [`DEFAULT_INITIAL_MASS`].
    pub fn add_reservoir_default(
        &mut self,
        key: impl Into<ReservoirKey>,
        name: impl Into<String>,
    ) -> GraphResult<ReservoirId> {
        self.add_reservoir(key, name, DEFAULT_INITIAL_MASS)
    }

    /// Register a directed flux.
    ///
    /// Endpoints are not checked here; see [`ModelGraph::validate`].
    /// Re-adding an existing `(from, to)` pair replaces its flow and name in
    /// place and returns the existing id.
    pub fn add_flux(
        &mut self,
        from: impl Into<ReservoirKey>,
        to: impl Into<ReservoirKey>,
        flow: F,
        name: impl Into<String>,
    ) -> GraphResult<FluxId> {
        let key = FluxKey::new(from, to);
        if key.is_self_loop() {
            return Err(GraphError::InvalidFlux { key });
        }
        let name = name.into();

        if let Some(&id) = self.flux_lookup.get(&key) {
            let flux = &mut self.fluxes[id.index() as usize];
            tracing::warn!(
                flux = %key,
                old_name = %flux.name,
                new_name = %name,
                "replacing existing flux"
            );
            flux.flow = flow;
            flux.name = name;
            return Ok(id);
        }

        let id = FluxId::from_index(self.fluxes.len() as u32);
        self.fluxes.push(Flux {
            id,
            from: key.from,
            to: key.to,
            name,
            flow,
        });
        self.flux_lookup.insert(key, id);
        Ok(id)
    }

    /// All reservoirs in insertion order (external first).
    pub fn reservoirs(&self) -> &[Reservoir] {
        &self.reservoirs
    }

    /// All fluxes in insertion order.
    pub fn fluxes(&self) -> &[Flux<F>] {
        &self.fluxes
    }

    pub fn reservoir(&self, key: impl Into<ReservoirKey>) -> Option<&Reservoir> {
        let id = self.reservoir_lookup.get(&key.into())?;
        self.reservoirs.get(id.index() as usize)
    }

    pub fn reservoir_by_id(&self, id: ReservoirId) -> Option<&Reservoir> {
        self.reservoirs.get(id.index() as usize)
    }

    pub fn contains_reservoir(&self, key: impl Into<ReservoirKey>) -> bool {
        self.reservoir_lookup.contains_key(&key.into())
    }

    pub fn flux(&self, from: impl Into<ReservoirKey>, to: impl Into<ReservoirKey>) -> Option<&Flux<F>> {
        let id = self.flux_lookup.get(&FluxKey::new(from, to))?;
        self.fluxes.get(id.index() as usize)
    }

    pub fn flux_by_id(&self, id: FluxId) -> Option<&Flux<F>> {
        self.fluxes.get(id.index() as usize)
    }

    pub fn reservoir_count(&self) -> usize {
        self.reservoirs.len()
    }

    pub fn flux_count(&self) -> usize {
        self.fluxes.len()
    }

    /// Initial masses in column order.
    pub fn initial_masses(&self) -> Vec<f64> {
        self.reservoirs.iter().map(|r| r.initial_mass).collect()
    }

    /// Reservoir-key to state-column mapping for this store.
    pub fn column_map(&self) -> ColumnMap {
        ColumnMap::from_keys(self.reservoirs.iter().map(|r| r.key))
    }

    /// Check that every flux endpoint names a registered reservoir.
    pub fn validate(&self) -> GraphResult<()> {
        validate::validate_references(&self.reservoir_lookup, &self.fluxes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_graph_has_external_reservoir() {
        let graph: ModelGraph<()> = ModelGraph::new();
        assert_eq!(graph.reservoir_count(), 1);
        let ext = graph.reservoir(0).unwrap();
        assert!(ext.is_external());
        assert_eq!(ext.name, EXTERNAL_NAME);
        assert_eq!(ext.initial_mass, f64::INFINITY);
    }

    #[test]
    fn add_reservoir_assigns_dense_ids() {
        let mut graph: ModelGraph<()> = ModelGraph::new();
        let a = graph.add_reservoir(10, "a", 3.0).unwrap();
        let b = graph.add_reservoir(4, "b", 0.0).unwrap();
        assert_eq!(a.index(), 1);
        assert_eq!(b.index(), 2);
        assert_eq!(graph.reservoir_by_id(b).unwrap().key, ReservoirKey(4));
    }

    #[test]
    fn duplicate_key_leaves_store_unchanged() {
        let mut graph: ModelGraph<()> = ModelGraph::new();
        graph.add_reservoir(1, "a", 3.0).unwrap();
        let err = graph.add_reservoir(1, "again", 9.0).unwrap_err();
        assert_eq!(err, GraphError::DuplicateKey { key: ReservoirKey(1) });
        assert_eq!(graph.reservoir_count(), 2);
        assert_eq!(graph.reservoir(1).unwrap().name, "a");

        let err = graph.add_reservoir(0, "external again", 1.0).unwrap_err();
        assert!(matches!(err, GraphError::DuplicateKey { .. }));
    }

    #[test]
    fn non_finite_mass_is_rejected() {
        let mut graph: ModelGraph<()> = ModelGraph::new();
        assert!(matches!(
            graph.add_reservoir(1, "nan", f64::NAN),
            Err(GraphError::NonFiniteMass { .. })
        ));
        assert!(matches!(
            graph.add_reservoir(1, "inf", f64::INFINITY),
            Err(GraphError::NonFiniteMass { .. })
        ));
        assert!(!graph.contains_reservoir(1));
    }

    #[test]
    fn default_mass_is_one() {
        let mut graph: ModelGraph<()> = ModelGraph::new();
        graph.add_reservoir_default(1, "a").unwrap();
        assert_eq!(graph.reservoir(1).unwrap().initial_mass, DEFAULT_INITIAL_MASS);
    }

    #[test]
    fn self_loop_flux_is_rejected() {
        let mut graph: ModelGraph<u8> = ModelGraph::new();
        graph.add_reservoir(1, "a", 1.0).unwrap();
        let err = graph.add_flux(1, 1, 0, "loop").unwrap_err();
        assert_eq!(
            err,
            GraphError::InvalidFlux {
                key: FluxKey::new(1, 1)
            }
        );
        assert_eq!(graph.flux_count(), 0);
    }

    #[test]
    fn duplicate_flux_replaces_in_place() {
        let mut graph: ModelGraph<u8> = ModelGraph::new();
        let first = graph.add_flux(1, 2, 1, "first").unwrap();
        graph.add_flux(2, 1, 2, "back").unwrap();
        let again = graph.add_flux(1, 2, 3, "second").unwrap();

        assert_eq!(first, again);
        assert_eq!(graph.flux_count(), 2);
        let flux = &graph.fluxes()[0];
        assert_eq!(flux.key(), FluxKey::new(1, 2));
        assert_eq!(flux.flow, 3);
        assert_eq!(flux.name, "second");
    }

    #[test]
    fn flux_debug_skips_payload() {
        let mut graph: ModelGraph<Box<dyn Fn() -> f64>> = ModelGraph::new();
        graph.add_flux(1, 2, Box::new(|| 1.0), "f").unwrap();
        let text = format!("{:?}", graph.fluxes()[0]);
        assert!(text.contains("name: \"f\""));
    }
}

//! Store validation logic.

use std::collections::HashMap;

use bm_core::{ReservoirId, ReservoirKey};

use crate::error::{GraphError, GraphResult};
use crate::graph::Flux;

/// Check that both endpoints of every flux are registered reservoirs.
///
/// Reports the first offender in flux insertion order, source before
/// destination.
pub(crate) fn validate_references<F>(
    reservoirs: &HashMap<ReservoirKey, ReservoirId>,
    fluxes: &[Flux<F>],
) -> GraphResult<()> {
    for flux in fluxes {
        for key in [flux.from, flux.to] {
            if !reservoirs.contains_key(&key) {
                return Err(GraphError::DanglingReference {
                    flux: flux.key(),
                    key,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bm_core::{FluxId, FluxKey};

    fn flux(index: u32, from: u32, to: u32) -> Flux<()> {
        Flux {
            id: FluxId::from_index(index),
            from: ReservoirKey(from),
            to: ReservoirKey(to),
            name: String::new(),
            flow: (),
        }
    }

    fn lookup(keys: &[u32]) -> HashMap<ReservoirKey, ReservoirId> {
        keys.iter()
            .enumerate()
            .map(|(i, &k)| (ReservoirKey(k), ReservoirId::from_index(i as u32)))
            .collect()
    }

    #[test]
    fn validate_empty_store() {
        assert!(validate_references::<()>(&lookup(&[0]), &[]).is_ok());
    }

    #[test]
    fn validate_reports_source_first() {
        let fluxes = vec![flux(0, 0, 1), flux(1, 7, 9)];
        let err = validate_references(&lookup(&[0, 1]), &fluxes).unwrap_err();
        assert_eq!(
            err,
            GraphError::DanglingReference {
                flux: FluxKey::new(7, 9),
                key: ReservoirKey(7),
            }
        );
    }

    #[test]
    fn validate_reports_missing_destination() {
        let fluxes = vec![flux(0, 1, 3)];
        let err = validate_references(&lookup(&[0, 1]), &fluxes).unwrap_err();
        assert!(matches!(
            err,
            GraphError::DanglingReference { key: ReservoirKey(3), .. }
        ));
    }
}

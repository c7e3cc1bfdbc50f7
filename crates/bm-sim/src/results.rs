//! Results of a run and helpers for reading them.

use bm_core::{FluxKey, ReservoirKey};
use bm_graph::ColumnMap;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// One recorded flow evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FluxSample {
    pub t: f64,
    pub flow: f64,
}

/// Everything a flux recorded during a run, in evaluation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluxHistory {
    pub key: FluxKey,
    pub name: String,
    pub samples: Vec<FluxSample>,
}

impl FluxHistory {
    pub fn times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.t).collect()
    }

    pub fn flows(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.flow).collect()
    }
}

/// One row of the masses table, for serialization.
///
/// Infinite masses (the external reservoir) serialize as JSON `null` and
/// read back as `+inf`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MassRecord {
    pub t: f64,
    #[serde(deserialize_with = "null_as_infinity")]
    pub masses: Vec<f64>,
}

fn null_as_infinity<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let masses = Vec::<Option<f64>>::deserialize(deserializer)?;
    Ok(masses
        .into_iter()
        .map(|m| m.unwrap_or(f64::INFINITY))
        .collect())
}

/// Overview of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub time_range: (f64, f64),
    pub row_count: usize,
    pub reservoir_count: usize,
    pub flux_count: usize,
}

/// Dense record of one run.
///
/// Row `i` of the masses table holds the state at `times[i]`; row 0 is the
/// initial condition. Columns follow reservoir insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResults {
    pub(crate) times: Vec<f64>,
    pub(crate) masses: DMatrix<f64>,
    pub(crate) columns: ColumnMap,
    pub(crate) flux_histories: Vec<FluxHistory>,
}

impl RunResults {
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn masses(&self) -> &DMatrix<f64> {
        &self.masses
    }

    /// Reservoir keys in column order.
    pub fn columns(&self) -> &[ReservoirKey] {
        self.columns.keys()
    }

    pub fn column(&self, key: impl Into<ReservoirKey>) -> Option<usize> {
        self.columns.column(key)
    }

    pub fn row_count(&self) -> usize {
        self.masses.nrows()
    }

    /// Mass of one reservoir over time.
    pub fn mass_series(&self, key: impl Into<ReservoirKey>) -> Option<Vec<f64>> {
        let column = self.columns.column(key)?;
        Some(self.masses.column(column).iter().copied().collect())
    }

    pub fn mass_at(&self, row: usize, key: impl Into<ReservoirKey>) -> Option<f64> {
        let column = self.columns.column(key)?;
        self.masses.get((row, column)).copied()
    }

    /// All masses of one row, in column order.
    pub fn row(&self, row: usize) -> Option<Vec<f64>> {
        if row >= self.masses.nrows() {
            return None;
        }
        Some(self.masses.row(row).iter().copied().collect())
    }

    /// Total mass held inside the system (every reservoir except the
    /// external one) at a given row.
    pub fn internal_mass(&self, row: usize) -> Option<f64> {
        if row >= self.masses.nrows() {
            return None;
        }
        let total: f64 = self
            .columns
            .keys()
            .iter()
            .enumerate()
            .filter(|(_, key)| !key.is_external())
            .map(|(column, _)| self.masses[(row, column)])
            .sum();
        Some(total)
    }

    pub fn flux_histories(&self) -> &[FluxHistory] {
        &self.flux_histories
    }

    pub fn flux_history(
        &self,
        from: impl Into<ReservoirKey>,
        to: impl Into<ReservoirKey>,
    ) -> Option<&FluxHistory> {
        let key = FluxKey::new(from, to);
        self.flux_histories.iter().find(|h| h.key == key)
    }

    pub fn summary(&self) -> RunSummary {
        let t_min = self.times.first().copied().unwrap_or(0.0);
        let t_max = self.times.last().copied().unwrap_or(0.0);
        RunSummary {
            time_range: (t_min, t_max),
            row_count: self.masses.nrows(),
            reservoir_count: self.masses.ncols(),
            flux_count: self.flux_histories.len(),
        }
    }

    /// Row-wise copy of the masses table, paired with the time axis.
    pub fn records(&self) -> Vec<MassRecord> {
        self.times
            .iter()
            .zip(self.masses.row_iter())
            .map(|(&t, row)| MassRecord {
                t,
                masses: row.iter().copied().collect(),
            })
            .collect()
    }
}

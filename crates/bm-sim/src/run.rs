//! Run options, progress events and the discrete time grid.

use bm_core::ensure_finite;

use crate::error::{SimError, SimResult};

/// What to do when a model that already holds results is run again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Overwrite {
    /// Keep the existing results and fail with [`SimError::ResultsExist`],
    /// unless a confirmation callback agrees to replace them.
    #[default]
    Deny,
    /// Replace existing results without asking.
    Allow,
}

/// Options for a run.
#[derive(Clone, Debug)]
pub struct RunOptions {
    /// First time point.
    pub t_start: f64,
    /// Exclusive upper bound of the stepping loop.
    pub t_end: f64,
    /// Fixed step size.
    pub t_step: f64,
    /// Report progress every N steps; 0 disables reporting.
    pub progress_interval: usize,
    pub overwrite: Overwrite,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            t_start: 0.0,
            t_end: 10_000.0,
            t_step: 1.0,
            progress_interval: 10_000,
            overwrite: Overwrite::default(),
        }
    }
}

impl RunOptions {
    pub fn new(t_start: f64, t_end: f64, t_step: f64) -> Self {
        Self {
            t_start,
            t_end,
            t_step,
            ..Self::default()
        }
    }

    pub fn with_progress_interval(mut self, progress_interval: usize) -> Self {
        self.progress_interval = progress_interval;
        self
    }

    pub fn with_overwrite(mut self, overwrite: Overwrite) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// Progress notification emitted every `progress_interval` steps.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunProgress {
    /// Steps completed so far (1-based).
    pub step: usize,
    /// Total steps of the run.
    pub total: usize,
    /// Simulation time reached after this step.
    pub t: f64,
}

impl RunProgress {
    pub fn fraction_complete(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.step as f64 / self.total as f64
        }
    }
}

/// Time points of the stepping loop: `t_start + i * t_step` for every `i`
/// with a value below `t_end`.
///
/// The results time axis adds one more point, `last + t_step`, matching the
/// final mass row.
pub fn time_grid(t_start: f64, t_end: f64, t_step: f64) -> SimResult<Vec<f64>> {
    ensure_finite(t_start, "t_start")?;
    ensure_finite(t_end, "t_end")?;
    ensure_finite(t_step, "t_step")?;
    if t_step <= 0.0 {
        return Err(SimError::InvalidArg {
            what: "t_step must be positive",
        });
    }
    if t_start >= t_end {
        return Err(SimError::InvalidArg {
            what: "t_end must be greater than t_start",
        });
    }

    let mut grid = Vec::new();
    loop {
        let t = t_start + grid.len() as f64 * t_step;
        if t >= t_end {
            break;
        }
        grid.push(t);
    }
    Ok(grid)
}

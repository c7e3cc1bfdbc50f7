//! Fixed-step time integration.

use crate::error::SimResult;

/// A dynamic system the integrator can advance.
pub trait TransientModel {
    /// State type (must be Clone).
    type State: Clone;

    /// Compute state derivative dxdt = f(t, x).
    ///
    /// Takes &mut self so models can keep per-step bookkeeping such as flux
    /// histories.
    fn rhs(&mut self, t: f64, x: &Self::State) -> SimResult<Self::State>;

    /// Add two states element-wise: result = a + b.
    fn add(&self, a: &Self::State, b: &Self::State) -> Self::State;

    /// Scale a state by a scalar: result = scale * a.
    fn scale(&self, a: &Self::State, scale: f64) -> Self::State;
}

/// Trait for time integrators.
pub trait Integrator {
    /// Advance state by one time step.
    fn step<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> SimResult<M::State>;
}

/// Forward Euler (explicit, 1st order).
///
/// `x(t + dt) = x(t) + dt * f(t, x(t))`, one rhs call per step, no error
/// control. Accuracy and stability depend entirely on the chosen `dt`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ForwardEuler;

impl Integrator for ForwardEuler {
    fn step<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> SimResult<M::State> {
        let xdot = model.rhs(t, x)?;
        Ok(model.add(x, &model.scale(&xdot, dt)))
    }
}

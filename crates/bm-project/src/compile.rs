//! Turn a scenario into a runnable model.

use bm_sim::{Model, RunOptions, Units, flow};

use crate::schema::{FluxLawDef, RunDef, Scenario};
use crate::validate::validate_scenario;
use crate::ProjectResult;

/// Build a [`Model`] with the scenario's reservoirs and fluxes, in file order.
pub fn compile(scenario: &Scenario) -> ProjectResult<Model> {
    validate_scenario(scenario)?;

    let mut model = Model::new(scenario.name.clone()).with_units(Units {
        mass: scenario.units.mass.clone(),
        time: scenario.units.time.clone(),
    });

    for reservoir in &scenario.reservoirs {
        model.add_reservoir(reservoir.key, reservoir.name.clone(), reservoir.m0)?;
    }

    for flux in &scenario.fluxes {
        let name = flux.name.clone();
        match flux.law {
            FluxLawDef::Constant { rate } => {
                model.add_flux(flux.from, flux.to, flow::constant(rate), name)?
            }
            FluxLawDef::Proportional { k } => {
                model.add_flux(flux.from, flux.to, flow::proportional(k), name)?
            }
            FluxLawDef::Linear { rate, slope } => {
                model.add_flux(flux.from, flux.to, flow::linear(rate, slope), name)?
            }
        };
    }

    tracing::debug!(
        scenario = %scenario.name,
        reservoirs = scenario.reservoirs.len(),
        fluxes = scenario.fluxes.len(),
        "compiled scenario"
    );

    Ok(model)
}

/// Run options from the scenario's run section.
pub fn run_options(run: &RunDef) -> RunOptions {
    RunOptions::new(run.t_start, run.t_end, run.t_step).with_progress_interval(run.progress_interval)
}

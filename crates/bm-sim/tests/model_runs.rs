//! Integration tests: building box models and running them.

use bm_core::{FluxKey, ReservoirKey, Tolerances, nearly_equal};
use bm_graph::GraphError;
use bm_sim::flow::{self, FluxRecorder, ModelState};
use bm_sim::{FluxSample, Model, Overwrite, RunOptions, RunProgress, SimError};

fn two_box() -> Model {
    let mut model = Model::new("two_box");
    model.add_reservoir(1, "upper", 100.0).unwrap();
    model.add_reservoir(2, "lower", 0.0).unwrap();
    model.add_flux(1, 2, flow::constant(5.0), "drain").unwrap();
    model
}

#[test]
fn constant_drain_between_two_boxes() {
    let mut model = two_box();
    let results = model.run(&RunOptions::new(0.0, 3.0, 1.0)).unwrap();

    let expected = [
        [f64::INFINITY, 100.0, 0.0],
        [f64::INFINITY, 95.0, 5.0],
        [f64::INFINITY, 90.0, 10.0],
        [f64::INFINITY, 85.0, 15.0],
    ];
    assert_eq!(results.row_count(), expected.len());
    for (i, row) in expected.iter().enumerate() {
        assert_eq!(results.row(i).unwrap(), row.to_vec(), "row {i}");
    }

    let history = results.flux_history(1, 2).unwrap();
    assert_eq!(history.key, FluxKey::new(1, 2));
    assert_eq!(history.name, "drain");
    assert_eq!(
        history.samples,
        vec![
            FluxSample { t: 0.0, flow: 5.0 },
            FluxSample { t: 1.0, flow: 5.0 },
            FluxSample { t: 2.0, flow: 5.0 },
        ]
    );
}

#[test]
fn time_axis_has_one_trailing_point() {
    let mut model = two_box();
    let results = model.run(&RunOptions::new(0.0, 10.0, 1.0)).unwrap();

    let expected: Vec<f64> = (0..=10).map(f64::from).collect();
    assert_eq!(results.times(), expected.as_slice());
    assert_eq!(results.masses().nrows(), 11);
    assert_eq!(results.masses().ncols(), 3);
    assert_eq!(results.flux_history(1, 2).unwrap().samples.len(), 10);
}

#[test]
fn columns_follow_insertion_order_for_sparse_keys() {
    let mut model = Model::new("sparse");
    model.add_reservoir(40, "late key first", 10.0).unwrap();
    model.add_reservoir(3, "small key second", 0.0).unwrap();
    model.add_flux(40, 3, flow::constant(1.0), "").unwrap();

    let results = model.run(&RunOptions::new(0.0, 2.0, 1.0)).unwrap();
    assert_eq!(
        results.columns(),
        &[ReservoirKey(0), ReservoirKey(40), ReservoirKey(3)]
    );
    assert_eq!(results.mass_series(40), Some(vec![10.0, 9.0, 8.0]));
    assert_eq!(results.mass_series(3), Some(vec![0.0, 1.0, 2.0]));
}

#[test]
fn duplicate_reservoir_key_fails() {
    let mut model = two_box();
    let err = model.add_reservoir(2, "again", 1.0).unwrap_err();
    assert!(matches!(
        err,
        SimError::Graph(GraphError::DuplicateKey { key: ReservoirKey(2) })
    ));
    assert_eq!(model.reservoirs().len(), 3);
    assert_eq!(model.reservoirs()[2].name, "lower");

    let err = model.add_reservoir(0, "outside", 1.0).unwrap_err();
    assert!(matches!(err, SimError::Graph(GraphError::DuplicateKey { .. })));
}

#[test]
fn self_loop_flux_fails() {
    let mut model = two_box();
    let err = model.add_flux(2, 2, flow::constant(1.0), "loop").unwrap_err();
    assert!(matches!(err, SimError::Graph(GraphError::InvalidFlux { .. })));
    assert_eq!(model.fluxes().len(), 1);
}

#[test]
fn rerun_without_confirmation_keeps_results() {
    let mut model = two_box();
    model.run(&RunOptions::new(0.0, 3.0, 1.0)).unwrap();
    let before = model.results().unwrap().clone();

    let err = model.run(&RunOptions::new(0.0, 5.0, 1.0)).unwrap_err();
    assert!(matches!(err, SimError::ResultsExist));
    assert_eq!(model.results(), Some(&before));

    let mut asked = 0;
    let err = model
        .run_with_confirmation(
            &RunOptions::new(0.0, 5.0, 1.0),
            &mut |existing| {
                asked += 1;
                assert_eq!(existing.row_count(), 4);
                false
            },
            None,
        )
        .unwrap_err();
    assert!(matches!(err, SimError::ResultsExist));
    assert_eq!(asked, 1);
    assert_eq!(model.results(), Some(&before));
}

#[test]
fn rerun_with_confirmation_replaces_results() {
    let mut model = two_box();
    model.run(&RunOptions::new(0.0, 3.0, 1.0)).unwrap();

    let results = model
        .run_with_confirmation(&RunOptions::new(0.0, 5.0, 1.0), &mut |_| true, None)
        .unwrap();
    assert_eq!(results.row_count(), 6);
    // histories start over on every run
    assert_eq!(results.flux_history(1, 2).unwrap().samples.len(), 5);

    let opts = RunOptions::new(0.0, 2.0, 1.0).with_overwrite(Overwrite::Allow);
    let results = model.run(&opts).unwrap();
    assert_eq!(results.row_count(), 3);
}

#[test]
fn confirmation_is_not_asked_for_an_empty_model() {
    let mut model = two_box();
    let result = model.run_with_confirmation(
        &RunOptions::new(0.0, 1.0, 1.0),
        &mut |_| panic!("nothing to replace"),
        None,
    );
    assert!(result.is_ok());
}

#[test]
fn dangling_flux_fails_at_run_start() {
    let mut model = two_box();
    model.add_flux(2, 5, flow::constant(1.0), "to nowhere").unwrap();

    let err = model.run(&RunOptions::new(0.0, 3.0, 1.0)).unwrap_err();
    match err {
        SimError::Graph(GraphError::DanglingReference { flux, key }) => {
            assert_eq!(flux, FluxKey::new(2, 5));
            assert_eq!(key, ReservoirKey(5));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(model.results().is_none());
}

#[test]
fn replaced_flux_keeps_position_and_uses_new_law() {
    let mut model = two_box();
    model.add_flux(2, 0, flow::constant(1.0), "outflow").unwrap();
    model.add_flux(1, 2, flow::constant(2.0), "slow drain").unwrap();

    let names: Vec<&str> = model.fluxes().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["slow drain", "outflow"]);

    let results = model.run(&RunOptions::new(0.0, 2.0, 1.0)).unwrap();
    assert_eq!(results.mass_series(1), Some(vec![100.0, 98.0, 96.0]));
    assert_eq!(results.mass_series(2), Some(vec![0.0, 1.0, 2.0]));
}

#[test]
fn progress_is_reported_every_interval() {
    let mut model = two_box();
    let mut events: Vec<RunProgress> = Vec::new();
    let opts = RunOptions::new(0.0, 10.0, 1.0).with_progress_interval(4);
    model
        .run_with_progress(&opts, Some(&mut |p| events.push(p)))
        .unwrap();

    let steps: Vec<usize> = events.iter().map(|p| p.step).collect();
    assert_eq!(steps, vec![4, 8]);
    assert!(events.iter().all(|p| p.total == 10));
    assert_eq!(events[0].t, 4.0);
}

#[test]
fn zero_progress_interval_is_silent() {
    let mut model = two_box();
    let mut count = 0;
    let opts = RunOptions::new(0.0, 5.0, 1.0).with_progress_interval(0);
    model
        .run_with_progress(&opts, Some(&mut |_| count += 1))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn proportional_decay_matches_euler_closed_form() {
    let mut model = Model::new("decay");
    model.add_reservoir(1, "tank", 1000.0).unwrap();
    model.add_flux(1, 0, flow::proportional(0.1), "leak").unwrap();

    let results = model.run(&RunOptions::new(0.0, 2.0, 0.5)).unwrap();
    let series = results.mass_series(1).unwrap();
    let tol = Tolerances::default();
    for (n, mass) in series.iter().enumerate() {
        let expected = 1000.0 * 0.95_f64.powi(n as i32);
        assert!(nearly_equal(*mass, expected, tol), "step {n}: {mass} vs {expected}");
    }
    assert_eq!(results.mass_series(0).unwrap().last(), Some(&f64::INFINITY));
}

#[test]
fn flow_functions_see_the_pre_step_snapshot() {
    // Both fluxes read reservoir 1; the second must not see the first's effect.
    let mut model = Model::new("snapshot");
    model.add_reservoir(1, "a", 10.0).unwrap();
    model.add_reservoir(2, "b", 0.0).unwrap();
    model.add_reservoir(3, "c", 0.0).unwrap();
    model
        .add_flux(1, 2, flow::recorded(|s: &ModelState<'_>, _| s.source_mass() / 2.0), "")
        .unwrap();
    model
        .add_flux(
            1,
            3,
            flow::from_fn(|s, t, rec| {
                let value = s.mass(1).unwrap_or(0.0) / 2.0;
                rec.record(t, value);
                value
            }),
            "",
        )
        .unwrap();

    let results = model.run(&RunOptions::new(0.0, 1.0, 1.0)).unwrap();
    assert_eq!(results.row(1).unwrap(), vec![f64::INFINITY, 0.0, 5.0, 5.0]);
}

#[test]
fn flow_functions_can_skip_recording() {
    let mut model = two_box();
    model
        .add_flux(
            0,
            1,
            flow::from_fn(|_, _, _: &mut FluxRecorder<'_>| 1.0),
            "silent",
        )
        .unwrap();
    let results = model.run(&RunOptions::new(0.0, 3.0, 1.0)).unwrap();
    assert!(results.flux_history(0, 1).unwrap().samples.is_empty());
    assert_eq!(results.mass_series(1), Some(vec![100.0, 96.0, 92.0, 88.0]));
}

#[test]
fn fractional_steps_and_offset_start() {
    let mut model = two_box();
    let results = model.run(&RunOptions::new(2.0, 3.0, 0.25)).unwrap();
    assert_eq!(results.times(), &[2.0, 2.25, 2.5, 2.75, 3.0]);
    assert_eq!(results.mass_at(4, 2), Some(5.0));
    let samples = &results.flux_history(1, 2).unwrap().samples;
    assert_eq!(samples.first().map(|s| s.t), Some(2.0));
    assert_eq!(samples.last().map(|s| s.t), Some(2.75));
}

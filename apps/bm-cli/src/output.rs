//! Text renderings of run results.

use std::io::{self, Write};

use bm_core::ReservoirKey;
use bm_sim::{FluxHistory, MassRecord, Model, RunResults, RunSummary};
use serde::Serialize;

#[derive(Serialize)]
struct ColumnInfo<'a> {
    key: ReservoirKey,
    name: &'a str,
}

#[derive(Serialize)]
struct UnitsInfo<'a> {
    mass: &'a str,
    time: &'a str,
}

#[derive(Serialize)]
struct RunReport<'a> {
    model: &'a str,
    units: UnitsInfo<'a>,
    columns: Vec<ColumnInfo<'a>>,
    summary: RunSummary,
    records: Vec<MassRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fluxes: Option<&'a [FluxHistory]>,
}

/// Column headers such as `01 atmosphere`, in results column order.
fn headers(model: &Model, results: &RunResults) -> Vec<String> {
    results
        .columns()
        .iter()
        .map(|&key| {
            let name = model.graph().reservoir(key).map_or("", |r| r.name.as_str());
            format!("{key} {name}")
        })
        .collect()
}

fn flux_label(history: &FluxHistory) -> String {
    if history.name.is_empty() {
        history.key.to_string()
    } else {
        format!("{} {}", history.key, history.name)
    }
}

pub fn write_table(
    out: &mut impl Write,
    model: &Model,
    results: &RunResults,
    fluxes: bool,
) -> io::Result<()> {
    let units = model.units();
    let headers = headers(model, results);
    let width = headers.iter().map(String::len).max().unwrap_or(0).max(12);

    write!(out, "{:>12}", format!("t [{}]", units.time))?;
    for header in &headers {
        write!(out, " {:>width$}", header)?;
    }
    writeln!(out)?;

    for record in results.records() {
        write!(out, "{:>12}", record.t)?;
        for mass in &record.masses {
            write!(out, " {:>width$.4}", mass)?;
        }
        writeln!(out)?;
    }

    if fluxes {
        for history in results.flux_histories() {
            writeln!(out)?;
            writeln!(
                out,
                "flux {} [{} / {}]",
                flux_label(history),
                units.mass,
                units.time
            )?;
            for sample in &history.samples {
                writeln!(out, "{:>12} {:>12.4}", sample.t, sample.flow)?;
            }
        }
    }
    Ok(())
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

pub fn write_csv(
    out: &mut impl Write,
    model: &Model,
    results: &RunResults,
    fluxes: bool,
) -> io::Result<()> {
    let mut header = vec!["t".to_string()];
    header.extend(headers(model, results).iter().map(|h| csv_field(h)));
    writeln!(out, "{}", header.join(","))?;

    for record in results.records() {
        let mut row = vec![record.t.to_string()];
        row.extend(record.masses.iter().map(|m| m.to_string()));
        writeln!(out, "{}", row.join(","))?;
    }

    if fluxes {
        writeln!(out)?;
        writeln!(out, "flux,t,flow")?;
        for history in results.flux_histories() {
            let label = csv_field(&flux_label(history));
            for sample in &history.samples {
                writeln!(out, "{},{},{}", label, sample.t, sample.flow)?;
            }
        }
    }
    Ok(())
}

pub fn write_json(
    out: &mut impl Write,
    model: &Model,
    results: &RunResults,
    fluxes: bool,
) -> serde_json::Result<()> {
    let units = model.units();
    let columns = results
        .columns()
        .iter()
        .map(|&key| ColumnInfo {
            key,
            name: model.graph().reservoir(key).map_or("", |r| r.name.as_str()),
        })
        .collect();
    let report = RunReport {
        model: model.name(),
        units: UnitsInfo {
            mass: &units.mass,
            time: &units.time,
        },
        columns,
        summary: results.summary(),
        records: results.records(),
        fluxes: fluxes.then(|| results.flux_histories()),
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    // trailing newline for terminals
    writeln!(out).map_err(serde_json::Error::io)?;
    Ok(())
}

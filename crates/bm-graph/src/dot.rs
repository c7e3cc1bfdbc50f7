//! Graphviz DOT export of a model.
//!
//! Produces text only; turning it into an image is up to `dot` or any other
//! Graphviz front end.

use std::fmt::Write;

use crate::graph::{ModelGraph, Reservoir};

/// Render reservoirs as boxes and fluxes as labelled edges.
pub fn to_dot<F>(graph: &ModelGraph<F>, title: &str) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = writeln!(out, "digraph \"{}\" {{", escape(title));
    let _ = writeln!(out, "    node [shape=box, width=1, color=orange];");

    for reservoir in graph.reservoirs() {
        if reservoir.is_external() {
            let _ = writeln!(
                out,
                "    r{} [label=\"{}\", color=black];",
                reservoir.key.0,
                label(reservoir)
            );
        } else {
            let _ = writeln!(out, "    r{} [label=\"{}\"];", reservoir.key.0, label(reservoir));
        }
    }

    for flux in graph.fluxes() {
        let _ = writeln!(
            out,
            "    r{} -> r{} [label=\" {} \"];",
            flux.from.0,
            flux.to.0,
            escape(&flux.name)
        );
    }

    out.push_str("}\n");
    out
}

fn label(reservoir: &Reservoir) -> String {
    let head = format!("{} {}", reservoir.key, escape(&reservoir.name));
    if reservoir.is_external() {
        head
    } else {
        format!("{}\\nM0 {}", head, reservoir.initial_mass)
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

impl<F> ModelGraph<F> {
    /// See [`to_dot`].
    pub fn to_dot(&self, title: &str) -> String {
        to_dot(self, title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_lists_nodes_and_edges() {
        let mut graph: ModelGraph<()> = ModelGraph::new();
        graph.add_reservoir(1, "ocean", 100.0).unwrap();
        graph.add_reservoir(2, "deep \"sea\"", 0.5).unwrap();
        graph.add_flux(1, 2, (), "mixing").unwrap();
        graph.add_flux(0, 1, (), "").unwrap();

        let dot = graph.to_dot("carbon");
        assert!(dot.starts_with("digraph \"carbon\" {\n"));
        assert!(dot.contains("r0 [label=\"00 external\", color=black];"));
        assert!(dot.contains("r1 [label=\"01 ocean\\nM0 100\"];"));
        assert!(dot.contains("r2 [label=\"02 deep \\\"sea\\\"\\nM0 0.5\"];"));
        assert!(dot.contains("r1 -> r2 [label=\" mixing \"];"));
        assert!(dot.contains("r0 -> r1 [label=\"  \"];"));
        assert!(dot.ends_with("}\n"));
    }
}

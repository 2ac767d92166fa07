//! Rewrites the auto-properties of change-notifying types.
//!
//! For every class or struct that implements the notification interface
//! (directly or through an ancestor) and can reach a helper method named by
//! convention, each `{ get; set; }` property becomes an explicit property
//! over a private storage field. Its setter returns early on an unchanged
//! value, otherwise stores it and calls the helper for the property and for
//! every computed sibling that reads it.
//!
//! ```text
//! public int Count { get; set; }
//!
//! public int Count {
//!     get { return __pc_Count; }
//!     set {
//!         if (__pc_Count == value) return;
//!         __pc_Count = value;
//!         OnPropertyChanged("Count");
//!     }
//! }
//! private int __pc_Count;
//! ```
pub mod cli;
pub mod codegen;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod ir;
pub mod path_de;
pub mod resolve;
pub mod rewrite;
pub mod sim;

use rayon::prelude::*;
use tracing::info;

pub use config::{Protocol, RewriteOptions};
pub use diagnostics::{Diagnostic, DiagnosticBag, DiagnosticId, DiagnosticSink};
pub use error::RewriteError;
pub use ir::Program;
pub use rewrite::{RewriteStats, Rewriter};

/// Rewrites a whole program. The result has the same units in the same
/// order; diagnostics go to `sink` and never stop the pass.
pub fn rewrite(
    program: &Program,
    options: &RewriteOptions,
    sink: &dyn DiagnosticSink,
) -> Result<Program, RewriteError> {
    rewrite_with_stats(program, options, sink).map(|(program, _)| program)
}

pub fn rewrite_with_stats(
    program: &Program,
    options: &RewriteOptions,
    sink: &dyn DiagnosticSink,
) -> Result<(Program, RewriteStats), RewriteError> {
    options.validate()?;
    let table = resolve::TypeTable::build(program)?;
    let rewriter = Rewriter::new(&table, options, sink);

    let results = if options.parallel {
        program
            .units
            .par_iter()
            .map(|unit| rewriter.rewrite_unit(unit))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        program
            .units
            .iter()
            .map(|unit| rewriter.rewrite_unit(unit))
            .collect::<Result<Vec<_>, _>>()?
    };

    let mut stats = RewriteStats::default();
    let mut units = Vec::with_capacity(results.len());
    for (unit, unit_stats) in results {
        stats += unit_stats;
        units.push(unit);
    }
    info!(
        units = units.len(),
        types = stats.types_visited,
        rewritten = stats.types_rewritten,
        skipped = stats.types_skipped,
        properties = stats.properties_rewritten,
        "rewrite finished"
    );
    Ok((Program { units, references: program.references.clone() }, stats))
}

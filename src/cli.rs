//! Minimal CLI: load → rewrite → (json | source)
use std::path::PathBuf;
use std::process::ExitCode;
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::RewriteOptions;
use crate::diagnostics::{Diagnostic, DiagnosticBag};
use crate::ir::Program;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// rewrite auto-properties of change-notifying types into notifying properties
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// rewrite and print the resulting program
    Rewrite(RewriteOut),
    /// only report diagnostics; exits with 1 if there were any
    Check(CheckOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more program files (JSON). May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// JSON file with rewrite options
    #[arg(long)]
    config: Option<PathBuf>,

    /// fully-qualified notification interface (overrides config)
    #[arg(long)]
    interface: Option<String>,

    /// helper method name (overrides config)
    #[arg(long)]
    helper: Option<String>,

    /// process compilation units one after another
    #[arg(long, default_value_t = false)]
    sequential: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Emit {
    Json,
    Source,
}

#[derive(clap::Parser, Debug)]
struct RewriteOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output format
    #[arg(long, value_enum, default_value_t = Emit::Json)]
    emit: Emit,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct CheckOut {
    #[command(flatten)]
    input_settings: InputSettings,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn options(&self) -> Result<RewriteOptions> {
        let mut options = match &self.config {
            Some(path) => RewriteOptions::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => RewriteOptions::default(),
        };
        if let Some(interface) = &self.interface {
            options.protocol.interface = interface.clone();
        }
        if let Some(helper) = &self.helper {
            options.protocol.helper = helper.clone();
        }
        if self.sequential {
            options.parallel = false;
        }
        options.validate()?;
        Ok(options)
    }

    /// All inputs merged into one program so inheritance can cross files.
    fn load_program(&self) -> Result<Program> {
        let source_paths = resolve_file_path_patterns(&self.input)?;
        let mut merged = Program::default();
        for source_path in source_paths {
            let program: Program = crate::path_de::read_json_file(&source_path)
                .with_context(|| format!("failed to load program {}", source_path.display()))?;
            tracing::debug!(path = %source_path.display(), units = program.units.len(), "loaded program");
            merged.units.extend(program.units);
            merged.references.extend(program.references);
        }
        Ok(merged)
    }

    fn rewrite(&self) -> Result<(Program, Vec<Diagnostic>)> {
        let options = self.options()?;
        let program = self.load_program()?;
        let bag = DiagnosticBag::new();
        let rewritten = crate::rewrite(&program, &options, &bag)?;
        let mut diagnostics = bag.into_vec();
        // workers report in any order
        diagnostics.sort_by(|a, b| {
            (&a.location.path, a.location.span.line, a.location.span.column)
                .cmp(&(&b.location.path, b.location.span.line, b.location.span.column))
        });
        for diagnostic in &diagnostics {
            eprintln!("{}", diagnostic.render_colored());
        }
        Ok((rewritten, diagnostics))
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<ExitCode> {
        match &self.cmd {
            Command::Rewrite(target) => {
                let (program, _) = target.input_settings.rewrite()?;
                let rendered = match target.emit {
                    Emit::Json => serde_json::to_string_pretty(&program)?,
                    Emit::Source => {
                        let mut cg = crate::codegen::Codegen::new();
                        for unit in &program.units {
                            cg.emit_unit(unit);
                        }
                        cg.into_string()
                    }
                };
                if let Some(out) = target.out.as_ref() {
                    if let Some(parent) = out.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(out, &rendered)
                        .with_context(|| format!("failed to write {}", out.display()))?;
                } else {
                    println!("{rendered}");
                }
                Ok(ExitCode::SUCCESS)
            }
            Command::Check(target) => {
                let (_, diagnostics) = target.input_settings.rewrite()?;
                if diagnostics.is_empty() {
                    Ok(ExitCode::SUCCESS)
                } else {
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                matched_any = true;
                out.push(entry?);
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rewrite_flags() {
        let cli = CommandLineInterface::try_parse_from([
            "prop-changed", "rewrite", "-i", "a.json", "b.json", "--emit", "source", "--helper", "Raise", "--sequential",
        ])
        .unwrap();
        let Command::Rewrite(target) = cli.cmd else { panic!("expected rewrite") };
        assert_eq!(target.emit, Emit::Source);
        assert_eq!(target.input_settings.input, vec!["a.json".to_string(), "b.json".to_string()]);
        let options = target.input_settings.options().unwrap();
        assert_eq!(options.protocol.helper, "Raise");
        assert!(!options.parallel);
    }

    #[test]
    fn literal_paths_pass_through() {
        let paths = resolve_file_path_patterns(["models/a.json"]).unwrap();
        assert_eq!(paths, vec![PathBuf::from("models/a.json")]);
    }
}

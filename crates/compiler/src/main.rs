//! Reso compiler CLI
//!
//! Command-line interface for compiling .reso sources to LLVM IR
//! modules and for diagnostics-only checking.

use clap::{CommandFactory, Parser as ClapParser, Subcommand};
use clap_complete::{generate, Shell};
use resoc::{compile_files, compile_to_file, CompilerConfig, Diagnostics};
use std::io;
use std::path::{Path, PathBuf};
use std::process;

#[derive(ClapParser)]
#[command(name = "resoc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Reso compiler - compile .reso sources to LLVM IR", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile .reso files into one LLVM IR module
    Build {
        /// Input .reso source files (compiled as one unit)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output .ll path (defaults to the first input with a .ll extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Path to a reso.toml compiler configuration
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check .reso files and report diagnostics without writing output
    Check {
        /// Input .reso source files (checked as one unit)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Path to a reso.toml compiler configuration
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Build {
            inputs,
            output,
            config,
        } => build(&inputs, output.as_deref(), config.as_deref()),
        Commands::Check { inputs, config } => check(&inputs, config.as_deref()),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    };

    if let Err(message) = result {
        eprintln!("error: {}", message);
        process::exit(1);
    }
}

/// Load the config: an explicit path, or `reso.toml` in the current
/// directory when present, or the defaults.
fn load_config(path: Option<&Path>) -> Result<CompilerConfig, String> {
    match path {
        Some(path) => CompilerConfig::load(path),
        None => {
            let implicit = Path::new("reso.toml");
            if implicit.exists() {
                CompilerConfig::load(implicit)
            } else {
                Ok(CompilerConfig::default())
            }
        }
    }
}

fn report(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics.iter() {
        eprintln!("{}", diagnostic);
    }
}

fn build(
    inputs: &[PathBuf],
    output: Option<&Path>,
    config_path: Option<&Path>,
) -> Result<(), String> {
    let config = load_config(config_path)?;
    let output_path = match output {
        Some(path) => path.to_path_buf(),
        None => inputs[0].with_extension("ll"),
    };

    let compiled = compile_to_file(inputs, &output_path, &config)?;
    report(&compiled.diagnostics);
    if !compiled.succeeded() {
        return Err("compilation failed".to_string());
    }
    Ok(())
}

fn check(inputs: &[PathBuf], config_path: Option<&Path>) -> Result<(), String> {
    let config = load_config(config_path)?;
    let compiled = compile_files(inputs, &config)?;
    report(&compiled.diagnostics);
    if !compiled.succeeded() {
        return Err("check failed".to_string());
    }
    Ok(())
}

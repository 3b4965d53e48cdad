//! Reso compiler library
//!
//! Compiles a batch of `.reso` source files (one compilation unit) to
//! a single textual LLVM IR module. The pipeline:
//!
//! 1. Parse every file into its module (indentation-structured syntax).
//! 2. Collect symbols: per-file function tables plus the public index,
//!    so forward and cross-file calls resolve.
//! 3. Lower every function: scoped symbol resolution, literal typing
//!    and promotion, instruction selection by signedness, SSA block
//!    plumbing for control flow.
//! 4. Emit the module, or, when any error was diagnosed, no IR at all.
//!
//! ```rust
//! use resoc::{compile_unit, CompilerConfig, SourceFile};
//!
//! let files = [SourceFile::new(
//!     "main.reso",
//!     "pub def main() -> i32:\n    return 0\n",
//! )];
//! let output = compile_unit(&files, &CompilerConfig::default()).unwrap();
//! assert!(output.ir.is_some());
//! ```

pub mod ast;
pub mod codegen;
pub mod config;
pub mod diagnostics;
pub mod parser;
pub mod scope;
pub mod symbols;
pub mod types;

pub use codegen::CodeGen;
pub use config::CompilerConfig;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use parser::{ParseError, Parser};
pub use symbols::SymbolTable;
pub use types::{Target, Ty};

use ast::Program;
use std::path::Path;

/// One source file of the compilation unit.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Unit-local name used in diagnostics and visibility checks
    pub name: String,
    pub text: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        SourceFile {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Result of compiling a unit: the IR module on success, and whatever
/// diagnostics accumulated either way.
#[derive(Debug)]
pub struct CompileOutput {
    /// `None` whenever the diagnostics contain at least one error
    pub ir: Option<String>,
    pub diagnostics: Diagnostics,
}

impl CompileOutput {
    pub fn succeeded(&self) -> bool {
        self.ir.is_some()
    }
}

/// Compile a set of in-memory sources as one unit.
///
/// Returns `Err` only when the generator itself fails; source problems
/// are reported through [`CompileOutput::diagnostics`].
pub fn compile_unit(
    files: &[SourceFile],
    config: &CompilerConfig,
) -> Result<CompileOutput, String> {
    let mut diagnostics = Diagnostics::new();
    let mut program = Program::new();

    for file in files {
        let parsed = Parser::new(&file.text).and_then(|mut parser| parser.parse(&file.name));
        match parsed {
            Ok(module) => program.modules.push(module),
            Err(e) => diagnostics.error(&file.name, e.line, e.message),
        }
    }

    let symbols = SymbolTable::collect(&program, &mut diagnostics);
    let target = config.resolve_target()?;
    let mut codegen = CodeGen::new(target, symbols, diagnostics, config.module_name());
    let ir = codegen
        .codegen_program(&program)
        .map_err(|e| e.to_string())?;
    Ok(CompileOutput {
        ir,
        diagnostics: codegen.finish(),
    })
}

/// Read the given paths and compile them as one unit.
pub fn compile_files(inputs: &[impl AsRef<Path>], config: &CompilerConfig) -> Result<CompileOutput, String> {
    let mut files = Vec::with_capacity(inputs.len());
    for input in inputs {
        let path = input.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        files.push(SourceFile::new(name, text));
    }
    compile_unit(&files, config)
}

/// Compile the given paths and write the IR module to `output` when the
/// unit is error-free.
pub fn compile_to_file(
    inputs: &[impl AsRef<Path>],
    output: &Path,
    config: &CompilerConfig,
) -> Result<CompileOutput, String> {
    let compiled = compile_files(inputs, config)?;
    if let Some(ir) = &compiled.ir {
        std::fs::write(output, ir)
            .map_err(|e| format!("Failed to write {}: {}", output.display(), e))?;
    }
    Ok(compiled)
}

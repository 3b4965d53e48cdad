//! CodeGen state and core types
//!
//! The CodeGen struct owns the append-only text builders, the name
//! counters, the scope stack of the function being lowered, and the
//! diagnostics bag. Per-function state is reset at each function entry.

use super::CodeGenError;
use crate::diagnostics::Diagnostics;
use crate::scope::ScopeStack;
use crate::symbols::SymbolTable;
use crate::types::{Target, Ty};
use std::collections::HashMap;
use std::fmt::Write as _;

/// Branch targets of the innermost enclosing `while`.
///
/// Pushed on entering a loop and popped on exit; `break` and `continue`
/// read the top. An empty stack means the statement is outside any loop.
#[derive(Debug, Clone)]
pub(super) struct LoopLabels {
    pub cond: String,
    pub end: String,
}

/// An SSA value paired with its static type.
///
/// `repr` is the operand spelling: a register (`%t3`, `%i_load`), a
/// rendered constant (`-56`, `true`, `3.140000e+00`), or a global
/// (`@str`). The static type drives every later instruction choice.
#[derive(Debug, Clone)]
pub(super) struct RValue {
    pub repr: String,
    pub ty: Ty,
}

impl RValue {
    pub fn new(repr: impl Into<String>, ty: Ty) -> Self {
        RValue {
            repr: repr.into(),
            ty,
        }
    }

    /// Sentinel returned after a diagnostic; lowering keeps going so
    /// further independent errors can surface, and the error type
    /// silences follow-on complaints.
    pub fn poison() -> Self {
        RValue {
            repr: "poison".to_string(),
            ty: Ty::Error,
        }
    }
}

pub struct CodeGen {
    /// Function definitions, in declaration order
    pub(super) output: String,
    /// String literal globals emitted ahead of the functions
    pub(super) string_globals: String,
    pub(super) string_counter: usize,
    /// string content -> global name (deduplication)
    pub(super) string_constants: HashMap<String, String>,
    pub(super) temp_counter: usize,
    /// Per-function name allocator for slots, labels, and load names.
    /// First use of a base name is unsuffixed; repeats get `x2`, `x3`, ...
    pub(super) name_counts: HashMap<String, usize>,
    pub(super) scopes: ScopeStack,
    pub(super) loop_stack: Vec<LoopLabels>,
    pub(super) target: Target,
    pub(super) symbols: SymbolTable,
    pub(super) diagnostics: Diagnostics,
    pub(super) module_name: String,
    pub(super) current_file: String,
    pub(super) current_return: Ty,
    /// Label of the basic block currently receiving instructions;
    /// phi nodes name their predecessors with this.
    pub(super) current_block: String,
    /// True once the current block has an unconditional terminator;
    /// statements lowered after that are unreachable.
    pub(super) terminated: bool,
}

impl CodeGen {
    pub fn new(
        target: Target,
        symbols: SymbolTable,
        diagnostics: Diagnostics,
        module_name: &str,
    ) -> Self {
        CodeGen {
            output: String::new(),
            string_globals: String::new(),
            string_counter: 0,
            string_constants: HashMap::new(),
            temp_counter: 0,
            name_counts: HashMap::new(),
            scopes: ScopeStack::new(),
            loop_stack: Vec::new(),
            target,
            symbols,
            diagnostics,
            module_name: module_name.to_string(),
            current_file: String::new(),
            current_return: Ty::Unit,
            current_block: String::new(),
            terminated: false,
        }
    }

    /// Hand the accumulated diagnostics back to the driver.
    pub fn finish(self) -> Diagnostics {
        self.diagnostics
    }

    pub(super) fn ptr_bits(&self) -> u32 {
        self.target.ptr_bits
    }

    /// IR spelling of `ty` on the current target.
    pub(super) fn ir_ty(&self, ty: Ty) -> &'static str {
        ty.ir_type(self.target.ptr_bits)
    }

    pub(super) fn error(&mut self, line: usize, message: impl Into<String>) {
        let file = self.current_file.clone();
        self.diagnostics.error(&file, line, message);
    }

    pub(super) fn warning(&mut self, line: usize, message: impl Into<String>) {
        let file = self.current_file.clone();
        self.diagnostics.warning(&file, line, message);
    }

    /// Generate a fresh unnamed temporary (`t1`, `t2`, ...).
    pub(super) fn fresh_temp(&mut self) -> String {
        self.temp_counter += 1;
        format!("t{}", self.temp_counter)
    }

    /// Allocate a function-local name from a base. The first use gets
    /// the bare base; repeats are suffixed (`x`, `x2`, `x3`, ...), which
    /// is how shadowed slots and reused labels stay distinct.
    pub(super) fn local_name(&mut self, base: &str) -> String {
        let count = self.name_counts.entry(base.to_string()).or_insert(0);
        *count += 1;
        if *count == 1 {
            base.to_string()
        } else {
            format!("{}{}", base, *count)
        }
    }

    /// Begin a new basic block: emit the label and reset the
    /// terminator flag.
    pub(super) fn emit_label(&mut self, label: &str) -> Result<(), CodeGenError> {
        writeln!(&mut self.output, "{}:", label)?;
        self.current_block = label.to_string();
        self.terminated = false;
        Ok(())
    }

    /// Intern a string literal as a private null-terminated global and
    /// return its name (e.g. `@str`).
    pub(super) fn get_string_global(&mut self, content: &str) -> Result<String, CodeGenError> {
        if let Some(name) = self.string_constants.get(content) {
            return Ok(name.clone());
        }
        self.string_counter += 1;
        let name = if self.string_counter == 1 {
            "@str".to_string()
        } else {
            format!("@str{}", self.string_counter)
        };

        let bytes = content.as_bytes();
        let mut escaped = String::new();
        for &b in bytes {
            match b {
                b'"' | b'\\' => escaped.push_str(&format!("\\{:02X}", b)),
                0x20..=0x7e => escaped.push(b as char),
                _ => escaped.push_str(&format!("\\{:02X}", b)),
            }
        }
        writeln!(
            &mut self.string_globals,
            "{} = private unnamed_addr constant [{} x i8] c\"{}\\00\"",
            name,
            bytes.len() + 1,
            escaped
        )?;

        self.string_constants
            .insert(content.to_string(), name.clone());
        Ok(name)
    }

    /// Reset all per-function state before lowering a new function.
    pub(super) fn begin_function(&mut self, return_ty: Ty) {
        self.temp_counter = 0;
        self.name_counts.clear();
        self.scopes = ScopeStack::new();
        self.loop_stack.clear();
        self.current_return = return_ty;
        self.current_block = "entry".to_string();
        self.terminated = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_codegen() -> CodeGen {
        CodeGen::new(
            Target::with_ptr_bits(64),
            SymbolTable::default(),
            Diagnostics::new(),
            "test",
        )
    }

    #[test]
    fn test_local_names_suffix_on_reuse() {
        let mut cg = test_codegen();
        assert_eq!(cg.local_name("x"), "x");
        assert_eq!(cg.local_name("x"), "x2");
        assert_eq!(cg.local_name("x"), "x3");
        assert_eq!(cg.local_name("while_cond"), "while_cond");
        assert_eq!(cg.local_name("while_cond"), "while_cond2");
    }

    #[test]
    fn test_string_globals_dedupe() {
        let mut cg = test_codegen();
        let a = cg.get_string_global("hello").unwrap();
        let b = cg.get_string_global("world").unwrap();
        let c = cg.get_string_global("hello").unwrap();
        assert_eq!(a, "@str");
        assert_eq!(b, "@str2");
        assert_eq!(a, c);
        assert!(cg.string_globals.contains("[6 x i8] c\"hello\\00\""));
    }

    #[test]
    fn test_string_globals_escape_quotes_and_newlines() {
        let mut cg = test_codegen();
        cg.get_string_global("a\"b\n").unwrap();
        assert!(cg.string_globals.contains("c\"a\\22b\\0A\\00\""));
    }
}

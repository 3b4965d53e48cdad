//! Program code generation
//!
//! Entry points for lowering a whole compilation unit to one LLVM IR
//! module: the module header, the `%unit` named type, string globals,
//! and one function definition per Reso function.

use super::{CodeGen, CodeGenError};
use crate::ast::{FnDecl, Program};
use crate::scope::VarBinding;
use crate::types::Ty;
use std::fmt::Write as _;

impl CodeGen {
    /// Lower every function of the program. Returns the IR module text,
    /// or `None` when the diagnostics bag holds any error; no partial
    /// IR ever leaks out of a failed unit.
    pub fn codegen_program(&mut self, program: &Program) -> Result<Option<String>, CodeGenError> {
        for module in &program.modules {
            self.current_file = module.file.clone();
            for func in &module.functions {
                self.codegen_function(func)?;
            }
        }

        if self.diagnostics.has_errors() {
            return Ok(None);
        }

        let mut ir = String::new();
        writeln!(&mut ir, "; ModuleID = '{}'", self.module_name)?;
        writeln!(&mut ir, "source_filename = \"{}\"", self.module_name)?;
        writeln!(&mut ir, "target datalayout = \"{}\"", self.target.datalayout)?;
        writeln!(&mut ir, "target triple = \"{}\"", self.target.triple)?;
        writeln!(&mut ir)?;
        writeln!(&mut ir, "%unit = type {{}}")?;
        writeln!(&mut ir)?;
        if !self.string_globals.is_empty() {
            ir.push_str(&self.string_globals);
            writeln!(&mut ir)?;
        }
        ir.push_str(&self.output);
        Ok(Some(ir))
    }

    /// Lower one function definition. Parameters arrive as `%name_arg`
    /// and are stored into ordinary slots so the body reads them like
    /// any other variable.
    fn codegen_function(&mut self, func: &FnDecl) -> Result<(), CodeGenError> {
        self.begin_function(func.return_ty);

        let symbol = self
            .symbols
            .in_file(&self.current_file, &func.name)
            .map(|record| record.symbol.clone())
            .unwrap_or_else(|| func.name.clone());

        let rendered_params = func
            .params
            .iter()
            .map(|p| format!("{} %{}_arg", self.ir_ty(p.ty), p.name))
            .collect::<Vec<_>>()
            .join(", ");
        let return_type = self.ir_ty(func.return_ty);
        writeln!(
            &mut self.output,
            "define {} @{}({}) {{",
            return_type, symbol, rendered_params
        )?;
        writeln!(&mut self.output, "entry:")?;

        for param in &func.params {
            let ir_type = self.ir_ty(param.ty);
            let slot = self.local_name(&param.name);
            writeln!(&mut self.output, "  %{} = alloca {}", slot, ir_type)?;
            writeln!(
                &mut self.output,
                "  store {} %{}_arg, ptr %{}",
                ir_type, param.name, slot
            )?;
            if self
                .scopes
                .declare(&param.name, VarBinding { ty: param.ty, slot })
                .is_err()
            {
                self.error(
                    param.span.line,
                    format!("Variable '{}' is already defined in this scope", param.name),
                );
            }
        }

        self.lower_block(&func.body)?;

        if !self.terminated {
            if func.return_ty == Ty::Unit {
                writeln!(&mut self.output, "  ret %unit zeroinitializer")?;
            } else {
                self.error(
                    func.span.line,
                    format!(
                        "Function '{}' does not return a value on every path",
                        func.name
                    ),
                );
                writeln!(&mut self.output, "  unreachable")?;
            }
        }

        writeln!(&mut self.output, "}}")?;
        writeln!(&mut self.output)?;
        Ok(())
    }
}

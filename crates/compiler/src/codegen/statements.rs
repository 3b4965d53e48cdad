//! Statement lowering
//!
//! Manages the basic-block structure of each function: conditional and
//! loop labels, branch targets for `break`/`continue`, and the
//! terminator tracking that feeds the unreachable-code warning.

use super::{CodeGen, CodeGenError, LoopLabels};
use crate::ast::{Block, Expr, Stmt};
use crate::scope::VarBinding;
use crate::types::Ty;
use std::fmt::Write as _;

impl CodeGen {
    /// Lower a block in its own scope. Statements after an
    /// unconditional terminator are unreachable: warn once and skip
    /// them, keeping the IR for the reachable part.
    pub(super) fn lower_block(&mut self, block: &Block) -> Result<(), CodeGenError> {
        self.scopes.push();
        let mut warned = false;
        for stmt in &block.stmts {
            if self.terminated {
                if !warned {
                    self.warning(stmt.span().line, "Unreachable code");
                    warned = true;
                }
                continue;
            }
            self.lower_stmt(stmt)?;
        }
        self.scopes.pop();
        Ok(())
    }

    pub(super) fn lower_stmt(&mut self, stmt: &Stmt) -> Result<(), CodeGenError> {
        match stmt {
            Stmt::VarDecl {
                name,
                declared_ty,
                init,
                span,
            } => self.lower_var_decl(name, *declared_ty, init.as_ref(), span.line),

            Stmt::Assign { name, value, span } => self.lower_assign(name, value, span.line),

            Stmt::If {
                cond,
                then_block,
                else_block,
                span,
            } => self.lower_if(cond, then_block, else_block.as_ref(), span.line),

            Stmt::While { cond, body, span } => self.lower_while(cond, body, span.line),

            Stmt::Break { span } => {
                let Some(labels) = self.loop_stack.last().cloned() else {
                    self.error(span.line, "'break' used outside of a loop");
                    return Ok(());
                };
                writeln!(&mut self.output, "  br label %{}", labels.end)?;
                self.terminated = true;
                Ok(())
            }

            Stmt::Continue { span } => {
                let Some(labels) = self.loop_stack.last().cloned() else {
                    self.error(span.line, "'continue' used outside of a loop");
                    return Ok(());
                };
                writeln!(&mut self.output, "  br label %{}", labels.cond)?;
                self.terminated = true;
                Ok(())
            }

            Stmt::Return { value, span } => self.lower_return(value.as_ref(), span.line),

            Stmt::Expr { expr, .. } => {
                // Value discarded; the instructions still appear.
                self.lower_expr(expr, None)?;
                Ok(())
            }

            Stmt::Pass { .. } => Ok(()),
        }
    }

    fn lower_var_decl(
        &mut self,
        name: &str,
        declared_ty: Option<Ty>,
        init: Option<&Expr>,
        line: usize,
    ) -> Result<(), CodeGenError> {
        let init_val = match init {
            Some(expr) => Some(self.lower_expr(expr, declared_ty)?),
            None => None,
        };

        let ty = match (declared_ty, &init_val) {
            (Some(declared), Some(value)) => {
                if value.ty != declared && value.ty != Ty::Error {
                    self.error(
                        line,
                        format!(
                            "type mismatch: cannot initialize variable '{}' of type '{}' with a value of type '{}'",
                            name, declared, value.ty
                        ),
                    );
                }
                declared
            }
            (Some(declared), None) => declared,
            (None, Some(value)) => value.ty,
            // The parser guarantees a type or an initializer
            (None, None) => Ty::Error,
        };

        let ir_type = self.ir_ty(ty);
        let slot = self.local_name(name);
        if ty != Ty::Error {
            writeln!(&mut self.output, "  %{} = alloca {}", slot, ir_type)?;
        }

        if self
            .scopes
            .declare(name, VarBinding { ty, slot: slot.clone() })
            .is_err()
        {
            self.error(
                line,
                format!("Variable '{}' is already defined in this scope", name),
            );
            return Ok(());
        }

        if let Some(value) = init_val
            && ty != Ty::Error
            && value.ty != Ty::Error
        {
            writeln!(
                &mut self.output,
                "  store {} {}, ptr %{}",
                ir_type, value.repr, slot
            )?;
        }
        Ok(())
    }

    fn lower_assign(&mut self, name: &str, value: &Expr, line: usize) -> Result<(), CodeGenError> {
        let Some(binding) = self.scopes.lookup(name).cloned() else {
            self.error(line, format!("Variable '{}' is not defined", name));
            self.lower_expr(value, None)?;
            return Ok(());
        };
        let rvalue = self.lower_expr(value, Some(binding.ty))?;
        if binding.ty == Ty::Error || rvalue.ty == Ty::Error {
            return Ok(());
        }
        if rvalue.ty != binding.ty {
            self.error(
                line,
                format!(
                    "type mismatch: cannot assign a value of type '{}' to '{}' of type '{}'",
                    rvalue.ty, name, binding.ty
                ),
            );
            return Ok(());
        }
        let ir_type = self.ir_ty(binding.ty);
        writeln!(
            &mut self.output,
            "  store {} {}, ptr %{}",
            ir_type, rvalue.repr, binding.slot
        )?;
        Ok(())
    }

    /// Lower a condition expression and require `bool`.
    fn lower_condition(
        &mut self,
        cond: &Expr,
        construct: &str,
        line: usize,
    ) -> Result<String, CodeGenError> {
        let value = self.lower_expr(cond, None)?;
        if value.ty != Ty::Bool && value.ty != Ty::Error {
            self.error(
                line,
                format!(
                    "The {} condition must be a boolean, found '{}'",
                    construct, value.ty
                ),
            );
        }
        Ok(value.repr)
    }

    fn lower_if(
        &mut self,
        cond: &Expr,
        then_block: &Block,
        else_block: Option<&Block>,
        line: usize,
    ) -> Result<(), CodeGenError> {
        let cond_repr = self.lower_condition(cond, "if", line)?;

        let then_label = self.local_name("if_then");
        let else_label = else_block.map(|_| self.local_name("if_else"));
        let end_label = self.local_name("if_end");

        let false_target = else_label.as_deref().unwrap_or(&end_label);
        writeln!(
            &mut self.output,
            "  br i1 {}, label %{}, label %{}",
            cond_repr, then_label, false_target
        )?;

        self.emit_label(&then_label)?;
        self.lower_block(then_block)?;
        let then_terminated = self.terminated;
        if !then_terminated {
            writeln!(&mut self.output, "  br label %{}", end_label)?;
        }

        let mut else_terminated = false;
        if let (Some(label), Some(block)) = (&else_label, else_block) {
            self.emit_label(label)?;
            self.lower_block(block)?;
            else_terminated = self.terminated;
            if !else_terminated {
                writeln!(&mut self.output, "  br label %{}", end_label)?;
            }
        }

        self.emit_label(&end_label)?;
        if then_terminated && else_terminated {
            // Both arms already left the block; the merge label has no
            // predecessors and anything after it is unreachable.
            writeln!(&mut self.output, "  unreachable")?;
            self.terminated = true;
        }
        Ok(())
    }

    /// Lower a `while` loop: the `while_cond`/`while_body`/`while_end`
    /// label triple, an unconditional branch into the condition block,
    /// and a back-edge from the body's fall-through.
    fn lower_while(&mut self, cond: &Expr, body: &Block, line: usize) -> Result<(), CodeGenError> {
        let cond_label = self.local_name("while_cond");
        let body_label = self.local_name("while_body");
        let end_label = self.local_name("while_end");

        writeln!(&mut self.output, "  br label %{}", cond_label)?;

        self.emit_label(&cond_label)?;
        let cond_repr = self.lower_condition(cond, "while", line)?;
        writeln!(
            &mut self.output,
            "  br i1 {}, label %{}, label %{}",
            cond_repr, body_label, end_label
        )?;

        self.emit_label(&body_label)?;
        self.loop_stack.push(LoopLabels {
            cond: cond_label.clone(),
            end: end_label.clone(),
        });
        self.lower_block(body)?;
        self.loop_stack.pop();
        if !self.terminated {
            writeln!(&mut self.output, "  br label %{}", cond_label)?;
        }

        self.emit_label(&end_label)?;
        Ok(())
    }

    fn lower_return(&mut self, value: Option<&Expr>, line: usize) -> Result<(), CodeGenError> {
        match value {
            Some(expr) => {
                let expected = self.current_return;
                let rvalue = self.lower_expr(expr, Some(expected))?;
                if rvalue.ty != expected && rvalue.ty != Ty::Error && expected != Ty::Error {
                    self.error(
                        line,
                        format!(
                            "type mismatch: returning a value of type '{}' from a function returning '{}'",
                            rvalue.ty, expected
                        ),
                    );
                }
                let ir_type = self.ir_ty(expected);
                writeln!(&mut self.output, "  ret {} {}", ir_type, rvalue.repr)?;
            }
            None => {
                if self.current_return != Ty::Unit {
                    self.error(
                        line,
                        format!(
                            "type mismatch: 'return' without a value in a function returning '{}'",
                            self.current_return
                        ),
                    );
                }
                writeln!(&mut self.output, "  ret %unit zeroinitializer")?;
            }
        }
        self.terminated = true;
        Ok(())
    }
}

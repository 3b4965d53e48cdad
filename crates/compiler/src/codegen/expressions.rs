//! Expression lowering
//!
//! Every lowering returns an SSA value paired with its static type.
//! Semantic errors report a diagnostic and return a poison value so the
//! rest of the unit keeps lowering; the poison type silences follow-on
//! complaints about the same subtree.

use super::constants::{render_float, render_int};
use super::{CodeGen, CodeGenError, RValue};
use crate::ast::{Expr, UnaryOp};
use crate::types::{arith_instr, cast_kind, cmp_instr, BinOp, Ty};
use std::fmt::Write as _;

/// Which literal family an untyped literal tree belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LitFamily {
    Int,
    Float,
}

/// Whether `expr` is a bare literal tree whose type is still open to
/// promotion: literals, negated literals, and operator combinations of
/// same-family literals. Anything typed (variables, calls, casts)
/// anchors the type instead.
fn literal_family(expr: &Expr) -> Option<LitFamily> {
    match expr {
        Expr::IntLit { .. } => Some(LitFamily::Int),
        Expr::FloatLit { .. } => Some(LitFamily::Float),
        Expr::Unary { op: UnaryOp::Neg, operand, .. } => literal_family(operand),
        Expr::Binary { op, lhs, rhs, .. } if !op.is_comparison() && !op.is_logical() => {
            match (literal_family(lhs), literal_family(rhs)) {
                (Some(a), Some(b)) if a == b => Some(a),
                _ => None,
            }
        }
        Expr::Ternary { then_val, else_val, .. } => {
            match (literal_family(then_val), literal_family(else_val)) {
                (Some(a), Some(b)) if a == b => Some(a),
                _ => None,
            }
        }
        _ => None,
    }
}

impl CodeGen {
    /// Lower `expr` to an SSA value. `hint` is the type the surrounding
    /// context requires, used only to promote untyped literals; typed
    /// expressions ignore it and the caller checks the result.
    pub(super) fn lower_expr(
        &mut self,
        expr: &Expr,
        hint: Option<Ty>,
    ) -> Result<RValue, CodeGenError> {
        match expr {
            Expr::IntLit { value, span } => {
                let ty = match hint {
                    None => Ty::I32,
                    Some(t) if t.is_integer() => t,
                    Some(Ty::Error) => return Ok(RValue::poison()),
                    Some(other) => {
                        self.error(
                            span.line,
                            format!(
                                "type mismatch: expected '{}', found an integer literal",
                                other
                            ),
                        );
                        return Ok(RValue::poison());
                    }
                };
                let bits = ty.bit_width(self.ptr_bits()).unwrap_or(64);
                Ok(RValue::new(render_int(*value, bits), ty))
            }

            Expr::FloatLit { value, span } => {
                let ty = match hint {
                    None => Ty::F64,
                    Some(t) if t.is_float() => t,
                    Some(Ty::Error) => return Ok(RValue::poison()),
                    Some(other) => {
                        self.error(
                            span.line,
                            format!(
                                "type mismatch: expected '{}', found a float literal",
                                other
                            ),
                        );
                        return Ok(RValue::poison());
                    }
                };
                Ok(RValue::new(render_float(*value, ty == Ty::F32), ty))
            }

            Expr::BoolLit { value, .. } => {
                Ok(RValue::new(if *value { "true" } else { "false" }, Ty::Bool))
            }

            Expr::CharLit { value, .. } => {
                Ok(RValue::new(render_int(*value as i128, 32), Ty::Char))
            }

            Expr::StringLit { value, .. } => {
                let global = self.get_string_global(value)?;
                Ok(RValue::new(global, Ty::Str))
            }

            Expr::VarRef { name, span } => {
                let Some(binding) = self.scopes.lookup(name).cloned() else {
                    self.error(span.line, format!("Variable '{}' is not defined", name));
                    return Ok(RValue::poison());
                };
                if binding.ty == Ty::Error {
                    return Ok(RValue::poison());
                }
                let ir_type = self.ir_ty(binding.ty);
                let loaded = self.local_name(&format!("{}_load", binding.slot));
                writeln!(
                    &mut self.output,
                    "  %{} = load {}, ptr %{}",
                    loaded, ir_type, binding.slot
                )?;
                Ok(RValue::new(format!("%{}", loaded), binding.ty))
            }

            Expr::Unary { op, operand, span } => self.lower_unary(*op, operand, hint, span.line),

            Expr::Binary { op, lhs, rhs, span } => {
                if op.is_logical() {
                    self.lower_short_circuit(*op, lhs, rhs, span.line)
                } else {
                    self.lower_binary(*op, lhs, rhs, hint, span.line)
                }
            }

            Expr::Cast { expr, target, span } => self.lower_cast(expr, *target, span.line),

            Expr::Call { name, args, span } => self.lower_call(name, args, span.line),

            Expr::Ternary {
                then_val,
                cond,
                else_val,
                span,
            } => self.lower_ternary(then_val, cond, else_val, hint, span.line),
        }
    }

    fn lower_unary(
        &mut self,
        op: UnaryOp,
        operand: &Expr,
        hint: Option<Ty>,
        line: usize,
    ) -> Result<RValue, CodeGenError> {
        match op {
            UnaryOp::Neg => {
                let value = self.lower_expr(operand, hint)?;
                if value.ty == Ty::Error {
                    return Ok(RValue::poison());
                }
                let ir_type = self.ir_ty(value.ty);
                if value.ty.is_integer() {
                    let temp = self.fresh_temp();
                    writeln!(
                        &mut self.output,
                        "  %{} = sub {} 0, {}",
                        temp, ir_type, value.repr
                    )?;
                    return Ok(RValue::new(format!("%{}", temp), value.ty));
                }
                if value.ty.is_float() {
                    let temp = self.fresh_temp();
                    writeln!(
                        &mut self.output,
                        "  %{} = fneg {} {}",
                        temp, ir_type, value.repr
                    )?;
                    return Ok(RValue::new(format!("%{}", temp), value.ty));
                }
                self.error(
                    line,
                    format!("Operator '-' cannot be applied to type '{}'", value.ty),
                );
                Ok(RValue::poison())
            }
            UnaryOp::Not => {
                let value = self.lower_expr(operand, None)?;
                if value.ty == Ty::Error {
                    return Ok(RValue::poison());
                }
                if value.ty != Ty::Bool {
                    self.error(
                        line,
                        format!("Operand of 'not' must be a boolean, found '{}'", value.ty),
                    );
                    return Ok(RValue::poison());
                }
                let temp = self.fresh_temp();
                writeln!(&mut self.output, "  %{} = xor i1 {}, true", temp, value.repr)?;
                Ok(RValue::new(format!("%{}", temp), Ty::Bool))
            }
        }
    }

    /// Lower an arithmetic or comparison operator. Both operands must
    /// share a type after literal promotion: a bare literal takes the
    /// other operand's type; two literals take the context type or the
    /// family default.
    fn lower_binary(
        &mut self,
        op: BinOp,
        lhs: &Expr,
        rhs: &Expr,
        hint: Option<Ty>,
        line: usize,
    ) -> Result<RValue, CodeGenError> {
        // A comparison's context type describes its bool result, not
        // its operands.
        let operand_hint = if op.is_comparison() { None } else { hint };

        // Literals emit no instructions, so lowering the anchoring
        // operand first never reorders any IR.
        let (lhs_val, rhs_val) =
            if literal_family(lhs).is_some() && literal_family(rhs).is_none() {
                let rhs_val = self.lower_expr(rhs, operand_hint)?;
                let lhs_val = self.lower_expr(lhs, Some(rhs_val.ty))?;
                (lhs_val, rhs_val)
            } else {
                let lhs_val = self.lower_expr(lhs, operand_hint)?;
                let rhs_val = self.lower_expr(rhs, Some(lhs_val.ty))?;
                (lhs_val, rhs_val)
            };

        if lhs_val.ty == Ty::Error || rhs_val.ty == Ty::Error {
            return Ok(RValue::poison());
        }
        if lhs_val.ty != rhs_val.ty {
            self.error(
                line,
                format!(
                    "Cannot determine result type: incompatible types '{}' and '{}'",
                    lhs_val.ty, rhs_val.ty
                ),
            );
            return Ok(RValue::poison());
        }
        let ty = lhs_val.ty;

        if op.is_comparison() {
            let Some((mnemonic, pred)) = cmp_instr(op, ty) else {
                self.error(
                    line,
                    format!(
                        "Operator '{}' cannot be applied to operands of type '{}'",
                        op.symbol(),
                        ty
                    ),
                );
                return Ok(RValue::poison());
            };
            let ir_type = self.ir_ty(ty);
            let temp = self.fresh_temp();
            writeln!(
                &mut self.output,
                "  %{} = {} {} {} {}, {}",
                temp, mnemonic, pred, ir_type, lhs_val.repr, rhs_val.repr
            )?;
            return Ok(RValue::new(format!("%{}", temp), Ty::Bool));
        }

        let Some(instr) = arith_instr(op, ty) else {
            let message = if op == BinOp::FloatDiv && ty.is_integer() {
                format!(
                    "Operator '/' is not defined for integer operands of type '{}'; use 'div'",
                    ty
                )
            } else if matches!(op, BinOp::IntDiv | BinOp::Rem) && ty.is_float() {
                format!(
                    "'{}' is only defined for integer operands, found '{}'; use '/'",
                    op.symbol(),
                    ty
                )
            } else {
                format!(
                    "Operator '{}' cannot be applied to operands of type '{}'",
                    op.symbol(),
                    ty
                )
            };
            self.error(line, message);
            return Ok(RValue::poison());
        };
        let ir_type = self.ir_ty(ty);
        let temp = self.fresh_temp();
        writeln!(
            &mut self.output,
            "  %{} = {} {} {}, {}",
            temp, instr, ir_type, lhs_val.repr, rhs_val.repr
        )?;
        Ok(RValue::new(format!("%{}", temp), ty))
    }

    /// Lower `and`/`or` with explicit blocks and a phi at the merge so
    /// the right-hand side only evaluates when the left does not decide
    /// the result.
    fn lower_short_circuit(
        &mut self,
        op: BinOp,
        lhs: &Expr,
        rhs: &Expr,
        line: usize,
    ) -> Result<RValue, CodeGenError> {
        let lhs_val = self.lower_expr(lhs, None)?;
        if lhs_val.ty != Ty::Bool && lhs_val.ty != Ty::Error {
            self.error(
                line,
                format!(
                    "Left operand of '{}' must be a boolean, found '{}'",
                    op.symbol(),
                    lhs_val.ty
                ),
            );
        }

        let (rhs_base, end_base, short_value) = match op {
            BinOp::And => ("and_rhs", "and_end", "false"),
            BinOp::Or => ("or_rhs", "or_end", "true"),
            _ => {
                return Err(CodeGenError::Logic(
                    "short-circuit lowering called on a non-logical operator".to_string(),
                ));
            }
        };
        let rhs_label = self.local_name(rhs_base);
        let end_label = self.local_name(end_base);

        match op {
            BinOp::And => writeln!(
                &mut self.output,
                "  br i1 {}, label %{}, label %{}",
                lhs_val.repr, rhs_label, end_label
            )?,
            _ => writeln!(
                &mut self.output,
                "  br i1 {}, label %{}, label %{}",
                lhs_val.repr, end_label, rhs_label
            )?,
        }
        let short_pred = self.current_block.clone();

        self.emit_label(&rhs_label)?;
        let rhs_val = self.lower_expr(rhs, None)?;
        if rhs_val.ty != Ty::Bool && rhs_val.ty != Ty::Error {
            self.error(
                line,
                format!(
                    "Right operand of '{}' must be a boolean, found '{}'",
                    op.symbol(),
                    rhs_val.ty
                ),
            );
        }
        writeln!(&mut self.output, "  br label %{}", end_label)?;
        let rhs_pred = self.current_block.clone();

        self.emit_label(&end_label)?;
        let temp = self.fresh_temp();
        writeln!(
            &mut self.output,
            "  %{} = phi i1 [ {}, %{} ], [ {}, %{} ]",
            temp, short_value, short_pred, rhs_val.repr, rhs_pred
        )?;
        Ok(RValue::new(format!("%{}", temp), Ty::Bool))
    }

    fn lower_cast(
        &mut self,
        operand: &Expr,
        target: Ty,
        line: usize,
    ) -> Result<RValue, CodeGenError> {
        let value = self.lower_expr(operand, None)?;
        if value.ty == Ty::Error {
            return Ok(RValue::poison());
        }
        self.emit_conversion(value, target, line)
    }

    /// Shared by `as` casts and constructor-like conversions: pick the
    /// instruction from the (from, to) pair and emit it, or report the
    /// conversion as illegal.
    pub(super) fn emit_conversion(
        &mut self,
        value: RValue,
        target: Ty,
        line: usize,
    ) -> Result<RValue, CodeGenError> {
        let Some(kind) = cast_kind(value.ty, target, self.ptr_bits()) else {
            self.error(
                line,
                format!("Cannot convert from {} to {}", value.ty, target),
            );
            return Ok(RValue::poison());
        };
        match kind.instr() {
            // Same width, new signedness: no instruction, just a new
            // static type for later op selection.
            None => Ok(RValue::new(value.repr, target)),
            Some(instr) => {
                let from_type = self.ir_ty(value.ty);
                let to_type = self.ir_ty(target);
                let temp = self.fresh_temp();
                writeln!(
                    &mut self.output,
                    "  %{} = {} {} {} to {}",
                    temp, instr, from_type, value.repr, to_type
                )?;
                Ok(RValue::new(format!("%{}", temp), target))
            }
        }
    }

    fn lower_call(
        &mut self,
        name: &str,
        args: &[Expr],
        line: usize,
    ) -> Result<RValue, CodeGenError> {
        // Constructor-like conversions: a call whose callee is a type
        // name. `bool(x)` and `String(x)` are always illegal; numeric
        // type names behave as the equivalent `as` cast.
        if let Some(target) = Ty::from_name(name) {
            if args.len() != 1 {
                self.error(
                    line,
                    format!("Conversion to '{}' expects exactly one argument", name),
                );
                return Ok(RValue::poison());
            }
            let value = self.lower_expr(&args[0], None)?;
            if value.ty == Ty::Error {
                return Ok(RValue::poison());
            }
            if matches!(target, Ty::Bool | Ty::Str) {
                self.error(
                    line,
                    format!("Cannot convert from {} to {}", value.ty, target),
                );
                return Ok(RValue::poison());
            }
            return self.emit_conversion(value, target, line);
        }

        use crate::symbols::Resolution;
        let record = match self.symbols.resolve(&self.current_file, name) {
            Resolution::Found(record) => record,
            Resolution::PrivateElsewhere(_) => {
                self.error(
                    line,
                    format!(
                        "Function '{}' with fileprivate visibility is not accessible",
                        name
                    ),
                );
                for arg in args {
                    self.lower_expr(arg, None)?;
                }
                return Ok(RValue::poison());
            }
            Resolution::NotFound => {
                self.error(line, format!("Function '{}' is not defined", name));
                for arg in args {
                    self.lower_expr(arg, None)?;
                }
                return Ok(RValue::poison());
            }
        };

        if args.len() != record.params.len() {
            self.error(
                line,
                format!(
                    "Function '{}' expects {} argument(s), but {} were given",
                    name,
                    record.params.len(),
                    args.len()
                ),
            );
            return Ok(RValue::poison());
        }

        // Arguments lower left to right, each promoted to the declared
        // parameter type.
        let mut lowered = Vec::with_capacity(args.len());
        for (index, (arg, (param_name, param_ty))) in
            args.iter().zip(record.params.iter()).enumerate()
        {
            let value = self.lower_expr(arg, Some(*param_ty))?;
            if value.ty != *param_ty && value.ty != Ty::Error {
                self.error(
                    line,
                    format!(
                        "type mismatch: argument {} ('{}') of '{}' expects '{}', found '{}'",
                        index + 1,
                        param_name,
                        name,
                        param_ty,
                        value.ty
                    ),
                );
            }
            lowered.push((value, *param_ty));
        }

        let rendered_args = lowered
            .iter()
            .map(|(value, param_ty)| format!("{} {}", self.ir_ty(*param_ty), value.repr))
            .collect::<Vec<_>>()
            .join(", ");
        let return_type = self.ir_ty(record.return_ty);
        let temp = self.fresh_temp();
        writeln!(
            &mut self.output,
            "  %{} = call {} @{}({})",
            temp, return_type, record.symbol, rendered_args
        )?;
        Ok(RValue::new(format!("%{}", temp), record.return_ty))
    }

    /// Lower `then_val if cond else else_val` to a `select`. The result
    /// type is the common type of the arms after literal promotion.
    fn lower_ternary(
        &mut self,
        then_val: &Expr,
        cond: &Expr,
        else_val: &Expr,
        hint: Option<Ty>,
        line: usize,
    ) -> Result<RValue, CodeGenError> {
        let cond_val = self.lower_expr(cond, None)?;
        if cond_val.ty != Ty::Bool && cond_val.ty != Ty::Error {
            self.error(
                line,
                format!(
                    "The condition of a ternary expression must be a boolean, found '{}'",
                    cond_val.ty
                ),
            );
        }

        let (then_rv, else_rv) =
            if literal_family(then_val).is_some() && literal_family(else_val).is_none() {
                let else_rv = self.lower_expr(else_val, hint)?;
                let then_rv = self.lower_expr(then_val, Some(else_rv.ty))?;
                (then_rv, else_rv)
            } else {
                let then_rv = self.lower_expr(then_val, hint)?;
                let else_rv = self.lower_expr(else_val, Some(then_rv.ty))?;
                (then_rv, else_rv)
            };

        if then_rv.ty == Ty::Error || else_rv.ty == Ty::Error {
            return Ok(RValue::poison());
        }
        if then_rv.ty != else_rv.ty {
            self.error(
                line,
                format!(
                    "Cannot determine result type: incompatible types '{}' and '{}'",
                    then_rv.ty, else_rv.ty
                ),
            );
            return Ok(RValue::poison());
        }

        let ty = then_rv.ty;
        let ir_type = self.ir_ty(ty);
        let selected = self.local_name("ternary");
        writeln!(
            &mut self.output,
            "  %{} = select i1 {}, {} {}, {} {}",
            selected, cond_val.repr, ir_type, then_rv.repr, ir_type, else_rv.repr
        )?;
        Ok(RValue::new(format!("%{}", selected), ty))
    }
}

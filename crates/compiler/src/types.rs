//! Type system for Reso
//!
//! A closed set of primitive types plus the unit type. Signedness is a
//! flag on the integer constructor rather than a separate variant, which
//! keeps the `as`-conversion matrix compact. Pointer-sized integers carry
//! a width variant that resolves against the target pointer width.

use std::fmt;

/// Bit width of an integer type. `Ptr` resolves to the target pointer
/// width (32 or 64) at emission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
    Ptr,
}

/// A Reso type.
///
/// `Error` is an internal sentinel produced when lowering has already
/// reported a diagnostic; it silences follow-on errors and never reaches
/// emitted IR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ty {
    Int { width: IntWidth, signed: bool },
    F32,
    F64,
    Bool,
    Char,
    Str,
    Unit,
    Error,
}

/// Target description consumed by the type system and the IR emitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub triple: String,
    pub datalayout: String,
    /// Native pointer width in bits; `isize`/`usize` resolve to this.
    pub ptr_bits: u32,
}

impl Ty {
    pub const I8: Ty = Ty::Int { width: IntWidth::W8, signed: true };
    pub const I16: Ty = Ty::Int { width: IntWidth::W16, signed: true };
    pub const I32: Ty = Ty::Int { width: IntWidth::W32, signed: true };
    pub const I64: Ty = Ty::Int { width: IntWidth::W64, signed: true };
    pub const U8: Ty = Ty::Int { width: IntWidth::W8, signed: false };
    pub const U16: Ty = Ty::Int { width: IntWidth::W16, signed: false };
    pub const U32: Ty = Ty::Int { width: IntWidth::W32, signed: false };
    pub const U64: Ty = Ty::Int { width: IntWidth::W64, signed: false };
    pub const ISIZE: Ty = Ty::Int { width: IntWidth::Ptr, signed: true };
    pub const USIZE: Ty = Ty::Int { width: IntWidth::Ptr, signed: false };

    /// Resolve a surface type name. Type names are plain identifiers, not
    /// keywords, so this is also consulted for constructor-like calls.
    pub fn from_name(name: &str) -> Option<Ty> {
        Some(match name {
            "i8" => Ty::I8,
            "i16" => Ty::I16,
            "i32" => Ty::I32,
            "i64" => Ty::I64,
            "u8" => Ty::U8,
            "u16" => Ty::U16,
            "u32" => Ty::U32,
            "u64" => Ty::U64,
            "isize" => Ty::ISIZE,
            "usize" => Ty::USIZE,
            "f32" => Ty::F32,
            "f64" => Ty::F64,
            "bool" => Ty::Bool,
            "char" => Ty::Char,
            "String" => Ty::Str,
            _ => return None,
        })
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Ty::Int { .. })
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Ty::F32 | Ty::F64)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Signedness used for instruction selection. `char` compares and
    /// converts as an unsigned 32-bit integer.
    pub fn is_signed(&self) -> bool {
        match self {
            Ty::Int { signed, .. } => *signed,
            _ => false,
        }
    }

    /// Bit width of an integer-like type (`char` included) on the target.
    pub fn bit_width(&self, ptr_bits: u32) -> Option<u32> {
        match self {
            Ty::Int { width, .. } => Some(match width {
                IntWidth::W8 => 8,
                IntWidth::W16 => 16,
                IntWidth::W32 => 32,
                IntWidth::W64 => 64,
                IntWidth::Ptr => ptr_bits,
            }),
            Ty::Char => Some(32),
            _ => None,
        }
    }

    /// The LLVM IR spelling of this type.
    pub fn ir_type(&self, ptr_bits: u32) -> &'static str {
        match self {
            Ty::Int { .. } | Ty::Char => match self.bit_width(ptr_bits) {
                Some(8) => "i8",
                Some(16) => "i16",
                Some(32) => "i32",
                _ => "i64",
            },
            Ty::F32 => "float",
            Ty::F64 => "double",
            Ty::Bool => "i1",
            Ty::Str => "ptr",
            Ty::Unit => "%unit",
            Ty::Error => "i32",
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Ty::Int { width, signed } => {
                let prefix = if *signed { "i" } else { "u" };
                let suffix = match width {
                    IntWidth::W8 => "8",
                    IntWidth::W16 => "16",
                    IntWidth::W32 => "32",
                    IntWidth::W64 => "64",
                    IntWidth::Ptr => "size",
                };
                return write!(f, "{}{}", prefix, suffix);
            }
            Ty::F32 => "f32",
            Ty::F64 => "f64",
            Ty::Bool => "bool",
            Ty::Char => "char",
            Ty::Str => "String",
            Ty::Unit => "()",
            Ty::Error => "<error>",
        };
        write!(f, "{}", name)
    }
}

/// The LLVM instruction realising an explicit `as` conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastKind {
    /// Same bit pattern; only the static type changes.
    NoOp,
    Sext,
    Zext,
    Trunc,
    SiToFp,
    UiToFp,
    FpToSi,
    FpToUi,
    FpExt,
    FpTrunc,
}

impl CastKind {
    /// IR mnemonic, or `None` for conversions that emit nothing.
    pub fn instr(&self) -> Option<&'static str> {
        match self {
            CastKind::NoOp => None,
            CastKind::Sext => Some("sext"),
            CastKind::Zext => Some("zext"),
            CastKind::Trunc => Some("trunc"),
            CastKind::SiToFp => Some("sitofp"),
            CastKind::UiToFp => Some("uitofp"),
            CastKind::FpToSi => Some("fptosi"),
            CastKind::FpToUi => Some("fptoui"),
            CastKind::FpExt => Some("fpext"),
            CastKind::FpTrunc => Some("fptrunc"),
        }
    }
}

/// Decide the instruction for `from as to`, or `None` when the conversion
/// is illegal (anything involving `bool`, `String`, or `()` with another
/// type). The pair alone determines the instruction.
pub fn cast_kind(from: Ty, to: Ty, ptr_bits: u32) -> Option<CastKind> {
    if from == to {
        return Some(CastKind::NoOp);
    }
    if matches!(from, Ty::Error) || matches!(to, Ty::Error) {
        return Some(CastKind::NoOp);
    }
    if matches!(from, Ty::Bool | Ty::Str | Ty::Unit) || matches!(to, Ty::Bool | Ty::Str | Ty::Unit)
    {
        return None;
    }

    // char converts as an unsigned 32-bit integer
    let int_info = |ty: Ty| -> Option<(u32, bool)> {
        match ty {
            Ty::Int { signed, .. } => Some((ty.bit_width(ptr_bits).unwrap_or(64), signed)),
            Ty::Char => Some((32, false)),
            _ => None,
        }
    };

    match (int_info(from), int_info(to)) {
        (Some((fw, fsigned)), Some((tw, _))) => Some(if tw > fw {
            if fsigned { CastKind::Sext } else { CastKind::Zext }
        } else if tw < fw {
            CastKind::Trunc
        } else {
            CastKind::NoOp
        }),
        (Some((_, fsigned)), None) if to.is_float() => {
            Some(if fsigned { CastKind::SiToFp } else { CastKind::UiToFp })
        }
        (None, Some((_, tsigned))) if from.is_float() => {
            Some(if tsigned { CastKind::FpToSi } else { CastKind::FpToUi })
        }
        (None, None) if from.is_float() && to.is_float() => Some(match (from, to) {
            (Ty::F32, Ty::F64) => CastKind::FpExt,
            (Ty::F64, Ty::F32) => CastKind::FpTrunc,
            _ => CastKind::NoOp,
        }),
        _ => None,
    }
}

/// Binary operators of the surface language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    /// `/`: floats only; integers use `div`
    FloatDiv,
    /// `div` keyword, integers only
    IntDiv,
    /// `rem` keyword, integers only
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::FloatDiv => "/",
            BinOp::IntDiv => "div",
            BinOp::Rem => "rem",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "and",
            BinOp::Or => "or",
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }
}

/// Arithmetic instruction for `op` on operands of type `ty`, or `None`
/// when the operator is not defined for that type.
pub fn arith_instr(op: BinOp, ty: Ty) -> Option<&'static str> {
    if ty.is_integer() {
        return match op {
            BinOp::Add => Some("add"),
            BinOp::Sub => Some("sub"),
            BinOp::Mul => Some("mul"),
            BinOp::IntDiv => Some(if ty.is_signed() { "sdiv" } else { "udiv" }),
            BinOp::Rem => Some(if ty.is_signed() { "srem" } else { "urem" }),
            _ => None,
        };
    }
    if ty.is_float() {
        return match op {
            BinOp::Add => Some("fadd"),
            BinOp::Sub => Some("fsub"),
            BinOp::Mul => Some("fmul"),
            BinOp::FloatDiv => Some("fdiv"),
            _ => None,
        };
    }
    None
}

/// Comparison instruction for `op` on operands of type `ty`, as an
/// `(icmp|fcmp, predicate)` pair. `None` when the comparison is not
/// defined (e.g. ordering on `bool`).
pub fn cmp_instr(op: BinOp, ty: Ty) -> Option<(&'static str, &'static str)> {
    if ty.is_float() {
        let pred = match op {
            BinOp::Eq => "oeq",
            BinOp::Ne => "one",
            BinOp::Lt => "olt",
            BinOp::Le => "ole",
            BinOp::Gt => "ogt",
            BinOp::Ge => "oge",
            _ => return None,
        };
        return Some(("fcmp", pred));
    }
    if ty.is_integer() || ty == Ty::Char || ty == Ty::Bool {
        if ty == Ty::Bool && !matches!(op, BinOp::Eq | BinOp::Ne) {
            return None;
        }
        let signed = ty.is_signed();
        let pred = match op {
            BinOp::Eq => "eq",
            BinOp::Ne => "ne",
            BinOp::Lt => {
                if signed { "slt" } else { "ult" }
            }
            BinOp::Le => {
                if signed { "sle" } else { "ule" }
            }
            BinOp::Gt => {
                if signed { "sgt" } else { "ugt" }
            }
            BinOp::Ge => {
                if signed { "sge" } else { "uge" }
            }
            _ => return None,
        };
        return Some(("icmp", pred));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_names_round_trip() {
        for name in [
            "i8", "i16", "i32", "i64", "u8", "u16", "u32", "u64", "isize", "usize", "f32", "f64",
            "bool", "char", "String",
        ] {
            let ty = Ty::from_name(name).unwrap();
            assert_eq!(ty.to_string(), name);
        }
        assert!(Ty::from_name("int").is_none());
    }

    #[test]
    fn test_ir_types() {
        assert_eq!(Ty::U8.ir_type(64), "i8");
        assert_eq!(Ty::I64.ir_type(64), "i64");
        assert_eq!(Ty::Char.ir_type(64), "i32");
        assert_eq!(Ty::Bool.ir_type(64), "i1");
        assert_eq!(Ty::Unit.ir_type(64), "%unit");
        assert_eq!(Ty::ISIZE.ir_type(64), "i64");
        assert_eq!(Ty::ISIZE.ir_type(32), "i32");
    }

    #[test]
    fn test_widening_casts_follow_source_signedness() {
        assert_eq!(cast_kind(Ty::I8, Ty::I32, 64), Some(CastKind::Sext));
        assert_eq!(cast_kind(Ty::U8, Ty::U16, 64), Some(CastKind::Zext));
        assert_eq!(cast_kind(Ty::U8, Ty::I32, 64), Some(CastKind::Zext));
        assert_eq!(cast_kind(Ty::I32, Ty::I8, 64), Some(CastKind::Trunc));
    }

    #[test]
    fn test_same_width_reinterpret_is_noop() {
        assert_eq!(cast_kind(Ty::I32, Ty::U32, 64), Some(CastKind::NoOp));
        assert_eq!(cast_kind(Ty::U64, Ty::I64, 64), Some(CastKind::NoOp));
        assert_eq!(cast_kind(Ty::ISIZE, Ty::I64, 64), Some(CastKind::NoOp));
        assert_eq!(cast_kind(Ty::ISIZE, Ty::I64, 32), Some(CastKind::Sext));
    }

    #[test]
    fn test_float_int_casts() {
        assert_eq!(cast_kind(Ty::I32, Ty::F64, 64), Some(CastKind::SiToFp));
        assert_eq!(cast_kind(Ty::U32, Ty::F32, 64), Some(CastKind::UiToFp));
        assert_eq!(cast_kind(Ty::F64, Ty::I32, 64), Some(CastKind::FpToSi));
        assert_eq!(cast_kind(Ty::F32, Ty::U64, 64), Some(CastKind::FpToUi));
        assert_eq!(cast_kind(Ty::F32, Ty::F64, 64), Some(CastKind::FpExt));
        assert_eq!(cast_kind(Ty::F64, Ty::F32, 64), Some(CastKind::FpTrunc));
    }

    #[test]
    fn test_char_converts_as_unsigned_i32() {
        assert_eq!(cast_kind(Ty::Char, Ty::I64, 64), Some(CastKind::Zext));
        assert_eq!(cast_kind(Ty::Char, Ty::U8, 64), Some(CastKind::Trunc));
        assert_eq!(cast_kind(Ty::I32, Ty::Char, 64), Some(CastKind::NoOp));
        assert_eq!(cast_kind(Ty::Char, Ty::F64, 64), Some(CastKind::UiToFp));
        assert_eq!(cast_kind(Ty::F32, Ty::Char, 64), Some(CastKind::FpToUi));
    }

    #[test]
    fn test_illegal_casts() {
        assert_eq!(cast_kind(Ty::Bool, Ty::I32, 64), None);
        assert_eq!(cast_kind(Ty::I32, Ty::Bool, 64), None);
        assert_eq!(cast_kind(Ty::Str, Ty::I64, 64), None);
        assert_eq!(cast_kind(Ty::Unit, Ty::I32, 64), None);
        assert_eq!(cast_kind(Ty::F64, Ty::Str, 64), None);
    }

    #[test]
    fn test_arith_instr_selection() {
        assert_eq!(arith_instr(BinOp::IntDiv, Ty::I32), Some("sdiv"));
        assert_eq!(arith_instr(BinOp::IntDiv, Ty::U32), Some("udiv"));
        assert_eq!(arith_instr(BinOp::Rem, Ty::U8), Some("urem"));
        assert_eq!(arith_instr(BinOp::FloatDiv, Ty::F64), Some("fdiv"));
        // `/` is float-only, `div`/`rem` are integer-only
        assert_eq!(arith_instr(BinOp::FloatDiv, Ty::I32), None);
        assert_eq!(arith_instr(BinOp::IntDiv, Ty::F64), None);
        assert_eq!(arith_instr(BinOp::Add, Ty::Bool), None);
    }

    #[test]
    fn test_cmp_instr_selection() {
        assert_eq!(cmp_instr(BinOp::Lt, Ty::I32), Some(("icmp", "slt")));
        assert_eq!(cmp_instr(BinOp::Gt, Ty::U16), Some(("icmp", "ugt")));
        assert_eq!(cmp_instr(BinOp::Le, Ty::Char), Some(("icmp", "ule")));
        assert_eq!(cmp_instr(BinOp::Ne, Ty::F32), Some(("fcmp", "one")));
        assert_eq!(cmp_instr(BinOp::Eq, Ty::Bool), Some(("icmp", "eq")));
        assert_eq!(cmp_instr(BinOp::Lt, Ty::Bool), None);
    }
}

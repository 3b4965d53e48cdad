//! LLVM IR code generation
//!
//! This module lowers a collected Reso program to LLVM IR as text.
//!
//! # Key conventions
//!
//! - **Slots**: every user variable gets an `alloca` named after it;
//!   shadowing and name reuse across scopes are resolved by suffixing
//!   (`x`, `x2`, ...). Loads are named `<slot>_load` the same way.
//! - **Labels**: control flow uses fixed base names (`while_cond`,
//!   `while_body`, `while_end`, `if_then`, `if_else`, `if_end`) with the
//!   same suffixing scheme, so the first loop of a function reads
//!   exactly as the bare triple.
//! - **Unit**: effect-only functions return the named `%unit` empty
//!   struct. A unit value is first-class and may flow through `select`.
//! - **Errors**: semantic problems accumulate in the diagnostics bag and
//!   lowering continues with poison values; a unit with any error
//!   produces no IR at all.
//!
//! # Module structure
//!
//! - `state.rs`: the CodeGen struct, name allocators, string globals
//! - `program.rs`: module header and per-function entry points
//! - `statements.rs`: statement dispatch, block structure, loops
//! - `expressions.rs`: expression lowering and type decisions
//! - `constants.rs`: integer and float constant rendering
//! - `platform.rs`: host target detection
//! - `error.rs`: generator error type

mod constants;
mod error;
mod expressions;
mod platform;
mod program;
mod state;
mod statements;

pub use error::CodeGenError;
pub use platform::host_triple;
pub use state::CodeGen;

use state::{LoopLabels, RValue};

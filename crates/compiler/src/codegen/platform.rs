//! Target detection for the emitted module header.

use crate::types::Target;

/// Target triple for the host platform.
pub fn host_triple() -> &'static str {
    #[cfg(all(target_os = "macos", target_arch = "aarch64"))]
    {
        "arm64-apple-macosx14.0.0"
    }

    #[cfg(all(target_os = "macos", target_arch = "x86_64"))]
    {
        "x86_64-apple-darwin"
    }

    #[cfg(all(target_os = "linux", target_arch = "x86_64"))]
    {
        "x86_64-unknown-linux-gnu"
    }

    #[cfg(all(target_os = "linux", target_arch = "aarch64"))]
    {
        "aarch64-unknown-linux-gnu"
    }

    #[cfg(not(any(
        all(target_os = "macos", target_arch = "aarch64"),
        all(target_os = "macos", target_arch = "x86_64"),
        all(target_os = "linux", target_arch = "x86_64"),
        all(target_os = "linux", target_arch = "aarch64")
    )))]
    {
        "x86_64-unknown-linux-gnu"
    }
}

fn datalayout_for(triple: &str) -> &'static str {
    if triple.starts_with("arm64-apple") || triple.starts_with("aarch64-apple") {
        "e-m:o-p270:32:32-p271:32:32-p272:64:64-i64:64-i128:128-n32:64-S128"
    } else if triple.starts_with("aarch64") {
        "e-m:e-p270:32:32-p271:32:32-p272:64:64-i8:8:32-i16:16:32-i64:64-i128:128-n32:64-S128"
    } else if triple.starts_with("x86_64-apple") {
        "e-m:o-p270:32:32-p271:32:32-p272:64:64-i64:64-i128:128-f80:128-n8:16:32:64-S128"
    } else if triple.starts_with("i686") {
        "e-m:e-p:32:32-p270:32:32-p271:32:32-p272:64:64-i128:128-f64:32:64-f80:32-n8:16:32-S128"
    } else {
        "e-m:e-p270:32:32-p271:32:32-p272:64:64-i64:64-i128:128-f80:128-n8:16:32:64-S128"
    }
}

impl Target {
    /// The host target; pointer-sized types follow the build machine.
    pub fn host() -> Target {
        let triple = host_triple();
        Target {
            triple: triple.to_string(),
            datalayout: datalayout_for(triple).to_string(),
            ptr_bits: usize::BITS,
        }
    }

    /// A generic target with the given pointer width (32 or 64).
    pub fn with_ptr_bits(ptr_bits: u32) -> Target {
        let triple = if ptr_bits == 32 {
            "i686-unknown-linux-gnu"
        } else {
            "x86_64-unknown-linux-gnu"
        };
        Target {
            triple: triple.to_string(),
            datalayout: datalayout_for(triple).to_string(),
            ptr_bits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_target_is_consistent() {
        let target = Target::host();
        assert!(target.ptr_bits == 32 || target.ptr_bits == 64);
        assert!(!target.triple.is_empty());
        assert!(!target.datalayout.is_empty());
    }

    #[test]
    fn test_explicit_pointer_widths() {
        assert_eq!(Target::with_ptr_bits(32).ptr_bits, 32);
        assert_eq!(Target::with_ptr_bits(64).ptr_bits, 64);
        assert!(Target::with_ptr_bits(32).triple.starts_with("i686"));
    }
}

//! Compiler configuration
//!
//! An optional `reso.toml` next to the sources can name the module and
//! pin the target. Everything defaults to the host toolchain, so most
//! projects need no configuration at all.
//!
//! ```toml
//! module_name = "game"
//!
//! [target]
//! pointer_width = 32
//! ```

use crate::types::Target;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompilerConfig {
    /// Name stamped into the IR module header. Defaults to "reso".
    pub module_name: Option<String>,
    pub target: Option<TargetConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Pointer width in bits (32 or 64); `isize`/`usize` follow it.
    pub pointer_width: Option<u32>,
    /// Explicit target triple for the module header.
    pub triple: Option<String>,
}

impl CompilerConfig {
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
        Self::from_toml(&text)
            .map_err(|e| format!("Invalid config {}: {}", path.display(), e))
    }

    pub fn from_toml(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| e.to_string())
    }

    pub fn module_name(&self) -> &str {
        self.module_name.as_deref().unwrap_or("reso")
    }

    /// Build the target description: host defaults, overridden by the
    /// configured pointer width and triple.
    pub fn resolve_target(&self) -> Result<Target, String> {
        let Some(target_config) = &self.target else {
            return Ok(Target::host());
        };
        let mut target = match target_config.pointer_width {
            None => Target::host(),
            Some(32) => Target::with_ptr_bits(32),
            Some(64) => Target::with_ptr_bits(64),
            Some(other) => {
                return Err(format!(
                    "Unsupported target pointer width {}; expected 32 or 64",
                    other
                ));
            }
        };
        if let Some(triple) = &target_config.triple {
            target.triple = triple.clone();
        }
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_host_target() {
        let config = CompilerConfig::from_toml("").unwrap();
        assert_eq!(config.module_name(), "reso");
        let target = config.resolve_target().unwrap();
        assert_eq!(target, Target::host());
    }

    #[test]
    fn test_pointer_width_override() {
        let config = CompilerConfig::from_toml("[target]\npointer_width = 32\n").unwrap();
        assert_eq!(config.resolve_target().unwrap().ptr_bits, 32);
    }

    #[test]
    fn test_triple_override() {
        let config = CompilerConfig::from_toml(
            "module_name = \"game\"\n[target]\npointer_width = 64\ntriple = \"riscv64-unknown-linux-gnu\"\n",
        )
        .unwrap();
        assert_eq!(config.module_name(), "game");
        let target = config.resolve_target().unwrap();
        assert_eq!(target.triple, "riscv64-unknown-linux-gnu");
        assert_eq!(target.ptr_bits, 64);
    }

    #[test]
    fn test_bad_pointer_width_is_rejected() {
        let config = CompilerConfig::from_toml("[target]\npointer_width = 16\n").unwrap();
        let err = config.resolve_target().unwrap_err();
        assert!(err.contains("expected 32 or 64"));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(CompilerConfig::from_toml("optimise = true\n").is_err());
    }
}

//! Symbol collection for the compilation unit
//!
//! A pre-pass over every file's top-level declarations. Builds two
//! tables: a per-file table holding every function declared in that
//! file, and a global index of `pub` functions. Keeping the tables
//! separate makes the cross-file visibility denial fall out of lookup
//! order instead of needing filtered views.
//!
//! The pass runs to completion before any lowering so that forward
//! calls resolve, within a file and across files.

use crate::ast::{Program, Span, Visibility};
use crate::diagnostics::Diagnostics;
use crate::types::Ty;
use std::collections::{HashMap, HashSet};

/// Everything lowering needs to know about a function, detached from
/// its AST body.
#[derive(Debug, Clone, PartialEq)]
pub struct FnRecord {
    pub name: String,
    /// File that declares the function
    pub file: String,
    pub visibility: Visibility,
    /// Parameter (name, type) pairs in declaration order
    pub params: Vec<(String, Ty)>,
    pub return_ty: Ty,
    /// Module-unique IR symbol assigned at collection time
    pub symbol: String,
    pub span: Span,
}

/// Result of resolving a callee name from a given file.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found(FnRecord),
    /// The only candidate is a fileprivate function in another file.
    PrivateElsewhere(FnRecord),
    NotFound,
}

/// The two symbol tables of the unit.
#[derive(Debug, Default)]
pub struct SymbolTable {
    /// file name -> (function name -> record)
    per_file: HashMap<String, HashMap<String, FnRecord>>,
    /// `pub` functions by name, across all files
    public_index: HashMap<String, FnRecord>,
}

impl SymbolTable {
    /// Collect every top-level declaration of the program.
    ///
    /// Duplicate names within a file and duplicate `pub` names across
    /// files are reported; the first record wins so lowering can keep
    /// going and surface further independent errors.
    pub fn collect(program: &Program, diagnostics: &mut Diagnostics) -> SymbolTable {
        let mut table = SymbolTable::default();
        let mut used_symbols: HashSet<String> = HashSet::new();

        for module in &program.modules {
            let file_table = table.per_file.entry(module.file.clone()).or_default();
            for func in &module.functions {
                if file_table.contains_key(&func.name) {
                    diagnostics.error(
                        &module.file,
                        func.span.line,
                        format!(
                            "Function '{}' is already defined in this file",
                            func.name
                        ),
                    );
                    continue;
                }

                let record = FnRecord {
                    name: func.name.clone(),
                    file: module.file.clone(),
                    visibility: func.visibility,
                    params: func
                        .params
                        .iter()
                        .map(|p| (p.name.clone(), p.ty))
                        .collect(),
                    return_ty: func.return_ty,
                    symbol: allocate_symbol(&func.name, &mut used_symbols),
                    span: func.span,
                };

                if func.visibility == Visibility::Public {
                    if let Some(existing) = table.public_index.get(&func.name) {
                        diagnostics.error(
                            &module.file,
                            func.span.line,
                            format!(
                                "Public function '{}' is already defined in {}",
                                func.name, existing.file
                            ),
                        );
                        // keep the earlier public record
                        file_table.insert(func.name.clone(), record);
                        continue;
                    }
                    table.public_index.insert(func.name.clone(), record.clone());
                }

                file_table.insert(func.name.clone(), record);
            }
        }

        table
    }

    /// Look up the record for a function declared in `file`.
    pub fn in_file(&self, file: &str, name: &str) -> Option<&FnRecord> {
        self.per_file.get(file)?.get(name)
    }

    /// Resolve a callee as seen from `file`: the declaring file's own
    /// table first, then the public index. A fileprivate function in a
    /// different file is reported distinctly so the caller can emit the
    /// visibility denial.
    pub fn resolve(&self, file: &str, name: &str) -> Resolution {
        if let Some(record) = self.in_file(file, name) {
            return Resolution::Found(record.clone());
        }
        if let Some(record) = self.public_index.get(name) {
            return Resolution::Found(record.clone());
        }
        for table in self.per_file.values() {
            if let Some(record) = table.get(name) {
                return Resolution::PrivateElsewhere(record.clone());
            }
        }
        Resolution::NotFound
    }
}

/// Assign a module-unique IR symbol: the surface name when free,
/// otherwise suffixed (`helper`, `helper2`, ...). Fileprivate functions
/// in different files may share a surface name but never an IR symbol.
fn allocate_symbol(name: &str, used: &mut HashSet<String>) -> String {
    if used.insert(name.to_string()) {
        return name.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}{}", name, n);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Block, FnDecl, Module};

    fn func(name: &str, visibility: Visibility) -> FnDecl {
        FnDecl {
            name: name.to_string(),
            visibility,
            params: Vec::new(),
            return_ty: Ty::Unit,
            body: Block::default(),
            span: Span::default(),
        }
    }

    fn unit(modules: Vec<(&str, Vec<FnDecl>)>) -> Program {
        Program {
            modules: modules
                .into_iter()
                .map(|(file, functions)| Module {
                    file: file.to_string(),
                    functions,
                })
                .collect(),
        }
    }

    #[test]
    fn test_private_resolves_in_own_file_only() {
        let program = unit(vec![
            ("a.reso", vec![func("helper", Visibility::FilePrivate)]),
            ("b.reso", vec![func("main", Visibility::FilePrivate)]),
        ]);
        let mut diags = Diagnostics::new();
        let table = SymbolTable::collect(&program, &mut diags);
        assert!(diags.is_empty());

        assert!(matches!(table.resolve("a.reso", "helper"), Resolution::Found(_)));
        assert!(matches!(
            table.resolve("b.reso", "helper"),
            Resolution::PrivateElsewhere(_)
        ));
        assert_eq!(table.resolve("b.reso", "nothing"), Resolution::NotFound);
    }

    #[test]
    fn test_public_resolves_from_any_file() {
        let program = unit(vec![
            ("a.reso", vec![func("shared", Visibility::Public)]),
            ("b.reso", vec![func("main", Visibility::FilePrivate)]),
        ]);
        let mut diags = Diagnostics::new();
        let table = SymbolTable::collect(&program, &mut diags);

        match table.resolve("b.reso", "shared") {
            Resolution::Found(record) => assert_eq!(record.file, "a.reso"),
            other => panic!("Expected Found, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_name_in_file_is_reported() {
        let program = unit(vec![(
            "a.reso",
            vec![
                func("f", Visibility::FilePrivate),
                func("f", Visibility::FilePrivate),
            ],
        )]);
        let mut diags = Diagnostics::new();
        SymbolTable::collect(&program, &mut diags);
        assert!(diags.has_errors());
        let message = &diags.errors().next().unwrap().message;
        assert!(message.contains("'f'"));
        assert!(message.contains("already defined"));
    }

    #[test]
    fn test_duplicate_pub_across_files_is_reported() {
        let program = unit(vec![
            ("a.reso", vec![func("api", Visibility::Public)]),
            ("b.reso", vec![func("api", Visibility::Public)]),
        ]);
        let mut diags = Diagnostics::new();
        SymbolTable::collect(&program, &mut diags);
        assert!(diags.has_errors());
        let message = &diags.errors().next().unwrap().message;
        assert!(message.contains("'api'"));
        assert!(message.contains("already defined"));
    }

    #[test]
    fn test_same_private_name_gets_distinct_ir_symbols() {
        let program = unit(vec![
            ("a.reso", vec![func("helper", Visibility::FilePrivate)]),
            ("b.reso", vec![func("helper", Visibility::FilePrivate)]),
        ]);
        let mut diags = Diagnostics::new();
        let table = SymbolTable::collect(&program, &mut diags);
        assert!(diags.is_empty());

        let a = table.in_file("a.reso", "helper").unwrap();
        let b = table.in_file("b.reso", "helper").unwrap();
        assert_eq!(a.symbol, "helper");
        assert_eq!(b.symbol, "helper2");
    }
}

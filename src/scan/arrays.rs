//! Pre-pass over array literals assigned to variables.
//!
//! `in_array($x, $list)` conditions read much better when the scanner can
//! expand `$list` to its declared contents. The pass is file-global and
//! keeps only string items; when a name is assigned more than once the last
//! assignment in document order wins.

use rustc_hash::FxHashMap;

use crate::ast::{Ast, NodeKind};

/// String contents of every `$name = [...]` assignment in a file.
#[derive(Debug, Default)]
pub struct DeclaredArrays {
    arrays: FxHashMap<String, Vec<String>>,
}

impl DeclaredArrays {
    pub fn collect(ast: &Ast) -> Self {
        let mut arrays = FxHashMap::default();
        for id in ast.ids() {
            let NodeKind::Assignment { target, value } = ast.kind(id) else {
                continue;
            };
            let Some(name) = ast.variable_name(*target) else {
                continue;
            };
            let NodeKind::ArrayLiteral { items } = ast.kind(*value) else {
                continue;
            };
            let values: Vec<String> = items
                .iter()
                .filter_map(|&item| ast.string_value(item))
                .map(str::to_string)
                .collect();
            arrays.insert(name.to_string(), values);
        }
        Self { arrays }
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.arrays.get(name).map(Vec::as_slice)
    }
}

//! Top-level definition table.
//!
//! A [`Module`] maps global names to their definitions (function values in
//! the arena). Globals may be mutually recursive; references are resolved
//! by lookup, never inlined. The table is built once by the front end and
//! is read-only to every pass except the sequential-form converter, which
//! replaces each definition with its converted body exactly once per
//! invocation.
//!
//! Iteration order is insertion order (`IndexMap`), keeping anything that
//! walks all definitions deterministic.

use crate::arena::ExprId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a top-level definition.
///
/// Globals compare by name identity: two references to the same name are
/// references to the same definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlobalId(String);

impl GlobalId {
    /// Create a global name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

impl From<&str> for GlobalId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Mapping from global name to definition.
#[derive(Debug, Default)]
pub struct Module {
    defs: IndexMap<GlobalId, ExprId>,
}

impl Module {
    /// Create an empty module.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a definition.
    pub fn define(&mut self, name: GlobalId, def: ExprId) {
        self.defs.insert(name, def);
    }

    /// Look up a definition by name.
    pub fn def(&self, name: &GlobalId) -> Option<ExprId> {
        self.defs.get(name).copied()
    }

    /// Whether a name is defined.
    pub fn contains(&self, name: &GlobalId) -> bool {
        self.defs.contains_key(name)
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether the module has no definitions.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Iterate definitions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&GlobalId, ExprId)> {
        self.defs.iter().map(|(name, def)| (name, *def))
    }
}

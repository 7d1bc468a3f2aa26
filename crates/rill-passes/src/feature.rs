//! Reachable-feature-set computation.
//!
//! Answers "which construct kinds occur anywhere in this expression" with
//! one visit per distinct node: a visited set keyed by node identity
//! short-circuits shared subgraphs, so the cost is linear in nodes rather
//! than edges. Reaching a compound node a second time additionally records
//! [`Feature::Graph`] — the expression contains structural sharing.
//!
//! The module-aware variant follows global references into their
//! definitions, with a visited-name set so mutually recursive definitions
//! are scanned once each and cycles terminate.

use rill_ir::{ExprArena, ExprId, ExprKind, GlobalId, Module};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A construct kind reachable from an expression root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Feature {
    Var = 0,
    Constant = 1,
    Prim = 2,
    Global = 3,
    Let = 4,
    Function = 5,
    Call = 6,
    If = 7,
    Tuple = 8,
    Projection = 9,
    RefCreate = 10,
    RefRead = 11,
    RefWrite = 12,
    /// A compound node with more than one incoming reference
    Graph = 13,
}

impl Feature {
    /// Printable tag name.
    pub fn name(&self) -> &'static str {
        match self {
            Feature::Var => "var",
            Feature::Constant => "constant",
            Feature::Prim => "prim",
            Feature::Global => "global",
            Feature::Let => "let",
            Feature::Function => "function",
            Feature::Call => "call",
            Feature::If => "if",
            Feature::Tuple => "tuple",
            Feature::Projection => "projection",
            Feature::RefCreate => "ref_create",
            Feature::RefRead => "ref_read",
            Feature::RefWrite => "ref_write",
            Feature::Graph => "graph",
        }
    }

    const ALL: [Feature; 14] = [
        Feature::Var,
        Feature::Constant,
        Feature::Prim,
        Feature::Global,
        Feature::Let,
        Feature::Function,
        Feature::Call,
        Feature::If,
        Feature::Tuple,
        Feature::Projection,
        Feature::RefCreate,
        Feature::RefRead,
        Feature::RefWrite,
        Feature::Graph,
    ];
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bitset of [`Feature`] tags.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct FeatureSet(u16);

impl FeatureSet {
    /// The empty set.
    pub fn empty() -> Self {
        Self(0)
    }

    /// Add a tag.
    pub fn insert(&mut self, feature: Feature) {
        self.0 |= 1 << feature as u16;
    }

    /// Whether a tag is present.
    pub fn contains(&self, feature: Feature) -> bool {
        self.0 & (1 << feature as u16) != 0
    }

    /// Union of two sets.
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether no tag is present.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Tags in the set, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Feature> + '_ {
        Feature::ALL.into_iter().filter(|f| self.contains(*f))
    }
}

impl FromIterator<Feature> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        let mut set = Self::empty();
        for feature in iter {
            set.insert(feature);
        }
        set
    }
}

impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, feature) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", feature)?;
        }
        write!(f, "}}")
    }
}

impl fmt::Debug for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Compute the set of construct kinds reachable from `root`.
///
/// Global references contribute [`Feature::Global`] but are not followed;
/// use [`detect_features_in`] to scan their definitions too.
pub fn detect_features(arena: &ExprArena, root: ExprId) -> FeatureSet {
    let mut detector = Detector {
        arena,
        module: None,
        visited: HashSet::new(),
        seen_globals: HashSet::new(),
        set: FeatureSet::empty(),
    };
    detector.visit(root);
    detector.set
}

/// Compute reachable features, following global references into their
/// module definitions. Terminates on recursive and mutually recursive
/// definitions.
pub fn detect_features_in(arena: &ExprArena, module: &Module, root: ExprId) -> FeatureSet {
    let mut detector = Detector {
        arena,
        module: Some(module),
        visited: HashSet::new(),
        seen_globals: HashSet::new(),
        set: FeatureSet::empty(),
    };
    detector.visit(root);
    detector.set
}

struct Detector<'a> {
    arena: &'a ExprArena,
    module: Option<&'a Module>,
    visited: HashSet<ExprId>,
    seen_globals: HashSet<GlobalId>,
    set: FeatureSet,
}

impl Detector<'_> {
    fn visit(&mut self, node: ExprId) {
        if !self.visited.insert(node) {
            if !self.arena.kind(node).is_atomic() {
                self.set.insert(Feature::Graph);
            }
            return;
        }

        let kind = self.arena.kind(node);
        self.set.insert(match kind {
            ExprKind::Var(_) => Feature::Var,
            ExprKind::Constant(_) => Feature::Constant,
            ExprKind::Prim(_) => Feature::Prim,
            ExprKind::Global(_) => Feature::Global,
            ExprKind::Let { .. } => Feature::Let,
            ExprKind::Function { .. } => Feature::Function,
            ExprKind::Call { .. } => Feature::Call,
            ExprKind::If { .. } => Feature::If,
            ExprKind::Tuple(_) => Feature::Tuple,
            ExprKind::Project { .. } => Feature::Projection,
            ExprKind::RefCreate { .. } => Feature::RefCreate,
            ExprKind::RefRead { .. } => Feature::RefRead,
            ExprKind::RefWrite { .. } => Feature::RefWrite,
        });

        if let (ExprKind::Global(name), Some(module)) = (kind, self.module) {
            if self.seen_globals.insert(name.clone()) {
                if let Some(def) = module.def(name) {
                    self.visit(def);
                }
            }
        }

        for child in self.arena.kind(node).children() {
            self.visit(child);
        }
    }
}

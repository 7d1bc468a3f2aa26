// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! # Rill Passes
//!
//! Canonicalization passes over the `rill-ir` expression arena.
//!
//! The two form converters are inverses in spirit:
//!
//! - [`to_sequential_form`] names every compound subexpression with a `let`
//!   binding, placed in the lowest scope that covers all of its consumers.
//!   After it runs, evaluation order is spelled out in the text and shared
//!   subgraphs are computed once through their binder.
//! - [`to_graph_form`] removes `let` bindings by substituting each binder's
//!   value at its use sites. Sharing survives as multiple handles to the
//!   same arena node.
//!
//! [`alpha_equal`] compares expressions up to the choice of binder names,
//! which is how the converters' outputs are asserted against hand-built
//! expectations. [`detect_features`] reports which construct kinds (and
//! whether structural sharing) an expression reaches, so callers can gate a
//! pipeline stage on the form it expects.

pub mod alpha;
pub mod error;
pub mod feature;
pub mod graph;
pub mod scope;
pub mod sequential;

pub use alpha::alpha_equal;
pub use error::{PassError, Result};
pub use feature::{detect_features, detect_features_in, Feature, FeatureSet};
pub use graph::to_graph_form;
pub use scope::{ScopeId, ScopeTree};
pub use sequential::{to_sequential_form, to_sequential_form_in};

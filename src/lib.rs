//! # Trueno-Treeviz
//!
//! Decision tree visualization for regressors and classifiers.
//!
//! A fitted tree is mirrored in a [`ShadowTree`](tree::ShadowTree) that knows
//! which training rows reach every node. Each node then gets a small
//! statistical SVG (class histograms, pies, target scatters and strips), and
//! the images are composed into a Graphviz DOT document. Rendering the
//! document (`dot -Tsvg`) is left to the caller.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use trueno_treeviz::prelude::*;
//!
//! let dot = TreeViz::new(&model, &x, &y)
//!     .feature_names(["sepal length", "sepal width", "petal length", "petal width"])
//!     .target_name("species")
//!     .class_names(ClassNames::list(["setosa", "versicolor", "virginica"]))
//!     .config(RenderConfig::new().instance(vec![5.1, 3.5, 1.4, 0.2]))
//!     .render()?;
//! std::fs::write("iris.dot", dot)?;
//! ```
//!
//! ## Feature Flags
//!
//! - `config`: YAML loading of [`RenderConfig`](config::RenderConfig)
//! - `samples`: the `dtreeviz-samples` harness binary
//! - `full`: All features enabled

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code (Cloudflare incident 2025-11-18)
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Allow common patterns in graphics/visualization code
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Core Modules
// ============================================================================

/// Color types, named colors and the class palettes.
pub mod color;

/// Training data matrix and SIMD reductions over it.
pub mod data;

/// Fitted-tree contract and shadow tree.
pub mod tree;

/// Scale functions for data-to-visual mappings.
pub mod scale;

/// Sizing and binning heuristics.
pub mod sizing;

/// Seeded sampler behind leaf jitter.
pub mod random;

// ============================================================================
// Rendering Modules
// ============================================================================

/// Per-node statistical plots.
pub mod plots;

/// Output encoders (SVG).
pub mod output;

/// Node image files.
pub mod artifact;

/// Highlighted nodes and traced instances.
pub mod highlight;

/// Graphviz DOT assembly.
pub mod dot;

/// Render configuration.
pub mod config;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for trueno-treeviz operations.
pub mod error;

pub use dot::{dtreeviz, TreeViz};
pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```rust,ignore
/// use trueno_treeviz::prelude::*;
/// ```
pub mod prelude {
    pub use crate::color::Rgba;
    pub use crate::config::{ClassNames, HistType, Orientation, RenderConfig};
    pub use crate::data::FeatureMatrix;
    pub use crate::dot::{dtreeviz, TreeViz};
    pub use crate::error::{Error, Result};
    pub use crate::tree::{
        DecisionPath, FittedTree, Prediction, ShadowTree, TreeBuilder, TreeKind, TreeModel,
    };
    pub use batuta_common::display::WithDimensions;
}

// ============================================================================
// Re-exports
// ============================================================================

/// Re-export trueno for direct access to SIMD operations.
pub use trueno;

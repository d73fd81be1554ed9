//! Deterministic random forest classifier
//!
//! - Thresholds are order-preserving integer keys of `f64` values
//! - Leaf probabilities are fixed-point integers
//! - Traversal uses integer `<=` comparison
//! - Canonical JSON with sorted keys gives a stable BLAKE3 fingerprint
//!
//! ```rust
//! use rugscan_ai_core::feature_key;
//! use rugscan_ai_core::forest::{ForestModel, Node, Tree};
//! use rugscan_ai_core::fixed::SCALE;
//!
//! let threshold = feature_key::encode(2.0).unwrap();
//! let tree = Tree::new(vec![
//!     Node::internal(0, 0, threshold, 1, 2),
//!     Node::leaf(1, vec![SCALE, 0]),
//!     Node::leaf(2, vec![0, SCALE]),
//! ]);
//! let model = ForestModel::new(vec!["a".into()], vec!["0".into(), "1".into()], vec![tree], 2);
//!
//! assert_eq!(model.predict(&[1.5]).unwrap(), "0");
//! assert_eq!(model.predict(&[2.5]).unwrap(), "1");
//! ```

pub mod model;
pub mod tree;

pub use model::{ForestModel, MODEL_VERSION};
pub use tree::{Node, Tree};

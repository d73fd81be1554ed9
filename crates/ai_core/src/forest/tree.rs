//! Classification tree structures
//!
//! Thresholds are [feature keys](crate::feature_key), compared against the
//! keys of a row's values. Leaves carry the class distribution of the training rows that reached
//! them, as fixed-point probabilities indexed like the model's class list.

use serde::{Deserialize, Serialize};

/// A decision tree node (internal or leaf)
///
/// Internal nodes have `feature_idx >= 0`, valid `left`/`right` child
/// indices, and `leaf == None`. Leaves have `feature_idx == -1`,
/// `left == right == -1`, and a class distribution in `leaf`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Node {
    /// Position of this node in the tree's node vector
    pub id: i32,

    /// Left child index (-1 for leaf nodes)
    pub left: i32,

    /// Right child index (-1 for leaf nodes)
    pub right: i32,

    /// Feature index to split on (-1 for leaf nodes)
    pub feature_idx: i32,

    /// Rows whose feature key is `<= threshold` go left
    pub threshold: i64,

    /// Class probabilities for leaf nodes
    pub leaf: Option<Vec<i64>>,
}

impl Node {
    /// Create an internal (split) node; children are patched in by the builder
    pub fn internal(id: i32, feature_idx: i32, threshold: i64, left: i32, right: i32) -> Self {
        Self {
            id,
            left,
            right,
            feature_idx,
            threshold,
            leaf: None,
        }
    }

    /// Create a leaf node holding a class distribution
    pub fn leaf(id: i32, distribution: Vec<i64>) -> Self {
        Self {
            id,
            left: -1,
            right: -1,
            feature_idx: -1,
            threshold: 0,
            leaf: Some(distribution),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.feature_idx == -1 || self.leaf.is_some()
    }

    /// Split threshold as a feature value
    pub fn threshold_value(&self) -> f64 {
        crate::feature_key::decode(self.threshold)
    }
}

/// A single classification tree; node 0 is the root
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Walk from the root to a leaf and return its class distribution.
    ///
    /// Returns `None` when the tree is empty, its structure points outside
    /// the node vector or the feature row, or a path revisits a node.
    pub fn leaf_distribution(&self, keys: &[i64]) -> Option<&[i64]> {
        let mut idx = 0usize;

        for _ in 0..self.nodes.len() {
            let node = self.nodes.get(idx)?;

            if node.is_leaf() {
                return node.leaf.as_deref();
            }

            let key = *keys.get(usize::try_from(node.feature_idx).ok()?)?;
            let next = if key <= node.threshold {
                node.left
            } else {
                node.right
            };
            idx = usize::try_from(next).ok()?;
        }

        None
    }

    /// Number of edges on the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(0usize, 0usize)];

        while let Some((idx, depth)) = stack.pop() {
            let Some(node) = self.nodes.get(idx) else {
                continue;
            };
            deepest = deepest.max(depth);
            if !node.is_leaf() {
                for child in [node.left, node.right] {
                    if let Ok(child) = usize::try_from(child) {
                        stack.push((child, depth + 1));
                    }
                }
            }
        }

        deepest
    }

    pub fn num_leaves(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_leaf()).count()
    }

    /// Validate tree structure against the model's feature and class counts
    pub fn validate(&self, feature_count: usize, class_count: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("Tree has no nodes".to_string());
        }

        let len = self.nodes.len();
        let in_bounds = |child: i32| usize::try_from(child).map(|c| c < len).unwrap_or(false);

        for (i, node) in self.nodes.iter().enumerate() {
            if node.is_leaf() {
                match &node.leaf {
                    None => return Err(format!("Leaf node {i} has no class distribution")),
                    Some(dist) if dist.len() != class_count => {
                        return Err(format!(
                            "Leaf node {i} has {} class probabilities, expected {class_count}",
                            dist.len()
                        ));
                    }
                    Some(_) => {}
                }
                continue;
            }

            // Children always come after their parent, so this also rules out cycles
            for (side, child) in [("left", node.left), ("right", node.right)] {
                if !in_bounds(child) || child as usize <= i {
                    return Err(format!("Node {i} has invalid {side} child: {child}"));
                }
            }

            if usize::try_from(node.feature_idx).map_or(true, |f| f >= feature_count) {
                return Err(format!(
                    "Internal node {i} has invalid feature index: {}",
                    node.feature_idx
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump() -> Tree {
        // feature[0] <= 50 -> class 0, else class 1
        Tree::new(vec![
            Node::internal(0, 0, 50, 1, 2),
            Node::leaf(1, vec![1_000_000, 0]),
            Node::leaf(2, vec![250_000, 750_000]),
        ])
    }

    #[test]
    fn test_threshold_value_decodes_key() {
        let key = crate::feature_key::encode(1.5e15).unwrap();
        assert_eq!(Node::internal(0, 0, key, 1, 2).threshold_value(), 1.5e15);
    }

    #[test]
    fn test_node_creation() {
        let internal = Node::internal(0, 3, 12345, 1, 2);
        assert_eq!(internal.feature_idx, 3);
        assert!(!internal.is_leaf());

        let leaf = Node::leaf(1, vec![500_000, 500_000]);
        assert_eq!(leaf.feature_idx, -1);
        assert_eq!(leaf.left, -1);
        assert!(leaf.is_leaf());
    }

    #[test]
    fn test_tree_traversal() {
        let tree = stump();
        assert_eq!(tree.leaf_distribution(&[30]), Some(&[1_000_000, 0][..]));
        assert_eq!(tree.leaf_distribution(&[50]), Some(&[1_000_000, 0][..]));
        assert_eq!(tree.leaf_distribution(&[51]), Some(&[250_000, 750_000][..]));
    }

    #[test]
    fn test_traversal_rejects_short_rows() {
        assert_eq!(stump().leaf_distribution(&[]), None);
        assert_eq!(Tree::default().leaf_distribution(&[1]), None);
    }

    #[test]
    fn test_depth_and_leaves() {
        let tree = stump();
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.num_leaves(), 2);

        let single = Tree::new(vec![Node::leaf(0, vec![1_000_000])]);
        assert_eq!(single.depth(), 0);
    }

    #[test]
    fn test_tree_validation() {
        assert!(stump().validate(1, 2).is_ok());

        // feature index beyond the feature count
        assert!(stump().validate(0, 2).is_err());

        // wrong class count in leaves
        assert!(stump().validate(1, 3).is_err());

        let dangling = Tree::new(vec![
            Node::internal(0, 0, 50, 5, 2),
            Node::leaf(1, vec![1_000_000, 0]),
            Node::leaf(2, vec![0, 1_000_000]),
        ]);
        assert!(dangling.validate(1, 2).is_err());

        let cyclic = Tree::new(vec![
            Node::internal(0, 0, 50, 0, 1),
            Node::leaf(1, vec![1_000_000, 0]),
        ]);
        assert!(cyclic.validate(1, 2).is_err());
    }
}

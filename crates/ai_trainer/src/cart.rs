//! CART (Classification and Regression Tree) builder
//!
//! Grows one classification tree with exact-greedy Gini splits. Impurity
//! comparisons are integer-only: a split is scored by
//! `Σ_child Σ_class count² / child_rows` in fixed-point, which ranks
//! candidates identically to weighted Gini decrease. Thresholds are feature
//! keys halfway between neighbouring values.

use rugscan_ai_core::feature_key;
use rugscan_ai_core::fixed::{Fixed, SCALE};
use rugscan_ai_core::forest::{Node, Tree};

use crate::deterministic::{LcgRng, SplitTieBreaker};

/// Training parameters for a single tree
#[derive(Clone, Debug)]
pub struct TreeConfig {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features drawn per split before settling for the best seen
    pub max_features: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: usize::MAX,
        }
    }
}

/// Split candidate with gain and tie-breaker
#[derive(Debug, Clone)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: i64,
    gain: i128,
    tie_breaker: SplitTieBreaker,
}

impl SplitCandidate {
    fn new(feature_idx: usize, threshold: i64, gain: i128, node_id: usize) -> Self {
        Self {
            feature_idx,
            threshold,
            gain,
            tie_breaker: SplitTieBreaker::new(feature_idx, threshold, node_id),
        }
    }

    fn beats(&self, other: &SplitCandidate) -> bool {
        self.gain > other.gain || (self.gain == other.gain && self.tie_breaker < other.tie_breaker)
    }
}

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

/// Node waiting to be grown; `parent` is patched once its index is known
struct PendingNode {
    parent: Option<(usize, Side)>,
    indices: Vec<usize>,
    depth: usize,
}

/// Builds classification trees over a feature-key matrix
pub(crate) struct CartBuilder<'a> {
    config: TreeConfig,
    features: &'a [Vec<i64>],
    labels: &'a [usize],
    n_classes: usize,
    feature_count: usize,
}

impl<'a> CartBuilder<'a> {
    /// `labels[i]` is the class index of `features[i]`, below `n_classes`
    pub(crate) fn new(
        features: &'a [Vec<i64>],
        labels: &'a [usize],
        n_classes: usize,
        config: TreeConfig,
    ) -> Self {
        debug_assert_eq!(features.len(), labels.len());

        let feature_count = features.first().map_or(0, Vec::len);

        Self {
            config,
            features,
            labels,
            n_classes,
            feature_count,
        }
    }

    /// Grow a tree over `samples` (row indices; repeats count as extra weight)
    pub(crate) fn build(&self, samples: Vec<usize>, rng: &mut LcgRng) -> Tree {
        let mut nodes: Vec<Node> = Vec::new();
        let mut pending = vec![PendingNode {
            parent: None,
            indices: samples,
            depth: 0,
        }];

        // Depth-first with the left child popped first, so ids follow pre-order
        while let Some(PendingNode {
            parent,
            indices,
            depth,
        }) = pending.pop()
        {
            let current = nodes.len();
            if let Some((parent_idx, side)) = parent {
                match side {
                    Side::Left => nodes[parent_idx].left = current as i32,
                    Side::Right => nodes[parent_idx].right = current as i32,
                }
            }

            let counts = self.class_counts(&indices);

            let split = if self.should_stop(&indices, &counts, depth) {
                None
            } else {
                self.find_best_split(&indices, &counts, current, rng)
            };

            match split {
                None => nodes.push(Node::leaf(current as i32, self.distribution(&counts, indices.len()))),
                Some(split) => {
                    let (left, right) = self.split_samples(&indices, split.feature_idx, split.threshold);
                    nodes.push(Node::internal(
                        current as i32,
                        split.feature_idx as i32,
                        split.threshold,
                        -1,
                        -1,
                    ));
                    pending.push(PendingNode {
                        parent: Some((current, Side::Right)),
                        indices: right,
                        depth: depth + 1,
                    });
                    pending.push(PendingNode {
                        parent: Some((current, Side::Left)),
                        indices: left,
                        depth: depth + 1,
                    });
                }
            }
        }

        Tree::new(nodes)
    }

    fn should_stop(&self, indices: &[usize], counts: &[u64], depth: usize) -> bool {
        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        pure || self.config.max_depth.is_some_and(|max| depth >= max)
            || indices.len() < self.config.min_samples_split
            || indices.len() < 2 * self.config.min_samples_leaf
    }

    /// Best split over a random subset of features.
    ///
    /// Features are visited in shuffled order. After `max_features` of them
    /// the search stops if any valid split was found; otherwise it keeps
    /// drawing, so a node only becomes a leaf when no feature can split it.
    fn find_best_split(
        &self,
        indices: &[usize],
        counts: &[u64],
        node_id: usize,
        rng: &mut LcgRng,
    ) -> Option<SplitCandidate> {
        let mut order: Vec<usize> = (0..self.feature_count).collect();
        rng.shuffle(&mut order);

        let parent_score = score(counts, indices.len() as u64);
        let mut best: Option<SplitCandidate> = None;

        for (visited, &feature_idx) in order.iter().enumerate() {
            if visited >= self.config.max_features && best.is_some() {
                break;
            }

            if let Some(candidate) = self.best_split_for_feature(indices, feature_idx, parent_score, node_id) {
                if best.as_ref().map_or(true, |current| candidate.beats(current)) {
                    best = Some(candidate);
                }
            }
        }

        best
    }

    /// Sweep sorted values once, moving rows from the right child to the left
    fn best_split_for_feature(
        &self,
        indices: &[usize],
        feature_idx: usize,
        parent_score: i128,
        node_id: usize,
    ) -> Option<SplitCandidate> {
        let mut column: Vec<(i64, usize)> = indices
            .iter()
            .map(|&idx| (self.features[idx][feature_idx], self.labels[idx]))
            .collect();
        column.sort_unstable();

        let total = column.len() as u64;
        let min_leaf = self.config.min_samples_leaf as u64;

        let mut left = vec![0u64; self.n_classes];
        let mut right = self.class_counts(indices);
        let mut left_sq: u128 = 0;
        let mut right_sq: u128 = right.iter().map(|&c| u128::from(c) * u128::from(c)).sum();

        let mut best: Option<SplitCandidate> = None;

        for (pos, window) in column.windows(2).enumerate() {
            let (value, label) = window[0];
            let next_value = window[1].0;

            // moving one row: c² -> (c+1)² on the left, c² -> (c-1)² on the right
            left_sq += 2 * u128::from(left[label]) + 1;
            right_sq -= 2 * u128::from(right[label]) - 1;
            left[label] += 1;
            right[label] -= 1;

            if value == next_value {
                continue;
            }

            let n_left = pos as u64 + 1;
            let n_right = total - n_left;
            if n_left < min_leaf || n_right < min_leaf {
                continue;
            }

            let split_score = sq_ratio(left_sq, n_left) + sq_ratio(right_sq, n_right);
            let threshold = feature_key::split_between(value, next_value);
            let candidate = SplitCandidate::new(feature_idx, threshold, split_score - parent_score, node_id);

            if best.as_ref().map_or(true, |current| candidate.beats(current)) {
                best = Some(candidate);
            }
        }

        best
    }

    /// Split samples based on threshold
    fn split_samples(&self, indices: &[usize], feature_idx: usize, threshold: i64) -> (Vec<usize>, Vec<usize>) {
        indices
            .iter()
            .copied()
            .partition(|&idx| self.features[idx][feature_idx] <= threshold)
    }

    fn class_counts(&self, indices: &[usize]) -> Vec<u64> {
        let mut counts = vec![0u64; self.n_classes];
        for &idx in indices {
            counts[self.labels[idx]] += 1;
        }
        counts
    }

    /// Leaf class probabilities at fixed-point scale
    fn distribution(&self, counts: &[u64], total: usize) -> Vec<i64> {
        counts
            .iter()
            .map(|&c| Fixed::from_ratio(c, total as u64).into_inner())
            .collect()
    }
}

/// `Σ count² / total` for one node
fn score(counts: &[u64], total: u64) -> i128 {
    let sq: u128 = counts.iter().map(|&c| u128::from(c) * u128::from(c)).sum();
    sq_ratio(sq, total)
}

fn sq_ratio(sum_sq: u128, total: u64) -> i128 {
    if total == 0 {
        return 0;
    }
    (sum_sq * SCALE as u128 / u128::from(total)) as i128
}

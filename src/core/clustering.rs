// clustering.rs - Complete-linkage clustering of the symmetrized matrix

use serde::{Deserialize, Serialize};

use crate::core::distance::DistanceMatrix;
use crate::error::{Result, SurveyError};

/// Indices of sequences judged mutually similar
pub type Family = Vec<usize>;

/// One agglomeration event.
///
/// Cluster ids follow the usual linkage labelling: ids `0..n` are the input
/// points, the cluster created by step `i` gets id `n + i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeStep {
    pub left: usize,
    pub right: usize,
    pub distance: usize,
    pub size: usize,
}

/// Output of the clustering stage
#[derive(Debug, Clone)]
pub struct Clustering {
    pub symmetric: DistanceMatrix,
    pub merge_history: Vec<MergeStep>,
    pub families: Vec<Family>,
}

/// Symmetrizes a raw matrix, clusters it and cuts the tree at `threshold`
#[derive(Debug, Clone, Copy)]
pub struct SymmetricClusterer {
    threshold: f64,
}

impl SymmetricClusterer {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn cluster(&self, raw: &DistanceMatrix) -> Result<Clustering> {
        if self.threshold.is_nan() {
            return Err(SurveyError::InvalidInput(
                "score threshold must be a number".to_string(),
            ));
        }

        let symmetric = raw.symmetrized();
        let merge_history = complete_linkage(&symmetric);
        let families = cut_families(symmetric.len(), &merge_history, self.threshold)?;

        Ok(Clustering {
            symmetric,
            merge_history,
            families,
        })
    }
}

/// Agglomerate until one cluster remains, always merging the pair whose
/// largest member-to-member distance is smallest. Ties go to the first pair
/// found scanning the active clusters in order.
///
/// `matrix` must be symmetric.
pub fn complete_linkage(matrix: &DistanceMatrix) -> Vec<MergeStep> {
    let n = matrix.len();
    let mut steps = Vec::with_capacity(n.saturating_sub(1));

    // (cluster id, size), parallel to the rows of `dist`
    let mut active: Vec<(usize, usize)> = (0..n).map(|i| (i, 1)).collect();
    let mut dist: Vec<Vec<usize>> = matrix.rows().to_vec();

    while active.len() > 1 {
        let mut best: Option<(usize, usize, usize)> = None;
        for a in 0..active.len() {
            for b in (a + 1)..active.len() {
                let d = dist[a][b];
                if best.map_or(true, |(_, _, best_d)| d < best_d) {
                    best = Some((a, b, d));
                }
            }
        }
        let Some((a, b, distance)) = best else {
            break;
        };

        let (id_a, size_a) = active[a];
        let (id_b, size_b) = active[b];
        steps.push(MergeStep {
            left: id_a.min(id_b),
            right: id_a.max(id_b),
            distance,
            size: size_a + size_b,
        });

        // Complete linkage update: distance to the union is the larger one
        for k in 0..active.len() {
            let merged = dist[a][k].max(dist[b][k]);
            dist[a][k] = merged;
            dist[k][a] = merged;
        }
        dist[a][a] = 0;
        active[a] = (n + steps.len() - 1, size_a + size_b);

        active.remove(b);
        dist.remove(b);
        for row in &mut dist {
            row.remove(b);
        }
    }

    steps
}

/// Replay merges from `n` singletons while their distance stays below
/// `threshold`.
///
/// Families come out as surviving singletons in index order followed by
/// merged clusters in creation order; a merged cluster lists its left
/// members first.
pub fn cut_families(n: usize, steps: &[MergeStep], threshold: f64) -> Result<Vec<Family>> {
    let mut grouping: Vec<Option<Family>> = (0..n).map(|i| Some(vec![i])).collect();

    for step in steps {
        if step.distance as f64 >= threshold {
            break;
        }
        let left = take_cluster(&mut grouping, step.left)?;
        let right = take_cluster(&mut grouping, step.right)?;
        grouping.push(Some([left, right].concat()));
    }

    Ok(grouping.into_iter().flatten().collect())
}

fn take_cluster(grouping: &mut [Option<Family>], id: usize) -> Result<Family> {
    grouping
        .get_mut(id)
        .and_then(Option::take)
        .ok_or_else(|| {
            SurveyError::InvariantViolation(format!(
                "merge refers to cluster {} which is unknown or already merged",
                id
            ))
        })
}

/// Leaf order of the dendrogram, left subtree first
pub fn leaf_order(n: usize, steps: &[MergeStep]) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }
    if steps.is_empty() {
        return (0..n).collect();
    }

    let mut order = Vec::with_capacity(n);
    let mut stack = vec![n + steps.len() - 1];
    while let Some(id) = stack.pop() {
        if id < n {
            order.push(id);
        } else if let Some(step) = steps.get(id - n) {
            stack.push(step.right);
            stack.push(step.left);
        }
    }
    order
}

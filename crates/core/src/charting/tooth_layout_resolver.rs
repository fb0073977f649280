use crate::detection::domain::detections::ToothDetection;
use crate::shared::constants::{ARCH_SPLIT_MAX_ITERATIONS, TOOTH_SLOTS};

/// Numbered teeth for one radiograph: id `n` is the `n`-th entry, ids are
/// contiguous from 1.
///
/// Every detected box is numbered, including any past the 32 report slots,
/// so anomalies on surplus teeth still match their own box.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ToothMap {
    teeth: Vec<ToothDetection>,
}

impl ToothMap {
    pub fn get(&self, tooth_id: usize) -> Option<&ToothDetection> {
        tooth_id
            .checked_sub(1)
            .and_then(|idx| self.teeth.get(idx))
    }

    /// `(tooth_id, tooth)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ToothDetection)> {
        self.teeth
            .iter()
            .enumerate()
            .map(|(idx, tooth)| (idx + 1, tooth))
    }

    pub fn len(&self) -> usize {
        self.teeth.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teeth.is_empty()
    }
}

/// Numbers unordered tooth boxes: upper arch left to right, then lower arch
/// left to right.
///
/// The arches are separated by two-means clustering on the vertical box
/// centers. This is a row-sweep approximation of dental numbering, not a
/// quadrant-aware FDI or Universal scheme.
pub struct ToothLayoutResolver {
    max_iterations: usize,
}

impl ToothLayoutResolver {
    pub fn new() -> Self {
        Self {
            max_iterations: ARCH_SPLIT_MAX_ITERATIONS,
        }
    }

    pub fn resolve(&self, teeth: &[ToothDetection]) -> ToothMap {
        let centers: Vec<(f64, f64)> = teeth.iter().map(|t| t.bbox.center()).collect();
        let cys: Vec<f64> = centers.iter().map(|&(_, cy)| cy).collect();

        let order: Vec<usize> = match split_arches(&cys, self.max_iterations) {
            Some(is_upper) => {
                let (mut upper, mut lower): (Vec<usize>, Vec<usize>) =
                    (0..teeth.len()).partition(|&i| is_upper[i]);
                log::debug!(
                    "Split {} teeth into {} upper / {} lower",
                    teeth.len(),
                    upper.len(),
                    lower.len()
                );
                sort_left_to_right(&mut upper, &centers);
                sort_left_to_right(&mut lower, &centers);
                upper.into_iter().chain(lower).collect()
            }
            None => {
                let mut all: Vec<usize> = (0..teeth.len()).collect();
                sort_left_to_right(&mut all, &centers);
                all
            }
        };

        if order.len() > TOOTH_SLOTS as usize {
            log::warn!(
                "Detected {} teeth; ids above {TOOTH_SLOTS} are left out of the report",
                order.len()
            );
        }

        ToothMap {
            teeth: order.into_iter().map(|i| teeth[i]).collect(),
        }
    }
}

impl Default for ToothLayoutResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Stable sort by horizontal center; equal centers keep detection order.
fn sort_left_to_right(indices: &mut [usize], centers: &[(f64, f64)]) {
    indices.sort_by(|&a, &b| centers[a].0.total_cmp(&centers[b].0));
}

/// One-dimensional two-means over vertical centers.
///
/// Seeds are the minimum and maximum values, so the result is deterministic.
/// Returns `is_upper` per value, or `None` when two clusters cannot be formed
/// (fewer than two values, or all values equal).
fn split_arches(cys: &[f64], max_iterations: usize) -> Option<Vec<bool>> {
    if cys.len() < 2 {
        return None;
    }
    let lo = cys.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = cys.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo >= hi {
        return None;
    }

    let mut centers = (lo, hi);
    let mut labels: Vec<bool> = Vec::new();

    for _ in 0..max_iterations {
        // Ties go to the first (upper) center
        let next: Vec<bool> = cys
            .iter()
            .map(|&cy| (cy - centers.0).abs() <= (cy - centers.1).abs())
            .collect();
        if next == labels {
            break;
        }
        labels = next;
        centers = (
            cluster_mean(cys, &labels, true)?,
            cluster_mean(cys, &labels, false)?,
        );
    }

    // The cluster with the smaller mean is higher on the image
    if centers.0 > centers.1 {
        labels.iter_mut().for_each(|l| *l = !*l);
    }
    Some(labels)
}

fn cluster_mean(cys: &[f64], labels: &[bool], which: bool) -> Option<f64> {
    let (sum, count) = cys
        .iter()
        .zip(labels)
        .filter(|(_, l)| **l == which)
        .fold((0.0, 0usize), |(s, n), (&cy, _)| (s + cy, n + 1));
    (count > 0).then(|| sum / count as f64)
}

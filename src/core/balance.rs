// balance.rs - Spread family members across balanced combinations

use crate::core::clustering::Family;
use crate::core::distance::DistanceMatrix;
use crate::error::{Result, SurveyError};

/// Output group holding at most one member of each family
pub type Combination = Vec<usize>;

/// Worst-case similarity of a group, shrunk by its number of pairs.
///
/// A single member has nothing to be confused with and scores `+inf`.
pub fn group_score(members: &[usize], matrix: &DistanceMatrix) -> Result<f64> {
    match members.len() {
        0 => Err(SurveyError::InvariantViolation(
            "attempted to score an empty group".to_string(),
        )),
        1 => Ok(f64::INFINITY),
        k => {
            let mut min_distance = usize::MAX;
            for (i, &a) in members.iter().enumerate() {
                for &b in &members[i + 1..] {
                    min_distance = min_distance.min(matrix.get(a, b));
                }
            }
            let pairs = k * (k - 1) / 2;
            Ok(min_distance as f64 / pairs as f64)
        }
    }
}

/// Population variance
fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SlotSpread {
    primary: f64,
    finite_only: Option<f64>,
}

impl SlotSpread {
    fn of(scores: &[f64]) -> Self {
        let finite: Vec<f64> = scores.iter().copied().filter(|s| s.is_finite()).collect();
        if finite.is_empty() {
            Self {
                primary: 0.0,
                finite_only: None,
            }
        } else if finite.len() < scores.len() {
            Self {
                primary: f64::INFINITY,
                finite_only: Some(variance(&finite)),
            }
        } else {
            Self {
                primary: variance(scores),
                finite_only: None,
            }
        }
    }
}

/// Every distinct way to lay `members` over `slots` positions, the free
/// positions left empty. Lexicographic order, members before empties.
pub fn distinct_placements(members: &[usize], slots: usize) -> Vec<Vec<Option<usize>>> {
    let k = members.len();
    // Key k marks an empty slot
    let mut keys: Vec<usize> = (0..slots.max(k)).map(|i| i.min(k)).collect();
    let mut placements = Vec::new();
    loop {
        placements.push(keys.iter().map(|&key| members.get(key).copied()).collect());
        if !next_permutation(&mut keys) {
            break;
        }
    }
    placements
}

fn next_permutation(keys: &mut [usize]) -> bool {
    if keys.len() < 2 {
        return false;
    }
    let mut i = keys.len() - 1;
    while i > 0 && keys[i - 1] >= keys[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }
    let mut j = keys.len() - 1;
    while keys[j] <= keys[i - 1] {
        j -= 1;
    }
    keys.swap(i - 1, j);
    keys[i..].reverse();
    true
}

/// Odometer over the cross product, last position turning fastest
fn advance(choice: &mut [usize], limits: &[usize]) -> bool {
    for pos in (0..choice.len()).rev() {
        choice[pos] += 1;
        if choice[pos] < limits[pos] {
            return true;
        }
        choice[pos] = 0;
    }
    false
}

/// Builds combinations from families against a symmetric distance matrix
pub struct GroupBalancer<'a> {
    matrix: &'a DistanceMatrix,
}

impl<'a> GroupBalancer<'a> {
    pub fn new(matrix: &'a DistanceMatrix) -> Self {
        Self { matrix }
    }

    /// Greedy construction by family size: largest families first, every
    /// placement of a size tier tried exhaustively, the one with the most
    /// even slot scores kept. Ties keep the first placement enumerated.
    pub fn balance(&self, families: &[Family]) -> Result<Vec<Combination>> {
        check_partition(families, self.matrix.len())?;

        let slot_count = families.iter().map(Vec::len).max().unwrap_or(0);
        let mut slots: Vec<Combination> = vec![Vec::new(); slot_count];

        for size in (1..=slot_count).rev() {
            let tier: Vec<&Family> = families.iter().filter(|f| f.len() == size).collect();
            if tier.is_empty() {
                continue;
            }

            let placements: Vec<Vec<Vec<Option<usize>>>> = tier
                .iter()
                .map(|family| distinct_placements(family, slot_count))
                .collect();
            let limits: Vec<usize> = placements.iter().map(Vec::len).collect();

            let chosen = self.best_choice(&slots, &placements, &limits)?;

            for (slot, members) in slots.iter_mut().enumerate() {
                for (family_placements, &pick) in placements.iter().zip(&chosen) {
                    if let Some(member) = family_placements[pick][slot] {
                        members.push(member);
                    }
                }
            }
        }

        Ok(slots)
    }

    fn best_choice(
        &self,
        slots: &[Combination],
        placements: &[Vec<Vec<Option<usize>>>],
        limits: &[usize],
    ) -> Result<Vec<usize>> {
        let mut choice = vec![0usize; placements.len()];
        let mut best_primary: Option<(Vec<usize>, f64)> = None;
        let mut best_fallback: Option<(Vec<usize>, f64)> = None;

        loop {
            let mut scores = Vec::with_capacity(slots.len());
            for (slot, committed) in slots.iter().enumerate() {
                let mut members = committed.clone();
                for (family_placements, &pick) in placements.iter().zip(&choice) {
                    if let Some(member) = family_placements[pick][slot] {
                        members.push(member);
                    }
                }
                scores.push(group_score(&members, self.matrix)?);
            }

            let spread = SlotSpread::of(&scores);
            if spread.primary.is_finite() {
                if best_primary
                    .as_ref()
                    .map_or(true, |(_, v)| spread.primary < *v)
                {
                    best_primary = Some((choice.clone(), spread.primary));
                }
            } else if let Some(v) = spread.finite_only {
                if best_fallback.as_ref().map_or(true, |(_, best)| v < *best) {
                    best_fallback = Some((choice.clone(), v));
                }
            }

            if !advance(&mut choice, limits) {
                break;
            }
        }

        best_primary
            .or(best_fallback)
            .map(|(choice, _)| choice)
            .ok_or_else(|| {
                SurveyError::InvariantViolation("no placement candidate could be scored".to_string())
            })
    }
}

/// Families must be non-empty and cover `0..n` exactly once
fn check_partition(families: &[Family], n: usize) -> Result<()> {
    let mut seen = vec![false; n];
    for (position, family) in families.iter().enumerate() {
        if family.is_empty() {
            return Err(SurveyError::InvariantViolation(format!(
                "family {} is empty",
                position
            )));
        }
        for &member in family {
            match seen.get_mut(member) {
                None => {
                    return Err(SurveyError::InvariantViolation(format!(
                        "family {} refers to sequence {} outside 0..{}",
                        position, member, n
                    )))
                }
                Some(true) => {
                    return Err(SurveyError::InvariantViolation(format!(
                        "sequence {} belongs to more than one family",
                        member
                    )))
                }
                Some(flag) => *flag = true,
            }
        }
    }
    if let Some(missing) = seen.iter().position(|flag| !flag) {
        return Err(SurveyError::InvariantViolation(format!(
            "sequence {} is not in any family",
            missing
        )));
    }
    Ok(())
}

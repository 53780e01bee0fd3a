// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # **Index Module** - *Label Indexes and Outer Join*
//!
//! Ordered label keys for the rows and columns of labeled containers.
//!
//! ## Join contract
//! [`LabelIndex::join`] returns the combined index plus one position map per
//! side. A map entry of `None` is the "not present" sentinel: that output
//! label has no counterpart on that side, so the value is treated as missing.
//! A whole map of `None` means the side already matches the combined index
//! and needs no remap.
//!
//! Labels are cheap to clone. The label buffer sits behind an `Arc`, so an
//! index reused for a result shares storage with its source, observable via
//! [`LabelIndex::ptr_eq`].

use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::enums::error::OpsError;

/// A single row or column key.
///
/// `Timestamp` holds nanoseconds since the epoch. An index of only timestamps
/// is "all dates", which steers axis inference for table vs 1-D operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    Int(i64),
    Str(String),
    Timestamp(i64),
}

impl Label {
    #[inline]
    fn kind(&self) -> u8 {
        match self {
            Label::Int(_) => 0,
            Label::Str(_) => 1,
            Label::Timestamp(_) => 2,
        }
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Label::Int(v) => write!(f, "{}", v),
            Label::Str(s) => f.write_str(s),
            Label::Timestamp(v) => write!(f, "Timestamp({}ns)", v),
        }
    }
}

impl From<i64> for Label {
    fn from(v: i64) -> Self {
        Label::Int(v)
    }
}

impl From<i32> for Label {
    fn from(v: i32) -> Self {
        Label::Int(v as i64)
    }
}

impl From<usize> for Label {
    fn from(v: usize) -> Self {
        Label::Int(v as i64)
    }
}

impl From<&str> for Label {
    fn from(v: &str) -> Self {
        Label::Str(v.to_string())
    }
}

impl From<String> for Label {
    fn from(v: String) -> Self {
        Label::Str(v)
    }
}

/// Output of [`LabelIndex::join`].
#[derive(Debug, Clone)]
pub struct JoinResult {
    pub index: LabelIndex,
    pub left: Option<Vec<Option<usize>>>,
    pub right: Option<Vec<Option<usize>>>,
}

/// # LabelIndex
///
/// Ordered, possibly non-unique, row or column labels.
#[derive(Debug, Clone)]
pub struct LabelIndex {
    labels: Arc<Vec<Label>>,
}

impl LabelIndex {
    pub fn new(labels: Vec<Label>) -> Self {
        Self {
            labels: Arc::new(labels),
        }
    }

    /// `0, 1, .., n - 1`.
    pub fn range(n: usize) -> Self {
        Self::new((0..n as i64).map(Label::Int).collect())
    }

    /// Index of timestamp labels, in nanoseconds.
    pub fn timestamps(ticks: impl IntoIterator<Item = i64>) -> Self {
        Self::new(ticks.into_iter().map(Label::Timestamp).collect())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[inline]
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    #[inline]
    pub fn get(&self, i: usize) -> Option<&Label> {
        self.labels.get(i)
    }

    /// Element-wise label equality, including order.
    #[inline]
    pub fn equals(&self, other: &LabelIndex) -> bool {
        self.ptr_eq(other) || self.labels == other.labels
    }

    /// Whether both indexes share the same label buffer.
    #[inline]
    pub fn ptr_eq(&self, other: &LabelIndex) -> bool {
        Arc::ptr_eq(&self.labels, &other.labels)
    }

    /// True for a non-empty index of only timestamp labels.
    pub fn is_all_dates(&self) -> bool {
        !self.is_empty() && self.labels.iter().all(|l| matches!(l, Label::Timestamp(_)))
    }

    /// First position of `label`.
    pub fn position(&self, label: &Label) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Labels at the given positions. Absent positions are not allowed.
    pub fn take(&self, positions: &[usize]) -> LabelIndex {
        LabelIndex::new(positions.iter().map(|&i| self.labels[i].clone()).collect())
    }

    /// Same-kind labels have a total order, mixed kinds keep first-appearance order.
    fn orderable_with(&self, other: &LabelIndex) -> bool {
        let mut kinds = self.labels.iter().chain(other.labels.iter()).map(Label::kind);
        match kinds.next() {
            Some(first) => kinds.all(|k| k == first),
            None => true,
        }
    }

    /// Outer-joins two indexes.
    ///
    /// - Equal indexes short-circuit: the left index is reused, both maps are `None`.
    /// - The union is sorted when labels are mutually orderable, otherwise left
    ///   labels then unseen right labels in first-appearance order.
    /// - A label repeated on both sides yields every pairing of its positions.
    pub fn join(&self, other: &LabelIndex) -> JoinResult {
        if self.equals(other) {
            return JoinResult {
                index: self.clone(),
                left: None,
                right: None,
            };
        }

        let left_pos = positions_by_label(self);
        let right_pos = positions_by_label(other);

        let mut seen = HashSet::new();
        let mut keys: Vec<&Label> = self
            .labels
            .iter()
            .chain(other.labels.iter())
            .filter(|l| seen.insert(*l))
            .collect();
        if self.orderable_with(other) {
            keys.sort();
        }

        let mut labels = Vec::with_capacity(keys.len());
        let mut lmap = Vec::with_capacity(keys.len());
        let mut rmap = Vec::with_capacity(keys.len());
        let empty = Vec::new();
        for key in keys {
            let ls = left_pos.get(key).unwrap_or(&empty);
            let rs = right_pos.get(key).unwrap_or(&empty);
            match (ls.is_empty(), rs.is_empty()) {
                (false, false) => {
                    for &l in ls {
                        for &r in rs {
                            labels.push(key.clone());
                            lmap.push(Some(l));
                            rmap.push(Some(r));
                        }
                    }
                }
                (false, true) => {
                    for &l in ls {
                        labels.push(key.clone());
                        lmap.push(Some(l));
                        rmap.push(None);
                    }
                }
                (true, false) => {
                    for &r in rs {
                        labels.push(key.clone());
                        lmap.push(None);
                        rmap.push(Some(r));
                    }
                }
                (true, true) => {}
            }
        }

        let is_identity = |map: &[Option<usize>], n: usize| {
            map.len() == n && map.iter().enumerate().all(|(i, p)| *p == Some(i))
        };
        let left_identity = is_identity(&lmap, self.len());
        let right_identity = is_identity(&rmap, other.len());
        let index = if left_identity {
            self.clone()
        } else if right_identity {
            other.clone()
        } else {
            LabelIndex::new(labels)
        };
        JoinResult {
            index,
            left: if left_identity { None } else { Some(lmap) },
            right: if right_identity { None } else { Some(rmap) },
        }
    }

    /// Errors unless both indexes hold identical labels in the same order.
    pub fn ensure_identical(&self, other: &LabelIndex, what: &str) -> Result<(), OpsError> {
        if self.equals(other) {
            Ok(())
        } else {
            Err(OpsError::Validation {
                op: None,
                message: format!("Can only compare identically-labeled {}", what),
            })
        }
    }
}

fn positions_by_label(idx: &LabelIndex) -> HashMap<&Label, Vec<usize>> {
    let mut map: HashMap<&Label, Vec<usize>> = HashMap::with_capacity(idx.len());
    for (i, l) in idx.labels.iter().enumerate() {
        map.entry(l).or_default().push(i);
    }
    map
}

impl PartialEq for LabelIndex {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl<L: Into<Label>> FromIterator<L> for LabelIndex {
    fn from_iter<I: IntoIterator<Item = L>>(iter: I) -> Self {
        LabelIndex::new(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx(v: &[i64]) -> LabelIndex {
        v.iter().copied().collect()
    }

    #[test]
    fn test_equal_indexes_short_circuit() {
        let a = idx(&[3, 1, 2]);
        let b = idx(&[3, 1, 2]);
        let j = a.join(&b);
        assert!(j.index.ptr_eq(&a));
        assert!(j.left.is_none() && j.right.is_none());
    }

    #[test]
    fn test_outer_join_sorted_union() {
        let a = idx(&[0, 1]);
        let b = idx(&[1, 2]);
        let j = a.join(&b);
        assert_eq!(j.index, idx(&[0, 1, 2]));
        assert_eq!(j.left, Some(vec![Some(0), Some(1), None]));
        assert_eq!(j.right, Some(vec![None, Some(0), Some(1)]));
    }

    #[test]
    fn test_outer_join_disjoint() {
        let a: LabelIndex = ["a", "b"].into_iter().collect();
        let b: LabelIndex = ["c", "d"].into_iter().collect();
        let j = a.join(&b);
        assert_eq!(j.index.len(), 4);
        assert_eq!(j.left, Some(vec![Some(0), Some(1), None, None]));
        assert_eq!(j.right, Some(vec![None, None, Some(0), Some(1)]));
    }

    #[test]
    fn test_outer_join_subset_reuses_larger_side() {
        let a = idx(&[0, 1, 2]);
        let b = idx(&[1]);
        let j = a.join(&b);
        assert!(j.index.ptr_eq(&a));
        assert!(j.left.is_none());
        assert_eq!(j.right, Some(vec![None, Some(0), None]));
    }

    #[test]
    fn test_mixed_kinds_keep_first_appearance() {
        let a = LabelIndex::new(vec![Label::from("x"), Label::Int(1)]);
        let b = LabelIndex::new(vec![Label::Int(0), Label::from("x")]);
        let j = a.join(&b);
        assert_eq!(
            j.index.labels(),
            &[Label::from("x"), Label::Int(1), Label::Int(0)]
        );
    }

    #[test]
    fn test_duplicates_produce_cartesian_product() {
        let a = idx(&[1, 1]);
        let b = idx(&[1, 2]);
        let j = a.join(&b);
        assert_eq!(j.index, idx(&[1, 1, 2]));
        assert_eq!(j.left, Some(vec![Some(0), Some(1), None]));
        assert_eq!(j.right, Some(vec![Some(0), Some(0), Some(1)]));
    }

    #[test]
    fn test_all_dates() {
        assert!(LabelIndex::timestamps([1, 2]).is_all_dates());
        assert!(!idx(&[1]).is_all_dates());
        assert!(!LabelIndex::range(0).is_all_dates());
    }
}

//! FILENAME: labels/src/index.rs
//! PURPOSE: Ordered, unique label sequence with O(1) label -> position lookup.
//! CONTEXT: Each axis of a table or panel is an `Index`. Labels are immutable once
//! built; every operation that changes the label set returns a new `Index`.
//! Hierarchical indexes hold `Label::Tuple` labels of a fixed arity and carry
//! one optional name per level.

use std::ops::Range;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::IndexError;
use crate::label::Label;

/// Per-level names of a hierarchical index. Empty for flat indexes.
pub type LevelNames = SmallVec<[Option<String>; 4]>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "IndexRepr", into = "IndexRepr")]
pub struct Index {
    labels: Vec<Label>,
    lookup: FxHashMap<Label, usize>,
    name: Option<String>,
    level_names: LevelNames,
}

/// Serialized form: the lookup table is rebuilt (and uniqueness re-checked) on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexRepr {
    labels: Vec<Label>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    level_names: LevelNames,
}

impl TryFrom<IndexRepr> for Index {
    type Error = IndexError;

    fn try_from(repr: IndexRepr) -> Result<Self, Self::Error> {
        let mut index = if repr.level_names.is_empty() {
            Index::new(repr.labels)?
        } else {
            let tuples = repr
                .labels
                .into_iter()
                .map(|label| match label {
                    Label::Tuple(parts) => parts,
                    other => vec![other],
                })
                .collect();
            Index::from_tuples(tuples, repr.level_names)?
        };
        index.name = repr.name;
        Ok(index)
    }
}

impl From<Index> for IndexRepr {
    fn from(index: Index) -> Self {
        IndexRepr {
            labels: index.labels,
            name: index.name,
            level_names: index.level_names,
        }
    }
}

impl Index {
    /// Builds an index from labels, rejecting duplicates.
    pub fn new(labels: Vec<Label>) -> Result<Self, IndexError> {
        let mut lookup = FxHashMap::default();
        lookup.reserve(labels.len());
        for (pos, label) in labels.iter().enumerate() {
            if lookup.insert(label.clone(), pos).is_some() {
                return Err(IndexError::DuplicateLabel(label.to_string()));
            }
        }
        Ok(Index {
            labels,
            lookup,
            name: None,
            level_names: SmallVec::new(),
        })
    }

    /// Builds an index from anything convertible into labels.
    pub fn from_labels<I, L>(labels: I) -> Result<Self, IndexError>
    where
        I: IntoIterator<Item = L>,
        L: Into<Label>,
    {
        Self::new(labels.into_iter().map(Into::into).collect())
    }

    /// The default integer index 0..n-1.
    pub fn range(n: usize) -> Self {
        let labels: Vec<Label> = (0..n).map(|i| Label::Int(i as i64)).collect();
        let lookup = labels
            .iter()
            .enumerate()
            .map(|(pos, label)| (label.clone(), pos))
            .collect();
        Index {
            labels,
            lookup,
            name: None,
            level_names: SmallVec::new(),
        }
    }

    pub fn empty() -> Self {
        Self::range(0)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn set_level_names(&mut self, names: LevelNames) {
        self.level_names = names;
    }

    pub fn level_names(&self) -> &[Option<String>] {
        &self.level_names
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Label> {
        self.labels.iter()
    }

    pub fn get(&self, position: usize) -> Option<&Label> {
        self.labels.get(position)
    }

    pub fn first(&self) -> Option<&Label> {
        self.labels.first()
    }

    pub fn last(&self) -> Option<&Label> {
        self.labels.last()
    }

    /// Position of a label, if present.
    pub fn get_loc(&self, label: &Label) -> Option<usize> {
        self.lookup.get(label).copied()
    }

    /// Position of a label, failing with `KeyNotFound` if absent.
    pub fn loc(&self, label: &Label) -> Result<usize, IndexError> {
        self.get_loc(label)
            .ok_or_else(|| IndexError::KeyNotFound(label.to_string()))
    }

    pub fn contains(&self, label: &Label) -> bool {
        self.lookup.contains_key(label)
    }

    /// True when labels are strictly increasing (the index is unique, so
    /// non-decreasing and strictly increasing coincide).
    pub fn is_monotonic(&self) -> bool {
        self.labels.windows(2).all(|w| w[0] < w[1])
    }

    /// Label-wise equality, ignoring names.
    pub fn equals(&self, other: &Index) -> bool {
        self.labels == other.labels
    }

    /// Selects labels by position. Positions must be distinct and in bounds.
    pub fn take(&self, positions: &[usize]) -> Result<Index, IndexError> {
        let mut labels = Vec::with_capacity(positions.len());
        for &pos in positions {
            let label = self.labels.get(pos).ok_or(IndexError::OutOfBounds {
                position: pos,
                len: self.labels.len(),
            })?;
            labels.push(label.clone());
        }
        let mut result = Index::new(labels)?;
        result.name = self.name.clone();
        result.level_names = self.level_names.clone();
        Ok(result)
    }

    /// Contiguous sub-range of the index. Out-of-range bounds are clamped.
    pub fn slice(&self, range: Range<usize>) -> Index {
        let end = range.end.min(self.labels.len());
        let start = range.start.min(end);
        self.subset(self.labels[start..end].to_vec())
    }

    /// Keeps the labels whose mask entry is true.
    pub fn filter_mask(&self, mask: &[bool]) -> Index {
        let labels = self
            .labels
            .iter()
            .zip(mask.iter())
            .filter(|(_, keep)| **keep)
            .map(|(label, _)| label.clone())
            .collect();
        self.subset(labels)
    }

    /// Builds an index from a subset of this index's labels (already unique).
    pub(crate) fn subset(&self, labels: Vec<Label>) -> Index {
        let lookup = labels
            .iter()
            .enumerate()
            .map(|(pos, label)| (label.clone(), pos))
            .collect();
        Index {
            labels,
            lookup,
            name: self.name.clone(),
            level_names: self.level_names.clone(),
        }
    }

    /// Concatenation-union: this index's labels followed by the labels of
    /// `other` not already present, in their original order.
    pub fn append_unique(&self, other: &Index) -> Index {
        if self.equals(other) {
            return self.clone();
        }
        let mut labels = self.labels.clone();
        labels.extend(other.labels.iter().filter(|l| !self.contains(l)).cloned());
        self.subset(labels)
    }

    /// Set union. Follows `append_unique` ordering, then sorts when both
    /// inputs are monotonic so ordered axes (e.g. dates) stay ordered.
    pub fn union(&self, other: &Index) -> Index {
        if self.equals(other) {
            return self.clone();
        }
        let mut result = self.append_unique(other);
        if self.is_monotonic() && other.is_monotonic() {
            result.labels.sort();
            result = result.subset(result.labels.clone());
        }
        result
    }

    /// Labels present in both indexes, in this index's order.
    pub fn intersection(&self, other: &Index) -> Index {
        if self.equals(other) {
            return self.clone();
        }
        let labels = self
            .labels
            .iter()
            .filter(|l| other.contains(l))
            .cloned()
            .collect();
        self.subset(labels)
    }

    /// Start/end positions bounding labels in `[before, after]` on a sorted index.
    /// Missing bounds default to the ends of the index.
    pub fn slice_locs(
        &self,
        before: Option<&Label>,
        after: Option<&Label>,
    ) -> Result<(usize, usize), IndexError> {
        if !self.is_monotonic() {
            return Err(IndexError::NotMonotonic);
        }
        let start = match before {
            Some(label) => self.labels.partition_point(|l| l < label),
            None => 0,
        };
        let end = match after {
            Some(label) => self.labels.partition_point(|l| l <= label),
            None => self.labels.len(),
        };
        Ok((start, end.max(start)))
    }
}

impl PartialEq for Index {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl<'a> IntoIterator for &'a Index {
    type Item = &'a Label;
    type IntoIter = std::slice::Iter<'a, Label>;

    fn into_iter(self) -> Self::IntoIter {
        self.labels.iter()
    }
}

//! FILENAME: labels/src/indexer.rs
//! PURPOSE: Indexer computation between two label sets, and join/combine rules.
//! CONTEXT: An indexer maps each position of a target index to the position in a
//! source index that supplies its value, or `None` when the target label has no
//! source. Fill methods resolve `None` entries to the nearest preceding or
//! following source label, which is only meaningful on a sorted source axis.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::IndexError;
use crate::index::Index;

/// For each target position, the source position holding that label (or `None`).
pub type Indexer = Vec<Option<usize>>;

/// Policy for resolving target labels absent from the source index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FillMethod {
    /// Propagate the last valid observation forward ("pad" / "ffill").
    Pad,
    /// Use the next valid observation ("backfill" / "bfill").
    Backfill,
}

impl FromStr for FillMethod {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pad" | "ffill" => Ok(FillMethod::Pad),
            "backfill" | "bfill" => Ok(FillMethod::Backfill),
            other => Err(IndexError::InvalidFillMethod(other.to_string())),
        }
    }
}

/// How to combine two axes when aligning objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinHow {
    /// Caller's own axis.
    Left,
    /// The other object's axis.
    Right,
    /// Union of both axes.
    Outer,
    /// Intersection of both axes.
    Inner,
}

impl Default for JoinHow {
    fn default() -> Self {
        JoinHow::Left
    }
}

impl FromStr for JoinHow {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(JoinHow::Left),
            "right" => Ok(JoinHow::Right),
            "outer" => Ok(JoinHow::Outer),
            "inner" => Ok(JoinHow::Inner),
            other => Err(IndexError::InvalidJoin(other.to_string())),
        }
    }
}

impl Index {
    /// Computes the indexer that conforms this index to `target`.
    ///
    /// Without a method, labels absent from `self` map to `None`. With a fill
    /// method, an absent label maps to the nearest source position before
    /// (`Pad`) or after (`Backfill`) it in sort order; this requires `self`
    /// to be monotonic.
    pub fn get_indexer(
        &self,
        target: &Index,
        method: Option<FillMethod>,
    ) -> Result<Indexer, IndexError> {
        let Some(method) = method else {
            return Ok(target.iter().map(|label| self.get_loc(label)).collect());
        };

        if !self.is_monotonic() {
            return Err(IndexError::NotMonotonic);
        }

        let labels = self.labels();
        let indexer = target
            .iter()
            .map(|label| {
                if let Some(pos) = self.get_loc(label) {
                    return Some(pos);
                }
                // First source position whose label sorts after the target
                let insert_at = labels.partition_point(|l| l < label);
                match method {
                    FillMethod::Pad => insert_at.checked_sub(1),
                    FillMethod::Backfill => (insert_at < labels.len()).then_some(insert_at),
                }
            })
            .collect();
        Ok(indexer)
    }

    /// Resolves the joined axis of two objects for the requested join type.
    pub fn join(&self, other: &Index, how: JoinHow) -> Index {
        match how {
            JoinHow::Left => self.clone(),
            JoinHow::Right => other.clone(),
            JoinHow::Outer => self.union(other),
            JoinHow::Inner => self.intersection(other),
        }
    }
}

/// True when the indexer is the identity over a source of length `source_len`.
pub fn is_identity(indexer: &[Option<usize>], source_len: usize) -> bool {
    indexer.len() == source_len
        && indexer
            .iter()
            .enumerate()
            .all(|(pos, entry)| *entry == Some(pos))
}

/// Combines several indexes into one: the union of all of them, or the
/// intersection when `intersect` is set. An empty list yields an empty index.
pub fn combine_indexes(indexes: &[&Index], intersect: bool) -> Index {
    let Some((first, rest)) = indexes.split_first() else {
        return Index::empty();
    };
    rest.iter().fold((*first).clone(), |acc, index| {
        if intersect {
            acc.intersection(index)
        } else {
            acc.union(index)
        }
    })
}

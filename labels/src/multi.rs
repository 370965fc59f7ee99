//! FILENAME: labels/src/multi.rs
//! Hierarchical (multi-level) indexes.
//!
//! A hierarchical index is an `Index` whose labels are all `Label::Tuple` of the
//! same arity. Partial keys select the entries whose leading levels match.

use rustc_hash::FxHashSet;

use crate::error::IndexError;
use crate::index::{Index, LevelNames};
use crate::label::Label;

impl Index {
    /// Builds a hierarchical index from tuples of equal arity.
    pub fn from_tuples<N>(tuples: Vec<Vec<Label>>, names: N) -> Result<Self, IndexError>
    where
        N: IntoIterator<Item = Option<String>>,
    {
        let mut names: LevelNames = names.into_iter().collect();
        let nlevels = match tuples.first() {
            Some(first) => first.len(),
            None => names.len(),
        };
        if let Some(bad) = tuples.iter().find(|t| t.len() != nlevels) {
            return Err(IndexError::LevelMismatch {
                expected: nlevels,
                got: bad.len(),
            });
        }
        names.resize(nlevels, None);

        let labels = tuples.into_iter().map(Label::Tuple).collect();
        let mut index = Index::new(labels)?;
        index.set_level_names(names);
        Ok(index)
    }

    /// Cartesian product of the given level indexes, first level varying slowest.
    pub fn from_product(levels: &[&Index]) -> Result<Self, IndexError> {
        let mut tuples: Vec<Vec<Label>> = vec![Vec::new()];
        for level in levels {
            let mut next = Vec::with_capacity(tuples.len() * level.len());
            for prefix in &tuples {
                for label in level.iter() {
                    let mut tuple = prefix.clone();
                    tuple.push(label.clone());
                    next.push(tuple);
                }
            }
            tuples = next;
        }
        if levels.iter().any(|l| l.is_empty()) {
            tuples.clear();
        }
        let names = levels.iter().map(|l| l.name().map(str::to_string));
        Self::from_tuples(tuples, names)
    }

    pub fn is_hierarchical(&self) -> bool {
        !self.level_names().is_empty()
    }

    pub fn nlevels(&self) -> usize {
        if self.is_hierarchical() {
            self.level_names().len()
        } else {
            1
        }
    }

    /// The labels at one level, in index order (with repeats).
    pub fn level_values(&self, level: usize) -> Vec<Label> {
        self.iter()
            .filter_map(|label| label.level(level).cloned())
            .collect()
    }

    /// Positions of entries whose leading levels equal `key`.
    /// On a flat index a one-element key is an exact lookup.
    pub fn get_loc_partial(&self, key: &[Label]) -> Vec<usize> {
        if !self.is_hierarchical() {
            return match key {
                [single] => self.get_loc(single).into_iter().collect(),
                _ => Vec::new(),
            };
        }
        if key.len() == self.nlevels() {
            let full = Label::Tuple(key.to_vec());
            return self.get_loc(&full).into_iter().collect();
        }
        self.iter()
            .enumerate()
            .filter(|(_, label)| match label {
                Label::Tuple(parts) => parts.len() >= key.len() && parts[..key.len()] == *key,
                _ => false,
            })
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Drops up to `count` leading levels, always keeping at least one.
    /// When a single level remains the result is a flat index named after it.
    pub fn droplevels(&self, count: usize) -> Result<Index, IndexError> {
        if !self.is_hierarchical() {
            return Ok(self.clone());
        }
        let nlevels = self.nlevels();
        let drop = count.min(nlevels - 1);
        if drop == 0 {
            return Ok(self.clone());
        }
        let remaining: LevelNames = self.level_names()[drop..].iter().cloned().collect();
        let tuples: Vec<Vec<Label>> = self
            .iter()
            .map(|label| match label {
                Label::Tuple(parts) => parts[drop..].to_vec(),
                other => vec![other.clone()],
            })
            .collect();

        if remaining.len() == 1 {
            let labels = tuples.into_iter().flatten().collect();
            let mut index = Index::new(labels)?;
            if let Some(name) = remaining[0].clone() {
                index = index.with_name(name);
            }
            return Ok(index);
        }
        Index::from_tuples(tuples, remaining)
    }

    /// Distinct values of one level in first-appearance order.
    pub fn level_unique(&self, level: usize) -> Index {
        let mut seen = FxHashSet::default();
        let labels = self
            .level_values(level)
            .into_iter()
            .filter(|label| seen.insert(label.clone()))
            .collect();
        Index::empty().subset(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_level() -> Index {
        let tuples = vec![
            vec![Label::from("a"), Label::from(1)],
            vec![Label::from("a"), Label::from(2)],
            vec![Label::from("b"), Label::from(1)],
        ];
        Index::from_tuples(tuples, [Some("outer".to_string()), Some("inner".to_string())]).unwrap()
    }

    #[test]
    fn test_from_tuples_checks_arity() {
        let tuples = vec![vec![Label::from("a"), Label::from(1)], vec![Label::from("b")]];
        let err = Index::from_tuples(tuples, [None, None]).unwrap_err();
        assert_eq!(err, IndexError::LevelMismatch { expected: 2, got: 1 });
    }

    #[test]
    fn test_partial_lookup() {
        let index = two_level();
        assert!(index.is_hierarchical());
        assert_eq!(index.nlevels(), 2);
        assert_eq!(index.get_loc_partial(&[Label::from("a")]), vec![0, 1]);
        assert_eq!(index.get_loc_partial(&[Label::from("b"), Label::from(1)]), vec![2]);
        assert!(index.get_loc_partial(&[Label::from("z")]).is_empty());
    }

    #[test]
    fn test_droplevels_to_flat() {
        let index = two_level();
        let sub = index.take(&[0, 1]).unwrap();
        let dropped = sub.droplevels(1).unwrap();
        assert!(!dropped.is_hierarchical());
        assert_eq!(dropped, Index::from_labels([1, 2]).unwrap());
        assert_eq!(dropped.name(), Some("inner"));
    }

    #[test]
    fn test_from_product_order() {
        let major = Index::from_labels([0, 1]).unwrap().with_name("major");
        let minor = Index::from_labels(["x", "y"]).unwrap();
        let product = Index::from_product(&[&major, &minor]).unwrap();
        assert_eq!(product.len(), 4);
        assert_eq!(product.get(1), Some(&Label::from((0, "y"))));
        assert_eq!(product.level_names()[0].as_deref(), Some("major"));
        assert_eq!(product.level_unique(1), minor);
    }
}

//! FILENAME: panel/src/join.rs
//! PURPOSE: Joining panels along the items axis and in-place updates from
//! another panel.

use frame::{Plane, Value};
use labels::{Index, JoinHow};

use crate::error::{PanelError, Result};
use crate::panel::Panel;
use crate::reindex::ReindexArgs;

impl Panel {
    /// Joins the items of `other` onto this panel. Major and minor axes are
    /// resolved by `how`; overlapping items are renamed with the suffixes.
    pub fn join(&self, other: &Panel, how: JoinHow, lsuffix: &str, rsuffix: &str) -> Result<Panel> {
        let major = self.major_axis().join(other.major_axis(), how);
        let minor = self.minor_axis().join(other.minor_axis(), how);
        let this = self.conform_planes(&major, &minor)?;
        let that = other.conform_planes(&major, &minor)?;
        let store = this.store.merge(&that.store, lsuffix, rsuffix)?;
        log::debug!("[JOIN] {:?} join -> shape={:?}", how, store.shape());
        Ok(Panel::from_parts(store))
    }

    /// Concatenates several panels along items. `Left` keeps this panel's
    /// major and minor axes, `Outer` unions and `Inner` intersects them
    /// across all panels. Item labels must not repeat.
    pub fn join_many(&self, others: &[&Panel], how: JoinHow, lsuffix: &str, rsuffix: &str) -> Result<Panel> {
        if !lsuffix.is_empty() || !rsuffix.is_empty() {
            return Err(PanelError::SuffixWithMultiple);
        }
        let (major, minor) = match how {
            JoinHow::Right => {
                return Err(PanelError::UnsupportedJoin(
                    "right join across multiple panels".to_string(),
                ))
            }
            JoinHow::Left => (self.major_axis().clone(), self.minor_axis().clone()),
            JoinHow::Outer | JoinHow::Inner => {
                let fold = |start: &Index, pick: fn(&Panel) -> &Index| {
                    others.iter().fold(start.clone(), |acc, &p| match how {
                        JoinHow::Inner => acc.intersection(pick(p)),
                        _ => acc.union(pick(p)),
                    })
                };
                (
                    fold(self.major_axis(), Panel::major_axis),
                    fold(self.minor_axis(), Panel::minor_axis),
                )
            }
        };

        let mut store = self.conform_planes(&major, &minor)?.store;
        for other in others {
            store = store.merge(&other.conform_planes(&major, &minor)?.store, "", "")?;
        }
        log::debug!(
            "[JOIN] {} panels, {:?} join -> shape={:?}",
            others.len() + 1,
            how,
            store.shape()
        );
        Ok(Panel::from_parts(store))
    }

    fn conform_planes(&self, major: &Index, minor: &Index) -> Result<Panel> {
        self.reindex(ReindexArgs::new().major(major.clone()).minor(minor.clone()))
    }

    /// Overwrites cells of this panel with non-missing values of `other`,
    /// aligned on items. Each item follows the table update rules; nothing
    /// is modified when any item fails.
    pub fn update(
        &mut self,
        other: &Panel,
        join: JoinHow,
        overwrite: bool,
        filter_fn: Option<&dyn Fn(&Value) -> bool>,
        raise_conflict: bool,
    ) -> Result<()> {
        let other = other.reindex(ReindexArgs::new().items(self.items().clone()))?;
        let mut planes: Vec<Plane> = Vec::with_capacity(self.items().len());
        for pos in 0..self.items().len() {
            let mut frame = self.frame_at(pos)?;
            frame.update(&other.frame_at(pos)?, join, overwrite, filter_fn, raise_conflict)?;
            planes.push(frame.values()?);
        }
        self.store.replace_planes(planes)?;
        log::debug!("[UPDATE] {} items updated", self.items().len());
        Ok(())
    }
}

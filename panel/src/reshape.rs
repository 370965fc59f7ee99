//! FILENAME: panel/src/reshape.rs
//! PURPOSE: Conversions between the 3D wide layout and long (stacked)
//! tables, and lagging along the major or minor axis.

use frame::{Column, Frame};
use labels::{Index, Label};

use crate::axis::{AxisName, AxisRef};
use crate::error::{PanelError, Result};
use crate::panel::Panel;

impl Panel {
    /// Stacks the (major, minor) grid into rows, one column per item. The
    /// row index is two-level (major, minor). With `filter_observations`
    /// only pairs observed in every item are kept.
    pub fn to_frame(&self, filter_observations: bool) -> Result<Frame> {
        let [n_items, n_major, n_minor] = self.shape();
        let planes = self.store.planes();

        let mut keep = vec![true; n_major * n_minor];
        if filter_observations {
            for plane in planes {
                for (flag, missing) in keep.iter_mut().zip(plane.missing_mask()) {
                    *flag &= !missing;
                }
            }
        }

        let mut tuples = Vec::new();
        for (pos, _) in keep.iter().enumerate().filter(|(_, k)| **k) {
            let (j, k) = (pos / n_minor, pos % n_minor);
            if let (Some(major), Some(minor)) = (self.major_axis().get(j), self.minor_axis().get(k)) {
                tuples.push(vec![major.clone(), minor.clone()]);
            }
        }
        let names = [
            Some(self.major_axis().name().unwrap_or("major").to_string()),
            Some(self.minor_axis().name().unwrap_or("minor").to_string()),
        ];
        let index = Index::from_tuples(tuples, names)?;

        let mut columns = Vec::with_capacity(n_items);
        for plane in planes {
            let values = keep
                .iter()
                .enumerate()
                .filter(|(_, k)| **k)
                .map(|(pos, _)| plane.get(pos / n_minor, pos % n_minor))
                .collect();
            columns.push(Column::from_values(values).cast(plane.dtype())?);
        }
        Ok(Frame::new(index, self.items().clone(), columns)?)
    }

    /// Lags values along `axis` by `lags` positions. Positions shifted past
    /// either end are dropped from both the values and the labels, so the
    /// axis shrinks by `|lags|`: with a positive lag, label `t` carries the
    /// values formerly at `t - lags`.
    pub fn shift(&self, lags: i64, axis: impl Into<AxisRef>) -> Result<Panel> {
        let axis = AxisName::resolve(axis)?;
        if axis == AxisName::Items {
            return Err(PanelError::InvalidAxis(format!("cannot shift along {}", axis)));
        }
        if lags == 0 {
            return Ok(self.clone());
        }
        let n = self.axis(axis).len();
        let lag = (lags.unsigned_abs() as usize).min(n);
        let (values, labels) = if lags > 0 {
            (0..n - lag, lag..n)
        } else {
            (lag..n, 0..n - lag)
        };
        let index = self.axis(axis).slice(labels);
        let indexer: Vec<Option<usize>> = values.map(Some).collect();
        Ok(Panel::from_parts(self.store.reindex_axis(axis, index, &indexer)?))
    }
}

/// A two-level (time, panel) index for long-format tables. A sequence with
/// no repeated labels is tiled or repeated against the sorted unique labels
/// of the other, so `panel_index(&[1960, 1961], &["A", "B"])` pairs every
/// year with every panel, time varying fastest.
pub fn panel_index(time: &[Label], panels: &[Label], names: [&str; 2]) -> Result<Index> {
    let u_time = sorted_unique(time);
    let u_panels = sorted_unique(panels);

    let time: Vec<Label> = if u_time.len() == time.len() {
        (0..u_panels.len()).flat_map(|_| u_time.iter().cloned()).collect()
    } else {
        time.to_vec()
    };
    let panels: Vec<Label> = if u_panels.len() == panels.len() {
        u_panels
            .iter()
            .flat_map(|p| std::iter::repeat(p.clone()).take(u_time.len()))
            .collect()
    } else {
        panels.to_vec()
    };

    if time.len() != panels.len() {
        return Err(PanelError::LengthMismatch(format!(
            "time has {} labels, panels has {}",
            time.len(),
            panels.len()
        )));
    }
    let tuples = time.into_iter().zip(panels).map(|(t, p)| vec![t, p]).collect();
    let names = names.map(|n| Some(n.to_string()));
    Ok(Index::from_tuples(tuples, names)?)
}

fn sorted_unique(labels: &[Label]) -> Vec<Label> {
    let mut unique = labels.to_vec();
    unique.sort();
    unique.dedup();
    unique
}

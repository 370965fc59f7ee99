//! FILENAME: tests/common/mod.rs
//! Fixtures shared by the panel integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;

use panel::{Frame, Index, Label, Panel, PanelAxes, Value};

/// Builds panels and tables for the scenario tests.
pub struct PanelHarness;

impl PanelHarness {
    /// A 2x2 table indexed 0..1 with columns a, b, filled row-major from `values`.
    pub fn table(values: [f64; 4]) -> Frame {
        Frame::from_columns(
            Index::range(2),
            vec![
                ("a", frame::Column::from(vec![values[0], values[2]])),
                ("b", frame::Column::from(vec![values[1], values[3]])),
            ],
        )
        .unwrap()
    }

    /// Items x and y over the given tables.
    pub fn from_tables(x: Frame, y: Frame) -> Panel {
        let mut data = BTreeMap::new();
        data.insert(Label::from("x"), x);
        data.insert(Label::from("y"), y);
        Panel::from_dict(data, &Default::default()).unwrap()
    }

    /// Items x and y, major 2000..2002, minor a and b, values 1..12.
    pub fn yearly() -> Panel {
        Panel::from_shape_vec(
            &[2, 3, 2],
            (1..=12).map(f64::from).collect(),
            PanelAxes::new()
                .items(Index::from_labels(["x", "y"]).unwrap())
                .major(Index::from_labels([2000, 2001, 2002]).unwrap())
                .minor(Index::from_labels(["a", "b"]).unwrap()),
        )
        .unwrap()
    }

    /// A float panel of the given shape with deterministic values and a
    /// missing cell every `hole_every` positions (none when zero).
    pub fn dense(shape: [usize; 3], hole_every: usize) -> Panel {
        let n = shape.iter().product::<usize>();
        let data = (0..n)
            .map(|v| {
                if hole_every > 0 && v % hole_every == hole_every - 1 {
                    f64::NAN
                } else {
                    (v as f64 * 0.37).sin() * 100.0
                }
            })
            .collect();
        Panel::from_shape_vec(&shape, data, PanelAxes::new()).unwrap()
    }
}

pub fn cell(panel: &Panel, item: impl Into<Label>, major: impl Into<Label>, minor: impl Into<Label>) -> Value {
    panel
        .get_value(&item.into(), &major.into(), &minor.into())
        .unwrap()
}

/// Missing-aware equality of every cell of two equally shaped panels.
pub fn same_cells(left: &Panel, right: &Panel) -> bool {
    if left.shape() != right.shape() {
        return false;
    }
    let (l, r) = (left.values().unwrap(), right.values().unwrap());
    let [n0, n1, n2] = left.shape();
    (0..n0).all(|i| (0..n1).all(|j| (0..n2).all(|k| l.get(i, j, k).same_as(&r.get(i, j, k)))))
}

//! Per‑axis coordinate arrays and axis‑name helpers.

use std::collections::HashSet;

use crate::error::{Error, Result};

/// Suffixes used for the first three synthesized axis names.
const CARTESIAN_SUFFIXES: [&str; 3] = ["X", "Y", "Z"];

/// Coordinate arrays for a set of axes, one column per axis. Every column
/// has the same length.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AxisArrays {
    /// Axis names, parallel to `columns`.
    axes: Vec<String>,
    /// One array of coordinates per axis.
    columns: Vec<Vec<f64>>,
}

impl AxisArrays {
    /// Build arrays from parallel axis names and columns.
    pub fn new(axes: Vec<String>, columns: Vec<Vec<f64>>) -> Self {
        debug_assert_eq!(axes.len(), columns.len(), "axis/column count mismatch");
        debug_assert!(
            columns.windows(2).all(|w| w[0].len() == w[1].len()),
            "ragged axis columns"
        );
        Self { axes, columns }
    }

    /// Axis names in column order.
    pub fn axes(&self) -> &[String] {
        &self.axes
    }

    /// Column for a named axis.
    pub fn get(&self, axis: &str) -> Option<&[f64]> {
        self.axes
            .iter()
            .position(|a| a == axis)
            .map(|i| self.columns[i].as_slice())
    }

    /// Column by position.
    pub fn column(&self, index: usize) -> &[f64] {
        &self.columns[index]
    }

    /// Iterate `(axis, column)` pairs in axis order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.axes
            .iter()
            .map(String::as_str)
            .zip(self.columns.iter().map(Vec::as_slice))
    }

    /// Number of samples held for each axis.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    /// True when no samples are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fail with [`Error::DuplicateAxis`] on the first repeated name.
pub fn ensure_unique<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(Error::DuplicateAxis(name.to_string()));
        }
    }
    Ok(())
}

/// Derive `count` axis names from a single base name.
///
/// One axis keeps the bare name. Several axes get `_X`, `_Y` and `_Z`
/// suffixes, then their 1‑based ordinal from the fourth onwards.
pub fn synthesize(name: &str, count: usize) -> Vec<String> {
    if count == 1 {
        return vec![name.to_string()];
    }
    (0..count)
        .map(|i| match CARTESIAN_SUFFIXES.get(i) {
            Some(suffix) => format!("{name}_{suffix}"),
            None => format!("{name}_{}", i + 1),
        })
        .collect()
}

/// Expand a unit list to one unit per axis. A single unit applies to every
/// axis.
pub fn broadcast_units(units: &[String], axes: usize) -> Result<Vec<String>> {
    match units {
        [unit] => Ok(vec![unit.clone(); axes]),
        _ if units.len() == axes => Ok(units.to_vec()),
        _ => Err(Error::DimensionMismatch(format!(
            "{} units given for {axes} axes",
            units.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesized_names() {
        assert_eq!(synthesize("x", 1), vec!["x"]);
        assert_eq!(synthesize("XYLine", 2), vec!["XYLine_X", "XYLine_Y"]);
        assert_eq!(
            synthesize("5DScan", 5),
            vec!["5DScan_X", "5DScan_Y", "5DScan_Z", "5DScan_4", "5DScan_5"]
        );
    }

    #[test]
    fn duplicates() {
        assert!(ensure_unique(["x", "y", "z"]).is_ok());
        match ensure_unique(["x", "y", "x"]) {
            Err(Error::DuplicateAxis(name)) => assert_eq!(name, "x"),
            other => panic!("expected duplicate axis error, got {other:?}"),
        }
    }

    #[test]
    fn units() -> Result<()> {
        assert_eq!(broadcast_units(&["mm".into()], 2)?, vec!["mm", "mm"]);
        assert_eq!(
            broadcast_units(&["cm".into(), "mm".into()], 2)?,
            vec!["cm", "mm"]
        );
        assert!(broadcast_units(&["a".into(), "b".into(), "c".into()], 2).is_err());
        Ok(())
    }

    #[test]
    fn arrays() {
        let a = AxisArrays::new(
            vec!["x".into(), "y".into()],
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
        );
        assert_eq!(a.len(), 2);
        assert_eq!(a.get("y"), Some(&[3.0, 4.0][..]));
        assert_eq!(a.get("z"), None);
        assert_eq!(a.iter().map(|(n, _)| n).collect::<Vec<_>>(), vec!["x", "y"]);
    }
}

//! Immutable sample produced by generators.

use std::collections::BTreeMap;

use smallvec::SmallVec;

/// Mapping from axis name to a coordinate on that axis.
pub type AxisValues = BTreeMap<String, f64>;

/// Per‑dimension sample indices of a point.
pub type Indexes = SmallVec<[usize; 4]>;

/// One sample of a scan: a position on every axis, the cell boundaries
/// around it, and its location in the unmasked index space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Point {
    /// Coordinate of the sample on each axis.
    positions: AxisValues,
    /// Boundary through which the scan enters the sample's cell.
    lower: AxisValues,
    /// Boundary through which the scan leaves the sample's cell.
    upper: AxisValues,
    /// One index per dimension of the scan.
    indexes: Indexes,
}

impl Point {
    /// Create a new `Point` from its parts.
    pub fn new(
        positions: AxisValues,
        lower: AxisValues,
        upper: AxisValues,
        indexes: Indexes,
    ) -> Self {
        Self {
            positions,
            lower,
            upper,
            indexes,
        }
    }

    /// Coordinate of this sample on each axis.
    pub fn positions(&self) -> &AxisValues {
        &self.positions
    }

    /// Lower cell boundary on each axis.
    pub fn lower(&self) -> &AxisValues {
        &self.lower
    }

    /// Upper cell boundary on each axis.
    pub fn upper(&self) -> &AxisValues {
        &self.upper
    }

    /// Index of this sample in every dimension of the scan.
    pub fn indexes(&self) -> &[usize] {
        &self.indexes
    }

    /// Position on a single axis.
    pub fn position(&self, axis: &str) -> Option<f64> {
        self.positions.get(axis).copied()
    }

    /// Return a copy of this point with `positions` replaced. Bounds and
    /// indexes are kept as they are.
    pub fn with_positions(self, positions: AxisValues) -> Self {
        Self { positions, ..self }
    }
}

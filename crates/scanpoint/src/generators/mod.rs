//! Point generators and the [`Generator`] trait they share.
//!
//! Every generator is described by a pure function from a (possibly
//! fractional) sample index to a coordinate on each of its axes. Positions
//! are that function evaluated at `0..size`, bounds at `i - 0.5` for
//! `i` in `0..=size`, so the bounds of sample `i` are `bounds[i]` and
//! `bounds[i + 1]`.

use std::{collections::BTreeMap, f64::consts::PI, iter::FusedIterator};

use smallvec::SmallVec;

use crate::{
    axes::AxisArrays,
    cache::Cached,
    dict::{Dict, Serializable, TypeTag},
    error::{Error, Result},
    point::{AxisValues, Indexes, Point},
    registry,
};

/// Explicit list of positions.
pub mod array;
/// Lissajous figures.
pub mod lissajous;
/// Straight lines over one or more axes.
pub mod line;
/// Fermat spirals.
pub mod spiral;

pub use self::{
    array::ArrayGenerator, line::LineGenerator, lissajous::LissajousGenerator,
    spiral::SpiralGenerator,
};

/// Shape of a generator's contribution to the index space.
pub type IndexDims = SmallVec<[usize; 4]>;

/// Storage for the arrays computed by `prepare_positions` and
/// `prepare_bounds`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArrayCache {
    /// Coordinates of every sample.
    positions: Cached<AxisArrays>,
    /// Coordinates of every cell boundary; one longer than `positions`.
    bounds: Cached<AxisArrays>,
}

/// Common interface of all point generators.
pub trait Generator {
    /// Axis names, unique within the generator.
    fn axes(&self) -> &[String];

    /// Unit of each axis, parallel to [`Generator::axes`].
    fn units(&self) -> &[String];

    /// Size of each index dimension this generator introduces.
    fn index_dims(&self) -> IndexDims;

    /// Label of each index dimension.
    fn index_names(&self) -> Vec<String>;

    /// Whether the generator was asked to alternate direction.
    fn alternate_direction(&self) -> bool;

    /// Coordinates on every axis at each of the given sample indices.
    fn arrays_at(&self, index: &[f64]) -> AxisArrays;

    /// Prepared array storage.
    fn cache(&self) -> &ArrayCache;

    /// Mutable prepared array storage.
    fn cache_mut(&mut self) -> &mut ArrayCache;

    /// Whether a compound scan reverses this generator on alternate passes.
    fn alternates(&self) -> bool {
        self.alternate_direction()
    }

    /// Total number of samples.
    fn size(&self) -> usize {
        self.index_dims().iter().product()
    }

    /// Axis to unit mapping.
    fn units_by_axis(&self) -> BTreeMap<String, String> {
        self.axes()
            .iter()
            .cloned()
            .zip(self.units().iter().cloned())
            .collect()
    }

    /// Compute and cache the sample coordinates. Repeated calls reuse the
    /// cached arrays.
    fn prepare_positions(&mut self) {
        if self.cache().positions.is_set() {
            return;
        }
        let index: Vec<f64> = (0..self.size()).map(|i| i as f64).collect();
        let arrays = self.arrays_at(&index);
        tracing::trace!(axes = ?self.axes(), samples = arrays.len(), "prepared positions");
        self.cache_mut().positions.set(arrays);
    }

    /// Compute and cache the cell boundary coordinates.
    fn prepare_bounds(&mut self) {
        if self.cache().bounds.is_set() {
            return;
        }
        let index: Vec<f64> = (0..=self.size()).map(|i| i as f64 - 0.5).collect();
        let arrays = self.arrays_at(&index);
        tracing::trace!(axes = ?self.axes(), bounds = arrays.len(), "prepared bounds");
        self.cache_mut().bounds.set(arrays);
    }

    /// Prepared sample coordinates.
    fn positions(&self) -> Result<&AxisArrays> {
        self.cache().positions.get().ok_or(Error::NotPrepared {
            operation: "positions",
            step: "prepare_positions",
        })
    }

    /// Prepared boundary coordinates.
    fn bounds(&self) -> Result<&AxisArrays> {
        self.cache().bounds.get().ok_or(Error::NotPrepared {
            operation: "bounds",
            step: "prepare_bounds",
        })
    }

    /// Iterate the points of this generator alone. Each call starts a fresh
    /// traversal over the prepared arrays.
    fn iterator(&self) -> Result<GeneratorPoints<'_>> {
        let positions = self.cache().positions.get().ok_or(Error::NotPrepared {
            operation: "iterator",
            step: "prepare_positions",
        })?;
        let bounds = self.cache().bounds.get().ok_or(Error::NotPrepared {
            operation: "iterator",
            step: "prepare_bounds",
        })?;
        Ok(GeneratorPoints {
            positions,
            bounds,
            dims: self.index_dims(),
            next: 0,
        })
    }
}

/// Lazy sequence of the points of a single generator.
#[derive(Clone, Debug)]
pub struct GeneratorPoints<'a> {
    /// Prepared sample coordinates.
    positions: &'a AxisArrays,
    /// Prepared boundary coordinates.
    bounds: &'a AxisArrays,
    /// Shape used to unravel the flat sample index.
    dims: IndexDims,
    /// Next sample to produce.
    next: usize,
}

impl Iterator for GeneratorPoints<'_> {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        let i = self.next;
        if i >= self.positions.len() {
            return None;
        }
        self.next += 1;
        let positions: AxisValues = self
            .positions
            .iter()
            .map(|(axis, column)| (axis.to_string(), column[i]))
            .collect();
        let lower = self.bounds.iter().map(|(a, c)| (a.to_string(), c[i])).collect();
        let upper = self.bounds.iter().map(|(a, c)| (a.to_string(), c[i + 1])).collect();
        Some(Point::new(positions, lower, upper, unravel(i, &self.dims)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.positions.len().saturating_sub(self.next);
        (left, Some(left))
    }
}

impl ExactSizeIterator for GeneratorPoints<'_> {}

impl FusedIterator for GeneratorPoints<'_> {}

/// Split a flat row‑major index into one index per dimension.
pub fn unravel(mut flat: usize, dims: &[usize]) -> Indexes {
    let mut out: Indexes = SmallVec::from_elem(0, dims.len());
    for (slot, &dim) in out.iter_mut().zip(dims).rev() {
        if dim > 0 {
            *slot = flat % dim;
            flat /= dim;
        }
    }
    out
}

/// Sample `index` along a closed curve with `count` evenly spaced samples
/// per revolution, returning the curve parameter in radians.
pub(crate) fn turn(index: f64, count: usize) -> f64 {
    index * 2.0 * PI / count as f64
}

/// Any of the generators this crate provides.
#[derive(Clone, Debug, PartialEq)]
pub enum ScanGenerator {
    /// Straight line over one or more axes.
    Line(LineGenerator),
    /// Fermat spiral over two axes.
    Spiral(SpiralGenerator),
    /// Lissajous figure over two axes.
    Lissajous(LissajousGenerator),
    /// Explicit positions on one axis.
    Array(ArrayGenerator),
}

/// Forward a method call to the wrapped generator.
macro_rules! dispatch {
    ($self:expr, $g:ident => $call:expr) => {
        match $self {
            ScanGenerator::Line($g) => $call,
            ScanGenerator::Spiral($g) => $call,
            ScanGenerator::Lissajous($g) => $call,
            ScanGenerator::Array($g) => $call,
        }
    };
}

impl ScanGenerator {
    /// Versioned type tag of the wrapped generator.
    pub fn typeid(&self) -> &'static str {
        match self {
            Self::Line(_) => LineGenerator::TYPEID,
            Self::Spiral(_) => SpiralGenerator::TYPEID,
            Self::Lissajous(_) => LissajousGenerator::TYPEID,
            Self::Array(_) => ArrayGenerator::TYPEID,
        }
    }
}

impl Generator for ScanGenerator {
    fn axes(&self) -> &[String] {
        dispatch!(self, g => g.axes())
    }
    fn units(&self) -> &[String] {
        dispatch!(self, g => g.units())
    }
    fn index_dims(&self) -> IndexDims {
        dispatch!(self, g => g.index_dims())
    }
    fn index_names(&self) -> Vec<String> {
        dispatch!(self, g => g.index_names())
    }
    fn alternate_direction(&self) -> bool {
        dispatch!(self, g => g.alternate_direction())
    }
    fn alternates(&self) -> bool {
        dispatch!(self, g => g.alternates())
    }
    fn arrays_at(&self, index: &[f64]) -> AxisArrays {
        dispatch!(self, g => g.arrays_at(index))
    }
    fn cache(&self) -> &ArrayCache {
        dispatch!(self, g => g.cache())
    }
    fn cache_mut(&mut self) -> &mut ArrayCache {
        dispatch!(self, g => g.cache_mut())
    }
}

impl Serializable for ScanGenerator {
    fn to_dict(&self) -> Dict {
        dispatch!(self, g => g.to_dict())
    }

    fn from_dict(dict: &Dict) -> Result<Self> {
        registry::generator_from_dict(dict)
    }
}

impl From<LineGenerator> for ScanGenerator {
    fn from(g: LineGenerator) -> Self {
        Self::Line(g)
    }
}

impl From<SpiralGenerator> for ScanGenerator {
    fn from(g: SpiralGenerator) -> Self {
        Self::Spiral(g)
    }
}

impl From<LissajousGenerator> for ScanGenerator {
    fn from(g: LissajousGenerator) -> Self {
        Self::Lissajous(g)
    }
}

impl From<ArrayGenerator> for ScanGenerator {
    fn from(g: ArrayGenerator) -> Self {
        Self::Array(g)
    }
}

use serde::Deserialize;
use serde_json::json;
use smallvec::smallvec;

use super::{ArrayCache, Generator, IndexDims};
use crate::{
    axes::AxisArrays,
    dict::{self, Dict, Serializable, TypeTag},
    error::{Error, Result},
};

/// Explicit positions on a single axis.
///
/// Bounds are placed halfway between neighbouring points and extrapolated by
/// half the adjacent gap at either end.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayGenerator {
    /// Axis name, held as a one‑element list.
    axes: Vec<String>,
    /// Unit, held as a one‑element list.
    units: Vec<String>,
    /// Sample coordinates in traversal order.
    points: Vec<f64>,
    /// Reverse on alternate passes of an enclosing scan.
    alternate_direction: bool,
    /// Prepared arrays.
    cache: ArrayCache,
}

/// Serialized fields of an array generator.
#[derive(Deserialize)]
struct ArrayFields {
    /// Axis name.
    axis: String,
    /// Unit.
    units: String,
    /// Positions.
    points: Vec<f64>,
    /// Snake flag.
    #[serde(default)]
    alternate_direction: bool,
}

impl ArrayGenerator {
    /// A generator visiting `points` on `axis`.
    pub fn new(axis: &str, units: &str, points: &[f64]) -> Result<Self> {
        Self::build(axis.to_string(), units.to_string(), points.to_vec())
    }

    /// Set whether the generator reverses on alternate passes.
    pub fn alternating(mut self, alternate: bool) -> Self {
        self.alternate_direction = alternate;
        self
    }

    /// Validate parameters.
    fn build(axis: String, units: String, points: Vec<f64>) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::NonPositive {
                field: "points",
                value: 0.0,
            });
        }
        if points.iter().any(|p| !p.is_finite()) {
            return Err(Error::InvalidParameter {
                field: "points",
                reason: "positions must be finite".into(),
            });
        }
        Ok(Self {
            axes: vec![axis],
            units: vec![units],
            points,
            alternate_direction: false,
            cache: ArrayCache::default(),
        })
    }

    /// Sample coordinates.
    pub fn points(&self) -> &[f64] {
        &self.points
    }

    /// Coordinate at a fractional index, linear between neighbours and
    /// extrapolated from the end segments.
    fn interpolate(&self, index: f64) -> f64 {
        let n = self.points.len();
        if index.fract() == 0.0 && index >= 0.0 && (index as usize) < n {
            return self.points[index as usize];
        }
        if n == 1 {
            return self.points[0];
        }
        let lo = (index.floor().max(0.0) as usize).min(n - 2);
        let (a, b) = (self.points[lo], self.points[lo + 1]);
        a + (index - lo as f64) * (b - a)
    }
}

impl Generator for ArrayGenerator {
    fn axes(&self) -> &[String] {
        &self.axes
    }

    fn units(&self) -> &[String] {
        &self.units
    }

    fn index_dims(&self) -> IndexDims {
        smallvec![self.points.len()]
    }

    fn index_names(&self) -> Vec<String> {
        self.axes.clone()
    }

    fn alternate_direction(&self) -> bool {
        self.alternate_direction
    }

    fn arrays_at(&self, index: &[f64]) -> AxisArrays {
        let column = index.iter().map(|&i| self.interpolate(i)).collect();
        AxisArrays::new(self.axes.clone(), vec![column])
    }

    fn cache(&self) -> &ArrayCache {
        &self.cache
    }

    fn cache_mut(&mut self) -> &mut ArrayCache {
        &mut self.cache
    }
}

impl TypeTag for ArrayGenerator {
    const TYPEID: &'static str = "scanpointgenerator:generator/ArrayGenerator:1.0";
    const LEGACY: &'static [&'static str] = &["ArrayGenerator"];
}

impl Serializable for ArrayGenerator {
    fn to_dict(&self) -> Dict {
        dict::tagged(
            Self::TYPEID,
            [
                ("axis", json!(self.axes[0])),
                ("units", json!(self.units[0])),
                ("points", json!(self.points)),
                ("alternate_direction", json!(self.alternate_direction)),
            ],
        )
    }

    fn from_dict(dict: &Dict) -> Result<Self> {
        let f: ArrayFields = dict::fields(Self::TYPEID, dict)?;
        Ok(Self::build(f.axis, f.units, f.points)?.alternating(f.alternate_direction))
    }
}

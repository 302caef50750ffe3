use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};
use serde_json::json;
use smallvec::smallvec;

use super::{ArrayCache, Generator, IndexDims, turn};
use crate::{
    axes::{self, AxisArrays},
    dict::{self, Dict, Serializable, TypeTag},
    error::{self, Error, Result},
};

/// Number of samples per lobe when no explicit count is given.
const POINTS_PER_LOBE: usize = 250;

/// Rectangle a Lissajous figure is inscribed in.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Centre of the rectangle.
    pub centre: [f64; 2],
    /// Extent along the first axis.
    pub width: f64,
    /// Extent along the second axis.
    pub height: f64,
}

/// Samples along a closed Lissajous curve filling a bounding box.
///
/// With `L` lobes the curve traces `x = sin(L·t + π/2)` against
/// `y = sin((L + 1)·t)` for one full revolution of `t`, scaled to the box.
#[derive(Clone, Debug, PartialEq)]
pub struct LissajousGenerator {
    /// The x and y axis names.
    axes: Vec<String>,
    /// Unit per axis.
    units: Vec<String>,
    /// Box the curve fills.
    bounding_box: BoundingBox,
    /// Number of lobes.
    num_lobes: usize,
    /// Number of samples over one revolution.
    num_points: usize,
    /// Reverse on alternate passes of an enclosing scan.
    alternate_direction: bool,
    /// Prepared arrays.
    cache: ArrayCache,
}

/// Serialized fields of a Lissajous curve.
#[derive(Deserialize)]
struct LissajousFields {
    /// Axis names.
    axes: Vec<String>,
    /// Unit per axis.
    units: Vec<String>,
    /// Bounding box.
    #[serde(rename = "box")]
    bounding_box: BoundingBox,
    /// Lobe count.
    num_lobes: usize,
    /// Sample count; derived from the lobe count when absent.
    #[serde(default)]
    num_points: Option<usize>,
    /// Snake flag.
    #[serde(default)]
    alternate_direction: bool,
}

impl LissajousGenerator {
    /// A curve with `num_lobes` lobes over `axes`. `num_points` defaults to
    /// 250 samples per lobe.
    pub fn new(
        axes: [&str; 2],
        units: &[&str],
        bounding_box: BoundingBox,
        num_lobes: usize,
        num_points: Option<usize>,
    ) -> Result<Self> {
        Self::build(
            axes.iter().map(ToString::to_string).collect(),
            units.iter().map(ToString::to_string).collect(),
            bounding_box,
            num_lobes,
            num_points,
        )
    }

    /// Set whether the curve reverses on alternate passes.
    pub fn alternating(mut self, alternate: bool) -> Self {
        self.alternate_direction = alternate;
        self
    }

    /// Validate parameters.
    fn build(
        axes: Vec<String>,
        units: Vec<String>,
        bounding_box: BoundingBox,
        num_lobes: usize,
        num_points: Option<usize>,
    ) -> Result<Self> {
        if axes.len() != 2 {
            return Err(Error::DimensionMismatch(format!(
                "a Lissajous curve needs 2 axes, got {}",
                axes.len()
            )));
        }
        axes::ensure_unique(axes.iter().map(String::as_str))?;
        let units = axes::broadcast_units(&units, axes.len())?;
        error::require_positive("width", bounding_box.width)?;
        error::require_positive("height", bounding_box.height)?;
        if bounding_box.centre.iter().any(|c| !c.is_finite()) {
            return Err(Error::InvalidParameter {
                field: "centre",
                reason: "coordinates must be finite".into(),
            });
        }
        if num_lobes == 0 {
            return Err(Error::NonPositive {
                field: "num_lobes",
                value: 0.0,
            });
        }
        let num_points = match num_points {
            Some(0) => {
                return Err(Error::NonPositive {
                    field: "num_points",
                    value: 0.0,
                });
            }
            Some(n) => n,
            None => num_lobes.checked_mul(POINTS_PER_LOBE).ok_or_else(|| {
                Error::InvalidParameter {
                    field: "num_lobes",
                    reason: "too many lobes".into(),
                }
            })?,
        };

        Ok(Self {
            axes,
            units,
            bounding_box,
            num_lobes,
            num_points,
            alternate_direction: false,
            cache: ArrayCache::default(),
        })
    }

    /// Box the curve fills.
    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    /// Number of lobes.
    pub fn num_lobes(&self) -> usize {
        self.num_lobes
    }

    /// Number of samples.
    pub fn num_points(&self) -> usize {
        self.num_points
    }
}

impl Generator for LissajousGenerator {
    fn axes(&self) -> &[String] {
        &self.axes
    }

    fn units(&self) -> &[String] {
        &self.units
    }

    fn index_dims(&self) -> IndexDims {
        smallvec![self.num_points]
    }

    fn index_names(&self) -> Vec<String> {
        vec![format!("{}_Lissajous", self.axes.join("_"))]
    }

    fn alternate_direction(&self) -> bool {
        self.alternate_direction
    }

    fn arrays_at(&self, index: &[f64]) -> AxisArrays {
        let BoundingBox {
            centre: [cx, cy],
            width,
            height,
        } = self.bounding_box;
        let a = self.num_lobes as f64;
        let b = a + 1.0;
        let (x, y): (Vec<f64>, Vec<f64>) = index
            .iter()
            .map(|&i| {
                let t = turn(i, self.num_points);
                (
                    cx + width / 2.0 * (a * t + FRAC_PI_2).sin(),
                    cy + height / 2.0 * (b * t).sin(),
                )
            })
            .unzip();
        AxisArrays::new(self.axes.clone(), vec![x, y])
    }

    fn cache(&self) -> &ArrayCache {
        &self.cache
    }

    fn cache_mut(&mut self) -> &mut ArrayCache {
        &mut self.cache
    }
}

impl TypeTag for LissajousGenerator {
    const TYPEID: &'static str = "scanpointgenerator:generator/LissajousGenerator:1.0";
    const LEGACY: &'static [&'static str] = &["LissajousGenerator"];
}

impl Serializable for LissajousGenerator {
    fn to_dict(&self) -> Dict {
        dict::tagged(
            Self::TYPEID,
            [
                ("axes", json!(self.axes)),
                ("units", json!(self.units)),
                ("box", json!(self.bounding_box)),
                ("num_lobes", json!(self.num_lobes)),
                ("num_points", json!(self.num_points)),
                ("alternate_direction", json!(self.alternate_direction)),
            ],
        )
    }

    fn from_dict(dict: &Dict) -> Result<Self> {
        let f: LissajousFields = dict::fields(Self::TYPEID, dict)?;
        Ok(
            Self::build(f.axes, f.units, f.bounding_box, f.num_lobes, f.num_points)?
                .alternating(f.alternate_direction),
        )
    }
}

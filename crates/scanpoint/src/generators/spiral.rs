use std::f64::consts::PI;

use serde::Deserialize;
use serde_json::json;
use smallvec::smallvec;

use super::{ArrayCache, Generator, IndexDims};
use crate::{
    axes::{self, AxisArrays},
    dict::{self, Dict, Serializable, TypeTag},
    error::{self, Error, Result},
};

/// Samples along a Fermat spiral centred on a point in two axes.
///
/// Sample `i` sits at angle `φ = α·√(i + ½)` and radius `β·φ`, with
/// `α = √(4π)` and `β = scale / 2π`, so successive samples cover roughly
/// equal areas. The spiral ends at the last sample inside `radius`.
#[derive(Clone, Debug, PartialEq)]
pub struct SpiralGenerator {
    /// The x and y axis names.
    axes: Vec<String>,
    /// Unit per axis.
    units: Vec<String>,
    /// Centre of the spiral.
    centre: [f64; 2],
    /// Maximum extent of the spiral.
    radius: f64,
    /// Gap between successive turns relative to the default.
    scale: f64,
    /// Stored and serialized; the winding of a spiral is never reversed.
    alternate_direction: bool,
    /// Number of samples inside `radius`.
    num: usize,
    /// Prepared arrays.
    cache: ArrayCache,
}

/// Serialized fields of a spiral.
#[derive(Deserialize)]
struct SpiralFields {
    /// Axis names.
    axes: Vec<String>,
    /// Unit per axis.
    units: Vec<String>,
    /// Centre point.
    centre: [f64; 2],
    /// Maximum extent.
    radius: f64,
    /// Turn spacing.
    #[serde(default = "unit_scale")]
    scale: f64,
    /// Snake flag.
    #[serde(default)]
    alternate_direction: bool,
}

/// Largest sample count whose position arrays can be allocated.
const MAX_SAMPLES: usize = isize::MAX as usize / size_of::<f64>();

/// Default turn spacing.
fn unit_scale() -> f64 {
    1.0
}

/// Angle scale factor `α`.
fn alpha() -> f64 {
    (4.0 * PI).sqrt()
}

impl SpiralGenerator {
    /// A spiral over `axes` reaching out to `radius` from `centre`. `units`
    /// holds one unit per axis, or a single unit for both.
    pub fn new(
        axes: [&str; 2],
        units: &[&str],
        centre: [f64; 2],
        radius: f64,
        scale: f64,
    ) -> Result<Self> {
        Self::build(
            axes.iter().map(ToString::to_string).collect(),
            units.iter().map(ToString::to_string).collect(),
            centre,
            radius,
            scale,
        )
    }

    /// Record the alternate‑direction flag. The spiral is traversed in the
    /// same winding either way.
    pub fn alternating(mut self, alternate: bool) -> Self {
        if alternate {
            tracing::debug!(
                axes = ?self.axes,
                "spiral winding is fixed; alternate_direction is recorded only"
            );
        }
        self.alternate_direction = alternate;
        self
    }

    /// Validate parameters and count samples.
    fn build(
        axes: Vec<String>,
        units: Vec<String>,
        centre: [f64; 2],
        radius: f64,
        scale: f64,
    ) -> Result<Self> {
        if axes.len() != 2 {
            return Err(Error::DimensionMismatch(format!(
                "a spiral needs 2 axes, got {}",
                axes.len()
            )));
        }
        axes::ensure_unique(axes.iter().map(String::as_str))?;
        let units = axes::broadcast_units(&units, axes.len())?;
        error::require_positive("radius", radius)?;
        error::require_positive("scale", scale)?;
        if centre.iter().any(|c| !c.is_finite()) {
            return Err(Error::InvalidParameter {
                field: "centre",
                reason: "coordinates must be finite".into(),
            });
        }

        let beta = scale / (2.0 * PI);
        let turns = radius / (alpha() * beta);
        let count = (turns * turns).floor() + 1.0;
        if !count.is_finite() || count > MAX_SAMPLES as f64 {
            return Err(Error::InvalidParameter {
                field: "radius",
                reason: format!(
                    "radius {radius} at scale {scale} needs more than {MAX_SAMPLES} samples"
                ),
            });
        }
        let num = count as usize;

        Ok(Self {
            axes,
            units,
            centre,
            radius,
            scale,
            alternate_direction: false,
            num,
            cache: ArrayCache::default(),
        })
    }

    /// Centre of the spiral.
    pub fn centre(&self) -> [f64; 2] {
        self.centre
    }

    /// Maximum extent.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Turn spacing.
    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl Generator for SpiralGenerator {
    fn axes(&self) -> &[String] {
        &self.axes
    }

    fn units(&self) -> &[String] {
        &self.units
    }

    fn index_dims(&self) -> IndexDims {
        smallvec![self.num]
    }

    fn index_names(&self) -> Vec<String> {
        vec![format!("{}_Spiral", self.axes.join("_"))]
    }

    fn alternate_direction(&self) -> bool {
        self.alternate_direction
    }

    fn alternates(&self) -> bool {
        false
    }

    fn arrays_at(&self, index: &[f64]) -> AxisArrays {
        let a = alpha();
        let b = self.scale / (2.0 * PI);
        let (x, y): (Vec<f64>, Vec<f64>) = index
            .iter()
            .map(|i| {
                let phi = a * (i + 0.5).sqrt();
                (
                    self.centre[0] + b * phi * phi.sin(),
                    self.centre[1] + b * phi * phi.cos(),
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

impl TypeTag for SpiralGenerator {
    const TYPEID: &'static str = "scanpointgenerator:generator/SpiralGenerator:1.0";
    const LEGACY: &'static [&'static str] = &["SpiralGenerator"];
}

impl Serializable for SpiralGenerator {
    fn to_dict(&self) -> Dict {
        dict::tagged(
            Self::TYPEID,
            [
                ("axes", json!(self.axes)),
                ("units", json!(self.units)),
                ("centre", json!(self.centre)),
                ("radius", json!(self.radius)),
                ("scale", json!(self.scale)),
                ("alternate_direction", json!(self.alternate_direction)),
            ],
        )
    }

    fn from_dict(dict: &Dict) -> Result<Self> {
        let f: SpiralFields = dict::fields(Self::TYPEID, dict)?;
        Ok(Self::build(f.axes, f.units, f.centre, f.radius, f.scale)?
            .alternating(f.alternate_direction))
    }
}

use serde::Deserialize;
use serde_json::json;

use super::{RegionOfInterest, require_finite, to_local};
use crate::{
    dict::{self, Dict, Serializable, TypeTag},
    error::{self, Result},
};

/// A filled ellipse, optionally rotated about its centre.
#[derive(Clone, Debug, PartialEq)]
pub struct EllipticalRoi {
    /// Centre of the ellipse.
    centre: [f64; 2],
    /// Semi‑axis lengths along the rotated first and second axes.
    semiaxes: [f64; 2],
    /// Anticlockwise rotation in radians.
    angle: f64,
}

/// Serialized fields of an ellipse.
#[derive(Deserialize)]
struct EllipticalFields {
    /// Centre.
    centre: [f64; 2],
    /// Semi‑axes.
    semiaxes: [f64; 2],
    /// Rotation.
    #[serde(default)]
    angle: f64,
}

impl EllipticalRoi {
    /// An ellipse with the given semi‑axes rotated by `angle` radians.
    pub fn new(centre: [f64; 2], semiaxes: [f64; 2], angle: f64) -> Result<Self> {
        require_finite("centre", &centre)?;
        require_finite("angle", &[angle])?;
        error::require_positive("semiaxes", semiaxes[0])?;
        error::require_positive("semiaxes", semiaxes[1])?;
        Ok(Self {
            centre,
            semiaxes,
            angle,
        })
    }

    /// Centre.
    pub fn centre(&self) -> [f64; 2] {
        self.centre
    }

    /// Semi‑axes.
    pub fn semiaxes(&self) -> [f64; 2] {
        self.semiaxes
    }

    /// Rotation in radians.
    pub fn angle(&self) -> f64 {
        self.angle
    }
}

impl RegionOfInterest for EllipticalRoi {
    fn contains_point(&self, point: [f64; 2]) -> bool {
        let [x, y] = to_local(point, self.centre, self.angle);
        let (u, v) = (x / self.semiaxes[0], y / self.semiaxes[1]);
        u * u + v * v <= 1.0
    }

    fn name(&self) -> &'static str {
        "Ellipse"
    }
}

impl TypeTag for EllipticalRoi {
    const TYPEID: &'static str = "scanpointgenerator:roi/EllipticalROI:1.0";
    const LEGACY: &'static [&'static str] = &["EllipticalROI", "Ellipse"];
}

impl Serializable for EllipticalRoi {
    fn to_dict(&self) -> Dict {
        dict::tagged(
            Self::TYPEID,
            [
                ("centre", json!(self.centre)),
                ("semiaxes", json!(self.semiaxes)),
                ("angle", json!(self.angle)),
            ],
        )
    }

    fn from_dict(dict: &Dict) -> Result<Self> {
        let f: EllipticalFields = dict::fields(Self::TYPEID, dict)?;
        Self::new(f.centre, f.semiaxes, f.angle)
    }
}

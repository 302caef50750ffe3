use serde::Deserialize;
use serde_json::json;

use super::{RegionOfInterest, require_finite};
use crate::{
    dict::{self, Dict, Serializable, TypeTag},
    error::{self, Result},
};

/// A closed disc.
#[derive(Clone, Debug, PartialEq)]
pub struct CircularRoi {
    /// Centre of the disc.
    centre: [f64; 2],
    /// Radius, strictly positive.
    radius: f64,
}

/// Serialized fields of a disc.
#[derive(Deserialize)]
struct CircularFields {
    /// Centre.
    centre: [f64; 2],
    /// Radius.
    radius: f64,
}

impl CircularRoi {
    /// A disc of `radius` around `centre`.
    pub fn new(centre: [f64; 2], radius: f64) -> Result<Self> {
        require_finite("centre", &centre)?;
        error::require_positive("radius", radius)?;
        Ok(Self { centre, radius })
    }

    /// Centre of the disc.
    pub fn centre(&self) -> [f64; 2] {
        self.centre
    }

    /// Radius.
    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl RegionOfInterest for CircularRoi {
    fn contains_point(&self, point: [f64; 2]) -> bool {
        let dx = point[0] - self.centre[0];
        let dy = point[1] - self.centre[1];
        dx * dx + dy * dy <= self.radius * self.radius
    }

    fn name(&self) -> &'static str {
        "Circle"
    }
}

impl TypeTag for CircularRoi {
    const TYPEID: &'static str = "scanpointgenerator:roi/CircularROI:1.0";
    const LEGACY: &'static [&'static str] = &["CircularROI", "Circle"];
}

impl Serializable for CircularRoi {
    fn to_dict(&self) -> Dict {
        dict::tagged(
            Self::TYPEID,
            [("centre", json!(self.centre)), ("radius", json!(self.radius))],
        )
    }

    fn from_dict(dict: &Dict) -> Result<Self> {
        let f: CircularFields = dict::fields(Self::TYPEID, dict)?;
        Self::new(f.centre, f.radius)
    }
}

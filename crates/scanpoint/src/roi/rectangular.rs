use serde::Deserialize;
use serde_json::json;

use super::{RegionOfInterest, require_finite, to_local};
use crate::{
    dict::{self, Dict, Serializable, TypeTag},
    error::{self, Result},
};

/// A rectangle anchored at a corner and rotated about it.
#[derive(Clone, Debug, PartialEq)]
pub struct RectangularRoi {
    /// Corner the rectangle extends from.
    start: [f64; 2],
    /// Extent along the rotated first axis.
    width: f64,
    /// Extent along the rotated second axis.
    height: f64,
    /// Anticlockwise rotation about `start`, in radians.
    angle: f64,
}

/// Serialized fields of a rectangle.
#[derive(Deserialize)]
struct RectangularFields {
    /// Anchor corner.
    start: [f64; 2],
    /// Width.
    width: f64,
    /// Height.
    height: f64,
    /// Rotation.
    #[serde(default)]
    angle: f64,
}

impl RectangularRoi {
    /// An axis‑aligned rectangle spanning `width` by `height` from `start`.
    pub fn new(start: [f64; 2], width: f64, height: f64) -> Result<Self> {
        Self::rotated(start, width, height, 0.0)
    }

    /// A rectangle rotated anticlockwise by `angle` radians about `start`.
    pub fn rotated(start: [f64; 2], width: f64, height: f64, angle: f64) -> Result<Self> {
        require_finite("start", &start)?;
        require_finite("angle", &[angle])?;
        error::require_positive("width", width)?;
        error::require_positive("height", height)?;
        Ok(Self {
            start,
            width,
            height,
            angle,
        })
    }

    /// Anchor corner.
    pub fn start(&self) -> [f64; 2] {
        self.start
    }

    /// Width.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Height.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Rotation in radians.
    pub fn angle(&self) -> f64 {
        self.angle
    }
}

impl RegionOfInterest for RectangularRoi {
    fn contains_point(&self, point: [f64; 2]) -> bool {
        let [x, y] = to_local(point, self.start, self.angle);
        (0.0..=self.width).contains(&x) && (0.0..=self.height).contains(&y)
    }

    fn name(&self) -> &'static str {
        "Rectangle"
    }
}

impl TypeTag for RectangularRoi {
    const TYPEID: &'static str = "scanpointgenerator:roi/RectangularROI:1.0";
    const LEGACY: &'static [&'static str] = &["RectangularROI", "Rectangle"];
}

impl Serializable for RectangularRoi {
    fn to_dict(&self) -> Dict {
        dict::tagged(
            Self::TYPEID,
            [
                ("start", json!(self.start)),
                ("width", json!(self.width)),
                ("height", json!(self.height)),
                ("angle", json!(self.angle)),
            ],
        )
    }

    fn from_dict(dict: &Dict) -> Result<Self> {
        let f: RectangularFields = dict::fields(Self::TYPEID, dict)?;
        Self::rotated(f.start, f.width, f.height, f.angle)
    }
}

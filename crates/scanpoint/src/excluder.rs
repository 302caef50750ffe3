//! Exclusion of points outside a region of interest.

use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    dict::{self, Dict, Serializable, TypeTag},
    error::{Error, Result},
    registry,
    roi::{RegionOfInterest, Roi},
};

/// Keeps only the points whose coordinates on two axes fall inside a region.
#[derive(Clone, Debug, PartialEq)]
pub struct Excluder {
    /// Region tested against.
    roi: Roi,
    /// Axes supplying the region's x and y coordinates.
    axes: [String; 2],
}

/// Serialized fields of an excluder.
#[derive(Deserialize)]
struct ExcluderFields {
    /// Region dictionary.
    roi: Value,
    /// Axis pair.
    axes: [String; 2],
}

impl Excluder {
    /// Bind `roi` to the axes named in `axes`, x first.
    pub fn new(roi: impl Into<Roi>, axes: [&str; 2]) -> Result<Self> {
        Self::build(roi.into(), axes.map(ToString::to_string))
    }

    /// Validate parameters.
    fn build(roi: Roi, axes: [String; 2]) -> Result<Self> {
        if axes[0] == axes[1] {
            return Err(Error::DuplicateAxis(axes[0].clone()));
        }
        Ok(Self { roi, axes })
    }

    /// Region tested against.
    pub fn roi(&self) -> &Roi {
        &self.roi
    }

    /// Axis pair, x first.
    pub fn axes(&self) -> &[String; 2] {
        &self.axes
    }

    /// True when the coordinates lie inside the region.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.roi.contains_point([x, y])
    }

    /// Element‑wise containment of paired coordinate arrays. Entries are
    /// `true` where the point is kept.
    pub fn create_mask(&self, x: &[f64], y: &[f64]) -> Vec<bool> {
        debug_assert_eq!(x.len(), y.len(), "coordinate arrays differ in length");
        x.iter().zip(y).map(|(&x, &y)| self.contains(x, y)).collect()
    }
}

impl TypeTag for Excluder {
    const TYPEID: &'static str = "scanpointgenerator:excluder/Excluder:1.0";
    const LEGACY: &'static [&'static str] = &["Excluder"];
}

impl Serializable for Excluder {
    fn to_dict(&self) -> Dict {
        dict::tagged(
            Self::TYPEID,
            [
                ("roi", Value::Object(self.roi.to_dict())),
                ("axes", json!(self.axes)),
            ],
        )
    }

    fn from_dict(dict: &Dict) -> Result<Self> {
        let f: ExcluderFields = dict::fields(Self::TYPEID, dict)?;
        let roi = registry::roi_from_dict(dict::as_dict(&f.roi)?)?;
        Self::build(roi, f.axes)
    }
}

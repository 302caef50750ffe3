//! Regions of interest: pure containment predicates over a pair of axes.

use crate::{
    dict::{Dict, Serializable, TypeTag},
    error::{Error, Result},
    registry,
};

/// Circles.
pub mod circular;
/// Rotated ellipses.
pub mod elliptical;
/// Arbitrary simple polygons.
pub mod polygonal;
/// Rotated rectangles.
pub mod rectangular;

pub use self::{
    circular::CircularRoi, elliptical::EllipticalRoi, polygonal::PolygonalRoi,
    rectangular::RectangularRoi,
};

/// A two‑dimensional region. Points on the boundary are inside.
pub trait RegionOfInterest {
    /// True when `point` lies inside or on the boundary of the region.
    fn contains_point(&self, point: [f64; 2]) -> bool;

    /// Short shape name.
    fn name(&self) -> &'static str;
}

/// Any of the regions this crate provides.
#[derive(Clone, Debug, PartialEq)]
pub enum Roi {
    /// Disc.
    Circular(CircularRoi),
    /// Rotated rectangle.
    Rectangular(RectangularRoi),
    /// Rotated ellipse.
    Elliptical(EllipticalRoi),
    /// Simple polygon.
    Polygonal(PolygonalRoi),
}

/// Forward a method call to the wrapped region.
macro_rules! dispatch {
    ($self:expr, $r:ident => $call:expr) => {
        match $self {
            Roi::Circular($r) => $call,
            Roi::Rectangular($r) => $call,
            Roi::Elliptical($r) => $call,
            Roi::Polygonal($r) => $call,
        }
    };
}

impl Roi {
    /// Versioned type tag of the wrapped region.
    pub fn typeid(&self) -> &'static str {
        match self {
            Self::Circular(_) => CircularRoi::TYPEID,
            Self::Rectangular(_) => RectangularRoi::TYPEID,
            Self::Elliptical(_) => EllipticalRoi::TYPEID,
            Self::Polygonal(_) => PolygonalRoi::TYPEID,
        }
    }
}

impl RegionOfInterest for Roi {
    fn contains_point(&self, point: [f64; 2]) -> bool {
        dispatch!(self, r => r.contains_point(point))
    }

    fn name(&self) -> &'static str {
        dispatch!(self, r => r.name())
    }
}

impl Serializable for Roi {
    fn to_dict(&self) -> Dict {
        dispatch!(self, r => r.to_dict())
    }

    fn from_dict(dict: &Dict) -> Result<Self> {
        registry::roi_from_dict(dict)
    }
}

impl From<CircularRoi> for Roi {
    fn from(r: CircularRoi) -> Self {
        Self::Circular(r)
    }
}

impl From<RectangularRoi> for Roi {
    fn from(r: RectangularRoi) -> Self {
        Self::Rectangular(r)
    }
}

impl From<EllipticalRoi> for Roi {
    fn from(r: EllipticalRoi) -> Self {
        Self::Elliptical(r)
    }
}

impl From<PolygonalRoi> for Roi {
    fn from(r: PolygonalRoi) -> Self {
        Self::Polygonal(r)
    }
}

/// Express `point` in a frame translated to `origin` and rotated by `angle`.
pub(crate) fn to_local(point: [f64; 2], origin: [f64; 2], angle: f64) -> [f64; 2] {
    let (dx, dy) = (point[0] - origin[0], point[1] - origin[1]);
    if angle == 0.0 {
        return [dx, dy];
    }
    let (sin, cos) = angle.sin_cos();
    [dx * cos + dy * sin, -dx * sin + dy * cos]
}

/// Reject non‑finite coordinates.
pub(crate) fn require_finite(field: &'static str, values: &[f64]) -> Result<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(Error::InvalidParameter {
            field,
            reason: "coordinates must be finite".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;

    #[test]
    fn local_frame() {
        assert_eq!(to_local([3.0, 4.0], [1.0, 1.0], 0.0), [2.0, 3.0]);
        let [x, y] = to_local([0.0, 1.0], [0.0, 0.0], FRAC_PI_2);
        assert!((x - 1.0).abs() < 1e-12 && y.abs() < 1e-12, "{x} {y}");
    }

    #[test]
    fn dispatch_to_variant() -> Result<()> {
        let roi = Roi::from(CircularRoi::new([0.0, 0.0], 1.0)?);
        assert_eq!(roi.name(), "Circle");
        assert_eq!(roi.typeid(), "scanpointgenerator:roi/CircularROI:1.0");
        assert!(roi.contains_point([0.5, 0.5]));
        assert!(!roi.contains_point([1.0, 1.0]));
        Ok(())
    }
}

use serde::Deserialize;
use serde_json::json;

use super::{RegionOfInterest, require_finite};
use crate::{
    dict::{self, Dict, Serializable, TypeTag},
    error::{Error, Result},
};

/// Tolerance for deciding a point lies on an edge.
const EDGE_EPSILON: f64 = 1e-12;

/// A simple polygon given by its vertices in order.
#[derive(Clone, Debug, PartialEq)]
pub struct PolygonalRoi {
    /// Vertex x coordinates.
    points_x: Vec<f64>,
    /// Vertex y coordinates.
    points_y: Vec<f64>,
}

/// Serialized fields of a polygon.
#[derive(Deserialize)]
struct PolygonalFields {
    /// Vertex x coordinates.
    points_x: Vec<f64>,
    /// Vertex y coordinates.
    points_y: Vec<f64>,
}

impl PolygonalRoi {
    /// A polygon through the vertices `(points_x[i], points_y[i])`.
    pub fn new(points_x: &[f64], points_y: &[f64]) -> Result<Self> {
        if points_x.len() != points_y.len() {
            return Err(Error::DimensionMismatch(format!(
                "{} x coordinates but {} y coordinates",
                points_x.len(),
                points_y.len()
            )));
        }
        if points_x.len() < 3 {
            return Err(Error::InvalidParameter {
                field: "points_x",
                reason: format!("a polygon needs 3 vertices, got {}", points_x.len()),
            });
        }
        require_finite("points_x", points_x)?;
        require_finite("points_y", points_y)?;
        Ok(Self {
            points_x: points_x.to_vec(),
            points_y: points_y.to_vec(),
        })
    }

    /// Vertex x coordinates.
    pub fn points_x(&self) -> &[f64] {
        &self.points_x
    }

    /// Vertex y coordinates.
    pub fn points_y(&self) -> &[f64] {
        &self.points_y
    }

    /// Edges as pairs of endpoints, closing back to the first vertex.
    fn edges(&self) -> impl Iterator<Item = ([f64; 2], [f64; 2])> + '_ {
        let n = self.points_x.len();
        (0..n).map(move |i| {
            let j = (i + 1) % n;
            (
                [self.points_x[i], self.points_y[i]],
                [self.points_x[j], self.points_y[j]],
            )
        })
    }
}

/// True when `p` lies on the segment `a`–`b`.
fn on_segment(p: [f64; 2], a: [f64; 2], b: [f64; 2]) -> bool {
    let cross = (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0]);
    let scale = (b[0] - a[0]).abs() + (b[1] - a[1]).abs();
    cross.abs() <= EDGE_EPSILON * scale.max(1.0)
        && p[0] >= a[0].min(b[0]) - EDGE_EPSILON
        && p[0] <= a[0].max(b[0]) + EDGE_EPSILON
        && p[1] >= a[1].min(b[1]) - EDGE_EPSILON
        && p[1] <= a[1].max(b[1]) + EDGE_EPSILON
}

impl RegionOfInterest for PolygonalRoi {
    fn contains_point(&self, point: [f64; 2]) -> bool {
        let [x, y] = point;
        let mut inside = false;
        for (a, b) in self.edges() {
            if on_segment(point, a, b) {
                return true;
            }
            if (a[1] > y) != (b[1] > y) {
                let crossing = a[0] + (y - a[1]) * (b[0] - a[0]) / (b[1] - a[1]);
                if x < crossing {
                    inside = !inside;
                }
            }
        }
        inside
    }

    fn name(&self) -> &'static str {
        "Polygon"
    }
}

impl TypeTag for PolygonalRoi {
    const TYPEID: &'static str = "scanpointgenerator:roi/PolygonalROI:1.0";
    const LEGACY: &'static [&'static str] = &["PolygonalROI", "Polygon"];
}

impl Serializable for PolygonalRoi {
    fn to_dict(&self) -> Dict {
        dict::tagged(
            Self::TYPEID,
            [
                ("points_x", json!(self.points_x)),
                ("points_y", json!(self.points_y)),
            ],
        )
    }

    fn from_dict(dict: &Dict) -> Result<Self> {
        let f: PolygonalFields = dict::fields(Self::TYPEID, dict)?;
        Self::new(&f.points_x, &f.points_y)
    }
}

use serde::{Deserialize, Serialize};
use serde_json::json;
use smallvec::smallvec;

use super::{ArrayCache, Generator, IndexDims};
use crate::{
    axes::{self, AxisArrays},
    dict::{self, Dict, Serializable, TypeTag},
    error::{Error, Result},
};

/// How the axes of a line are named: one base name from which per‑axis names
/// are derived, or an explicit list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LineName {
    /// Base name; several axes get `_X`, `_Y`, `_Z`, `_4`… suffixes.
    Base(String),
    /// One explicit name per axis.
    Axes(Vec<String>),
}

/// Evenly spaced samples along a straight line through one or more axes.
///
/// All axes move together, so the line has a single index dimension no
/// matter how many axes it drives.
#[derive(Clone, Debug, PartialEq)]
pub struct LineGenerator {
    /// Name as given at construction.
    name: LineName,
    /// Unit shared by every axis.
    units: String,
    /// First sample on each axis.
    start: Vec<f64>,
    /// Last sample on each axis.
    stop: Vec<f64>,
    /// Number of samples, at least one.
    num: usize,
    /// Reverse on alternate passes of an enclosing scan.
    alternate_direction: bool,
    /// Resolved axis names.
    axes: Vec<String>,
    /// `units` repeated per axis.
    axis_units: Vec<String>,
    /// Distance between adjacent samples on each axis.
    step: Vec<f64>,
    /// Prepared arrays.
    cache: ArrayCache,
}

/// Serialized fields of a line.
#[derive(Deserialize)]
struct LineFields {
    /// Base name or explicit axis list.
    name: LineName,
    /// Shared unit.
    units: String,
    /// Start coordinates.
    start: Vec<f64>,
    /// Stop coordinates.
    stop: Vec<f64>,
    /// Sample count.
    num: usize,
    /// Snake flag.
    #[serde(default)]
    alternate_direction: bool,
}

impl LineGenerator {
    /// A line over a single axis called `name`.
    pub fn new(name: &str, units: &str, start: f64, stop: f64, num: usize) -> Result<Self> {
        Self::build(
            LineName::Base(name.to_string()),
            units.to_string(),
            vec![start],
            vec![stop],
            num,
        )
    }

    /// A line over as many axes as `start` has coordinates, with axis names
    /// derived from `name`.
    pub fn multi_axis(
        name: &str,
        units: &str,
        start: &[f64],
        stop: &[f64],
        num: usize,
    ) -> Result<Self> {
        Self::build(
            LineName::Base(name.to_string()),
            units.to_string(),
            start.to_vec(),
            stop.to_vec(),
            num,
        )
    }

    /// A line over explicitly named axes.
    pub fn with_axes(
        axes: &[&str],
        units: &str,
        start: &[f64],
        stop: &[f64],
        num: usize,
    ) -> Result<Self> {
        Self::build(
            LineName::Axes(axes.iter().map(ToString::to_string).collect()),
            units.to_string(),
            start.to_vec(),
            stop.to_vec(),
            num,
        )
    }

    /// Set whether the line reverses on alternate passes.
    pub fn alternating(mut self, alternate: bool) -> Self {
        self.alternate_direction = alternate;
        self
    }

    /// Validate parameters and derive axis names and steps.
    fn build(
        name: LineName,
        units: String,
        start: Vec<f64>,
        stop: Vec<f64>,
        num: usize,
    ) -> Result<Self> {
        if start.len() != stop.len() {
            return Err(Error::DimensionMismatch(format!(
                "{} start coordinates but {} stop coordinates",
                start.len(),
                stop.len()
            )));
        }
        if start.is_empty() {
            return Err(Error::InvalidParameter {
                field: "start",
                reason: "a line needs at least one axis".into(),
            });
        }
        if start.iter().chain(&stop).any(|c| !c.is_finite()) {
            return Err(Error::InvalidParameter {
                field: "start/stop",
                reason: "coordinates must be finite".into(),
            });
        }
        if num == 0 {
            return Err(Error::NonPositive {
                field: "num",
                value: 0.0,
            });
        }

        let axes = match &name {
            LineName::Base(base) => axes::synthesize(base, start.len()),
            LineName::Axes(list) if list.len() == start.len() => list.clone(),
            LineName::Axes(list) => {
                return Err(Error::DimensionMismatch(format!(
                    "{} axis names for {} coordinates",
                    list.len(),
                    start.len()
                )));
            }
        };
        axes::ensure_unique(axes.iter().map(String::as_str))?;

        let step = if num == 1 {
            vec![0.0; start.len()]
        } else {
            let intervals = (num - 1) as f64;
            start
                .iter()
                .zip(&stop)
                .map(|(a, b)| (b - a) / intervals)
                .collect()
        };

        Ok(Self {
            axis_units: vec![units.clone(); axes.len()],
            name,
            units,
            start,
            stop,
            num,
            alternate_direction: false,
            axes,
            step,
            cache: ArrayCache::default(),
        })
    }

    /// Name as given at construction.
    pub fn name(&self) -> &LineName {
        &self.name
    }

    /// First sample on each axis.
    pub fn start(&self) -> &[f64] {
        &self.start
    }

    /// Last sample on each axis.
    pub fn stop(&self) -> &[f64] {
        &self.stop
    }

    /// Number of samples.
    pub fn num(&self) -> usize {
        self.num
    }

    /// Distance between adjacent samples on each axis; zero for a single
    /// sample.
    pub fn step(&self) -> &[f64] {
        &self.step
    }
}

impl Generator for LineGenerator {
    fn axes(&self) -> &[String] {
        &self.axes
    }

    fn units(&self) -> &[String] {
        &self.axis_units
    }

    fn index_dims(&self) -> IndexDims {
        smallvec![self.num]
    }

    fn index_names(&self) -> Vec<String> {
        match &self.name {
            LineName::Base(base) => vec![base.clone()],
            LineName::Axes(list) => vec![list.join("_")],
        }
    }

    fn alternate_direction(&self) -> bool {
        self.alternate_direction
    }

    fn arrays_at(&self, index: &[f64]) -> AxisArrays {
        let columns = self
            .start
            .iter()
            .zip(&self.step)
            .map(|(start, step)| index.iter().map(|i| start + i * step).collect())
            .collect();
        AxisArrays::new(self.axes.clone(), columns)
    }

    fn cache(&self) -> &ArrayCache {
        &self.cache
    }

    fn cache_mut(&mut self) -> &mut ArrayCache {
        &mut self.cache
    }
}

impl TypeTag for LineGenerator {
    const TYPEID: &'static str = "scanpointgenerator:generator/LineGenerator:1.0";
    const LEGACY: &'static [&'static str] = &["LineGenerator"];
}

impl Serializable for LineGenerator {
    fn to_dict(&self) -> Dict {
        dict::tagged(
            Self::TYPEID,
            [
                ("name", json!(self.name)),
                ("units", json!(self.units)),
                ("start", json!(self.start)),
                ("stop", json!(self.stop)),
                ("num", json!(self.num)),
                ("alternate_direction", json!(self.alternate_direction)),
            ],
        )
    }

    fn from_dict(dict: &Dict) -> Result<Self> {
        let f: LineFields = dict::fields(Self::TYPEID, dict)?;
        Ok(Self::build(f.name, f.units, f.start, f.stop, f.num)?.alternating(f.alternate_direction))
    }
}

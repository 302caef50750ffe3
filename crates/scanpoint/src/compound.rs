//! Nesting generators into one multi‑dimensional scan.
//!
//! The first generator is the outermost (slowest) dimension and the last the
//! innermost. Points are addressed by a dense index over the points that
//! survive every excluder, in traversal order. Excluder masks are computed
//! over the sample grid of the one or two generators owning each excluder's
//! axes, so memory stays proportional to those sub‑grids plus the survivor
//! list rather than to the full product of generator sizes.

use std::{collections::BTreeMap, iter::FusedIterator};

use serde::Deserialize;
use serde_json::Value;
use smallvec::SmallVec;

use crate::{
    axes::{self, AxisArrays},
    cache::Cached,
    dict::{self, Dict, Serializable, TypeTag},
    error::{Error, Result},
    excluder::Excluder,
    generators::{Generator, IndexDims, ScanGenerator, unravel},
    mutators::{Mutate, Mutator},
    point::{AxisValues, Indexes, Point},
    registry,
};

/// Sample index of each generator for one flat index, with whether that
/// generator is being traversed in reverse.
type Samples = SmallVec<[(usize, bool); 4]>;

/// A scan built from nested generators, filtered by excluders and perturbed
/// by mutators.
#[derive(Clone, Debug, PartialEq)]
pub struct CompoundGenerator {
    /// Generators, outermost first.
    generators: Vec<ScanGenerator>,
    /// Regions every point must fall inside.
    excluders: Vec<Excluder>,
    /// Perturbations applied in order.
    mutators: Vec<Mutator>,
    /// Index bookkeeping computed by `prepare_positions`.
    layout: Cached<Layout>,
}

/// Serialized fields of a compound scan.
#[derive(Deserialize)]
struct CompoundFields {
    /// Generator dictionaries.
    generators: Vec<Value>,
    /// Excluder dictionaries.
    #[serde(default)]
    excluders: Vec<Value>,
    /// Mutator dictionaries.
    #[serde(default)]
    mutators: Vec<Value>,
}

/// Shape of the scan and the flat indices that survive exclusion.
#[derive(Clone, Debug)]
struct Layout {
    /// Number of samples of each generator.
    sizes: Vec<usize>,
    /// Index dimensions of each generator.
    dims: Vec<IndexDims>,
    /// Whether each generator reverses on alternate passes.
    alternates: Vec<bool>,
    /// Concatenated index dimensions of all generators.
    shape: IndexDims,
    /// Product of `sizes`.
    total: usize,
    /// Surviving flat indices in ascending order; `None` when nothing is
    /// excluded.
    survivors: Option<Vec<usize>>,
}

impl Layout {
    /// Number of points in the scan.
    fn len(&self) -> usize {
        self.survivors.as_ref().map_or(self.total, Vec::len)
    }

    /// Flat index of the point at `dense`.
    fn flat(&self, dense: usize) -> Option<usize> {
        match &self.survivors {
            Some(survivors) => survivors.get(dense).copied(),
            None => (dense < self.total).then_some(dense),
        }
    }

    /// Sample index of each generator at `flat`, following the snake order.
    fn samples(&self, flat: usize) -> Samples {
        let traversal = unravel(flat, &self.sizes);
        let mut pass = 0;
        let mut out = Samples::new();
        for ((&t, &size), &alternates) in traversal.iter().zip(&self.sizes).zip(&self.alternates) {
            let reversed = alternates && pass % 2 == 1;
            out.push(if reversed { (size - 1 - t, true) } else { (t, false) });
            pass = pass * size + t;
        }
        out
    }
}

/// Keep/drop decisions of one excluder over the samples of its generators.
#[derive(Clone, Debug)]
struct ExclusionMask {
    /// Generator whose sample selects the row.
    outer: usize,
    /// Generator whose sample selects the column, when the excluder spans
    /// two generators.
    inner: Option<usize>,
    /// Number of samples of `inner`.
    stride: usize,
    /// Row‑major keep flags.
    keep: Vec<bool>,
}

impl ExclusionMask {
    /// Evaluate `excluder` over the sample grid of the generators owning its
    /// axes.
    fn build(excluder: &Excluder, generators: &[ScanGenerator]) -> Result<Self> {
        let [x_axis, y_axis] = excluder.axes();
        let gx = owner(generators, x_axis)?;
        let gy = owner(generators, y_axis)?;
        let x = column(&generators[gx], x_axis)?;
        let y = column(&generators[gy], y_axis)?;

        if gx == gy {
            return Ok(Self {
                outer: gx,
                inner: None,
                stride: 1,
                keep: excluder.create_mask(x, y),
            });
        }

        let (outer, inner) = (gx.min(gy), gx.max(gy));
        let rows = generators[outer].size();
        let stride = generators[inner].size();
        let mut xs = Vec::with_capacity(rows * stride);
        let mut ys = Vec::with_capacity(rows * stride);
        for row in 0..rows {
            for col in 0..stride {
                let (sx, sy) = if gx == outer { (row, col) } else { (col, row) };
                xs.push(x[sx]);
                ys.push(y[sy]);
            }
        }
        Ok(Self {
            outer,
            inner: Some(inner),
            stride,
            keep: excluder.create_mask(&xs, &ys),
        })
    }

    /// Whether the point with the given generator samples is kept.
    fn keeps(&self, samples: &Samples) -> bool {
        let row = samples[self.outer].0;
        let cell = match self.inner {
            Some(inner) => row * self.stride + samples[inner].0,
            None => row,
        };
        self.keep[cell]
    }
}

/// Index of the generator owning `axis`.
fn owner(generators: &[ScanGenerator], axis: &str) -> Result<usize> {
    generators
        .iter()
        .position(|g| g.axes().iter().any(|a| a == axis))
        .ok_or_else(|| Error::UnknownAxis(axis.to_string()))
}

/// Prepared positions of `axis` on `generator`.
fn column<'a>(generator: &'a ScanGenerator, axis: &str) -> Result<&'a [f64]> {
    generator
        .positions()?
        .get(axis)
        .ok_or_else(|| Error::UnknownAxis(axis.to_string()))
}

impl CompoundGenerator {
    /// Nest `generators`, outermost first, keeping only points inside every
    /// excluder and applying `mutators` in order.
    pub fn new(
        generators: Vec<ScanGenerator>,
        excluders: Vec<Excluder>,
        mutators: Vec<Mutator>,
    ) -> Result<Self> {
        if generators.is_empty() {
            return Err(Error::NoGenerators);
        }
        axes::ensure_unique(generators.iter().flat_map(|g| g.axes()).map(String::as_str))?;
        let referenced = excluders
            .iter()
            .flat_map(|e| e.axes().iter().map(String::as_str))
            .chain(mutators.iter().flat_map(Mutate::axes));
        for axis in referenced {
            owner(&generators, axis)?;
        }
        Ok(Self {
            generators,
            excluders,
            mutators,
            layout: Cached::default(),
        })
    }

    /// Generators, outermost first.
    pub fn generators(&self) -> &[ScanGenerator] {
        &self.generators
    }

    /// Excluders.
    pub fn excluders(&self) -> &[Excluder] {
        &self.excluders
    }

    /// Mutators in application order.
    pub fn mutators(&self) -> &[Mutator] {
        &self.mutators
    }

    /// Every axis of the scan, outermost generator first.
    pub fn axes(&self) -> Vec<&str> {
        self.generators
            .iter()
            .flat_map(|g| g.axes().iter().map(String::as_str))
            .collect()
    }

    /// Axis to unit mapping across all generators.
    pub fn units(&self) -> BTreeMap<String, String> {
        self.generators.iter().flat_map(|g| g.units_by_axis()).collect()
    }

    /// Label of each index dimension, outermost first.
    pub fn index_names(&self) -> Vec<String> {
        self.generators.iter().flat_map(|g| g.index_names()).collect()
    }

    /// Compute every generator's positions and the surviving index set.
    /// Repeated calls reuse the cached layout.
    pub fn prepare_positions(&mut self) -> Result<()> {
        for g in &mut self.generators {
            g.prepare_positions();
        }
        if self.layout.is_set() {
            return Ok(());
        }
        let layout = self.build_layout()?;
        tracing::debug!(
            shape = ?layout.shape,
            total = layout.total,
            size = layout.len(),
            excluders = self.excluders.len(),
            "prepared compound scan"
        );
        self.layout.set(layout);
        Ok(())
    }

    /// Compute every generator's bounds.
    pub fn prepare_bounds(&mut self) {
        for g in &mut self.generators {
            g.prepare_bounds();
        }
    }

    /// Derive the layout from prepared generator positions.
    fn build_layout(&self) -> Result<Layout> {
        let sizes: Vec<usize> = self.generators.iter().map(Generator::size).collect();
        let dims: Vec<IndexDims> = self.generators.iter().map(Generator::index_dims).collect();
        let alternates = self.generators.iter().map(Generator::alternates).collect();
        let shape = dims.iter().flatten().copied().collect();
        let total = sizes
            .iter()
            .try_fold(1_usize, |acc, &s| acc.checked_mul(s))
            .ok_or_else(|| Error::InvalidParameter {
                field: "generators",
                reason: "the product of generator sizes overflows".into(),
            })?;

        let mut layout = Layout {
            sizes,
            dims,
            alternates,
            shape,
            total,
            survivors: None,
        };
        if self.excluders.is_empty() {
            return Ok(layout);
        }

        let masks = self
            .excluders
            .iter()
            .map(|e| ExclusionMask::build(e, &self.generators))
            .collect::<Result<Vec<_>>>()?;
        let survivors = (0..total)
            .filter(|&flat| {
                let samples = layout.samples(flat);
                masks.iter().all(|m| m.keeps(&samples))
            })
            .collect();
        layout.survivors = Some(survivors);
        Ok(layout)
    }

    /// Prepared layout.
    fn layout(&self, operation: &'static str) -> Result<&Layout> {
        self.layout.get().ok_or(Error::NotPrepared {
            operation,
            step: "prepare_positions",
        })
    }

    /// Number of points in the scan after exclusion.
    pub fn size(&self) -> Result<usize> {
        Ok(self.layout("size")?.len())
    }

    /// Unmasked index shape: the index dimensions of every generator,
    /// outermost first.
    pub fn shape(&self) -> Result<&[usize]> {
        Ok(&self.layout("shape")?.shape)
    }

    /// Everything needed to build points, borrowed from prepared state.
    fn frame(&self, operation: &'static str) -> Result<Frame<'_>> {
        let layout = self.layout(operation)?;
        let positions = self
            .generators
            .iter()
            .map(Generator::positions)
            .collect::<Result<Vec<_>>>()?;
        let innermost = self.generators.last().ok_or(Error::NoGenerators)?;
        let bounds = innermost.bounds().map_err(|_| Error::NotPrepared {
            operation,
            step: "prepare_bounds",
        })?;
        Ok(Frame {
            layout,
            positions,
            bounds,
            mutators: &self.mutators,
        })
    }

    /// The point at dense index `n`.
    pub fn point(&self, n: usize) -> Result<Point> {
        let frame = self.frame("point")?;
        let flat = frame.layout.flat(n).ok_or(Error::IndexOutOfRange {
            index: n,
            size: frame.layout.len(),
        })?;
        Ok(frame.point(n, flat))
    }

    /// Iterate every point of the scan in order. Each call starts from the
    /// first point.
    pub fn iterator(&self) -> Result<CompoundPoints<'_>> {
        let frame = self.frame("iterator")?;
        let end = frame.layout.len();
        Ok(CompoundPoints {
            frame,
            next: 0,
            end,
        })
    }
}

/// Prepared state borrowed from a [`CompoundGenerator`].
#[derive(Clone, Debug)]
struct Frame<'a> {
    /// Index bookkeeping.
    layout: &'a Layout,
    /// Positions of every generator, outermost first.
    positions: Vec<&'a AxisArrays>,
    /// Bounds of the innermost generator.
    bounds: &'a AxisArrays,
    /// Mutators in application order.
    mutators: &'a [Mutator],
}

impl Frame<'_> {
    /// Build the point at dense index `dense`, stored at `flat`.
    fn point(&self, dense: usize, flat: usize) -> Point {
        let samples = self.layout.samples(flat);
        let innermost = self.positions.len() - 1;
        let mut positions = AxisValues::new();
        let mut lower = AxisValues::new();
        let mut upper = AxisValues::new();
        let mut indexes = Indexes::new();

        for (g, (&(sample, reversed), arrays)) in samples.iter().zip(&self.positions).enumerate() {
            for (j, (axis, column)) in arrays.iter().enumerate() {
                let value = column[sample];
                let (lo, hi) = if g == innermost {
                    let edges = self.bounds.column(j);
                    let (enter, leave) = (edges[sample], edges[sample + 1]);
                    if reversed { (leave, enter) } else { (enter, leave) }
                } else {
                    (value, value)
                };
                positions.insert(axis.to_string(), value);
                lower.insert(axis.to_string(), lo);
                upper.insert(axis.to_string(), hi);
            }
            indexes.extend(unravel(sample, &self.layout.dims[g]));
        }

        self.mutators
            .iter()
            .fold(Point::new(positions, lower, upper, indexes), |p, m| {
                m.mutate(p, dense)
            })
    }
}

/// Lazy sequence of the points of a prepared [`CompoundGenerator`].
#[derive(Clone, Debug)]
pub struct CompoundPoints<'a> {
    /// Prepared state.
    frame: Frame<'a>,
    /// Next dense index.
    next: usize,
    /// One past the last dense index.
    end: usize,
}

impl Iterator for CompoundPoints<'_> {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.next >= self.end {
            return None;
        }
        let dense = self.next;
        let flat = self.frame.layout.flat(dense)?;
        self.next += 1;
        Some(self.frame.point(dense, flat))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.end - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for CompoundPoints<'_> {}

impl FusedIterator for CompoundPoints<'_> {}

impl TypeTag for CompoundGenerator {
    const TYPEID: &'static str = "scanpointgenerator:generator/CompoundGenerator:1.0";
    const LEGACY: &'static [&'static str] = &["CompoundGenerator"];
}

impl Serializable for CompoundGenerator {
    fn to_dict(&self) -> Dict {
        /// Serialize each component of a list.
        fn list<T: Serializable>(items: &[T]) -> Value {
            Value::Array(items.iter().map(|i| Value::Object(i.to_dict())).collect())
        }
        dict::tagged(
            Self::TYPEID,
            [
                ("generators", list(&self.generators)),
                ("excluders", list(&self.excluders)),
                ("mutators", list(&self.mutators)),
            ],
        )
    }

    fn from_dict(dict: &Dict) -> Result<Self> {
        let f: CompoundFields = dict::fields(Self::TYPEID, dict)?;
        Self::new(
            dict::decode_all(&f.generators, registry::generator_from_dict)?,
            dict::decode_all(&f.excluders, registry::excluder_from_dict)?,
            dict::decode_all(&f.mutators, registry::mutator_from_dict)?,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        generators::LineGenerator, mutators::RandomOffsetMutator, roi::CircularRoi,
    };

    fn grid(alternate: bool) -> Result<CompoundGenerator> {
        let y = LineGenerator::new("y", "mm", 0.0, 3.0, 4)?;
        let x = LineGenerator::new("x", "mm", 0.0, 4.0, 5)?.alternating(alternate);
        CompoundGenerator::new(vec![y.into(), x.into()], vec![], vec![])
    }

    fn prepared(mut g: CompoundGenerator) -> Result<CompoundGenerator> {
        g.prepare_positions()?;
        g.prepare_bounds();
        Ok(g)
    }

    #[test]
    fn snake_samples() -> Result<()> {
        let g = prepared(grid(true)?)?;
        let layout = g.layout("test")?;
        let inner: Vec<usize> = (0..10).map(|f| layout.samples(f)[1].0).collect();
        assert_eq!(inner, vec![0, 1, 2, 3, 4, 4, 3, 2, 1, 0]);
        assert!(layout.samples(7)[1].1);
        assert!(!layout.samples(2)[1].1);
        Ok(())
    }

    #[test]
    fn three_level_snake() -> Result<()> {
        let z = LineGenerator::new("z", "mm", 0.0, 1.0, 2)?;
        let y = LineGenerator::new("y", "mm", 0.0, 1.0, 2)?.alternating(true);
        let x = LineGenerator::new("x", "mm", 0.0, 1.0, 2)?.alternating(true);
        let g = prepared(CompoundGenerator::new(
            vec![z.into(), y.into(), x.into()],
            vec![],
            vec![],
        )?)?;
        let visited: Vec<(usize, usize)> = g
            .iterator()?
            .map(|p| (p.indexes()[1], p.indexes()[2]))
            .collect();
        assert_eq!(
            visited,
            vec![(0, 0), (0, 1), (1, 1), (1, 0), (1, 0), (1, 1), (0, 1), (0, 0)]
        );
        Ok(())
    }

    #[test]
    fn mask_spans_two_generators() -> Result<()> {
        let y = LineGenerator::new("y", "mm", 0.0, 2.0, 3)?;
        let x = LineGenerator::new("x", "mm", 0.0, 2.0, 3)?;
        let e = Excluder::new(CircularRoi::new([0.0, 0.0], 1.0)?, ["x", "y"])?;
        let g = prepared(CompoundGenerator::new(vec![y.into(), x.into()], vec![e], vec![])?)?;
        let layout = g.layout("test")?;
        assert_eq!(layout.survivors.as_deref(), Some(&[0, 1, 3][..]));
        assert_eq!(g.size()?, 3);
        Ok(())
    }

    #[test]
    fn rejects_unknown_axes() -> Result<()> {
        let x = LineGenerator::new("x", "mm", 0.0, 1.0, 2)?;
        let e = Excluder::new(CircularRoi::new([0.0, 0.0], 1.0)?, ["x", "q"])?;
        let err = CompoundGenerator::new(vec![x.clone().into()], vec![e], vec![]).unwrap_err();
        assert!(matches!(err, Error::UnknownAxis(ref a) if a == "q"), "{err}");

        let m = RandomOffsetMutator::new(1, [("w", 0.1)])?;
        let err = CompoundGenerator::new(vec![x.into()], vec![], vec![m.into()]).unwrap_err();
        assert!(matches!(err, Error::UnknownAxis(ref a) if a == "w"), "{err}");
        Ok(())
    }

    #[test]
    fn needs_generators() {
        assert!(matches!(
            CompoundGenerator::new(vec![], vec![], vec![]),
            Err(Error::NoGenerators)
        ));
    }

    #[test]
    fn prepare_is_idempotent() -> Result<()> {
        let mut g = prepared(grid(false)?)?;
        let before: Vec<Point> = g.iterator()?.collect();
        g.prepare_positions()?;
        g.prepare_bounds();
        let after: Vec<Point> = g.iterator()?.collect();
        assert_eq!(before, after);
        assert_eq!(g, grid(false)?);
        Ok(())
    }
}

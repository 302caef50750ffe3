use std::collections::BTreeMap;

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Deserialize;
use serde_json::json;

use super::Mutate;
use crate::{
    dict::{self, Dict, Serializable, TypeTag},
    error::{Error, Result},
    point::Point,
};

/// Odd constant spreading consecutive indices across the seed space.
const INDEX_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Moves each position by a uniform offset in `[-max, +max]` on every
/// configured axis.
///
/// Offsets are drawn from a generator seeded by the mutator seed and the
/// dense index, so traversing a scan twice yields identical points. Bounds
/// are left untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomOffsetMutator {
    /// Base seed.
    seed: u64,
    /// Largest offset per axis.
    max_offset: BTreeMap<String, f64>,
}

/// Serialized fields of a random offset mutator.
#[derive(Deserialize)]
struct RandomOffsetFields {
    /// Base seed.
    seed: u64,
    /// Largest offset per axis.
    max_offset: BTreeMap<String, f64>,
}

impl RandomOffsetMutator {
    /// Offsets bounded per axis by `max_offset`.
    pub fn new<'a>(
        seed: u64,
        max_offset: impl IntoIterator<Item = (&'a str, f64)>,
    ) -> Result<Self> {
        Self::build(
            seed,
            max_offset
                .into_iter()
                .map(|(axis, m)| (axis.to_string(), m))
                .collect(),
        )
    }

    /// Validate magnitudes.
    fn build(seed: u64, max_offset: BTreeMap<String, f64>) -> Result<Self> {
        if let Some((axis, m)) = max_offset.iter().find(|(_, m)| !(m.is_finite() && **m >= 0.0)) {
            return Err(Error::InvalidParameter {
                field: "max_offset",
                reason: format!("offset for `{axis}` must be finite and non-negative, got {m}"),
            });
        }
        Ok(Self { seed, max_offset })
    }

    /// Base seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Largest offset per axis.
    pub fn max_offset(&self) -> &BTreeMap<String, f64> {
        &self.max_offset
    }

    /// Generator for the point at `index`.
    fn rng(&self, index: usize) -> StdRng {
        let mix = (index as u64).wrapping_add(1).wrapping_mul(INDEX_MIX);
        StdRng::seed_from_u64(self.seed ^ mix)
    }
}

impl Mutate for RandomOffsetMutator {
    fn mutate(&self, point: Point, index: usize) -> Point {
        let mut rng = self.rng(index);
        let mut positions = point.positions().clone();
        for (axis, max) in &self.max_offset {
            let r: f64 = rng.gen_range(-1.0..=1.0);
            if let Some(value) = positions.get_mut(axis) {
                *value += r * max;
            }
        }
        point.with_positions(positions)
    }

    fn axes(&self) -> Vec<&str> {
        self.max_offset.keys().map(String::as_str).collect()
    }
}

impl TypeTag for RandomOffsetMutator {
    const TYPEID: &'static str = "scanpointgenerator:mutator/RandomOffsetMutator:1.0";
    const LEGACY: &'static [&'static str] = &["RandomOffsetMutator"];
}

impl Serializable for RandomOffsetMutator {
    fn to_dict(&self) -> Dict {
        dict::tagged(
            Self::TYPEID,
            [
                ("seed", json!(self.seed)),
                ("max_offset", json!(self.max_offset)),
            ],
        )
    }

    fn from_dict(dict: &Dict) -> Result<Self> {
        let f: RandomOffsetFields = dict::fields(Self::TYPEID, dict)?;
        Self::build(f.seed, f.max_offset)
    }
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;

    use super::*;
    use crate::point::AxisValues;

    fn point(x: f64, y: f64) -> Point {
        let positions: AxisValues = [("x".to_string(), x), ("y".to_string(), y)].into();
        Point::new(positions.clone(), positions.clone(), positions, smallvec![0])
    }

    #[test]
    fn bounded_and_deterministic() -> Result<()> {
        let m = RandomOffsetMutator::new(2, [("x", 0.25), ("y", 0.5)])?;
        for index in 0..100 {
            let a = m.mutate(point(1.0, 2.0), index);
            let b = m.mutate(point(1.0, 2.0), index);
            assert_eq!(a, b);
            assert!((a.positions()["x"] - 1.0).abs() <= 0.25);
            assert!((a.positions()["y"] - 2.0).abs() <= 0.5);
            assert_eq!(a.lower()["x"], 1.0);
            assert_eq!(a.upper()["y"], 2.0);
        }
        Ok(())
    }

    #[test]
    fn differs_per_index() -> Result<()> {
        let m = RandomOffsetMutator::new(7, [("x", 1.0)])?;
        let a = m.mutate(point(0.0, 0.0), 0);
        let b = m.mutate(point(0.0, 0.0), 1);
        assert_ne!(a.positions()["x"], b.positions()["x"]);
        assert_eq!(a.positions()["y"], 0.0);
        Ok(())
    }

    #[test]
    fn zero_offset_is_identity() -> Result<()> {
        let m = RandomOffsetMutator::new(1, [("x", 0.0)])?;
        assert_eq!(m.mutate(point(3.0, 4.0), 5), point(3.0, 4.0));
        Ok(())
    }

    #[test]
    fn rejects_negative_offset() {
        assert!(RandomOffsetMutator::new(1, [("x", -0.1)]).is_err());
        assert!(RandomOffsetMutator::new(1, [("x", f64::INFINITY)]).is_err());
    }

    #[test]
    fn to_dict() -> Result<()> {
        let m = RandomOffsetMutator::new(2, [("y", 0.5), ("x", 0.25)])?;
        let expected = json!({
            "typeid": "scanpointgenerator:mutator/RandomOffsetMutator:1.0",
            "seed": 2,
            "max_offset": {"x": 0.25, "y": 0.5}
        });
        assert_eq!(serde_json::Value::Object(m.to_dict()), expected);
        assert_eq!(RandomOffsetMutator::from_dict(&m.to_dict())?, m);
        Ok(())
    }
}

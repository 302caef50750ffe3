//! Deterministic perturbations applied to generated points.

use crate::{
    dict::{Dict, Serializable, TypeTag},
    error::Result,
    point::Point,
    registry,
};

/// Seeded random offsets.
pub mod random_offset;

pub use self::random_offset::RandomOffsetMutator;

/// A pure transformation of a point, keyed on its dense index in the scan.
pub trait Mutate {
    /// Return the transformed point. The same `point` and `index` always
    /// produce the same result.
    fn mutate(&self, point: Point, index: usize) -> Point;

    /// Axes whose positions this mutator may change.
    fn axes(&self) -> Vec<&str>;
}

/// Any of the mutators this crate provides.
#[derive(Clone, Debug, PartialEq)]
pub enum Mutator {
    /// Bounded uniform offsets.
    RandomOffset(RandomOffsetMutator),
}

impl Mutator {
    /// Versioned type tag of the wrapped mutator.
    pub fn typeid(&self) -> &'static str {
        match self {
            Self::RandomOffset(_) => RandomOffsetMutator::TYPEID,
        }
    }
}

impl Mutate for Mutator {
    fn mutate(&self, point: Point, index: usize) -> Point {
        match self {
            Self::RandomOffset(m) => m.mutate(point, index),
        }
    }

    fn axes(&self) -> Vec<&str> {
        match self {
            Self::RandomOffset(m) => m.axes(),
        }
    }
}

impl Serializable for Mutator {
    fn to_dict(&self) -> Dict {
        match self {
            Self::RandomOffset(m) => m.to_dict(),
        }
    }

    fn from_dict(dict: &Dict) -> Result<Self> {
        registry::mutator_from_dict(dict)
    }
}

impl From<RandomOffsetMutator> for Mutator {
    fn from(m: RandomOffsetMutator) -> Self {
        Self::RandomOffset(m)
    }
}

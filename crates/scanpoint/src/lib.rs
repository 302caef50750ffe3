//! Core library for composing multi‑dimensional scan trajectories.
//!
//! Generators produce points along one or more named axes, excluders mask
//! combinations that fall outside a region of interest, and mutators perturb
//! positions deterministically. A [`CompoundGenerator`] nests any number of
//! generators into one lazily iterated, index‑addressable scan.
//!
//! # Supported Generators
//!
//! - Line (one or more axes moving together)
//! - Spiral (Fermat spiral)
//! - Lissajous
//! - Array (explicit positions)
//!
//! Every component converts to and from a typed dictionary form via
//! [`Serializable`] and the [`registry`].

/// Shared axis bookkeeping: per‑axis arrays and name validation.
pub mod axes;
/// Derived state that does not take part in equality.
pub mod cache;
/// Combining generators, excluders and mutators into a single scan.
pub mod compound;
/// Ordered dictionary representation and the `Serializable` trait.
pub mod dict;
/// Error types used across the crate.
pub mod error;
/// Binding regions of interest to pairs of axes.
pub mod excluder;
/// Implementations of specific point generators.
pub mod generators;
/// Deterministic position perturbations.
pub mod mutators;
/// Points produced by generators.
pub mod point;
/// Regions of interest over two axes.
pub mod roi;

/// Central registry of serialized type tags and constructors.
pub mod registry;

pub use crate::{
    compound::CompoundGenerator,
    dict::{Dict, Serializable, TypeTag},
    excluder::Excluder,
    generators::{Generator, ScanGenerator},
    mutators::{Mutate, Mutator},
    point::Point,
    roi::{RegionOfInterest, Roi},
};

/// Reconstruct a compound scan from any JSON value holding its dictionary.
///
/// Returns an error if the value is not an object, describes a component
/// other than a compound scan, or fails validation.
pub fn compound_from_value(value: &serde_json::Value) -> error::Result<CompoundGenerator> {
    registry::compound_from_dict(dict::as_dict(value)?)
}

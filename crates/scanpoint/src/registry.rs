//! Registry of serializable components.
//!
//! Each entry maps a versioned `typeid`, plus the unversioned tags older
//! payloads used, to the constructor that rebuilds the component from its
//! dictionary form.

use crate::{
    compound::CompoundGenerator,
    dict::{self, Dict, Serializable, TypeTag},
    error::{Error, Result},
    excluder::Excluder,
    generators::{
        ArrayGenerator, LineGenerator, LissajousGenerator, ScanGenerator, SpiralGenerator,
    },
    mutators::{Mutator, RandomOffsetMutator},
    roi::{CircularRoi, EllipticalRoi, PolygonalRoi, RectangularRoi, Roi},
};

/// A component rebuilt from its dictionary form.
#[derive(Clone, Debug, PartialEq)]
pub enum Component {
    /// A point generator.
    Generator(ScanGenerator),
    /// A region of interest.
    Roi(Roi),
    /// An excluder.
    Excluder(Excluder),
    /// A mutator.
    Mutator(Mutator),
    /// A compound scan.
    Compound(Box<CompoundGenerator>),
}

impl Component {
    /// Versioned type tag of the wrapped component.
    pub fn typeid(&self) -> &'static str {
        match self {
            Self::Generator(g) => g.typeid(),
            Self::Roi(r) => r.typeid(),
            Self::Excluder(_) => Excluder::TYPEID,
            Self::Mutator(m) => m.typeid(),
            Self::Compound(_) => CompoundGenerator::TYPEID,
        }
    }

    /// Family name used in error messages.
    fn family(&self) -> &'static str {
        match self {
            Self::Generator(_) => "generator",
            Self::Roi(_) => "region of interest",
            Self::Excluder(_) => "excluder",
            Self::Mutator(_) => "mutator",
            Self::Compound(_) => "compound generator",
        }
    }
}

impl Serializable for Component {
    fn to_dict(&self) -> Dict {
        match self {
            Self::Generator(g) => g.to_dict(),
            Self::Roi(r) => r.to_dict(),
            Self::Excluder(e) => e.to_dict(),
            Self::Mutator(m) => m.to_dict(),
            Self::Compound(c) => c.to_dict(),
        }
    }

    fn from_dict(dict: &Dict) -> Result<Self> {
        construct(dict)
    }
}

/// A registered component type.
#[derive(Clone, Copy, Debug)]
pub struct Registration {
    /// Versioned type tag.
    pub typeid: &'static str,
    /// Tags accepted from older payloads.
    pub legacy: &'static [&'static str],
    /// Rebuild the component from its dictionary.
    pub construct: fn(&Dict) -> Result<Component>,
}

impl Registration {
    /// True when `tag` names this registration.
    pub fn matches(&self, tag: &str) -> bool {
        self.typeid == tag || self.legacy.contains(&tag)
    }
}

/// Decode a generator variant.
fn generator<T: Serializable + Into<ScanGenerator>>(dict: &Dict) -> Result<Component> {
    Ok(Component::Generator(T::from_dict(dict)?.into()))
}

/// Decode a region variant.
fn roi<T: Serializable + Into<Roi>>(dict: &Dict) -> Result<Component> {
    Ok(Component::Roi(T::from_dict(dict)?.into()))
}

/// Decode a mutator variant.
fn mutator<T: Serializable + Into<Mutator>>(dict: &Dict) -> Result<Component> {
    Ok(Component::Mutator(T::from_dict(dict)?.into()))
}

/// Decode an excluder.
fn excluder(dict: &Dict) -> Result<Component> {
    Ok(Component::Excluder(Excluder::from_dict(dict)?))
}

/// Decode a compound scan.
fn compound(dict: &Dict) -> Result<Component> {
    Ok(Component::Compound(Box::new(CompoundGenerator::from_dict(
        dict,
    )?)))
}

/// Build a [`Registration`] from a type's tags and a decoder.
macro_rules! register {
    ($ty:ty, $construct:expr) => {
        Registration {
            typeid: <$ty as TypeTag>::TYPEID,
            legacy: <$ty as TypeTag>::LEGACY,
            construct: $construct,
        }
    };
}

/// Every component type that can be rebuilt from a dictionary.
pub const REGISTRY: &[Registration] = &[
    register!(LineGenerator, generator::<LineGenerator>),
    register!(SpiralGenerator, generator::<SpiralGenerator>),
    register!(LissajousGenerator, generator::<LissajousGenerator>),
    register!(ArrayGenerator, generator::<ArrayGenerator>),
    register!(CircularRoi, roi::<CircularRoi>),
    register!(RectangularRoi, roi::<RectangularRoi>),
    register!(EllipticalRoi, roi::<EllipticalRoi>),
    register!(PolygonalRoi, roi::<PolygonalRoi>),
    register!(Excluder, excluder),
    register!(RandomOffsetMutator, mutator::<RandomOffsetMutator>),
    register!(CompoundGenerator, compound),
];

/// Versioned tags of every registered type.
pub fn type_ids() -> Vec<&'static str> {
    REGISTRY.iter().map(|r| r.typeid).collect()
}

/// Look up the registration for a versioned or legacy tag.
pub fn find(tag: &str) -> Option<&'static Registration> {
    REGISTRY.iter().find(|r| r.matches(tag))
}

/// Rebuild whatever component `dict` describes.
pub fn construct(dict: &Dict) -> Result<Component> {
    construct_tagged(dict, dict::type_tag(dict)?)
}

/// Rebuild the component registered under `tag`.
fn construct_tagged(dict: &Dict, tag: &str) -> Result<Component> {
    let registration = find(tag).ok_or_else(|| Error::UnregisteredType(tag.to_string()))?;
    (registration.construct)(dict)
}

/// Fail with [`Error::WrongFamily`] for a component of another family.
fn wrong_family(expected: &'static str, found: &Component) -> Error {
    tracing::debug!(expected, found = found.family(), "component family mismatch");
    Error::WrongFamily {
        expected,
        typeid: found.typeid().to_string(),
    }
}

/// Rebuild a generator.
pub fn generator_from_dict(dict: &Dict) -> Result<ScanGenerator> {
    match construct(dict)? {
        Component::Generator(g) => Ok(g),
        other => Err(wrong_family("generator", &other)),
    }
}

/// Rebuild a region of interest. Payloads tagged only by their shape `name`
/// are accepted here.
pub fn roi_from_dict(dict: &Dict) -> Result<Roi> {
    match construct_tagged(dict, dict::roi_type_tag(dict)?)? {
        Component::Roi(r) => Ok(r),
        other => Err(wrong_family("region of interest", &other)),
    }
}

/// Rebuild an excluder.
pub fn excluder_from_dict(dict: &Dict) -> Result<Excluder> {
    match construct(dict)? {
        Component::Excluder(e) => Ok(e),
        other => Err(wrong_family("excluder", &other)),
    }
}

/// Rebuild a mutator.
pub fn mutator_from_dict(dict: &Dict) -> Result<Mutator> {
    match construct(dict)? {
        Component::Mutator(m) => Ok(m),
        other => Err(wrong_family("mutator", &other)),
    }
}

/// Rebuild a compound scan.
pub fn compound_from_dict(dict: &Dict) -> Result<CompoundGenerator> {
    match construct(dict)? {
        Component::Compound(c) => Ok(*c),
        other => Err(wrong_family("compound generator", &other)),
    }
}

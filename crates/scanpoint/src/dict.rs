//! Ordered dictionary form shared by every serializable component.
//!
//! A dictionary is a JSON object whose first entry is the `typeid` tag,
//! followed by the component's own fields in a fixed order. Older payloads
//! may carry a `type` tag instead; both are accepted when decoding.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Ordered mapping used as the serialized form of every component.
pub type Dict = Map<String, Value>;

/// Key holding the current, versioned type tag.
pub const TYPEID_KEY: &str = "typeid";
/// Key holding the unversioned type tag of older payloads.
pub const LEGACY_TYPE_KEY: &str = "type";
/// Key holding the shape name that very old ROI payloads used as a tag.
pub const LEGACY_NAME_KEY: &str = "name";

/// Type tags identifying a concrete component in the dictionary form.
pub trait TypeTag {
    /// Stable, versioned type tag written as the first dictionary entry.
    const TYPEID: &'static str;
    /// Unversioned tags accepted from older payloads.
    const LEGACY: &'static [&'static str];
}

/// Conversion to and from the dictionary form.
pub trait Serializable: Sized {
    /// Serialize to an ordered dictionary starting with `typeid`.
    fn to_dict(&self) -> Dict;

    /// Rebuild a live component from its dictionary form, re‑running the
    /// same validation as the typed constructor.
    fn from_dict(dict: &Dict) -> Result<Self>;
}

/// Build a dictionary from a type tag and fields in their documented order.
pub fn tagged<const N: usize>(typeid: &str, fields: [(&str, Value); N]) -> Dict {
    let mut dict = Dict::new();
    dict.insert(TYPEID_KEY.to_string(), Value::String(typeid.to_string()));
    for (key, value) in fields {
        dict.insert(key.to_string(), value);
    }
    dict
}

/// Decode the fields of a dictionary into a serde structure. Tag entries and
/// unknown keys are ignored.
pub fn fields<T: DeserializeOwned>(typeid: &str, dict: &Dict) -> Result<T> {
    serde_json::from_value(Value::Object(dict.clone())).map_err(|source| Error::Payload {
        typeid: typeid.to_string(),
        source,
    })
}

/// Return the type tag of a dictionary: `typeid`, else the legacy `type`.
pub fn type_tag(dict: &Dict) -> Result<&str> {
    first_tag(dict, &[TYPEID_KEY, LEGACY_TYPE_KEY])
}

/// Return the type tag of a region of interest, which very old payloads
/// spelled as the shape `name`.
pub fn roi_type_tag(dict: &Dict) -> Result<&str> {
    first_tag(dict, &[TYPEID_KEY, LEGACY_TYPE_KEY, LEGACY_NAME_KEY])
}

/// The first string value among `keys`.
fn first_tag<'a>(dict: &'a Dict, keys: &[&str]) -> Result<&'a str> {
    keys.iter()
        .find_map(|key| dict.get(*key).and_then(Value::as_str))
        .ok_or(Error::MissingField(TYPEID_KEY))
}

/// View a JSON value as a dictionary.
pub fn as_dict(value: &Value) -> Result<&Dict> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Err(Error::NotADict("null")),
        Value::Bool(_) => Err(Error::NotADict("a boolean")),
        Value::Number(_) => Err(Error::NotADict("a number")),
        Value::String(_) => Err(Error::NotADict("a string")),
        Value::Array(_) => Err(Error::NotADict("an array")),
    }
}

/// Decode every element of a list of dictionaries with `decode`.
pub fn decode_all<T>(values: &[Value], decode: impl Fn(&Dict) -> Result<T>) -> Result<Vec<T>> {
    values.iter().map(|v| as_dict(v).and_then(&decode)).collect()
}

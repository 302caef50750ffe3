//! Integration tests for the dictionary form of every component.
#[cfg(test)]
mod tests {
    use scanpoint::{
        CompoundGenerator, Excluder, Mutator, Roi, ScanGenerator, Serializable,
        compound_from_value,
        dict::{self, Dict},
        error::{self, Error, ErrorKind},
        generators::{
            ArrayGenerator, LineGenerator, LissajousGenerator, SpiralGenerator,
            lissajous::BoundingBox,
        },
        mutators::RandomOffsetMutator,
        registry::{self, Component},
        roi::{CircularRoi, EllipticalRoi, PolygonalRoi, RectangularRoi},
    };
    use serde_json::{Value, json};

    fn line() -> error::Result<ScanGenerator> {
        Ok(LineGenerator::new("x", "mm", 1.0, 9.0, 5)?.alternating(true).into())
    }

    fn multi_line() -> error::Result<ScanGenerator> {
        Ok(LineGenerator::with_axes(&["a", "b"], "mm", &[0.0, 1.0], &[2.0, 3.0], 4)?.into())
    }

    fn spiral() -> error::Result<ScanGenerator> {
        Ok(SpiralGenerator::new(["x", "y"], &["mm", "cm"], [1.0, 2.0], 3.0, 0.5)?.into())
    }

    fn lissajous() -> error::Result<ScanGenerator> {
        let bb = BoundingBox {
            centre: [0.0, 0.0],
            width: 1.0,
            height: 2.0,
        };
        Ok(LissajousGenerator::new(["x", "y"], &["mm"], bb, 2, None)?.into())
    }

    fn array() -> error::Result<ScanGenerator> {
        Ok(ArrayGenerator::new("z", "deg", &[0.0, 0.5, 2.0])?.into())
    }

    fn circle() -> error::Result<Roi> {
        Ok(CircularRoi::new([0.0, 1.0], 2.0)?.into())
    }

    fn rectangle() -> error::Result<Roi> {
        Ok(RectangularRoi::rotated([0.0, 1.0], 2.0, 3.0, 0.25)?.into())
    }

    fn ellipse() -> error::Result<Roi> {
        Ok(EllipticalRoi::new([1.0, 1.0], [2.0, 0.5], 0.1)?.into())
    }

    fn polygon() -> error::Result<Roi> {
        Ok(PolygonalRoi::new(&[0.0, 1.0, 0.5], &[0.0, 0.0, 1.0])?.into())
    }

    fn offset() -> error::Result<Mutator> {
        Ok(RandomOffsetMutator::new(3, [("x", 0.1), ("y", 0.2)])?.into())
    }

    fn excluder() -> error::Result<Excluder> {
        Excluder::new(CircularRoi::new([2.0, 1.0], 2.0)?, ["x", "y"])
    }

    fn compound() -> error::Result<CompoundGenerator> {
        let y = LineGenerator::new("y", "mm", 0.0, 3.0, 4)?;
        CompoundGenerator::new(
            vec![y.into(), line()?],
            vec![excluder()?],
            vec![offset()?],
        )
    }

    /// Serialize through JSON text and back, as a consumer storing scans would.
    fn through_text<T: Serializable>(value: &T) -> error::Result<T> {
        let text = Value::Object(value.to_dict()).to_string();
        let parsed: Value = serde_json::from_str(&text).expect("valid json");
        T::from_dict(dict::as_dict(&parsed)?)
    }

    macro_rules! round_trip_tests {
        ($(($name:ident, $build:expr)),* $(,)?) => {
            $(
                paste::paste! {
                    #[test]
                    fn [<round_trip_ $name>]() -> error::Result<()> {
                        let original = $build?;
                        assert_eq!(through_text(&original)?, original);
                        Ok(())
                    }

                    #[test]
                    fn [<registry_ $name>]() -> error::Result<()> {
                        let original = $build?;
                        let d = original.to_dict();
                        let component = registry::construct(&d)?;
                        assert_eq!(component.to_dict(), d);
                        assert_eq!(Some(component.typeid()), d["typeid"].as_str());
                        Ok(())
                    }
                }
            )*
        };
    }

    round_trip_tests! {
        (line, line()),
        (multi_line, multi_line()),
        (spiral, spiral()),
        (lissajous, lissajous()),
        (array, array()),
        (circle, circle()),
        (rectangle, rectangle()),
        (ellipse, ellipse()),
        (polygon, polygon()),
        (random_offset, offset()),
        (excluder, excluder()),
        (compound, compound()),
    }

    /// Replace the `typeid` entry with a legacy `type` entry.
    fn legacy(mut d: Dict, tag: &str) -> Dict {
        d.remove("typeid");
        d.insert("type".into(), Value::String(tag.into()));
        d
    }

    macro_rules! legacy_tag_tests {
        ($(($name:ident, $ty:ty, $build:expr, $tag:expr)),* $(,)?) => {
            $(
                paste::paste! {
                    #[test]
                    fn [<legacy_tag_ $name>]() -> error::Result<()> {
                        let original = $build?;
                        let decoded = <$ty>::from_dict(&legacy(original.to_dict(), $tag))?;
                        assert_eq!(decoded, original);
                        Ok(())
                    }
                }
            )*
        };
    }

    legacy_tag_tests! {
        (line, ScanGenerator, line(), "LineGenerator"),
        (spiral, ScanGenerator, spiral(), "SpiralGenerator"),
        (lissajous, ScanGenerator, lissajous(), "LissajousGenerator"),
        (array, ScanGenerator, array(), "ArrayGenerator"),
        (circle, Roi, circle(), "CircularROI"),
        (rectangle, Roi, rectangle(), "RectangularROI"),
        (ellipse, Roi, ellipse(), "EllipticalROI"),
        (polygon, Roi, polygon(), "PolygonalROI"),
        (random_offset, Mutator, offset(), "RandomOffsetMutator"),
        (excluder, Excluder, excluder(), "Excluder"),
        (compound, CompoundGenerator, compound(), "CompoundGenerator"),
    }

    #[test]
    fn legacy_roi_shape_name() -> error::Result<()> {
        let value = json!({"name": "Rectangle", "start": [0, 0], "width": 1, "height": 2});
        let roi = Roi::from_dict(dict::as_dict(&value)?)?;
        assert_eq!(roi, Roi::from(RectangularRoi::new([0.0, 0.0], 1.0, 2.0)?));
        Ok(())
    }

    #[test]
    fn compound_dict_layout() -> error::Result<()> {
        let d = compound()?.to_dict();
        let keys: Vec<&str> = d.keys().map(String::as_str).collect();
        assert_eq!(keys, ["typeid", "generators", "excluders", "mutators"]);
        assert_eq!(d["generators"][1]["typeid"], "scanpointgenerator:generator/LineGenerator:1.0");
        assert_eq!(d["excluders"][0]["roi"]["radius"], 2.0);
        assert_eq!(d["mutators"][0]["seed"], 3);
        Ok(())
    }

    #[test]
    fn compound_from_plain_value() -> error::Result<()> {
        let value = json!({
            "type": "CompoundGenerator",
            "generators": [
                {"type": "LineGenerator", "name": "y", "units": "mm",
                 "start": [0.0], "stop": [3.0], "num": 4},
                {"type": "LineGenerator", "name": "x", "units": "mm",
                 "start": [0.0], "stop": [4.0], "num": 5, "alternate_direction": true}
            ],
            "excluders": [],
            "mutators": []
        });
        let mut g = compound_from_value(&value)?;
        g.prepare_positions()?;
        g.prepare_bounds();
        assert_eq!(g.size()?, 20);
        assert_eq!(g.units()["x"], "mm");
        Ok(())
    }

    #[test]
    fn unregistered_type() -> error::Result<()> {
        let value = json!({"typeid": "scanpointgenerator:generator/GridGenerator:1.0"});
        let err = ScanGenerator::from_dict(dict::as_dict(&value)?).unwrap_err();
        assert!(matches!(err, Error::UnregisteredType(_)), "{err}");
        assert_eq!(err.kind(), ErrorKind::Serialization);
        Ok(())
    }

    #[test]
    fn validation_reruns_on_decode() -> error::Result<()> {
        let value = json!({
            "typeid": "scanpointgenerator:roi/CircularROI:1.0",
            "centre": [0, 0],
            "radius": 0
        });
        let err = Roi::from_dict(dict::as_dict(&value)?).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let value = json!({
            "typeid": "scanpointgenerator:generator/CompoundGenerator:1.0",
            "generators": [
                {"typeid": "scanpointgenerator:generator/LineGenerator:1.0",
                 "name": "x", "units": "mm", "start": [0.0], "stop": [1.0], "num": 2}
            ],
            "excluders": [
                {"typeid": "scanpointgenerator:excluder/Excluder:1.0",
                 "roi": {"typeid": "scanpointgenerator:roi/CircularROI:1.0",
                         "centre": [0, 0], "radius": 1},
                 "axes": ["x", "y"]}
            ]
        });
        let err = compound_from_value(&value).unwrap_err();
        assert!(matches!(err, Error::UnknownAxis(ref a) if a == "y"), "{err}");
        Ok(())
    }

    #[test]
    fn malformed_payloads() -> error::Result<()> {
        let missing = json!({
            "typeid": "scanpointgenerator:generator/LineGenerator:1.0",
            "name": "x"
        });
        let err = ScanGenerator::from_dict(dict::as_dict(&missing)?).unwrap_err();
        assert!(matches!(err, Error::Payload { .. }), "{err}");

        let untagged = json!({"centre": [0, 0], "radius": 1});
        let err = Roi::from_dict(dict::as_dict(&untagged)?).unwrap_err();
        assert!(matches!(err, Error::MissingField("typeid")), "{err}");

        assert!(matches!(compound_from_value(&json!([])), Err(Error::NotADict(_))));

        let line = Value::Object(line()?.to_dict());
        let err = compound_from_value(&line).unwrap_err();
        assert!(matches!(err, Error::WrongFamily { .. }), "{err}");
        Ok(())
    }

    #[test]
    fn family_mismatch() -> error::Result<()> {
        let d = offset()?.to_dict();
        assert!(matches!(Roi::from_dict(&d), Err(Error::WrongFamily { .. })));
        assert!(matches!(registry::construct(&d)?, Component::Mutator(_)));
        Ok(())
    }
}

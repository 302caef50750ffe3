//! Snake grid masked by a circle: build, serialize, rebuild and iterate.
//!
//! Run with `RUST_LOG=scanpoint=debug` to see preparation events.

use std::error::Error;

use scanpoint::{
    CompoundGenerator, Excluder, Serializable,
    generators::LineGenerator,
    mutators::RandomOffsetMutator,
    roi::CircularRoi,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let x = LineGenerator::new("x", "mm", 0.0, 4.0, 5)?.alternating(true);
    let y = LineGenerator::new("y", "mm", 0.0, 3.0, 4)?;
    let circle = Excluder::new(CircularRoi::new([2.0, 1.0], 2.0)?, ["x", "y"])?;
    let jitter = RandomOffsetMutator::new(2, [("x", 0.25), ("y", 0.25)])?;
    let scan = CompoundGenerator::new(vec![y.into(), x.into()], vec![circle], vec![jitter.into()])?;

    let text = serde_json::to_string_pretty(&serde_json::Value::Object(scan.to_dict()))?;
    println!("{text}");

    let mut scan = scanpoint::compound_from_value(&serde_json::from_str(&text)?)?;
    scan.prepare_positions()?;
    scan.prepare_bounds();
    println!("{} of {:?} points survive", scan.size()?, scan.shape()?);

    for (n, point) in scan.iterator()?.enumerate() {
        println!(
            "{n:>3} {:?} x={:.3} y={:.3}",
            point.indexes(),
            point.positions()["x"],
            point.positions()["y"]
        );
    }

    Ok(())
}

use crate::generate::Snapshot;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let schema = schemars::schema_for!(Snapshot);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

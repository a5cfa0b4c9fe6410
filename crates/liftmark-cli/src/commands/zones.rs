use liftmark_core::heart_rate::calculate_zones;

use crate::error::CliError;

pub fn run_zones(age: u32, as_json: bool) -> Result<(), CliError> {
    let result = calculate_zones(age)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("Max heart rate: {} bpm", result.max_heart_rate);
    for zone in &result.zones {
        println!(
            "{:<10}  {:>3}-{:>3} bpm",
            zone.kind.label(),
            zone.min_hr,
            zone.max_hr
        );
    }
    Ok(())
}

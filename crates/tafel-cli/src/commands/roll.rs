use colored::Colorize;

use super::print_json;
use crate::config::CliConfig;

pub fn run(config: &CliConfig, table_id: &str, count: u32) -> Result<(), String> {
    let mut rng = config.rng();
    let results = config
        .roll_service()
        .roll(table_id, count, &mut rng)
        .map_err(|e| e.to_string())?;

    if config.json {
        return print_json(&results);
    }
    for result in &results {
        if result.is_template {
            println!("{}  {}", result.display_content(), result.entry_id.dimmed());
        } else {
            println!("{}", result.display_content());
        }
    }
    Ok(())
}

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use tafel_engine::{TemplateFilter, TemplateUpdate};

use super::{print_json, truncate};
use crate::config::CliConfig;

pub fn create(config: &CliConfig, name: &str, template: &str, description: &str) -> Result<(), String> {
    let saved = config
        .template_service()
        .create_template(name, description, template)
        .map_err(|e| e.to_string())?;

    if config.json {
        return print_json(&saved);
    }
    println!("  Created template '{}' ({})", saved.name(), saved.id());
    Ok(())
}

pub fn list(config: &CliConfig, name: Option<String>) -> Result<(), String> {
    let templates = config
        .template_service()
        .list_templates(&TemplateFilter { name })
        .map_err(|e| e.to_string())?;

    if config.json {
        return print_json(&templates);
    }
    if templates.is_empty() {
        println!("  No templates found.");
        return Ok(());
    }

    let mut out = Table::new();
    out.set_content_arrangement(ContentArrangement::Dynamic);
    out.set_header(vec!["ID", "Name", "Template"]);
    for saved in &templates {
        out.add_row(vec![
            saved.id().to_string(),
            saved.name().to_string(),
            truncate(saved.template().as_str(), 60),
        ]);
    }
    println!("{out}");
    println!();
    println!("  {} templates", templates.len());
    Ok(())
}

pub fn show(config: &CliConfig, id: &str) -> Result<(), String> {
    let saved = config
        .template_service()
        .get_template(id)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("template with ID {id} not found"))?;

    if config.json {
        return print_json(&saved);
    }
    println!("  {} [{}]", saved.name().bold(), saved.id().dimmed());
    if !saved.description().is_empty() {
        println!("  {}", saved.description());
    }
    println!();
    println!("  {}", saved.template());
    let references = saved.template().extract_references();
    if !references.is_empty() {
        println!();
        println!("  {}", "References".bold().underline());
        for reference in references {
            println!(
                "    {} -> {} / {} x{}",
                reference.title, reference.table_id, reference.table_name, reference.roll_count
            );
        }
    }
    Ok(())
}

pub fn update(config: &CliConfig, id: &str, changes: TemplateUpdate) -> Result<(), String> {
    let saved = config
        .template_service()
        .update_template(id, changes)
        .map_err(|e| e.to_string())?;

    if config.json {
        return print_json(&saved);
    }
    println!("  Updated template '{}' ({})", saved.name(), saved.id());
    Ok(())
}

pub fn delete(config: &CliConfig, id: &str) -> Result<(), String> {
    config
        .template_service()
        .delete_template(id)
        .map_err(|e| e.to_string())?;
    println!("  Deleted template {id}");
    Ok(())
}

pub fn eval(config: &CliConfig, id: &str, count: u32) -> Result<(), String> {
    let mut rng = config.rng();
    let evaluations = config
        .template_service()
        .evaluate_template(id, count, &mut rng)
        .map_err(|e| e.to_string())?;

    if config.json {
        return print_json(&evaluations);
    }
    for evaluation in &evaluations {
        println!("{}", evaluation.evaluated_template);
    }
    Ok(())
}

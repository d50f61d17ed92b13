//! Terminal output formatting

use agri_shared::rpc::{HealthResponse, ReconcileResponse};
use agri_shared::{DiseaseView, Severity};
use owo_colors::OwoColorize;
use serde::Serialize;

/// Print any wire type as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn severity_colored(view: &DiseaseView) -> String {
    match view.severity {
        Severity::None => view.severity_label.green().to_string(),
        Severity::Moderate => view.severity_label.yellow().to_string(),
        Severity::High => view.severity_label.bright_red().to_string(),
    }
}

/// One line per disease: id, name, severity.
pub fn print_disease_list(views: &[DiseaseView]) {
    if views.is_empty() {
        println!("No diseases found.");
        return;
    }
    let width = views.iter().map(|v| v.id.len()).max().unwrap_or(0);
    for view in views {
        println!(
            "  {:<width$}  {}  [{}]",
            view.id.cyan(),
            view.name,
            severity_colored(view),
            width = width
        );
    }
    println!();
    println!("{} entries", views.len());
}

pub fn print_fact_sheet(view: &DiseaseView) {
    println!("{}", view.name.bold());
    println!("  id:        {}", view.id.cyan());
    println!("  crop:      {}", view.crop);
    println!("  severity:  {}", severity_colored(view));
    if let Some(symptoms) = &view.symptoms {
        println!("  symptoms:  {}", symptoms);
    }
    if !view.treatments.is_empty() {
        println!();
        println!("[TREATMENTS]");
        for t in &view.treatments {
            let tag = if t.organic { " (bio)" } else { "" };
            println!("  * {}{}: {}", t.name, tag.green(), t.description);
            println!("      {}", t.application.dimmed());
        }
    }
    if !view.prevention.is_empty() {
        println!();
        println!("[PREVENTION]");
        for tip in &view.prevention {
            println!("  * {}", tip);
        }
    }
}

pub fn print_reconcile(result: &ReconcileResponse) {
    match (&result.disease, result.step) {
        (Some(view), Some(step)) => {
            println!("{} {} ({})", "[MATCH]".bright_green(), view.id.cyan(), step);
            println!("  {}", result.display_name);
        }
        _ => {
            println!("{} no catalog entry", "[MISS]".yellow());
            println!("  {}", result.display_name);
        }
    }
}

pub fn print_health(health: &HealthResponse) {
    let status = match health.status.as_str() {
        "healthy" | "ready" => health.status.bright_green().to_string(),
        _ => health.status.yellow().to_string(),
    };
    println!("AgriDetect daemon v{}", health.version);
    println!("  status:    {}", status);
    println!("  uptime:    {}s", health.uptime_secs);
    println!(
        "  model:     {}",
        health.model_name.as_deref().unwrap_or("not loaded")
    );
    println!(
        "  assistant: {}",
        if health.chatbot_available { "available" } else { "unavailable" }
    );
    println!("  catalog:   {} diseases", health.catalog_size);
}

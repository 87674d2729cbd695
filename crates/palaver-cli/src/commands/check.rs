//! Validate a template and print diagnostics.

use std::path::Path;

use colored::Colorize;

use palaver_core::{Validation, validate};

pub fn run(file: &Path) -> Result<(), String> {
    let template = super::load_template(file)?;

    let validation = match validate(&template) {
        Err(error) => {
            eprintln!("{} {error}", "error:".red().bold());
            return Err(format!("template \"{}\" rejected", file.display()));
        }
        Ok(validation) => validation,
    };

    for warning in validation.warnings() {
        eprintln!("{} {warning}", "warning:".yellow().bold());
    }

    let choices: usize = template.states().map(|(_, s)| s.choices.len()).sum();
    let guarded: usize = template
        .states()
        .flat_map(|(_, s)| &s.choices)
        .filter(|c| c.only_if.is_some())
        .count();
    println!(
        "{} {} ({} states, {} choices, {} guarded)",
        "ok:".green().bold(),
        file.display(),
        template.len(),
        choices,
        guarded
    );

    if let Validation::Warnings(warnings) = &validation {
        let count = warnings.len();
        println!(
            "  {} warning{}",
            count,
            if count == 1 { "" } else { "s" }
        );
    }

    Ok(())
}

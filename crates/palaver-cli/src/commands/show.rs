//! Print a readable summary of a template's graph.

use std::path::Path;

use colored::Colorize;

use palaver_core::StateKind;

pub fn run(file: &Path) -> Result<(), String> {
    let template = super::load_template(file)?;

    let skip_note = if template.unskippable() {
        ", unskippable"
    } else {
        ""
    };
    println!(
        "{} (start: {}{skip_note})",
        file.display(),
        template.start()
    );

    for (key, state) in template.states() {
        let marker = match state.kind {
            StateKind::Default => "",
            StateKind::EndDialogue => " [end]",
            StateKind::AskConfirmation => " [confirm]",
        };
        let start_mark = if key == template.start() { "*" } else { " " };
        println!("{start_mark} {}{}", key.bold(), marker.cyan());

        if !state.text.is_empty() {
            println!("    \"{}\"", state.text);
        }
        for id in &state.illustrations {
            println!("    {}", format!("[illustration: {id}]").dimmed());
        }
        if state.action.is_some() {
            println!("    {}", "[action on entry]".dimmed());
        }
        for (index, choice) in state.choices.iter().enumerate() {
            let guard = choice
                .only_if
                .as_ref()
                .map(|c| format!(" (if {})", c.predicate))
                .unwrap_or_default();
            println!(
                "    [{index}] {} -> {}{}",
                choice.text,
                choice.next,
                guard.yellow()
            );
        }
    }

    Ok(())
}

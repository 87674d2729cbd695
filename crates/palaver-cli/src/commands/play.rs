//! Drive a dialogue session interactively over stdin/stdout.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use colored::Colorize;

use palaver_core::{StateKind, validate};
use palaver_engine::{DialogueMachine, ESCAPE_CHOICE, EngineError, FlagEvaluator};

pub fn run(file: &Path, flags: &[String], start: Option<&str>) -> Result<(), String> {
    let template = super::load_template(file)?;
    match validate(&template) {
        Err(error) => return Err(format!("template rejected: {error}")),
        Ok(validation) => {
            for warning in validation.warnings() {
                eprintln!("{} {warning}", "warning:".yellow().bold());
            }
        }
    }

    // Every predicate in the template defaults to false; --flag overrides.
    let mut evaluator = FlagEvaluator::new();
    for (_, state) in template.states() {
        for choice in &state.choices {
            if let Some(condition) = &choice.only_if
                && evaluator.get(&condition.predicate).is_none()
            {
                evaluator.set(condition.predicate.clone(), false);
            }
        }
    }
    for flag in flags {
        let (name, value) = parse_flag(flag)?;
        evaluator.set(name, value);
    }

    let unskippable = template.unskippable();
    let template = Arc::new(template);
    let mut machine = match start {
        Some(key) => DialogueMachine::at_state(template, key),
        None => DialogueMachine::new(template),
    }
    .map_err(|e| e.to_string())?;
    machine
        .update_conditions(&evaluator)
        .map_err(|e| e.to_string())?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let state = machine.current_state().map_err(|e| e.to_string())?;
        println!();
        if !machine.current_text().is_empty() {
            println!("{}", machine.current_text());
        }
        for id in &state.illustrations {
            println!("  {}", format!("[illustration: {id}]").dimmed());
        }
        if let Some(action) = &state.action {
            println!("  {}", format!("[action: {action}]").dimmed());
        }
        if state.is_terminal() {
            break;
        }
        if state.kind == StateKind::AskConfirmation {
            println!("  {}", "(please confirm)".yellow());
        }

        let visible = machine.visible_choices().to_vec();
        for (number, entry) in visible.iter().enumerate() {
            match &entry.locked {
                Some(message) => println!(
                    "  {}",
                    format!("[{}] {} ({message})", number + 1, entry.text).dimmed()
                ),
                None => println!("  [{}] {}", number + 1, entry.text),
            }
        }

        print!("> ");
        io::stdout().flush().map_err(|e| e.to_string())?;
        let Some(line) = lines.next() else {
            break;
        };
        let input = line.map_err(|e| e.to_string())?;
        let input = input.trim();

        if input.is_empty() {
            continue;
        }
        if input == "quit" {
            if unskippable {
                println!("{}", "This conversation cannot be skipped.".yellow());
                continue;
            }
            break;
        }
        if let Some(rest) = input.strip_prefix("set ") {
            match parse_flag(rest.trim()) {
                Ok((name, value)) => {
                    evaluator.set(name, value);
                    let delta = machine
                        .update_conditions(&evaluator)
                        .map_err(|e| e.to_string())?;
                    if !delta.is_empty() {
                        println!("{}", format!("({} change(s))", delta.len()).dimmed());
                    }
                }
                Err(message) => println!("{}", message.yellow()),
            }
            continue;
        }

        let Some(number) = input.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) else {
            println!(
                "{}",
                "Enter a choice number, \"set <flag>[=bool]\", or \"quit\".".yellow()
            );
            continue;
        };
        let Some(entry) = visible.get(number) else {
            println!("{}", "No such choice.".yellow());
            continue;
        };

        match machine.choose(entry.index) {
            Ok(outcome) if entry.index == ESCAPE_CHOICE => {
                debug_assert_eq!(outcome.kind, StateKind::EndDialogue);
                println!();
                println!("(the conversation trails off)");
                break;
            }
            Ok(_) => {}
            Err(EngineError::InvalidChoice(_)) => {
                println!("{}", "That choice is not available.".yellow());
            }
            Err(other) => return Err(other.to_string()),
        }
    }

    Ok(())
}

/// Parse `NAME` (implies true) or `NAME=true|false`.
fn parse_flag(raw: &str) -> Result<(String, bool), String> {
    match raw.split_once('=') {
        None if !raw.is_empty() => Ok((raw.to_string(), true)),
        Some((name, "true")) if !name.is_empty() => Ok((name.to_string(), true)),
        Some((name, "false")) if !name.is_empty() => Ok((name.to_string(), false)),
        _ => Err(format!("invalid flag \"{raw}\": expected NAME or NAME=true|false")),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_flag;

    #[test]
    fn bare_name_means_true() {
        assert_eq!(parse_flag("has_key"), Ok(("has_key".to_string(), true)));
    }

    #[test]
    fn explicit_values() {
        assert_eq!(parse_flag("a=true"), Ok(("a".to_string(), true)));
        assert_eq!(parse_flag("a=false"), Ok(("a".to_string(), false)));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_flag("").is_err());
        assert!(parse_flag("a=maybe").is_err());
        assert!(parse_flag("=true").is_err());
    }
}

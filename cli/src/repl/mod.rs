mod completer;
mod helper;
mod highlighter;
mod hinter;

use deferred::DispatchMode;
use deferred::scenario::{Session, Step};
use owo_colors::OwoColorize;
use rustyline::error::ReadlineError;
use rustyline::{Config, EditMode, Editor};
use std::fs;
use std::path::Path;

use self::helper::ReplHelper;
use crate::render;

pub fn run(dispatch: DispatchMode) -> rustyline::Result<()> {
    let config = Config::builder()
        .history_ignore_dups(true)?
        .completion_type(rustyline::CompletionType::List)
        .edit_mode(EditMode::Emacs)
        .build();

    let mut rl: Editor<ReplHelper, rustyline::history::DefaultHistory> =
        Editor::with_config(config)?;
    rl.set_helper(Some(ReplHelper));

    let mut session = Session::new(dispatch);

    println!(
        "{} {} {}",
        "deferred".bright_cyan().bold(),
        env!("CARGO_PKG_VERSION").bright_black(),
        format!("({dispatch} dispatch)").bright_black()
    );
    println!("{}", "Type .help for REPL commands".bright_black());

    loop {
        match rl.readline("> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(trimmed);
                if handle_command(trimmed, &mut session, dispatch) {
                    continue;
                }

                run_step(&session, trimmed);
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".yellow());
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "bye".bright_black());
                break;
            }
            Err(err) => {
                eprintln!("{} {err}", "repl error:".red().bold());
                break;
            }
        }
    }

    Ok(())
}

fn handle_command(trimmed: &str, session: &mut Session, dispatch: DispatchMode) -> bool {
    if trimmed == ".exit" || trimmed == "exit" {
        std::process::exit(0);
    }
    if trimmed == ".help" {
        println!("{}", ".help                show commands".bright_blue());
        println!("{}", ".state               show every bound promise".bright_blue());
        println!("{}", ".log                 show the session log".bright_blue());
        println!("{}", ".drain               run queued microtasks".bright_blue());
        println!("{}", ".clear               start a fresh session".bright_blue());
        println!(
            "{}",
            ".load <file.yaml>    apply a scenario's steps".bright_blue()
        );
        println!("{}", ".exit                exit REPL".bright_blue());
        println!(
            "{}",
            "any other line is one step, e.g. {defer: {name: d}}".bright_black()
        );
        return true;
    }
    if trimmed == ".state" {
        render::print_states(session);
        return true;
    }
    if trimmed == ".log" {
        render::print_log(session);
        return true;
    }
    if trimmed == ".drain" {
        let ran = session.drain();
        println!("{}", format!("ran {ran} microtask(s)").green());
        return true;
    }
    if trimmed == ".clear" {
        *session = Session::new(dispatch);
        println!("{}", "session cleared".green());
        return true;
    }
    if let Some(path) = trimmed.strip_prefix(".load ") {
        load_file(session, path.trim());
        return true;
    }
    false
}

fn load_file(session: &Session, path: &str) {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("{} {err}", "load error:".red().bold());
            return;
        }
    };
    let scenario = match crate::parse_scenario(Path::new(path), &source) {
        Ok(scenario) => scenario,
        Err(message) => {
            eprintln!("{} {message}", "load error:".red().bold());
            return;
        }
    };
    for step in &scenario.steps {
        if let Err(err) = session.apply(step) {
            eprintln!("{} {err:?}", "error:".red().bold());
            return;
        }
    }
    tracing::debug!(path, steps = scenario.steps.len(), "loaded scenario");
    render::print_states(session);
}

fn run_step(session: &Session, source: &str) {
    let step: Step = match serde_yaml::from_str(source) {
        Ok(step) => step,
        Err(err) => {
            eprintln!("{} {err}", "parse error:".red().bold());
            return;
        }
    };
    if let Err(err) = session.apply(&step) {
        eprintln!("{} {err:?}", "error:".red().bold());
        return;
    }
    match bound_name(&step).map(|name| session.promise(name)) {
        Some(Ok(promise)) => println!("{}", render::paint_state(&promise.state())),
        _ => println!("{}", "ok".bright_black()),
    }
}

fn bound_name(step: &Step) -> Option<&str> {
    match step {
        Step::Defer { name, .. }
        | Step::Attach { name, .. }
        | Step::Then { name, .. }
        | Step::Otherwise { name, .. }
        | Step::Always { name, .. }
        | Step::Normalize { name, .. }
        | Step::All { name, .. }
        | Step::First { name, .. } => Some(name),
        Step::Cancel { promise, .. } => Some(promise),
        _ => None,
    }
}

/// True while the line still has an unclosed flow collection or quote.
pub fn needs_more_input(source: &str) -> bool {
    let mut braces = 0i32;
    let mut brackets = 0i32;
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;

    for ch in source.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        if in_double && ch == '\\' {
            escaped = true;
            continue;
        }
        if !in_double && ch == '\'' {
            in_single = !in_single;
            continue;
        }
        if !in_single && ch == '"' {
            in_double = !in_double;
            continue;
        }
        if in_single || in_double {
            continue;
        }
        match ch {
            '{' => braces += 1,
            '}' => braces -= 1,
            '[' => brackets += 1,
            ']' => brackets -= 1,
            _ => {}
        }
    }

    in_single || in_double || braces > 0 || brackets > 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbalanced_flow_mappings_continue() {
        assert!(needs_more_input("{defer: {name: d}"));
        assert!(needs_more_input("{all: {name: a, of: [x, y"));
        assert!(!needs_more_input("{defer: {name: d}}"));
        assert!(!needs_more_input("{fulfill: {deferred: d, value: '{'}}"));
    }

    #[test]
    fn steps_parse_from_flow_yaml() {
        let step: Step =
            serde_yaml::from_str("{then: {name: p, to: d, handler: {multiply: 2}}}")
                .expect("step should parse");
        assert_eq!(bound_name(&step), Some("p"));
        let drain: Step = serde_yaml::from_str("drain").expect("unit step should parse");
        assert_eq!(drain.keyword(), "drain");
    }
}

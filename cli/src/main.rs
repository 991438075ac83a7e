#![allow(clippy::result_large_err)]

use std::fs;
use std::path::Path;
use std::process;

use clap::Parser;
use deferred::{DispatchMode, Scenario, ScenarioReport, Session};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

mod render;
mod repl;

#[derive(Parser)]
#[command(name = "deferred", about = "Run and explore deferred promise scenarios")]
struct Cli {
    /// Path to a .yaml or .json scenario to run
    file: Option<String>,
    /// Dispatch mode for the REPL, or to override the scenario's own
    #[arg(long)]
    dispatch: Option<DispatchMode>,
    /// Log settle and cancel events to stderr
    #[arg(long)]
    verbose: bool,
    /// Print version and exit
    #[arg(long)]
    version: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.version {
        println!(
            "{} {}",
            "deferred".bright_cyan().bold(),
            env!("CARGO_PKG_VERSION").bright_black()
        );
        return;
    }

    let Some(file) = cli.file else {
        if let Err(err) = repl::run(cli.dispatch.unwrap_or_default()) {
            eprintln!("{} {err:?}", "error:".red().bold());
            process::exit(1);
        }
        return;
    };

    let source = match fs::read_to_string(&file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!(
                "{} could not read '{}': {e}",
                "error:".red().bold(),
                file.yellow()
            );
            process::exit(1);
        }
    };

    let mut scenario = match parse_scenario(Path::new(&file), &source) {
        Ok(scenario) => scenario,
        Err(message) => {
            eprintln!(
                "{} {} in {}: {}",
                "invalid".red().bold(),
                "scenario".yellow(),
                file.cyan(),
                message.bright_white()
            );
            process::exit(1);
        }
    };
    if let Some(dispatch) = cli.dispatch {
        scenario.dispatch = dispatch;
    }

    if !scenario.description.is_empty() {
        println!("{}", scenario.description.bright_blue().bold());
    }

    let session = Session::new(scenario.dispatch);
    for step in &scenario.steps {
        if let Err(err) = session.apply(step) {
            eprintln!("{} {err:?}", "scenario error:".red().bold());
            process::exit(1);
        }
    }
    session.drain();

    render::print_states(&session);
    render::print_log(&session);

    if scenario.expect.is_empty() && scenario.log.is_none() {
        return;
    }
    let report = ScenarioReport::check(&session, &scenario.expect, scenario.log.as_deref());
    if report.passed() {
        println!("{}", "all expectations met".green().bold());
    } else {
        for mismatch in &report.mismatches {
            eprintln!("{} {mismatch}", "mismatch:".red().bold());
        }
        process::exit(1);
    }
}

fn parse_scenario(path: &Path, source: &str) -> Result<Scenario, String> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        Scenario::from_json(source).map_err(|err| err.to_string())
    } else {
        serde_yaml::from_str(source).map_err(|err| err.to_string())
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "deferred=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("DEFERRED_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}

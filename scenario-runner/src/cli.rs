use std::path::PathBuf;

use clap::Parser;
use deferred_core::DispatchMode;

#[derive(Parser, Debug, Clone)]
#[command(name = "scenario-runner", about = "Run the deferred conformance scenarios")]
pub struct Cli {
    #[arg(default_value = "conformance")]
    pub path: PathBuf,

    #[arg(long, default_value_t = false)]
    pub verbose: bool,

    #[arg(long, default_value_t = false)]
    pub analyze: bool,

    /// Run every scenario under this dispatch mode instead of its own
    #[arg(long)]
    pub dispatch: Option<DispatchMode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_flag_uses_mode_names() {
        let cli = Cli::try_parse_from(["scenario-runner", "--dispatch", "microtask"])
            .expect("flag should parse");
        assert_eq!(cli.dispatch, Some(DispatchMode::Microtask));
        assert_eq!(cli.path, PathBuf::from("conformance"));

        assert!(Cli::try_parse_from(["scenario-runner", "--dispatch", "eager"]).is_err());
    }
}

mod app;
mod cli;
mod discovery;
mod execution;
mod runner;
mod stats;

fn main() {
    let failed = app::run();
    if failed > 0 {
        std::process::exit(1);
    }
}

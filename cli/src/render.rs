use deferred::{PromiseState, Session};
use owo_colors::OwoColorize;

pub fn print_states(session: &Session) {
    let states = session.states();
    if states.is_empty() {
        println!("{}", "no promises bound".bright_black());
        return;
    }
    let width = states.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, state) in &states {
        println!("{:<width$}  {}", name.bright_white(), paint_state(state));
    }
}

pub fn print_log(session: &Session) {
    for entry in session.log() {
        println!("{} {}", "log".bright_black(), entry);
    }
}

pub fn paint_state(state: &PromiseState) -> String {
    match state {
        PromiseState::Pending => state.to_string().yellow().to_string(),
        PromiseState::Fulfilled(_) => state.to_string().green().to_string(),
        PromiseState::Rejected(reason) if reason.is_cancel() => {
            state.to_string().magenta().to_string()
        }
        PromiseState::Rejected(_) => state.to_string().red().to_string(),
    }
}

use deferred_core::{DispatchMode, Scenario};

#[derive(Debug, Clone)]
pub enum CaseResult {
    Passed,
    Failed(String),
    Skipped(String),
}

pub fn run_scenario_source(source: &str, dispatch: Option<DispatchMode>) -> CaseResult {
    let mut scenario: Scenario = match serde_yaml::from_str(source) {
        Ok(scenario) => scenario,
        Err(err) => return CaseResult::Failed(format!("invalid scenario: {err}")),
    };
    if scenario.expect.is_empty() && scenario.log.is_none() {
        return CaseResult::Skipped("no expectations".to_string());
    }
    if let Some(dispatch) = dispatch {
        scenario.dispatch = dispatch;
    }

    match scenario.run() {
        Ok(report) if report.passed() => CaseResult::Passed,
        Ok(report) => CaseResult::Failed(report.summary()),
        Err(err) => CaseResult::Failed(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passing_scenario_passes_in_both_modes() {
        let source = "
steps:
  - defer: {name: d}
  - then: {name: p, to: d, handler: {add: 1}}
  - fulfill: {deferred: d, value: 41}
expect:
  p: {fulfilled: 42}
";
        assert!(matches!(run_scenario_source(source, None), CaseResult::Passed));
        assert!(matches!(
            run_scenario_source(source, Some(DispatchMode::Microtask)),
            CaseResult::Passed
        ));
    }

    #[test]
    fn mismatch_is_reported() {
        let source = "
steps:
  - defer: {name: d}
expect:
  d: {fulfilled: 1}
";
        let CaseResult::Failed(reason) = run_scenario_source(source, None) else {
            panic!("pending promise should not match fulfilled");
        };
        assert!(reason.contains("d: expected <fulfilled>: 1, got <pending>"));
    }

    #[test]
    fn scenarios_without_expectations_are_skipped() {
        let source = "steps:\n  - defer: {name: d}\n";
        assert!(matches!(
            run_scenario_source(source, None),
            CaseResult::Skipped(_)
        ));
    }
}

//! Output formatting for CLI commands

use colored::Colorize;
use ghr_core::domain::runner::{EnrichedRunner, FleetSummary, RunnerRecord};
use ghr_core::fleet::BatchReport;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::config::Config;

#[derive(Tabled)]
struct RunnerRow {
    #[tabled(rename = "NUM")]
    number: u32,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "CONTAINER")]
    container: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

#[derive(Tabled)]
struct RemoteRunnerRow {
    #[tabled(rename = "NUM")]
    number: u32,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "CONTAINER")]
    container: String,
    #[tabled(rename = "DOCKER STATUS")]
    status: String,
    #[tabled(rename = "GITHUB")]
    github: String,
    #[tabled(rename = "BUSY")]
    busy: String,
}

/// Docker's status line, or the bare state when there is none
fn status_text(record: &RunnerRecord) -> String {
    if record.status.is_empty() {
        record.state.to_string()
    } else {
        record.status.clone()
    }
}

/// Renders the runner table
///
/// With `show_remote`, adds the control plane's status and busy flag; both
/// are blank for runners the control plane does not know.
pub fn runner_table(runners: &[EnrichedRunner], show_remote: bool) -> String {
    let mut table = if show_remote {
        let rows = runners.iter().map(|runner| RemoteRunnerRow {
            number: runner.record.number,
            name: runner.record.name.clone(),
            container: runner.record.container_id.clone(),
            status: status_text(&runner.record),
            github: runner.online().map(|o| o.to_string()).unwrap_or_default(),
            busy: match runner.busy() {
                Some(true) => "yes".to_string(),
                Some(false) => "no".to_string(),
                None => String::new(),
            },
        });
        Table::new(rows)
    } else {
        let rows = runners.iter().map(|runner| RunnerRow {
            number: runner.record.number,
            name: runner.record.name.clone(),
            container: runner.record.container_id.clone(),
            status: status_text(&runner.record),
        });
        Table::new(rows)
    };

    table.with(Style::blank()).to_string()
}

pub fn print_runner_table(runners: &[EnrichedRunner], show_remote: bool) {
    if runners.is_empty() {
        println!("{}", "No managed runners found.".yellow());
        return;
    }
    println!("{}", runner_table(runners, show_remote));
}

/// Renders the `ghr status` overview
pub fn status_summary(
    config_path: &str,
    config: &Config,
    docker: &str,
    summary: FleetSummary,
) -> String {
    let target = match config.scope.as_str() {
        "org" => ("Org:", config.org.clone()),
        _ => ("Repo:", format!("{}/{}", config.repo.owner, config.repo.name)),
    };

    let lines = [
        ("Config:", config_path.to_string()),
        ("Scope:", config.scope.clone()),
        target,
        ("Image:", config.runners.image.clone()),
        ("Labels:", config.runners.labels.join(", ")),
        ("Docker:", docker.to_string()),
        (
            "Runners:",
            format!(
                "{} total ({} running, {} stopped)",
                summary.total, summary.running, summary.stopped
            ),
        ),
    ];

    lines
        .iter()
        .map(|(key, value)| format!("{:<10}{}", key, value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prints the outcome of a batch operation
pub fn print_batch_report(report: &BatchReport) {
    if report.is_empty() {
        println!("{}", "No managed runners found.".yellow());
        return;
    }

    let succeeded = report.succeeded().count();
    println!(
        "{}",
        format!("{} {} runner(s).", report.action.past(), succeeded).green()
    );

    for item in report.failed() {
        if let Err(e) = &item.result {
            println!("  {} {}: {}", "✗".red(), item.name.bold(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghr_core::domain::runner::{OnlineStatus, RemoteStatus, RuntimeState};

    fn runner(number: u32, status: &str, remote: Option<(OnlineStatus, bool)>) -> EnrichedRunner {
        let name = format!("ghr-runner-{}", number);
        EnrichedRunner {
            record: RunnerRecord {
                number,
                name: name.clone(),
                container_id: format!("abc{:09}", number),
                state: RuntimeState::Exited,
                status: status.to_string(),
            },
            remote: remote.map(|(online, busy)| RemoteStatus {
                name,
                remote_id: u64::from(number),
                online,
                busy,
                labels: Vec::new(),
            }),
        }
    }

    #[test]
    fn test_runner_table_columns() {
        let table = runner_table(&[runner(1, "Up 2 hours", None)], false);

        let header = table.lines().next().unwrap();
        assert!(header.contains("NUM"));
        assert!(header.contains("CONTAINER"));
        assert!(!header.contains("GITHUB"));
        assert!(table.contains("ghr-runner-1"));
        assert!(table.contains("Up 2 hours"));
    }

    #[test]
    fn test_runner_table_falls_back_to_state() {
        let table = runner_table(&[runner(2, "", None)], false);
        assert!(table.contains("exited"));
    }

    #[test]
    fn test_remote_table_blank_for_unregistered() {
        let runners = vec![
            runner(1, "Up", Some((OnlineStatus::Online, true))),
            runner(2, "Up", None),
        ];

        let table = runner_table(&runners, true);
        let lines: Vec<&str> = table.lines().collect();

        assert!(lines[0].contains("DOCKER STATUS"));
        assert!(lines[1].contains("online"));
        assert!(lines[1].contains("yes"));
        assert!(!lines[2].contains("online"));
        assert!(!lines[2].contains("no"));
    }

    #[test]
    fn test_status_summary_repo_scope() {
        let config = Config {
            scope: "repo".to_string(),
            repo: crate::config::RepoConfig {
                owner: "octo".to_string(),
                name: "app".to_string(),
            },
            ..Config::default()
        };
        let summary = FleetSummary {
            total: 3,
            running: 2,
            stopped: 1,
        };

        let text = status_summary("/home/me/.ghr/config.yaml", &config, "27.1.1", summary);

        assert!(text.contains("Repo:     octo/app"));
        assert!(text.contains("Labels:   local, dev"));
        assert!(text.contains("3 total (2 running, 1 stopped)"));
    }
}

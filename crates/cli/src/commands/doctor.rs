use highfive_core::config::{AppConfig, LoadOptions};
use highfive_db::open_ledger_store;
use serde::Serialize;

use crate::commands::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    let output = if json_output {
        serde_json::to_string(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_signature_verification(&config));
            checks.push(check_mirror(&config));
            checks.push(check_ledger(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["slack_signature_verification", "spreadsheet_mirror", "ledger_readiness"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status != CheckStatus::Fail)
        && checks.iter().any(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_signature_verification(config: &AppConfig) -> DoctorCheck {
    match config.slack.signing_secret {
        Some(_) => DoctorCheck {
            name: "slack_signature_verification",
            status: CheckStatus::Pass,
            details: "slack request signatures will be verified".to_string(),
        },
        None => DoctorCheck {
            name: "slack_signature_verification",
            status: CheckStatus::Skipped,
            details: "no signing secret configured; /slack routes accept unsigned requests"
                .to_string(),
        },
    }
}

fn check_mirror(config: &AppConfig) -> DoctorCheck {
    if config.mirror.enabled {
        DoctorCheck {
            name: "spreadsheet_mirror",
            status: CheckStatus::Pass,
            details: "recognitions will be mirrored to the configured webhook".to_string(),
        }
    } else {
        DoctorCheck {
            name: "spreadsheet_mirror",
            status: CheckStatus::Skipped,
            details: "mirror disabled".to_string(),
        }
    }
}

fn check_ledger(config: &AppConfig) -> DoctorCheck {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck {
                name: "ledger_readiness",
                status: CheckStatus::Fail,
                details: format!("failed to initialize async runtime: {error}"),
            };
        }
    };

    let result = runtime.block_on(async {
        let store = open_ledger_store(&config.ledger)
            .await
            .map_err(|error| format!("failed to open ledger: {error}"))?;
        let snapshot =
            store.snapshot().await.map_err(|error| format!("failed to read ledger: {error}"))?;
        Ok::<String, String>(format!(
            "{} ledger readable ({} recognitions recorded)",
            store.backend(),
            snapshot.given_counts.total()
        ))
    });

    match result {
        Ok(details) => DoctorCheck { name: "ledger_readiness", status: CheckStatus::Pass, details },
        Err(details) => DoctorCheck { name: "ledger_readiness", status: CheckStatus::Fail, details },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

use highfive_core::leaderboard::render_summary;
use highfive_db::open_ledger_store;

use crate::commands::{load_config, runtime, CommandResult};

pub fn run(top: Option<usize>) -> CommandResult {
    let config = match load_config("leaderboard") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let top_n = top.unwrap_or(config.report.top_n);

    let runtime = match runtime("leaderboard") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let store = open_ledger_store(&config.ledger)
            .await
            .map_err(|error| ("ledger_open", error.to_string(), 4u8))?;
        store.snapshot().await.map_err(|error| ("ledger_read", error.to_string(), 5u8))
    });

    match result {
        Ok(snapshot) => {
            let summary = render_summary(&snapshot, top_n);
            let message = if snapshot.is_empty() {
                "no recognitions recorded yet".to_string()
            } else {
                format!(
                    "top {top_n}: {} givers, {} receivers",
                    summary.top_givers.len(),
                    summary.top_receivers.len()
                )
            };
            CommandResult::success_with_data("leaderboard", message, serde_json::to_value(&summary).ok())
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("leaderboard", error_class, message, exit_code)
        }
    }
}

use highfive_db::open_ledger_store;

use crate::commands::{load_config, runtime, CommandResult};

/// Clears both tallies. Refuses to run without explicit confirmation.
pub fn run(confirm: bool) -> CommandResult {
    if !confirm {
        return CommandResult::failure(
            "reset",
            "confirmation_required",
            "reset deletes every recorded recognition; re-run with --confirm",
            1,
        );
    }

    let config = match load_config("reset") {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let runtime = match runtime("reset") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let store = open_ledger_store(&config.ledger)
            .await
            .map_err(|error| ("ledger_open", error.to_string(), 4u8))?;
        store.reset().await.map_err(|error| ("ledger_write", error.to_string(), 5u8))?;
        Ok::<&'static str, (&'static str, String, u8)>(store.backend())
    });

    match result {
        Ok(backend) => CommandResult::success("reset", format!("cleared the {backend} ledger")),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("reset", error_class, message, exit_code)
        }
    }
}

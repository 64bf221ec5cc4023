use highfive_core::config::LedgerBackend;
use highfive_db::{connect_with_settings, migrations};

use crate::commands::{load_config, runtime, CommandResult};

pub fn run() -> CommandResult {
    let config = match load_config("migrate") {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    if config.ledger.backend != LedgerBackend::Sqlite {
        return CommandResult::success(
            "migrate",
            format!("ledger backend `{}` has no migrations", config.ledger.backend.as_str()),
        );
    }

    let runtime = match runtime("migrate") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.ledger.database_url,
            config.ledger.max_connections,
            config.ledger.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;
        pool.close().await;
        Ok::<(), (&'static str, String, u8)>(())
    });

    match result {
        Ok(()) => CommandResult::success("migrate", "applied pending migrations"),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("migrate", error_class, message, exit_code)
        }
    }
}

pub mod connection;
pub mod migrations;
pub mod repositories;

pub use connection::{connect, connect_with_settings, DbPool};
pub use repositories::{
    open_ledger_store, InMemoryLedgerStore, JsonFileLedgerStore, LedgerStore, RepositoryError,
    SqlLedgerStore,
};

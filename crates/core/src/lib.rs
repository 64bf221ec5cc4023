pub mod config;
pub mod domain;
pub mod errors;
pub mod leaderboard;
pub mod ledger;

pub use domain::recognition::{CoreValue, RecognitionEvent, UserId};
pub use errors::{ApplicationError, InterfaceError, LedgerError};
pub use leaderboard::{render_summary, top_n, LeaderboardEntry, LeaderboardSummary};
pub use ledger::{LedgerSnapshot, RecordedCounts, Tally};

//! Slack interface for the High-Five bot
//!
//! - **Block Kit** (`blocks`) - recognition card, leaderboard, help and the recognition modal
//! - **Slash Commands** (`commands`) - `/highfive`, `/highfive leaderboard [n]`, `/highfive help`
//! - **Interactions** (`interactions`) - `view_submission` payloads into recognition events
//! - **Signatures** (`signature`) - `X-Slack-Signature` verification
//! - **Web API** (`client`) - `chat.postMessage` and `views.open`
//! - **Mirror** (`mirror`) - optional spreadsheet webhook
//!
//! # Setup
//!
//! 1. Create a Slack app at https://api.slack.com/apps
//! 2. Add the `/highfive` slash command pointing at `POST /slack/commands`
//! 3. Enable interactivity pointing at `POST /slack/interactions`
//! 4. Set `SLACK_BOT_TOKEN`, `SLACK_SIGNING_SECRET` and `HIGHFIVE_CHANNEL`
//!
//! ```text
//! /highfive → CommandRouter → views.open (modal)
//! modal submit → SubmittedView::recognition → ledger → chat.postMessage (+ mirror)
//! ```

pub mod blocks;
pub mod client;
pub mod commands;
pub mod interactions;
pub mod mirror;
pub mod signature;

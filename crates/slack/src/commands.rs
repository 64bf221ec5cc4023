use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::blocks::{self, MessageTemplate};

pub const SLASH_COMMAND: &str = "/highfive";

/// Form fields Slack posts for a slash command invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SlashCommandPayload {
    pub command: String,
    pub text: String,
    pub channel_id: String,
    pub user_id: String,
    pub trigger_id: String,
    pub response_url: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandEnvelope {
    pub verb: String,
    pub args: Vec<String>,
    pub channel_id: String,
    pub user_id: String,
    pub trigger_id: String,
    pub correlation_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HighFiveCommand {
    Give,
    Leaderboard { top: Option<usize> },
    Help,
    Unknown { verb: String },
}

/// What the HTTP layer sends back to Slack for a routed command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandReply {
    /// Empty acknowledgement; the response happened out of band (e.g. a modal opened).
    Acknowledged,
    Ephemeral(MessageTemplate),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("unsupported slash command: {0}")]
    UnsupportedCommand(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandRouteError {
    #[error("command service failed: {0}")]
    Service(String),
}

pub fn normalize_highfive_command(
    payload: SlashCommandPayload,
    correlation_id: impl Into<String>,
) -> Result<CommandEnvelope, CommandParseError> {
    if payload.command != SLASH_COMMAND {
        return Err(CommandParseError::UnsupportedCommand(payload.command));
    }

    let mut parts = payload.text.split_whitespace();
    let verb = parts.next().map(str::to_ascii_lowercase).unwrap_or_default();
    let args = parts.map(str::to_owned).collect();

    Ok(CommandEnvelope {
        verb,
        args,
        channel_id: payload.channel_id,
        user_id: payload.user_id,
        trigger_id: payload.trigger_id,
        correlation_id: correlation_id.into(),
    })
}

impl CommandEnvelope {
    /// Classifies the verb. A leaderboard size of zero or a non-number means "use the default".
    pub fn command(&self) -> HighFiveCommand {
        match self.verb.as_str() {
            "" | "give" => HighFiveCommand::Give,
            "leaderboard" | "top" => HighFiveCommand::Leaderboard {
                top: self.args.first().and_then(|raw| raw.parse::<usize>().ok()).filter(|n| *n > 0),
            },
            "help" => HighFiveCommand::Help,
            other => HighFiveCommand::Unknown { verb: other.to_owned() },
        }
    }
}

pub struct CommandRouter<S> {
    service: S,
}

impl<S> CommandRouter<S>
where
    S: HighFiveCommandService,
{
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub async fn route(&self, envelope: CommandEnvelope) -> Result<CommandReply, CommandRouteError> {
        match envelope.command() {
            HighFiveCommand::Give => {
                self.service.open_recognition_modal(&envelope).await?;
                Ok(CommandReply::Acknowledged)
            }
            HighFiveCommand::Leaderboard { top } => {
                let message = self.service.leaderboard(top, &envelope).await?;
                Ok(CommandReply::Ephemeral(message))
            }
            HighFiveCommand::Help => Ok(CommandReply::Ephemeral(blocks::help_message())),
            HighFiveCommand::Unknown { verb } => Ok(CommandReply::Ephemeral(blocks::error_message(
                &format!("Unsupported command `/highfive {verb}`. Try `/highfive help`."),
                &envelope.correlation_id,
            ))),
        }
    }
}

#[async_trait]
pub trait HighFiveCommandService: Send + Sync {
    async fn open_recognition_modal(
        &self,
        envelope: &CommandEnvelope,
    ) -> Result<(), CommandRouteError>;

    async fn leaderboard(
        &self,
        top: Option<usize>,
        envelope: &CommandEnvelope,
    ) -> Result<MessageTemplate, CommandRouteError>;
}

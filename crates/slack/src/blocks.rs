use serde::Serialize;

use highfive_core::domain::recognition::{CoreValue, RecognitionEvent};
use highfive_core::leaderboard::{LeaderboardEntry, LeaderboardSummary};
use highfive_core::ledger::RecordedCounts;

pub const RECOGNITION_CALLBACK_ID: &str = "highfive.submit.v1";
pub const RECIPIENT_BLOCK_ID: &str = "highfive.recipient.v1";
pub const RECIPIENT_ACTION_ID: &str = "recipient";
pub const CORE_VALUE_BLOCK_ID: &str = "highfive.core_value.v1";
pub const CORE_VALUE_ACTION_ID: &str = "core_value";
pub const MESSAGE_BLOCK_ID: &str = "highfive.message.v1";
pub const MESSAGE_ACTION_ID: &str = "message";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextObject {
    #[serde(rename = "plain_text")]
    Plain { text: String },
    Mrkdwn { text: String },
}

impl TextObject {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Plain { text: text.into() }
    }

    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self::Mrkdwn { text: text.into() }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Plain { text } | Self::Mrkdwn { text } => text,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub text: TextObject,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputElement {
    UsersSelect { action_id: String, placeholder: TextObject },
    StaticSelect { action_id: String, placeholder: TextObject, options: Vec<SelectOption> },
    PlainTextInput { action_id: String, multiline: bool, placeholder: TextObject },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header { block_id: String, text: TextObject },
    Section { block_id: String, text: TextObject },
    Context { block_id: String, elements: Vec<TextObject> },
    Divider { block_id: String },
    Input { block_id: String, label: TextObject, element: InputElement },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MessageTemplate {
    pub fallback_text: String,
    pub blocks: Vec<Block>,
}

pub struct MessageBuilder {
    fallback_text: String,
    blocks: Vec<Block>,
}

impl MessageBuilder {
    pub fn new(fallback_text: impl Into<String>) -> Self {
        Self { fallback_text: fallback_text.into(), blocks: Vec::new() }
    }

    pub fn header(mut self, block_id: impl Into<String>, text: impl Into<String>) -> Self {
        self.blocks.push(Block::Header { block_id: block_id.into(), text: TextObject::plain(text) });
        self
    }

    pub fn section<F>(mut self, block_id: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(&mut SectionBuilder),
    {
        let mut builder = SectionBuilder::default();
        build(&mut builder);
        self.blocks.push(Block::Section { block_id: block_id.into(), text: builder.build() });
        self
    }

    pub fn context<F>(mut self, block_id: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(&mut ContextBuilder),
    {
        let mut builder = ContextBuilder::default();
        build(&mut builder);
        self.blocks.push(Block::Context { block_id: block_id.into(), elements: builder.build() });
        self
    }

    pub fn divider(mut self, block_id: impl Into<String>) -> Self {
        self.blocks.push(Block::Divider { block_id: block_id.into() });
        self
    }

    pub fn build(self) -> MessageTemplate {
        MessageTemplate { fallback_text: self.fallback_text, blocks: self.blocks }
    }
}

#[derive(Default)]
pub struct SectionBuilder {
    text: Option<TextObject>,
}

impl SectionBuilder {
    pub fn plain(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = Some(TextObject::plain(text));
        self
    }

    pub fn mrkdwn(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = Some(TextObject::mrkdwn(text));
        self
    }

    fn build(self) -> TextObject {
        self.text.unwrap_or_else(|| TextObject::plain(""))
    }
}

#[derive(Default)]
pub struct ContextBuilder {
    elements: Vec<TextObject>,
}

impl ContextBuilder {
    pub fn plain(&mut self, text: impl Into<String>) -> &mut Self {
        self.elements.push(TextObject::plain(text));
        self
    }

    pub fn mrkdwn(&mut self, text: impl Into<String>) -> &mut Self {
        self.elements.push(TextObject::mrkdwn(text));
        self
    }

    fn build(self) -> Vec<TextObject> {
        self.elements
    }
}

/// A `views.open` modal definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ModalView {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub callback_id: String,
    pub title: TextObject,
    pub submit: TextObject,
    pub close: TextObject,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub private_metadata: String,
    pub blocks: Vec<Block>,
}

pub fn recognition_modal(origin_channel_id: &str) -> ModalView {
    let options = CoreValue::ALL
        .iter()
        .map(|value| SelectOption { text: TextObject::plain(value.label()), value: value.key().to_owned() })
        .collect();

    ModalView {
        kind: "modal",
        callback_id: RECOGNITION_CALLBACK_ID.to_owned(),
        title: TextObject::plain("Give a High-Five"),
        submit: TextObject::plain("Send"),
        close: TextObject::plain("Cancel"),
        private_metadata: origin_channel_id.to_owned(),
        blocks: vec![
            Block::Input {
                block_id: RECIPIENT_BLOCK_ID.to_owned(),
                label: TextObject::plain("Who deserves a high-five?"),
                element: InputElement::UsersSelect {
                    action_id: RECIPIENT_ACTION_ID.to_owned(),
                    placeholder: TextObject::plain("Pick a teammate"),
                },
            },
            Block::Input {
                block_id: CORE_VALUE_BLOCK_ID.to_owned(),
                label: TextObject::plain("Which core value did they show?"),
                element: InputElement::StaticSelect {
                    action_id: CORE_VALUE_ACTION_ID.to_owned(),
                    placeholder: TextObject::plain("Choose a value"),
                    options,
                },
            },
            Block::Input {
                block_id: MESSAGE_BLOCK_ID.to_owned(),
                label: TextObject::plain("Message"),
                element: InputElement::PlainTextInput {
                    action_id: MESSAGE_ACTION_ID.to_owned(),
                    multiline: true,
                    placeholder: TextObject::plain("What did they do?"),
                },
            },
        ],
    }
}

pub fn recognition_card(event: &RecognitionEvent, counts: &RecordedCounts) -> MessageTemplate {
    let giver = event.giver.mention();
    let receiver = event.receiver.mention();
    let label = event.core_value.label();

    let mut builder = MessageBuilder::new(format!("{giver} gave {receiver} a high-five for {label}"))
        .header("highfive.card.header.v1", "🙌 High-Five!")
        .section("highfive.card.summary.v1", |section| {
            section.mrkdwn(format!("{giver} recognized {receiver} for *{label}*"));
        });

    if !event.message.is_empty() {
        let quoted = event
            .message
            .lines()
            .map(|line| format!("> {line}"))
            .collect::<Vec<_>>()
            .join("\n");
        builder = builder.section("highfive.card.message.v1", |section| {
            section.mrkdwn(quoted);
        });
    }

    builder
        .context("highfive.card.tally.v1", |context| {
            context.mrkdwn(format!(
                "{giver} has given {} · {receiver} has received {}",
                pluralize(counts.giver_given),
                pluralize(counts.receiver_received)
            ));
        })
        .build()
}

pub fn leaderboard_message(summary: &LeaderboardSummary, title: &str) -> MessageTemplate {
    if summary.is_empty() {
        return MessageBuilder::new(format!("{title}: no high-fives yet"))
            .header("highfive.leaderboard.header.v1", format!("🏆 {title}"))
            .section("highfive.leaderboard.empty.v1", |section| {
                section.plain("No high-fives yet. Be the first with /highfive!");
            })
            .build();
    }

    MessageBuilder::new(title.to_owned())
        .header("highfive.leaderboard.header.v1", format!("🏆 {title}"))
        .section("highfive.leaderboard.receivers.v1", |section| {
            section.mrkdwn(format!("*Most recognized*\n{}", ranked_lines(&summary.top_receivers)));
        })
        .divider("highfive.leaderboard.divider.v1")
        .section("highfive.leaderboard.givers.v1", |section| {
            section.mrkdwn(format!("*Top givers*\n{}", ranked_lines(&summary.top_givers)));
        })
        .build()
}

fn ranked_lines(entries: &[LeaderboardEntry]) -> String {
    if entries.is_empty() {
        return "_nobody yet_".to_owned();
    }

    entries
        .iter()
        .map(|entry| {
            format!("{}. {} · {}", entry.rank, entry.user_id.mention(), pluralize(entry.count))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn pluralize(count: u64) -> String {
    if count == 1 {
        "1 high-five".to_owned()
    } else {
        format!("{count} high-fives")
    }
}

pub fn error_message(summary: &str, correlation_id: &str) -> MessageTemplate {
    MessageBuilder::new(summary.to_owned())
        .section("highfive.error.summary.v1", |section| {
            section.mrkdwn(format!(":warning: {summary}"));
        })
        .context("highfive.error.context.v1", |context| {
            context.plain(format!("Correlation ID: {correlation_id}"));
        })
        .build()
}

pub fn help_message() -> MessageTemplate {
    MessageBuilder::new("High-Five command help")
        .section("highfive.help.summary.v1", |section| {
            section.mrkdwn(
                "*Available commands*\n• `/highfive` open the recognition form\n• `/highfive leaderboard [n]` show the top givers and receivers\n• `/highfive help`",
            );
        })
        .build()
}

pub fn test_message() -> MessageTemplate {
    MessageBuilder::new("Test message from High-Five bot ✅").build()
}

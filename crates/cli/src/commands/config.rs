use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::ExposeSecret;
use toml::Value;

use crate::commands::{load_config, CommandResult};

struct Field {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

pub fn run() -> CommandResult {
    let config = match load_config("config") {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let fields = [
        Field {
            key: "ledger.backend",
            value: config.ledger.backend.as_str().to_string(),
            env_keys: &["HIGHFIVE_LEDGER_BACKEND"],
        },
        Field {
            key: "ledger.database_url",
            value: config.ledger.database_url.clone(),
            env_keys: &["HIGHFIVE_DATABASE_URL"],
        },
        Field {
            key: "ledger.file_path",
            value: config.ledger.file_path.display().to_string(),
            env_keys: &["HIGHFIVE_LEDGER_FILE"],
        },
        Field {
            key: "slack.bot_token",
            value: redact_token(config.slack.bot_token.expose_secret()),
            env_keys: &["HIGHFIVE_SLACK_BOT_TOKEN", "SLACK_BOT_TOKEN"],
        },
        Field {
            key: "slack.signing_secret",
            value: if config.slack.signing_secret.is_some() { "<redacted>" } else { "<unset>" }
                .to_string(),
            env_keys: &["HIGHFIVE_SLACK_SIGNING_SECRET", "SLACK_SIGNING_SECRET"],
        },
        Field {
            key: "slack.channel_id",
            value: config.slack.channel_id.clone(),
            env_keys: &["HIGHFIVE_SLACK_CHANNEL", "HIGHFIVE_CHANNEL"],
        },
        Field {
            key: "server.bind_address",
            value: config.server.bind_address.clone(),
            env_keys: &["HIGHFIVE_SERVER_BIND_ADDRESS"],
        },
        Field {
            key: "server.port",
            value: config.server.port.to_string(),
            env_keys: &["HIGHFIVE_SERVER_PORT", "PORT"],
        },
        Field {
            key: "mirror.enabled",
            value: config.mirror.enabled.to_string(),
            env_keys: &["HIGHFIVE_MIRROR_ENABLED"],
        },
        Field {
            key: "mirror.webhook_url",
            value: if config.mirror.webhook_url.is_some() { "<redacted>" } else { "<unset>" }
                .to_string(),
            env_keys: &["HIGHFIVE_MIRROR_WEBHOOK_URL"],
        },
        Field {
            key: "report.enabled",
            value: config.report.enabled.to_string(),
            env_keys: &["HIGHFIVE_REPORT_ENABLED"],
        },
        Field {
            key: "report.interval_secs",
            value: config.report.interval_secs.to_string(),
            env_keys: &["HIGHFIVE_REPORT_INTERVAL_SECS"],
        },
        Field {
            key: "report.top_n",
            value: config.report.top_n.to_string(),
            env_keys: &["HIGHFIVE_REPORT_TOP_N"],
        },
        Field {
            key: "logging.level",
            value: config.logging.level.clone(),
            env_keys: &["HIGHFIVE_LOGGING_LEVEL", "HIGHFIVE_LOG_LEVEL"],
        },
        Field {
            key: "logging.format",
            value: config.logging.format.as_str().to_string(),
            env_keys: &["HIGHFIVE_LOGGING_FORMAT", "HIGHFIVE_LOG_FORMAT"],
        },
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(fields.iter().map(|field| {
        let source = field_source(
            field.key,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        render_line(field.key, &field.value, source)
    }));

    CommandResult::success("config", lines.join("\n"))
}

fn detect_config_path() -> Option<PathBuf> {
    ["highfive.toml", "config/highfive.toml"].into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}

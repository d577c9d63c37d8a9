use std::time::Duration;

use anyhow::{Context, Result, anyhow};

use crate::widgets::{AccessRule, ButtonMessageOptions, PaginatorOptions};

const DEFAULT_WIDGET_TIMEOUT_SECS: i64 = 300;
const DEFAULT_GOTO_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    /// `None` means widgets never expire on their own.
    pub widget_timeout: Option<Duration>,
    pub go_to_timeout: Duration,
    pub pager_access: AccessRule,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| dotenvy::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| anyhow!("DISCORD_TOKEN environment variable is required"))?;

        let widget_timeout_secs: i64 = parse_or(&lookup, "WIDGET_TIMEOUT_SECS", DEFAULT_WIDGET_TIMEOUT_SECS)?;
        let widget_timeout = u64::try_from(widget_timeout_secs)
            .ok()
            .map(Duration::from_secs);

        let go_to_timeout =
            Duration::from_secs(parse_or(&lookup, "GOTO_TIMEOUT_SECS", DEFAULT_GOTO_TIMEOUT_SECS)?);

        let pager_access = match lookup("PAGER_OPEN_AFTER_SECS") {
            None => AccessRule::OwnerOnly,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(0) => AccessRule::Everyone,
                Ok(secs) => AccessRule::OpensAfter(Duration::from_secs(secs)),
                Err(e) => return Err(anyhow!("PAGER_OPEN_AFTER_SECS is not a number: {}", e)),
            },
        };

        Ok(Config {
            discord_token,
            widget_timeout,
            go_to_timeout,
            pager_access,
        })
    }

    pub fn paginator_options(&self) -> PaginatorOptions {
        PaginatorOptions {
            timeout: self.widget_timeout,
            access: self.pager_access,
            go_to_timeout: self.go_to_timeout,
            ..PaginatorOptions::default()
        }
    }

    pub fn button_message_options(&self) -> ButtonMessageOptions {
        ButtonMessageOptions {
            timeout: self.widget_timeout,
            ..ButtonMessageOptions::default()
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} is not a valid number", key)),
        None => Ok(default),
    }
}

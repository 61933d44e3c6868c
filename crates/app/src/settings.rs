//! Settings for the `splitmail` binary.
//!
//! Read from `settings.toml` (or the file given with `--config`), then
//! overridden by `SPLITMAIL_<SECTION>__<KEY>` environment variables, e.g.
//! `SPLITMAIL_AUTH__JWT_SECRET`.
use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use mailer::{PdfConfig, SmtpSettings};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "settings";

#[derive(Debug, Parser)]
#[command(name = "splitmail", version)]
struct Args {
    /// Optional settings file path (TOML).
    #[arg(long)]
    config: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    pub database: Database,
}

fn default_port() -> u16 {
    5000
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: i64,
}

fn default_token_ttl() -> i64 {
    24 * 60 * 60
}

#[derive(Debug, Deserialize)]
pub struct Mail {
    #[serde(flatten)]
    pub smtp: SmtpSettings,
    /// `From` address of every report.
    pub from: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Server,
    pub auth: Auth,
    pub mail: Mail,
    #[serde(default)]
    pub pdf: PdfConfig,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let args = Args::parse();
        let path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);

        Self::from_sources(path, Environment::with_prefix("SPLITMAIL"))
    }

    fn from_sources(path: &str, environment: Environment) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                environment
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use mailer::PageSize;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Environment::with_prefix("SPLITMAIL").source(Some(source))
    }

    #[test]
    fn environment_alone_is_enough() {
        let settings = Settings::from_sources(
            "does-not-exist",
            env(&[
                ("SPLITMAIL_SERVER__DATABASE", "memory"),
                ("SPLITMAIL_AUTH__JWT_SECRET", "s3cret"),
                ("SPLITMAIL_MAIL__HOST", "smtp.example.com"),
                ("SPLITMAIL_MAIL__FROM", "splitmail@example.com"),
                ("SPLITMAIL_PDF__PAGE_SIZE", "a4"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.server.port, 5000);
        assert!(matches!(settings.server.database, Database::Memory));
        assert_eq!(settings.auth.token_ttl_secs, 86_400);
        assert_eq!(settings.mail.smtp.port, 587);
        assert_eq!(settings.mail.smtp.host, "smtp.example.com");
        assert_eq!(settings.mail.from, "splitmail@example.com");
        assert_eq!(settings.pdf.page_size, PageSize::A4);
    }

    #[test]
    fn numbers_are_parsed_from_environment() {
        let settings = Settings::from_sources(
            "does-not-exist",
            env(&[
                ("SPLITMAIL_SERVER__PORT", "8080"),
                ("SPLITMAIL_SERVER__DATABASE", "memory"),
                ("SPLITMAIL_AUTH__JWT_SECRET", "s3cret"),
                ("SPLITMAIL_AUTH__TOKEN_TTL_SECS", "60"),
                ("SPLITMAIL_MAIL__HOST", "smtp.example.com"),
                ("SPLITMAIL_MAIL__PORT", "2525"),
                ("SPLITMAIL_MAIL__FROM", "splitmail@example.com"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.auth.token_ttl_secs, 60);
        assert_eq!(settings.mail.smtp.port, 2525);
    }

    #[test]
    fn missing_mail_section_is_an_error() {
        let result = Settings::from_sources(
            "does-not-exist",
            env(&[
                ("SPLITMAIL_SERVER__DATABASE", "memory"),
                ("SPLITMAIL_AUTH__JWT_SECRET", "s3cret"),
            ]),
        );

        assert!(result.is_err());
    }
}

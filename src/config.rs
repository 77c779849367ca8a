//! Configuration module for usermail.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::{Result, UsermailError};

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL.
    #[serde(default = "default_db_url")]
    pub url: String,
}

fn default_db_url() -> String {
    "sqlite://data/usermail.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_db_url(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
    /// Level for the mail dispatch subsystem and its outcome records.
    #[serde(default = "default_log_level")]
    pub mail_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/usermail.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
            mail_level: default_log_level(),
        }
    }
}

/// Mail dispatch configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// Whether outbound mail is actually handed to the SMTP server.
    #[serde(default = "default_send_emails")]
    pub send_emails: bool,
    /// Pause between processed jobs in seconds.
    #[serde(default = "default_pacing_delay")]
    pub pacing_delay_secs: u64,
    /// Directory holding `<MessageType>.html` templates.
    #[serde(default = "default_template_path")]
    pub template_path: String,
}

fn default_send_emails() -> bool {
    true
}

fn default_pacing_delay() -> u64 {
    60
}

fn default_template_path() -> String {
    "templates/mail".to_string()
}

impl MailConfig {
    /// Pacing delay as a [`Duration`].
    pub fn pacing_delay(&self) -> Duration {
        Duration::from_secs(self.pacing_delay_secs)
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            send_emails: default_send_emails(),
            pacing_delay_secs: default_pacing_delay(),
            template_path: default_template_path(),
        }
    }
}

/// SMTP credentials and sender identity.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    /// SMTP server address.
    #[serde(default)]
    pub host: String,
    /// SMTP server port.
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// Use implicit TLS / STARTTLS.
    #[serde(default = "default_enable_ssl")]
    pub enable_ssl: bool,
    /// SMTP username.
    #[serde(default)]
    pub username: String,
    /// SMTP password.
    #[serde(default)]
    pub password: String,
    /// Sender display name.
    #[serde(default = "default_from_name")]
    pub from_name: String,
    /// Sender address.
    #[serde(default)]
    pub from_email: String,
}

fn default_smtp_port() -> u16 {
    587
}

fn default_enable_ssl() -> bool {
    true
}

fn default_from_name() -> String {
    "usermail".to_string()
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_smtp_port(),
            enable_ssl: default_enable_ssl(),
            username: String::new(),
            password: String::new(),
            from_name: default_from_name(),
            from_email: String::new(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Mail dispatch configuration.
    #[serde(default)]
    pub mail: MailConfig,
    /// SMTP configuration.
    #[serde(default)]
    pub smtp: SmtpConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(UsermailError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| UsermailError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `USERMAIL_SMTP_PASSWORD`: Override the SMTP password
    pub fn apply_env_overrides(&mut self) {
        if let Ok(password) = std::env::var("USERMAIL_SMTP_PASSWORD") {
            if !password.is_empty() {
                self.smtp.password = password;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - Sending is enabled but the SMTP host or sender address is missing
    pub fn validate(&self) -> Result<()> {
        if self.mail.send_emails {
            if self.smtp.host.trim().is_empty() {
                return Err(UsermailError::Config(
                    "mail.send_emails is enabled but smtp.host is not set".to_string(),
                ));
            }
            if self.smtp.from_email.trim().is_empty() {
                return Err(UsermailError::Config(
                    "mail.send_emails is enabled but smtp.from_email is not set".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.database.url, "sqlite://data/usermail.db");

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/usermail.log");
        assert_eq!(config.logging.mail_level, "info");

        assert!(config.mail.send_emails);
        assert_eq!(config.mail.pacing_delay_secs, 60);
        assert_eq!(config.mail.pacing_delay(), Duration::from_secs(60));
        assert_eq!(config.mail.template_path, "templates/mail");

        assert!(config.smtp.host.is_empty());
        assert_eq!(config.smtp.port, 587);
        assert!(config.smtp.enable_ssl);
        assert_eq!(config.smtp.from_name, "usermail");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[database]
url = "sqlite://custom/db.sqlite"

[logging]
level = "debug"
file = "custom/logs/app.log"
mail_level = "warning"

[mail]
send_emails = false
pacing_delay_secs = 5
template_path = "custom/templates"

[smtp]
host = "smtp.example.com"
port = 465
enable_ssl = false
username = "mailer"
password = "secret"
from_name = "Accounts"
from_email = "accounts@example.com"
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.database.url, "sqlite://custom/db.sqlite");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, "custom/logs/app.log");
        assert_eq!(config.logging.mail_level, "warning");

        assert!(!config.mail.send_emails);
        assert_eq!(config.mail.pacing_delay(), Duration::from_secs(5));
        assert_eq!(config.mail.template_path, "custom/templates");

        assert_eq!(config.smtp.host, "smtp.example.com");
        assert_eq!(config.smtp.port, 465);
        assert!(!config.smtp.enable_ssl);
        assert_eq!(config.smtp.username, "mailer");
        assert_eq!(config.smtp.password, "secret");
        assert_eq!(config.smtp.from_name, "Accounts");
        assert_eq!(config.smtp.from_email, "accounts@example.com");
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[mail]
pacing_delay_secs = 1
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.mail.pacing_delay_secs, 1);
        assert!(config.mail.send_emails);
        assert_eq!(config.smtp.port, 587);
        assert_eq!(config.database.url, "sqlite://data/usermail.db");
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("this is not valid toml [[[");

        assert!(result.is_err());
        if let Err(UsermailError::Config(msg)) = result {
            assert!(msg.contains("config parse error"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent.toml");
        assert!(matches!(result, Err(UsermailError::Io(_))));
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[smtp]\nhost = \"mail.local\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.smtp.host, "mail.local");
    }

    #[test]
    fn test_validate_sending_without_host() {
        let config = Config::default();

        let result = config.validate();
        assert!(result.is_err());
        if let Err(UsermailError::Config(msg)) = result {
            assert!(msg.contains("smtp.host"));
        }
    }

    #[test]
    fn test_validate_sending_without_sender() {
        let mut config = Config::default();
        config.smtp.host = "smtp.example.com".to_string();

        let result = config.validate();
        assert!(matches!(result, Err(UsermailError::Config(msg)) if msg.contains("from_email")));
    }

    #[test]
    fn test_validate_sending_disabled() {
        let mut config = Config::default();
        config.mail.send_emails = false;

        assert!(config.validate().is_ok());
    }
}

//! usermail mail dispatcher process.
//!
//! Runs the background dispatch worker over the configured database, SMTP
//! server and templates until Ctrl-C. This binary only consumes the queue.
//! Mail is produced by code that embeds the library, through
//! [`MailDispatcher::sender`] or a [`usermail::UserService`] built on that
//! sender, running in the same process.

use std::sync::Arc;

use tracing::{error, info};

use usermail::mail::{
    DbBlockedRecipientGate, MailDispatchWorker, MailDispatcher, MailQueue, SmtpMailTransport,
    TemplateStore, TracingLogSink,
};
use usermail::{Config, Database};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = usermail::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        usermail::logging::init_console_only(&config.logging);
    }

    info!("usermail mail dispatcher starting");

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    let db = match Database::open(&config.database.url).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    let templates = TemplateStore::new(&config.mail.template_path);
    let transport = match SmtpMailTransport::new(&config.smtp, &config.mail, templates) {
        Ok(transport) => transport,
        Err(e) => {
            error!("Failed to set up SMTP transport: {}", e);
            std::process::exit(1);
        }
    };

    let worker = MailDispatchWorker::new(
        Arc::new(MailQueue::new()),
        Arc::new(DbBlockedRecipientGate::new(Arc::clone(&db))),
        Arc::new(transport),
        Arc::new(TracingLogSink),
    )
    .with_pacing_delay(config.mail.pacing_delay());

    let dispatcher = MailDispatcher::start(worker);

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }

    let pending = dispatcher.sender().pending();
    if pending > 0 {
        info!("Shutting down with {} mail(s) still queued", pending);
    } else {
        info!("Shutting down");
    }
    dispatcher.shutdown().await;
    db.close().await;
}

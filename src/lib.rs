//! usermail - user management backend with an asynchronous mail dispatcher.
//!
//! Account changes queue notification mails that a single background worker
//! delivers over SMTP, retrying once and blocking recipients that keep
//! failing.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod mail;
pub mod user;

pub use config::Config;
pub use db::{Database, ListRequest, NewUser, Page, User, UserRepository, UserUpdate};
pub use error::{Result, UsermailError};
pub use mail::{
    BlockedRecipientGate, LogSink, MailDispatchWorker, MailDispatcher, MailJob, MailQueue,
    MailSender, MailTransport, MessageType, Placeholders,
};
pub use user::{NewUserRequest, UserService};

//! Portalchecker engine: portal IO, persistence and notification.
mod config;
mod decode;
mod history;
mod notify;
mod run;
mod session;

pub use config::{ConfigError, Credentials};
pub use decode::{decode_page, DecodeError, DecodedPage};
pub use history::{append_run_timestamp, HistoryError, HistoryStore};
pub use notify::{
    notification_body, notification_subject, ConsoleNotifier, MailSettings, Notifier, NotifyError,
    SmtpNotifier,
};
pub use run::{run_once, CategoryError, CategoryOutcome, CategoryReport};
pub use session::{
    grid_rows, HttpPortalSession, PortalEndpoints, PortalSession, SessionError, SessionSettings,
    TableRow,
};

use checker_core::{Category, Record};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials as SmtpCredentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::Credentials;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("building mail message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("smtp delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("notification channel failed: {0}")]
    Channel(String),
}

/// Delivery channel for "something new appeared" notifications.
///
/// One implementation per channel, selected by configuration; a failed
/// send is surfaced to the caller, never swallowed here.
pub trait Notifier {
    fn send(&self, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Prints notifications to stdout instead of delivering them anywhere.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn send(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        println!("{subject}\n{body}\n");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct MailSettings {
    pub smtp_host: String,
    pub smtp_port: u16,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 465,
        }
    }
}

/// Mails notifications over SMTPS, from and to the configured address.
pub struct SmtpNotifier {
    transport: SmtpTransport,
    mailbox: Mailbox,
}

impl SmtpNotifier {
    pub fn new(settings: &MailSettings, credentials: &Credentials) -> Result<Self, NotifyError> {
        let mailbox: Mailbox = credentials.email_address.parse()?;
        let transport = SmtpTransport::relay(&settings.smtp_host)?
            .port(settings.smtp_port)
            .credentials(SmtpCredentials::new(
                credentials.email_address.clone(),
                credentials.email_password.clone(),
            ))
            .build();
        Ok(Self { transport, mailbox })
    }
}

impl Notifier for SmtpNotifier {
    fn send(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let message = Message::builder()
            .from(self.mailbox.clone())
            .to(self.mailbox.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;
        self.transport.send(&message)?;
        Ok(())
    }
}

/// Subject line for one new record; distinguishes the two categories.
pub fn notification_subject(category: Category) -> String {
    match category {
        Category::Messages => "PortalChecker: New Message Found".to_string(),
        Category::Charges => "PortalChecker: New Charge Found".to_string(),
    }
}

/// Body embedding the record's canonical string, quoted.
pub fn notification_body(category: Category, record: &Record) -> String {
    format!("A new {} was found:\n\n\"{}\"", category.label(), record)
}

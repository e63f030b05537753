use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

const KEY_PORTAL_USERNAME: &str = "myucsc-username";
const KEY_PORTAL_PASSWORD: &str = "myucsc-password";
const KEY_EMAIL_ADDRESS: &str = "email-address";
const KEY_EMAIL_PASSWORD: &str = "email-password";

/// Credentials for the portal login and the notification mailbox.
///
/// Built once at startup from the config file (or the first-run prompt)
/// and passed by reference to the collaborators that need it; nothing
/// mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub portal_username: String,
    pub portal_password: String,
    pub email_address: String,
    pub email_password: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("writing config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("config {path} is missing key `{key}`")]
    MissingKey { path: PathBuf, key: &'static str },
    #[error("config key `{key}` has no value")]
    MissingValue { key: String },
    #[error("prompting for credentials: {0}")]
    Prompt(#[source] io::Error),
}

impl Credentials {
    /// Parse the whitespace-delimited key/value config format.
    /// Lines starting with `#` are comments; unknown keys are ignored.
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let mut portal_username = None;
        let mut portal_password = None;
        let mut email_address = None;
        let mut email_password = None;

        for line in text.lines() {
            if line.trim_start().starts_with('#') {
                continue;
            }
            let mut tokens = line.split_whitespace();
            while let Some(key) = tokens.next() {
                let slot = match key {
                    KEY_PORTAL_USERNAME => &mut portal_username,
                    KEY_PORTAL_PASSWORD => &mut portal_password,
                    KEY_EMAIL_ADDRESS => &mut email_address,
                    KEY_EMAIL_PASSWORD => &mut email_password,
                    _ => continue,
                };
                let value = tokens.next().ok_or_else(|| ConfigError::MissingValue {
                    key: key.to_string(),
                })?;
                *slot = Some(value.to_string());
            }
        }

        let require = |value: Option<String>, key: &'static str| {
            value.ok_or(ConfigError::MissingKey {
                path: path.to_path_buf(),
                key,
            })
        };
        Ok(Self {
            portal_username: require(portal_username, KEY_PORTAL_USERNAME)?,
            portal_password: require(portal_password, KEY_PORTAL_PASSWORD)?,
            email_address: require(email_address, KEY_EMAIL_ADDRESS)?,
            email_password: require(email_password, KEY_EMAIL_PASSWORD)?,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Persist in the exact key/value format `parse` reads back.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = format!(
            "{KEY_PORTAL_USERNAME} {}\n{KEY_PORTAL_PASSWORD} {}\n{KEY_EMAIL_ADDRESS} {}\n{KEY_EMAIL_PASSWORD} {}\n",
            self.portal_username, self.portal_password, self.email_address, self.email_password,
        );
        fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Ask the user for all four values, one per line.
    pub fn prompt(input: &mut dyn BufRead, output: &mut dyn Write) -> io::Result<Self> {
        let mut ask = |question: &str| -> io::Result<String> {
            writeln!(output, "{question}")?;
            output.flush()?;
            let mut line = String::new();
            input.read_line(&mut line)?;
            Ok(line.trim().to_string())
        };
        Ok(Self {
            portal_username: ask("Please enter your MyUCSC username:")?,
            portal_password: ask("Please enter your MyUCSC password:")?,
            email_address: ask("Please enter your email address:")?,
            email_password: ask("Please enter your email account password:")?,
        })
    }

    /// Load the config file, or on a first run prompt on stdin for the
    /// four values and write the file so later runs are non-interactive.
    pub fn load_or_prompt(path: &Path) -> Result<Self, ConfigError> {
        if path.is_file() {
            return Self::load(path);
        }
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        let credentials =
            Self::prompt(&mut input, &mut output).map_err(ConfigError::Prompt)?;
        credentials.save(path)?;
        Ok(credentials)
    }
}

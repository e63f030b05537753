use std::time::Duration;

use checker_core::Category;
use scraper::{Html, Selector};
use url::Url;

use crate::config::Credentials;
use crate::decode::{decode_page, DecodeError};

/// One table row, as the ordered text of its cells.
pub type TableRow = Vec<String>;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid portal url: {0}")]
    InvalidUrl(String),
    #[error("building http client: {0}")]
    Client(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("portal request timed out")]
    Timeout,
    #[error("portal returned http status {0}")]
    HttpStatus(u16),
    #[error("portal rejected the login credentials")]
    LoginRejected,
    #[error("portal page too large (max {max_bytes} bytes, got {actual})")]
    TooLarge { max_bytes: u64, actual: u64 },
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Where the portal lives. The paths vary between PeopleSoft
/// deployments, so they are data rather than constants.
#[derive(Debug, Clone)]
pub struct PortalEndpoints {
    pub base: Url,
    pub login_path: String,
    pub messages_path: String,
    pub charges_path: String,
}

impl PortalEndpoints {
    pub fn new(base: Url) -> Self {
        Self {
            base,
            login_path: "/login".to_string(),
            messages_path: "/messages".to_string(),
            charges_path: "/charges".to_string(),
        }
    }

    fn join(&self, path: &str) -> Result<Url, SessionError> {
        self.base
            .join(path)
            .map_err(|err| SessionError::InvalidUrl(err.to_string()))
    }
}

impl Default for PortalEndpoints {
    fn default() -> Self {
        let base = Url::parse("https://my.ucsc.edu").expect("static url");
        Self::new(base)
    }
}

/// Source of raw table rows, one sequential stateful session per run.
///
/// Implementations yield only valid data rows; header and decoration
/// rows are already filtered out.
#[async_trait::async_trait]
pub trait PortalSession: Send {
    async fn table_rows(&mut self, category: Category) -> Result<Vec<TableRow>, SessionError>;
}

/// Portal session over plain HTTP: logs into the portal form once,
/// keeps the cookie jar, and scrapes the category pages.
pub struct HttpPortalSession {
    client: reqwest::Client,
    endpoints: PortalEndpoints,
    settings: SessionSettings,
    portal_username: String,
    portal_password: String,
    logged_in: bool,
}

impl HttpPortalSession {
    pub fn new(
        endpoints: PortalEndpoints,
        settings: SessionSettings,
        credentials: &Credentials,
    ) -> Result<Self, SessionError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| SessionError::Client(err.to_string()))?;
        Ok(Self {
            client,
            endpoints,
            settings,
            portal_username: credentials.portal_username.clone(),
            portal_password: credentials.portal_password.clone(),
            logged_in: false,
        })
    }

    async fn login(&mut self) -> Result<(), SessionError> {
        let url = self.endpoints.join(&self.endpoints.login_path)?;
        let response = self
            .client
            .post(url)
            .form(&[
                ("userid", self.portal_username.as_str()),
                ("pwd", self.portal_password.as_str()),
                ("Submit", "Submit"),
            ])
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let html = read_page(response, self.settings.max_bytes).await?;
        // The portal answers a bad login with 200 and the form again.
        if has_login_form(&html) {
            return Err(SessionError::LoginRejected);
        }
        self.logged_in = true;
        Ok(())
    }

    async fn fetch_page(&self, path: &str) -> Result<String, SessionError> {
        let url = self.endpoints.join(path)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_page(response, self.settings.max_bytes).await
    }
}

#[async_trait::async_trait]
impl PortalSession for HttpPortalSession {
    async fn table_rows(&mut self, category: Category) -> Result<Vec<TableRow>, SessionError> {
        if !self.logged_in {
            self.login().await?;
        }
        let path = match category {
            Category::Messages => self.endpoints.messages_path.clone(),
            Category::Charges => self.endpoints.charges_path.clone(),
        };
        let html = self.fetch_page(&path).await?;
        Ok(grid_rows(&html))
    }
}

async fn read_page(response: reqwest::Response, max_bytes: u64) -> Result<String, SessionError> {
    let status = response.status();
    if !status.is_success() {
        return Err(SessionError::HttpStatus(status.as_u16()));
    }
    if let Some(len) = response.content_length() {
        if len > max_bytes {
            return Err(SessionError::TooLarge {
                max_bytes,
                actual: len,
            });
        }
    }
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string());
    let bytes = response.bytes().await.map_err(map_reqwest_error)?;
    if bytes.len() as u64 > max_bytes {
        return Err(SessionError::TooLarge {
            max_bytes,
            actual: bytes.len() as u64,
        });
    }
    Ok(decode_page(&bytes, content_type.as_deref())?.html)
}

/// Extract the valid data rows of the PeopleSoft level-1 grid.
///
/// Data rows carry an `id` attribute containing `row`; header and
/// spacer rows do not and are dropped here so the extractor only ever
/// sees item rows.
pub fn grid_rows(html: &str) -> Vec<TableRow> {
    let document = Html::parse_document(html);
    let row_selector = match Selector::parse("table.PSLEVEL1GRID tr") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };
    let cell_selector = match Selector::parse("td") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    let mut rows = Vec::new();
    for tr in document.select(&row_selector) {
        let is_data_row = tr
            .value()
            .attr("id")
            .is_some_and(|id| id.contains("row"));
        if !is_data_row {
            continue;
        }
        let cells = tr
            .select(&cell_selector)
            .map(|td| td.text().collect::<String>())
            .collect::<TableRow>();
        rows.push(cells);
    }
    rows
}

fn has_login_form(html: &str) -> bool {
    let document = Html::parse_document(html);
    match Selector::parse("input#userid") {
        Ok(selector) => document.select(&selector).next().is_some(),
        Err(_) => false,
    }
}

fn map_reqwest_error(err: reqwest::Error) -> SessionError {
    if err.is_timeout() {
        return SessionError::Timeout;
    }
    SessionError::Network(err.to_string())
}

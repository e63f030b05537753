use checker_core::{detect, extract_record, Category, Record};
use checker_logging::{checker_error, checker_info, checker_warn};

use crate::history::{HistoryError, HistoryStore};
use crate::notify::{notification_body, notification_subject, Notifier};
use crate::session::{PortalSession, SessionError};

/// What happened for one category in one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryReport {
    pub category: Category,
    pub rows_scanned: usize,
    pub rows_skipped: usize,
    pub new_records: Vec<Record>,
    pub delivery_failures: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum CategoryError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    History(#[from] HistoryError),
}

#[derive(Debug)]
pub struct CategoryOutcome {
    pub category: Category,
    pub result: Result<CategoryReport, CategoryError>,
}

/// One complete check: both categories in sequence against one portal
/// session. A failed category is reported in its outcome and does not
/// stop the other category from running.
pub async fn run_once(
    session: &mut dyn PortalSession,
    store: &HistoryStore,
    notifier: &dyn Notifier,
) -> Vec<CategoryOutcome> {
    let mut outcomes = Vec::with_capacity(Category::ALL.len());
    for category in Category::ALL {
        let result = check_category(session, store, notifier, category).await;
        match &result {
            Ok(report) => checker_info!(
                "{category}: {} rows, {} new, {} skipped, {} delivery failures",
                report.rows_scanned,
                report.new_records.len(),
                report.rows_skipped,
                report.delivery_failures,
            ),
            Err(err) => checker_error!("{category}: check failed: {err}"),
        }
        outcomes.push(CategoryOutcome { category, result });
    }
    outcomes
}

async fn check_category(
    session: &mut dyn PortalSession,
    store: &HistoryStore,
    notifier: &dyn Notifier,
    category: Category,
) -> Result<CategoryReport, CategoryError> {
    let rows = session.table_rows(category).await?;
    let rows_scanned = rows.len();

    let mut current = Vec::with_capacity(rows.len());
    let mut rows_skipped = 0;
    for row in &rows {
        match extract_record(category, row) {
            Ok(record) => current.push(record),
            Err(err) => {
                checker_warn!("skipping row: {err}");
                rows_skipped += 1;
            }
        }
    }

    let previous = store.load(category)?;
    let detection = detect(&previous, &current);

    let mut delivery_failures = 0;
    for record in &detection.new_records {
        let subject = notification_subject(category);
        let body = notification_body(category, record);
        if let Err(err) = notifier.send(&subject, &body) {
            // The history below is still replaced: without a retry
            // mechanism, blocking the update would re-notify the same
            // record on every future run.
            checker_error!("could not deliver {} notification: {err}", category.label());
            delivery_failures += 1;
        }
    }

    // Persist even when nothing is new, so removals and later
    // re-additions are detected against the latest table state.
    store.save(category, &detection.next_history)?;

    Ok(CategoryReport {
        category,
        rows_scanned,
        rows_skipped,
        new_records: detection.new_records,
        delivery_failures,
    })
}

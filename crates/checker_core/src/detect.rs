use crate::Record;

/// Result of comparing one scan against the previously persisted history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// Records of the current scan never seen in the previous history,
    /// in scan order. Duplicate rows within one scan are kept as-is.
    pub new_records: Vec<Record>,
    /// The history to persist after this run. Always the full current
    /// scan; old entries that vanished from the table are dropped.
    pub next_history: Vec<Record>,
}

/// Decide which records of `current` are new relative to `previous`.
///
/// Membership is exact string equality against the whole previous
/// history, not just its tail. Pure function; calling it twice with the
/// same inputs yields the same outputs.
pub fn detect(previous: &[Record], current: &[Record]) -> Detection {
    let new_records = current
        .iter()
        .filter(|record| !previous.contains(record))
        .cloned()
        .collect();
    Detection {
        new_records,
        next_history: current.to_vec(),
    }
}

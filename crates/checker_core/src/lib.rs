//! Portalchecker core: pure change-detection logic.
//!
//! Everything in this crate operates on values already captured from the
//! portal session; no IO happens here.
mod category;
mod detect;
mod record;

pub use category::Category;
pub use detect::{detect, Detection};
pub use record::{extract_record, MalformedRow, Record};

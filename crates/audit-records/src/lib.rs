//! Audit Records - repeatable sub-form lists
//!
//! An ordered list of independently validated records:
//! - Append/remove by explicit action only; never reordered
//! - Field edits re-validate the edited record alone
//! - At most one attachment per record, checked against a media-type policy
//! - Conditional fields toggle without discarding entered values

#![warn(unreachable_pub)]

pub mod attachment;
pub mod error;
pub mod list;
pub mod record;

pub use attachment::{Attachment, AttachmentPolicy, AttachmentRejected};
pub use error::RecordError;
pub use list::RecordList;
pub use record::Record;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Custom request extractors.

mod caller_uid;
mod validated_json;

pub use caller_uid::CallerUid;
pub use validated_json::{format_validation_errors, ValidatedJson};

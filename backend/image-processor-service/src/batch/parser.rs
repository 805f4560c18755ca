//! Batch change parser - queue message body to change records
//!
//! Pure: no I/O, deterministic. A body that is not a well-formed S3 event
//! notification fails as a whole; no record inside it is looked at.

use crate::error::BatchError;
use crate::models::ChangeRecord;
use event_schema::S3EventNotification;

pub fn parse_change_batch(body: &[u8]) -> Result<Vec<ChangeRecord>, BatchError> {
    let notification = S3EventNotification::from_slice(body)?;

    Ok(notification
        .records
        .into_iter()
        .map(ChangeRecord::from)
        .collect())
}

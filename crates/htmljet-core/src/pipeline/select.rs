//! Representative selection within a cluster.

use crate::types::ImageRecord;

/// Whether `challenger` should replace `incumbent` as a cluster's representative.
///
/// The larger file wins: after compression, more bytes usually means more
/// visual detail. Equal sizes keep the incumbent, which was seen first.
pub fn supersedes(challenger: &ImageRecord, incumbent: &ImageRecord) -> bool {
    challenger.byte_size > incumbent.byte_size
}

//! Output freshness check.

use filetime::FileTime;
use std::path::Path;

/// True when `output` exists and was modified no earlier than `input`.
///
/// Any stat failure (missing output, unreadable input) means "convert".
pub fn is_up_to_date(input: &Path, output: &Path) -> bool {
    let (Ok(input_meta), Ok(output_meta)) = (std::fs::metadata(input), std::fs::metadata(output))
    else {
        return false;
    };

    FileTime::from_last_modification_time(&output_meta)
        >= FileTime::from_last_modification_time(&input_meta)
}

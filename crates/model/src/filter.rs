//! Name search used by the listing.
use crate::SchoolRecord;

/// Returns the records whose name contains `query`, ignoring case.
///
/// The query is trimmed first; a blank query keeps every record. Order is preserved.
#[must_use]
pub fn filter_by_name<'a>(records: &'a [SchoolRecord], query: &str) -> Vec<&'a SchoolRecord> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return records.iter().collect();
    }
    records
        .iter()
        .filter(|record| record.name.to_lowercase().contains(&needle))
        .collect()
}

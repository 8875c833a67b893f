//! Validation Gate.

use crate::record::ScrapeRecord;

/// True when at least one of the eleven slots holds a finite number.
pub fn has_numeric_value(record: &ScrapeRecord) -> bool {
    record
        .data
        .slots()
        .any(|slot| slot.is_some_and(f64::is_finite))
}

//! Airtable formula construction.
//!
//! String literals are single-quoted; backslashes and quotes inside them are
//! escaped so caller-supplied text cannot close the literal.

/// Escape a value for use inside a single-quoted formula string.
pub fn escape_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Case-insensitive substring match of `query` against `field`.
pub fn name_contains(field: &str, query: &str) -> String {
    format!(
        "FIND(LOWER('{}'), LOWER({{{field}}})) > 0",
        escape_string(query)
    )
}

/// Exact equality of `field` and `value`.
pub fn field_equals(field: &str, value: &str) -> String {
    format!("{{{field}}}='{}'", escape_string(value))
}

/// Allocations linked to `asset_record_id` that start on `date` and are
/// either confirmed or pending.
pub fn allocations_on(asset_record_id: &str, date: &str) -> String {
    format!(
        "AND(FIND('{}', ARRAYJOIN({{Asset Link}})),{{Start Date}}='{}',OR({{Status}}='Confirmed',{{Status}}='Pending'))",
        escape_string(asset_record_id),
        escape_string(date)
    )
}

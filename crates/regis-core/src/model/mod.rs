//! Entity records managed by the backend: colleges, programs, students.
//!
//! Every record type implements [`Record`], which is what the view engine
//! and the HTTP layer program against: a REST resource name, a primary key,
//! and dynamic field lookup for sorting and exact-match filters.

mod college;
mod program;
mod student;

pub use college::College;
pub use program::Program;
pub use student::{Gender, Student, YearLevel};

use std::cmp::Ordering;
use std::fmt;

/// A sortable/filterable field value pulled out of a record.
///
/// Text comparison is case-folded; integers compare numerically. A mixed
/// pair falls back to textual comparison so a misconfigured sort key
/// degrades instead of panicking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Int(i64),
}

impl FieldValue {
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (a, b) => {
                let (a, b) = (a.to_string().to_lowercase(), b.to_string().to_lowercase());
                a.cmp(&b)
            }
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
        }
    }
}

/// A backend-managed record type.
pub trait Record: Clone {
    /// REST resource segment under `/api/dashboard/`.
    const RESOURCE: &'static str;
    /// Field name wrapping the collection in an object payload.
    const COLLECTION_FIELD: &'static str;

    /// Primary key used in resource paths (`…/{key}`).
    fn key(&self) -> String;

    /// Dynamic field lookup by snake_case name, for sorting and filters.
    ///
    /// Returns `None` for unknown names or absent values; the view engine
    /// treats missing fields as equal rather than erroring.
    fn field(&self, name: &str) -> Option<FieldValue>;

    /// Concatenated display fields searched by the free-text box.
    fn search_haystack(&self) -> String;

    /// Case-insensitive substring match over the search haystack.
    ///
    /// Record types may special-case well-known query tokens before falling
    /// back to this generic match (students do, for year levels and gender).
    fn matches_search(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.search_haystack().to_lowercase().contains(&needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_values_compare_numerically() {
        assert_eq!(
            FieldValue::Int(2).compare(&FieldValue::Int(10)),
            Ordering::Less
        );
    }

    #[test]
    fn field_values_compare_text_case_folded() {
        assert_eq!(
            FieldValue::Text("alpha".into()).compare(&FieldValue::Text("ALPHA".into())),
            Ordering::Equal
        );
        assert_eq!(
            FieldValue::Text("Beta".into()).compare(&FieldValue::Text("alpha".into())),
            Ordering::Greater
        );
    }

    #[test]
    fn mixed_field_values_fall_back_to_text() {
        assert_eq!(
            FieldValue::Int(2).compare(&FieldValue::Text("2".into())),
            Ordering::Equal
        );
    }
}

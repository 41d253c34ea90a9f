//! Derived-view engine: filter, sort, paginate.
//!
//! The collection held by a list controller is a server snapshot; what the
//! table shows is a pure projection of that snapshot through a [`ViewState`].
//! Recomputed on demand, never persisted.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::Record;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ascending => "Ascending",
            Self::Descending => "Descending",
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Per-screen UI state the projection is computed from.
///
/// Mutate it through the setters: changing the search text, sort key, order,
/// or any filter resets the current page to 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub search: String,
    /// Sort field name; `None` is the "Sort By" placeholder, meaning stable
    /// order straight from the server snapshot.
    pub sort_by: Option<String>,
    pub order: SortOrder,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
    /// Exact-match field filters, ANDed together and with the search.
    pub filters: BTreeMap<String, String>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(10)
    }
}

impl ViewState {
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            search: String::new(),
            sort_by: None,
            order: SortOrder::Ascending,
            page: 1,
            page_size: page_size.max(1),
            filters: BTreeMap::new(),
        }
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    pub fn set_sort(&mut self, sort_by: Option<String>) {
        self.sort_by = sort_by;
        self.page = 1;
    }

    pub fn set_order(&mut self, order: SortOrder) {
        self.order = order;
        self.page = 1;
    }

    pub fn set_filter(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.filters.insert(field.into(), value.into());
        self.page = 1;
    }

    pub fn clear_filter(&mut self, field: &str) {
        self.filters.remove(field);
        self.page = 1;
    }

    /// Clamp `page` into `1..=total_pages` (or 1 when there are no pages).
    pub fn clamp_page(&mut self, total_pages: usize) {
        self.page = self.page.clamp(1, total_pages.max(1));
    }
}

/// One page of the projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView<R> {
    pub records: Vec<R>,
    /// The page these records came from (as requested, 1-based).
    pub page: usize,
    /// `ceil(filtered / page_size)`.
    pub total_pages: usize,
    /// Matching records across all pages.
    pub total_filtered: usize,
}

/// Project a collection snapshot through the view state.
///
/// Deterministic: the same `(records, view)` always yields the same page and
/// `total_pages`. Sorting is stable, so an absent sort key leaves the server
/// order untouched, and records missing the sort field compare equal.
#[must_use]
pub fn derive_view<R: Record>(records: &[R], view: &ViewState) -> PageView<R> {
    let mut filtered: Vec<R> = records
        .iter()
        .filter(|r| r.matches_search(&view.search) && matches_filters(*r, &view.filters))
        .cloned()
        .collect();

    if let Some(key) = view.sort_by.as_deref() {
        filtered.sort_by(|a, b| {
            let ord = match (a.field(key), b.field(key)) {
                (Some(fa), Some(fb)) => fa.compare(&fb),
                _ => Ordering::Equal,
            };
            match view.order {
                SortOrder::Ascending => ord,
                SortOrder::Descending => ord.reverse(),
            }
        });
    }

    let total_filtered = filtered.len();
    let total_pages = total_filtered.div_ceil(view.page_size);

    let start = (view.page - 1).saturating_mul(view.page_size);
    let records = if start >= filtered.len() {
        Vec::new()
    } else {
        let end = (start + view.page_size).min(filtered.len());
        filtered[start..end].to_vec()
    };

    PageView {
        records,
        page: view.page,
        total_pages,
        total_filtered,
    }
}

fn matches_filters<R: Record>(record: &R, filters: &BTreeMap<String, String>) -> bool {
    filters.iter().all(|(field, want)| {
        record
            .field(field)
            .is_some_and(|have| have.to_string() == *want)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{College, Gender, Student, YearLevel};
    use proptest::prelude::*;

    fn college(id: i64, code: &str) -> College {
        College {
            id,
            college_code: code.into(),
            college_name: format!("College {code}"),
            num_programs: 0,
            num_students: 0,
        }
    }

    fn student(id: &str, first: &str, year: YearLevel, gender: Gender) -> Student {
        Student {
            id_number: id.into(),
            last_name: "Santos".into(),
            first_name: first.into(),
            gender,
            year_level: year,
            college_id: 1,
            program_id: 1,
            program: Some("BSCS".into()),
            photo_url: None,
        }
    }

    #[test]
    fn page_size_one_splits_two_records() {
        let records = vec![college(1, "A"), college(2, "B")];
        let mut view = ViewState::new(1);

        let page1 = derive_view(&records, &view);
        assert_eq!(page1.total_pages, 2);
        assert_eq!(page1.records.len(), 1);
        assert_eq!(page1.records[0].college_code, "A");

        view.page = 2;
        let page2 = derive_view(&records, &view);
        assert_eq!(page2.records[0].college_code, "B");
    }

    #[test]
    fn no_sort_key_preserves_server_order() {
        let records = vec![college(2, "B"), college(1, "A")];
        let view = ViewState::new(10);
        let page = derive_view(&records, &view);
        assert_eq!(page.records[0].college_code, "B");
    }

    #[test]
    fn sort_descending_reverses() {
        let records = vec![college(1, "A"), college(2, "B")];
        let mut view = ViewState::new(10);
        view.set_sort(Some("college_code".into()));
        view.set_order(SortOrder::Descending);
        let page = derive_view(&records, &view);
        assert_eq!(page.records[0].college_code, "B");
    }

    #[test]
    fn missing_sort_field_compares_equal() {
        let records = vec![
            student("2025-0002", "Ben", YearLevel::First, Gender::Male),
            student("2025-0001", "Ana", YearLevel::First, Gender::Female),
        ];
        let mut view = ViewState::new(10);
        view.set_sort(Some("no_such_field".into()));
        let page = derive_view(&records, &view);
        // Stable sort with all-equal keys: original order kept.
        assert_eq!(page.records[0].first_name, "Ben");
    }

    #[test]
    fn setters_reset_page() {
        let mut view = ViewState::new(5);
        view.page = 3;
        view.set_search("x");
        assert_eq!(view.page, 1);

        view.page = 3;
        view.set_sort(Some("id".into()));
        assert_eq!(view.page, 1);

        view.page = 3;
        view.set_order(SortOrder::Descending);
        assert_eq!(view.page, 1);

        view.page = 3;
        view.set_filter("gender", "Male");
        assert_eq!(view.page, 1);

        view.page = 3;
        view.clear_filter("gender");
        assert_eq!(view.page, 1);
    }

    #[test]
    fn filters_are_exact_and_anded_with_search() {
        let records = vec![
            student("2025-0001", "Ana", YearLevel::Second, Gender::Female),
            student("2025-0002", "Anabel", YearLevel::Second, Gender::Male),
            student("2025-0003", "Ana", YearLevel::Third, Gender::Female),
        ];
        let mut view = ViewState::new(10);
        view.set_search("ana");
        view.set_filter("gender", "Female");
        view.set_filter("year_level", "2");
        let page = derive_view(&records, &view);
        assert_eq!(page.total_filtered, 1);
        assert_eq!(page.records[0].id_number, "2025-0001");
    }

    #[test]
    fn search_year_synonym_filters_students() {
        let records = vec![
            student("2025-0001", "Ana", YearLevel::Second, Gender::Female),
            student("2025-0002", "Ben", YearLevel::First, Gender::Male),
        ];
        let mut view = ViewState::new(10);
        view.set_search("2nd year");
        let page = derive_view(&records, &view);
        assert_eq!(page.total_filtered, 1);
        assert_eq!(page.records[0].id_number, "2025-0001");
    }

    #[test]
    fn empty_collection_has_zero_pages() {
        let records: Vec<College> = Vec::new();
        let page = derive_view(&records, &ViewState::new(10));
        assert_eq!(page.total_pages, 0);
        assert!(page.records.is_empty());
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let records = vec![college(1, "A")];
        let mut view = ViewState::new(10);
        view.page = 4;
        let page = derive_view(&records, &view);
        assert!(page.records.is_empty());
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn clamp_page_bounds() {
        let mut view = ViewState::new(10);
        view.page = 9;
        view.clamp_page(3);
        assert_eq!(view.page, 3);
        view.clamp_page(0);
        assert_eq!(view.page, 1);
    }

    proptest! {
        #[test]
        fn pagination_invariants(ids in proptest::collection::vec(0i64..500, 0..60),
                                 page in 1usize..10,
                                 page_size in 1usize..12) {
            let records: Vec<College> =
                ids.iter().map(|&id| college(id, &format!("C{id}"))).collect();
            let mut view = ViewState::new(page_size);
            view.page = page;

            let out = derive_view(&records, &view);
            prop_assert_eq!(out.total_pages, out.total_filtered.div_ceil(page_size));
            prop_assert!(out.records.len() <= page_size);

            // Last page holds the remainder.
            if out.total_pages > 0 && page == out.total_pages {
                let expect = out.total_filtered - (out.total_pages - 1) * page_size;
                prop_assert_eq!(out.records.len(), expect);
            }

            // Deterministic: same inputs, same projection.
            let again = derive_view(&records, &view);
            prop_assert_eq!(out, again);
        }
    }
}

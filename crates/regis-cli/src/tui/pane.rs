//! One entity tab: a collection snapshot plus the view state that projects
//! it into the visible table page.

use ratatui::widgets::TableState;

use regis_core::model::Record;
use regis_core::view::{PageView, ViewState, derive_view};

/// Where the pane is in its fetch lifecycle (mirrors the controller's).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaneState {
    #[default]
    Idle,
    Loading,
    Ready,
}

pub struct ListPane<R: Record> {
    records: Vec<R>,
    pub view: ViewState,
    pub table: TableState,
    pub state: PaneState,
    /// Sort keys the `s` key cycles through, `None` first ("Sort By").
    sort_keys: &'static [&'static str],
    sort_idx: Option<usize>,
}

impl<R: Record> ListPane<R> {
    pub fn new(sort_keys: &'static [&'static str]) -> Self {
        Self {
            records: Vec::new(),
            view: ViewState::new(10),
            table: TableState::default(),
            state: PaneState::default(),
            sort_keys,
            sort_idx: None,
        }
    }

    /// Replace the snapshot after a fetch, keeping the selection in range.
    pub fn set_records(&mut self, records: Vec<R>) {
        self.records = records;
        self.state = PaneState::Ready;
        self.view.clamp_page(self.page().total_pages);
        self.clamp_selection();
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// The visible page under the current view state.
    pub fn page(&self) -> PageView<R> {
        derive_view(&self.records, &self.view)
    }

    /// The record the cursor is on, if any.
    pub fn selected(&self) -> Option<R> {
        let page = self.page();
        let idx = self.table.selected()?;
        page.records.get(idx).cloned()
    }

    pub fn select_next(&mut self) {
        let len = self.page().records.len();
        if len == 0 {
            self.table.select(None);
            return;
        }
        let next = self.table.selected().map_or(0, |i| (i + 1).min(len - 1));
        self.table.select(Some(next));
    }

    pub fn select_prev(&mut self) {
        if self.page().records.is_empty() {
            self.table.select(None);
            return;
        }
        let prev = self.table.selected().map_or(0, |i| i.saturating_sub(1));
        self.table.select(Some(prev));
    }

    pub fn next_page(&mut self) {
        let total = self.page().total_pages;
        if self.view.page < total {
            self.view.page += 1;
            self.clamp_selection();
        }
    }

    pub fn prev_page(&mut self) {
        if self.view.page > 1 {
            self.view.page -= 1;
            self.clamp_selection();
        }
    }

    /// Cycle the sort key: placeholder → key 1 → key 2 → … → placeholder.
    pub fn cycle_sort(&mut self) {
        self.sort_idx = match self.sort_idx {
            None => {
                if self.sort_keys.is_empty() {
                    None
                } else {
                    Some(0)
                }
            }
            Some(i) if i + 1 < self.sort_keys.len() => Some(i + 1),
            Some(_) => None,
        };
        self.view
            .set_sort(self.sort_idx.map(|i| self.sort_keys[i].to_string()));
        self.clamp_selection();
    }

    pub fn toggle_order(&mut self) {
        self.view.set_order(self.view.order.toggled());
        self.clamp_selection();
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.view.set_search(query);
        self.clamp_selection();
    }

    /// Set (`Some`) or clear (`None`) one exact-match field filter.
    pub fn set_filter(&mut self, field: &str, value: Option<String>) {
        match value {
            Some(value) => self.view.set_filter(field.to_string(), value),
            None => self.view.clear_filter(field),
        }
        self.clamp_selection();
    }

    /// Human label for the current sort state, shown in the footer.
    pub fn sort_label(&self) -> String {
        match self.view.sort_by.as_deref() {
            None => "Sort By".to_string(),
            Some(key) => format!("{key} ({})", self.view.order.label()),
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.page().records.len();
        match self.table.selected() {
            _ if len == 0 => self.table.select(None),
            None => self.table.select(Some(0)),
            Some(i) if i >= len => self.table.select(Some(len - 1)),
            Some(_) => {}
        }
    }
}

/// Footer summary: `page 2/5 | 43 record(s) | last_name (Ascending)`.
pub fn footer_line<R: Record>(pane: &ListPane<R>) -> String {
    let page = pane.page();
    format!(
        "page {}/{} | {} record(s) | {}",
        page.page,
        page.total_pages.max(1),
        page.total_filtered,
        pane.sort_label()
    )
}

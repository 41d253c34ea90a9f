//! Per-entity list controller.
//!
//! Owns the raw collection snapshot plus the user's view parameters and
//! derives the visible page on demand. Writes never mutate the snapshot
//! locally: every successful create/update/delete is followed by a full
//! refetch so the table always reflects what the server accepted.

use serde_json::Value;

use regis_core::model::Record;
use regis_core::view::{PageView, ViewState, derive_view};

use crate::api::{ApiError, EntityGateway};

/// Where the controller is in its fetch lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Nothing fetched yet (or fetch skipped for want of a token).
    #[default]
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The snapshot reflects the last completed fetch.
    Ready,
}

/// What a fetch did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Snapshot replaced with fresh records.
    Loaded(usize),
    /// No token attached; no request was made.
    NotAuthenticated,
    /// The backend said 401; the caller must force a logout.
    SessionExpired,
    /// Non-auth failure: the snapshot is now empty, details went to the log.
    Failed,
}

/// What a guarded delete did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Record removed server-side and the snapshot refetched.
    Deleted(String),
    /// The confirmation was declined; no request was issued.
    Cancelled,
    /// The backend said 401 during delete or refetch.
    SessionExpired,
    /// The server rejected the delete; message for the user.
    Rejected(String),
}

/// Token-gated list controller over one entity collection.
pub struct ListController<G: EntityGateway> {
    gateway: G,
    records: Vec<G::Record>,
    state: LoadState,
    pub view: ViewState,
}

impl<G: EntityGateway> ListController<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            records: Vec::new(),
            state: LoadState::Idle,
            view: ViewState::default(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> LoadState {
        self.state
    }

    /// The raw (unfiltered) snapshot.
    #[must_use]
    pub fn records(&self) -> &[G::Record] {
        &self.records
    }

    /// The currently visible page, derived from the snapshot and view state.
    #[must_use]
    pub fn page(&self) -> PageView<G::Record> {
        derive_view(&self.records, &self.view)
    }

    /// Replace the snapshot from the server.
    ///
    /// Without a token this is a no-op: the snapshot stays empty and we
    /// never hit the network. On a non-auth failure the snapshot is cleared
    /// and the failure is logged rather than surfaced, so a flaky backend
    /// reads as an empty table instead of an error storm.
    pub fn fetch(&mut self) -> FetchOutcome {
        if !self.gateway.has_token() {
            tracing::debug!(
                resource = G::Record::RESOURCE,
                "skipping fetch: no auth token"
            );
            self.state = LoadState::Idle;
            return FetchOutcome::NotAuthenticated;
        }

        self.state = LoadState::Loading;
        match self.gateway.fetch_all() {
            Ok(records) => {
                let count = records.len();
                self.records = records;
                self.state = LoadState::Ready;
                self.view.clamp_page(self.page().total_pages);
                FetchOutcome::Loaded(count)
            }
            Err(ApiError::Unauthorized) => {
                self.state = LoadState::Idle;
                FetchOutcome::SessionExpired
            }
            Err(e) => {
                tracing::error!(
                    resource = G::Record::RESOURCE,
                    error = %e,
                    "fetch failed, showing empty collection"
                );
                self.records.clear();
                self.state = LoadState::Ready;
                FetchOutcome::Failed
            }
        }
    }

    /// Create a record, then refetch. Returns the server's message.
    pub fn create(&mut self, payload: &Value) -> Result<String, ApiError> {
        let message = self.gateway.create(payload)?;
        self.fetch();
        Ok(message)
    }

    /// Update a record, then refetch. Returns the server's message.
    pub fn update(&mut self, key: &str, payload: &Value) -> Result<String, ApiError> {
        let message = self.gateway.update(key, payload)?;
        self.fetch();
        Ok(message)
    }

    /// Delete behind a confirmation gate. `confirm` runs before any request
    /// leaves the process; declining means nothing was sent.
    pub fn delete(&mut self, key: &str, confirm: impl FnOnce() -> bool) -> DeleteOutcome {
        if !confirm() {
            return DeleteOutcome::Cancelled;
        }
        match self.gateway.delete(key) {
            Ok(message) => {
                if self.fetch() == FetchOutcome::SessionExpired {
                    return DeleteOutcome::SessionExpired;
                }
                DeleteOutcome::Deleted(message)
            }
            Err(ApiError::Unauthorized) => DeleteOutcome::SessionExpired,
            Err(e) => DeleteOutcome::Rejected(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use regis_core::model::College;

    /// In-memory gateway: a college table plus a call log.
    struct FakeGateway {
        token: bool,
        colleges: RefCell<Vec<College>>,
        calls: RefCell<Vec<String>>,
        fail_with: Option<ApiError>,
    }

    impl FakeGateway {
        fn new(token: bool, colleges: Vec<College>) -> Self {
            Self {
                token,
                colleges: RefCell::new(colleges),
                calls: RefCell::new(Vec::new()),
                fail_with: None,
            }
        }

        fn failing(error: ApiError) -> Self {
            Self {
                token: true,
                colleges: RefCell::new(Vec::new()),
                calls: RefCell::new(Vec::new()),
                fail_with: Some(error),
            }
        }
    }

    impl EntityGateway for &FakeGateway {
        type Record = College;

        fn has_token(&self) -> bool {
            self.token
        }

        fn fetch_all(&self) -> Result<Vec<College>, ApiError> {
            self.calls.borrow_mut().push("fetch".to_string());
            match &self.fail_with {
                Some(e) => Err(e.clone()),
                None => Ok(self.colleges.borrow().clone()),
            }
        }

        fn create(&self, payload: &Value) -> Result<String, ApiError> {
            self.calls.borrow_mut().push("create".to_string());
            if let Some(e) = &self.fail_with {
                return Err(e.clone());
            }
            let college: College =
                serde_json::from_value(payload.clone()).map_err(|e| ApiError::Decode(e.to_string()))?;
            self.colleges.borrow_mut().push(college);
            Ok("College added successfully".to_string())
        }

        fn update(&self, key: &str, payload: &Value) -> Result<String, ApiError> {
            self.calls.borrow_mut().push(format!("update {key}"));
            if let Some(e) = &self.fail_with {
                return Err(e.clone());
            }
            let updated: College =
                serde_json::from_value(payload.clone()).map_err(|e| ApiError::Decode(e.to_string()))?;
            let mut colleges = self.colleges.borrow_mut();
            let slot = colleges
                .iter_mut()
                .find(|c| c.id.to_string() == key)
                .ok_or_else(|| ApiError::Rejected {
                    status: 404,
                    message: "College not found".to_string(),
                })?;
            *slot = updated;
            Ok("College updated successfully".to_string())
        }

        fn delete(&self, key: &str) -> Result<String, ApiError> {
            self.calls.borrow_mut().push(format!("delete {key}"));
            if let Some(e) = &self.fail_with {
                return Err(e.clone());
            }
            self.colleges
                .borrow_mut()
                .retain(|c| c.id.to_string() != key);
            Ok("College deleted successfully".to_string())
        }
    }

    fn college(id: i64, code: &str, name: &str) -> College {
        serde_json::from_value(serde_json::json!({
            "id": id, "college_code": code, "college_name": name
        }))
        .expect("college")
    }

    #[test]
    fn fetch_without_token_issues_no_request() {
        let gateway = FakeGateway::new(false, vec![college(1, "CCS", "Computer Studies")]);
        let mut controller = ListController::new(&gateway);

        assert_eq!(controller.fetch(), FetchOutcome::NotAuthenticated);
        assert!(controller.records().is_empty());
        assert!(gateway.calls.borrow().is_empty());
        assert_eq!(controller.state(), LoadState::Idle);
    }

    #[test]
    fn fetch_replaces_the_snapshot() {
        let gateway = FakeGateway::new(
            true,
            vec![
                college(1, "CCS", "Computer Studies"),
                college(2, "CED", "Education"),
            ],
        );
        let mut controller = ListController::new(&gateway);

        assert_eq!(controller.fetch(), FetchOutcome::Loaded(2));
        assert_eq!(controller.state(), LoadState::Ready);
        assert_eq!(controller.page().total_filtered, 2);
    }

    #[test]
    fn fetch_failure_yields_silent_empty_collection() {
        let gateway = FakeGateway::failing(ApiError::Transport("connection refused".to_string()));
        let mut controller = ListController::new(&gateway);

        assert_eq!(controller.fetch(), FetchOutcome::Failed);
        assert!(controller.records().is_empty());
        assert_eq!(controller.state(), LoadState::Ready);
    }

    #[test]
    fn fetch_maps_401_to_session_expired() {
        let gateway = FakeGateway::failing(ApiError::Unauthorized);
        let mut controller = ListController::new(&gateway);

        assert_eq!(controller.fetch(), FetchOutcome::SessionExpired);
    }

    #[test]
    fn create_refetches_instead_of_patching_locally() {
        let gateway = FakeGateway::new(true, vec![college(1, "CCS", "Computer Studies")]);
        let mut controller = ListController::new(&gateway);
        controller.fetch();

        let payload = serde_json::json!({
            "id": 2, "college_code": "CON", "college_name": "Nursing"
        });
        let message = controller.create(&payload).expect("create");
        assert_eq!(message, "College added successfully");
        assert_eq!(controller.records().len(), 2);
        assert_eq!(
            *gateway.calls.borrow(),
            vec!["fetch", "create", "fetch"],
            "create must be followed by a refetch"
        );
    }

    #[test]
    fn cancelled_delete_sends_nothing() {
        let gateway = FakeGateway::new(true, vec![college(1, "CCS", "Computer Studies")]);
        let mut controller = ListController::new(&gateway);
        controller.fetch();

        let outcome = controller.delete("1", || false);
        assert_eq!(outcome, DeleteOutcome::Cancelled);
        assert_eq!(controller.records().len(), 1);
        assert_eq!(*gateway.calls.borrow(), vec!["fetch"]);
    }

    #[test]
    fn confirmed_delete_removes_and_refetches() {
        let gateway = FakeGateway::new(
            true,
            vec![
                college(1, "CCS", "Computer Studies"),
                college(2, "CED", "Education"),
            ],
        );
        let mut controller = ListController::new(&gateway);
        controller.fetch();

        let outcome = controller.delete("1", || true);
        assert_eq!(
            outcome,
            DeleteOutcome::Deleted("College deleted successfully".to_string())
        );
        assert_eq!(controller.records().len(), 1);
        assert_eq!(*gateway.calls.borrow(), vec!["fetch", "delete 1", "fetch"]);
    }

    #[test]
    fn rejected_delete_surfaces_the_server_message() {
        let gateway = FakeGateway::failing(ApiError::Rejected {
            status: 400,
            message: "College has enrolled students".to_string(),
        });
        let mut controller = ListController::new(&gateway);

        let outcome = controller.delete("1", || true);
        assert_eq!(
            outcome,
            DeleteOutcome::Rejected("College has enrolled students".to_string())
        );
    }

    #[test]
    fn refetch_clamps_the_page_after_shrink() {
        let gateway = FakeGateway::new(
            true,
            vec![
                college(1, "CCS", "Computer Studies"),
                college(2, "CED", "Education"),
            ],
        );
        let mut controller = ListController::new(&gateway);
        controller.view.page_size = 1;
        controller.fetch();
        controller.view.page = 2;

        controller.delete("2", || true);
        assert_eq!(controller.view.page, 1);
        assert_eq!(controller.page().records.len(), 1);
    }
}

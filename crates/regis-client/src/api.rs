//! Authenticated REST client for the SIS backend.
//!
//! All protected endpoints take `Authorization: Bearer <token>`; a 401 from
//! any of them is the sole session-expiry signal and maps to
//! [`ApiError::Unauthorized`] so callers can force a logout. Other non-2xx
//! responses surface the server's `{"error"}`/`{"message"}` body verbatim.

use std::marker::PhantomData;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use regis_core::model::Record;

/// Everything that can go wrong talking to the backend.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// HTTP 401 — the session is over; callers must log out.
    #[error("session expired or not authenticated")]
    Unauthorized,
    /// Any other non-2xx, carrying the server-provided message.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    /// DNS/TCP/TLS level failure; no response was received.
    #[error("request failed: {0}")]
    Transport(String),
    /// 2xx with a body we could not decode.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// Successful login payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub message: String,
    pub access_token: String,
}

/// Blocking HTTP client bound to one backend origin and (optionally) one
/// bearer token.
pub struct ApiClient {
    agent: ureq::Agent,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            agent: ureq::Agent::new(),
            base_url,
            token,
        }
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /api/auth/login` — the one unauthenticated call.
    pub fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = serde_json::json!({ "username": username, "password": password });
        let value = self.send("POST", "/api/auth/login", Some(&body))?;
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// `POST /api/auth/logout` — server-side session teardown.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.send("POST", "/api/auth/logout", None).map(|_| ())
    }

    /// Fetch a full entity collection; the payload may be a bare array or an
    /// object wrapping the array under the entity's collection field.
    pub fn fetch_collection<R>(&self) -> Result<Vec<R>, ApiError>
    where
        R: Record + DeserializeOwned,
    {
        let value = self.send("GET", &format!("/api/dashboard/{}", R::RESOURCE), None)?;
        parse_collection(value, R::COLLECTION_FIELD)
    }

    /// Create a record; returns the server's success message.
    pub fn create_record<R: Record>(&self, payload: &Value) -> Result<String, ApiError> {
        let value = self.send(
            "POST",
            &format!("/api/dashboard/{}", R::RESOURCE),
            Some(payload),
        )?;
        Ok(success_message(&value))
    }

    /// Update a record by key; returns the server's success message.
    pub fn update_record<R: Record>(&self, key: &str, payload: &Value) -> Result<String, ApiError> {
        let value = self.send(
            "PUT",
            &format!("/api/dashboard/{}/{key}", R::RESOURCE),
            Some(payload),
        )?;
        Ok(success_message(&value))
    }

    /// Delete a record by key; returns the server's success message.
    pub fn delete_record<R: Record>(&self, key: &str) -> Result<String, ApiError> {
        let value = self.send(
            "DELETE",
            &format!("/api/dashboard/{}/{key}", R::RESOURCE),
            None,
        )?;
        Ok(success_message(&value))
    }

    /// Distinct year levels present in the student table (filter menu).
    pub fn student_year_levels(&self) -> Result<Vec<u8>, ApiError> {
        let value = self.send("GET", "/api/dashboard/students/year-levels", None)?;
        parse_collection(value, "year_levels")
    }

    /// Distinct genders present in the student table (filter menu).
    pub fn student_genders(&self) -> Result<Vec<String>, ApiError> {
        let value = self.send("GET", "/api/dashboard/students/genders", None)?;
        parse_collection(value, "genders")
    }

    fn send(&self, method: &str, path: &str, body: Option<&Value>) -> Result<Value, ApiError> {
        let url = format!("{}{path}", self.base_url);
        let mut request = self.agent.request(method, &url).set("Accept", "application/json");
        if let Some(token) = &self.token {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }

        let result = match body {
            Some(json) => request.send_json(json),
            None => request.call(),
        };

        match result {
            Ok(response) => {
                // Some write endpoints answer with an empty body.
                let text = response
                    .into_string()
                    .map_err(|e| ApiError::Decode(e.to_string()))?;
                if text.trim().is_empty() {
                    return Ok(Value::Null);
                }
                serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
            }
            Err(ureq::Error::Status(401, _)) => Err(ApiError::Unauthorized),
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                Err(ApiError::Rejected {
                    status,
                    message: rejection_message(status, &body),
                })
            }
            Err(ureq::Error::Transport(t)) => Err(ApiError::Transport(t.to_string())),
        }
    }
}

/// Decode a collection payload that is either `[…]` or `{"<field>": […]}`.
pub fn parse_collection<T: DeserializeOwned>(
    value: Value,
    field: &str,
) -> Result<Vec<T>, ApiError> {
    let array = match value {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut map) => map
            .remove(field)
            .ok_or_else(|| ApiError::Decode(format!("payload has no '{field}' array")))?,
        other => {
            return Err(ApiError::Decode(format!(
                "expected an array or object payload, got {other}"
            )));
        }
    };
    serde_json::from_value(array).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Pull the human-facing message out of an error body, falling back to the
/// raw text and then to the bare status.
fn rejection_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["error", "message"] {
            if let Some(msg) = value.get(key).and_then(Value::as_str) {
                return msg.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("request failed with status {status}")
    } else {
        trimmed.to_string()
    }
}

fn success_message(value: &Value) -> String {
    value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("OK")
        .to_string()
}

/// The seam between list controllers / forms and the network.
///
/// [`RestGateway`] is the production implementation; tests drive the
/// controller with an in-memory fake.
pub trait EntityGateway {
    type Record: Record;

    /// Whether an auth token is attached — fetch is a no-op without one.
    fn has_token(&self) -> bool;
    fn fetch_all(&self) -> Result<Vec<Self::Record>, ApiError>;
    fn create(&self, payload: &Value) -> Result<String, ApiError>;
    fn update(&self, key: &str, payload: &Value) -> Result<String, ApiError>;
    fn delete(&self, key: &str) -> Result<String, ApiError>;
}

/// [`EntityGateway`] over the live REST backend.
pub struct RestGateway<'a, R> {
    client: &'a ApiClient,
    _record: PhantomData<R>,
}

impl<'a, R> RestGateway<'a, R> {
    #[must_use]
    pub const fn new(client: &'a ApiClient) -> Self {
        Self {
            client,
            _record: PhantomData,
        }
    }
}

impl<R> EntityGateway for RestGateway<'_, R>
where
    R: Record + DeserializeOwned,
{
    type Record = R;

    fn has_token(&self) -> bool {
        self.client.has_token()
    }

    fn fetch_all(&self) -> Result<Vec<R>, ApiError> {
        self.client.fetch_collection::<R>()
    }

    fn create(&self, payload: &Value) -> Result<String, ApiError> {
        self.client.create_record::<R>(payload)
    }

    fn update(&self, key: &str, payload: &Value) -> Result<String, ApiError> {
        self.client.update_record::<R>(key, payload)
    }

    fn delete(&self, key: &str) -> Result<String, ApiError> {
        self.client.delete_record::<R>(key)
    }
}

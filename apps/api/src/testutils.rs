//! In-memory stand-ins for the upstream services and the stores.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::auth::{AuthError, SessionStore, UserStore};
use crate::catalog::{CatalogError, CatalogRepo, CatalogStore};
use crate::models::catalog::{CarListing, SeedMake};
use crate::models::review::{ReviewDocument, Sentiment, SentimentResult};
use crate::models::user::{NewUser, UserRow};
use crate::state::AppState;
use crate::upstream::{ReviewBackend, UpstreamError};

enum SubmitBehavior {
    Respond(Value),
    TransportError(String),
}

/// Scripted upstream. Unscripted fetches behave like an unreachable service
/// (`None`), unscripted sentiment texts come back neutral.
#[derive(Default)]
pub struct MockBackend {
    fetches: HashMap<String, Value>,
    sentiments: HashMap<String, Sentiment>,
    submit: Option<SubmitBehavior>,
    calls: Mutex<Vec<String>>,
    sentiment_calls: Mutex<Vec<String>>,
    submitted: Mutex<Vec<ReviewDocument>>,
}

impl MockBackend {
    pub fn with_fetch(mut self, endpoint: &str, response: Value) -> Self {
        self.fetches.insert(endpoint.to_string(), response);
        self
    }

    pub fn with_sentiment(mut self, text: &str, sentiment: Sentiment) -> Self {
        self.sentiments.insert(text.to_string(), sentiment);
        self
    }

    pub fn with_submit(mut self, response: Value) -> Self {
        self.submit = Some(SubmitBehavior::Respond(response));
        self
    }

    pub fn with_submit_transport_error(mut self, message: &str) -> Self {
        self.submit = Some(SubmitBehavior::TransportError(message.to_string()));
        self
    }

    /// Fetch and submit calls in order, e.g. `fetch /fetchDealers`, `submit 5`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sentiment_calls(&self) -> Vec<String> {
        self.sentiment_calls.lock().unwrap().clone()
    }

    pub fn submitted(&self) -> Vec<ReviewDocument> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReviewBackend for MockBackend {
    async fn fetch(&self, endpoint: &str, _params: &[(&str, &str)]) -> Option<Value> {
        self.calls.lock().unwrap().push(format!("fetch {endpoint}"));
        self.fetches.get(endpoint).cloned()
    }

    async fn analyze_sentiment(&self, text: &str) -> SentimentResult {
        self.sentiment_calls.lock().unwrap().push(text.to_string());
        SentimentResult {
            sentiment: self.sentiments.get(text).copied().unwrap_or_default(),
        }
    }

    async fn submit_review(&self, document: &ReviewDocument) -> Result<Value, UpstreamError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("submit {}", document.dealership));
        self.submitted.lock().unwrap().push(document.clone());

        match &self.submit {
            Some(SubmitBehavior::Respond(value)) => Ok(value.clone()),
            Some(SubmitBehavior::TransportError(message)) => {
                Err(UpstreamError::InvalidUrl(message.clone()))
            }
            None => Ok(crate::upstream::error_envelope(
                crate::upstream::ALL_BACKENDS_FAILED,
            )),
        }
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, username: &str) -> Result<String, AuthError> {
        let token = Uuid::new_v4().to_string();
        self.sessions
            .lock()
            .unwrap()
            .insert(token.clone(), username.to_string());
        Ok(token)
    }

    async fn lookup(&self, token: &str) -> Result<Option<String>, AuthError> {
        Ok(self.sessions.lock().unwrap().get(token).cloned())
    }

    async fn destroy(&self, token: &str) -> Result<(), AuthError> {
        self.sessions.lock().unwrap().remove(token);
        Ok(())
    }

    fn ttl_secs(&self) -> u64 {
        3600
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<String, UserRow>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRow>, AuthError> {
        Ok(self.users.lock().unwrap().get(username).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<bool, AuthError> {
        let mut users = self.users.lock().unwrap();
        if users.contains_key(&user.username) {
            return Ok(false);
        }
        let id = users.len() as i64 + 1;
        users.insert(
            user.username.clone(),
            UserRow {
                id,
                username: user.username,
                password_hash: user.password_hash,
                first_name: user.first_name,
                last_name: user.last_name,
                email: user.email,
                created_at: Utc::now(),
            },
        );
        Ok(true)
    }
}

/// Catalog repo without uniqueness constraints: seeding twice duplicates
/// rows, so tests can tell whether the store guards the seed.
#[derive(Default)]
pub struct MemoryCatalogRepo {
    rows: Mutex<Vec<CarListing>>,
    seed_calls: AtomicUsize,
    seed_failures_left: AtomicUsize,
}

impl MemoryCatalogRepo {
    pub fn with_rows(rows: Vec<CarListing>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Default::default()
        }
    }

    /// The first `n` seed attempts fail.
    pub fn failing_seeds(n: usize) -> Self {
        Self {
            seed_failures_left: AtomicUsize::new(n),
            ..Default::default()
        }
    }

    pub fn seed_calls(&self) -> usize {
        self.seed_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogRepo for MemoryCatalogRepo {
    async fn has_models(&self) -> Result<bool, CatalogError> {
        Ok(!self.rows.lock().unwrap().is_empty())
    }

    async fn seed(&self, makes: &[SeedMake]) -> Result<(), CatalogError> {
        self.seed_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        let failed = self
            .seed_failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(CatalogError::Seed("seed data unavailable".to_string()));
        }

        let mut rows = self.rows.lock().unwrap();
        for make in makes {
            for model in make.models {
                rows.push(CarListing {
                    model: model.name.to_string(),
                    make: make.name.to_string(),
                });
            }
        }
        Ok(())
    }

    async fn list_cars(&self) -> Result<Vec<CarListing>, CatalogError> {
        Ok(self.rows.lock().unwrap().clone())
    }
}

pub fn test_state(backend: impl Into<Arc<MockBackend>>) -> AppState {
    let backend: Arc<MockBackend> = backend.into();
    AppState {
        backend,
        catalog: Arc::new(CatalogStore::new(Arc::new(MemoryCatalogRepo::default()))),
        sessions: Arc::new(MemorySessionStore::default()),
        users: Arc::new(MemoryUserStore::default()),
    }
}

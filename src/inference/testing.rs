//! Scripted collaborator for tests.

use super::{InferenceClient, ListQuery, RecordQuery};
use crate::error::{Result, TunegrabError};
use async_trait::async_trait;
use std::sync::Mutex;

/// Replies with canned payloads and records every request.
#[derive(Default)]
pub struct FakeInference {
    list_reply: Option<String>,
    record_reply: Option<String>,
    pub list_calls: Mutex<Vec<ListQuery>>,
    pub record_calls: Mutex<Vec<RecordQuery>>,
}

impl FakeInference {
    /// A collaborator whose calls all fail.
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn with_list(payload: &str) -> Self {
        Self {
            list_reply: Some(payload.to_string()),
            ..Self::default()
        }
    }

    pub fn with_record(payload: &str) -> Self {
        Self {
            record_reply: Some(payload.to_string()),
            ..Self::default()
        }
    }

    pub fn list_call_count(&self) -> usize {
        self.list_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl InferenceClient for FakeInference {
    async fn list_query(&self, query: &ListQuery) -> Result<String> {
        self.list_calls.lock().unwrap().push(query.clone());
        self.list_reply
            .clone()
            .ok_or_else(|| TunegrabError::Inference("quota exceeded".to_string()))
    }

    async fn record_query(&self, query: &RecordQuery) -> Result<String> {
        self.record_calls.lock().unwrap().push(query.clone());
        self.record_reply
            .clone()
            .ok_or_else(|| TunegrabError::Inference("connection reset".to_string()))
    }
}

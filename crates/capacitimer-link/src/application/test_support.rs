//! Recording test doubles shared by the unit tests of this crate.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use capacitimer_core::variables::{VariableDefinition, VariableValues};
use capacitimer_core::DiscoveredInstance;
use serde_json::Value;

use super::host::{ActionDefinition, FeedbackDefinition, HostSurface, InstanceStatus};
use super::send_command::{HttpTransport, TransportError};

/// A [`HostSurface`] that records every call.
#[derive(Default)]
pub struct RecordingHost {
    pub statuses: Mutex<Vec<(InstanceStatus, Option<String>)>>,
    pub variables: Mutex<Vec<VariableValues>>,
    pub feedback_checks: Mutex<usize>,
    pub action_definitions: Mutex<Vec<ActionDefinition>>,
    pub feedback_definitions: Mutex<Vec<FeedbackDefinition>>,
    pub variable_definitions: Mutex<Vec<VariableDefinition>>,
    pub config_refreshes: Mutex<Vec<Vec<DiscoveredInstance>>>,
}

impl RecordingHost {
    pub fn last_status(&self) -> Option<(InstanceStatus, Option<String>)> {
        self.statuses.lock().unwrap().last().cloned()
    }

    pub fn last_variables(&self) -> Option<VariableValues> {
        self.variables.lock().unwrap().last().cloned()
    }

    pub fn feedback_checks(&self) -> usize {
        *self.feedback_checks.lock().unwrap()
    }
}

impl HostSurface for RecordingHost {
    fn update_status(&self, status: InstanceStatus, message: Option<&str>) {
        self.statuses
            .lock()
            .unwrap()
            .push((status, message.map(str::to_string)));
    }

    fn set_variable_values(&self, values: &VariableValues) {
        self.variables.lock().unwrap().push(values.clone());
    }

    fn check_feedbacks(&self) {
        *self.feedback_checks.lock().unwrap() += 1;
    }

    fn set_action_definitions(&self, definitions: &[ActionDefinition]) {
        *self.action_definitions.lock().unwrap() = definitions.to_vec();
    }

    fn set_feedback_definitions(&self, definitions: &[FeedbackDefinition]) {
        *self.feedback_definitions.lock().unwrap() = definitions.to_vec();
    }

    fn set_variable_definitions(&self, definitions: &[VariableDefinition]) {
        *self.variable_definitions.lock().unwrap() = definitions.to_vec();
    }

    fn refresh_config_fields(&self, candidates: &[DiscoveredInstance]) {
        self.config_refreshes.lock().unwrap().push(candidates.to_vec());
    }
}

/// An [`HttpTransport`] that replays queued responses and records requests.
///
/// When the queue is empty every request fails with status 503.
#[derive(Default)]
pub struct ScriptedHttp {
    pub responses: Mutex<VecDeque<Result<Value, TransportError>>>,
    pub requests: Mutex<Vec<(String, String, Option<Value>)>>,
}

impl ScriptedHttp {
    pub fn with_responses(responses: Vec<Result<Value, TransportError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::default(),
        }
    }

    pub fn push(&self, response: Result<Value, TransportError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// `(method, url, body)` of every request, oldest first.
    pub fn requests(&self) -> Vec<(String, String, Option<Value>)> {
        self.requests.lock().unwrap().clone()
    }

    fn next(&self) -> Result<Value, TransportError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(TransportError::Status(503)))
    }
}

#[async_trait]
impl HttpTransport for ScriptedHttp {
    async fn get_json(&self, url: &str) -> Result<Value, TransportError> {
        self.requests
            .lock()
            .unwrap()
            .push(("GET".to_string(), url.to_string(), None));
        self.next()
    }

    async fn post_json(&self, url: &str, body: Option<&Value>) -> Result<Value, TransportError> {
        self.requests
            .lock()
            .unwrap()
            .push(("POST".to_string(), url.to_string(), body.cloned()));
        self.next()
    }
}

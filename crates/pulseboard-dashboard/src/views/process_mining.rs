//! Process-mining screen
//!
//! Discovery, simulation, conformance checking and insights run on the backend. The
//! view serializes the request parameters and keeps each response verbatim, with a
//! loading flag and error banner per operation.

use crate::error::Result;
use parking_lot::RwLock;
use pulseboard_client::{ClientResult, ProcessMiningSource};
use pulseboard_core::types::{ConformanceRequest, DiscoverRequest, ProcessSummary, SimulateRequest};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

/// Backend operation offered by the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProcessOperation {
    /// Process discovery
    Discover,
    /// What-if simulation
    Simulate,
    /// Conformance checking
    Conformance,
    /// Bottleneck insights
    Insights,
}

impl fmt::Display for ProcessOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Discover => "discover",
            Self::Simulate => "simulate",
            Self::Conformance => "conformance",
            Self::Insights => "insights",
        };
        f.write_str(name)
    }
}

/// Outcome of the latest request for one operation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationState {
    /// Request in flight
    pub loading: bool,
    /// Last successful response, verbatim
    pub result: Option<Value>,
    /// Error banner
    pub error: Option<String>,
}

/// State of the process-mining screen
pub struct ProcessMiningView {
    source: Arc<dyn ProcessMiningSource>,
    processes: RwLock<Vec<ProcessSummary>>,
    processes_error: RwLock<Option<String>>,
    operations: RwLock<BTreeMap<ProcessOperation, OperationState>>,
}

impl fmt::Debug for ProcessMiningView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessMiningView")
            .field("processes", &self.processes.read().len())
            .field("operations", &*self.operations.read())
            .finish_non_exhaustive()
    }
}

impl ProcessMiningView {
    /// Screen over a process-mining source
    #[must_use]
    pub fn new(source: Arc<dyn ProcessMiningSource>) -> Self {
        Self {
            source,
            processes: RwLock::new(Vec::new()),
            processes_error: RwLock::new(None),
            operations: RwLock::new(BTreeMap::new()),
        }
    }

    /// Fetch the process list, keeping the previous one on failure
    pub async fn load_processes(&self) -> bool {
        match self.source.processes().await {
            Ok(processes) => {
                *self.processes.write() = processes;
                *self.processes_error.write() = None;
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to load processes");
                *self.processes_error.write() = Some(format!("Failed to load processes: {e}"));
                false
            }
        }
    }

    /// Known processes
    #[must_use]
    pub fn processes(&self) -> Vec<ProcessSummary> {
        self.processes.read().clone()
    }

    /// Banner for the process list
    #[must_use]
    pub fn processes_error(&self) -> Option<String> {
        self.processes_error.read().clone()
    }

    /// State of one operation
    #[must_use]
    pub fn operation(&self, op: ProcessOperation) -> OperationState {
        self.operations.read().get(&op).cloned().unwrap_or_default()
    }

    /// Clear the banner of one operation
    pub fn dismiss_error(&self, op: ProcessOperation) {
        if let Some(state) = self.operations.write().get_mut(&op) {
            state.error = None;
        }
    }

    /// Run process discovery
    ///
    /// # Errors
    ///
    /// Returns the backend error, which is also set as the operation banner.
    pub async fn discover(&self, request: &DiscoverRequest) -> Result<Value> {
        self.run(ProcessOperation::Discover, self.source.discover(request))
            .await
    }

    /// Run a what-if simulation
    ///
    /// # Errors
    ///
    /// Returns the backend error, which is also set as the operation banner.
    pub async fn simulate(&self, request: &SimulateRequest) -> Result<Value> {
        self.run(ProcessOperation::Simulate, self.source.simulate(request))
            .await
    }

    /// Check a log against a model
    ///
    /// # Errors
    ///
    /// Returns the backend error, which is also set as the operation banner.
    pub async fn conformance(&self, request: &ConformanceRequest) -> Result<Value> {
        self.run(ProcessOperation::Conformance, self.source.conformance(request))
            .await
    }

    /// Fetch bottleneck insights for a process
    ///
    /// # Errors
    ///
    /// Returns the backend error, which is also set as the operation banner.
    pub async fn insights(&self, process_id: &str) -> Result<Value> {
        self.run(ProcessOperation::Insights, self.source.insights(process_id))
            .await
    }

    async fn run<F>(&self, op: ProcessOperation, request: F) -> Result<Value>
    where
        F: Future<Output = ClientResult<Value>>,
    {
        self.operations.write().entry(op).or_default().loading = true;
        let result = request.await;

        let mut operations = self.operations.write();
        let state = operations.entry(op).or_default();
        state.loading = false;

        match result {
            Ok(value) => {
                state.result = Some(value.clone());
                state.error = None;
                drop(operations);
                info!(operation = %op, "Process-mining request completed");
                Ok(value)
            }
            Err(e) => {
                state.error = Some(format!("{op} failed: {e}"));
                drop(operations);
                warn!(operation = %op, error = %e, "Process-mining request failed");
                Err(e.into())
            }
        }
    }
}

use std::sync::Mutex;

use async_trait::async_trait;

use super::{BlockSource, FetchInitialRequest, FetchNewRequest, RawContent, SourceError};

/// A block source that serves content held in process.
///
/// Useful for hosts that render blocks locally and for exercising a
/// controller without a server. Requests are recorded in arrival order.
#[derive(Debug, Default)]
pub struct MemoryBlockSource {
    initial: Vec<RawContent>,
    blank: RawContent,
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    offline: bool,
    new_offline: bool,
    extra_results: usize,
    missing_results: usize,
    initial_requests: Vec<FetchInitialRequest>,
    new_requests: Vec<FetchNewRequest>,
}

impl MemoryBlockSource {
    pub fn new(initial: Vec<RawContent>, blank: impl Into<RawContent>) -> Self {
        Self {
            initial,
            blank: blank.into(),
            state: Mutex::default(),
        }
    }

    /// Fail every subsequent request, as an unreachable endpoint would.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Fail add requests only; the initial fetch still succeeds.
    pub fn set_new_offline(&self, offline: bool) {
        self.lock().new_offline = offline;
    }

    /// Answer add requests with `extra` more blocks than were asked for.
    pub fn set_extra_results(&self, extra: usize) {
        self.lock().extra_results = extra;
    }

    /// Answer add requests with `missing` fewer blocks than were asked for.
    pub fn set_missing_results(&self, missing: usize) {
        self.lock().missing_results = missing;
    }

    pub fn initial_requests(&self) -> Vec<FetchInitialRequest> {
        self.lock().initial_requests.clone()
    }

    pub fn new_requests(&self) -> Vec<FetchNewRequest> {
        self.lock().new_requests.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // State is plain data; a poisoned lock still holds a usable value.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl BlockSource for MemoryBlockSource {
    async fn fetch_initial(
        &self,
        field_name: &str,
        value: &serde_json::Value,
    ) -> Result<Vec<RawContent>, SourceError> {
        let mut state = self.lock();
        state.initial_requests.push(FetchInitialRequest {
            value: value.clone(),
            repeater_name: field_name.to_string(),
        });
        if state.offline {
            return Err(SourceError::Unavailable("source is offline".into()));
        }
        Ok(self.initial.clone())
    }

    async fn fetch_new(
        &self,
        field_name: &str,
        existing: usize,
        requested: usize,
    ) -> Result<Vec<RawContent>, SourceError> {
        let mut state = self.lock();
        state.new_requests.push(FetchNewRequest {
            repeater_name: field_name.to_string(),
            blocks: existing,
            num: requested,
        });
        if state.offline || state.new_offline {
            return Err(SourceError::Unavailable("source is offline".into()));
        }
        let count = (requested + state.extra_results).saturating_sub(state.missing_results);
        Ok(vec![self.blank.clone(); count])
    }
}

//! Hand-written collaborator mocks shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use pagesmith_editor::{
    Autocompleter, CollaboratorError, CollaboratorResult, DefinitionSource, NodeType, PageRecord,
    PageStore, PageUpdate, QaClient, QaRequest, QaResponse, SuggestionRequest, SuggestionResponse,
    SymbolRecord,
};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

pub fn symbol(node_type: NodeType, name: &str, file: &str) -> SymbolRecord {
    SymbolRecord {
        node_type,
        node_name: name.to_string(),
        file_name: file.to_string(),
        code_snippet: String::new(),
        start_end_lines: [1, 10],
    }
}

/// In-memory page store recording every update
#[derive(Default)]
pub struct MockPageStore {
    pub pages: Mutex<HashMap<String, PageRecord>>,
    pub updates: Mutex<Vec<(String, PageUpdate)>>,
    pub fail_updates: Mutex<bool>,
    pub latency: Option<Duration>,
}

impl MockPageStore {
    pub fn with_page(page_id: &str, title: &str, content: &str) -> Self {
        let store = Self::default();
        store.pages.lock().insert(
            page_id.to_string(),
            PageRecord {
                title: title.to_string(),
                content: content.to_string(),
            },
        );
        store
    }

    pub fn update_count(&self) -> usize {
        self.updates.lock().len()
    }
}

#[async_trait]
impl PageStore for MockPageStore {
    async fn get(&self, page_id: &str) -> CollaboratorResult<PageRecord> {
        self.pages
            .lock()
            .get(page_id)
            .cloned()
            .ok_or_else(|| CollaboratorError::NotFound(page_id.to_string()))
    }

    async fn update(&self, page_id: &str, update: PageUpdate) -> CollaboratorResult<()> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if *self.fail_updates.lock() {
            return Err(CollaboratorError::Transport("connection refused".to_string()));
        }
        self.updates.lock().push((page_id.to_string(), update.clone()));
        self.pages.lock().insert(
            page_id.to_string(),
            PageRecord {
                title: update.title,
                content: update.content,
            },
        );
        Ok(())
    }
}

/// Autocompleter returning queued responses (empty once drained)
#[derive(Default)]
pub struct MockAutocompleter {
    pub requests: Mutex<Vec<SuggestionRequest>>,
    pub responses: Mutex<VecDeque<CollaboratorResult<String>>>,
    pub latency: Option<Duration>,
}

impl MockAutocompleter {
    pub fn replying(responses: &[&str]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().map(|r| Ok(r.to_string())).collect()),
            ..Self::default()
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn push_error(&self) {
        self.responses
            .lock()
            .push_back(Err(CollaboratorError::Transport("timeout".to_string())));
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn last_request(&self) -> Option<SuggestionRequest> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait]
impl Autocompleter for MockAutocompleter {
    async fn complete(&self, request: SuggestionRequest) -> CollaboratorResult<SuggestionResponse> {
        self.requests.lock().push(request);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let next = self.responses.lock().pop_front().unwrap_or_else(|| Ok(String::new()));
        next.map(|suggestion| SuggestionResponse { suggestion })
    }
}

/// Q&A client answering from a fixed script
#[derive(Default)]
pub struct MockQaClient {
    pub requests: Mutex<Vec<QaRequest>>,
    pub answer: Mutex<Option<String>>,
    pub latency: Option<Duration>,
}

impl MockQaClient {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: Mutex::new(Some(answer.to_string())),
            ..Self::default()
        }
    }

    /// Every request fails
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn last_request(&self) -> Option<QaRequest> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait]
impl QaClient for MockQaClient {
    async fn ask(&self, request: QaRequest) -> CollaboratorResult<QaResponse> {
        self.requests.lock().push(request);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match self.answer.lock().clone() {
            Some(answer) => Ok(QaResponse { answer }),
            None => Err(CollaboratorError::Transport("502 bad gateway".to_string())),
        }
    }
}

/// Definition source counting fetches
#[derive(Default)]
pub struct MockDefinitionSource {
    pub definitions: Mutex<Vec<SymbolRecord>>,
    pub fetches: Mutex<usize>,
    pub fail: Mutex<bool>,
}

impl MockDefinitionSource {
    pub fn with(definitions: Vec<SymbolRecord>) -> Self {
        Self {
            definitions: Mutex::new(definitions),
            ..Self::default()
        }
    }

    pub fn fetch_count(&self) -> usize {
        *self.fetches.lock()
    }
}

#[async_trait]
impl DefinitionSource for MockDefinitionSource {
    async fn get_definitions(&self, _repo_id: &str) -> CollaboratorResult<Vec<SymbolRecord>> {
        *self.fetches.lock() += 1;
        if *self.fail.lock() {
            return Err(CollaboratorError::Transport("index unavailable".to_string()));
        }
        Ok(self.definitions.lock().clone())
    }
}

//! Progress events emitted while a search runs.

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

use crate::orchestrator::state::SearchState;

/// A progress notification for one search call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SearchEvent {
    /// The call moved to a new stage.
    StageEntered { state: SearchState },
    /// A source answered.
    SourceCompleted {
        source_id: String,
        task_id: String,
        items: usize,
    },
    /// A source failed, timed out or was cancelled.
    SourceDegraded {
        source_id: String,
        task_id: String,
        reason: String,
    },
    /// The call produced a response.
    Finished { total: usize, cached: bool },
}

/// Optional event channel. Sends never block and a closed receiver is ignored.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventSink {
    sender: Option<UnboundedSender<SearchEvent>>,
}

impl EventSink {
    pub(crate) fn new(sender: Option<UnboundedSender<SearchEvent>>) -> Self {
        Self { sender }
    }

    pub(crate) fn emit(&self, event: SearchEvent) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(event);
        }
    }

    pub(crate) fn stage(&self, state: SearchState) {
        log::debug!("search stage: {state}");
        self.emit(SearchEvent::StageEntered { state });
    }
}

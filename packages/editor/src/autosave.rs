//! # Autosave
//!
//! Periodically writes the open page back to the [`PageStore`].
//!
//! A tick serializes the title and body, compares them with what was last
//! persisted, and only calls the store when something changed and no save
//! is already in flight. Failures are logged and retried on the next tick.

use crate::collaborators::{PageRecord, PageStore, PageUpdate};
use crate::errors::EditorResult;
use crate::session::SessionHandle;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

const MIN_TICK: Duration = Duration::from_millis(1);

/// Aborts a tokio task when dropped
#[derive(Debug)]
pub struct AbortOnDrop(tokio::task::AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

#[derive(Debug, Default)]
struct SaveState {
    last_title: String,
    last_content: String,
    saving: bool,
    last_saved_at: Option<DateTime<Utc>>,
}

/// Keeps persisted storage in step with an edit session
pub struct AutoSaveCoordinator {
    store: Arc<dyn PageStore>,
    session: SessionHandle,
    state: Mutex<SaveState>,
}

impl AutoSaveCoordinator {
    /// `initial` is the page as it was loaded; it counts as already saved
    pub fn new(store: Arc<dyn PageStore>, session: SessionHandle, initial: &PageRecord) -> Self {
        Self {
            store,
            session,
            state: Mutex::new(SaveState {
                last_title: initial.title.clone(),
                last_content: initial.content.clone(),
                ..SaveState::default()
            }),
        }
    }

    pub fn is_saving(&self) -> bool {
        self.state.lock().saving
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.state.lock().last_saved_at
    }

    /// Save if the page changed since the last save
    ///
    /// Returns `Ok(false)` when there was nothing to do.
    pub async fn perform_autosave(&self) -> EditorResult<bool> {
        let (page_id, version, update) = {
            let session = self.session.lock();
            let document = session.document();
            (
                document.page_id.clone(),
                document.version,
                PageUpdate {
                    title: document.title().to_string(),
                    content: document.body_markdown(),
                },
            )
        };

        {
            let mut state = self.state.lock();
            if state.saving {
                return Ok(false);
            }
            if state.last_title == update.title && state.last_content == update.content {
                return Ok(false);
            }
            state.saving = true;
        }

        let result = self.store.update(&page_id, update.clone()).await;

        let mut state = self.state.lock();
        state.saving = false;
        match result {
            Ok(()) => {
                state.last_title = update.title;
                state.last_content = update.content;
                state.last_saved_at = Some(Utc::now());
                drop(state);

                let mut session = self.session.lock();
                // Edits made during the save stay dirty
                if session.document().version == version {
                    session.document_mut().mark_clean();
                }
                tracing::info!(page_id = %page_id, version, "page saved");
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(page_id = %page_id, error = %e, "autosave failed");
                Err(e.into())
            }
        }
    }

    /// Explicit save, same path as a tick
    pub async fn save_now(&self) -> EditorResult<bool> {
        self.perform_autosave().await
    }

    /// Run `perform_autosave` every `period` until the returned guard drops
    pub fn spawn(self: &Arc<Self>, period: Duration) -> AbortOnDrop {
        // interval_at panics on a zero period
        let period = period.max(MIN_TICK);
        let coordinator = Arc::clone(self);
        let task = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut ticker = tokio::time::interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                // Already logged; retried next tick
                let _ = coordinator.perform_autosave().await;
            }
        });
        AbortOnDrop(task.abort_handle())
    }

    /// Short status line for the editor chrome
    pub fn status_text(&self) -> String {
        let (saving, saved_at) = {
            let state = self.state.lock();
            (state.saving, state.last_saved_at)
        };

        if saving {
            return "Saving...".to_string();
        }
        match saved_at {
            Some(saved_at) => format_time_since(saved_at, Utc::now()),
            None if self.session.lock().document().is_dirty() => "not saved".to_string(),
            None => String::new(),
        }
    }
}

/// Human-readable age of the last save
pub fn format_time_since(saved_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - saved_at).num_seconds().max(0);

    if secs < 60 {
        "saved just now".to_string()
    } else if secs < 3600 {
        plural(secs / 60, "min")
    } else if secs < 86400 {
        plural(secs / 3600, "hour")
    } else if secs < 604800 {
        plural(secs / 86400, "day")
    } else {
        format!("saved {}", saved_at.format("%Y-%m-%d"))
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 || unit == "min" {
        format!("saved {n} {unit} ago")
    } else {
        format!("saved {n} {unit}s ago")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_time_since() {
        let saved = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let after = |secs: i64| saved + chrono::Duration::seconds(secs);

        assert_eq!(format_time_since(saved, after(10)), "saved just now");
        assert_eq!(format_time_since(saved, after(60)), "saved 1 min ago");
        assert_eq!(format_time_since(saved, after(150)), "saved 2 min ago");
        assert_eq!(format_time_since(saved, after(3600)), "saved 1 hour ago");
        assert_eq!(format_time_since(saved, after(3 * 3600)), "saved 3 hours ago");
        assert_eq!(format_time_since(saved, after(86400)), "saved 1 day ago");
        assert_eq!(format_time_since(saved, after(2 * 86400)), "saved 2 days ago");
        assert_eq!(format_time_since(saved, after(8 * 86400)), "saved 2024-03-01");
    }

    #[test]
    fn test_clock_skew_reads_as_just_now() {
        let saved = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let earlier = saved - chrono::Duration::seconds(30);
        assert_eq!(format_time_since(saved, earlier), "saved just now");
    }
}

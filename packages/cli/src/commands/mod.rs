pub mod init;
pub mod mentions;
pub mod paste;
pub mod reflow;
pub mod show;

pub use init::{init, InitArgs};
pub use mentions::{mentions, MentionsArgs};
pub use paste::{paste, PasteArgs};
pub use reflow::{reflow, ReflowArgs};
pub use show::{show, ShowArgs};

use crate::store::FilePageStore;
use anyhow::Result;
use pagesmith_editor::{AutoSaveCoordinator, EditSession, EditorConfig, PageStore, SessionHandle};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Resolved invocation context shared by every command
pub struct Context {
    pub cwd: PathBuf,
    pub pages_dir: PathBuf,
    pub config: EditorConfig,
}

impl Context {
    pub fn load(cwd: PathBuf, pages: &Path) -> Result<Self> {
        let config = EditorConfig::load(&cwd)?;
        let pages_dir = cwd.join(pages);
        tracing::debug!(cwd = %cwd.display(), pages = %pages_dir.display(), "context loaded");
        Ok(Self {
            cwd,
            pages_dir,
            config,
        })
    }

    pub async fn open_page(&self, page_id: &str) -> Result<OpenPage> {
        open_page(&self.pages_dir, page_id, &self.config).await
    }
}

/// A page opened from disk, ready to edit and save back
pub struct OpenPage {
    pub session: SessionHandle,
    pub autosave: AutoSaveCoordinator,
}

pub async fn open_page(pages_dir: &Path, page_id: &str, config: &EditorConfig) -> Result<OpenPage> {
    let store = Arc::new(FilePageStore::new(pages_dir));
    let initial = store.get(page_id).await?;
    let session = EditSession::load(store.as_ref(), page_id, config)
        .await?
        .into_handle();
    let autosave = AutoSaveCoordinator::new(store, session.clone(), &initial);

    Ok(OpenPage { session, autosave })
}

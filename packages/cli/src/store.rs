//! File-backed collaborators for headless editing.
//!
//! Pages live as `<root>/<page_id>.json` (`{"title": .., "content": ..}`);
//! the symbol index is a JSON array of symbol records.

use async_trait::async_trait;
use pagesmith_editor::{
    CollaboratorError, CollaboratorResult, DefinitionSource, PageRecord, PageStore, PageUpdate,
    SymbolRecord,
};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub struct FilePageStore {
    root: PathBuf,
}

impl FilePageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn page_path(&self, page_id: &str) -> PathBuf {
        self.root.join(format!("{page_id}.json"))
    }

    /// Write a page file directly
    pub async fn create(&self, page_id: &str, record: &PageRecord) -> CollaboratorResult<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        let json = serde_json::to_string_pretty(record)?;
        tokio::fs::write(self.page_path(page_id), json).await?;
        Ok(())
    }
}

#[async_trait]
impl PageStore for FilePageStore {
    async fn get(&self, page_id: &str) -> CollaboratorResult<PageRecord> {
        let path = self.page_path(page_id);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(CollaboratorError::NotFound(path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    async fn update(&self, page_id: &str, update: PageUpdate) -> CollaboratorResult<()> {
        let record = PageRecord {
            title: update.title,
            content: update.content,
        };
        self.create(page_id, &record).await?;
        tracing::debug!(page_id, path = %self.page_path(page_id).display(), "page written");
        Ok(())
    }
}

/// Symbol index read from a JSON file; the repository id is not used
pub struct FileDefinitionSource {
    path: PathBuf,
}

impl FileDefinitionSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl DefinitionSource for FileDefinitionSource {
    async fn get_definitions(&self, _repo_id: &str) -> CollaboratorResult<Vec<SymbolRecord>> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&content)?)
    }
}

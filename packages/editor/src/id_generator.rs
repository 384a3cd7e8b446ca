use crate::block::BlockId;
use crc32fast::Hasher;

/// Derive a stable id seed from a page id using CRC32
pub fn get_page_seed(page_id: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(b"page://");
    hasher.update(page_id.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential block id generator scoped to one editing session
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u64,
}

impl IdGenerator {
    pub fn new(page_id: &str) -> Self {
        Self {
            seed: get_page_seed(page_id),
            count: 0,
        }
    }

    pub fn from_seed(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            count: 0,
        }
    }

    /// Generate next sequential id
    pub fn new_id(&mut self) -> BlockId {
        self.count += 1;
        BlockId::new(format!("{}-{}", self.seed, self.count))
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}

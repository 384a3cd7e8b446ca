//! # Mentions
//!
//! `@name` tokens in block text that point at entries of the repository
//! symbol index.
//!
//! Definitions are fetched from a [`DefinitionSource`] and cached for a TTL
//! (an hour by default); lookups are synchronous against the cache so the
//! mention dropdown never waits on the network.
//!
//! Ranking is purely lexical on the symbol name:
//!
//! | Match | Score |
//! |---|---|
//! | exact (case-insensitive) | 100 |
//! | prefix | 80 |
//! | substring | 60 |

use crate::block::split_at_char;
use crate::collaborators::{DefinitionSource, MentionedDefinition, SymbolRecord};
use crate::errors::EditorResult;
use parking_lot::RwLock;
use regex::Regex;
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_MAX_RESULTS: usize = 5;
pub const DEFAULT_DEFINITIONS_TTL: Duration = Duration::from_secs(60 * 60);

fn mention_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@([\w.]+)").expect("static regex"))
}

/// An `@name` token, with character offsets into the scanned text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionSpan {
    /// Offset of the `@`
    pub start: usize,
    /// Offset just past the name
    pub end: usize,
    /// Name without the `@`
    pub name: String,
}

/// All `@name` tokens in `text`, in order
pub fn extract_mentions(text: &str) -> Vec<MentionSpan> {
    mention_regex()
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?;
            let start = text[..whole.start()].chars().count();
            Some(MentionSpan {
                start,
                end: start + whole.as_str().chars().count(),
                name: name.as_str().to_string(),
            })
        })
        .collect()
}

/// The partial mention being typed at `caret`, if any
///
/// This is the text after the last `@` left of the caret, as long as it is
/// non-empty and holds no whitespace.
pub fn mention_query_at(text: &str, caret: usize) -> Option<&str> {
    let (before, _) = split_at_char(text, caret);
    let at = before.rfind('@')?;
    let query = &before[at + 1..];

    if query.trim().is_empty() || query.chars().any(char::is_whitespace) {
        return None;
    }
    Some(query)
}

/// Replace the partial mention at the end of `content` with a chosen symbol
pub fn complete_mention(content: &str, node_name: &str) -> String {
    let before = content.rfind('@').map(|at| &content[..at]).unwrap_or(content);
    format!("{before}@{node_name} ")
}

fn score(node_name: &str, term: &str) -> u32 {
    let name = node_name.to_lowercase();
    if name == term {
        100
    } else if name.starts_with(term) {
        80
    } else if name.contains(term) {
        60
    } else {
        0
    }
}

/// Rank `definitions` against `query`
pub fn rank_matches(definitions: &[SymbolRecord], query: &str, limit: usize) -> Vec<SymbolRecord> {
    let term = query.trim().to_lowercase();
    if term.is_empty() || definitions.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(u32, &SymbolRecord)> = definitions
        .iter()
        .map(|def| (score(&def.node_name, &term), def))
        .filter(|(score, _)| *score > 0)
        .collect();

    // Stable: equal scores keep index order
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    let mut seen = HashSet::new();
    scored
        .into_iter()
        .filter(|(_, def)| seen.insert(def.key()))
        .take(limit)
        .map(|(_, def)| def.clone())
        .collect()
}

struct CachedDefinitions {
    definitions: Vec<SymbolRecord>,
    fetched_at: Instant,
}

/// Cached symbol index for one repository
pub struct MentionResolver {
    repo_id: String,
    source: Option<Arc<dyn DefinitionSource>>,
    cache: RwLock<Option<CachedDefinitions>>,
    ttl: Duration,
    max_results: usize,
}

impl MentionResolver {
    pub fn new(repo_id: impl Into<String>, source: Arc<dyn DefinitionSource>) -> Self {
        Self {
            repo_id: repo_id.into(),
            source: Some(source),
            cache: RwLock::new(None),
            ttl: DEFAULT_DEFINITIONS_TTL,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Resolver over a fixed set of definitions (no refresh)
    pub fn from_definitions(repo_id: impl Into<String>, definitions: Vec<SymbolRecord>) -> Self {
        Self {
            repo_id: repo_id.into(),
            source: None,
            cache: RwLock::new(Some(CachedDefinitions {
                definitions,
                fetched_at: Instant::now(),
            })),
            ttl: DEFAULT_DEFINITIONS_TTL,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn repo_id(&self) -> &str {
        &self.repo_id
    }

    /// Whether the cache holds definitions younger than the TTL
    pub fn is_fresh(&self) -> bool {
        self.cache
            .read()
            .as_ref()
            .map(|cached| cached.fetched_at.elapsed() < self.ttl)
            .unwrap_or(false)
    }

    pub fn definitions(&self) -> Vec<SymbolRecord> {
        self.cache
            .read()
            .as_ref()
            .map(|cached| cached.definitions.clone())
            .unwrap_or_default()
    }

    /// Refetch definitions if the cache is missing or stale
    ///
    /// On failure the previous cache is kept and the error returned.
    pub async fn refresh(&self) -> EditorResult<()> {
        let Some(source) = self.source.as_ref() else {
            return Ok(());
        };
        if self.is_fresh() {
            return Ok(());
        }

        match source.get_definitions(&self.repo_id).await {
            Ok(definitions) => {
                tracing::debug!(repo_id = %self.repo_id, count = definitions.len(), "definitions refreshed");
                *self.cache.write() = Some(CachedDefinitions {
                    definitions,
                    fetched_at: Instant::now(),
                });
                Ok(())
            }
            Err(e) => {
                tracing::warn!(repo_id = %self.repo_id, error = %e, "failed to load definitions");
                Err(e.into())
            }
        }
    }

    /// Ranked matches for a mention query, from cache
    pub fn find_matches(&self, query: &str) -> Vec<SymbolRecord> {
        let cache = self.cache.read();
        match cache.as_ref() {
            Some(cached) => rank_matches(&cached.definitions, query, self.max_results),
            None => Vec::new(),
        }
    }

    /// Exact name match for `name`, else the best ranked match
    pub fn resolve(&self, name: &str) -> Option<SymbolRecord> {
        let mut matches = self.find_matches(name);
        match matches.iter().position(|def| def.node_name == name) {
            Some(exact) => Some(matches.swap_remove(exact)),
            None => matches.into_iter().next(),
        }
    }

    /// Mentions in `text` that name a symbol exactly (highlighted in the UI)
    pub fn resolved_spans(&self, text: &str) -> Vec<MentionSpan> {
        extract_mentions(text)
            .into_iter()
            .filter(|span| {
                self.find_matches(&span.name)
                    .iter()
                    .any(|def| def.node_name == span.name)
            })
            .collect()
    }

    /// Resolve every mention across `texts`, de-duplicated by symbol identity
    pub fn mentioned_definitions<'a>(
        &self,
        texts: impl IntoIterator<Item = &'a str>,
    ) -> Vec<MentionedDefinition> {
        let mut seen = HashSet::new();
        let mut resolved = Vec::new();

        for text in texts {
            for span in extract_mentions(text) {
                if let Some(symbol) = self.resolve(&span.name) {
                    let key = (symbol.node_type, symbol.node_name.clone(), symbol.file_name.clone());
                    if seen.insert(key) {
                        resolved.push(MentionedDefinition::from(&symbol));
                    }
                }
            }
        }

        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::NodeType;

    fn symbol(name: &str, file: &str) -> SymbolRecord {
        SymbolRecord {
            node_type: NodeType::Function,
            node_name: name.to_string(),
            file_name: file.to_string(),
            code_snippet: String::new(),
            start_end_lines: [1, 2],
        }
    }

    fn names(matches: &[SymbolRecord]) -> Vec<&str> {
        matches.iter().map(|m| m.node_name.as_str()).collect()
    }

    #[test]
    fn test_exact_then_prefix_then_substring() {
        let defs = vec![
            symbol("oauthHelper", "o.py"),
            symbol("authService", "s.py"),
            symbol("auth", "a.py"),
            symbol("unrelated", "u.py"),
        ];
        let matches = rank_matches(&defs, "auth", 5);
        assert_eq!(names(&matches), vec!["auth", "authService", "oauthHelper"]);
    }

    #[test]
    fn test_case_insensitive_and_trimmed() {
        let defs = vec![symbol("AuthService", "s.py")];
        assert_eq!(names(&rank_matches(&defs, "  AUTHs ", 5)), vec!["AuthService"]);
    }

    #[test]
    fn test_empty_query_or_index() {
        assert!(rank_matches(&[symbol("a", "a.py")], "   ", 5).is_empty());
        assert!(rank_matches(&[], "a", 5).is_empty());
    }

    #[test]
    fn test_ties_keep_index_order_and_limit() {
        let defs: Vec<_> = (0..8).map(|i| symbol(&format!("item{i}"), "f.py")).collect();
        let matches = rank_matches(&defs, "item", 5);
        assert_eq!(names(&matches), vec!["item0", "item1", "item2", "item3", "item4"]);
    }

    #[test]
    fn test_duplicates_are_collapsed() {
        let defs = vec![symbol("run", "a.py"), symbol("run", "a.py"), symbol("run", "b.py")];
        let matches = rank_matches(&defs, "run", 5);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[1].file_name, "b.py");
    }

    #[test]
    fn test_file_name_is_not_matched() {
        let defs = vec![symbol("handler", "auth.py")];
        assert!(rank_matches(&defs, "auth", 5).is_empty());
    }

    #[test]
    fn test_extract_mentions_offsets() {
        let spans = extract_mentions("ask é@auth.login and @x");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].name, "auth.login");
        assert_eq!((spans[0].start, spans[0].end), (5, 16));
        assert_eq!(spans[1].name, "x");
    }

    #[test]
    fn test_mention_query_at_caret() {
        assert_eq!(mention_query_at("see @aut", 8), Some("aut"));
        assert_eq!(mention_query_at("see @aut more", 8), Some("aut"));
        assert_eq!(mention_query_at("see @aut more", 13), None);
        assert_eq!(mention_query_at("see @", 5), None);
        assert_eq!(mention_query_at("no mention", 10), None);
    }

    #[test]
    fn test_complete_mention() {
        assert_eq!(complete_mention("call @au", "authService"), "call @authService ");
    }

    #[test]
    fn test_resolved_spans_require_exact_name() {
        let resolver = MentionResolver::from_definitions(
            "repo",
            vec![symbol("auth", "a.py"), symbol("authService", "s.py")],
        );
        let spans = resolver.resolved_spans("@auth and @auths and @authService");
        let names: Vec<_> = spans.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["auth", "authService"]);
    }

    #[test]
    fn test_resolve_falls_back_to_best_match() {
        let resolver = MentionResolver::from_definitions("repo", vec![symbol("authService", "s.py")]);
        assert_eq!(resolver.resolve("auth").unwrap().node_name, "authService");
        assert!(resolver.resolve("zzz").is_none());
    }

    #[test]
    fn test_mentioned_definitions_dedupe() {
        let resolver = MentionResolver::from_definitions(
            "repo",
            vec![symbol("auth", "a.py"), symbol("db", "d.py")],
        );
        let defs = resolver.mentioned_definitions(["use @auth", "then @db and @auth again", "@nothing"]);
        let names: Vec<_> = defs.iter().map(|d| d.node_name.as_str()).collect();
        assert_eq!(names, vec!["auth", "db"]);
    }
}

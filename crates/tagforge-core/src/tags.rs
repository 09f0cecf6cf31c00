//! Tag post-processing: ranking delegation, capping, and deduplication.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::defaults::TAG_TOP_K;
use crate::error::Result;
use crate::traits::KeywordBackend;

/// Raw output of a content handler before post-processing.
///
/// Most handlers produce text that still needs ranking; the dynamic-content
/// handler produces tags directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawExtraction {
    /// Free text to be ranked into key phrases.
    Text(String),
    /// Already-ranked tags; skip ranking, still capped and deduplicated.
    Tags(Vec<String>),
}

/// Order-insensitive deduplication with set semantics.
///
/// No stable output order is guaranteed. Idempotent: applying it twice
/// yields the same set.
pub fn dedupe_tags(tags: Vec<String>) -> Vec<String> {
    let set: HashSet<String> = tags.into_iter().collect();
    set.into_iter().collect()
}

/// Produces a deduplicated, bounded tag set from raw handler output.
///
/// Ranking is delegated to the keyword capability; the owned logic is input
/// coercion, the empty-content short-circuit, top-k truncation, and
/// deduplication.
pub struct TagPostProcessor {
    keywords: Arc<dyn KeywordBackend>,
    top_k: usize,
}

impl TagPostProcessor {
    /// Create a post-processor with the default result cap.
    pub fn new(keywords: Arc<dyn KeywordBackend>) -> Self {
        Self {
            keywords,
            top_k: TAG_TOP_K,
        }
    }

    /// Override the result cap.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Post-process raw handler output into a tag set.
    ///
    /// Blank content yields an empty set rather than an error; ranking
    /// failures on degenerate input degrade the same way.
    pub async fn process(&self, raw: RawExtraction) -> Result<Vec<String>> {
        let ranked = match raw {
            RawExtraction::Text(text) => {
                if text.trim().is_empty() {
                    debug!("Empty content, short-circuiting to empty tag set");
                    return Ok(Vec::new());
                }
                match self.keywords.rank(&text).await {
                    Ok(ranked) => ranked,
                    Err(e) => {
                        debug!(error = %e, "Keyword ranking failed, degrading to empty tag set");
                        return Ok(Vec::new());
                    }
                }
            }
            RawExtraction::Tags(tags) => tags,
        };

        let mut capped: Vec<String> = ranked
            .into_iter()
            .filter(|t| !t.trim().is_empty())
            .collect();
        capped.truncate(self.top_k);
        Ok(dedupe_tags(capped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct MockKeywordBackend {
        ranked: Vec<String>,
        fail: bool,
    }

    #[async_trait]
    impl KeywordBackend for MockKeywordBackend {
        async fn rank(&self, _text: &str) -> Result<Vec<String>> {
            if self.fail {
                return Err(crate::error::Error::Inference("rank failed".to_string()));
            }
            Ok(self.ranked.clone())
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
    }

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn as_set(v: Vec<String>) -> HashSet<String> {
        v.into_iter().collect()
    }

    #[test]
    fn test_dedupe_removes_duplicates() {
        let deduped = dedupe_tags(strings(&["a", "b", "a", "c", "b"]));
        assert_eq!(as_set(deduped), as_set(strings(&["a", "b", "c"])));
    }

    #[test]
    fn test_dedupe_idempotent() {
        let once = dedupe_tags(strings(&["x", "y", "x"]));
        let twice = dedupe_tags(once.clone());
        assert_eq!(as_set(once), as_set(twice));
    }

    #[test]
    fn test_dedupe_empty() {
        assert!(dedupe_tags(Vec::new()).is_empty());
    }

    #[tokio::test]
    async fn test_process_ranks_and_caps() {
        let backend = MockKeywordBackend {
            ranked: strings(&["one", "two", "three", "four", "five", "six", "seven"]),
            fail: false,
        };
        let processor = TagPostProcessor::new(Arc::new(backend));
        let tags = processor
            .process(RawExtraction::Text("some content".to_string()))
            .await
            .unwrap();
        assert_eq!(tags.len(), 5);
        assert_eq!(
            as_set(tags),
            as_set(strings(&["one", "two", "three", "four", "five"]))
        );
    }

    #[tokio::test]
    async fn test_process_empty_content_short_circuits() {
        let backend = MockKeywordBackend {
            ranked: strings(&["should", "not", "appear"]),
            fail: false,
        };
        let processor = TagPostProcessor::new(Arc::new(backend));
        for content in ["", "   ", "\n\t"] {
            let tags = processor
                .process(RawExtraction::Text(content.to_string()))
                .await
                .unwrap();
            assert!(tags.is_empty(), "content: {:?}", content);
        }
    }

    #[tokio::test]
    async fn test_process_ranking_failure_degrades_to_empty() {
        let backend = MockKeywordBackend {
            ranked: Vec::new(),
            fail: true,
        };
        let processor = TagPostProcessor::new(Arc::new(backend));
        let tags = processor
            .process(RawExtraction::Text("content".to_string()))
            .await
            .unwrap();
        assert!(tags.is_empty());
    }

    #[tokio::test]
    async fn test_process_pre_ranked_tags_skip_backend() {
        // Backend would fail; Tags input must not touch it.
        let backend = MockKeywordBackend {
            ranked: Vec::new(),
            fail: true,
        };
        let processor = TagPostProcessor::new(Arc::new(backend));
        let tags = processor
            .process(RawExtraction::Tags(strings(&["youtube", "youtube", "clip"])))
            .await
            .unwrap();
        assert_eq!(as_set(tags), as_set(strings(&["youtube", "clip"])));
    }

    #[tokio::test]
    async fn test_process_filters_blank_tags() {
        let backend = MockKeywordBackend {
            ranked: strings(&["good", "", "  "]),
            fail: false,
        };
        let processor = TagPostProcessor::new(Arc::new(backend));
        let tags = processor
            .process(RawExtraction::Text("content".to_string()))
            .await
            .unwrap();
        assert_eq!(tags, strings(&["good"]));
    }

    #[tokio::test]
    async fn test_process_custom_top_k() {
        let backend = MockKeywordBackend {
            ranked: strings(&["a", "b", "c"]),
            fail: false,
        };
        let processor = TagPostProcessor::new(Arc::new(backend)).with_top_k(2);
        let tags = processor
            .process(RawExtraction::Text("content".to_string()))
            .await
            .unwrap();
        assert_eq!(tags.len(), 2);
    }
}

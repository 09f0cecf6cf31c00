//! Dynamic-content classification for link payloads.
//!
//! Dynamic jobs carry a small text file pointing at an external site. The
//! classifier is a pure domain match; whatever scraping or download happens
//! behind the [`DynamicContentBackend`] is outside this crate.

use async_trait::async_trait;

use tagforge_core::{DynamicContentBackend, Result};

/// Site category of a dynamic-content payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicKind {
    YouTube,
    GoogleDocs,
    GoogleDrive,
    GoogleImages,
    Blog,
    SocialMedia,
    CodeRepository,
    News,
    Academic,
    Unsupported,
}

impl DynamicKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DynamicKind::YouTube => "youtube",
            DynamicKind::GoogleDocs => "google_docs",
            DynamicKind::GoogleDrive => "google_drive",
            DynamicKind::GoogleImages => "google_images",
            DynamicKind::Blog => "blog",
            DynamicKind::SocialMedia => "social_media",
            DynamicKind::CodeRepository => "code_repository",
            DynamicKind::News => "news",
            DynamicKind::Academic => "academic",
            DynamicKind::Unsupported => "unsupported",
        }
    }
}

/// Classify dynamic content by the domains it mentions.
///
/// First match wins, in the order below.
pub fn classify_dynamic_content(content: &str) -> DynamicKind {
    const BLOGS: [&str; 4] = ["medium.com", "wordpress.com", "blogger.com", "tumblr.com"];
    const SOCIAL: [&str; 4] = [
        "twitter.com",
        "facebook.com",
        "instagram.com",
        "linkedin.com",
    ];
    const CODE: [&str; 3] = ["github.com", "gitlab.com", "bitbucket.org"];
    const NEWS: [&str; 4] = ["cnn.com", "bbc.com", "nytimes.com", "reuters.com"];
    const ACADEMIC: [&str; 3] = [
        "scholar.google.com",
        "researchgate.net",
        "academia.edu",
    ];

    if content.contains("youtube.com") || content.contains("youtu.be") {
        DynamicKind::YouTube
    } else if content.contains("docs.google.com") {
        DynamicKind::GoogleDocs
    } else if content.contains("drive.google.com") {
        DynamicKind::GoogleDrive
    } else if content.contains("images.google.com") {
        DynamicKind::GoogleImages
    } else if BLOGS.iter().any(|d| content.contains(d)) {
        DynamicKind::Blog
    } else if SOCIAL.iter().any(|d| content.contains(d)) {
        DynamicKind::SocialMedia
    } else if CODE.iter().any(|d| content.contains(d)) {
        DynamicKind::CodeRepository
    } else if NEWS.iter().any(|d| content.contains(d)) {
        DynamicKind::News
    } else if ACADEMIC.iter().any(|d| content.contains(d)) {
        DynamicKind::Academic
    } else {
        DynamicKind::Unsupported
    }
}

/// Default dynamic-content backend: tags by classified kind only.
///
/// Unsupported content yields no tags rather than an error.
pub struct KindTagBackend;

#[async_trait]
impl DynamicContentBackend for KindTagBackend {
    async fn extract(&self, content: &str) -> Result<Vec<String>> {
        match classify_dynamic_content(content) {
            DynamicKind::Unsupported => Ok(Vec::new()),
            kind => Ok(vec![kind.as_str().to_string()]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_youtube_variants() {
        assert_eq!(
            classify_dynamic_content("https://www.youtube.com/watch?v=abc123def45"),
            DynamicKind::YouTube
        );
        assert_eq!(
            classify_dynamic_content("see https://youtu.be/abc123def45"),
            DynamicKind::YouTube
        );
    }

    #[test]
    fn test_classify_google_properties() {
        assert_eq!(
            classify_dynamic_content("https://docs.google.com/document/d/x"),
            DynamicKind::GoogleDocs
        );
        assert_eq!(
            classify_dynamic_content("https://drive.google.com/file/d/x"),
            DynamicKind::GoogleDrive
        );
        assert_eq!(
            classify_dynamic_content("https://images.google.com/?q=cats"),
            DynamicKind::GoogleImages
        );
    }

    #[test]
    fn test_classify_categories() {
        assert_eq!(
            classify_dynamic_content("read my post on medium.com"),
            DynamicKind::Blog
        );
        assert_eq!(
            classify_dynamic_content("https://twitter.com/someone"),
            DynamicKind::SocialMedia
        );
        assert_eq!(
            classify_dynamic_content("https://github.com/org/repo"),
            DynamicKind::CodeRepository
        );
        assert_eq!(
            classify_dynamic_content("https://www.bbc.com/news/article"),
            DynamicKind::News
        );
        assert_eq!(
            classify_dynamic_content("https://scholar.google.com/citations"),
            DynamicKind::Academic
        );
    }

    #[test]
    fn test_classify_unknown_content() {
        assert_eq!(
            classify_dynamic_content("just some plain notes"),
            DynamicKind::Unsupported
        );
        assert_eq!(classify_dynamic_content(""), DynamicKind::Unsupported);
    }

    #[test]
    fn test_drive_wins_over_images() {
        let content = "https://drive.google.com/file/d/x and https://images.google.com/?q=x";
        assert_eq!(classify_dynamic_content(content), DynamicKind::GoogleDrive);
    }

    #[test]
    fn test_youtube_wins_over_later_matches() {
        let content = "https://youtube.com/x and https://github.com/y";
        assert_eq!(classify_dynamic_content(content), DynamicKind::YouTube);
    }

    #[tokio::test]
    async fn test_kind_tag_backend_tags_recognized_kind() {
        let tags = KindTagBackend
            .extract("https://www.youtube.com/watch?v=zzz")
            .await
            .unwrap();
        assert_eq!(tags, vec!["youtube"]);
    }

    #[tokio::test]
    async fn test_kind_tag_backend_unsupported_yields_no_tags() {
        let tags = KindTagBackend.extract("plain text").await.unwrap();
        assert!(tags.is_empty());
    }
}

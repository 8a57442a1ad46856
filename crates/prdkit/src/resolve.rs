//! Document identifier resolution
//!
//! Locates a document inside a platform's address space from a user-supplied
//! URL. Resolution is pure: no network access happens here.

use crate::error::ReadError;
use crate::types::Platform;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Web root of Google Docs documents
pub const GOOGLE_DOCS_ROOT: &str = "https://docs.google.com";

/// Web root of Notion pages
pub const NOTION_ROOT: &str = "https://www.notion.so";

static CONFLUENCE_PAGE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"pages/(\d+)").expect("valid regex"));

static GOOGLE_DOC_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/document/d/([a-zA-Z0-9_-]+)").expect("valid regex"));

// 32 hex digits, or the same id in 8-4-4-4-12 UUID form
static NOTION_PAGE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)([a-f0-9]{32}|[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12})",
    )
    .expect("valid regex")
});

/// Location of a document within its platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDocument {
    /// Scheme and host the document is served from
    pub root: String,
    /// Platform document identifier
    pub id: String,
}

/// Resolve the document identifier and root address for `url`
///
/// When several identifier-shaped substrings exist, the leftmost wins.
pub fn resolve(platform: Platform, url: &str) -> Result<ResolvedDocument, ReadError> {
    let malformed = || ReadError::MalformedUrl {
        platform,
        url: url.to_string(),
    };

    match platform {
        Platform::Confluence => {
            let parsed = Url::parse(url).map_err(|_| malformed())?;
            let origin = parsed.origin();
            if !origin.is_tuple() {
                return Err(malformed());
            }
            let id = CONFLUENCE_PAGE_ID
                .captures(url)
                .and_then(|caps| caps.get(1))
                .ok_or_else(malformed)?;
            Ok(ResolvedDocument {
                root: origin.ascii_serialization(),
                id: id.as_str().to_string(),
            })
        }
        Platform::GoogleDocs => {
            let id = GOOGLE_DOC_ID
                .captures(url)
                .and_then(|caps| caps.get(1))
                .ok_or_else(malformed)?;
            Ok(ResolvedDocument {
                root: GOOGLE_DOCS_ROOT.to_string(),
                id: id.as_str().to_string(),
            })
        }
        Platform::Notion => {
            let id = NOTION_PAGE_ID.find(url).ok_or_else(malformed)?;
            Ok(ResolvedDocument {
                root: NOTION_ROOT.to_string(),
                id: id.as_str().replace('-', ""),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confluence_cloud_url() {
        let resolved = resolve(
            Platform::Confluence,
            "https://acme.atlassian.net/wiki/spaces/ENG/pages/123456789/Project+Plan",
        )
        .unwrap();
        assert_eq!(resolved.id, "123456789");
        assert_eq!(resolved.root, "https://acme.atlassian.net");
    }

    #[test]
    fn test_confluence_keeps_port() {
        let resolved =
            resolve(Platform::Confluence, "http://localhost:8090/pages/42?focus=1").unwrap();
        assert_eq!(resolved.id, "42");
        assert_eq!(resolved.root, "http://localhost:8090");
    }

    #[test]
    fn test_confluence_first_match_wins() {
        let resolved =
            resolve(Platform::Confluence, "https://wiki.example.com/pages/7/pages/8").unwrap();
        assert_eq!(resolved.id, "7");
    }

    #[test]
    fn test_confluence_malformed() {
        let err = resolve(
            Platform::Confluence,
            "https://wiki.example.com/display/ENG/Plan",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ReadError::MalformedUrl {
                platform: Platform::Confluence,
                ..
            }
        ));

        // Not a URL at all
        assert!(resolve(Platform::Confluence, "pages/123").is_err());
    }

    #[test]
    fn test_google_doc_url() {
        let resolved = resolve(
            Platform::GoogleDocs,
            "https://docs.google.com/document/d/1AbC-d_EfG123/edit#heading=h.x",
        )
        .unwrap();
        assert_eq!(resolved.id, "1AbC-d_EfG123");
        assert_eq!(resolved.root, "https://docs.google.com");
    }

    #[test]
    fn test_google_doc_root_is_fixed() {
        let resolved = resolve(
            Platform::GoogleDocs,
            "https://mirror.example.org/document/d/xyz/view",
        )
        .unwrap();
        assert_eq!(resolved.root, GOOGLE_DOCS_ROOT);
    }

    #[test]
    fn test_google_doc_malformed() {
        assert!(resolve(
            Platform::GoogleDocs,
            "https://docs.google.com/spreadsheets/d/abc/edit"
        )
        .is_err());
    }

    #[test]
    fn test_notion_compact_and_hyphenated_match() {
        let compact = resolve(
            Platform::Notion,
            "https://www.notion.so/acme/Checkout-0123456789abcdef0123456789abcdef",
        )
        .unwrap();
        let hyphenated = resolve(
            Platform::Notion,
            "https://www.notion.so/01234567-89ab-cdef-0123-456789abcdef",
        )
        .unwrap();
        assert_eq!(compact.id, "0123456789abcdef0123456789abcdef");
        assert_eq!(compact.id, hyphenated.id);
        assert_eq!(compact.root, NOTION_ROOT);
    }

    #[test]
    fn test_notion_case_insensitive() {
        let resolved = resolve(
            Platform::Notion,
            "https://acme.notion.site/0123456789ABCDEF0123456789ABCDEF",
        )
        .unwrap();
        assert_eq!(resolved.id, "0123456789ABCDEF0123456789ABCDEF");
    }

    #[test]
    fn test_notion_leftmost_match() {
        let resolved = resolve(
            Platform::Notion,
            "https://www.notion.so/aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa?p=bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb",
        )
        .unwrap();
        assert_eq!(resolved.id, "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
    }

    #[test]
    fn test_notion_malformed() {
        let err = resolve(Platform::Notion, "https://www.notion.so/acme/Short-1234").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot extract Notion document ID from URL: https://www.notion.so/acme/Short-1234"
        );
    }
}

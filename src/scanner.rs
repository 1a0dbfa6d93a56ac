use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::debug;

pub const REPO_HOST: &str = "github.com";

// File listing rows, older and newer GitHub layouts. Markup varies by
// rollout cohort, so both are probed and the larger count wins.
static FILE_ROWS_OLD: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#".js-navigation-item[role="row"]"#).unwrap());
static FILE_ROWS_NEW: Lazy<Selector> = Lazy::new(|| Selector::parse(".react-directory-row").unwrap());

static HEADINGS: Lazy<Selector> = Lazy::new(|| Selector::parse("h2, h3").unwrap());
static LANG_LIST: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".Layout-sidebar .list-style-none li a span.color-fg-default").unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoScan {
    pub file_count: usize,
    pub languages: String,
}

/// Outcome of one scan attempt, as shown in the Repository tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanStatus {
    /// The URL is not a GitHub page; nothing was fetched.
    NotRepoPage,
    /// The page could not be retrieved.
    Unavailable(String),
    /// The page was fetched but declined by the scanner.
    Failed,
    Done(RepoScan),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Complexity {
    pub fn from_file_count(count: usize) -> Self {
        if count > 50 {
            Complexity::High
        } else if count > 10 {
            Complexity::Medium
        } else {
            Complexity::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Complexity::Low => "Low",
            Complexity::Medium => "Medium",
            Complexity::High => "High",
        }
    }
}

/// Loose pre-check used before dispatching a scan.
pub fn looks_like_repo_url(url: &str) -> bool {
    url.contains(REPO_HOST)
}

pub async fn fetch_repo_page(http: &reqwest::Client, url: &str) -> anyhow::Result<String> {
    let response = http.get(url).send().await?.error_for_status()?;
    Ok(response.text().await?)
}

/// Best-effort extraction of repository stats from a GitHub page. Returns
/// `None` when the origin is not github.com; every other shortfall degrades
/// to a partial result rather than an error.
pub fn scan_repo_page(url: &str, html: &str) -> Option<RepoScan> {
    let parsed = reqwest::Url::parse(url).ok()?;
    if parsed.host_str() != Some(REPO_HOST) {
        return None;
    }

    let doc = Html::parse_document(html);

    let old_rows = doc.select(&FILE_ROWS_OLD).count();
    let new_rows = doc.select(&FILE_ROWS_NEW).count();
    let file_count = old_rows.max(new_rows);
    debug!(old_rows, new_rows, "file listing row counts");

    Some(RepoScan {
        file_count,
        languages: detect_languages(&doc),
    })
}

fn detect_languages(doc: &Html) -> String {
    let has_header = doc
        .select(&HEADINGS)
        .any(|h| h.text().collect::<String>().contains("Languages"));
    if has_header {
        let names: Vec<String> = doc
            .select(&LANG_LIST)
            .map(|s| s.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if !names.is_empty() {
            return names.join(", ");
        }
    }
    "Unknown".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const REPO_URL: &str = "https://github.com/heroheman/codesplain";

    fn old_layout_rows(n: usize) -> String {
        r#"<div class="js-navigation-item" role="row">file</div>"#.repeat(n)
    }

    fn new_layout_rows(n: usize) -> String {
        r#"<div class="react-directory-row">file</div>"#.repeat(n)
    }

    #[test]
    fn non_matching_origin_fails_closed() {
        let html = format!("<html><body>{}</body></html>", old_layout_rows(3));
        assert_eq!(scan_repo_page("https://gitlab.com/a/b", &html), None);
        // Host must match exactly, subdomains included.
        assert_eq!(scan_repo_page("https://www.github.com/a/b", &html), None);
        assert_eq!(scan_repo_page("not a url", &html), None);
    }

    #[test]
    fn takes_the_larger_of_the_two_layout_counts() {
        let html = format!(
            "<html><body>{}{}</body></html>",
            old_layout_rows(4),
            new_layout_rows(7)
        );
        let scan = scan_repo_page(REPO_URL, &html).unwrap();
        assert_eq!(scan.file_count, 7);
    }

    #[test]
    fn counts_either_layout_on_its_own() {
        let old = format!("<html><body>{}</body></html>", old_layout_rows(5));
        assert_eq!(scan_repo_page(REPO_URL, &old).unwrap().file_count, 5);

        let new = format!("<html><body>{}</body></html>", new_layout_rows(2));
        assert_eq!(scan_repo_page(REPO_URL, &new).unwrap().file_count, 2);
    }

    #[test]
    fn languages_come_from_the_sidebar_list() {
        let html = r#"<html><body>
            <h2>Languages</h2>
            <div class="Layout-sidebar"><ul class="list-style-none">
                <li><a><span class="color-fg-default">Rust</span></a></li>
                <li><a><span class="color-fg-default">Shell</span></a></li>
            </ul></div>
        </body></html>"#;
        let scan = scan_repo_page(REPO_URL, html).unwrap();
        assert_eq!(scan.languages, "Rust, Shell");
    }

    #[test]
    fn missing_languages_heading_yields_unknown() {
        let html = r#"<html><body>
            <div class="Layout-sidebar"><ul class="list-style-none">
                <li><a><span class="color-fg-default">Rust</span></a></li>
            </ul></div>
        </body></html>"#;
        let scan = scan_repo_page(REPO_URL, html).unwrap();
        assert_eq!(scan.languages, "Unknown");
    }

    #[test]
    fn heading_without_sidebar_list_yields_unknown() {
        let html = "<html><body><h3>Languages</h3></body></html>";
        let scan = scan_repo_page(REPO_URL, html).unwrap();
        assert_eq!(scan.languages, "Unknown");
        assert_eq!(scan.file_count, 0);
    }

    #[test]
    fn complexity_tiers_match_the_thresholds() {
        assert_eq!(Complexity::from_file_count(75), Complexity::High);
        assert_eq!(Complexity::from_file_count(30), Complexity::Medium);
        assert_eq!(Complexity::from_file_count(5), Complexity::Low);
        // Boundaries are strict.
        assert_eq!(Complexity::from_file_count(51), Complexity::High);
        assert_eq!(Complexity::from_file_count(50), Complexity::Medium);
        assert_eq!(Complexity::from_file_count(11), Complexity::Medium);
        assert_eq!(Complexity::from_file_count(10), Complexity::Low);
    }

    #[test]
    fn repo_url_precheck_is_a_loose_substring() {
        assert!(looks_like_repo_url("https://github.com/foo/bar"));
        assert!(!looks_like_repo_url("https://example.com/foo"));
    }
}

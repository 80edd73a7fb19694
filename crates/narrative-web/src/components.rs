//! UI Components

use leptos::prelude::*;
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

use crate::api::{AnalysisResult, GroundingSource};

/// At most this many citations are shown
const MAX_SOURCES: usize = 6;

/// Replacement for link and image targets that fail [`is_safe_url`]
const BLOCKED_URL: &str = "#";

/// Render report markdown to HTML.
///
/// The report is model output built from arbitrary web pages, so raw HTML is
/// emitted as escaped text and only web or relative link targets survive.
pub fn render_markdown(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH)
        .map(sanitize);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

fn sanitize(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link { link_type, dest_url, title, id }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_dest(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image { link_type, dest_url, title, id }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_dest(dest_url),
            title,
            id,
        }),
        other => other,
    }
}

fn safe_dest(dest: CowStr<'_>) -> CowStr<'_> {
    if is_safe_url(&dest) {
        dest
    } else {
        CowStr::Borrowed(BLOCKED_URL)
    }
}

/// http(s), mailto, or a relative reference
pub fn is_safe_url(uri: &str) -> bool {
    match url::Url::parse(uri) {
        Ok(url) => matches!(url.scheme(), "http" | "https" | "mailto"),
        Err(url::ParseError::RelativeUrlWithoutBase) => true,
        Err(_) => false,
    }
}

/// Hostname shown under a source title; the raw uri when it does not parse
pub fn display_host(uri: &str) -> String {
    url::Url::parse(uri)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| uri.to_string())
}

/// Fake terminal lines shown while analyzing
#[component]
pub fn LoadingLog() -> impl IntoView {
    view! {
        <div class="loading-log">
            <div class="line">
                <span class="prompt">"➜"</span>
                <span>"Connecting to Mainnet... " <span class="ok">"OK"</span></span>
            </div>
            <div class="line pulse">
                <span class="prompt">"➜"</span>
                <span>"Scanning Social Sentiment..."</span>
            </div>
            <div class="line pulse">
                <span class="prompt">"➜"</span>
                <span>"Validating Contract Narrative..."</span>
            </div>
        </div>
    }
}

#[component]
pub fn ErrorBanner(message: String) -> impl IntoView {
    view! {
        <div class="error-banner">
            <h4>"System Error"</h4>
            <p>{message}</p>
        </div>
    }
}

#[component]
pub fn SourceLink(source: GroundingSource) -> impl IntoView {
    let host = display_host(&source.uri);
    let href = if is_safe_url(&source.uri) { source.uri } else { BLOCKED_URL.to_string() };

    view! {
        <a class="source" href=href target="_blank" rel="noopener noreferrer">
            <div class="source-title">{source.title}</div>
            <div class="source-host">{host}</div>
        </a>
    }
}

/// Markdown report plus "Sources / Intel" grid
#[component]
pub fn ResultCard(result: AnalysisResult) -> impl IntoView {
    let body = render_markdown(&result.markdown);
    let sources: Vec<GroundingSource> = result.sources.into_iter().take(MAX_SOURCES).collect();
    let has_sources = !sources.is_empty();

    view! {
        <div class="result">
            <div class="terminal">
                <div class="terminal-bar">"ANALYSIS_OUTPUT.MD"</div>
                <article class="report" inner_html=body></article>
            </div>
            <Show when=move || has_sources>
                <h3 class="sources-heading">"Sources / Intel"</h3>
            </Show>
            <div class="sources">
                {sources
                    .into_iter()
                    .map(|source| view! { <SourceLink source=source /> })
                    .collect_view()}
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_headings() {
        let html = render_markdown("## 🧬 核心叙事 (Core Narrative)\n青蛙");
        assert!(html.contains("<h2>🧬 核心叙事 (Core Narrative)</h2>"));
        assert!(html.contains("<p>青蛙</p>"));
    }

    #[test]
    fn test_display_host() {
        assert_eq!(display_host("https://x.com/a/status/1"), "x.com");
        assert_eq!(display_host("not a uri"), "not a uri");
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let html = render_markdown(
            "## 核心叙事\n<img src=x onerror=\"alert(document.cookie)\">\n\ntext <b onclick=\"x()\">bold</b>",
        );
        assert!(html.contains("<h2>核心叙事</h2>"));
        assert!(!html.contains("<img"));
        assert!(!html.contains("<b "));
        assert!(html.contains("&lt;img"));
        assert!(html.contains("&lt;b"));
    }

    #[test]
    fn test_unsafe_link_targets_are_blocked() {
        let html = render_markdown(
            "[click](javascript:alert(1)) ![pic](data:text/html,x) [ok](https://dexscreener.com)",
        );
        assert!(!html.contains("javascript:"));
        assert!(!html.contains("data:"));
        assert!(html.contains(r##"<a href="#">click</a>"##));
        assert!(html.contains(r#"<a href="https://dexscreener.com">ok</a>"#));
    }

    #[test]
    fn test_is_safe_url() {
        assert!(is_safe_url("https://x.com/a"));
        assert!(is_safe_url("mailto:dev@example.com"));
        assert!(is_safe_url("/relative/path"));
        assert!(!is_safe_url("javascript:alert(1)"));
        assert!(!is_safe_url(" JavaScript:alert(1)"));
        assert!(!is_safe_url("vbscript:msgbox"));
    }
}

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::Client;
use serde::Deserialize;

use super::Post;
use crate::error::{PipelineError, Result};

/// Connection settings for a Mastodon-compatible instance.
#[derive(Debug, Clone)]
pub struct TagTimelineOptions {
    /// Base URL, e.g. `https://mastodon.social`.
    pub instance: String,
    /// Statuses requested per page (the API caps this at 40).
    pub page_size: usize,
    /// Per-request timeout.
    pub timeout: Duration,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for TagTimelineOptions {
    fn default() -> Self {
        Self {
            instance: "https://mastodon.social".into(),
            page_size: 40,
            timeout: Duration::from_secs(30),
            user_agent: concat!("emotion-pipelines/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Status {
    id: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    content: String,
}

/// Public hashtag timeline, newest first, fetched page by page as it is consumed.
///
/// ```rust,no_run
/// use emotion_pipelines::source::{take_posts, TagTimeline, TagTimelineOptions};
///
/// # fn main() -> emotion_pipelines::error::Result<()> {
/// let timeline = TagTimeline::new("mental health", &TagTimelineOptions::default())?;
/// for post in take_posts(timeline, 100)? {
///     println!("{:?}: {}", post.timestamp, post.text);
/// }
/// # Ok(())
/// # }
/// ```
pub struct TagTimeline {
    client: Client,
    url: String,
    page_size: usize,
    max_id: Option<String>,
    buffer: VecDeque<Post>,
    exhausted: bool,
}

impl TagTimeline {
    /// Prepare a timeline for the hashtag derived from `query`. No request is made yet.
    pub fn new(query: &str, options: &TagTimelineOptions) -> Result<Self> {
        let tag = hashtag_for_query(query);
        if tag.is_empty() {
            return Err(PipelineError::Source(format!(
                "Query '{query}' contains no hashtag characters"
            )));
        }

        let client = Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            url: format!(
                "{}/api/v1/timelines/tag/{}",
                options.instance.trim_end_matches('/'),
                tag
            ),
            page_size: options.page_size.clamp(1, 40),
            max_id: None,
            buffer: VecDeque::new(),
            exhausted: false,
        })
    }

    fn fetch_page(&mut self) -> Result<()> {
        let mut request = self
            .client
            .get(&self.url)
            .query(&[("limit", self.page_size.to_string())]);
        if let Some(max_id) = &self.max_id {
            request = request.query(&[("max_id", max_id)]);
        }

        tracing::debug!(url = %self.url, max_id = ?self.max_id, "fetching timeline page");
        let statuses: Vec<Status> = request.send()?.error_for_status()?.json()?;

        if statuses.is_empty() {
            self.exhausted = true;
            return Ok(());
        }

        self.max_id = statuses.last().map(|s| s.id.clone());
        self.buffer.extend(into_posts(statuses));
        Ok(())
    }
}

impl Iterator for TagTimeline {
    type Item = Result<Post>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.buffer.is_empty() {
            if self.exhausted {
                return None;
            }
            if let Err(e) = self.fetch_page() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }
        self.buffer.pop_front().map(Ok)
    }
}

fn into_posts(statuses: Vec<Status>) -> impl Iterator<Item = Post> {
    statuses.into_iter().map(|s| Post {
        timestamp: Some(s.created_at),
        text: flatten_html(&s.content),
    })
}

/// Hashtag for a free-text query: `"Mental Health"` becomes `"mentalhealth"`.
pub fn hashtag_for_query(query: &str) -> String {
    query
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .flat_map(char::to_lowercase)
        .collect()
}

static LINE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>|</p>").expect("valid line break pattern"));
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));
static NUMERIC_ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&#(?:[xX]([0-9A-Fa-f]{1,6})|([0-9]{1,7}));").expect("valid entity pattern")
});

/// Turn status HTML into plain text.
///
/// Decimal and hex character references are decoded along with the common
/// named entities. `&amp;` goes last so escaped references stay literal.
pub fn flatten_html(html: &str) -> String {
    let text = LINE_BREAK.replace_all(html, "\n");
    let text = TAG.replace_all(&text, "");
    let text = NUMERIC_ENTITY.replace_all(&text, |caps: &regex::Captures<'_>| {
        let code = match (caps.get(1), caps.get(2)) {
            (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
            (_, Some(dec)) => dec.as_str().parse().ok(),
            _ => None,
        };
        match code.and_then(char::from_u32) {
            Some(c) => c.to_string(),
            None => caps[0].to_string(),
        }
    });
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashtag_drops_spaces_and_markers() {
        assert_eq!(hashtag_for_query("mental health"), "mentalhealth");
        assert_eq!(hashtag_for_query("#Rust_Lang!"), "rust_lang");
        assert_eq!(hashtag_for_query("  "), "");
    }

    #[test]
    fn html_is_flattened() {
        let html = r#"<p>Feeling <span class="h-card"><a href="https://x.y/@bob">@<span>bob</span></a></span> &amp; friends</p><p>second<br/>line &quot;ok&quot;</p>"#;
        assert_eq!(
            flatten_html(html),
            "Feeling @bob & friends\nsecond\nline \"ok\""
        );
    }

    #[test]
    fn escaped_ampersand_entities_decode_once() {
        assert_eq!(flatten_html("&amp;lt;"), "&lt;");
        assert_eq!(flatten_html("&amp;#39;"), "&#39;");
    }

    #[test]
    fn numeric_character_references_are_decoded() {
        assert_eq!(
            flatten_html("<p>it&#8217;s &#x27;fine&#X27; &#39;ok&#39; &#x1F642;</p>"),
            "it\u{2019}s 'fine' 'ok' \u{1F642}"
        );
    }

    #[test]
    fn invalid_character_references_stay_literal() {
        assert_eq!(flatten_html("&#xD800; &#1114112;"), "&#xD800; &#1114112;");
    }

    #[test]
    fn status_page_becomes_posts() {
        let body = r#"[
            {"id": "112", "created_at": "2024-03-01T10:15:00.000Z", "content": "<p>so happy today</p>", "visibility": "public"},
            {"id": "111", "created_at": "2024-03-01T09:00:00Z", "content": ""}
        ]"#;
        let statuses: Vec<Status> = serde_json::from_str(body).unwrap();
        let posts: Vec<Post> = into_posts(statuses).collect();

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].text, "so happy today");
        assert_eq!(
            posts[0].timestamp.unwrap().to_rfc3339(),
            "2024-03-01T10:15:00+00:00"
        );
        assert_eq!(posts[1].text, "");
    }

    #[test]
    fn blank_query_is_rejected_before_any_request() {
        let err = TagTimeline::new("!!!", &TagTimelineOptions::default()).err();
        assert!(matches!(err, Some(PipelineError::Source(_))));
    }
}

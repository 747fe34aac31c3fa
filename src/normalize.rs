//! Social-media text cleanup applied before batch classification.
//!
//! ```rust
//! use emotion_pipelines::normalize::normalize;
//!
//! assert_eq!(
//!     normalize("Check http://x.com #mentalhealth @bob"),
//!     "check mentalhealth"
//! );
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

static URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)https?\S+|www\S+").expect("valid URL pattern"));

static MENTION_OR_HASH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@\w+|#").expect("valid mention pattern"));

// Word characters are ASCII-only so the output stays within [a-z0-9_\s].
static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9A-Za-z_\s]").expect("valid punctuation pattern"));

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Strip URLs, mentions, `#` markers and punctuation, then lowercase and
/// collapse whitespace.
///
/// Total over any input and idempotent: a removal can expose a new URL-like
/// token (`"h.ttpx"` becomes `"httpx"`), so cleaning repeats until the text
/// stops changing.
pub fn normalize(raw: &str) -> String {
    let mut current = clean_once(raw);
    loop {
        let next = clean_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_once(text: &str) -> String {
    let text = URL.replace_all(text, "");
    let text = MENTION_OR_HASH.replace_all(&text, "");
    let text = NON_WORD.replace_all(&text, "");
    let text = text.to_ascii_lowercase();
    WHITESPACE_RUN.replace_all(text.trim(), " ").into_owned()
}

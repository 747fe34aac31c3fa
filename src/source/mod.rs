//! Where batch-mode posts come from.
//!
//! A source is any finite, non-restartable iterator of `Result<Post>`. Errors
//! are [`PipelineError::Source`](crate::error::PipelineError::Source) and abort
//! the batch that pulls them.

mod csv_file;
mod mastodon;

pub use csv_file::CsvPostSource;
pub use mastodon::{flatten_html, hashtag_for_query, TagTimeline, TagTimelineOptions};

use chrono::{DateTime, Utc};

use crate::error::Result;

/// A short timestamped post.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    /// When the post was published, if the source knows.
    pub timestamp: Option<DateTime<Utc>>,
    /// Post body as plain text.
    pub text: String,
}

impl Post {
    /// A post without a timestamp.
    pub fn untimed(text: impl Into<String>) -> Self {
        Self {
            timestamp: None,
            text: text.into(),
        }
    }
}

/// Pull at most `max_posts` posts, stopping at the first error.
pub fn take_posts<I>(source: I, max_posts: usize) -> Result<Vec<Post>>
where
    I: IntoIterator<Item = Result<Post>>,
{
    source.into_iter().take(max_posts).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    #[test]
    fn take_posts_respects_the_cap() {
        let source = (0..10).map(|i| Ok(Post::untimed(format!("post {i}"))));
        let posts = take_posts(source, 3).unwrap();
        assert_eq!(posts.len(), 3);
        assert_eq!(posts[2].text, "post 2");
    }

    #[test]
    fn take_posts_stops_at_first_error() {
        let source = vec![
            Ok(Post::untimed("fine")),
            Err(PipelineError::Source("rate limited".into())),
            Ok(Post::untimed("never seen")),
        ];
        assert!(matches!(
            take_posts(source, 10),
            Err(PipelineError::Source(_))
        ));
    }

    #[test]
    fn errors_past_the_cap_are_not_pulled() {
        let source = vec![
            Ok(Post::untimed("a")),
            Err(PipelineError::Source("boom".into())),
        ];
        assert_eq!(take_posts(source, 1).unwrap().len(), 1);
    }
}

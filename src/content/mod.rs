use chrono::NaiveDateTime;

pub mod loader;
pub mod parsing_utils;
pub mod post_source;

/// A post as rendered by the site. Read-only once fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub link: String,
    pub title: String,
    pub author: String,
    pub tags: Vec<String>,
    pub timestamp: NaiveDateTime,
    /// Body already rendered to HTML.
    pub body: String,
}

#[derive(Debug, Clone, Eq, Hash, PartialEq)]
pub struct PostId(pub String);

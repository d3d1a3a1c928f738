use std::io;

use spdlog::info;

use crate::config;
use crate::config::SourceKind;
use crate::content::post_source::PostSource;
use crate::content::Post;

/// Fetches the posts once, before the first render.
/// Failures are returned as they are; nothing is retried.
pub struct ContentLoader {
    source: PostSource,
}

impl ContentLoader {
    pub fn new(source: PostSource) -> Self {
        ContentLoader { source }
    }

    pub fn from_config(content: &config::Content) -> Self {
        let source = match content.source {
            SourceKind::Json => PostSource::Json(content.location.clone()),
            SourceKind::Directory => PostSource::Directory(content.location.clone()),
        };
        Self::new(source)
    }

    pub fn source(&self) -> &PostSource {
        &self.source
    }

    pub async fn load(&self) -> io::Result<Vec<Post>> {
        let posts = self.source.fetch().await?;
        info!("Loaded {} posts from {:?}", posts.len(), self.source);
        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_from_config() {
        let content = config::Content {
            source: SourceKind::Directory,
            location: PathBuf::from("posts"),
        };
        let loader = ContentLoader::from_config(&content);
        assert_eq!(loader.source(), &PostSource::Directory(PathBuf::from("posts")));
    }

    #[tokio::test]
    async fn test_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.json");
        std::fs::write(&path, r#"[{"title": "One", "body": "1", "timestamp": "2019-03-04 05:06:07"}]"#).unwrap();

        let posts = ContentLoader::new(PostSource::Json(path)).load().await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].link, "one");
    }
}

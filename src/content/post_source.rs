use std::io;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use spdlog::debug;

use crate::content::parsing_utils::{collect_lines, parse_post_header, parse_title_markdown, render_markdown};
use crate::content::{Post, PostId};
use crate::text_utils::{parse_date_time, slugify};

/// Where the posts come from. Both variants keep the order the source gives them.
#[derive(Debug, Clone, PartialEq)]
pub enum PostSource {
    /// A bundled JSON array of post records.
    Json(PathBuf),
    /// A directory of markdown posts, read in file name order.
    Directory(PathBuf),
}

#[derive(Deserialize)]
struct PostRecord {
    id: Option<String>,
    title: String,
    body: String,
    timestamp: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    tags: Vec<String>,
}

impl PostSource {
    pub async fn fetch(&self) -> io::Result<Vec<Post>> {
        match self {
            PostSource::Json(path) => {
                let raw = tokio::fs::read_to_string(path).await?;
                parse_json_posts(path, &raw)
            }
            PostSource::Directory(dir) => {
                let mut files = vec![];
                let mut entries = tokio::fs::read_dir(dir).await?;
                while let Some(entry) = entries.next_entry().await? {
                    if !entry.file_type().await?.is_file() {
                        continue;
                    }
                    let path = entry.path();
                    if path.extension().map(|ext| ext == "md").unwrap_or(false) {
                        files.push(path);
                    }
                }
                files.sort();

                let mut posts = Vec::with_capacity(files.len());
                for file in files {
                    let raw = tokio::fs::read_to_string(&file).await?;
                    posts.push(parse_markdown_post(&file, &raw)?);
                }
                Ok(posts)
            }
        }
    }
}

fn parse_json_posts(path: &Path, raw: &str) -> io::Result<Vec<Post>> {
    let records: Vec<PostRecord> = serde_json::from_str(raw)
        .map_err(|e| io::Error::new(ErrorKind::InvalidData, format!("Error parsing posts from {}: {}", path.display(), e)))?;

    let mut posts = Vec::with_capacity(records.len());
    for record in records {
        let timestamp = parse_date_time(&record.timestamp)
            .map_err(|e| io::Error::new(ErrorKind::InvalidData, format!("{} - post={}", e, record.title)))?;
        let link = slugify(&record.title);
        let id = record.id.unwrap_or_else(|| link.clone());
        debug!("Loaded post {} from {}", link, path.display());

        posts.push(Post {
            id: PostId(id),
            link,
            body: render_markdown(&record.body)?,
            title: record.title,
            author: record.author,
            tags: record.tags,
            timestamp,
        });
    }

    Ok(posts)
}

fn parse_markdown_post(file_name: &Path, raw: &str) -> io::Result<Post> {
    let (header, lines, maybe_line) = parse_post_header(file_name, raw.lines())?;
    let (title, lines) = parse_title_markdown(lines, maybe_line);
    let body = render_markdown(&collect_lines(lines))?;

    let link = match file_name.file_stem() {
        Some(stem) => slugify(&stem.to_string_lossy()),
        None => slugify(&title),
    };
    let id = if header.id.is_empty() { link.clone() } else { header.id };

    Ok(Post {
        id: PostId(id),
        link,
        title,
        author: header.author,
        tags: header.tags,
        timestamp: header.date,
        body,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const POSTS_JSON: &str = r##"[
  {"title": "Second thoughts", "body": "Later *post*", "timestamp": "2018-01-02 09:00:00"},
  {"id": "p-1", "title": "Hello, World", "body": "First post", "timestamp": "2017-09-10 10:42:32", "tags": ["intro"]}
]"##;

    #[test]
    fn test_parse_json_keeps_source_order() {
        let posts = parse_json_posts(Path::new("posts.json"), POSTS_JSON).unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].title, "Second thoughts");
        assert_eq!(posts[0].id, PostId("second-thoughts".to_string()));
        assert!(posts[0].body.contains("<em>post</em>"));
        assert_eq!(posts[1].link, "hello-world");
        assert_eq!(posts[1].id, PostId("p-1".to_string()));
        assert_eq!(posts[1].tags, vec!["intro".to_string()]);
    }

    #[test]
    fn test_parse_json_bad_timestamp() {
        let raw = r#"[{"title": "t", "body": "b", "timestamp": "soon"}]"#;
        let err = parse_json_posts(Path::new("posts.json"), raw).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn test_parse_markdown_post() {
        let raw = "[ID]: # (abc)\n[DATE]: # (2020-05-22 10:54:25.000)\n[AUTHOR]: # (daniel)\n[TAGS]: # (rust web)\n\n# A title\nSome **body**\n";
        let post = parse_markdown_post(Path::new("posts/20200522_a_title.md"), raw).unwrap();
        assert_eq!(post.id, PostId("abc".to_string()));
        assert_eq!(post.link, "20200522-a-title");
        assert_eq!(post.title, "A title");
        assert_eq!(post.author, "daniel");
        assert_eq!(post.tags, vec!["rust".to_string(), "web".to_string()]);
        assert!(post.body.contains("<strong>body</strong>"));
    }

    #[tokio::test]
    async fn test_fetch_directory_in_file_name_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.md"), "[DATE]: # (2020-01-01 00:00:00)\n# Bravo\nb\n").unwrap();
        fs::write(dir.path().join("a.md"), "[DATE]: # (2021-01-01 00:00:00)\n# Alpha\na\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let posts = PostSource::Directory(dir.path().to_path_buf()).fetch().await.unwrap();
        let titles: Vec<_> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["Alpha", "Bravo"]);
    }

    #[tokio::test]
    async fn test_fetch_missing_json() {
        let err = PostSource::Json(PathBuf::from("does/not/exist.json")).fetch().await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}

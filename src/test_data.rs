use chrono::{Duration, NaiveDate};

use crate::content::{Post, PostId};

/// `count` posts, one day apart starting on 2020-01-01, linked `post-{i}`.
pub fn sample_posts(count: usize) -> Vec<Post> {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(8, 30, 0).unwrap();
    (0..count)
        .map(|i| Post {
            id: PostId(format!("id-{}", i)),
            link: format!("post-{}", i),
            title: format!("Post number {}", i),
            author: "Daniel".to_string(),
            tags: vec!["rust".to_string()],
            timestamp: start + Duration::days(i as i64),
            body: format!("<p>Body of post {}</p>", i),
        })
        .collect()
}

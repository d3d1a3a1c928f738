use std::io;

use serde::Deserialize;

use crate::content::Post;
use crate::render::component::{Component, RenderContext};
use crate::render::router::{post_href, Route};
use crate::render::style::Styled;
use crate::render::{AppProps, SiteInfo};
use crate::text_utils::{format_date_time, format_long_date};

pub static TIMESTAMP: Styled = Styled::new("color: red; font-size: 16px; font-style: italic;");

const LINKEDIN_PATH: &str = "M349 911v-991h-330v991h330zM370 1217q1 -73 -50.5 -122t-135.5 -49h-2q-82 0 -132 49t-50 122q0 74 51.5 122.5t134.5 48.5t133 -48.5t51 -122.5zM1536 488v-568h-329v530q0 105 -40.5 164.5t-126.5 59.5q-63 0 -105.5 -34.5t-63.5 -85.5q-11 -30 -11 -81v-553h-329 q2 399 2 647t-1 296l-1 48h329v-144h-2q20 32 41 56t56.5 52t87 43.5t114.5 15.5q171 0 275 -113.5t104 -332.5z";
const TWITTER_PATH: &str = "M1620 1128q-67 -98 -162 -167q1 -14 1 -42q0 -130 -38 -259.5t-115.5 -248.5t-184.5 -210.5t-258 -146t-323 -54.5q-271 0 -496 145q35 -4 78 -4q225 0 401 138q-105 2 -188 64.5t-114 159.5q33 -5 61 -5q43 0 85 11q-112 23 -185.5 111.5t-73.5 205.5v4q68 -38 146 -41 q-66 44 -105 115t-39 154q0 88 44 163q121 -149 294.5 -238.5t371.5 -99.5q-8 38 -8 74q0 134 94.5 228.5t228.5 94.5q140 0 236 -102q109 21 205 78q-37 -115 -142 -178q93 10 186 50z";

#[derive(Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
pub enum IconKind {
    LinkedIn,
    Twitter,
}

impl IconKind {
    pub fn path(&self) -> &'static str {
        match self {
            IconKind::LinkedIn => LINKEDIN_PATH,
            IconKind::Twitter => TWITTER_PATH,
        }
    }
}

#[derive(ramhorns::Content)]
struct AppView<'a> {
    header: &'a str,
    main: &'a str,
}

#[derive(ramhorns::Content)]
struct HeaderView<'a> {
    home: &'a str,
    title: &'a str,
    author: &'a str,
    description: &'a str,
    links: Vec<LinkView<'a>>,
}

#[derive(ramhorns::Content)]
struct LinkView<'a> {
    title: &'a str,
    href: &'a str,
    path: &'a str,
}

#[derive(ramhorns::Content)]
struct PostView<'a> {
    href: String,
    title: &'a str,
    timestamp_class: String,
    datetime: String,
    timestamp: String,
    tags: Vec<TagView<'a>>,
    body: &'a str,
}

#[derive(ramhorns::Content)]
struct TagView<'a> {
    tag: &'a str,
}

/// Root component. Picks the page from the current route.
pub struct App<'a> {
    pub props: &'a AppProps,
}

impl Component for App<'_> {
    fn render(&self, ctx: &mut RenderContext) -> io::Result<String> {
        let header = Header { site: &self.props.site }.render(ctx)?;
        let main = match ctx.route.clone() {
            Route::Home => PostList { posts: &self.props.posts }.render(ctx)?,
            Route::Post(link) => match self.props.posts.iter().find(|p| p.link == link) {
                Some(post) => PostEntry { post }.render(ctx)?,
                None => NotFound.render(ctx)?,
            },
            Route::NotFound(_) => NotFound.render(ctx)?,
        };

        Ok(ctx.templates.app.render(&AppView {
            header: &header,
            main: &main,
        }))
    }
}

pub struct Header<'a> {
    pub site: &'a SiteInfo,
}

impl Component for Header<'_> {
    fn render(&self, ctx: &mut RenderContext) -> io::Result<String> {
        let links = self.site.social.iter()
            .map(|link| LinkView {
                title: &link.title,
                href: &link.href,
                path: link.icon.path(),
            })
            .collect();

        Ok(ctx.templates.header.render(&HeaderView {
            home: "/",
            title: &self.site.title,
            author: &self.site.author,
            description: &self.site.description,
            links,
        }))
    }
}

/// Every post, in the order they were loaded.
pub struct PostList<'a> {
    pub posts: &'a [Post],
}

impl Component for PostList<'_> {
    fn render(&self, ctx: &mut RenderContext) -> io::Result<String> {
        let mut out = String::from("<section class=\"post-list\">");
        for post in self.posts {
            out.push_str(&PostEntry { post }.render(ctx)?);
        }
        out.push_str("</section>");
        Ok(out)
    }
}

pub struct PostEntry<'a> {
    pub post: &'a Post,
}

impl Component for PostEntry<'_> {
    fn render(&self, ctx: &mut RenderContext) -> io::Result<String> {
        let post = self.post;
        let tags = post.tags.iter().map(|t| TagView { tag: t.as_str() }).collect();
        let timestamp_class = ctx.styles.register(&TIMESTAMP);
        let (date, time) = format_date_time(&post.timestamp);

        Ok(ctx.templates.post.render(&PostView {
            href: post_href(&post.link),
            title: &post.title,
            timestamp_class,
            datetime: format!("{}T{}", date, time),
            timestamp: format_long_date(&post.timestamp),
            tags,
            body: &post.body,
        }))
    }
}

struct NotFound;

impl Component for NotFound {
    fn render(&self, _ctx: &mut RenderContext) -> io::Result<String> {
        Ok("<section class=\"not-found\"><h2>Nothing here</h2><a href=\"/\">Back to the posts</a></section>".to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::config::Social;
    use crate::environment::BuildEnv;
    use crate::render::templates::TemplateSet;
    use crate::test_data::sample_posts;

    use super::*;

    fn site() -> SiteInfo {
        SiteInfo {
            title: "Dagneau <dev>".to_string(),
            author: "Daniel".to_string(),
            description: "Notes".to_string(),
            social: vec![Social {
                title: "Twitter".to_string(),
                href: "https://twitter.com/Dagneau".to_string(),
                icon: IconKind::Twitter,
            }],
        }
    }

    #[test]
    fn test_header_escapes_and_links() {
        let templates = TemplateSet::builtin().unwrap();
        let mut ctx = RenderContext::new(&templates, BuildEnv::Production);
        let site = site();
        let html = Header { site: &site }.render(&mut ctx).unwrap();
        assert!(html.contains("Dagneau &lt;dev&gt;"));
        assert!(html.contains("href=\"https://twitter.com/Dagneau\""));
        assert!(html.contains("title=\"Twitter\""));
        assert!(html.contains("M1620 1128"));
    }

    #[test]
    fn test_post_entry_timestamp_is_styled() {
        let templates = TemplateSet::builtin().unwrap();
        let mut ctx = RenderContext::new(&templates, BuildEnv::Production);
        let posts = sample_posts(1);
        let html = PostEntry { post: &posts[0] }.render(&mut ctx).unwrap();
        let class = TIMESTAMP.class_name();
        assert!(html.contains(&format!("<time class=\"{}\" datetime=\"2020-01-01T08:30:00\">January 1, 2020</time>", class)));
        assert!(html.contains("href=\"/post/post-0/\""));
        assert!(!ctx.styles.is_empty());
    }

    #[test]
    fn test_app_routes() {
        let templates = TemplateSet::builtin().unwrap();
        let props = AppProps { site: site(), posts: Arc::new(sample_posts(3)) };

        let mut ctx = RenderContext::new(&templates, BuildEnv::Production);
        let list = App { props: &props }.render(&mut ctx).unwrap();
        assert_eq!(list.matches("<article class=\"post\">").count(), 3);

        let mut ctx = RenderContext::new(&templates, BuildEnv::Production);
        ctx.route = Route::Post("post-1".to_string());
        let single = App { props: &props }.render(&mut ctx).unwrap();
        assert_eq!(single.matches("<article class=\"post\">").count(), 1);
        assert!(single.contains("Post number 1"));

        let mut ctx = RenderContext::new(&templates, BuildEnv::Production);
        ctx.route = Route::Post("missing".to_string());
        let missing = App { props: &props }.render(&mut ctx).unwrap();
        assert!(missing.contains("class=\"not-found\""));
    }
}

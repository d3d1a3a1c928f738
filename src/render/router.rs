use std::io;

use crate::render::component::{Component, RenderContext};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Post(String),
    NotFound(String),
}

impl Route {
    /// `/` is the post listing and `/post/{link}/` a single post.
    pub fn parse(location: &str) -> Route {
        let path = location.split(['?', '#']).next().unwrap_or("");
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            return Route::Home;
        }

        let mut parts = trimmed.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some("post"), Some(link), None) if !link.is_empty() => Route::Post(link.to_string()),
            _ => Route::NotFound(path.to_string()),
        }
    }
}

pub fn post_href(link: &str) -> String {
    format!("/post/{}/", link)
}

/// Routing context: the subtree renders for `location`.
pub struct Router<C> {
    pub location: String,
    pub inner: C,
}

impl<C: Component> Component for Router<C> {
    fn render(&self, ctx: &mut RenderContext) -> io::Result<String> {
        let previous = std::mem::replace(&mut ctx.route, Route::parse(&self.location));
        let rendered = self.inner.render(ctx);
        ctx.route = previous;
        rendered
    }
}

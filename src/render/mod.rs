use std::sync::Arc;

use crate::config::{Site, Social};
use crate::content::Post;
use crate::render::components::App;
use crate::render::hot::HotContainer;
use crate::render::router::Router;
use crate::render::style::StyleRoot;

pub mod component;
pub mod components;
pub mod document;
pub mod hot;
pub mod mount;
pub mod router;
pub mod style;
pub mod templates;

#[derive(Debug, Clone, PartialEq)]
pub struct SiteInfo {
    pub title: String,
    pub author: String,
    pub description: String,
    pub social: Vec<Social>,
}

impl SiteInfo {
    /// Without a configured author the OS user's name is shown.
    pub fn from_config(site: &Site) -> Self {
        let author = match site.author {
            Some(ref author) => author.clone(),
            None => {
                let name = whoami::realname();
                if name.is_empty() { whoami::username() } else { name }
            }
        };

        SiteInfo {
            title: site.title.clone(),
            author,
            description: site.description.clone().unwrap_or_default(),
            social: site.social.clone(),
        }
    }
}

/// Everything the root component renders from.
#[derive(Debug, Clone)]
pub struct AppProps {
    pub site: SiteInfo,
    pub posts: Arc<Vec<Post>>,
}

pub type AppTree<'a> = HotContainer<StyleRoot<Router<App<'a>>>>;

/// Wraps the root component: hot container, then style root, then router.
pub fn compose<'a>(props: &'a AppProps, location: &str) -> AppTree<'a> {
    HotContainer {
        inner: StyleRoot {
            inner: Router {
                location: location.to_string(),
                inner: App { props },
            },
        },
    }
}

use std::io;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use spdlog::info;
use tokio::sync::mpsc;

use crate::content::loader::ContentLoader;
use crate::environment::BuildEnv;
use crate::render::component::RenderContext;
use crate::render::mount::{render, Dom, Element, ROOT_ID};
use crate::render::templates::TemplateSet;
use crate::render::{compose, AppProps, SiteInfo};

const MOUNT_LOCATION: &str = "/";

/// The application mounted in the `root` element, with the props it was
/// mounted with.
pub struct Mounted {
    root: Element,
    props: AppProps,
    templates: TemplateSet,
    env: BuildEnv,
}

/// Loads the posts, then mounts the composed tree into the `root` element.
/// Fetch and render errors are returned unchanged.
pub async fn bootstrap(loader: &ContentLoader, dom: &Dom, site: SiteInfo,
                       templates: TemplateSet, env: BuildEnv) -> io::Result<Mounted> {
    let posts = loader.load().await?;

    let root = dom.get_element_by_id(ROOT_ID)
        .ok_or_else(|| io::Error::new(ErrorKind::NotFound, format!("No element with id {}", ROOT_ID)))?;

    let mounted = Mounted {
        root,
        props: AppProps { site, posts: Arc::new(posts) },
        templates,
        env,
    };
    mounted.render()?;

    Ok(mounted)
}

impl Mounted {
    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn props(&self) -> &AppProps {
        &self.props
    }

    /// Renders again into the same element with the same props.
    pub fn render(&self) -> io::Result<()> {
        let mut ctx = RenderContext::new(&self.templates, self.env);
        render(&compose(&self.props, MOUNT_LOCATION), &mut ctx, &self.root)
    }

    /// Picks up template changes and renders again. Posts are not fetched again.
    pub fn reload(&mut self, template_dir: &Path) -> io::Result<()> {
        self.templates = TemplateSet::load(template_dir)?;
        self.render()
    }

    /// Re-renders on every change notification until the sender goes away.
    /// A failing render ends the loop with its error.
    pub async fn accept_updates(mut self, mut changes: mpsc::Receiver<PathBuf>, template_dir: PathBuf) -> io::Result<()> {
        while let Some(changed) = changes.recv().await {
            info!("{} changed, mounting again", changed.display());
            self.reload(&template_dir)?;
        }
        Ok(())
    }
}

use std::io;

use crate::build::manifest::AssetManifest;
use crate::environment::BuildEnv;
use crate::render::component::{Component, RenderContext};
use crate::render::templates::TemplateSet;
use crate::render::{compose, AppProps};

pub const DOCTYPE: &str = "<!DOCTYPE html>";

#[derive(ramhorns::Content)]
struct DocumentView<'a> {
    title: &'a str,
    description: &'a str,
    styles: Vec<StyleLink<'a>>,
    scripts: Vec<ScriptTag<'a>>,
    root: &'a str,
}

#[derive(ramhorns::Content)]
struct StyleLink<'a> {
    href: &'a str,
}

#[derive(ramhorns::Content)]
struct ScriptTag<'a> {
    src: &'a str,
}

/// The document component: head with the bundled styles, the `root` element
/// holding `root_markup`, then the bundled scripts.
pub struct Html<'a> {
    pub props: &'a AppProps,
    pub manifest: &'a AssetManifest,
    pub root_markup: &'a str,
}

impl Component for Html<'_> {
    fn render(&self, ctx: &mut RenderContext) -> io::Result<String> {
        let styles = self.manifest.styles.iter().map(|href| StyleLink { href }).collect();
        let scripts = self.manifest.scripts.iter().map(|src| ScriptTag { src }).collect();

        Ok(ctx.templates.document.render(&DocumentView {
            title: &self.props.site.title,
            description: &self.props.site.description,
            styles,
            scripts,
            root: self.root_markup,
        }))
    }
}

/// Renders the whole tree for `location` to static markup, once, and wraps it
/// in a complete document.
pub fn render_document(templates: &TemplateSet, env: BuildEnv, props: &AppProps,
                       location: &str, manifest: &AssetManifest) -> io::Result<String> {
    let mut ctx = RenderContext::new(templates, env);
    let root_markup = compose(props, location).render(&mut ctx)?;
    wrap_document(templates, env, props, manifest, &root_markup)
}

/// Wraps already rendered root markup, such as the content of a mounted element.
pub fn wrap_document(templates: &TemplateSet, env: BuildEnv, props: &AppProps,
                     manifest: &AssetManifest, root_markup: &str) -> io::Result<String> {
    let mut ctx = RenderContext::new(templates, env);
    let html = Html { props, manifest, root_markup }.render(&mut ctx)?;
    Ok(format!("{}{}", DOCTYPE, html))
}

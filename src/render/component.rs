use std::io;

use crate::environment::BuildEnv;
use crate::render::router::Route;
use crate::render::style::StyleSheet;
use crate::render::templates::TemplateSet;

/// State threaded through one render pass of the component tree.
pub struct RenderContext<'a> {
    pub templates: &'a TemplateSet,
    pub env: BuildEnv,
    pub route: Route,
    pub styles: StyleSheet,
}

impl<'a> RenderContext<'a> {
    pub fn new(templates: &'a TemplateSet, env: BuildEnv) -> Self {
        RenderContext {
            templates,
            env,
            route: Route::Home,
            styles: StyleSheet::default(),
        }
    }
}

/// A node of the UI tree. Rendering produces static markup.
pub trait Component {
    fn render(&self, ctx: &mut RenderContext) -> io::Result<String>;
}

impl<C: Component + ?Sized> Component for &C {
    fn render(&self, ctx: &mut RenderContext) -> io::Result<String> {
        (**self).render(ctx)
    }
}

/// Siblings, rendered in order.
impl<A: Component, B: Component> Component for (A, B) {
    fn render(&self, ctx: &mut RenderContext) -> io::Result<String> {
        let mut out = self.0.render(ctx)?;
        out.push_str(&self.1.render(ctx)?);
        Ok(out)
    }
}

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::render::component::{Component, RenderContext};

pub const ROOT_ID: &str = "root";

/// Handle to an element of the document. Clones share the same node.
#[derive(Clone, Debug)]
pub struct Element {
    id: String,
    inner_html: Arc<RwLock<String>>,
    generation: Arc<AtomicU64>,
}

impl Element {
    fn new(id: &str) -> Self {
        Element {
            id: id.to_string(),
            inner_html: Arc::new(RwLock::new(String::new())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn inner_html(&self) -> String {
        self.inner_html.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of times content was written into this element.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn replace_children(&self, html: String) {
        let mut inner = self.inner_html.write().unwrap_or_else(|e| e.into_inner());
        *inner = html;
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}

/// The elements a page exposes to the client bootstrap, looked up by id.
#[derive(Default, Clone, Debug)]
pub struct Dom {
    elements: HashMap<String, Element>,
}

impl Dom {
    /// A page with a single, empty `root` element.
    pub fn with_root() -> Self {
        Dom::default().with_element(ROOT_ID)
    }

    pub fn with_element(mut self, id: &str) -> Self {
        self.elements.insert(id.to_string(), Element::new(id));
        self
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<Element> {
        self.elements.get(id).cloned()
    }
}

/// Renders `tree` and replaces the content of `target` with it. On error the
/// element keeps its previous content.
pub fn render<C: Component>(tree: &C, ctx: &mut RenderContext, target: &Element) -> io::Result<()> {
    let html = tree.render(ctx)?;
    target.replace_children(html);
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::environment::BuildEnv;
    use crate::render::templates::TemplateSet;

    use super::*;

    struct Fixed(&'static str);

    impl Component for Fixed {
        fn render(&self, _ctx: &mut RenderContext) -> io::Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct Failing;

    impl Component for Failing {
        fn render(&self, _ctx: &mut RenderContext) -> io::Result<String> {
            Err(io::Error::new(io::ErrorKind::Other, "boom"))
        }
    }

    #[test]
    fn test_render_replaces_content() {
        let templates = TemplateSet::builtin().unwrap();
        let mut ctx = RenderContext::new(&templates, BuildEnv::Production);
        let dom = Dom::with_root();
        let root = dom.get_element_by_id(ROOT_ID).unwrap();

        render(&Fixed("<p>one</p>"), &mut ctx, &root).unwrap();
        render(&Fixed("<p>two</p>"), &mut ctx, &root).unwrap();

        let same_node = dom.get_element_by_id(ROOT_ID).unwrap();
        assert_eq!(same_node.inner_html(), "<p>two</p>");
        assert_eq!(same_node.generation(), 2);
    }

    #[test]
    fn test_render_error_propagates() {
        let templates = TemplateSet::builtin().unwrap();
        let mut ctx = RenderContext::new(&templates, BuildEnv::Production);
        let dom = Dom::with_root();
        let root = dom.get_element_by_id(ROOT_ID).unwrap();

        render(&Fixed("kept"), &mut ctx, &root).unwrap();
        let err = render(&Failing, &mut ctx, &root).err().unwrap();
        assert_eq!(err.to_string(), "boom");
        assert_eq!(root.inner_html(), "kept");
    }

    #[test]
    fn test_unknown_element() {
        assert!(Dom::with_root().get_element_by_id("app").is_none());
        assert!(Dom::default().get_element_by_id(ROOT_ID).is_none());
    }
}

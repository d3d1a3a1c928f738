use std::io;

use crate::render::component::{Component, RenderContext};

/// Development wrapper marking the subtree that is swapped in place when
/// sources change. Transparent outside development.
pub struct HotContainer<C> {
    pub inner: C,
}

impl<C: Component> Component for HotContainer<C> {
    fn render(&self, ctx: &mut RenderContext) -> io::Result<String> {
        let inner = self.inner.render(ctx)?;
        if ctx.env.is_development() {
            Ok(format!("<div data-hot-container=\"true\">{}</div>", inner))
        } else {
            Ok(inner)
        }
    }
}

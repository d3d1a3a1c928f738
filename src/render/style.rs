use std::io;

use sha2::{Digest, Sha256};

use crate::render::component::{Component, RenderContext};

/// A component style. The class name is derived from the declarations, so equal
/// styles share one class.
pub struct Styled {
    pub css: &'static str,
}

impl Styled {
    pub const fn new(css: &'static str) -> Self {
        Styled { css }
    }

    pub fn class_name(&self) -> String {
        let digest = Sha256::digest(self.css.as_bytes());
        let hash = format!("{:x}", digest);
        format!("css-{}", &hash[..8])
    }
}

/// Rules registered during a render pass, in first-use order.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct StyleSheet {
    rules: Vec<(String, String)>,
}

impl StyleSheet {
    pub fn register(&mut self, styled: &Styled) -> String {
        let class_name = styled.class_name();
        if !self.rules.iter().any(|(name, _)| *name == class_name) {
            let declarations = styled.css.split(';')
                .map(|d| d.trim())
                .filter(|d| !d.is_empty())
                .collect::<Vec<_>>()
                .join(";");
            self.rules.push((class_name.clone(), declarations));
        }
        class_name
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn to_css(&self) -> String {
        self.rules.iter()
            .map(|(name, declarations)| format!(".{}{{{}}}", name, declarations))
            .collect()
    }
}

/// Isolates the styles of its subtree: they are collected while the child
/// renders and emitted once, in front of it.
pub struct StyleRoot<C> {
    pub inner: C,
}

impl<C: Component> Component for StyleRoot<C> {
    fn render(&self, ctx: &mut RenderContext) -> io::Result<String> {
        let outer = std::mem::take(&mut ctx.styles);
        let inner = self.inner.render(ctx);
        let styles = std::mem::replace(&mut ctx.styles, outer);
        let inner = inner?;

        if styles.is_empty() {
            return Ok(format!("<div class=\"style-root\">{}</div>", inner));
        }
        Ok(format!("<div class=\"style-root\"><style>{}</style>{}</div>", styles.to_css(), inner))
    }
}

#[cfg(test)]
mod tests {
    use crate::environment::BuildEnv;
    use crate::render::templates::TemplateSet;

    use super::*;

    static RED_TEXT: Styled = Styled::new("color: red; font-style: italic;");

    struct Label;

    impl Component for Label {
        fn render(&self, ctx: &mut RenderContext) -> io::Result<String> {
            let class = ctx.styles.register(&RED_TEXT);
            Ok(format!("<span class=\"{}\">hi</span>", class))
        }
    }

    #[test]
    fn test_class_name_is_stable() {
        let same = Styled::new("color: red; font-style: italic;");
        assert_eq!(RED_TEXT.class_name(), same.class_name());
        assert_ne!(RED_TEXT.class_name(), Styled::new("color: blue;").class_name());
        assert_eq!(RED_TEXT.class_name().len(), "css-".len() + 8);
    }

    #[test]
    fn test_register_once() {
        let mut sheet = StyleSheet::default();
        let a = sheet.register(&RED_TEXT);
        let b = sheet.register(&RED_TEXT);
        assert_eq!(a, b);
        assert_eq!(sheet.to_css(), format!(".{}{{color: red;font-style: italic}}", a));
    }

    #[test]
    fn test_style_root_emits_collected_rules() {
        let templates = TemplateSet::builtin().unwrap();
        let mut ctx = RenderContext::new(&templates, BuildEnv::Production);
        let root = StyleRoot { inner: (Label, Label) };
        let html = root.render(&mut ctx).unwrap();
        let class = RED_TEXT.class_name();
        assert_eq!(html, format!(
            "<div class=\"style-root\"><style>.{c}{{color: red;font-style: italic}}</style><span class=\"{c}\">hi</span><span class=\"{c}\">hi</span></div>",
            c = class
        ));
        assert!(ctx.styles.is_empty());
    }
}

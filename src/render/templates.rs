use std::io;
use std::io::ErrorKind;
use std::path::Path;

use ramhorns::Template;
use spdlog::debug;

pub const APP_TPL: &str = "app.tpl";
pub const HEADER_TPL: &str = "header.tpl";
pub const POST_TPL: &str = "post.tpl";
pub const DOCUMENT_TPL: &str = "document.tpl";

const APP_SRC: &str = include_str!("../../res/template/app.tpl");
const HEADER_SRC: &str = include_str!("../../res/template/header.tpl");
const POST_SRC: &str = include_str!("../../res/template/post.tpl");
const DOCUMENT_SRC: &str = include_str!("../../res/template/document.tpl");

/// Compiled component templates.
pub struct TemplateSet {
    pub app: Template<'static>,
    pub header: Template<'static>,
    pub post: Template<'static>,
    pub document: Template<'static>,
}

fn compile(name: &str, src: String) -> io::Result<Template<'static>> {
    match Template::new(src) {
        Ok(x) => Ok(x),
        Err(e) => Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing template {}: {}", name, e))),
    }
}

fn read_or_builtin(tpl_dir: &Path, name: &str, builtin: &str) -> io::Result<String> {
    let full_path = tpl_dir.join(name);
    if full_path.is_file() {
        debug!("Using template {}", full_path.display());
        std::fs::read_to_string(full_path)
    } else {
        Ok(builtin.to_string())
    }
}

impl TemplateSet {
    pub fn builtin() -> io::Result<TemplateSet> {
        Ok(TemplateSet {
            app: compile(APP_TPL, APP_SRC.to_string())?,
            header: compile(HEADER_TPL, HEADER_SRC.to_string())?,
            post: compile(POST_TPL, POST_SRC.to_string())?,
            document: compile(DOCUMENT_TPL, DOCUMENT_SRC.to_string())?,
        })
    }

    /// Templates found in `tpl_dir` override the built-in ones.
    pub fn load(tpl_dir: &Path) -> io::Result<TemplateSet> {
        Ok(TemplateSet {
            app: compile(APP_TPL, read_or_builtin(tpl_dir, APP_TPL, APP_SRC)?)?,
            header: compile(HEADER_TPL, read_or_builtin(tpl_dir, HEADER_TPL, HEADER_SRC)?)?,
            post: compile(POST_TPL, read_or_builtin(tpl_dir, POST_TPL, POST_SRC)?)?,
            document: compile(DOCUMENT_TPL, read_or_builtin(tpl_dir, DOCUMENT_TPL, DOCUMENT_SRC)?)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[derive(ramhorns::Content)]
    struct App<'a> {
        header: &'a str,
        main: &'a str,
    }

    #[test]
    fn test_override_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(APP_TPL), "[{{{header}}}|{{{main}}}]").unwrap();

        let templates = TemplateSet::load(dir.path()).unwrap();
        let rendered = templates.app.render(&App { header: "<h/>", main: "<m/>" });
        assert_eq!(rendered, "[<h/>|<m/>]");

        let builtin = TemplateSet::builtin().unwrap();
        let rendered = builtin.app.render(&App { header: "<h/>", main: "<m/>" });
        assert!(rendered.starts_with("<div class=\"app\"><h/>"));
    }

    #[test]
    fn test_missing_dir_uses_builtin() {
        assert!(TemplateSet::load(Path::new("no/such/dir")).is_ok());
    }
}

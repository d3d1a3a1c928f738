use std::collections::HashSet;
use std::io;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use spdlog::{debug, info, warn};

use crate::build::compilation::{Compilation, Module, ModuleKind, OutputFile, PUBLIC_URL_PREFIX};
use crate::build::manifest::{AssetManifest, MANIFEST_FILE};
use crate::build::plugins::{plugins_for, BuildPaths, Inject, Plugin, Stage};
use crate::environment::BuildEnv;

pub const HOT_RUNTIME_PATH: &str = "__folio/hot-runtime.js";
pub const HOT_ENDPOINT: &str = "/__hmr";

const ENDPOINT_PLACEHOLDER: &str = "__ENDPOINT__";
const HOT_RUNTIME: &str = r#"(function () {
  var endpoint = "__ENDPOINT__";
  var current = null;
  function poll() {
    fetch(endpoint).then(function (res) { return res.text(); }).then(function (generation) {
      if (current === null) { current = generation; }
      else if (current !== generation) { window.location.reload(); return; }
      setTimeout(poll, 1000);
    }).catch(function () { setTimeout(poll, 2000); });
  }
  poll();
})();"#;

#[derive(Debug, Default)]
pub struct BuildReport {
    pub skipped: bool,
    pub written: Vec<PathBuf>,
    pub manifest: Option<AssetManifest>,
}

/// Runs a plugin list over the client sources and writes the output directory.
pub struct Bundler {
    env: BuildEnv,
    paths: BuildPaths,
}

impl Bundler {
    pub fn new(env: BuildEnv, paths: BuildPaths) -> Self {
        Bundler { env, paths }
    }

    /// Builds with the plugins selected for the environment.
    pub fn run(&self) -> io::Result<BuildReport> {
        let Some(plugins) = plugins_for(self.env, &self.paths) else {
            info!("Build disabled in {} mode", self.env);
            return Ok(BuildReport { skipped: true, ..Default::default() });
        };
        self.run_with(&plugins)
    }

    pub fn run_with(&self, plugins: &[Plugin]) -> io::Result<BuildReport> {
        info!("Building {} in {} mode with {} plugins", self.paths.source_dir.display(), self.env, plugins.len());
        let mut compilation = Compilation::collect(self.env, &self.paths.source_dir)?;

        for stage in [Stage::Modules, Stage::Optimize] {
            for plugin in plugins.iter().filter(|p| p.stage() == stage) {
                debug!("Applying {}", plugin.name());
                apply(plugin, &mut compilation)?;
            }
        }

        compilation.seal();

        for plugin in plugins.iter().filter(|p| p.stage() == Stage::Emit) {
            debug!("Applying {}", plugin.name());
            apply(plugin, &mut compilation)?;
        }

        for warning in compilation.warnings.iter() {
            warn!("{}", warning);
        }

        let guarded = plugins.iter().any(|p| p.stage() == Stage::Guard);
        if guarded && !compilation.errors.is_empty() {
            return Err(io::Error::new(
                ErrorKind::InvalidData,
                format!("Build failed, nothing written: {}", compilation.errors.join("; ")),
            ));
        }

        self.write(&compilation)
    }

    fn write(&self, compilation: &Compilation) -> io::Result<BuildReport> {
        let public_dir = &self.paths.public_dir;
        std::fs::create_dir_all(public_dir)?;
        remove_stale_bundles(public_dir, compilation)?;

        let mut written = vec![];
        for chunk in compilation.chunks.iter() {
            let path = public_dir.join(&chunk.file_name);
            std::fs::write(&path, &chunk.content)?;
            written.push(path);
        }

        for output in compilation.outputs.iter() {
            let path = public_dir.join(&output.path);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, &output.bytes)?;
            written.push(path);
        }

        let manifest = compilation.manifest();
        let manifest_path = public_dir.join(MANIFEST_FILE);
        std::fs::write(&manifest_path, manifest.to_json()?)?;
        written.push(manifest_path);

        for path in written.iter() {
            info!("Wrote {}", path.display());
        }

        Ok(BuildReport {
            skipped: false,
            written,
            manifest: Some(manifest),
        })
    }
}

/// Deletes the bundles listed by the previous manifest that this build does not
/// produce again.
fn remove_stale_bundles(public_dir: &Path, compilation: &Compilation) -> io::Result<()> {
    let previous = match AssetManifest::read(public_dir) {
        Ok(manifest) => manifest,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            warn!("Ignoring previous manifest: {}", e);
            return Ok(());
        }
    };

    let stale = previous.scripts.iter()
        .chain(previous.styles.iter())
        .filter_map(|url| url.strip_prefix(PUBLIC_URL_PREFIX))
        .filter(|name| !name.is_empty() && !name.contains(['/', '\\']) && !name.contains(".."))
        .filter(|name| !compilation.chunks.iter().any(|c| c.file_name == *name));

    for name in stale {
        let path = public_dir.join(name);
        match std::fs::remove_file(&path) {
            Ok(()) => info!("Removed stale bundle {}", path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn apply(plugin: &Plugin, compilation: &mut Compilation) -> io::Result<()> {
    match plugin {
        Plugin::Define(definitions) => {
            for module in compilation.modules.iter_mut().filter(|m| m.kind == ModuleKind::Script) {
                module.source = define_constants(&module.source, definitions)?;
            }
        }
        Plugin::IgnoreModules { resource, context } => {
            let resource = compile_regex(resource)?;
            let context = compile_regex(context)?;
            compilation.modules.retain(|m| {
                let ignored = is_ignored(&m.path, &resource, &context);
                if ignored {
                    debug!("Ignoring {}", m.path.display());
                }
                !ignored
            });
        }
        Plugin::HotModuleReplacement => {
            compilation.modules.push(Module::new(HOT_RUNTIME_PATH, ModuleKind::Script, hot_runtime()));
        }
        Plugin::Dedupe => dedupe(&mut compilation.modules),
        Plugin::OccurrenceOrder => order_by_occurrence(&mut compilation.modules),
        Plugin::Minify { warnings } => {
            for module in compilation.modules.iter_mut() {
                match minify(module) {
                    Some(minified) => module.source = minified,
                    None if *warnings => compilation.warnings.push(
                        format!("Not minifying {}: multi-line template literal", module.path.display())),
                    None => {}
                }
            }
        }
        Plugin::HtmlTemplate { template, inject } => {
            match std::fs::read_to_string(template) {
                Ok(src) => {
                    let html = inject_assets(&src, &compilation.manifest(), *inject);
                    compilation.outputs.push(OutputFile { path: PathBuf::from("index.html"), bytes: html.into_bytes() });
                }
                Err(e) => compilation.errors.push(format!("Error reading HTML template {}: {}", template.display(), e)),
            }
        }
        Plugin::CopyAsset { from, to } => {
            match (std::fs::read(from), from.file_name()) {
                (Ok(bytes), Some(file_name)) => compilation.outputs.push(OutputFile { path: to.join(file_name), bytes }),
                (Err(e), _) => compilation.errors.push(format!("Error copying {}: {}", from.display(), e)),
                (_, None) => compilation.errors.push(format!("Not a file: {}", from.display())),
            }
        }
        Plugin::NoErrors => {}
    }
    Ok(())
}

/// Client code polling the server for a new mount generation.
pub fn hot_runtime() -> String {
    HOT_RUNTIME.replace(ENDPOINT_PLACEHOLDER, HOT_ENDPOINT)
}

fn compile_regex(pattern: &str) -> io::Result<Regex> {
    Regex::new(pattern).map_err(|e| io::Error::new(ErrorKind::InvalidInput, format!("Invalid pattern {}: {}", pattern, e)))
}

pub fn define_constants(source: &str, definitions: &[(String, String)]) -> io::Result<String> {
    let mut out = source.to_string();
    for (name, value) in definitions {
        let pattern = compile_regex(&format!(r"\b{}\b", regex::escape(name)))?;
        out = pattern.replace_all(&out, regex::NoExpand(value)).into_owned();
    }
    Ok(out)
}

/// A module is ignored when one of its directories matches `context` and the
/// next path segment, requested as `./segment`, matches `resource`.
pub fn is_ignored(path: &Path, resource: &Regex, context: &Regex) -> bool {
    let segments: Vec<String> = path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    (1..segments.len()).any(|i| {
        let request = format!("./{}", segments[i]);
        context.is_match(&segments[..i].join("/")) && resource.is_match(&request)
    })
}

pub fn dedupe(modules: &mut Vec<Module>) {
    let mut seen = HashSet::new();
    modules.retain(|m| {
        let first = seen.insert((m.kind, m.content_hash()));
        if !first {
            debug!("Dropping duplicate {}", m.path.display());
        }
        first
    });
}

pub fn order_by_occurrence(modules: &mut [Module]) {
    let counts: Vec<(PathBuf, usize)> = modules.iter()
        .map(|m| {
            let name = m.path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            let count = modules.iter()
                .filter(|other| other.path != m.path)
                .map(|other| other.source.matches(name.as_str()).count())
                .sum();
            (m.path.clone(), count)
        })
        .collect();

    let count_of = |path: &Path| counts.iter()
        .find(|(p, _)| p == path)
        .map(|(_, c)| *c)
        .unwrap_or(0);

    modules.sort_by(|a, b| {
        count_of(&b.path).cmp(&count_of(&a.path)).then_with(|| a.path.cmp(&b.path))
    });
}

/// `None` when the module cannot be shrunk safely.
pub fn minify(module: &Module) -> Option<String> {
    match module.kind {
        ModuleKind::Style => Some(minify_css(&module.source)),
        ModuleKind::Script => minify_js(&module.source),
    }
}

fn minify_css(source: &str) -> String {
    lazy_static! {
        static ref COMMENT: Regex = Regex::new(r"(?s)/\*.*?\*/").unwrap();
        static ref SPACES: Regex = Regex::new(r"\s+").unwrap();
        static ref SELECTOR_PUNCTUATION: Regex = Regex::new(r"\s*([,>+~])\s*").unwrap();
        static ref DECLARATION_PUNCTUATION: Regex = Regex::new(r"\s*([:;,])\s*").unwrap();
    }

    let out = COMMENT.replace_all(source, "");
    let out = SPACES.replace_all(&out, " ");

    // Text before `{` is a selector or an at-rule prelude, where a space before
    // `:` is a descendant combinator. Text before `}` holds declarations.
    let mut minified = String::with_capacity(out.len());
    let mut segment = String::new();
    for c in out.chars() {
        match c {
            '{' => {
                minified.push_str(&SELECTOR_PUNCTUATION.replace_all(segment.trim(), "$1"));
                minified.push('{');
                segment.clear();
            }
            '}' => {
                minified.push_str(&DECLARATION_PUNCTUATION.replace_all(segment.trim(), "$1"));
                minified.push('}');
                segment.clear();
            }
            _ => segment.push(c),
        }
    }
    minified.push_str(&SELECTOR_PUNCTUATION.replace_all(segment.trim(), "$1"));

    minified.replace(";}", "}")
}

fn minify_js(source: &str) -> Option<String> {
    if source.lines().any(|l| l.matches('`').count() % 2 == 1) {
        return None;
    }

    let stripped = strip_js_comments(source);
    let lines: Vec<&str> = stripped.lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect();
    Some(lines.join("\n"))
}

/// Removes `//` and `/* */` comments found outside string literals. A block
/// comment becomes a newline when it spanned lines, a space otherwise.
fn strip_js_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if c == q || c == '\n' {
                quote = None;
            }
            continue;
        }

        let following = chars.peek().copied();
        match (c, following) {
            ('"' | '\'' | '`', _) => {
                quote = Some(c);
                out.push(c);
            }
            ('/', Some('/')) => {
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut spans_lines = false;
                let mut previous = '\0';
                for next in chars.by_ref() {
                    if previous == '*' && next == '/' {
                        break;
                    }
                    spans_lines |= next == '\n';
                    previous = next;
                }
                out.push(if spans_lines { '\n' } else { ' ' });
            }
            _ => out.push(c),
        }
    }
    out
}

pub fn inject_assets(template: &str, manifest: &AssetManifest, inject: Inject) -> String {
    let styles: String = manifest.styles.iter()
        .map(|href| format!("<link rel=\"stylesheet\" href=\"{}\">", href))
        .collect();
    let scripts: String = manifest.scripts.iter()
        .map(|src| format!("<script src=\"{}\"></script>", src))
        .collect();

    let out = insert_before(template, "</head>", &styles);
    match inject {
        Inject::Head => insert_before(&out, "</head>", &scripts),
        Inject::Body => insert_before(&out, "</body>", &scripts),
    }
}

fn insert_before(html: &str, closing_tag: &str, markup: &str) -> String {
    if markup.is_empty() {
        return html.to_string();
    }
    match html.rfind(closing_tag) {
        Some(pos) => format!("{}{}{}", &html[..pos], markup, &html[pos..]),
        None => format!("{}{}", html, markup),
    }
}

use std::path::{Path, PathBuf};
use std::{fs, io};

use sha2::{Digest, Sha256};
use spdlog::debug;

use crate::build::manifest::AssetManifest;
use crate::environment::BuildEnv;

const BUNDLE_NAME: &str = "application";
const HASH_LEN: usize = 20;

/// URL prefix under which the server exposes `public_dir`.
pub const PUBLIC_URL_PREFIX: &str = "/static/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    Script,
    Style,
}

impl ModuleKind {
    pub fn from_path(path: &Path) -> Option<ModuleKind> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("js") => Some(ModuleKind::Script),
            Some("css") => Some(ModuleKind::Style),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ModuleKind::Script => "js",
            ModuleKind::Style => "css",
        }
    }
}

/// One source file of the bundle. `path` is relative to the source directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub path: PathBuf,
    pub kind: ModuleKind,
    pub source: String,
}

impl Module {
    pub fn new(path: impl Into<PathBuf>, kind: ModuleKind, source: impl Into<String>) -> Self {
        Module { path: path.into(), kind, source: source.into() }
    }

    pub fn content_hash(&self) -> String {
        content_hash(self.source.as_bytes())
    }
}

pub fn content_hash(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// A bundle file built from every module of one kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub kind: ModuleKind,
    pub file_name: String,
    pub content: String,
}

/// A file written to the output besides the bundles.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputFile {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

pub struct Compilation {
    pub env: BuildEnv,
    pub build_id: String,
    pub modules: Vec<Module>,
    pub chunks: Vec<Chunk>,
    pub outputs: Vec<OutputFile>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Compilation {
    pub fn new(env: BuildEnv, modules: Vec<Module>) -> Self {
        Compilation {
            env,
            build_id: uuid::Uuid::new_v4().to_string(),
            modules,
            chunks: vec![],
            outputs: vec![],
            errors: vec![],
            warnings: vec![],
        }
    }

    /// Every script and style under `source_dir`, sorted by path. A missing
    /// directory is recorded as an error of the compilation.
    pub fn collect(env: BuildEnv, source_dir: &Path) -> io::Result<Compilation> {
        let mut compilation = Compilation::new(env, vec![]);
        if !source_dir.is_dir() {
            compilation.errors.push(format!("Source directory not found: {}", source_dir.display()));
            return Ok(compilation);
        }

        let mut files = vec![];
        list_files(source_dir, &mut files)?;
        files.sort();

        for file in files {
            let Some(kind) = ModuleKind::from_path(&file) else {
                continue;
            };
            let relative = file.strip_prefix(source_dir).unwrap_or(&file).to_path_buf();
            let source = fs::read_to_string(&file)?;
            debug!("Module {}", relative.display());
            compilation.modules.push(Module::new(relative, kind, source));
        }

        Ok(compilation)
    }

    /// Concatenates the modules of each kind into a content-hashed bundle.
    pub fn seal(&mut self) {
        self.chunks.clear();
        for kind in [ModuleKind::Script, ModuleKind::Style] {
            let sources: Vec<&str> = self.modules.iter()
                .filter(|m| m.kind == kind)
                .map(|m| m.source.as_str())
                .collect();
            if sources.is_empty() {
                continue;
            }

            let content = sources.join("\n");
            let hash = content_hash(content.as_bytes());
            self.chunks.push(Chunk {
                kind,
                file_name: format!("{}.{}.{}", BUNDLE_NAME, &hash[..HASH_LEN], kind.extension()),
                content,
            });
        }
    }

    pub fn manifest(&self) -> AssetManifest {
        let urls = |kind: ModuleKind| -> Vec<String> {
            self.chunks.iter()
                .filter(|c| c.kind == kind)
                .map(|c| format!("{}{}", PUBLIC_URL_PREFIX, c.file_name))
                .collect()
        };

        AssetManifest {
            build_id: self.build_id.clone(),
            scripts: urls(ModuleKind::Script),
            styles: urls(ModuleKind::Style),
        }
    }
}

fn list_files(dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            list_files(&entry.path(), files)?;
        } else if file_type.is_file() {
            files.push(entry.path());
        }
    }
    Ok(())
}

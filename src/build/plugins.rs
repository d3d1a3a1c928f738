use std::path::PathBuf;

use crate::config::Paths;
use crate::environment::BuildEnv;

pub const MODE_CONSTANT: &str = "process.env.NODE_ENV";
pub const DEV_CONSTANT: &str = "__DEV__";
pub const ASSETS_DIR: &str = "assets";

/// Locale data of the date library is never bundled.
pub const LOCALE_RESOURCE: &str = r"^\./locale$";
pub const LOCALE_CONTEXT: &str = r"moment$";

#[derive(Debug, Clone, PartialEq)]
pub struct BuildPaths {
    pub source_dir: PathBuf,
    pub html_template: PathBuf,
    pub favicon: PathBuf,
    pub public_dir: PathBuf,
}

impl BuildPaths {
    pub fn from_config(paths: &Paths) -> Self {
        BuildPaths {
            source_dir: paths.source_dir.clone(),
            html_template: paths.html_template.clone(),
            favicon: paths.favicon.clone(),
            public_dir: paths.public_dir.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inject {
    Head,
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    /// Works on the collected modules.
    Modules,
    /// Shrinks the modules before they are sealed into bundles.
    Optimize,
    /// Produces the files written next to the bundles.
    Emit,
    /// Decides whether anything is written at all.
    Guard,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Plugin {
    /// Replaces each constant with its literal value in scripts.
    Define(Vec<(String, String)>),
    /// Generates the HTML document from a template, linking the bundles.
    HtmlTemplate { template: PathBuf, inject: Inject },
    /// Copies a file verbatim into a directory of the output.
    CopyAsset { from: PathBuf, to: PathBuf },
    /// Drops modules requested as `resource` from a directory matching `context`.
    IgnoreModules { resource: String, context: String },
    /// Nothing is written when the compilation recorded errors.
    NoErrors,
    /// Bundles the runtime that reloads the page when the mount changes.
    HotModuleReplacement,
    /// Drops modules whose content duplicates an earlier module.
    Dedupe,
    /// Orders modules by how often they are referenced, then by path.
    OccurrenceOrder,
    Minify { warnings: bool },
}

impl Plugin {
    pub fn stage(&self) -> Stage {
        match self {
            Plugin::Define(_)
            | Plugin::IgnoreModules { .. }
            | Plugin::HotModuleReplacement
            | Plugin::Dedupe
            | Plugin::OccurrenceOrder => Stage::Modules,
            Plugin::Minify { .. } => Stage::Optimize,
            Plugin::HtmlTemplate { .. } | Plugin::CopyAsset { .. } => Stage::Emit,
            Plugin::NoErrors => Stage::Guard,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Plugin::Define(_) => "define",
            Plugin::HtmlTemplate { .. } => "html-template",
            Plugin::CopyAsset { .. } => "copy-asset",
            Plugin::IgnoreModules { .. } => "ignore-modules",
            Plugin::NoErrors => "no-errors",
            Plugin::HotModuleReplacement => "hot-module-replacement",
            Plugin::Dedupe => "dedupe",
            Plugin::OccurrenceOrder => "occurrence-order",
            Plugin::Minify { .. } => "minify",
        }
    }
}

fn base_plugins(env: BuildEnv, paths: &BuildPaths) -> Vec<Plugin> {
    let mode = serde_json::Value::String(env.as_str().to_string()).to_string();
    vec![
        Plugin::Define(vec![
            (MODE_CONSTANT.to_string(), mode),
            (DEV_CONSTANT.to_string(), env.is_development().to_string()),
        ]),
        Plugin::HtmlTemplate { template: paths.html_template.clone(), inject: Inject::Body },
        Plugin::CopyAsset { from: paths.favicon.clone(), to: PathBuf::from(ASSETS_DIR) },
        Plugin::IgnoreModules {
            resource: LOCALE_RESOURCE.to_string(),
            context: LOCALE_CONTEXT.to_string(),
        },
        Plugin::NoErrors,
    ]
}

/// Plugins for a build in `env`. Test builds are disabled and get none.
pub fn plugins_for(env: BuildEnv, paths: &BuildPaths) -> Option<Vec<Plugin>> {
    let extra = match env {
        BuildEnv::Test => return None,
        BuildEnv::Development => vec![Plugin::HotModuleReplacement],
        BuildEnv::Production => vec![
            Plugin::Dedupe,
            Plugin::OccurrenceOrder,
            Plugin::Minify { warnings: false },
        ],
    };

    let mut plugins = base_plugins(env, paths);
    plugins.extend(extra);
    Some(plugins)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths() -> BuildPaths {
        BuildPaths {
            source_dir: PathBuf::from("res/client"),
            html_template: PathBuf::from("res/index.html"),
            favicon: PathBuf::from("res/assets/favicon.ico"),
            public_dir: PathBuf::from("public"),
        }
    }

    fn expected_base(mode: &str, dev: &str) -> Vec<Plugin> {
        vec![
            Plugin::Define(vec![
                ("process.env.NODE_ENV".to_string(), format!("\"{}\"", mode)),
                ("__DEV__".to_string(), dev.to_string()),
            ]),
            Plugin::HtmlTemplate { template: PathBuf::from("res/index.html"), inject: Inject::Body },
            Plugin::CopyAsset { from: PathBuf::from("res/assets/favicon.ico"), to: PathBuf::from("assets") },
            Plugin::IgnoreModules { resource: r"^\./locale$".to_string(), context: "moment$".to_string() },
            Plugin::NoErrors,
        ]
    }

    #[test]
    fn test_test_env_has_no_plugins() {
        assert_eq!(plugins_for(BuildEnv::Test, &paths()), None);
    }

    #[test]
    fn test_development_plugins() {
        let mut expected = expected_base("development", "true");
        expected.push(Plugin::HotModuleReplacement);
        assert_eq!(plugins_for(BuildEnv::Development, &paths()), Some(expected));
    }

    #[test]
    fn test_production_plugins() {
        let mut expected = expected_base("production", "false");
        expected.extend([Plugin::Dedupe, Plugin::OccurrenceOrder, Plugin::Minify { warnings: false }]);
        assert_eq!(plugins_for(BuildEnv::Production, &paths()), Some(expected));
    }

    #[test]
    fn test_selection_is_pure() {
        for env in [BuildEnv::Development, BuildEnv::Production, BuildEnv::Test] {
            assert_eq!(plugins_for(env, &paths()), plugins_for(env, &paths()));
        }
    }

    #[test]
    fn test_stages() {
        let plugins = plugins_for(BuildEnv::Production, &paths()).unwrap();
        let guards: Vec<_> = plugins.iter().filter(|p| p.stage() == Stage::Guard).map(|p| p.name()).collect();
        assert_eq!(guards, ["no-errors"]);
        assert_eq!(Plugin::Minify { warnings: true }.stage(), Stage::Optimize);
        assert_eq!(Plugin::HotModuleReplacement.stage(), Stage::Modules);
    }
}

use std::io::ErrorKind;
use std::path::PathBuf;
use std::{env, fs, io};

use serde::Deserialize;

use crate::render::components::IconKind;

#[derive(Deserialize, Clone)]
pub struct Paths {
    pub template_dir: PathBuf,
    pub source_dir: PathBuf,
    pub html_template: PathBuf,
    pub favicon: PathBuf,
    pub public_dir: PathBuf,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Social {
    pub title: String,
    pub href: String,
    pub icon: IconKind,
}

#[derive(Deserialize, Clone)]
pub struct Site {
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub social: Vec<Social>,
}

#[derive(Deserialize, Copy, Clone, Debug, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Json,
    Directory,
}

#[derive(Deserialize, Clone)]
pub struct Content {
    pub source: SourceKind,
    pub location: PathBuf,
}

#[derive(Deserialize, Clone)]
pub struct Server {
    pub address: String,
    pub port: u16,
}

#[derive(Deserialize, Clone)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Copy, Clone)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize, Clone)]
pub struct Config {
    pub site: Site,
    pub paths: Paths,
    pub content: Content,
    pub server: Server,
    pub log: Option<Log>,
}

fn parse_path(path: PathBuf) -> io::Result<PathBuf> {
    if path.starts_with("${exe_dir}") {
        let cur_exe = env::current_exe()?;
        let exe_dir = cur_exe.parent()
            .ok_or_else(|| io::Error::new(ErrorKind::NotFound, "Executable has no parent directory"))?;
        let str_path = path.to_string_lossy();
        Ok(PathBuf::from(str_path.replace("${exe_dir}", &exe_dir.to_string_lossy())))
    } else {
        Ok(path)
    }
}

pub fn parse_config(cfg_content: &str) -> io::Result<Config> {
    let mut cfg: Config = match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    cfg.paths = Paths {
        template_dir: parse_path(cfg.paths.template_dir)?,
        source_dir: parse_path(cfg.paths.source_dir)?,
        html_template: parse_path(cfg.paths.html_template)?,
        favicon: parse_path(cfg.paths.favicon)?,
        public_dir: parse_path(cfg.paths.public_dir)?,
    };
    cfg.content.location = parse_path(cfg.content.location)?;

    Ok(cfg)
}

pub fn read_config(cfg_path: &PathBuf) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };

    parse_config(&cfg_content)
}

use std::io;
use std::path::Path;
use std::sync::Arc;

use ntex::web;
use ntex_files::NamedFile;
use spdlog::{error, info, warn};

use crate::bootstrap::bootstrap;
use crate::build::bundler::HOT_ENDPOINT;
use crate::build::manifest::AssetManifest;
use crate::build::plugins::ASSETS_DIR;
use crate::config::Config;
use crate::content::loader::ContentLoader;
use crate::environment::BuildEnv;
use crate::render::document::{render_document, wrap_document};
use crate::render::mount::{Dom, Element};
use crate::render::router::post_href;
use crate::render::templates::TemplateSet;
use crate::render::{AppProps, SiteInfo};
use crate::watcher::SourceWatcher;

struct AppState {
    root: Element,
    props: AppProps,
    env: BuildEnv,
    config: Config,
}

impl AppState {
    fn templates(&self) -> io::Result<TemplateSet> {
        TemplateSet::load(&self.config.paths.template_dir)
    }

    fn manifest(&self) -> AssetManifest {
        load_manifest(&self.config.paths.public_dir)
    }
}

/// Without a build the documents are served without bundles.
fn load_manifest(public_dir: &Path) -> AssetManifest {
    match AssetManifest::read(public_dir) {
        Ok(manifest) => manifest,
        Err(e) => {
            warn!("No asset manifest in {}: {}", public_dir.display(), e);
            AssetManifest::default()
        }
    }
}

fn html_response(rendered: io::Result<String>) -> web::HttpResponse {
    match rendered {
        Ok(html) => web::HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(html),
        Err(e) => {
            error!("Error rendering page: {}", e);
            web::HttpResponse::InternalServerError()
                .body(format!("Error rendering page: {}", e))
        }
    }
}

#[web::get("/")]
async fn index(state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    let rendered = state.templates().and_then(|templates| {
        wrap_document(&templates, state.env, &state.props, &state.manifest(), &state.root.inner_html())
    });
    html_response(rendered)
}

#[web::get("/post/{link}")]
async fn post_wo_slash(path: web::types::Path<String>) -> web::HttpResponse {
    web::HttpResponse::TemporaryRedirect()
        .header("Location", post_href(&path.into_inner()))
        .content_type("text/html; charset=utf-8")
        .finish()
}

#[web::get("/post/{link}/")]
async fn post(path: web::types::Path<String>, state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    let link = path.into_inner();
    let found = state.props.posts.iter().any(|p| p.link == link);

    let rendered = state.templates().and_then(|templates| {
        render_document(&templates, state.env, &state.props, &post_href(&link), &state.manifest())
    });

    match (found, rendered) {
        (false, Ok(html)) => web::HttpResponse::NotFound()
            .content_type("text/html; charset=utf-8")
            .body(html),
        (_, rendered) => html_response(rendered),
    }
}

fn public_file(public_dir: &Path, file_name: String) -> Result<NamedFile, web::Error> {
    if file_name.contains("../") {
        return Err(web::error::ErrorUnauthorized("Access forbidden").into());
    }

    Ok(NamedFile::open(public_dir.join(file_name))?)
}

#[web::get("/assets/{file_name}")]
async fn assets(path: web::types::Path<String>, state: web::types::State<Arc<AppState>>) -> Result<NamedFile, web::Error> {
    public_file(&state.config.paths.public_dir.join(ASSETS_DIR), path.into_inner())
}

#[web::get("/static/{file_name}")]
async fn static_files(path: web::types::Path<String>, state: web::types::State<Arc<AppState>>) -> Result<NamedFile, web::Error> {
    public_file(&state.config.paths.public_dir, path.into_inner())
}

/// Polled by the reload runtime bundled in development builds.
async fn hot_generation(state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    if !state.env.is_development() {
        return web::HttpResponse::NotFound().finish();
    }

    web::HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .header("Cache-Control", "no-store")
        .body(state.root.generation().to_string())
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(post)
        .service(post_wo_slash)
        .service(assets)
        .service(static_files)
        .service(web::resource(HOT_ENDPOINT).route(web::get().to(hot_generation)));
}

pub async fn server_run(config: Config, env: BuildEnv) -> io::Result<()> {
    let template_dir = config.paths.template_dir.clone();
    let templates = TemplateSet::load(&template_dir)?;
    let loader = ContentLoader::from_config(&config.content);
    let site = SiteInfo::from_config(&config.site);

    let dom = Dom::with_root();
    let mounted = bootstrap(&loader, &dom, site, templates, env).await?;
    info!("Mounted {} posts in {} mode", mounted.props().posts.len(), env);

    let state = Arc::new(AppState {
        root: mounted.root().clone(),
        props: mounted.props().clone(),
        env,
        config: config.clone(),
    });

    // Kept alive for as long as the server runs.
    let _watcher = if env.is_development() {
        let (watcher, changes) = SourceWatcher::watch(&[template_dir.clone(), config.paths.source_dir.clone()])?;
        ntex::rt::spawn(async move {
            if let Err(e) = mounted.accept_updates(changes, template_dir).await {
                error!("Stopped accepting updates: {}", e);
            }
        });
        Some(watcher)
    } else {
        None
    };

    web::HttpServer::new(move || {
        web::App::new()
            .state(state.clone())
            .configure(routes)
    })
        .bind((config.server.address.clone(), config.server.port))?
        .run()
        .await
}

#[cfg(test)]
mod tests {
    use std::fs;

    use ntex::http::StatusCode;
    use ntex::web::test::{call_service, init_service, read_body, TestRequest};

    use crate::bootstrap::Mounted;
    use crate::config::parse_config;
    use crate::content::post_source::PostSource;
    use crate::render::templates::APP_TPL;

    use super::*;

    const POSTS: &str = r#"[
  {"title": "First light", "body": "one", "timestamp": "2019-01-01 00:00:00"},
  {"title": "Second wind", "body": "two", "timestamp": "2019-02-01 00:00:00"}
]"#;

    fn site_config(dir: &Path) -> Config {
        let posts = dir.join("posts.json");
        fs::write(&posts, POSTS).unwrap();
        fs::create_dir_all(dir.join("template")).unwrap();

        parse_config(&format!(r#"
[site]
title = "Folio"
author = "Daniel"

[paths]
template_dir = "{dir}/template"
source_dir = "{dir}/client"
html_template = "{dir}/index.html"
favicon = "{dir}/favicon.ico"
public_dir = "{dir}/public"

[content]
source = "json"
location = "{dir}/posts.json"

[server]
address = "127.0.0.1"
port = 8080
"#, dir = dir.display())).unwrap()
    }

    async fn mount(config: &Config, env: BuildEnv) -> (Mounted, Arc<AppState>) {
        let loader = ContentLoader::new(PostSource::Json(config.content.location.clone()));
        let templates = TemplateSet::load(&config.paths.template_dir).unwrap();
        let dom = Dom::with_root();
        let mounted = bootstrap(&loader, &dom, SiteInfo::from_config(&config.site), templates, env).await.unwrap();

        let state = Arc::new(AppState {
            root: mounted.root().clone(),
            props: mounted.props().clone(),
            env,
            config: config.clone(),
        });
        (mounted, state)
    }

    async fn get(state: Arc<AppState>, uri: &str) -> (StatusCode, Option<String>, String) {
        let app = init_service(web::App::new().state(state).configure(routes)).await;
        let res = call_service(&app, TestRequest::get().uri(uri).to_request()).await;
        let status = res.status();
        let location = res.headers().get("Location")
            .map(|v| v.to_str().unwrap().to_string());
        let body = read_body(res).await;
        (status, location, String::from_utf8(body.to_vec()).unwrap())
    }

    #[ntex::test]
    async fn test_post_without_slash_redirects() {
        let dir = tempfile::tempdir().unwrap();
        let (_mounted, state) = mount(&site_config(dir.path()), BuildEnv::Production).await;

        let (status, location, _) = get(state, "/post/first-light").await;
        assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location.as_deref(), Some("/post/first-light/"));
    }

    #[ntex::test]
    async fn test_post_page() {
        let dir = tempfile::tempdir().unwrap();
        let (_mounted, state) = mount(&site_config(dir.path()), BuildEnv::Production).await;

        let (status, _, body) = get(state.clone(), "/post/second-wind/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with("<!DOCTYPE html>"));
        assert!(body.contains("Second wind"));
        assert!(!body.contains("First light"));

        let (status, _, body) = get(state, "/post/no-such-post/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("<section class=\"not-found\">"));
    }

    #[ntex::test]
    async fn test_hot_generation_only_in_development() {
        let dir = tempfile::tempdir().unwrap();
        let config = site_config(dir.path());

        let (_mounted, state) = mount(&config, BuildEnv::Production).await;
        let (status, _, _) = get(state, HOT_ENDPOINT).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (mounted, state) = mount(&config, BuildEnv::Development).await;
        let (status, _, body) = get(state.clone(), HOT_ENDPOINT).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "1");

        mounted.render().unwrap();
        let (_, _, body) = get(state, HOT_ENDPOINT).await;
        assert_eq!(body, "2");
    }

    #[ntex::test]
    async fn test_index_serves_markup_after_reload() {
        let dir = tempfile::tempdir().unwrap();
        let config = site_config(dir.path());
        let (mut mounted, state) = mount(&config, BuildEnv::Development).await;

        let (status, _, body) = get(state.clone(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("First light"));
        assert!(!body.contains("class=\"reloaded\""));

        fs::write(config.paths.template_dir.join(APP_TPL), "<div class=\"reloaded\">{{{main}}}</div>").unwrap();
        mounted.reload(&config.paths.template_dir).unwrap();

        let (_, _, body) = get(state, "/").await;
        assert!(body.contains("<div class=\"reloaded\">"));
        assert_eq!(body.matches("<article class=\"post\">").count(), 2);
    }

    #[test]
    fn test_missing_manifest_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_manifest(dir.path()), AssetManifest::default());
    }

    #[test]
    fn test_public_file_rejects_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        assert!(public_file(dir.path(), "../secret.txt".to_string()).is_err());
    }

    #[test]
    fn test_public_file_opens_existing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("favicon.ico"), [0u8, 1]).unwrap();
        assert!(public_file(dir.path(), "favicon.ico".to_string()).is_ok());
        assert!(public_file(dir.path(), "missing.ico".to_string()).is_err());
    }
}

//! # Dockyard HTTP
//!
//! `dockyard_http` serves the read-only subset of the legacy v1 docker registry API out of a
//! data directory laid out the way [`dockyard_core`] expects it.
//!
//! Small metadata documents (tags, image json) are answered inline. Bulk content (ancestry, layer
//! blobs, repository image lists) is never read by the handlers themselves: they redirect to a
//! static file service mounted under [`RegistryConfig::static_prefix`] which owns 404s for those
//! files.
//!
//! ## Example `main.rs`
//!
//! ```no_run
//! use dockyard_core::Layout;
//! use dockyard_http::{Dockyard, RegistryConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let dockyard = Dockyard::new(Layout::new("/srv/registry"), RegistryConfig::default())?;
//!     let router = dockyard.router()?;
//!
//!     axum::Server::bind(&"0.0.0.0:3000".parse()?)
//!         .serve(router.into_make_service())
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
use std::sync::Arc;

use axum::extract::State;
use axum::http::header::{self, HeaderValue};
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Deserialize;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::{self, TraceLayer};

mod errors;
pub use errors::{Error, Result};

pub mod headers;
mod images;
mod repositories;

use dockyard_core::Layout;

/// Characters escaped when an identifier becomes a segment of a redirect target.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Registry-level settings that shape responses rather than storage.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Value of the `X-Docker-Registry-Version` header.
    pub version: String,
    /// Body returned by `GET /`.
    pub banner: String,
    /// URL path the static file service is mounted at.
    pub static_prefix: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            version: String::from("dockyard-0.1"),
            banner: String::from("dockyard read-only docker-registry API server"),
            static_prefix: String::from("/static"),
        }
    }
}

impl RegistryConfig {
    /// The static prefix with exactly one leading slash and no trailing slash.
    pub fn static_prefix(&self) -> Result<String> {
        let trimmed = self.static_prefix.trim_matches('/');
        if trimmed.is_empty() {
            return Err(Error::InvalidStaticPrefix(self.static_prefix.clone()));
        }
        Ok(format!("/{trimmed}"))
    }
}

/// Shared state of every route: where the data lives and how to present it.
#[derive(Clone)]
pub struct Dockyard {
    layout: Arc<Layout>,
    config: Arc<RegistryConfig>,
    static_prefix: Arc<str>,
}

impl Dockyard {
    pub fn new(layout: Layout, config: RegistryConfig) -> Result<Self> {
        let static_prefix = config.static_prefix()?;
        Ok(Self {
            layout: Arc::new(layout),
            config: Arc::new(config),
            static_prefix: static_prefix.into(),
        })
    }

    pub fn layout(&self) -> Arc<Layout> {
        self.layout.clone()
    }

    /// `302 Found` pointing into the static file service. Segments are joined with `/` and are
    /// not checked for existence.
    fn redirect(&self, segments: &[&str]) -> Result<Response> {
        let mut location = String::from(&*self.static_prefix);
        for segment in segments {
            location.push('/');
            location.extend(utf8_percent_encode(segment, PATH_SEGMENT));
        }
        tracing::debug!("redirecting to {location}");
        Ok((
            StatusCode::FOUND,
            [(header::LOCATION, HeaderValue::from_str(&location)?)],
        )
            .into_response())
    }

    /// Return an [`axum::Router`] serving the v1 registry API and the static files it redirects
    /// to.
    pub fn router(&self) -> Result<axum::Router> {
        let static_files = ServeDir::new(self.layout.root());

        let app = Router::new()
            .route("/", get(banner))
            .route("/v1/_ping", get(ping))
            .nest("/v1/repositories/:user/:name", repositories::router())
            .nest("/v1/images/:imgid", images::router())
            .nest_service(&self.static_prefix, static_files)
            .with_state(self.clone())
            .layer(CatchPanicLayer::new())
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(trace::DefaultMakeSpan::new().include_headers(true))
                    .on_response(trace::DefaultOnResponse::new())
                    .on_request(trace::DefaultOnRequest::new()),
            )
            .layer(middleware::from_fn(headers::add_docker_endpoints))
            .layer(SetResponseHeaderLayer::overriding(
                headers::X_DOCKER_REGISTRY_VERSION.clone(),
                HeaderValue::from_str(&self.config.version)?,
            ));

        Ok(app)
    }
}

/// Runs blocking filesystem work off the async workers.
pub(crate) async fn blocking<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> dockyard_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await??)
}

async fn banner(State(dockyard): State<Dockyard>) -> String {
    dockyard.config.banner.clone()
}

async fn ping() -> &'static str {
    "true"
}

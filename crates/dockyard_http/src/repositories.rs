use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use http::StatusCode;

use dockyard_core::{RepositoryName, INDEX_IMAGES};

use super::errors::Result;
use super::{blocking, Dockyard};

pub(crate) fn router() -> Router<Dockyard> {
    Router::new()
        .route("/images", get(get_images))
        .route("/tags", get(get_tags))
}

async fn get_images(
    State(dockyard): State<Dockyard>,
    Path((user, name)): Path<(String, String)>,
) -> Result<Response> {
    dockyard.redirect(&["repositories", &user, &name, INDEX_IMAGES])
}

async fn get_tags(
    State(dockyard): State<Dockyard>,
    Path((user, name)): Path<(String, String)>,
) -> Result<Response> {
    let layout = dockyard.layout();
    let repository = RepositoryName::new(user, name);

    let tags = blocking(move || layout.tags(&repository))
        .await
        .map_err(|e| e.for_tags())?;
    let body = tags.to_json()?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response())
}

use axum::extract::{Path, State};
use axum::http::header::{self, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use http::StatusCode;

use super::errors::Result;
use super::headers::X_DOCKER_SIZE;
use super::{blocking, Dockyard};

pub(crate) fn router() -> Router<Dockyard> {
    Router::new()
        .route("/ancestry", get(get_ancestry))
        .route("/json", get(get_json))
        .route("/layer", get(get_layer))
}

async fn get_ancestry(
    State(dockyard): State<Dockyard>,
    Path(imgid): Path<String>,
) -> Result<Response> {
    dockyard.redirect(&["images", &imgid, "ancestry"])
}

async fn get_layer(
    State(dockyard): State<Dockyard>,
    Path(imgid): Path<String>,
) -> Result<Response> {
    dockyard.redirect(&["images", &imgid, "layer"])
}

// the layer is only stat'ed, its size travels in X-Docker-Size rather than the json body
async fn get_json(
    State(dockyard): State<Dockyard>,
    Path(imgid): Path<String>,
) -> Result<Response> {
    let layout = dockyard.layout();
    let image = blocking(move || layout.image_json(&imgid)).await?;

    let mut headers = HeaderMap::new();
    headers.insert(X_DOCKER_SIZE.clone(), HeaderValue::from(image.size));
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    Ok((StatusCode::OK, headers, image.body).into_response())
}

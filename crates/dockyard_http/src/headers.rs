use axum::http::header::{self, HeaderName, HeaderValue};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

pub static X_DOCKER_REGISTRY_VERSION: HeaderName =
    HeaderName::from_static("x-docker-registry-version");
pub static X_DOCKER_ENDPOINTS: HeaderName = HeaderName::from_static("x-docker-endpoints");
pub static X_DOCKER_SIZE: HeaderName = HeaderName::from_static("x-docker-size");

/// Echoes the host the client talked to back as `X-Docker-Endpoints`, which docker-pull uses to
/// pick where subsequent requests go.
pub async fn add_docker_endpoints<B>(req: Request<B>, next: Next<B>) -> Response {
    let endpoints = request_host(&req);
    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert(X_DOCKER_ENDPOINTS.clone(), endpoints);
    response
}

fn request_host<B>(req: &Request<B>) -> HeaderValue {
    if let Some(host) = req.headers().get(header::HOST) {
        return host.clone();
    }
    req.uri()
        .authority()
        .and_then(|authority| HeaderValue::from_str(authority.as_str()).ok())
        .unwrap_or_else(|| HeaderValue::from_static(""))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn host_header_wins() {
        let req = Request::builder()
            .uri("http://authority.example.com/v1/_ping")
            .header(header::HOST, "registry.example.com:5000")
            .body(())
            .unwrap();
        assert_eq!(request_host(&req), "registry.example.com:5000");
    }

    #[test]
    fn falls_back_to_authority() {
        let req = Request::builder()
            .uri("http://authority.example.com/v1/_ping")
            .body(())
            .unwrap();
        assert_eq!(request_host(&req), "authority.example.com");
    }

    #[test]
    fn empty_without_host() {
        let req = Request::builder().uri("/v1/_ping").body(()).unwrap();
        assert_eq!(request_host(&req), "");
    }
}

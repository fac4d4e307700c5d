use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};

use crate::{adapters::state::HostSettings, application::services::PublicOrigin};

fn first_header_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `X-Forwarded-Host` counts only when configured as trusted; otherwise the
/// `Host` header wins, then the URI, then the configured fallback.
impl<S> FromRequestParts<S> for PublicOrigin
where
    S: Send + Sync,
    HostSettings: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let protocol = first_header_value(parts, "x-forwarded-proto")
            .map(|p| p.to_ascii_lowercase())
            .or_else(|| parts.uri.scheme_str().map(str::to_string))
            .filter(|p| p == "http" || p == "https")
            .unwrap_or_else(|| "http".to_string());

        let settings = HostSettings::from_ref(state);
        let forwarded_host = if settings.trust_forwarded_host {
            first_header_value(parts, "x-forwarded-host")
        } else {
            None
        };

        let host = forwarded_host
            .or_else(|| first_header_value(parts, header::HOST.as_str()))
            .or_else(|| parts.uri.authority().map(|a| a.to_string()))
            .unwrap_or(settings.fallback_host);

        Ok(PublicOrigin::new(protocol, host))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn origin_with(request: Request<()>, trust_forwarded_host: bool) -> PublicOrigin {
        let (mut parts, _) = request.into_parts();
        let settings = HostSettings {
            fallback_host: "fallback.test".to_string(),
            trust_forwarded_host,
        };
        PublicOrigin::from_request_parts(&mut parts, &settings)
            .await
            .unwrap()
    }

    async fn origin_of(request: Request<()>) -> PublicOrigin {
        origin_with(request, false).await
    }

    fn forwarded_request() -> Request<()> {
        Request::builder()
            .uri("/api/upload")
            .header("host", "internal:4000")
            .header("x-forwarded-proto", "HTTPS")
            .header("x-forwarded-host", "stays.example, proxy.local")
            .body(())
            .unwrap()
    }

    #[tokio::test]
    async fn forwarded_host_ignored_unless_trusted() {
        assert_eq!(
            origin_of(forwarded_request()).await,
            PublicOrigin::new("https", "internal:4000")
        );
    }

    #[tokio::test]
    async fn trusted_forwarded_host_wins() {
        assert_eq!(
            origin_with(forwarded_request(), true).await,
            PublicOrigin::new("https", "stays.example")
        );
    }

    #[tokio::test]
    async fn uses_host_header() {
        let request = Request::builder()
            .uri("/api/upload")
            .header("host", "localhost:4000")
            .body(())
            .unwrap();

        assert_eq!(
            origin_of(request).await,
            PublicOrigin::new("http", "localhost:4000")
        );
    }

    #[tokio::test]
    async fn falls_back_to_configured_host_and_http() {
        let request = Request::builder()
            .uri("/api/upload")
            .header("x-forwarded-proto", "gopher")
            .body(())
            .unwrap();

        assert_eq!(
            origin_of(request).await,
            PublicOrigin::new("http", "fallback.test")
        );
    }
}

//! Transport helpers for the gRPC server.
//!
//! The acting user is carried in the `x-user-id` header, set by the
//! authentication layer in front of this service.

use tower_http::trace::TraceLayer;

/// Metadata header naming the acting user.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Read the acting user from request headers. Blank values count as absent.
pub fn user_id_from_headers(headers: &http::HeaderMap) -> Option<&str> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Create a tower-http trace layer for gRPC servers.
///
/// Opens one `grpc` span per request with the acting user and method path.
pub fn grpc_trace_layer() -> TraceLayer<
    tower_http::classify::SharedClassifier<tower_http::classify::GrpcErrorsAsFailures>,
    impl Fn(&http::Request<tonic::body::BoxBody>) -> tracing::Span + Clone,
> {
    TraceLayer::new_for_grpc().make_span_with(|request: &http::Request<tonic::body::BoxBody>| {
        let user_id = user_id_from_headers(request.headers()).unwrap_or("");
        let path = request.uri().path();
        tracing::info_span!("grpc", %user_id, %path)
    })
}

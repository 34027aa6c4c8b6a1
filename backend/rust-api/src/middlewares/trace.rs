use axum::{
    extract::Request,
    http::{header::HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// Every request gets a trace identifier: the client's if it sent one, a
/// fresh uuid otherwise. The id is stamped on both sides of the exchange so
/// exam clients and log pipelines can correlate a session action end to end.
pub async fn trace_context_middleware(mut request: Request, next: Next) -> Response {
    let trace_id = incoming_trace_id(&request).unwrap_or_else(|| Uuid::new_v4().to_string());

    stamp(request.headers_mut(), &trace_id);
    let mut response = next.run(request).await;
    stamp(response.headers_mut(), &trace_id);

    response
}

fn incoming_trace_id(request: &Request) -> Option<String> {
    request
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

// Never overwrites an id a handler or the client already placed there.
fn stamp(headers: &mut axum::http::HeaderMap, trace_id: &str) {
    if headers.contains_key(TRACE_ID_HEADER) {
        return;
    }
    if let Ok(value) = HeaderValue::from_str(trace_id) {
        headers.insert(HeaderName::from_static(TRACE_ID_HEADER), value);
    }
}

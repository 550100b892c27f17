#[cfg(test)]
mod tests {
    use crate::routes::routes;
    use crate::test_support::agenda;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    fn router() -> Router {
        let (_, service) = agenda();
        routes(service)
    }

    async fn send(router: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_routes_configuration() {
        let router = router();
        let (status, _) = send(router.clone(), Method::GET, "/availability?date=2025-05-06", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(router.clone(), Method::GET, "/calendar?year=2025&month=5", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(router.clone(), Method::GET, "/admin/schedule", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(router, Method::GET, "/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_preview_route_is_not_taken_for_a_date() {
        let body = serde_json::json!({
            "date": "2025-05-06",
            "override": {"kind": "BLOCKED_RANGE", "block_start_hour": 15, "block_end_hour": 17}
        });
        let (status, json) = send(router(), Method::POST, "/admin/overrides/preview", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["blocked_hours"], serde_json::json!([15, 16]));
        assert_eq!(json["slots"].as_array().map(Vec::len), Some(7));
    }

    #[tokio::test]
    async fn test_errors_are_json() {
        let (status, json) = send(router(), Method::DELETE, "/admin/overrides/2025-05-06", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], 404);
        assert!(json["error"]["message"].as_str().is_some());
    }
}

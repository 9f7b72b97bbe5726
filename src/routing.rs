//! Application router configuration with identified and open route definitions.

use axum::{
    Router,
    http::{HeaderValue, header::CACHE_CONTROL},
    middleware,
    routing::{get, post},
};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::{
    AppState, endpoints,
    category::suggest_category_endpoint,
    identity::{get_log_out, identity_layer},
    not_found::get_404_not_found,
    record::create_record_endpoint,
    summary::{get_best_worst_expense, get_spending_total},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let open_routes = Router::new()
        .route(endpoints::SUGGEST_CATEGORY, post(suggest_category_endpoint))
        .route(endpoints::LOG_OUT, get(get_log_out));

    // Summaries change with every new record, so clients must fetch them fresh.
    let summary_routes = Router::new()
        .route(endpoints::BEST_WORST, get(get_best_worst_expense))
        .route(endpoints::SUMMARY, get(get_spending_total))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    // Handlers behind this layer reply with "User not found" themselves when no identity is
    // resolved.
    let identified_routes = Router::new()
        .route(endpoints::RECORDS, post(create_record_endpoint))
        .merge(summary_routes)
        .layer(middleware::from_fn_with_state(state.clone(), identity_layer));

    identified_routes
        .merge(open_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::{StatusCode, header::CACHE_CONTROL};
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::{
        build_router, endpoints,
        identity::COOKIE_TOKEN,
        test_utils::{StubCategorizer, StubIdentityProvider, get_test_state},
    };

    fn get_test_server(
        identity_provider: StubIdentityProvider,
        categorizer: StubCategorizer,
    ) -> TestServer {
        let state = get_test_state(Arc::new(identity_provider), Arc::new(categorizer));

        TestServer::new(build_router(state))
    }

    fn get_counting_test_server(identity_provider: Arc<StubIdentityProvider>) -> TestServer {
        let categorizer = Arc::new(StubCategorizer::answering("Food"));
        let state = get_test_state(identity_provider, categorizer);

        TestServer::new(build_router(state))
    }

    const COFFEE: [(&str, &str); 4] = [
        ("text", "Coffee"),
        ("amount", "3.50"),
        ("category", "Food"),
        ("date", "2024-03-15"),
    ];

    #[tokio::test]
    async fn record_then_summarize() {
        let server = get_test_server(
            StubIdentityProvider::signed_in("user_1"),
            StubCategorizer::answering("Food"),
        );

        let response = server
            .post(endpoints::RECORDS)
            .authorization_bearer("sess_123")
            .form(&COFFEE)
            .await;
        response.assert_status_ok();
        response.assert_json(&json!({
            "data": {
                "text": "Coffee",
                "amount": 3.5,
                "category": "Food",
                "date": "2024-03-15T12:00:00Z"
            }
        }));
        let cookie = response.cookie(COOKIE_TOKEN);

        let response = server
            .get(endpoints::SUMMARY)
            .add_cookie(cookie.clone())
            .await;
        response.assert_status_ok();
        response.assert_json(&json!({"data": {"record": 3.5, "days_with_records": 1}}));

        let response = server.get(endpoints::BEST_WORST).add_cookie(cookie).await;
        response.assert_status_ok();
        response.assert_json(&json!({"data": {"best_expense": 3.5, "worst_expense": 3.5}}));
    }

    #[tokio::test]
    async fn invalid_record_is_bad_request() {
        let server = get_test_server(
            StubIdentityProvider::signed_in("user_1"),
            StubCategorizer::answering("Food"),
        );

        let response = server
            .post(endpoints::RECORDS)
            .authorization_bearer("sess_123")
            .form(&[
                ("text", "Coffee"),
                ("amount", "-5"),
                ("category", "Food"),
                ("date", "2024-03-15"),
            ])
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({"error": "Amount must be zero or greater"}));
    }

    #[tokio::test]
    async fn missing_or_empty_amount_is_stored_as_zero() {
        let server = get_test_server(
            StubIdentityProvider::signed_in("user_1"),
            StubCategorizer::answering("Food"),
        );

        let with_empty_amount = server
            .post(endpoints::RECORDS)
            .authorization_bearer("sess_123")
            .form(&[
                ("text", "Coffee"),
                ("amount", ""),
                ("category", "Food"),
                ("date", "2024-03-15"),
            ])
            .await;
        let without_amount = server
            .post(endpoints::RECORDS)
            .authorization_bearer("sess_123")
            .form(&[("text", "Tea"), ("category", "Food"), ("date", "2024-03-16")])
            .await;

        with_empty_amount.assert_status_ok();
        assert_eq!(with_empty_amount.json::<Value>()["data"]["amount"], json!(0.0));
        without_amount.assert_status_ok();
        assert_eq!(without_amount.json::<Value>()["data"]["amount"], json!(0.0));
    }

    #[tokio::test]
    async fn invalid_record_skips_identity_provider() {
        let provider = Arc::new(StubIdentityProvider::signed_in("user_1"));
        let server = get_counting_test_server(provider.clone());

        let response = server
            .post(endpoints::RECORDS)
            .authorization_bearer("sess_123")
            .form(&[("text", ""), ("category", "Food"), ("date", "2024-03-15")])
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({"error": "Text is required"}));
        assert_eq!(provider.authoritative_calls(), 0);
        assert!(response.maybe_cookie(COOKIE_TOKEN).is_none());
    }

    #[tokio::test]
    async fn json_record_body_gets_json_error() {
        let provider = Arc::new(StubIdentityProvider::signed_in("user_1"));
        let server = get_counting_test_server(provider.clone());

        let response = server
            .post(endpoints::RECORDS)
            .authorization_bearer("sess_123")
            .json(&json!({
                "text": "Coffee",
                "amount": 3.5,
                "category": "Food",
                "date": "2024-03-15"
            }))
            .await;

        response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
        response.assert_json(&json!({
            "error": "Form requests must have `Content-Type: application/x-www-form-urlencoded`"
        }));
        assert_eq!(provider.authoritative_calls(), 0);
    }

    #[tokio::test]
    async fn json_suggestion_body_gets_fallback_category() {
        let categorizer = StubCategorizer::answering("Transportation");
        let server = get_test_server(StubIdentityProvider::signed_out(), categorizer);

        let response = server
            .post(endpoints::SUGGEST_CATEGORY)
            .json(&json!({"description": "taxi home"}))
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({
            "category": "Other",
            "error": "Form requests must have `Content-Type: application/x-www-form-urlencoded`"
        }));
    }

    #[tokio::test]
    async fn summaries_are_not_cached() {
        let server = get_test_server(
            StubIdentityProvider::signed_in("user_1"),
            StubCategorizer::answering("Food"),
        );

        for endpoint in [endpoints::BEST_WORST, endpoints::SUMMARY] {
            let response = server
                .get(endpoint)
                .authorization_bearer("sess_123")
                .await;

            response.assert_status_ok();
            response.assert_header(CACHE_CONTROL, "no-store");
        }
    }

    #[tokio::test]
    async fn unidentified_caller_is_unauthorized() {
        let server = get_test_server(
            StubIdentityProvider::signed_out(),
            StubCategorizer::answering("Food"),
        );

        for endpoint in [endpoints::BEST_WORST, endpoints::SUMMARY] {
            let response = server.get(endpoint).await;

            response.assert_status(StatusCode::UNAUTHORIZED);
            response.assert_json(&json!({"error": "User not found"}));
        }

        let response = server.post(endpoints::RECORDS).form(&COFFEE).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&json!({
            "error": "User not found. Please try refreshing the page."
        }));
    }

    #[tokio::test]
    async fn provider_outage_is_unauthorized() {
        let server = get_test_server(
            StubIdentityProvider::failing(),
            StubCategorizer::answering("Food"),
        );

        let response = server
            .get(endpoints::SUMMARY)
            .authorization_bearer("sess_123")
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&json!({"error": "User not found"}));
    }

    #[tokio::test]
    async fn suggest_category_does_not_need_identity() {
        let server = get_test_server(
            StubIdentityProvider::signed_out(),
            StubCategorizer::answering("Transportation"),
        );

        let response = server
            .post(endpoints::SUGGEST_CATEGORY)
            .form(&[("description", "taxi home")])
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({"category": "Transportation"}));
    }

    #[tokio::test]
    async fn log_out_clears_identity_cookie() {
        let server = get_test_server(
            StubIdentityProvider::signed_in("user_1"),
            StubCategorizer::answering("Food"),
        );

        let response = server.get(endpoints::LOG_OUT).await;

        response.assert_status(StatusCode::NO_CONTENT);
        assert_eq!(
            response.cookie(COOKIE_TOKEN).max_age(),
            Some(time::Duration::ZERO)
        );
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_test_server(
            StubIdentityProvider::signed_in("user_1"),
            StubCategorizer::answering("Food"),
        );

        let response = server.get("/api/nope").await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.json::<Value>(), json!({"error": "Not found"}));
    }
}

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use crates::domain::repositories::{
    invoices::InvoiceRepository, payment_methods::PaymentMethodRepository,
    profiles::ProfileRepository, subscriptions::SubscriptionRepository,
};
use serde_json::json;

use super::subscriptions::subscription_usecase;
use crate::{
    axum_http::{
        error_responses::{AppError, map_error},
        http_serve::AppContext,
    },
    usecases::subscriptions::{StripeGateway, SubscriptionUseCase, WebhookOutcome},
};

pub const STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";

pub fn routes(ctx: &AppContext) -> Router {
    routes_with(subscription_usecase(ctx))
}

pub fn routes_with<S, I, M, P, St>(usecase: Arc<SubscriptionUseCase<S, I, M, P, St>>) -> Router
where
    S: SubscriptionRepository + Send + Sync + 'static,
    I: InvoiceRepository + Send + Sync + 'static,
    M: PaymentMethodRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    St: StripeGateway + 'static,
{
    Router::new()
        .route("/stripe", post(stripe_webhook))
        .with_state(usecase)
}

/// Unauthenticated; the signature header is the only trust anchor.
pub async fn stripe_webhook<S, I, M, P, St>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<S, I, M, P, St>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    S: SubscriptionRepository + Send + Sync + 'static,
    I: InvoiceRepository + Send + Sync + 'static,
    M: PaymentMethodRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    St: StripeGateway + 'static,
{
    let Some(signature) = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
    else {
        return AppError::BadRequest("missing Stripe-Signature header".to_string()).into_response();
    };

    match subscriptions_usecase
        .handle_stripe_webhook(&body, signature)
        .await
    {
        Ok(WebhookOutcome::Processed) => {
            (StatusCode::OK, Json(json!({ "received": true }))).into_response()
        }
        Ok(WebhookOutcome::Ignored(reason)) => (
            StatusCode::OK,
            Json(json!({ "received": true, "ignored": reason })),
        )
            .into_response(),
        Err(err) => map_error("stripe_webhook", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::subscriptions::MockStripeGateway;
    use axum::{body::Body, http::Request};
    use crates::domain::{
        repositories::{
            invoices::MockInvoiceRepository, payment_methods::MockPaymentMethodRepository,
            profiles::MockProfileRepository, subscriptions::MockSubscriptionRepository,
        },
        value_objects::subscriptions::PriceCatalog,
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn router(stripe: MockStripeGateway) -> Router {
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo.expect_upsert().never();

        routes_with(Arc::new(SubscriptionUseCase::new(
            Arc::new(subscription_repo),
            Arc::new(MockInvoiceRepository::new()),
            Arc::new(MockPaymentMethodRepository::new()),
            Arc::new(MockProfileRepository::new()),
            Arc::new(stripe),
            PriceCatalog::new("price_monthly", "price_yearly"),
        )))
    }

    fn webhook_request(signature: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri("/stripe");
        if let Some(signature) = signature {
            builder = builder.header(STRIPE_SIGNATURE_HEADER, signature);
        }
        builder
            .body(Body::from(r#"{"type":"customer.subscription.created"}"#))
            .unwrap()
    }

    #[tokio::test]
    async fn bad_signature_returns_400() {
        let mut stripe = MockStripeGateway::new();
        stripe
            .expect_verify_webhook_signature()
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("no matching v1 signature")));

        let response = router(stripe)
            .oneshot(webhook_request(Some("t=1,v1=deadbeef")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], 400);
    }

    #[tokio::test]
    async fn missing_signature_header_returns_400_without_verifying() {
        let mut stripe = MockStripeGateway::new();
        stripe.expect_verify_webhook_signature().never();

        let response = router(stripe).oneshot(webhook_request(None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unhandled_event_is_acknowledged() {
        let mut stripe = MockStripeGateway::new();
        stripe.expect_verify_webhook_signature().returning(|_, _| {
            Ok(serde_json::from_value(serde_json::json!({
                "id": "evt_9",
                "type": "charge.refunded",
                "data": { "object": {} }
            }))
            .unwrap())
        });

        let response = router(stripe)
            .oneshot(webhook_request(Some("t=1,v1=ok")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}

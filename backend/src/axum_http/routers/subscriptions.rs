use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use crates::{
    domain::{
        repositories::{
            invoices::InvoiceRepository, payment_methods::PaymentMethodRepository,
            profiles::ProfileRepository, subscriptions::SubscriptionRepository,
        },
        value_objects::subscriptions::CreateCheckoutRequest,
    },
    infra::db::repositories::{
        invoices::InvoicePostgres, payment_methods::PaymentMethodPostgres,
        profiles::ProfilePostgres, subscriptions::SubscriptionPostgres,
    },
    payments::stripe_client::StripeClient,
};

use crate::{
    auth::AuthUser,
    axum_http::{error_responses::map_error, http_serve::AppContext},
    usecases::subscriptions::{StripeGateway, SubscriptionUseCase},
};

pub(crate) type Subscriptions = SubscriptionUseCase<
    SubscriptionPostgres,
    InvoicePostgres,
    PaymentMethodPostgres,
    ProfilePostgres,
    StripeClient,
>;

pub(crate) fn subscription_usecase(ctx: &AppContext) -> Arc<Subscriptions> {
    let subscriptions_repository = SubscriptionPostgres::new(Arc::clone(&ctx.db_pool));
    let invoices_repository = InvoicePostgres::new(Arc::clone(&ctx.db_pool));
    let payment_methods_repository = PaymentMethodPostgres::new(Arc::clone(&ctx.db_pool));
    let profiles_repository = ProfilePostgres::new(Arc::clone(&ctx.db_pool));

    Arc::new(SubscriptionUseCase::new(
        Arc::new(subscriptions_repository),
        Arc::new(invoices_repository),
        Arc::new(payment_methods_repository),
        Arc::new(profiles_repository),
        Arc::clone(&ctx.stripe),
        ctx.price_catalog.clone(),
    ))
}

pub fn routes(ctx: &AppContext) -> Router {
    Router::new()
        .route("/current", get(current))
        .route("/checkout", post(checkout))
        .route("/cancel", post(cancel))
        .route("/sync", post(sync))
        .route("/invoices", get(invoices))
        .route("/payment-methods", get(payment_methods))
        .with_state(subscription_usecase(ctx))
}

pub async fn current<S, I, M, P, St>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<S, I, M, P, St>>>,
    auth: AuthUser,
) -> Response
where
    S: SubscriptionRepository + Send + Sync + 'static,
    I: InvoiceRepository + Send + Sync + 'static,
    M: PaymentMethodRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    St: StripeGateway + 'static,
{
    match subscriptions_usecase.get_current(auth.user_id).await {
        Ok(subscription) => (StatusCode::OK, Json(subscription)).into_response(),
        Err(err) => map_error("current", err),
    }
}

pub async fn checkout<S, I, M, P, St>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<S, I, M, P, St>>>,
    auth: AuthUser,
    Json(request): Json<CreateCheckoutRequest>,
) -> Response
where
    S: SubscriptionRepository + Send + Sync + 'static,
    I: InvoiceRepository + Send + Sync + 'static,
    M: PaymentMethodRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    St: StripeGateway + 'static,
{
    match subscriptions_usecase
        .create_checkout_session(auth.user_id, auth.email, request)
        .await
    {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(err) => map_error("checkout", err),
    }
}

pub async fn cancel<S, I, M, P, St>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<S, I, M, P, St>>>,
    auth: AuthUser,
) -> Response
where
    S: SubscriptionRepository + Send + Sync + 'static,
    I: InvoiceRepository + Send + Sync + 'static,
    M: PaymentMethodRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    St: StripeGateway + 'static,
{
    match subscriptions_usecase.cancel(auth.user_id).await {
        Ok(subscription) => (StatusCode::OK, Json(subscription)).into_response(),
        Err(err) => map_error("cancel", err),
    }
}

pub async fn sync<S, I, M, P, St>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<S, I, M, P, St>>>,
    auth: AuthUser,
) -> Response
where
    S: SubscriptionRepository + Send + Sync + 'static,
    I: InvoiceRepository + Send + Sync + 'static,
    M: PaymentMethodRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    St: StripeGateway + 'static,
{
    match subscriptions_usecase.sync_subscription(auth.user_id).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => map_error("sync", err),
    }
}

pub async fn invoices<S, I, M, P, St>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<S, I, M, P, St>>>,
    auth: AuthUser,
) -> Response
where
    S: SubscriptionRepository + Send + Sync + 'static,
    I: InvoiceRepository + Send + Sync + 'static,
    M: PaymentMethodRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    St: StripeGateway + 'static,
{
    match subscriptions_usecase.list_invoices(auth.user_id).await {
        Ok(invoices) => (StatusCode::OK, Json(invoices)).into_response(),
        Err(err) => map_error("invoices", err),
    }
}

pub async fn payment_methods<S, I, M, P, St>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<S, I, M, P, St>>>,
    auth: AuthUser,
) -> Response
where
    S: SubscriptionRepository + Send + Sync + 'static,
    I: InvoiceRepository + Send + Sync + 'static,
    M: PaymentMethodRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    St: StripeGateway + 'static,
{
    match subscriptions_usecase.list_payment_methods(auth.user_id).await {
        Ok(methods) => (StatusCode::OK, Json(methods)).into_response(),
        Err(err) => map_error("payment_methods", err),
    }
}

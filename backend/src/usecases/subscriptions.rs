use std::sync::Arc;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use chrono::Utc;
use crates::{
    domain::{
        entities::{
            invoices::InsertInvoiceEntity,
            subscriptions::{SubscriptionEntity, UpsertSubscriptionEntity},
        },
        repositories::{
            invoices::InvoiceRepository, payment_methods::PaymentMethodRepository,
            profiles::ProfileRepository, subscriptions::SubscriptionRepository,
        },
        value_objects::{
            enums::{
                billing_cycles::BillingCycle, invoice_statuses::InvoiceStatus,
                subscription_statuses::SubscriptionStatus, subscription_tiers::SubscriptionTier,
            },
            subscriptions::{
                CheckoutSessionDto, CreateCheckoutRequest, InvoiceDto, PaymentMethodDto,
                PriceCatalog, SubscriptionDto, SyncResultDto, effective_tier, sync_tier,
            },
        },
    },
    payments::stripe_client::{
        CheckoutSession, CheckoutSessionParams, StripeClient, StripeEvent, StripeInvoiceObject,
        StripeSubscriptionObject,
    },
};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StripeGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        price_id: String,
        user_id: Uuid,
        customer_id: Option<String>,
        customer_email: Option<String>,
    ) -> AnyResult<CheckoutSession>;

    async fn cancel_subscription(&self, stripe_subscription_id: String) -> AnyResult<()>;

    fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> AnyResult<StripeEvent>;
}

#[async_trait]
impl StripeGateway for StripeClient {
    async fn create_checkout_session(
        &self,
        price_id: String,
        user_id: Uuid,
        customer_id: Option<String>,
        customer_email: Option<String>,
    ) -> AnyResult<CheckoutSession> {
        self.create_checkout_session(CheckoutSessionParams {
            price_id: &price_id,
            user_id,
            customer_id: customer_id.as_deref(),
            customer_email: customer_email.as_deref(),
        })
        .await
    }

    async fn cancel_subscription(&self, stripe_subscription_id: String) -> AnyResult<()> {
        self.cancel_subscription(&stripe_subscription_id).await
    }

    fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> AnyResult<StripeEvent> {
        self.verify_webhook_signature(payload, signature)
    }
}

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("invalid webhook payload: {0}")]
    InvalidWebhook(String),
    #[error("no active subscription")]
    NotFound,
    #[error("payment provider error")]
    Provider(#[source] anyhow::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SubscriptionError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            SubscriptionError::InvalidRequest(_) | SubscriptionError::InvalidWebhook(_) => {
                StatusCode::BAD_REQUEST
            }
            SubscriptionError::NotFound => StatusCode::NOT_FOUND,
            SubscriptionError::Provider(_) => StatusCode::BAD_GATEWAY,
            SubscriptionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, SubscriptionError>;

/// What the webhook did with an event. Both are acknowledged with 200.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookOutcome {
    Processed,
    Ignored(&'static str),
}

pub struct SubscriptionUseCase<S, I, M, P, Stripe>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    I: InvoiceRepository + Send + Sync + 'static,
    M: PaymentMethodRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    Stripe: StripeGateway + 'static,
{
    subscription_repo: Arc<S>,
    invoice_repo: Arc<I>,
    payment_method_repo: Arc<M>,
    profile_repo: Arc<P>,
    stripe_client: Arc<Stripe>,
    price_catalog: PriceCatalog,
}

impl<S, I, M, P, Stripe> SubscriptionUseCase<S, I, M, P, Stripe>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    I: InvoiceRepository + Send + Sync + 'static,
    M: PaymentMethodRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    Stripe: StripeGateway + 'static,
{
    pub fn new(
        subscription_repo: Arc<S>,
        invoice_repo: Arc<I>,
        payment_method_repo: Arc<M>,
        profile_repo: Arc<P>,
        stripe_client: Arc<Stripe>,
        price_catalog: PriceCatalog,
    ) -> Self {
        Self {
            subscription_repo,
            invoice_repo,
            payment_method_repo,
            profile_repo,
            stripe_client,
            price_catalog,
        }
    }

    pub async fn get_current(&self, user_id: Uuid) -> UseCaseResult<SubscriptionDto> {
        let subscription = self.load_subscription(user_id).await?;
        Ok(subscription
            .map(SubscriptionDto::from)
            .unwrap_or_else(SubscriptionDto::implicit_free))
    }

    pub async fn create_checkout_session(
        &self,
        user_id: Uuid,
        user_email: Option<String>,
        request: CreateCheckoutRequest,
    ) -> UseCaseResult<CheckoutSessionDto> {
        let cycle = BillingCycle::from_str(request.billing_cycle.trim()).ok_or_else(|| {
            SubscriptionError::InvalidRequest(format!(
                "unknown billing_cycle: {}",
                request.billing_cycle
            ))
        })?;

        let price_id = self.price_catalog.price_for(cycle).to_string();
        if price_id.is_empty() {
            error!(%user_id, billing_cycle = %cycle, "subscriptions: no price configured for cycle");
            return Err(SubscriptionError::InvalidRequest(format!(
                "{cycle} billing is not available"
            )));
        }

        let existing = self.load_subscription(user_id).await?;
        if effective_tier(existing.as_ref()).is_premium() {
            let err = SubscriptionError::InvalidRequest("already subscribed to premium".to_string());
            warn!(
                %user_id,
                status = err.status_code().as_u16(),
                "subscriptions: checkout attempted with an active premium subscription"
            );
            return Err(err);
        }

        let customer_id = existing.and_then(|row| row.stripe_customer_id);
        let customer_email = if customer_id.is_some() { None } else { user_email };

        info!(
            %user_id,
            billing_cycle = %cycle,
            reuse_customer = customer_id.is_some(),
            "subscriptions: creating checkout session"
        );

        let session = self
            .stripe_client
            .create_checkout_session(price_id, user_id, customer_id, customer_email)
            .await
            .map_err(|err| {
                error!(%user_id, error = ?err, "subscriptions: checkout session creation failed");
                SubscriptionError::Provider(err)
            })?;

        Ok(CheckoutSessionDto {
            checkout_url: session.url,
            session_id: session.id,
        })
    }

    pub async fn cancel(&self, user_id: Uuid) -> UseCaseResult<SubscriptionDto> {
        let mut subscription = self
            .load_subscription(user_id)
            .await?
            .ok_or(SubscriptionError::NotFound)?;
        let stripe_subscription_id = subscription
            .stripe_subscription_id
            .clone()
            .ok_or(SubscriptionError::NotFound)?;

        self.stripe_client
            .cancel_subscription(stripe_subscription_id.clone())
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %stripe_subscription_id,
                    error = ?err,
                    "subscriptions: provider cancel failed"
                );
                SubscriptionError::Provider(err)
            })?;

        self.subscription_repo
            .set_cancel_at_period_end(user_id, true)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "subscriptions: failed to store cancel flag");
                SubscriptionError::Internal(err)
            })?;

        info!(%user_id, %stripe_subscription_id, "subscriptions: cancel at period end scheduled");
        subscription.cancel_at_period_end = true;
        Ok(SubscriptionDto::from(subscription))
    }

    /// Re-derives the profile tier from the local row. Never calls Stripe.
    pub async fn sync_subscription(&self, user_id: Uuid) -> UseCaseResult<SyncResultDto> {
        let subscription = self.load_subscription(user_id).await?;
        let tier = sync_tier(subscription.as_ref());
        self.mirror_tier(user_id, tier).await?;
        info!(%user_id, tier = %tier, "subscriptions: tier synced");
        Ok(SyncResultDto { tier })
    }

    /// The only writer of `profiles.subscription_tier`.
    pub async fn mirror_tier(&self, user_id: Uuid, tier: SubscriptionTier) -> UseCaseResult<()> {
        self.profile_repo
            .set_subscription_tier(user_id, tier)
            .await
            .map_err(|err| {
                error!(%user_id, tier = %tier, db_error = ?err, "subscriptions: failed to mirror tier");
                SubscriptionError::Internal(err)
            })
    }

    pub async fn list_invoices(&self, user_id: Uuid) -> UseCaseResult<Vec<InvoiceDto>> {
        let invoices = self.invoice_repo.list_for_user(user_id).await.map_err(|err| {
            error!(%user_id, db_error = ?err, "subscriptions: failed to list invoices");
            SubscriptionError::Internal(err)
        })?;
        Ok(invoices.into_iter().map(InvoiceDto::from).collect())
    }

    pub async fn list_payment_methods(&self, user_id: Uuid) -> UseCaseResult<Vec<PaymentMethodDto>> {
        let methods = self
            .payment_method_repo
            .list_for_user(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "subscriptions: failed to list payment methods");
                SubscriptionError::Internal(err)
            })?;
        Ok(methods.into_iter().map(PaymentMethodDto::from).collect())
    }

    pub async fn handle_stripe_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> UseCaseResult<WebhookOutcome> {
        let event = self
            .stripe_client
            .verify_webhook_signature(payload, signature)
            .map_err(|err| {
                warn!(error = %err, "subscriptions: webhook signature rejected");
                SubscriptionError::InvalidWebhook(err.to_string())
            })?;

        let event_id = event.id.clone().unwrap_or_default();
        info!(%event_id, event_type = %event.type_, "subscriptions: webhook received");

        let outcome = match event.type_.as_str() {
            "customer.subscription.created" | "customer.subscription.updated" => {
                self.on_subscription_changed(parse_object(event)?).await?
            }
            "customer.subscription.deleted" => {
                self.on_subscription_deleted(parse_object(event)?).await?
            }
            "invoice.payment_succeeded" => {
                self.on_invoice(parse_object(event)?, InvoiceStatus::Paid).await?
            }
            "invoice.payment_failed" => {
                self.on_invoice(parse_object(event)?, InvoiceStatus::Pending).await?
            }
            other => {
                debug!(event_type = other, "subscriptions: ignoring unhandled event type");
                WebhookOutcome::Ignored("unhandled event type")
            }
        };

        if let WebhookOutcome::Ignored(reason) = &outcome {
            info!(%event_id, reason, "subscriptions: webhook acknowledged without changes");
        }
        Ok(outcome)
    }

    async fn on_subscription_changed(
        &self,
        object: StripeSubscriptionObject,
    ) -> UseCaseResult<WebhookOutcome> {
        let Some(user_id) = object.user_id() else {
            warn!(
                stripe_subscription_id = %object.id,
                "subscriptions: subscription event without userId metadata"
            );
            return Ok(WebhookOutcome::Ignored("missing userId metadata"));
        };
        if !self.is_known_user(user_id).await? {
            return Ok(WebhookOutcome::Ignored("unknown user"));
        }

        let (tier, billing_cycle) = self.price_catalog.resolve(object.price_id());
        let status = SubscriptionStatus::from_provider(object.status.as_deref().unwrap_or_default());

        let row = self
            .upsert(UpsertSubscriptionEntity {
                user_id,
                tier: tier.as_str().to_string(),
                status: status.to_string(),
                stripe_customer_id: object.customer.clone(),
                stripe_subscription_id: Some(object.id.clone()),
                billing_cycle: billing_cycle.map(|cycle| cycle.as_str().to_string()),
                current_period_start: object.period_start(),
                current_period_end: object.period_end(),
                cancel_at_period_end: object.cancel_at_period_end,
                updated_at: Utc::now(),
            })
            .await?;

        let effective = effective_tier(Some(&row));
        self.mirror_tier(user_id, effective).await?;
        info!(%user_id, tier = %effective, status = %status, "subscriptions: subscription upserted");

        Ok(WebhookOutcome::Processed)
    }

    async fn on_subscription_deleted(
        &self,
        object: StripeSubscriptionObject,
    ) -> UseCaseResult<WebhookOutcome> {
        let Some(user_id) = object.user_id() else {
            warn!(
                stripe_subscription_id = %object.id,
                "subscriptions: deletion event without userId metadata"
            );
            return Ok(WebhookOutcome::Ignored("missing userId metadata"));
        };
        if !self.is_known_user(user_id).await? {
            return Ok(WebhookOutcome::Ignored("unknown user"));
        }

        self.upsert(UpsertSubscriptionEntity {
            user_id,
            tier: SubscriptionTier::Free.as_str().to_string(),
            status: SubscriptionStatus::Canceled.to_string(),
            stripe_customer_id: object.customer.clone(),
            stripe_subscription_id: None,
            billing_cycle: None,
            current_period_start: object.period_start(),
            current_period_end: object.period_end(),
            cancel_at_period_end: false,
            updated_at: Utc::now(),
        })
        .await?;

        self.mirror_tier(user_id, SubscriptionTier::Free).await?;
        info!(%user_id, "subscriptions: subscription deleted, downgraded to free");

        Ok(WebhookOutcome::Processed)
    }

    async fn on_invoice(
        &self,
        object: StripeInvoiceObject,
        status: InvoiceStatus,
    ) -> UseCaseResult<WebhookOutcome> {
        let Some(stripe_subscription_id) = object.subscription_id().map(str::to_string) else {
            return Ok(WebhookOutcome::Ignored("invoice without subscription"));
        };

        let subscription = self
            .subscription_repo
            .find_by_stripe_subscription_id(&stripe_subscription_id)
            .await
            .map_err(|err| {
                error!(%stripe_subscription_id, db_error = ?err, "subscriptions: invoice lookup failed");
                SubscriptionError::Internal(err)
            })?;
        let Some(subscription) = subscription else {
            warn!(%stripe_subscription_id, "subscriptions: invoice for unknown subscription");
            return Ok(WebhookOutcome::Ignored("unknown subscription"));
        };

        let amount_minor = match status {
            InvoiceStatus::Paid => object.amount_paid,
            InvoiceStatus::Pending => object.amount_due,
        };

        let invoice_id = self
            .invoice_repo
            .create_invoice(InsertInvoiceEntity {
                user_id: subscription.user_id,
                stripe_invoice_id: object.id.clone(),
                amount_minor,
                currency: object.currency.clone().unwrap_or_else(|| "usd".to_string()),
                status: status.to_string(),
                period_start: object.period_start_at(),
                period_end: object.period_end_at(),
                invoice_pdf: object.invoice_pdf.clone(),
            })
            .await
            .map_err(|err| {
                error!(user_id = %subscription.user_id, db_error = ?err, "subscriptions: failed to record invoice");
                SubscriptionError::Internal(err)
            })?;

        info!(
            user_id = %subscription.user_id,
            %invoice_id,
            invoice_status = %status,
            amount_minor,
            "subscriptions: invoice recorded"
        );
        Ok(WebhookOutcome::Processed)
    }

    /// Subscription rows reference a profile, so events for users without one
    /// can never be stored.
    async fn is_known_user(&self, user_id: Uuid) -> UseCaseResult<bool> {
        let profile = self.profile_repo.find(user_id).await.map_err(|err| {
            error!(%user_id, db_error = ?err, "subscriptions: failed to load profile");
            SubscriptionError::Internal(err)
        })?;

        if profile.is_none() {
            warn!(%user_id, "subscriptions: event for a user without a profile");
        }
        Ok(profile.is_some())
    }

    async fn upsert(
        &self,
        subscription: UpsertSubscriptionEntity,
    ) -> UseCaseResult<SubscriptionEntity> {
        let user_id = subscription.user_id;
        self.subscription_repo.upsert(subscription).await.map_err(|err| {
            error!(%user_id, db_error = ?err, "subscriptions: failed to upsert subscription");
            SubscriptionError::Internal(err)
        })
    }

    async fn load_subscription(
        &self,
        user_id: Uuid,
    ) -> UseCaseResult<Option<SubscriptionEntity>> {
        self.subscription_repo.find_by_user(user_id).await.map_err(|err| {
            error!(%user_id, db_error = ?err, "subscriptions: failed to load subscription");
            SubscriptionError::Internal(err)
        })
    }
}

fn parse_object<T: DeserializeOwned>(event: StripeEvent) -> UseCaseResult<T> {
    serde_json::from_value(event.data.object).map_err(|err| {
        warn!(event_type = %event.type_, error = %err, "subscriptions: malformed event object");
        SubscriptionError::InvalidWebhook(format!("malformed {} object", event.type_))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::test_support::{sample_profile, sample_subscription};
    use crates::domain::repositories::{
        invoices::MockInvoiceRepository, payment_methods::MockPaymentMethodRepository,
        profiles::MockProfileRepository, subscriptions::MockSubscriptionRepository,
    };
    use mockall::predicate::eq;
    use serde_json::json;

    type TestUseCase = SubscriptionUseCase<
        MockSubscriptionRepository,
        MockInvoiceRepository,
        MockPaymentMethodRepository,
        MockProfileRepository,
        MockStripeGateway,
    >;

    fn usecase(
        subscription_repo: MockSubscriptionRepository,
        invoice_repo: MockInvoiceRepository,
        profile_repo: MockProfileRepository,
        stripe: MockStripeGateway,
    ) -> TestUseCase {
        SubscriptionUseCase::new(
            Arc::new(subscription_repo),
            Arc::new(invoice_repo),
            Arc::new(MockPaymentMethodRepository::new()),
            Arc::new(profile_repo),
            Arc::new(stripe),
            PriceCatalog::new("price_monthly", "price_yearly"),
        )
    }

    fn profiles_with_known_user() -> MockProfileRepository {
        let mut profile_repo = MockProfileRepository::new();
        profile_repo
            .expect_find()
            .returning(|user_id| Ok(Some(sample_profile(user_id))));
        profile_repo
    }

    fn stripe_delivering(event: serde_json::Value) -> MockStripeGateway {
        let mut stripe = MockStripeGateway::new();
        stripe
            .expect_verify_webhook_signature()
            .returning(move |_, _| Ok(serde_json::from_value(event.clone()).unwrap()));
        stripe
    }

    fn subscription_event(event_type: &str, user_id: Option<Uuid>, price: &str) -> serde_json::Value {
        let metadata = match user_id {
            Some(id) => json!({ "userId": id.to_string() }),
            None => json!({}),
        };
        json!({
            "id": "evt_1",
            "type": event_type,
            "data": { "object": {
                "id": "sub_123",
                "customer": "cus_1",
                "status": "active",
                "cancel_at_period_end": false,
                "metadata": metadata,
                "current_period_start": 1_767_225_600,
                "current_period_end": 1_769_904_000,
                "items": { "data": [ { "price": { "id": price } } ] }
            }}
        })
    }

    fn invoice_event(event_type: &str) -> serde_json::Value {
        json!({
            "id": "evt_2",
            "type": event_type,
            "data": { "object": {
                "id": "in_1",
                "subscription": "sub_123",
                "amount_paid": 999,
                "amount_due": 999,
                "currency": "usd",
                "invoice_pdf": "https://pay.test/in_1.pdf"
            }}
        })
    }

    #[tokio::test]
    async fn created_event_upserts_and_mirrors_premium() {
        let user_id = Uuid::new_v4();

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_upsert()
            .times(1)
            .returning(|row| {
                assert_eq!(row.tier, "premium");
                assert_eq!(row.billing_cycle.as_deref(), Some("yearly"));
                assert_eq!(row.stripe_subscription_id.as_deref(), Some("sub_123"));
                let mut entity = sample_subscription(row.user_id, &row.tier, Some("sub_123"));
                entity.billing_cycle = row.billing_cycle;
                Ok(entity)
            });

        let mut profile_repo = profiles_with_known_user();
        profile_repo
            .expect_set_subscription_tier()
            .with(eq(user_id), eq(SubscriptionTier::Premium))
            .times(1)
            .returning(|_, _| Ok(()));

        let outcome = usecase(
            subscription_repo,
            MockInvoiceRepository::new(),
            profile_repo,
            stripe_delivering(subscription_event(
                "customer.subscription.created",
                Some(user_id),
                "price_yearly",
            )),
        )
        .handle_stripe_webhook(b"{}", "t=1,v1=abc")
        .await
        .unwrap();

        assert_eq!(outcome, WebhookOutcome::Processed);
    }

    #[tokio::test]
    async fn unmapped_price_falls_back_to_free() {
        let user_id = Uuid::new_v4();

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo.expect_upsert().returning(|row| {
            assert_eq!(row.tier, "free");
            assert_eq!(row.billing_cycle, None);
            Ok(sample_subscription(row.user_id, &row.tier, Some("sub_123")))
        });

        let mut profile_repo = profiles_with_known_user();
        profile_repo
            .expect_set_subscription_tier()
            .with(eq(user_id), eq(SubscriptionTier::Free))
            .times(1)
            .returning(|_, _| Ok(()));

        usecase(
            subscription_repo,
            MockInvoiceRepository::new(),
            profile_repo,
            stripe_delivering(subscription_event(
                "customer.subscription.updated",
                Some(user_id),
                "price_legacy",
            )),
        )
        .handle_stripe_webhook(b"{}", "sig")
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn deleted_event_forces_free_and_clears_provider_id() {
        let user_id = Uuid::new_v4();

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_upsert()
            .times(1)
            .returning(|row| {
                assert_eq!(row.tier, "free");
                assert_eq!(row.status, "canceled");
                assert_eq!(row.stripe_subscription_id, None);
                assert_eq!(row.billing_cycle, None);
                Ok(sample_subscription(row.user_id, "free", None))
            });

        let mut profile_repo = profiles_with_known_user();
        profile_repo
            .expect_set_subscription_tier()
            .with(eq(user_id), eq(SubscriptionTier::Free))
            .times(1)
            .returning(|_, _| Ok(()));

        let outcome = usecase(
            subscription_repo,
            MockInvoiceRepository::new(),
            profile_repo,
            stripe_delivering(subscription_event(
                "customer.subscription.deleted",
                Some(user_id),
                "price_monthly",
            )),
        )
        .handle_stripe_webhook(b"{}", "sig")
        .await
        .unwrap();

        assert_eq!(outcome, WebhookOutcome::Processed);
    }

    #[tokio::test]
    async fn missing_user_metadata_is_acknowledged_and_dropped() {
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo.expect_upsert().never();
        let mut profile_repo = MockProfileRepository::new();
        profile_repo.expect_set_subscription_tier().never();

        let outcome = usecase(
            subscription_repo,
            MockInvoiceRepository::new(),
            profile_repo,
            stripe_delivering(subscription_event(
                "customer.subscription.created",
                None,
                "price_monthly",
            )),
        )
        .handle_stripe_webhook(b"{}", "sig")
        .await
        .unwrap();

        assert!(matches!(outcome, WebhookOutcome::Ignored(_)));
    }

    #[tokio::test]
    async fn event_for_user_without_profile_is_acknowledged_and_dropped() {
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo.expect_upsert().never();

        let mut profile_repo = MockProfileRepository::new();
        profile_repo.expect_find().times(1).returning(|_| Ok(None));
        profile_repo.expect_set_subscription_tier().never();

        let outcome = usecase(
            subscription_repo,
            MockInvoiceRepository::new(),
            profile_repo,
            stripe_delivering(subscription_event(
                "customer.subscription.updated",
                Some(Uuid::new_v4()),
                "price_monthly",
            )),
        )
        .handle_stripe_webhook(b"{}", "sig")
        .await
        .unwrap();

        assert_eq!(outcome, WebhookOutcome::Ignored("unknown user"));
    }

    #[tokio::test]
    async fn deletion_for_user_without_profile_is_acknowledged_and_dropped() {
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo.expect_upsert().never();

        let mut profile_repo = MockProfileRepository::new();
        profile_repo.expect_find().times(1).returning(|_| Ok(None));
        profile_repo.expect_set_subscription_tier().never();

        let outcome = usecase(
            subscription_repo,
            MockInvoiceRepository::new(),
            profile_repo,
            stripe_delivering(subscription_event(
                "customer.subscription.deleted",
                Some(Uuid::new_v4()),
                "price_monthly",
            )),
        )
        .handle_stripe_webhook(b"{}", "sig")
        .await
        .unwrap();

        assert_eq!(outcome, WebhookOutcome::Ignored("unknown user"));
    }

    #[tokio::test]
    async fn redelivered_invoice_is_recorded_twice() {
        let user_id = Uuid::new_v4();

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_find_by_stripe_subscription_id()
            .times(2)
            .returning(move |sub_id| Ok(Some(sample_subscription(user_id, "premium", Some(sub_id)))));

        let mut invoice_repo = MockInvoiceRepository::new();
        invoice_repo
            .expect_create_invoice()
            .times(2)
            .returning(move |invoice| {
                assert_eq!(invoice.user_id, user_id);
                assert_eq!(invoice.status, "paid");
                assert_eq!(invoice.stripe_invoice_id.as_deref(), Some("in_1"));
                assert_eq!(invoice.amount_minor, 999);
                Ok(Uuid::new_v4())
            });

        let usecase = usecase(
            subscription_repo,
            invoice_repo,
            MockProfileRepository::new(),
            stripe_delivering(invoice_event("invoice.payment_succeeded")),
        );

        for _ in 0..2 {
            let outcome = usecase.handle_stripe_webhook(b"{}", "sig").await.unwrap();
            assert_eq!(outcome, WebhookOutcome::Processed);
        }
    }

    #[tokio::test]
    async fn failed_invoice_is_recorded_as_pending() {
        let user_id = Uuid::new_v4();

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_find_by_stripe_subscription_id()
            .returning(move |sub_id| Ok(Some(sample_subscription(user_id, "premium", Some(sub_id)))));

        let mut invoice_repo = MockInvoiceRepository::new();
        invoice_repo
            .expect_create_invoice()
            .times(1)
            .returning(|invoice| {
                assert_eq!(invoice.status, "pending");
                Ok(Uuid::new_v4())
            });

        usecase(
            subscription_repo,
            invoice_repo,
            MockProfileRepository::new(),
            stripe_delivering(invoice_event("invoice.payment_failed")),
        )
        .handle_stripe_webhook(b"{}", "sig")
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn bad_signature_is_rejected_before_processing() {
        let mut stripe = MockStripeGateway::new();
        stripe
            .expect_verify_webhook_signature()
            .returning(|_, _| Err(anyhow::anyhow!("no matching v1 signature")));

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo.expect_upsert().never();

        let err = usecase(
            subscription_repo,
            MockInvoiceRepository::new(),
            MockProfileRepository::new(),
            stripe,
        )
        .handle_stripe_webhook(b"{}", "t=1,v1=bad")
        .await
        .unwrap_err();

        assert!(matches!(err, SubscriptionError::InvalidWebhook(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn sync_mirrors_tier_from_local_row() {
        let user_id = Uuid::new_v4();

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_find_by_user()
            .returning(|user_id| Ok(Some(sample_subscription(user_id, "premium", Some("sub_9")))));

        let mut profile_repo = MockProfileRepository::new();
        profile_repo
            .expect_set_subscription_tier()
            .with(eq(user_id), eq(SubscriptionTier::Premium))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut stripe = MockStripeGateway::new();
        stripe.expect_verify_webhook_signature().never();
        stripe.expect_cancel_subscription().never();

        let result = usecase(subscription_repo, MockInvoiceRepository::new(), profile_repo, stripe)
            .sync_subscription(user_id)
            .await
            .unwrap();

        assert_eq!(result.tier, SubscriptionTier::Premium);
    }

    #[tokio::test]
    async fn sync_grants_premium_whenever_provider_id_is_set() {
        let user_id = Uuid::new_v4();

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_find_by_user()
            .returning(|user_id| Ok(Some(sample_subscription(user_id, "free", Some("sub_x")))));

        let mut profile_repo = MockProfileRepository::new();
        profile_repo
            .expect_set_subscription_tier()
            .with(eq(user_id), eq(SubscriptionTier::Premium))
            .times(1)
            .returning(|_, _| Ok(()));

        let result = usecase(
            subscription_repo,
            MockInvoiceRepository::new(),
            profile_repo,
            MockStripeGateway::new(),
        )
        .sync_subscription(user_id)
        .await
        .unwrap();

        assert_eq!(result.tier, SubscriptionTier::Premium);
    }

    #[tokio::test]
    async fn sync_without_provider_id_mirrors_free() {
        let user_id = Uuid::new_v4();

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_find_by_user()
            .returning(|user_id| Ok(Some(sample_subscription(user_id, "premium", None))));

        let mut profile_repo = MockProfileRepository::new();
        profile_repo
            .expect_set_subscription_tier()
            .with(eq(user_id), eq(SubscriptionTier::Free))
            .times(1)
            .returning(|_, _| Ok(()));

        let result = usecase(
            subscription_repo,
            MockInvoiceRepository::new(),
            profile_repo,
            MockStripeGateway::new(),
        )
        .sync_subscription(user_id)
        .await
        .unwrap();

        assert_eq!(result.tier, SubscriptionTier::Free);
    }

    #[tokio::test]
    async fn sync_without_row_mirrors_free() {
        let user_id = Uuid::new_v4();

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo.expect_find_by_user().returning(|_| Ok(None));

        let mut profile_repo = MockProfileRepository::new();
        profile_repo
            .expect_set_subscription_tier()
            .with(eq(user_id), eq(SubscriptionTier::Free))
            .times(1)
            .returning(|_, _| Ok(()));

        let result = usecase(
            subscription_repo,
            MockInvoiceRepository::new(),
            profile_repo,
            MockStripeGateway::new(),
        )
        .sync_subscription(user_id)
        .await
        .unwrap();

        assert_eq!(result.tier, SubscriptionTier::Free);
    }

    #[tokio::test]
    async fn checkout_reuses_stored_customer() {
        let user_id = Uuid::new_v4();

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_find_by_user()
            .returning(|user_id| Ok(Some(sample_subscription(user_id, "free", None))));

        let mut stripe = MockStripeGateway::new();
        stripe
            .expect_create_checkout_session()
            .times(1)
            .returning(move |price_id, uid, customer_id, customer_email| {
                assert_eq!(price_id, "price_monthly");
                assert_eq!(uid, user_id);
                assert_eq!(customer_id.as_deref(), Some("cus_1"));
                assert_eq!(customer_email, None);
                Ok(CheckoutSession {
                    id: "cs_1".to_string(),
                    url: "https://checkout.test/cs_1".to_string(),
                })
            });

        let session = usecase(
            subscription_repo,
            MockInvoiceRepository::new(),
            MockProfileRepository::new(),
            stripe,
        )
        .create_checkout_session(
            user_id,
            Some("jo@example.com".to_string()),
            CreateCheckoutRequest {
                billing_cycle: "monthly".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(session.session_id, "cs_1");
    }

    #[tokio::test]
    async fn checkout_rejects_unknown_cycle() {
        let err = usecase(
            MockSubscriptionRepository::new(),
            MockInvoiceRepository::new(),
            MockProfileRepository::new(),
            MockStripeGateway::new(),
        )
        .create_checkout_session(
            Uuid::new_v4(),
            None,
            CreateCheckoutRequest {
                billing_cycle: "weekly".to_string(),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, SubscriptionError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn cancel_without_provider_subscription_is_not_found() {
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_find_by_user()
            .returning(|user_id| Ok(Some(sample_subscription(user_id, "free", None))));

        let mut stripe = MockStripeGateway::new();
        stripe.expect_cancel_subscription().never();

        let err = usecase(
            subscription_repo,
            MockInvoiceRepository::new(),
            MockProfileRepository::new(),
            stripe,
        )
        .cancel(Uuid::new_v4())
        .await
        .unwrap_err();

        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cancel_sets_flag_after_provider_accepts() {
        let user_id = Uuid::new_v4();

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_find_by_user()
            .returning(|user_id| Ok(Some(sample_subscription(user_id, "premium", Some("sub_123")))));
        subscription_repo
            .expect_set_cancel_at_period_end()
            .with(eq(user_id), eq(true))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut stripe = MockStripeGateway::new();
        stripe
            .expect_cancel_subscription()
            .with(eq("sub_123".to_string()))
            .times(1)
            .returning(|_| Ok(()));

        let dto = usecase(
            subscription_repo,
            MockInvoiceRepository::new(),
            MockProfileRepository::new(),
            stripe,
        )
        .cancel(user_id)
        .await
        .unwrap();

        assert!(dto.cancel_at_period_end);
    }
}

pub mod applications;
pub mod companies;
pub mod profile;
pub mod stripe_webhook;
pub mod subscriptions;

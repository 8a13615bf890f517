pub mod account_statuses;
pub mod application_statuses;
pub mod billing_cycles;
pub mod invoice_statuses;
pub mod research_statuses;
pub mod subscription_statuses;
pub mod subscription_tiers;

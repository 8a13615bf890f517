pub mod applications;
pub mod companies;
pub mod deletion_log;
pub mod invoices;
pub mod payment_methods;
pub mod profiles;
pub mod subscriptions;

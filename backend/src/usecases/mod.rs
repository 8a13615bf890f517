pub mod applications;
pub mod company_research;
pub mod deletion_policy;
pub mod gateways;
pub mod interview_prep;
pub mod profile;
pub mod subscriptions;
pub mod tier_resolver;
#[cfg(test)]
pub(crate) mod test_support;

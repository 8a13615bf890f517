pub mod applications;
pub mod companies;
pub mod deletion;
pub mod enums;
pub mod interview_prep;
pub mod match_analysis;
pub mod preferences;
pub mod scraping;
pub mod subscriptions;

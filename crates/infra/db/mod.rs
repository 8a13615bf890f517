pub mod postgres;
pub mod repositories;

pub mod cohorts;
pub mod identity;
pub mod metrics;
pub mod onboarding;
pub mod profiles;
pub mod programs;
pub mod schools;
pub mod students;
pub mod users;
pub mod views;
pub mod volunteers;

pub mod auth;
pub mod cohort;
pub mod onboarding;
pub mod profile;
pub mod program;
pub mod school;
pub mod student;
pub mod user;
pub mod volunteer;

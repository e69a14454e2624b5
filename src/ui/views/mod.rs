//! Screen-specific content rendering.

pub mod dashboard;
pub mod home;
pub mod summary;

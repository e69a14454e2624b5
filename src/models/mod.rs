//! Data models for DiviMate entities.
//!
//! This module contains the data structures exchanged with the DiviMate
//! backend:
//!
//! - `User`, `UserProfile`: directory entries and the signed-in identity
//! - `Group`: an expense-sharing group
//! - `GroupSummary`, `MemberBalance`, `SettlementTransaction`: the
//!   backend-computed balance sheet for a group

pub mod group;
pub mod user;

pub use group::{Group, GroupSummary, MemberBalance, SettlementTransaction};
pub use user::{User, UserProfile};

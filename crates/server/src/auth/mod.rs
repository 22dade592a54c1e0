//! Analyst identity: password storage and session tokens.

pub mod password;
pub mod token;

//! Request/response data transfer objects

pub mod citizens;
pub mod documents;
pub mod payments;

//! Vote types and the resolvers that run at voting-window close

pub mod join_request;
pub mod parameter;
pub mod removal;

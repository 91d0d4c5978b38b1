pub mod brackets;
pub mod handlers;
pub mod import;
pub mod query;
pub mod shelf;

//! Saved portfolio documents and the editor operations applied to them.

pub mod editor;
pub mod handlers;
pub mod store;

pub use store::{PgPortfolioStore, PortfolioStore, StoreError};

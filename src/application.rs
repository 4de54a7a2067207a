//! Application layer module
//!
//! The product store, the filter criteria holder and the dashboard that
//! composes them for presentation.

pub mod dashboard;
pub mod errors;
pub mod events;
pub mod filter_criteria;
pub mod product_store;

pub use dashboard::Dashboard;
pub use errors::ErrorKind;
pub use events::StoreEvent;
pub use filter_criteria::FilterCriteriaHolder;
pub use product_store::{ProductStore, StoreSnapshot};

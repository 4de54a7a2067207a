//! Failures recorded by the product store
//!
//! Each kind corresponds to one failed remote-call boundary. The store records
//! the most recent one as its `last_error`; presentation shows and dismisses it.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ErrorKind {
    #[error("Failed to fetch products. Please try again.")]
    FetchFailed,

    #[error("Failed to add product. Please try again.")]
    CreateFailed,

    #[error("Failed to update product. Please try again.")]
    UpdateFailed,

    #[error("Failed to delete product. Please try again.")]
    DeleteFailed,
}

impl ErrorKind {
    /// Message shown to the user
    pub fn user_message(self) -> String {
        self.to_string()
    }
}

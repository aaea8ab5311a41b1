pub mod basket_commands;
pub mod category_commands;
pub mod order_commands;
pub mod product_commands;
pub mod review_commands;

use serde::{Deserialize, Serialize};

/// Outcome of a delete or other write whose "nothing matched" case is not an error
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MutationResponse {
    pub success: bool,
    pub message: String,
}

impl MutationResponse {
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn not_modified(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

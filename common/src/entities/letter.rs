use serde::{Deserialize, Serialize};

/// One outgoing email, addressed and rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Letter {
    pub email: String,
    pub subject: String,
    pub message: String,
}

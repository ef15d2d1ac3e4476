//! Outbound message type — shared between the job runner and the
//! Discord delivery task.

use serde::{Deserialize, Serialize};

/// A message produced by a background job, posted to Discord by the
/// adapter's delivery task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outbound {
    /// Discord channel to post to.
    pub channel_id: u64,
    pub text: String,
}

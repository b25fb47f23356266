use serde::{Deserialize, Serialize};

use crate::utils::{de_opt_i64, de_u64};

/// A block reference resolved from a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(deserialize_with = "de_u64")]
    pub number: u64,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub timestamp: Option<i64>,
}

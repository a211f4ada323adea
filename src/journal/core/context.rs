//! Caller identity passed into every operation.

use crate::journal::core::ids::AccountId;

/// Facts the (external) auth layer has established about the caller.
///
/// The core trusts `account_id` but still checks that every referenced record
/// belongs to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestContext {
    /// Account the caller acts for.
    pub account_id: AccountId,
}

impl RequestContext {
    /// Context for `account_id`.
    #[must_use]
    pub const fn new(account_id: AccountId) -> Self {
        Self { account_id }
    }
}

//! Session keys.
//!
//! Everything the storefront remembers about a visitor lives in their
//! session under one of these keys.

/// Session keys for checkout data.
pub mod keys {
    /// Key for the visitor's cart (a list of line items).
    pub const CART: &str = "cart";

    /// Key for the single saved customer details record.
    pub const USER_DETAILS: &str = "userDetails";

    /// Key for whether the saved details still count as confirmed.
    ///
    /// Only ever false under the reconfirm-on-edit policy, after a cart edit.
    pub const DETAILS_CONFIRMED: &str = "details_confirmed";
}

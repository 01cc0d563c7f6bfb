//! Input validation for the interactive setup flow

/// Strip dashes and spaces from a customer ID as entered by the user.
pub fn normalize_customer_id(raw: &str) -> String {
    raw.chars().filter(|c| *c != '-' && !c.is_whitespace()).collect()
}

/// Customer IDs are exactly 10 digits, no dashes.
pub fn is_valid_customer_id(customer_id: &str) -> bool {
    customer_id.len() == 10 && customer_id.chars().all(|c| c.is_ascii_digit())
}

/// Google OAuth desktop client IDs end with `.apps.googleusercontent.com`.
pub fn is_valid_client_id(client_id: &str) -> bool {
    client_id.contains(".apps.googleusercontent.com")
}

/// Developer tokens are non-empty alphanumeric strings (plus `_` and `-`).
pub fn is_valid_developer_token(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

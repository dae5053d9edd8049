use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

/// Rejections produced while validating a submitted ingredient list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngredientLineError {
    #[error("At least one ingredient is required")]
    EmptyIngredientList,

    #[error("{0}")]
    InvalidIngredientReference(BadReference),

    #[error("Ingredient at position {position} must have an integer 'amount' of at least 1")]
    InvalidAmount { position: usize },

    #[error("Duplicate ingredients are not allowed: {}", IdList(.ids))]
    DuplicateIngredient { ids: BTreeSet<i32> },
}

impl IngredientLineError {
    /// Stable machine-readable name, used as the `code` of error responses.
    pub fn code(&self) -> &'static str {
        match self {
            IngredientLineError::EmptyIngredientList => "EmptyIngredientList",
            IngredientLineError::InvalidIngredientReference(_) => "InvalidIngredientReference",
            IngredientLineError::InvalidAmount { .. } => "InvalidAmount",
            IngredientLineError::DuplicateIngredient { .. } => "DuplicateIngredient",
        }
    }
}

impl From<std::convert::Infallible> for IngredientLineError {
    fn from(e: std::convert::Infallible) -> Self {
        match e {}
    }
}

/// Why an ingredient reference was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BadReference {
    /// The entry had no usable `id` (missing, not an integer, not positive).
    Malformed { position: usize },
    /// The ids are well-formed but absent from the catalog.
    Unknown(BTreeSet<i32>),
}

impl fmt::Display for BadReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BadReference::Malformed { position } => write!(
                f,
                "Ingredient at position {} must have a valid integer 'id'",
                position
            ),
            BadReference::Unknown(ids) => write!(f, "Unknown ingredient ids: {}", IdList(ids)),
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionError {
    #[error("You cannot subscribe to yourself")]
    SelfSubscription,

    #[error("You are already subscribed to this author")]
    AlreadySubscribed,

    #[error("You are not subscribed to this author")]
    NotSubscribed,
}

impl SubscriptionError {
    pub fn code(&self) -> &'static str {
        match self {
            SubscriptionError::SelfSubscription => "SelfSubscriptionError",
            SubscriptionError::AlreadySubscribed => "AlreadySubscribedError",
            SubscriptionError::NotSubscribed => "NotSubscribedError",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("Image must be a base64 data URL (data:image/<format>;base64,...)")]
    NotADataUrl,

    #[error("Image payload is not valid base64")]
    InvalidBase64,

    #[error("Image too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("{0}")]
    Unreadable(String),
}

/// Comma-separated rendering of an id set for error messages.
struct IdList<'a>(&'a BTreeSet<i32>);

impl fmt::Display for IdList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for id in self.0 {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{}", id)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_ids_are_listed_in_order() {
        let err = IngredientLineError::InvalidIngredientReference(BadReference::Unknown(
            BTreeSet::from([999, 7]),
        ));
        assert_eq!(err.to_string(), "Unknown ingredient ids: 7, 999");
        assert_eq!(err.code(), "InvalidIngredientReference");
    }

    #[test]
    fn test_duplicate_message() {
        let err = IngredientLineError::DuplicateIngredient {
            ids: BTreeSet::from([3]),
        };
        assert_eq!(err.to_string(), "Duplicate ingredients are not allowed: 3");
    }
}

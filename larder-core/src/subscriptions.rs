//! Rules of the follow-an-author ledger that do not need the database.

use crate::error::SubscriptionError;

/// Decides whether `user` may start following `author`.
pub fn check_subscribe<T: PartialEq>(
    user: &T,
    author: &T,
    already_subscribed: bool,
) -> Result<(), SubscriptionError> {
    if user == author {
        return Err(SubscriptionError::SelfSubscription);
    }
    if already_subscribed {
        return Err(SubscriptionError::AlreadySubscribed);
    }
    Ok(())
}

/// Optional cap on how many recipes are embedded per followed author.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecipesLimit(Option<usize>);

impl RecipesLimit {
    /// Parses the `recipes_limit` query value.
    ///
    /// Anything that is not a non-negative integer means "no limit".
    pub fn parse(raw: Option<&str>) -> Self {
        RecipesLimit(raw.and_then(|v| v.trim().parse::<usize>().ok()))
    }

    pub fn get(&self) -> Option<usize> {
        self.0
    }

    pub fn apply<T>(&self, mut items: Vec<T>) -> Vec<T> {
        if let Some(limit) = self.0 {
            items.truncate(limit);
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_subscription() {
        assert_eq!(
            check_subscribe(&1, &1, false),
            Err(SubscriptionError::SelfSubscription)
        );
    }

    #[test]
    fn test_self_check_wins_over_existing_row() {
        assert_eq!(
            check_subscribe(&1, &1, true),
            Err(SubscriptionError::SelfSubscription)
        );
    }

    #[test]
    fn test_already_subscribed() {
        assert_eq!(
            check_subscribe(&1, &2, true),
            Err(SubscriptionError::AlreadySubscribed)
        );
        assert_eq!(check_subscribe(&1, &2, false), Ok(()));
    }

    #[test]
    fn test_recipes_limit_parsing() {
        assert_eq!(RecipesLimit::parse(Some("2")).get(), Some(2));
        assert_eq!(RecipesLimit::parse(Some("0")).get(), Some(0));
        assert_eq!(RecipesLimit::parse(Some("abc")).get(), None);
        assert_eq!(RecipesLimit::parse(Some("-1")).get(), None);
        assert_eq!(RecipesLimit::parse(Some("")).get(), None);
        assert_eq!(RecipesLimit::parse(None).get(), None);
    }

    #[test]
    fn test_recipes_limit_apply() {
        let items = vec![1, 2, 3];
        assert_eq!(RecipesLimit::parse(Some("2")).apply(items.clone()), vec![1, 2]);
        assert_eq!(RecipesLimit::parse(Some("10")).apply(items.clone()), vec![1, 2, 3]);
        assert_eq!(RecipesLimit::parse(Some("nope")).apply(items), vec![1, 2, 3]);
    }
}

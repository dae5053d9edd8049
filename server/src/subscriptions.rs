//! The follow-an-author ledger.

use std::collections::HashSet;

use diesel::dsl::{exists, select};
use diesel::prelude::*;
use larder_core::{check_subscribe, SubscriptionError};
use uuid::Uuid;

use crate::api::ApiError;
use crate::models::{NewSubscription, User};
use crate::schema::{recipes, subscriptions, users};

fn ensure_author(conn: &mut PgConnection, author_id: Uuid) -> Result<(), ApiError> {
    let found: bool =
        select(exists(users::table.filter(users::id.eq(author_id)))).get_result(conn)?;
    if found {
        Ok(())
    } else {
        Err(ApiError::NotFound("User not found"))
    }
}

/// Starts following `author_id`, recording their current recipe count.
pub fn subscribe(
    conn: &mut PgConnection,
    user_id: Uuid,
    author_id: Uuid,
) -> Result<(), ApiError> {
    ensure_author(conn, author_id)?;

    let already: bool = select(exists(
        subscriptions::table
            .filter(subscriptions::user_id.eq(user_id))
            .filter(subscriptions::author_id.eq(author_id)),
    ))
    .get_result(conn)?;
    check_subscribe(&user_id, &author_id, already)?;

    let recipes_count: i64 = recipes::table
        .filter(recipes::author_id.eq(author_id))
        .count()
        .get_result(conn)?;

    // The primary key settles concurrent subscribes.
    let inserted = diesel::insert_into(subscriptions::table)
        .values(&NewSubscription {
            user_id,
            author_id,
            recipes_count: i32::try_from(recipes_count).unwrap_or(i32::MAX),
        })
        .on_conflict_do_nothing()
        .execute(conn)?;
    if inserted == 0 {
        return Err(SubscriptionError::AlreadySubscribed.into());
    }

    tracing::info!(%user_id, %author_id, recipes_count, "subscribed");
    Ok(())
}

pub fn unsubscribe(
    conn: &mut PgConnection,
    user_id: Uuid,
    author_id: Uuid,
) -> Result<(), ApiError> {
    ensure_author(conn, author_id)?;

    let deleted = diesel::delete(
        subscriptions::table
            .filter(subscriptions::user_id.eq(user_id))
            .filter(subscriptions::author_id.eq(author_id)),
    )
    .execute(conn)?;
    if deleted == 0 {
        return Err(SubscriptionError::NotSubscribed.into());
    }

    tracing::info!(%user_id, %author_id, "unsubscribed");
    Ok(())
}

/// Authors `user_id` follows, oldest subscription first.
pub fn followed_authors(conn: &mut PgConnection, user_id: Uuid) -> QueryResult<Vec<User>> {
    subscriptions::table
        .inner_join(users::table.on(users::id.eq(subscriptions::author_id)))
        .filter(subscriptions::user_id.eq(user_id))
        .order(subscriptions::created_at.asc())
        .select(User::as_select())
        .load(conn)
}

/// Which of `author_ids` the user follows.
pub fn subscribed_among(
    conn: &mut PgConnection,
    user_id: Uuid,
    author_ids: &[Uuid],
) -> QueryResult<HashSet<Uuid>> {
    let ids: Vec<Uuid> = subscriptions::table
        .filter(subscriptions::user_id.eq(user_id))
        .filter(subscriptions::author_id.eq_any(author_ids))
        .select(subscriptions::author_id)
        .load(conn)?;
    Ok(ids.into_iter().collect())
}

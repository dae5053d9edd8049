//! Fixtures for database-backed tests.
//!
//! Tests run against `TEST_DATABASE_URL` inside a transaction that is never
//! committed. When the variable is unset they return early and pass.

use std::sync::{Arc, Once};
use std::time::Duration;

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::upsert::excluded;
use uuid::Uuid;

use crate::config::Config;
use crate::db::{run_migrations, DbPool};
use crate::models::{NewIngredient, NewPhoto, NewRecipe, NewUser};
use crate::schema::{ingredients, photos, recipes, users};
use crate::AppState;

static MIGRATE: Once = Once::new();

fn migrated_conn(url: &str) -> PgConnection {
    let mut conn = PgConnection::establish(url).expect("connect to TEST_DATABASE_URL");
    MIGRATE.call_once(|| run_migrations(&mut conn).expect("migrate test database"));
    conn
}

/// A migrated connection whose writes are committed. Callers clean up after
/// themselves.
pub fn committed_conn() -> Option<PgConnection> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    Some(migrated_conn(&url))
}

pub fn test_conn() -> Option<PgConnection> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let mut conn = migrated_conn(&url);
    conn.begin_test_transaction()
        .expect("begin test transaction");
    Some(conn)
}

#[derive(Debug)]
struct TestTransaction;

impl CustomizeConnection<PgConnection, diesel::r2d2::Error> for TestTransaction {
    fn on_acquire(&self, conn: &mut PgConnection) -> Result<(), diesel::r2d2::Error> {
        conn.begin_test_transaction()
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

pub fn test_config(database_url: &str) -> Config {
    Config {
        database_url: database_url.to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        public_base_url: "http://larder.test".to_string(),
        db_pool_size: 1,
        session_ttl_days: 1,
    }
}

/// App state over a single connection whose work is rolled back on drop.
pub fn test_state() -> Option<AppState> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    drop(migrated_conn(&url));
    let pool: DbPool = Pool::builder()
        .max_size(1)
        .connection_customizer(Box::new(TestTransaction))
        .build(ConnectionManager::new(&url))
        .expect("build test pool");
    Some(AppState {
        pool: Arc::new(pool),
        config: Arc::new(test_config(&url)),
    })
}

/// App state whose pool never connects, for routes that fail before touching the database.
pub fn offline_state() -> AppState {
    let url = "postgres://offline.invalid/larder";
    AppState {
        pool: Arc::new(
            Pool::builder()
                .min_idle(Some(0))
                .connection_timeout(Duration::from_millis(200))
                .build_unchecked(ConnectionManager::new(url)),
        ),
        config: Arc::new(test_config(url)),
    }
}

pub fn create_ingredient(conn: &mut PgConnection, name: &str, unit: &str) -> i32 {
    diesel::insert_into(ingredients::table)
        .values(&NewIngredient {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
        })
        .on_conflict((ingredients::name, ingredients::measurement_unit))
        .do_update()
        .set(ingredients::name.eq(excluded(ingredients::name)))
        .returning(ingredients::id)
        .get_result(conn)
        .unwrap()
}

pub fn create_user(conn: &mut PgConnection, username: &str) -> Uuid {
    let username = format!("{}-{}", username, &Uuid::new_v4().simple().to_string()[..8]);
    let email = format!("{username}@example.com");
    diesel::insert_into(users::table)
        .values(&NewUser {
            email: &email,
            username: &username,
            first_name: "Test",
            last_name: "User",
            password_hash: "unused",
        })
        .returning(users::id)
        .get_result(conn)
        .unwrap()
}

pub fn create_photo(conn: &mut PgConnection, owner: Uuid) -> Uuid {
    diesel::insert_into(photos::table)
        .values(&NewPhoto {
            user_id: owner,
            content_type: "image/png",
            data: b"png",
        })
        .returning(photos::id)
        .get_result(conn)
        .unwrap()
}

/// A recipe with no ingredient lines yet.
pub fn create_recipe(conn: &mut PgConnection, author: Uuid) -> Uuid {
    let image = create_photo(conn, author);
    diesel::insert_into(recipes::table)
        .values(&NewRecipe {
            author_id: author,
            name: "Test recipe",
            image_photo_id: image,
            text: "Mix and bake.",
            cooking_time: 30,
        })
        .returning(recipes::id)
        .get_result(conn)
        .unwrap()
}

mod crypto;
mod db;
mod extractor;

pub use crypto::{hash_password, password_problem, verify_password};
pub use db::{create_session, delete_session};
pub use extractor::{bearer_token, AuthUser, MaybeUser};

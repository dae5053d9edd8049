//! Database-backed image store for recipe pictures and avatars.

use diesel::prelude::*;
use larder_core::decode_data_url;
use uuid::Uuid;

use crate::api::ApiError;
use crate::models::{NewPhoto, Photo};
use crate::schema::photos;

/// Decodes a `data:image/...;base64,` payload, checks it is a real image and
/// stores it. Returns the new photo id.
pub fn store_data_url(
    conn: &mut PgConnection,
    owner: Uuid,
    data_url: &str,
) -> Result<Uuid, ApiError> {
    let image = decode_data_url(data_url)?;

    let photo_id = diesel::insert_into(photos::table)
        .values(&NewPhoto {
            user_id: owner,
            content_type: &image.content_type,
            data: &image.data,
        })
        .returning(photos::id)
        .get_result(conn)?;

    tracing::debug!(
        %photo_id,
        bytes = image.data.len(),
        content_type = %image.content_type,
        "stored photo"
    );
    Ok(photo_id)
}

pub fn load(conn: &mut PgConnection, id: Uuid) -> QueryResult<Option<Photo>> {
    photos::table
        .filter(photos::id.eq(id))
        .select(Photo::as_select())
        .first(conn)
        .optional()
}

/// Deletes a photo no longer referenced by its owner.
pub fn delete(conn: &mut PgConnection, id: Uuid) -> QueryResult<usize> {
    diesel::delete(photos::table.filter(photos::id.eq(id))).execute(conn)
}

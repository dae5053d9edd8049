pub mod error;
pub mod image;
pub mod ingredient_lines;
pub mod shopping_cart;
pub mod subscriptions;

pub use error::{BadReference, ImageError, IngredientLineError, SubscriptionError};
pub use image::{decode_data_url, DecodedImage, ALLOWED_FORMATS, MAX_FILE_SIZE};
pub use ingredient_lines::{
    parse_lines, validate_lines, IngredientCatalog, IngredientLine, ValidatedLines,
};
pub use shopping_cart::{aggregate, render_csv, CartLine, CartTotal};
pub use subscriptions::{check_subscribe, RecipesLimit};

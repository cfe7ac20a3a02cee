pub mod validation;

pub use validation::{
    normalize_tags, slugify, validate_definition_code, validate_image_extension,
    validate_iso_code, validate_title, validate_url_path, validate_url_slug,
};

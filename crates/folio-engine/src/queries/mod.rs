//! Query handlers, grouped by entity

pub mod custom_entities;
pub mod image_assets;
pub mod pages;
pub mod site;

use folio_store::errors::Result;

use crate::executor::HandlerRegistry;

pub(crate) fn register_all(registry: &mut HandlerRegistry) -> Result<()> {
    pages::register(registry)?;
    custom_entities::register(registry)?;
    image_assets::register(registry)?;
    site::register(registry)?;
    Ok(())
}

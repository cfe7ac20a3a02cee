//! Shared services handed to every handler

use std::sync::Arc;

use folio_core::cache::{CustomEntityCache, ImageAssetCache, PageCache};
use folio_core::definitions::CustomEntityDefinitionRegistry;
use folio_core::messages::MessageAggregator;
use folio_core::permissions::PermissionValidationService;
use folio_core::routing::RoutingRuleRegistry;
use folio_store::AssetFileStore;

/// Process-wide state shared by all executors and connections
pub struct Services {
    pub permissions: Arc<dyn PermissionValidationService>,
    pub messages: MessageAggregator,
    pub page_cache: PageCache,
    pub custom_entity_cache: CustomEntityCache,
    pub image_asset_cache: ImageAssetCache,
    pub definitions: CustomEntityDefinitionRegistry,
    pub routing_rules: RoutingRuleRegistry,
    pub asset_files: AssetFileStore,
}

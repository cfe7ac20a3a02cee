pub mod custom_entity;
pub mod image_asset;
pub mod page;
pub mod paging;
pub mod site;
pub mod workflow;

pub use custom_entity::{
    CustomEntity, CustomEntityDefinitionMicroSummary, CustomEntityDetails,
    CustomEntityRenderSummary, CustomEntityRoute, CustomEntitySummary, CustomEntityVersion,
    CustomEntityVersionRoute, CustomEntityVersionSummary, RootEntityMicroSummary,
};
pub use image_asset::{ImageAsset, ImageAssetFile, ImageAssetRenderDetails, ImageAssetSummary};
pub use page::{
    Page, PageDetails, PageRenderDetails, PageRoute, PageSummary, PageType, PageVersion,
    PageVersionRoute,
};
pub use paging::{PagedQueryResult, PagingParams};
pub use site::{Locale, WebDirectory};
pub use workflow::{VersionState, WorkflowStatus, WorkflowStatusQuery};

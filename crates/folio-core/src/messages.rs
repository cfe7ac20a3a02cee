//! Domain messages published after successful mutations
//!
//! Handlers publish only after their transaction has committed and their
//! cache entries have been cleared, so a subscriber always observes the new
//! state.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

use crate::errors::{FolioError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentMessage {
    PageAdded {
        page_id: i64,
        has_published_version_changed: bool,
    },
    PageUrlChanged {
        page_id: i64,
        has_published_version_changed: bool,
    },
    PageDraftVersionUpdated {
        page_id: i64,
        page_version_id: i64,
    },
    PageDraftVersionDeleted {
        page_id: i64,
        page_version_id: i64,
    },
    PagePublished {
        page_id: i64,
    },
    PageUnPublished {
        page_id: i64,
    },
    PageDeleted {
        page_id: i64,
        full_path: String,
    },
    CustomEntityAdded {
        custom_entity_id: i64,
        definition_code: String,
        has_published_version_changed: bool,
    },
    CustomEntityDraftVersionUpdated {
        custom_entity_id: i64,
        definition_code: String,
        custom_entity_version_id: i64,
    },
    CustomEntityDraftVersionDeleted {
        custom_entity_id: i64,
        definition_code: String,
        custom_entity_version_id: i64,
    },
    CustomEntityPublished {
        custom_entity_id: i64,
        definition_code: String,
    },
    CustomEntityUnPublished {
        custom_entity_id: i64,
        definition_code: String,
    },
    CustomEntityUrlChanged {
        custom_entity_id: i64,
        definition_code: String,
        old_url_slug: String,
        has_published_version_changed: bool,
    },
    CustomEntityDeleted {
        custom_entity_id: i64,
        definition_code: String,
    },
    CustomEntityOrderingUpdated {
        definition_code: String,
        custom_entity_ids: Vec<i64>,
    },
    ImageAssetAdded {
        image_asset_id: i64,
    },
    ImageAssetUpdated {
        image_asset_id: i64,
        has_file_changed: bool,
    },
    ImageAssetDeleted {
        image_asset_id: i64,
    },
    WebDirectoryAdded {
        web_directory_id: i64,
    },
    LocaleAdded {
        locale_id: i64,
    },
}

impl ContentMessage {
    /// Stable message name, matching the serialized `type` tag
    pub fn name(&self) -> &'static str {
        match self {
            ContentMessage::PageAdded { .. } => "page_added",
            ContentMessage::PageUrlChanged { .. } => "page_url_changed",
            ContentMessage::PageDraftVersionUpdated { .. } => "page_draft_version_updated",
            ContentMessage::PageDraftVersionDeleted { .. } => "page_draft_version_deleted",
            ContentMessage::PagePublished { .. } => "page_published",
            ContentMessage::PageUnPublished { .. } => "page_un_published",
            ContentMessage::PageDeleted { .. } => "page_deleted",
            ContentMessage::CustomEntityAdded { .. } => "custom_entity_added",
            ContentMessage::CustomEntityDraftVersionUpdated { .. } => {
                "custom_entity_draft_version_updated"
            }
            ContentMessage::CustomEntityDraftVersionDeleted { .. } => {
                "custom_entity_draft_version_deleted"
            }
            ContentMessage::CustomEntityPublished { .. } => "custom_entity_published",
            ContentMessage::CustomEntityUnPublished { .. } => "custom_entity_un_published",
            ContentMessage::CustomEntityUrlChanged { .. } => "custom_entity_url_changed",
            ContentMessage::CustomEntityDeleted { .. } => "custom_entity_deleted",
            ContentMessage::CustomEntityOrderingUpdated { .. } => "custom_entity_ordering_updated",
            ContentMessage::ImageAssetAdded { .. } => "image_asset_added",
            ContentMessage::ImageAssetUpdated { .. } => "image_asset_updated",
            ContentMessage::ImageAssetDeleted { .. } => "image_asset_deleted",
            ContentMessage::WebDirectoryAdded { .. } => "web_directory_added",
            ContentMessage::LocaleAdded { .. } => "locale_added",
        }
    }
}

/// Receives published messages
pub trait MessageSubscriber: Send + Sync {
    /// # Errors
    /// An error stops delivery to later subscribers and reaches the caller.
    fn handle(&self, message: &ContentMessage) -> Result<()>;
}

impl<F> MessageSubscriber for F
where
    F: Fn(&ContentMessage) -> Result<()> + Send + Sync,
{
    fn handle(&self, message: &ContentMessage) -> Result<()> {
        self(message)
    }
}

/// Fans messages out to subscribers in registration order
#[derive(Clone, Default)]
pub struct MessageAggregator {
    subscribers: Arc<RwLock<Vec<Arc<dyn MessageSubscriber>>>>,
}

impl MessageAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, subscriber: Arc<dyn MessageSubscriber>) -> Result<()> {
        self.subscribers
            .write()
            .map_err(|_| poisoned())?
            .push(subscriber);
        Ok(())
    }

    /// Deliver to every subscriber; the first failure aborts delivery
    pub fn publish(&self, message: &ContentMessage) -> Result<()> {
        let subscribers = self.subscribers.read().map_err(|_| poisoned())?.clone();
        tracing::debug!(message = message.name(), subscribers = subscribers.len(), "publish");
        for subscriber in subscribers {
            subscriber.handle(message)?;
        }
        Ok(())
    }

    pub fn publish_all(&self, messages: &[ContentMessage]) -> Result<()> {
        messages.iter().try_for_each(|m| self.publish(m))
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().map(|s| s.len()).unwrap_or(0)
    }
}

fn poisoned() -> FolioError {
    FolioError::Internal {
        message: "message subscriber list lock poisoned".to_string(),
    }
}

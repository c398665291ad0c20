mod ec2;
mod mock;

pub use ec2::Ec2Inventory;
pub use mock::MockInventory;

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("{operation} failed for {resource}: {message}")]
    Sdk {
        operation: &'static str,
        resource: String,
        message: String,
    },
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceDescription {
    pub instance_id: String,
    pub tags: HashMap<String, String>,
    // block device mapping 순서 그대로
    pub volume_ids: Vec<String>,
}

// 인벤토리/태깅 API 경계
#[async_trait]
pub trait Inventory: Send + Sync {
    fn name(&self) -> &'static str;
    async fn describe_instance(
        &self,
        instance_id: &str,
    ) -> Result<InstanceDescription, InventoryError>;
    async fn describe_volume_tags(
        &self,
        volume_id: &str,
    ) -> Result<HashMap<String, String>, InventoryError>;
    async fn create_tag(
        &self,
        resource_id: &str,
        key: &str,
        value: &str,
    ) -> Result<(), InventoryError>;
}

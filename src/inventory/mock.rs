use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::{InstanceDescription, Inventory, InventoryError};
use crate::reconcile::TagWrite;

#[derive(Default)]
struct State {
    instances: HashMap<String, InstanceDescription>,
    volumes: HashMap<String, HashMap<String, String>>,
    writes: Vec<TagWrite>,
    describe_calls: usize,
    failing_writes: HashSet<(String, String)>,
    failing_reads: HashSet<String>,
}

/// In-memory EC2 stand-in. Applied tags become visible to later describes.
#[derive(Default)]
pub struct MockInventory {
    state: Mutex<State>,
}

impl MockInventory {
    pub fn new() -> Self {
        Self::default()
    }

    // MOCK_MODE 용 샘플 데이터: 태그 없는 인스턴스 하나 + 볼륨 하나
    pub fn demo() -> Self {
        Self::new()
            .with_instance("i-0123456789abcdef0", &[], &["vol-0abcde12345f67890"])
            .with_volume("vol-0abcde12345f67890", &[])
    }

    pub fn with_instance(self, id: &str, tags: &[(&str, &str)], volume_ids: &[&str]) -> Self {
        if let Ok(mut s) = self.state.lock() {
            s.instances.insert(
                id.to_string(),
                InstanceDescription {
                    instance_id: id.to_string(),
                    tags: to_map(tags),
                    volume_ids: volume_ids.iter().map(|v| v.to_string()).collect(),
                },
            );
        }
        self
    }

    pub fn with_volume(self, id: &str, tags: &[(&str, &str)]) -> Self {
        if let Ok(mut s) = self.state.lock() {
            s.volumes.insert(id.to_string(), to_map(tags));
        }
        self
    }

    /// `create_tag(resource_id, key, ..)` will fail.
    pub fn fail_write(self, resource_id: &str, key: &str) -> Self {
        if let Ok(mut s) = self.state.lock() {
            s.failing_writes
                .insert((resource_id.to_string(), key.to_string()));
        }
        self
    }

    /// Any describe of `resource_id` will fail.
    pub fn fail_read(self, resource_id: &str) -> Self {
        if let Ok(mut s) = self.state.lock() {
            s.failing_reads.insert(resource_id.to_string());
        }
        self
    }

    /// Successful writes, in the order they were applied.
    pub fn writes(&self) -> Vec<TagWrite> {
        self.state.lock().map(|s| s.writes.clone()).unwrap_or_default()
    }

    pub fn describe_calls(&self) -> usize {
        self.state.lock().map(|s| s.describe_calls).unwrap_or_default()
    }

    pub fn tags_of(&self, resource_id: &str) -> HashMap<String, String> {
        let Ok(s) = self.state.lock() else {
            return HashMap::new();
        };
        s.instances
            .get(resource_id)
            .map(|i| i.tags.clone())
            .or_else(|| s.volumes.get(resource_id).cloned())
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, State>, InventoryError> {
        self.state.lock().map_err(|_| InventoryError::Sdk {
            operation: "mock",
            resource: String::new(),
            message: "state lock poisoned".into(),
        })
    }
}

fn to_map(tags: &[(&str, &str)]) -> HashMap<String, String> {
    tags.iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[async_trait]
impl Inventory for MockInventory {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn describe_instance(
        &self,
        instance_id: &str,
    ) -> Result<InstanceDescription, InventoryError> {
        let mut s = self.lock()?;
        s.describe_calls += 1;
        if s.failing_reads.contains(instance_id) {
            return Err(InventoryError::Sdk {
                operation: "DescribeInstances",
                resource: instance_id.to_string(),
                message: "injected failure".into(),
            });
        }
        s.instances
            .get(instance_id)
            .cloned()
            .ok_or_else(|| InventoryError::NotFound {
                kind: "instance",
                id: instance_id.to_string(),
            })
    }

    async fn describe_volume_tags(
        &self,
        volume_id: &str,
    ) -> Result<HashMap<String, String>, InventoryError> {
        let mut s = self.lock()?;
        s.describe_calls += 1;
        if s.failing_reads.contains(volume_id) {
            return Err(InventoryError::Sdk {
                operation: "DescribeVolumes",
                resource: volume_id.to_string(),
                message: "injected failure".into(),
            });
        }
        s.volumes
            .get(volume_id)
            .cloned()
            .ok_or_else(|| InventoryError::NotFound {
                kind: "volume",
                id: volume_id.to_string(),
            })
    }

    async fn create_tag(
        &self,
        resource_id: &str,
        key: &str,
        value: &str,
    ) -> Result<(), InventoryError> {
        let mut s = self.lock()?;
        let target = (resource_id.to_string(), key.to_string());
        if s.failing_writes.contains(&target) {
            return Err(InventoryError::Sdk {
                operation: "CreateTags",
                resource: resource_id.to_string(),
                message: "injected failure".into(),
            });
        }

        if let Some(inst) = s.instances.get_mut(resource_id) {
            inst.tags.insert(key.to_string(), value.to_string());
        } else if let Some(vol) = s.volumes.get_mut(resource_id) {
            vol.insert(key.to_string(), value.to_string());
        } else {
            return Err(InventoryError::NotFound {
                kind: "resource",
                id: resource_id.to_string(),
            });
        }

        s.writes.push(TagWrite {
            resource_id: resource_id.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }
}

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_ec2 as ec2;
use aws_sdk_ec2::error::DisplayErrorContext;
use aws_types::region::Region;
use std::collections::HashMap;

use super::{InstanceDescription, Inventory, InventoryError};

pub struct Ec2Inventory {
    client: ec2::Client,
}

impl Ec2Inventory {
    /// Client for the event's region; falls back to the SDK default chain.
    pub async fn for_region(region: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        match region {
            Some(r) => loader = loader.region(Region::new(r.to_string())),
            None => tracing::warn!("event has no awsRegion, using the default region chain"),
        }
        let conf = loader.load().await;
        Self {
            client: ec2::Client::new(&conf),
        }
    }

    fn tags_to_hashmap(tags: &[ec2::types::Tag]) -> HashMap<String, String> {
        tags.iter()
            .filter_map(|t| {
                let k = t.key()?;
                let v = t.value().unwrap_or_default();
                Some((k.to_string(), v.to_string()))
            })
            .collect()
    }

    // Ebs 가 없는 매핑(instance store)은 건너뛴다
    fn volume_ids(mappings: &[ec2::types::InstanceBlockDeviceMapping]) -> Vec<String> {
        mappings
            .iter()
            .filter_map(|m| m.ebs().and_then(|e| e.volume_id()))
            .map(|v| v.to_string())
            .collect()
    }
}

#[async_trait]
impl Inventory for Ec2Inventory {
    fn name(&self) -> &'static str {
        "ec2"
    }

    async fn describe_instance(
        &self,
        instance_id: &str,
    ) -> Result<InstanceDescription, InventoryError> {
        let resp = self
            .client
            .describe_instances()
            .instance_ids(instance_id)
            .send()
            .await
            .map_err(|e| InventoryError::Sdk {
                operation: "DescribeInstances",
                resource: instance_id.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        let inst = resp
            .reservations()
            .first()
            .and_then(|r| r.instances().first())
            .ok_or_else(|| InventoryError::NotFound {
                kind: "instance",
                id: instance_id.to_string(),
            })?;

        Ok(InstanceDescription {
            instance_id: instance_id.to_string(),
            tags: Self::tags_to_hashmap(inst.tags()),
            volume_ids: Self::volume_ids(inst.block_device_mappings()),
        })
    }

    async fn describe_volume_tags(
        &self,
        volume_id: &str,
    ) -> Result<HashMap<String, String>, InventoryError> {
        let resp = self
            .client
            .describe_volumes()
            .volume_ids(volume_id)
            .send()
            .await
            .map_err(|e| InventoryError::Sdk {
                operation: "DescribeVolumes",
                resource: volume_id.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        let vol = resp.volumes().first().ok_or_else(|| InventoryError::NotFound {
            kind: "volume",
            id: volume_id.to_string(),
        })?;
        Ok(Self::tags_to_hashmap(vol.tags()))
    }

    async fn create_tag(
        &self,
        resource_id: &str,
        key: &str,
        value: &str,
    ) -> Result<(), InventoryError> {
        let tag = ec2::types::Tag::builder().key(key).value(value).build();
        self.client
            .create_tags()
            .resources(resource_id)
            .tags(tag)
            .send()
            .await
            .map_err(|e| InventoryError::Sdk {
                operation: "CreateTags",
                resource: resource_id.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::RecordingDiagnostics;
    use crate::identity::ActorLabel;
    use crate::reconcile::instance_plan;
    use ec2::types::{EbsInstanceBlockDevice, InstanceBlockDeviceMapping, Tag};

    fn ebs_mapping(device: &str, volume_id: &str) -> InstanceBlockDeviceMapping {
        InstanceBlockDeviceMapping::builder()
            .device_name(device)
            .ebs(EbsInstanceBlockDevice::builder().volume_id(volume_id).build())
            .build()
    }

    #[test]
    fn volume_ids_skip_mappings_without_ebs() {
        let mappings = vec![
            ebs_mapping("/dev/xvda", "vol-root"),
            InstanceBlockDeviceMapping::builder()
                .device_name("/dev/sdb")
                .build(),
            InstanceBlockDeviceMapping::builder()
                .device_name("/dev/sdc")
                .ebs(EbsInstanceBlockDevice::builder().build())
                .build(),
            ebs_mapping("/dev/xvdf", "vol-data"),
        ];
        assert_eq!(
            Ec2Inventory::volume_ids(&mappings),
            vec!["vol-root".to_string(), "vol-data".to_string()]
        );
        assert!(Ec2Inventory::volume_ids(&[]).is_empty());
    }

    #[test]
    fn valueless_tag_still_counts_as_present() {
        let tags = vec![
            Tag::builder().key("Owner").build(),
            Tag::builder().key("Name").value("web").build(),
            Tag::builder().value("orphan").build(),
        ];
        let map = Ec2Inventory::tags_to_hashmap(&tags);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("Owner").map(String::as_str), Some(""));
        assert_eq!(map.get("Name").map(String::as_str), Some("web"));

        let diag = RecordingDiagnostics::new();
        let writes = instance_plan("i-1", &map, &ActorLabel::new("bob"), &diag);
        assert!(writes.is_empty());
    }
}

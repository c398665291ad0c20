use std::collections::HashMap;

use crate::diagnostics::Diagnostics;
use crate::identity::ActorLabel;

pub const OWNER_TAG: &str = "Owner";
pub const ATTACHED_INSTANCE_TAG: &str = "AttachedInstance";
pub const NAME_TAG: &str = "Name";

/// One pending `create-tag` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagWrite {
    pub resource_id: String,
    pub key: String,
    pub value: String,
}

/// A tag the resource must carry, with the value to use if it doesn't.
#[derive(Debug, Clone)]
pub struct RequiredTag {
    pub key: &'static str,
    pub value: String,
}

impl RequiredTag {
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

/// Writes needed so that every required key exists on the resource.
/// Existing keys are never overwritten.
pub fn missing_tags(
    resource_id: &str,
    current: &HashMap<String, String>,
    required: &[RequiredTag],
    diag: &dyn Diagnostics,
) -> Vec<TagWrite> {
    if current.is_empty() {
        let keys: Vec<&str> = required.iter().map(|r| r.key).collect();
        diag.log(&format!(
            "{resource_id} has no tags, adding {}",
            keys.join(" and ")
        ));
    }

    let mut out = Vec::new();
    for req in required {
        if current.contains_key(req.key) {
            diag.log(&format!("{} tag already exist for {resource_id}", req.key));
            continue;
        }
        if !current.is_empty() {
            diag.log(&format!(
                "Tag \"{}\" doesn't exist for {resource_id}, creating...",
                req.key
            ));
        }
        out.push(TagWrite {
            resource_id: resource_id.to_string(),
            key: req.key.to_string(),
            value: req.value.clone(),
        });
    }
    out
}

/// Value of the instance's `Name` tag, or "" if it has none.
pub fn instance_name(tags: &HashMap<String, String>) -> &str {
    tags.get(NAME_TAG).map(String::as_str).unwrap_or("")
}

pub fn attached_instance_value(instance_id: &str, instance_name: &str) -> String {
    format!("{instance_id} - {instance_name}")
}

pub fn instance_plan(
    instance_id: &str,
    tags: &HashMap<String, String>,
    actor: &ActorLabel,
    diag: &dyn Diagnostics,
) -> Vec<TagWrite> {
    missing_tags(
        instance_id,
        tags,
        &[RequiredTag::new(OWNER_TAG, actor.as_str())],
        diag,
    )
}

pub fn volume_plan(
    volume_id: &str,
    tags: &HashMap<String, String>,
    instance_id: &str,
    instance_name: &str,
    actor: &ActorLabel,
    diag: &dyn Diagnostics,
) -> Vec<TagWrite> {
    if tags.contains_key(OWNER_TAG) && tags.contains_key(ATTACHED_INSTANCE_TAG) {
        diag.log(&format!(
            "Nothing to tag for volume {volume_id} of instance: {instance_id}, is already tagged"
        ));
        return Vec::new();
    }
    // Owner 먼저, AttachedInstance 다음 (태그 없는 볼륨도 같은 순서)
    missing_tags(
        volume_id,
        tags,
        &[
            RequiredTag::new(OWNER_TAG, actor.as_str()),
            RequiredTag::new(
                ATTACHED_INSTANCE_TAG,
                attached_instance_value(instance_id, instance_name),
            ),
        ],
        diag,
    )
}

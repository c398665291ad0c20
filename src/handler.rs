use serde::Serialize;
use std::collections::HashSet;

use crate::diagnostics::Diagnostics;
use crate::event::AuditEvent;
use crate::identity::{resolve_detail, ActorLabel};
use crate::inventory::{Inventory, InventoryError};
use crate::reconcile::{instance_name, instance_plan, volume_plan, TagWrite, OWNER_TAG};

pub const ALL_DONE: &str = "All Done!";
pub const NO_DATA: &str = "No Data!";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    pub status_code: u16,
    pub body: String,
}

impl HandlerResponse {
    fn ok(body: &str) -> Self {
        Self {
            status_code: 200,
            body: body.to_string(),
        }
    }
}

/// Counts for one invocation, logged at the end.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub instances: usize,
    pub volumes: usize,
    pub planned: usize,
    pub applied: usize,
    pub failed: usize,
}

/// Apply one write. Failures are logged and reported as `false`.
pub async fn apply_tag(inv: &dyn Inventory, w: &TagWrite, diag: &dyn Diagnostics) -> bool {
    match inv.create_tag(&w.resource_id, &w.key, &w.value).await {
        Ok(()) => {
            diag.log(&format!(
                "successfully created tag {} for {}",
                w.key, w.resource_id
            ));
            true
        }
        Err(e) => {
            tracing::warn!(resource = %w.resource_id, key = %w.key, error = %e, "create tag failed");
            diag.log(&format!("failed to create tag {} for {}: {e}", w.key, w.resource_id));
            false
        }
    }
}

/// Processes one event. `Ok(None)` means the event had no `detail` section
/// and nothing was done. Describe failures abort with `Err`.
pub async fn handle(
    event: &AuditEvent,
    inv: &dyn Inventory,
    diag: &dyn Diagnostics,
) -> Result<Option<HandlerResponse>, InventoryError> {
    let Some(detail) = event.detail.as_ref() else {
        diag.log("event has no detail section, nothing to do");
        return Ok(None);
    };

    let actor = resolve_detail(detail, diag);

    let instance_ids = match detail.instance_ids() {
        Ok(ids) => ids,
        Err(e) => {
            diag.log(&format!("no instances in event: {e}"));
            Vec::new()
        }
    };
    if instance_ids.is_empty() {
        return Ok(Some(HandlerResponse::ok(NO_DATA)));
    }

    let stats = tag_instances(&instance_ids, &actor, inv, diag).await?;
    tracing::info!(
        inventory = inv.name(),
        region = detail.aws_region.as_deref().unwrap_or("default"),
        instances = stats.instances,
        volumes = stats.volumes,
        planned = stats.planned,
        applied = stats.applied,
        failed = stats.failed,
        "tagging finished"
    );
    Ok(Some(HandlerResponse::ok(ALL_DONE)))
}

async fn tag_instances(
    instance_ids: &[String],
    actor: &ActorLabel,
    inv: &dyn Inventory,
    diag: &dyn Diagnostics,
) -> Result<RunStats, InventoryError> {
    let mut stats = RunStats::default();
    // Owner 는 리소스당 한 번만 시도
    let mut owner_tried: HashSet<String> = HashSet::new();

    for instance_id in instance_ids {
        stats.instances += 1;
        let inst = inv.describe_instance(instance_id).await?;
        let name = instance_name(&inst.tags).to_string();

        let writes = instance_plan(instance_id, &inst.tags, actor, diag);
        apply_all(inv, writes, &mut owner_tried, &mut stats, diag).await;

        for volume_id in &inst.volume_ids {
            stats.volumes += 1;
            let tags = inv.describe_volume_tags(volume_id).await?;
            let writes = volume_plan(volume_id, &tags, instance_id, &name, actor, diag);
            apply_all(inv, writes, &mut owner_tried, &mut stats, diag).await;
        }
    }
    Ok(stats)
}

async fn apply_all(
    inv: &dyn Inventory,
    writes: Vec<TagWrite>,
    owner_tried: &mut HashSet<String>,
    stats: &mut RunStats,
    diag: &dyn Diagnostics,
) {
    for w in writes {
        if w.key == OWNER_TAG && !owner_tried.insert(w.resource_id.clone()) {
            diag.log(&format!("Owner already attempted for {}, skipping", w.resource_id));
            continue;
        }
        stats.planned += 1;
        if apply_tag(inv, &w, diag).await {
            stats.applied += 1;
        } else {
            stats.failed += 1;
        }
    }
}

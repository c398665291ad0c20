use anyhow::Context;
use tokio::io::AsyncReadExt;

use ec2_owner_tagger::config::{Config, EventSource};
use ec2_owner_tagger::inventory::{Ec2Inventory, Inventory, MockInventory};
use ec2_owner_tagger::{handle, logging, AuditEvent, TracingDiagnostics};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::from_env();
    logging::init_tracing(cfg.log_json);

    let raw = read_event(&cfg.event_source).await?;
    tracing::debug!(event = %raw, "received event");
    let event: AuditEvent = serde_json::from_str(&raw).context("parse audit event")?;

    let region = event.detail.as_ref().and_then(|d| d.aws_region.as_deref());
    let inventory: Box<dyn Inventory> = if cfg.mock {
        Box::new(MockInventory::demo())
    } else {
        Box::new(Ec2Inventory::for_region(region).await)
    };

    let resp = handle(&event, &*inventory, &TracingDiagnostics).await?;
    // detail 없는 이벤트는 응답 없음 (null)
    println!("{}", serde_json::to_string(&resp)?);
    Ok(())
}

async fn read_event(src: &EventSource) -> anyhow::Result<String> {
    match src {
        EventSource::Stdin => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("read event from stdin")?;
            Ok(buf)
        }
        EventSource::File(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("read event file {path}")),
    }
}

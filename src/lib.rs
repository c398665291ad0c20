//! Tags freshly launched EC2 instances and their attached EBS volumes.
//!
//! Input is one CloudTrail `RunInstances` audit event. Every instance in the
//! event gets an `Owner` tag (the caller's label) and every attached volume gets
//! `Owner` plus `AttachedInstance` (`"<instance-id> - <Name>"`). Existing tags
//! are never overwritten.

pub mod config;
pub mod diagnostics;
pub mod event;
pub mod handler;
pub mod identity;
pub mod inventory;
pub mod logging;
pub mod reconcile;

pub use diagnostics::{Diagnostics, RecordingDiagnostics, TracingDiagnostics};
pub use event::{AuditEvent, Detail, IdentityDescriptor, ShapeError};
pub use handler::{handle, HandlerResponse};
pub use identity::{resolve, ActorLabel};
pub use inventory::{Ec2Inventory, InstanceDescription, Inventory, InventoryError, MockInventory};
pub use reconcile::{missing_tags, RequiredTag, TagWrite};

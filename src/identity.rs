use std::fmt;

use crate::diagnostics::Diagnostics;
use crate::event::{Detail, IdentityDescriptor, ShapeError};

/// Human readable label of the caller. Empty when it could not be determined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActorLabel(String);

impl ActorLabel {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ActorLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn resolve(identity: Option<&IdentityDescriptor>, diag: &dyn Diagnostics) -> ActorLabel {
    let identity = match identity {
        Some(i) => i,
        None => {
            diag.log("Could not determine username (no userIdentity data in cloudtrail)");
            return ActorLabel::default();
        }
    };

    match identity {
        IdentityDescriptor::AssumedRole {
            principal_id,
            session_issuer,
        } => {
            // principalId = "AROAXXXX:session-name"
            let session = principal_id.as_deref().and_then(|p| p.split(':').nth(1));
            match (session, session_issuer.as_deref()) {
                (Some(user), Some(role)) => {
                    ActorLabel(format!("UserName: {user}, Role: {role} (role)"))
                }
                (None, _) => {
                    diag.log(&format!(
                        "could not find username, principalId has no session part: {:?}",
                        principal_id
                    ));
                    ActorLabel::default()
                }
                (_, None) => {
                    diag.log("could not find username, sessionContext.sessionIssuer.userName is missing");
                    ActorLabel::default()
                }
            }
        }
        IdentityDescriptor::IamUser { user_name } => match user_name {
            Some(u) => ActorLabel(u.clone()),
            None => {
                diag.log("could not find username, IAMUser identity has no userName");
                ActorLabel::default()
            }
        },
        IdentityDescriptor::Root => ActorLabel("root".into()),
        IdentityDescriptor::Unknown { kind } => {
            diag.log(&format!(
                "Could not determine username (unknown iam userIdentity {})",
                kind.as_deref().unwrap_or("<none>")
            ));
            ActorLabel::default()
        }
    }
}

/// Label for the event detail. Shape problems degrade to an empty label.
pub fn resolve_detail(detail: &Detail, diag: &dyn Diagnostics) -> ActorLabel {
    match detail.identity() {
        Ok(id) => resolve(Some(&id), diag),
        Err(ShapeError::MissingIdentity) => resolve(None, diag),
        Err(e) => {
            diag.log(&format!("could not find username, {e}"));
            ActorLabel::default()
        }
    }
}

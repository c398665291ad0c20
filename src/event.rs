use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

// CloudTrail "RunInstances" 이벤트 (EventBridge 경유)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditEvent {
    #[serde(default)]
    pub detail: Option<Detail>,
}

// 하위 섹션은 모양이 틀려도 이벤트 전체를 버리지 않도록 Value 로 받는다
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detail {
    #[serde(default)]
    pub user_identity: Option<Value>,
    #[serde(default)]
    pub aws_region: Option<String>,
    #[serde(default)]
    pub response_elements: Option<Value>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapeError {
    #[error("no userIdentity data in cloudtrail event")]
    MissingIdentity,
    #[error("malformed userIdentity: {0}")]
    MalformedIdentity(String),
    #[error("no responseElements.instancesSet.items in event")]
    MissingInstances,
    #[error("malformed instancesSet: {0}")]
    MalformedInstances(String),
}

/// Who performed the call, as far as the event tells us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityDescriptor {
    AssumedRole {
        principal_id: Option<String>,
        session_issuer: Option<String>,
    },
    IamUser {
        user_name: Option<String>,
    },
    Root,
    Unknown {
        kind: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawIdentity {
    #[serde(rename = "type")]
    kind: Option<String>,
    principal_id: Option<String>,
    user_name: Option<String>,
    session_context: Option<RawSessionContext>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSessionContext {
    session_issuer: Option<RawSessionIssuer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSessionIssuer {
    user_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawResponseElements {
    instances_set: Option<RawInstancesSet>,
}

#[derive(Debug, Deserialize)]
struct RawInstancesSet {
    items: Option<Vec<RawInstanceItem>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInstanceItem {
    instance_id: String,
}

impl From<RawIdentity> for IdentityDescriptor {
    fn from(raw: RawIdentity) -> Self {
        match raw.kind.as_deref() {
            Some("AssumedRole") => IdentityDescriptor::AssumedRole {
                principal_id: raw.principal_id,
                session_issuer: raw
                    .session_context
                    .and_then(|c| c.session_issuer)
                    .and_then(|i| i.user_name),
            },
            Some("IAMUser") => IdentityDescriptor::IamUser {
                user_name: raw.user_name,
            },
            Some("Root") => IdentityDescriptor::Root,
            other => IdentityDescriptor::Unknown {
                kind: other.map(|s| s.to_string()),
            },
        }
    }
}

impl Detail {
    pub fn identity(&self) -> Result<IdentityDescriptor, ShapeError> {
        let v = match &self.user_identity {
            Some(v) if !v.is_null() => v,
            _ => return Err(ShapeError::MissingIdentity),
        };
        let raw: RawIdentity = serde_json::from_value(v.clone())
            .map_err(|e| ShapeError::MalformedIdentity(e.to_string()))?;
        Ok(raw.into())
    }

    /// Instance ids from `responseElements.instancesSet.items`, in event order.
    /// One item without an `instanceId` invalidates the whole set.
    pub fn instance_ids(&self) -> Result<Vec<String>, ShapeError> {
        let v = match &self.response_elements {
            Some(v) if !v.is_null() => v,
            _ => return Err(ShapeError::MissingInstances),
        };
        let raw: RawResponseElements = serde_json::from_value(v.clone())
            .map_err(|e| ShapeError::MalformedInstances(e.to_string()))?;
        let items = raw
            .instances_set
            .and_then(|s| s.items)
            .ok_or(ShapeError::MissingInstances)?;
        Ok(items.into_iter().map(|i| i.instance_id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn detail(v: Value) -> Detail {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn event_without_detail_parses() {
        let ev: AuditEvent = serde_json::from_value(json!({"source": "aws.ec2"})).unwrap();
        assert!(ev.detail.is_none());
    }

    #[test]
    fn assumed_role_descriptor() {
        let d = detail(json!({
            "userIdentity": {
                "type": "AssumedRole",
                "principalId": "AROAEXAMPLE:alice",
                "sessionContext": {"sessionIssuer": {"userName": "Admin"}}
            }
        }));
        assert_eq!(
            d.identity().unwrap(),
            IdentityDescriptor::AssumedRole {
                principal_id: Some("AROAEXAMPLE:alice".into()),
                session_issuer: Some("Admin".into()),
            }
        );
    }

    #[test]
    fn identity_kinds() {
        let iam = detail(json!({"userIdentity": {"type": "IAMUser", "userName": "bob"}}));
        assert_eq!(
            iam.identity().unwrap(),
            IdentityDescriptor::IamUser {
                user_name: Some("bob".into())
            }
        );

        let root = detail(json!({"userIdentity": {"type": "Root"}}));
        assert_eq!(root.identity().unwrap(), IdentityDescriptor::Root);

        let svc = detail(json!({"userIdentity": {"type": "AWSService"}}));
        assert_eq!(
            svc.identity().unwrap(),
            IdentityDescriptor::Unknown {
                kind: Some("AWSService".into())
            }
        );
    }

    #[test]
    fn identity_missing_or_malformed() {
        assert_eq!(detail(json!({})).identity(), Err(ShapeError::MissingIdentity));
        assert!(matches!(
            detail(json!({"userIdentity": "nope"})).identity(),
            Err(ShapeError::MalformedIdentity(_))
        ));
    }

    #[test]
    fn instance_ids_in_order() {
        let d = detail(json!({
            "responseElements": {"instancesSet": {"items": [
                {"instanceId": "i-1"}, {"instanceId": "i-2"}
            ]}}
        }));
        assert_eq!(d.instance_ids().unwrap(), vec!["i-1", "i-2"]);
    }

    #[test]
    fn instance_ids_degrade() {
        assert_eq!(detail(json!({})).instance_ids(), Err(ShapeError::MissingInstances));
        assert_eq!(
            detail(json!({"responseElements": null})).instance_ids(),
            Err(ShapeError::MissingInstances)
        );
        assert_eq!(
            detail(json!({"responseElements": {"instancesSet": {}}})).instance_ids(),
            Err(ShapeError::MissingInstances)
        );
        assert!(matches!(
            detail(json!({"responseElements": {"instancesSet": {"items": [{"foo": 1}]}}}))
                .instance_ids(),
            Err(ShapeError::MalformedInstances(_))
        ));
        assert!(detail(json!({"responseElements": {"instancesSet": {"items": []}}}))
            .instance_ids()
            .unwrap()
            .is_empty());
    }
}

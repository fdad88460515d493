//! Typed request and response records for the tracker endpoints we call.
//!
//! Only the fields the provisioning run reads are modelled; everything else the
//! tracker returns is ignored on decode.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Tracker entity identifier. Some endpoints return numbers, others UUID strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(i64),
    Text(String),
}

impl EntityId {
    /// Compare by textual form, so `42` and `"42"` are the same entity
    pub fn matches(&self, other: &EntityId) -> bool {
        match (self, other) {
            (EntityId::Number(a), EntityId::Number(b)) => a == b,
            (EntityId::Text(a), EntityId::Text(b)) => a == b,
            _ => self.to_string() == other.to_string(),
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Number(n) => write!(f, "{n}"),
            EntityId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        EntityId::Number(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        EntityId::Text(value.to_string())
    }
}

/// Entry of the campaign short-info listing
#[derive(Debug, Clone, Deserialize)]
pub struct CampaignSummary {
    #[serde(default)]
    pub id: Option<EntityId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrafficSource {
    pub id: EntityId,
    #[serde(default)]
    pub name: Option<String>,
}

/// Tracker-side domain used to receive clicks
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainRecord {
    pub id: EntityId,
    #[serde(default)]
    pub is_default: bool,
}

/// Response of the landing file upload
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedLandingFile {
    pub landing_file: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewLanding {
    pub name: String,
    pub path: String,
}

/// Response of any create call that only needs the new id
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedEntity {
    pub id: EntityId,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignDraft {
    pub name: String,
    pub traffic_source_id: EntityId,
    pub cost_model: String,
    pub currency: String,
    pub is_auto: bool,
    pub hide_referrer_type: String,
    pub domain_uuid: EntityId,
    pub distribution_type: String,
    pub custom_rotation: CustomRotation,
    pub campaign_settings: CampaignSettings,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomRotation {
    pub default_paths: Vec<RotationPath>,
    pub rules: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RotationPath {
    pub name: String,
    pub enabled: bool,
    pub weight: u32,
    pub landings: Vec<WeightedLanding>,
    pub offers: Vec<WeightedOffer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeightedLanding {
    pub id: EntityId,
    pub enabled: bool,
    pub weight: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedOffer {
    pub offer_id: i64,
    pub campaign_id: i64,
    pub direct_url: String,
    pub enabled: bool,
    pub weight: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignSettings {
    pub s2s_postback: Option<String>,
    pub postback_percent: u32,
    pub traffic_loss_percent: u32,
    pub payout_percent: u32,
    pub ea: u32,
    pub lp_pixel: Option<String>,
}

/// User record returned by the identity endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct Identity {
    pub permissions: Vec<PermissionBlock>,
}

/// Reference to an entity or group inside a permission block
#[derive(Debug, Clone, Deserialize)]
pub struct EntityRef {
    pub id: EntityId,
}

/// Access-control record for one subject type, as the tracker returns it
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionBlock {
    #[serde(default)]
    pub access_level: Value,
    pub subject: String,
    #[serde(default)]
    pub read: Vec<EntityRef>,
    #[serde(default)]
    pub modify: Vec<EntityRef>,
    #[serde(default)]
    pub read_groups: Vec<EntityRef>,
    #[serde(default)]
    pub modify_groups: Vec<EntityRef>,
}

/// Access-control record for one subject type, in the shape the update endpoint accepts
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionUpdate {
    pub access_level: Value,
    pub subject: String,
    pub read_uuids: Vec<EntityId>,
    pub modify_uuids: Vec<EntityId>,
    pub read_group_uuids: Vec<EntityId>,
    pub modify_group_uuids: Vec<EntityId>,
}

impl From<&PermissionBlock> for PermissionUpdate {
    fn from(block: &PermissionBlock) -> Self {
        fn ids(refs: &[EntityRef]) -> Vec<EntityId> {
            refs.iter().map(|r| r.id.clone()).collect()
        }

        Self {
            access_level: block.access_level.clone(),
            subject: block.subject.clone(),
            read_uuids: ids(&block.read),
            modify_uuids: ids(&block.modify),
            read_group_uuids: ids(&block.read_groups),
            modify_group_uuids: ids(&block.modify_groups),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PermissionsPayload {
    pub permissions: Vec<PermissionUpdate>,
}

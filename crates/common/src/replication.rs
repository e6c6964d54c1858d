use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::KeyedMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Bucket,
    User,
    Group,
    Policy,
}

impl EntityType {
    pub const ALL: [EntityType; 4] = [Self::Bucket, Self::User, Self::Group, Self::Policy];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bucket => "bucket",
            Self::User => "user",
            Self::Group => "group",
            Self::Policy => "policy",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Bucket => "Bucket",
            Self::User => "User",
            Self::Group => "Group",
            Self::Policy => "Policy",
        }
    }

    pub fn plural_label(self) -> &'static str {
        match self {
            Self::Bucket => "Buckets",
            Self::User => "Users",
            Self::Group => "Groups",
            Self::Policy => "Policies",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entity type '{0}' (expected bucket, user, group or policy)")]
pub struct ParseEntityTypeError(pub String);

impl FromStr for EntityType {
    type Err = ParseEntityTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bucket" | "buckets" => Ok(Self::Bucket),
            "user" | "users" => Ok(Self::User),
            "group" | "groups" => Ok(Self::Group),
            "policy" | "policies" => Ok(Self::Policy),
            _ => Err(ParseEntityTypeError(s.to_string())),
        }
    }
}

/// One deployment taking part in the replication group.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Site {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "deploymentID", default)]
    pub deployment_id: String,
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_bool().unwrap_or(false))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketFlags {
    #[serde(rename = "HasBucket", deserialize_with = "lenient_bool")]
    pub has_bucket: bool,
    #[serde(rename = "BucketMarkedDeleted", deserialize_with = "lenient_bool")]
    pub bucket_marked_deleted: bool,
    #[serde(rename = "HasTagsSet", deserialize_with = "lenient_bool")]
    pub has_tags_set: bool,
    #[serde(rename = "TagMismatch", deserialize_with = "lenient_bool")]
    pub tag_mismatch: bool,
    #[serde(rename = "HasPolicySet", deserialize_with = "lenient_bool")]
    pub has_policy_set: bool,
    #[serde(rename = "PolicyMismatch", deserialize_with = "lenient_bool")]
    pub policy_mismatch: bool,
    #[serde(rename = "HasQuotaCfgSet", deserialize_with = "lenient_bool")]
    pub has_quota_cfg_set: bool,
    #[serde(rename = "QuotaCfgMismatch", deserialize_with = "lenient_bool")]
    pub quota_cfg_mismatch: bool,
    #[serde(rename = "HasOLockConfigSet", deserialize_with = "lenient_bool")]
    pub has_olock_config_set: bool,
    #[serde(rename = "OLockConfigMismatch", deserialize_with = "lenient_bool")]
    pub olock_config_mismatch: bool,
    #[serde(rename = "HasSSECfgSet", deserialize_with = "lenient_bool")]
    pub has_sse_cfg_set: bool,
    #[serde(rename = "SSEConfigMismatch", deserialize_with = "lenient_bool")]
    pub sse_config_mismatch: bool,
    #[serde(rename = "HasReplicationCfg", deserialize_with = "lenient_bool")]
    pub has_replication_cfg: bool,
    #[serde(rename = "ReplicationCfgMismatch", deserialize_with = "lenient_bool")]
    pub replication_cfg_mismatch: bool,
    #[serde(rename = "VersioningConfigMismatch", deserialize_with = "lenient_bool")]
    pub versioning_config_mismatch: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserFlags {
    #[serde(rename = "HasUser", deserialize_with = "lenient_bool")]
    pub has_user: bool,
    #[serde(rename = "UserInfoMismatch", deserialize_with = "lenient_bool")]
    pub user_info_mismatch: bool,
    #[serde(rename = "HasPolicyMapping", deserialize_with = "lenient_bool")]
    pub has_policy_mapping: bool,
    #[serde(rename = "PolicyMismatch", deserialize_with = "lenient_bool")]
    pub policy_mismatch: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupFlags {
    #[serde(rename = "HasGroup", deserialize_with = "lenient_bool")]
    pub has_group: bool,
    #[serde(rename = "GroupDescMismatch", deserialize_with = "lenient_bool")]
    pub group_desc_mismatch: bool,
    #[serde(rename = "HasPolicyMapping", deserialize_with = "lenient_bool")]
    pub has_policy_mapping: bool,
    #[serde(rename = "PolicyMismatch", deserialize_with = "lenient_bool")]
    pub policy_mismatch: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyFlags {
    #[serde(rename = "HasPolicy", deserialize_with = "lenient_bool")]
    pub has_policy: bool,
    #[serde(rename = "PolicyMismatch", deserialize_with = "lenient_bool")]
    pub policy_mismatch: bool,
}

/// Per-site flag record. Anything that does not decode as `F` (a string,
/// a number, `null`) reads as a record with every flag absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct SiteRecord<F>(pub F);

impl<'de, F: DeserializeOwned + Default> Deserialize<'de> for SiteRecord<F> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Self(serde_json::from_value(value).unwrap_or_default()))
    }
}

/// deploymentID -> flags for a single entity.
pub type EntitySites<F> = KeyedMap<SiteRecord<F>>;

/// entity name -> per-site flags.
pub type EntityStats<F> = KeyedMap<EntitySites<F>>;

/// Body of `GET /api/v1/admin/site-replication/status`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteReplicationStatus {
    pub bucket_stats: EntityStats<BucketFlags>,
    pub user_stats: EntityStats<UserFlags>,
    pub group_stats: EntityStats<GroupFlags>,
    pub policy_stats: EntityStats<PolicyFlags>,
    /// deploymentID -> site.
    pub sites: KeyedMap<Site>,
    #[serde(deserialize_with = "lenient_count")]
    pub max_buckets: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub max_users: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub max_groups: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub max_policies: u64,
}

fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_u64().unwrap_or(0))
}

impl SiteReplicationStatus {
    pub fn max_for(&self, entity: EntityType) -> u64 {
        match entity {
            EntityType::Bucket => self.max_buckets,
            EntityType::User => self.max_users,
            EntityType::Group => self.max_groups,
            EntityType::Policy => self.max_policies,
        }
    }

    pub fn stats_len_for(&self, entity: EntityType) -> usize {
        match entity {
            EntityType::Bucket => self.bucket_stats.len(),
            EntityType::User => self.user_stats.len(),
            EntityType::Group => self.group_stats.len(),
            EntityType::Policy => self.policy_stats.len(),
        }
    }
}

/// Query string of the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusQuery {
    pub buckets: bool,
    pub groups: bool,
    pub policies: bool,
    pub users: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<EntityType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_value: Option<String>,
}

impl StatusQuery {
    /// Aggregate counts for every entity kind.
    pub fn summary() -> Self {
        Self {
            buckets: true,
            groups: true,
            policies: true,
            users: true,
            entity_type: None,
            entity_value: None,
        }
    }

    /// Single-entity lookup; aggregate sections are switched off.
    pub fn lookup(entity_type: EntityType, entity_value: impl Into<String>) -> Self {
        Self {
            buckets: false,
            groups: false,
            policies: false,
            users: false,
            entity_type: Some(entity_type),
            entity_value: Some(entity_value.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PeerInfo {
    #[serde(rename = "deploymentID", default)]
    pub deployment_id: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub name: String,
}

/// Body of `GET /api/v1/admin/site-replication`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteReplicationInfo {
    pub enabled: bool,
    pub name: String,
    pub service_account_access_key: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub sites: Vec<PeerInfo>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub access_key: String,
    pub secret_key: String,
}

/// Error payload returned by the console API.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiErrorBody {
    pub code: i64,
    pub message: String,
    pub detailed_message: String,
}

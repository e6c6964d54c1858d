use common::{
    BucketFlags, EntitySites, EntityStats, EntityType, GroupFlags, KeyedMap, PolicyFlags, Site,
    SiteReplicationStatus, UserFlags,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Cell {
    Header(String),
    Status(bool),
    NotApplicable,
    Label(String),
}

/// Row 0 is the header (blank cell, then one cell per site). Every other row
/// is a feature label followed by one status cell per site, in header order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMatrix {
    rows: Vec<Vec<Cell>>,
}

impl StatusMatrix {
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn header(&self) -> &[Cell] {
        &self.rows[0]
    }

    pub fn feature_rows(&self) -> &[Vec<Cell>] {
        &self.rows[1..]
    }

    pub fn width(&self) -> usize {
        self.rows[0].len()
    }

    /// Feature row by its label.
    pub fn row(&self, label: &str) -> Option<&[Cell]> {
        self.feature_rows()
            .iter()
            .find(|row| matches!(row.first(), Some(Cell::Label(l)) if l == label))
            .map(Vec::as_slice)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LookupOutcome {
    NotFound { entity: EntityType, value: String },
    Matrix { matrix: StatusMatrix },
}

impl LookupOutcome {
    pub fn not_found_message(&self) -> Option<String> {
        match self {
            Self::NotFound { entity, value } => {
                Some(format!("{}: {} not found.", entity.label(), value))
            }
            Self::Matrix { .. } => None,
        }
    }

    pub fn matrix(&self) -> Option<&StatusMatrix> {
        match self {
            Self::Matrix { matrix } => Some(matrix),
            Self::NotFound { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("a {0} name is required for the lookup")]
    EmptyValue(EntityType),
}

/// A validated user lookup request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityLookup {
    pub entity: EntityType,
    pub value: String,
}

impl EntityLookup {
    pub fn new(entity: EntityType, value: impl Into<String>) -> Result<Self, LookupError> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            return Err(LookupError::EmptyValue(entity));
        }
        Ok(Self { entity, value })
    }

    /// Builds the outcome from a lookup response.
    pub fn resolve(&self, status: &SiteReplicationStatus) -> LookupOutcome {
        match self.entity {
            EntityType::Bucket => build_status(&status.bucket_stats, &status.sites, &self.value),
            EntityType::User => build_status(&status.user_stats, &status.sites, &self.value),
            EntityType::Group => build_status(&status.group_stats, &status.sites, &self.value),
            EntityType::Policy => build_status(&status.policy_stats, &status.sites, &self.value),
        }
    }
}

/// A tracked feature row: its label plus accessors for the `HasX` and
/// `XMismatch` flags.
pub struct Feature<F> {
    pub label: &'static str,
    pub has: fn(&F) -> bool,
    pub mismatch: fn(&F) -> bool,
}

pub trait TrackedEntity: Sized + 'static {
    const KIND: EntityType;
    const FEATURES: &'static [Feature<Self>];

    /// Whether the entity exists on the site at all.
    fn is_present(&self) -> bool;
}

impl TrackedEntity for BucketFlags {
    const KIND: EntityType = EntityType::Bucket;
    const FEATURES: &'static [Feature<Self>] = &[
        Feature {
            label: "Tags",
            has: |f| f.has_tags_set,
            mismatch: |f| f.tag_mismatch,
        },
        Feature {
            label: "Policy",
            has: |f| f.has_policy_set,
            mismatch: |f| f.policy_mismatch,
        },
        Feature {
            label: "Quota",
            has: |f| f.has_quota_cfg_set,
            mismatch: |f| f.quota_cfg_mismatch,
        },
        Feature {
            label: "Retention",
            has: |f| f.has_olock_config_set,
            mismatch: |f| f.olock_config_mismatch,
        },
        Feature {
            label: "Encryption",
            has: |f| f.has_sse_cfg_set,
            mismatch: |f| f.sse_config_mismatch,
        },
        Feature {
            label: "Replication",
            has: |f| f.has_replication_cfg,
            mismatch: |f| f.replication_cfg_mismatch,
        },
    ];

    fn is_present(&self) -> bool {
        self.has_bucket
    }
}

impl TrackedEntity for UserFlags {
    const KIND: EntityType = EntityType::User;
    const FEATURES: &'static [Feature<Self>] = &[
        Feature {
            label: "Info",
            has: |f| f.has_user,
            mismatch: |f| f.user_info_mismatch,
        },
        Feature {
            label: "Policy mapping",
            has: |f| f.has_policy_mapping,
            mismatch: |f| f.policy_mismatch,
        },
    ];

    fn is_present(&self) -> bool {
        self.has_user
    }
}

impl TrackedEntity for GroupFlags {
    const KIND: EntityType = EntityType::Group;
    const FEATURES: &'static [Feature<Self>] = &[
        Feature {
            label: "Info",
            has: |f| f.has_group,
            mismatch: |f| f.group_desc_mismatch,
        },
        Feature {
            label: "Policy mapping",
            has: |f| f.has_policy_mapping,
            mismatch: |f| f.policy_mismatch,
        },
    ];

    fn is_present(&self) -> bool {
        self.has_group
    }
}

impl TrackedEntity for PolicyFlags {
    const KIND: EntityType = EntityType::Policy;
    const FEATURES: &'static [Feature<Self>] = &[Feature {
        label: "Policy",
        has: |f| f.has_policy,
        mismatch: |f| f.policy_mismatch,
    }];

    fn is_present(&self) -> bool {
        self.has_policy
    }
}

pub fn sync_status(mismatch: bool, has: bool) -> Cell {
    if has {
        Cell::Status(!mismatch)
    } else {
        Cell::NotApplicable
    }
}

pub fn build_status<F: TrackedEntity>(
    stats: &EntityStats<F>,
    sites: &KeyedMap<Site>,
    lookup_value: &str,
) -> LookupOutcome {
    let empty = EntitySites::new();
    let entity_sites = stats.get(lookup_value).unwrap_or(&empty);

    let site_flags: Vec<Option<&F>> = sites
        .values()
        .map(|site| entity_sites.get(&site.deployment_id).map(|record| &record.0))
        .collect();

    let found = site_flags
        .iter()
        .any(|flags| flags.is_some_and(|f| f.is_present()));
    if !found {
        return LookupOutcome::NotFound {
            entity: F::KIND,
            value: lookup_value.to_string(),
        };
    }

    let mut rows = Vec::with_capacity(F::FEATURES.len() + 1);

    let mut header = Vec::with_capacity(sites.len() + 1);
    header.push(Cell::Header(String::new()));
    header.extend(sites.values().map(|site| Cell::Header(site.name.clone())));
    rows.push(header);

    for feature in F::FEATURES {
        let mut row = Vec::with_capacity(sites.len() + 1);
        row.push(Cell::Label(feature.label.to_string()));
        row.extend(site_flags.iter().map(|flags| match flags {
            Some(flags) => sync_status((feature.mismatch)(*flags), (feature.has)(*flags)),
            None => Cell::NotApplicable,
        }));
        rows.push(row);
    }

    LookupOutcome::Matrix {
        matrix: StatusMatrix { rows },
    }
}

mod keyed;
mod replication;
mod stream;

pub use keyed::KeyedMap;
pub use replication::{
    ApiErrorBody, BucketFlags, EntitySites, EntityStats, EntityType, GroupFlags, LoginRequest,
    ParseEntityTypeError, PeerInfo, PolicyFlags, SiteRecord, Site, SiteReplicationInfo,
    SiteReplicationStatus, StatusQuery, UserFlags,
};
pub use stream::{
    CallStats, HealOptions, HealStatus, HealthColor, TraceCall, TraceFilter, TraceMessage,
};

//! Replication status logic for the console client: matrix building,
//! rendering, dashboard and stream state, plus the small sort and format
//! helpers the screens share. Nothing in here performs I/O.

pub mod dashboard;
pub mod format;
pub mod heal;
pub mod matrix;
pub mod render;
pub mod sort;
pub mod trace;

pub use dashboard::{
    Applied, DashboardAction, DashboardState, EntitySummary, LookupState, Notification,
    RequestId, Severity, summarize,
};
pub use heal::{HealProgress, health_percentages};
pub use matrix::{
    Cell, EntityLookup, Feature, LookupError, LookupOutcome, StatusMatrix, TrackedEntity,
    build_status, sync_status,
};
pub use render::{Glyph, render_html, render_text};
pub use trace::{TraceAction, TraceState, trace_line};

use std::collections::BTreeMap;

use common::{HealStatus, HealthColor};

use crate::format::{nice_bytes_int, nice_time_from_seconds};

/// Percentage of scanned items per health colour, in [`HealthColor::ORDER`].
pub fn health_percentages(cols: &BTreeMap<HealthColor, u64>, items_scanned: u64) -> [f64; 4] {
    HealthColor::ORDER.map(|color| {
        if items_scanned == 0 {
            return 0.0;
        }
        let count = cols.get(&color).copied().unwrap_or(0);
        count as f64 * 100.0 / items_scanned as f64
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct HealProgress {
    pub before_heal: [f64; 4],
    pub after_heal: [f64; 4],
    pub objects_healed: u64,
    pub objects_scanned: u64,
    pub heal_duration: f64,
    pub size_scanned: String,
}

impl HealProgress {
    pub fn from_status(status: &HealStatus) -> Self {
        Self {
            before_heal: health_percentages(&status.health_before_cols, status.items_scanned),
            after_heal: health_percentages(&status.health_after_cols, status.items_scanned),
            objects_healed: status.objects_healed,
            objects_scanned: status.objects_scanned,
            heal_duration: status.heal_duration,
            size_scanned: nice_bytes_int(status.bytes_scanned, false),
        }
    }

    pub fn line(&self) -> String {
        let cols = |values: &[f64; 4]| {
            HealthColor::ORDER
                .iter()
                .zip(values)
                .map(|(color, pct)| format!("{color:?}={pct:.1}%"))
                .collect::<Vec<_>>()
                .join(" ")
        };
        let elapsed = match nice_time_from_seconds(self.heal_duration as u64) {
            text if text.is_empty() => "0 seconds".to_string(),
            text => text,
        };
        format!(
            "healed {}/{} objects, scanned {} in {} | before: {} | after: {}",
            self.objects_healed,
            self.objects_scanned,
            self.size_scanned,
            elapsed,
            cols(&self.before_heal),
            cols(&self.after_heal),
        )
    }
}

use serde::{Deserialize, Serialize};

use crate::catalog::Category;
use crate::geometry::Room;
use crate::layout::CandidateLayout;

/// Linear metres of cabinetry per square metre of floor.
const RATIO: f64 = 0.5;
/// Floor for the target whatever the room size (m).
const MIN_TOTAL: f64 = 3.0;
/// Floor area (m²) from which an island is suggested.
const ISLAND_THRESHOLD: f64 = 15.0;
const ISLAND_MIN_WIDTH: f64 = 120.0;
const ISLAND_MAX_WIDTH: f64 = 240.0;
/// Island width (cm) proposed per metre of deficit.
const ISLAND_WIDTH_PER_METRE: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageStatus {
    Ok,
    UnderStorage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageReport {
    pub floor_area: Option<f64>,
    pub target_m: f64,
    pub actual_m: f64,
    pub deficit_m: f64,
    pub status: StorageStatus,
    pub suggest_island: bool,
    /// Island width (cm) that would cover the deficit, when one is suggested.
    pub island_width: Option<f64>,
}

impl StorageReport {
    pub fn is_under_storage(&self) -> bool {
        self.status == StorageStatus::UnderStorage
    }
}

/// Compares cabinet run length, fillers excluded, with the room's target.
pub fn storage_report(layout: &CandidateLayout, room: &Room) -> StorageReport {
    let area = room.floor_area.unwrap_or(0.0).max(0.0);
    let target_m = (area * RATIO).max(MIN_TOTAL);
    let actual_m = layout
        .modules()
        .filter(|m| m.category() != Category::Filler)
        .map(|m| m.width())
        .sum::<f64>()
        / 100.0;
    let deficit_m = (target_m - actual_m).max(0.0);
    let status = if deficit_m > 0.0 {
        StorageStatus::UnderStorage
    } else {
        StorageStatus::Ok
    };
    let suggest_island = area >= ISLAND_THRESHOLD;
    let island_width = (suggest_island && status == StorageStatus::UnderStorage).then(|| {
        (deficit_m * ISLAND_WIDTH_PER_METRE).clamp(ISLAND_MIN_WIDTH, ISLAND_MAX_WIDTH)
    });

    StorageReport {
        floor_area: room.floor_area,
        target_m,
        actual_m,
        deficit_m,
        status,
        suggest_island,
        island_width,
    }
}

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use ndarray::{s, Array3};

use super::audio::object_name;
use super::error::{LoadError, Result};
use super::model::{PositionBatch, PositionRecord};
use super::table::Table;

const POSITION_COLUMNS: [&str; 3] = ["x", "y", "z"];

/// The recorded tables name `ref_vec_x` three times over; kept as read.
const REF_VEC_COLUMNS: [&str; 3] = ["ref_vec_x", "ref_vec_x", "ref_vec_x"];

const ROTATION_COLUMNS: [&str; 9] = [
    "rotation_11",
    "rotation_12",
    "rotation_13",
    "rotation_21",
    "rotation_22",
    "rotation_23",
    "rotation_31",
    "rotation_32",
    "rotation_33",
];

// ---------------------------------------------------------------------------
// Microphone columns
// ---------------------------------------------------------------------------

/// Microphone indices named by the header, ascending.
///
/// Any column containing `mic` contributes the part before its first `_`,
/// e.g. `mic12_y` → 12.
pub fn mic_indices(table: &Table) -> Result<Vec<u32>> {
    let prefixes: BTreeSet<&str> = table
        .headers()
        .iter()
        .filter(|h| h.contains("mic"))
        .map(|h| h.split('_').next().unwrap_or(h.as_str()))
        .collect();

    let mut indices = prefixes
        .into_iter()
        .map(|prefix| {
            prefix
                .strip_prefix("mic")
                .and_then(|n| n.parse::<u32>().ok())
                .ok_or_else(|| LoadError::MalformedMicColumn {
                    path: table.path().to_path_buf(),
                    column: prefix.to_string(),
                })
        })
        .collect::<Result<Vec<_>>>()?;
    indices.sort_unstable();
    Ok(indices)
}

/// Stack each microphone's `x, y, z` into a `3 x N x M` tensor, `None`
/// when the table has no microphone columns.
fn mic_tensor(table: &Table) -> Result<Option<Array3<f64>>> {
    let indices = mic_indices(table)?;
    if indices.is_empty() {
        return Ok(None);
    }

    let mut mic = Array3::<f64>::zeros((3, table.len(), indices.len()));
    for (slot, index) in indices.iter().enumerate() {
        let labels: Vec<String> = POSITION_COLUMNS
            .iter()
            .map(|axis| format!("mic{index}_{axis}"))
            .collect();
        let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
        let coords = table.matrix(&labels)?;
        mic.slice_mut(s![.., .., slot]).assign(&coords);
    }
    Ok(Some(mic))
}

// ---------------------------------------------------------------------------
// Loaders
// ---------------------------------------------------------------------------

/// Read one position table.
pub fn read_position_table(path: &Path) -> Result<PositionRecord> {
    let table = Table::read(path)?;

    Ok(PositionRecord {
        time: table.timestamps()?,
        position: table.matrix(&POSITION_COLUMNS)?,
        ref_vec: table.matrix(&REF_VEC_COLUMNS)?,
        rotation: table.matrix(&ROTATION_COLUMNS)?,
        mic: mic_tensor(&table)?,
    })
}

/// Load every position table in `paths`, keyed by object name.
///
/// Each record keeps its own timestamps; the batch-level `time` is the
/// copy from the last table read.
pub fn load_position_batch(paths: &[PathBuf], role: &str) -> Result<PositionBatch> {
    let mut batch = PositionBatch::default();

    for path in paths {
        let record = read_position_table(path)?;
        let name = object_name(path, role);
        debug!(
            "{role}/{name}: {} rows, {} mics",
            record.len(),
            record.mic_count()
        );
        if let Some(previous) = &batch.time {
            if previous != &record.time {
                warn!("{role}/{name}: timestamps differ from previous table, replacing them");
            }
        }
        batch.time = Some(record.time.clone());
        batch.data.insert(name, record);
    }

    info!("Loaded {} {role} tables", batch.data.len());
    Ok(batch)
}

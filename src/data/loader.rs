use std::path::{Path, PathBuf};

use log::info;

use super::audio::load_audio_batch;
use super::error::{LoadError, Result};
use super::model::{LocataDataset, PositionBatch, RequiredTime, SourceAudio};
use super::position::load_position_batch;
use super::table::Table;

pub const REQUIRED_TIME_FILE: &str = "required_time.txt";

pub const AUDIO_ARRAY: &str = "audio_array";
pub const AUDIO_SOURCE: &str = "audio_source";
pub const POSITION_ARRAY: &str = "position_array";
pub const POSITION_SOURCE: &str = "position_source";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load one LOCATA recording folder.
///
/// `is_dev` selects development mode, where clean source audio and source
/// positions are present. In evaluation mode both are `None`.
///
/// A folder without the audio its mode needs yields
/// [`LoadError::UnexpectedAudio`], the only fatal error.
pub fn load_locata_data(dir: &Path, is_dev: bool) -> Result<LocataDataset> {
    let required_time = load_required_time(&dir.join(REQUIRED_TIME_FILE))?;

    let wav_files = list_files(dir, "wav")?;
    let audio_array_files = with_role(&wav_files, AUDIO_ARRAY);
    let audio_source_files = if is_dev {
        with_role(&wav_files, AUDIO_SOURCE)
    } else {
        Vec::new()
    };

    let audio_missing = if is_dev {
        audio_array_files.len() + audio_source_files.len() == 0
    } else {
        audio_array_files.is_empty()
    };
    if audio_missing {
        return Err(LoadError::UnexpectedAudio {
            dir: dir.to_path_buf(),
        });
    }

    let audio_array = load_audio_batch(&audio_array_files, AUDIO_ARRAY)?;
    let audio_source = if is_dev {
        Some(SourceAudio::new(load_audio_batch(
            &audio_source_files,
            AUDIO_SOURCE,
        )?))
    } else {
        None
    };

    let txt_files = list_files(dir, "txt")?;
    let position_source = if is_dev {
        Some(load_position_batch(
            &with_role(&txt_files, POSITION_SOURCE),
            POSITION_SOURCE,
        )?)
    } else {
        None
    };
    let position_array =
        load_position_batch(&with_role(&txt_files, POSITION_ARRAY), POSITION_ARRAY)?;

    info!(
        "Loaded {} ({} mode): {} arrays, {} sources, {} required timestamps",
        dir.display(),
        if is_dev { "dev" } else { "eval" },
        audio_array.len(),
        audio_source.as_ref().map_or(0, |s| s.source_count),
        required_time.len()
    );

    Ok(LocataDataset {
        audio_array,
        audio_source,
        position_array,
        position_source,
        required_time,
    })
}

/// Ground-truth extraction hook. Nothing is computed yet; always `None`.
pub fn get_locata_truth(
    _dir: &Path,
    _position_array: &PositionBatch,
    _position_source: Option<&PositionBatch>,
    _required_time: &RequiredTime,
    _is_dev: bool,
) -> Option<PositionBatch> {
    None
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Read `required_time.txt`: six calendar columns plus `valid_flag`.
pub fn load_required_time(path: &Path) -> Result<RequiredTime> {
    let table = Table::read(path)?;
    Ok(RequiredTime {
        time: table.timestamps()?,
        valid_flag: table.bool_column("valid_flag")?,
    })
}

/// Files directly inside `dir` with extension `ext`, sorted.
fn list_files(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    let io_err = |source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == ext);
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Files whose name contains `role`.
fn with_role(files: &[PathBuf], role: &str) -> Vec<PathBuf> {
    files
        .iter()
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.contains(role))
        })
        .cloned()
        .collect()
}

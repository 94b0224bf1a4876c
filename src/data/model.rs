use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use ndarray::{Array2, Array3};
use serde::Serialize;

/// Values keyed by object name (array or source identifier derived from
/// the file name).
pub type NamedCollection<T> = BTreeMap<String, T>;

// ---------------------------------------------------------------------------
// AudioBatch – every WAV file of one role
// ---------------------------------------------------------------------------

/// Audio loaded for one role (`audio_array` or `audio_source`).
#[derive(Debug, Clone, Default)]
pub struct AudioBatch {
    /// Samples per object name, shape `(frames, channels)`, float in [-1, 1).
    pub data: NamedCollection<Array2<f64>>,
    /// Sample rate of the batch. Last file loaded wins.
    pub sample_rate: Option<u32>,
    /// Transposed timestamp table (one row per field). Last file loaded wins.
    pub time: Option<Array2<f64>>,
}

impl AudioBatch {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Clean source signals plus how many sources were found.
#[derive(Debug, Clone, Default)]
pub struct SourceAudio {
    pub audio: AudioBatch,
    pub source_count: usize,
}

impl SourceAudio {
    pub fn new(audio: AudioBatch) -> Self {
        let source_count = audio.len();
        Self {
            audio,
            source_count,
        }
    }
}

// ---------------------------------------------------------------------------
// PositionRecord – one position_<role>_<name>.txt
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PositionRecord {
    /// One timestamp per row.
    pub time: Vec<NaiveDateTime>,
    /// `3 x N`: x, y, z.
    pub position: Array2<f64>,
    /// `3 x N` reference vector.
    pub ref_vec: Array2<f64>,
    /// `9 x N`: rotation_11 … rotation_33, row-major.
    pub rotation: Array2<f64>,
    /// `3 x N x M` microphone coordinates, `None` without mic columns.
    pub mic: Option<Array3<f64>>,
}

impl PositionRecord {
    /// Number of timestamped rows.
    pub fn len(&self) -> usize {
        self.position.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of microphones, zero when the table had none.
    pub fn mic_count(&self) -> usize {
        self.mic.as_ref().map_or(0, |m| m.shape()[2])
    }
}

/// Position tables loaded for one role.
#[derive(Debug, Clone, Default)]
pub struct PositionBatch {
    pub data: NamedCollection<PositionRecord>,
    /// Row timestamps of the batch. Last file loaded wins.
    pub time: Option<Vec<NaiveDateTime>>,
}

// ---------------------------------------------------------------------------
// RequiredTime – when estimates are expected
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequiredTime {
    pub time: Vec<NaiveDateTime>,
    /// Same length as `time`.
    pub valid_flag: Vec<bool>,
}

impl RequiredTime {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Count of timestamps at which an estimate is valid.
    pub fn valid_count(&self) -> usize {
        self.valid_flag.iter().filter(|&&v| v).count()
    }
}

// ---------------------------------------------------------------------------
// LocataDataset – the complete bundle for one recording folder
// ---------------------------------------------------------------------------

/// Everything loaded from one task/recording folder.
///
/// `audio_source` and `position_source` are `None` in evaluation mode.
#[derive(Debug, Clone)]
pub struct LocataDataset {
    pub audio_array: AudioBatch,
    pub audio_source: Option<SourceAudio>,
    pub position_array: PositionBatch,
    pub position_source: Option<PositionBatch>,
    pub required_time: RequiredTime,
}

// ---------------------------------------------------------------------------
// Summary – printable description of a loaded dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct AudioSummary {
    pub name: String,
    pub frames: usize,
    pub channels: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PositionSummary {
    pub name: String,
    pub rows: usize,
    pub mics: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub sample_rate: Option<u32>,
    pub audio_array: Vec<AudioSummary>,
    pub audio_source: Option<Vec<AudioSummary>>,
    pub source_count: Option<usize>,
    pub position_array: Vec<PositionSummary>,
    pub position_source: Option<Vec<PositionSummary>>,
    pub required_time: usize,
    pub valid_time: usize,
}

fn audio_summaries(batch: &AudioBatch) -> Vec<AudioSummary> {
    batch
        .data
        .iter()
        .map(|(name, samples)| AudioSummary {
            name: name.clone(),
            frames: samples.nrows(),
            channels: samples.ncols(),
        })
        .collect()
}

fn position_summaries(batch: &PositionBatch) -> Vec<PositionSummary> {
    batch
        .data
        .iter()
        .map(|(name, rec)| PositionSummary {
            name: name.clone(),
            rows: rec.len(),
            mics: rec.mic_count(),
        })
        .collect()
}

impl LocataDataset {
    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            sample_rate: self.audio_array.sample_rate,
            audio_array: audio_summaries(&self.audio_array),
            audio_source: self.audio_source.as_ref().map(|s| audio_summaries(&s.audio)),
            source_count: self.audio_source.as_ref().map(|s| s.source_count),
            position_array: position_summaries(&self.position_array),
            position_source: self.position_source.as_ref().map(position_summaries),
            required_time: self.required_time.len(),
            valid_time: self.required_time.valid_count(),
        }
    }
}

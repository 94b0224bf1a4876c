use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavReader};
use log::{debug, info, warn};
use ndarray::Array2;

use super::error::{LoadError, Result};
use super::model::AudioBatch;
use super::table::read_numeric_table;

// ---------------------------------------------------------------------------
// File naming
// ---------------------------------------------------------------------------

/// Object name of a file: its stem with a leading `<role>_` removed.
///
/// `audio_array_dicit.wav` with role `audio_array` → `dicit`.
pub fn object_name(path: &Path, role: &str) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let prefix = format!("{role}_");
    match stem.strip_prefix(&prefix) {
        Some(rest) => rest.to_string(),
        None => stem,
    }
}

/// Companion timestamp table of an audio file: the trailing `<name>.wav`
/// becomes `timestamps_<name>.txt`, anything before it is kept.
///
/// `audio_array_dicit.wav` → `audio_array_timestamps_dicit.txt`.
pub fn timestamp_path(wav: &Path, name: &str) -> PathBuf {
    let stem = wav
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let lead = stem.strip_suffix(name).unwrap_or("");
    let file = format!("{lead}timestamps_{name}.txt");
    match wav.parent() {
        Some(dir) => dir.join(file),
        None => PathBuf::from(file),
    }
}

// ---------------------------------------------------------------------------
// WAV decoding
// ---------------------------------------------------------------------------

/// Decode a WAV file into `(frames, channels)` floats plus its sample rate.
///
/// Integer PCM of any depth is scaled by `2^(bits-1)`; 32-bit float is kept.
pub fn read_wav(path: &Path) -> Result<(Array2<f64>, u32)> {
    let wav_err = |source| LoadError::Wav {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = WavReader::open(path).map_err(wav_err)?;
    let spec = reader.spec();
    let channels = spec.channels as usize;

    let samples: Vec<f64> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, bits @ 8..=32) => {
            let scale = (1u64 << (bits - 1)) as f64;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f64 / scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(wav_err)?
        }
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<std::result::Result<_, _>>()
            .map_err(wav_err)?,
        (format, bits) => {
            return Err(LoadError::UnsupportedFormat {
                path: path.to_path_buf(),
                detail: format!("{format:?} {bits}-bit"),
            });
        }
    };

    if channels == 0 {
        return Err(LoadError::UnsupportedFormat {
            path: path.to_path_buf(),
            detail: "zero channels".to_string(),
        });
    }
    let frames = samples.len() / channels;
    let data = Array2::from_shape_vec((frames, channels), samples).map_err(|_| {
        LoadError::UnsupportedFormat {
            path: path.to_path_buf(),
            detail: "trailing partial frame".to_string(),
        }
    })?;

    Ok((data, spec.sample_rate))
}

// ---------------------------------------------------------------------------
// Batch loader
// ---------------------------------------------------------------------------

/// Load every WAV in `paths` together with its timestamp table.
///
/// Samples are keyed by object name. The batch keeps a single sample rate
/// and a single time table, taken from the last file.
pub fn load_audio_batch(paths: &[PathBuf], role: &str) -> Result<AudioBatch> {
    let mut batch = AudioBatch::default();

    for path in paths {
        let (samples, sample_rate) = read_wav(path)?;
        let name = object_name(path, role);

        let ts_path = timestamp_path(path, &name);
        if !ts_path.is_file() {
            return Err(LoadError::MissingTimestamps(ts_path));
        }
        let time = read_numeric_table(&ts_path)?;

        debug!(
            "{role}/{name}: {} frames x {} channels @ {sample_rate} Hz, {} timestamp rows",
            samples.nrows(),
            samples.ncols(),
            time.ncols()
        );

        if let Some(previous) = batch.sample_rate {
            if previous != sample_rate {
                warn!("{role}/{name}: sample rate {sample_rate} Hz replaces {previous} Hz");
            }
        }
        if let Some(previous) = &batch.time {
            if previous != &time {
                warn!("{role}/{name}: timestamp table differs from previous file, replacing it");
            }
        }

        batch.sample_rate = Some(sample_rate);
        batch.time = Some(time);
        batch.data.insert(name, samples);
    }

    info!("Loaded {} {role} recordings", batch.len());
    Ok(batch)
}

use std::path::Path;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};

use super::error::{LoadError, Result};
use super::table::TIME_COLUMNS;

// ---------------------------------------------------------------------------
// Synthetic recording folders
// ---------------------------------------------------------------------------

/// What to put in a generated folder.
#[derive(Debug, Clone)]
pub struct SampleOptions {
    /// `(name, microphone count)`; each array records one channel per mic.
    pub arrays: Vec<(String, usize)>,
    /// Source names; ignored when `eval` is set.
    pub sources: Vec<String>,
    pub sample_rate: u32,
    /// Audio length in frames.
    pub frames: usize,
    /// Rows in every position and required-time table.
    pub rows: usize,
    /// Leave out source audio and positions.
    pub eval: bool,
    pub seed: u64,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            arrays: vec![("dicit".to_string(), 15), ("eigenmike".to_string(), 32)],
            sources: vec!["talker1".to_string()],
            sample_rate: 48000,
            frames: 48000,
            rows: 50,
            eval: false,
            seed: 42,
        }
    }
}

/// Deterministic noise source (splitmix64).
struct Noise(u64);

impl Noise {
    /// Uniform in [-1, 1).
    fn next_signed(&mut self) -> f64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        (z >> 11) as f64 / (1u64 << 52) as f64 - 1.0
    }
}

fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2017, 5, 24)
        .and_then(|d| d.and_hms_opt(14, 3, 0))
        .unwrap_or(NaiveDateTime::MIN)
}

fn push_time(line: &mut String, t: &NaiveDateTime) {
    let second = t.second() as f64 + t.nanosecond() as f64 / 1e9;
    line.push_str(&format!(
        "{}\t{}\t{}\t{}\t{}\t{second:.6}",
        t.year(),
        t.month(),
        t.day(),
        t.hour(),
        t.minute()
    ));
}

fn write_text(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Noisy tone, 16-bit PCM, `channels` interleaved.
fn write_wav(
    path: &Path,
    channels: usize,
    opts: &SampleOptions,
    noise: &mut Noise,
) -> Result<()> {
    let wav_err = |source| LoadError::Wav {
        path: path.to_path_buf(),
        source,
    };
    let spec = hound::WavSpec {
        channels: channels as u16,
        sample_rate: opts.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).map_err(wav_err)?;
    let omega = 2.0 * std::f64::consts::PI * 440.0 / opts.sample_rate as f64;
    for frame in 0..opts.frames {
        for _ in 0..channels {
            let v = 0.25 * (omega * frame as f64).sin() + 0.01 * noise.next_signed();
            writer
                .write_sample((v * i16::MAX as f64) as i16)
                .map_err(wav_err)?;
        }
    }
    writer.finalize().map_err(wav_err)
}

/// One timestamp row per audio frame block of 1/100 s.
fn write_audio_timestamps(path: &Path, opts: &SampleOptions) -> Result<()> {
    let mut out = TIME_COLUMNS.join("\t");
    out.push('\n');
    let blocks = (opts.frames as u64 * 100 / opts.sample_rate.max(1) as u64).max(1);
    for i in 0..blocks {
        let t = start_time() + Duration::milliseconds(10 * i as i64);
        push_time(&mut out, &t);
        out.push('\n');
    }
    write_text(path, &out)
}

fn write_positions(path: &Path, mics: usize, offset: f64, opts: &SampleOptions) -> Result<()> {
    let mut out = TIME_COLUMNS.join("\t");
    out.push_str("\tx\ty\tz\tref_vec_x\tref_vec_y\tref_vec_z");
    for r in 1..=3 {
        for c in 1..=3 {
            out.push_str(&format!("\trotation_{r}{c}"));
        }
    }
    for m in 1..=mics {
        out.push_str(&format!("\tmic{m}_x\tmic{m}_y\tmic{m}_z"));
    }
    out.push('\n');

    for row in 0..opts.rows {
        let t = start_time() + Duration::milliseconds(40 * row as i64);
        let phase = row as f64 * 0.05 + offset;
        let (x, y, z) = (phase.cos() + offset, phase.sin(), 1.5);
        push_time(&mut out, &t);
        out.push_str(&format!("\t{x:.6}\t{y:.6}\t{z:.6}\t1\t0\t0\t1\t0\t0\t0\t1\t0\t0\t0\t1"));
        for m in 0..mics {
            let angle = 2.0 * std::f64::consts::PI * m as f64 / mics as f64;
            out.push_str(&format!(
                "\t{:.6}\t{:.6}\t{z:.6}",
                x + 0.05 * angle.cos(),
                y + 0.05 * angle.sin()
            ));
        }
        out.push('\n');
    }
    write_text(path, &out)
}

fn write_required_time(path: &Path, opts: &SampleOptions) -> Result<()> {
    let mut out = TIME_COLUMNS.join("\t");
    out.push_str("\tvalid_flag\n");
    for row in 0..opts.rows {
        let t = start_time() + Duration::milliseconds(40 * row as i64);
        push_time(&mut out, &t);
        out.push_str(&format!("\t{}\n", u8::from(row % 10 != 9)));
    }
    write_text(path, &out)
}

/// Write a LOCATA-style folder into `dir`, which must exist.
pub fn write_sample_dataset(dir: &Path, opts: &SampleOptions) -> Result<()> {
    let mut noise = Noise(opts.seed);

    write_required_time(&dir.join("required_time.txt"), opts)?;

    for (i, (name, mics)) in opts.arrays.iter().enumerate() {
        write_wav(&dir.join(format!("audio_array_{name}.wav")), *mics, opts, &mut noise)?;
        write_audio_timestamps(&dir.join(format!("audio_array_timestamps_{name}.txt")), opts)?;
        write_positions(
            &dir.join(format!("position_array_{name}.txt")),
            *mics,
            i as f64,
            opts,
        )?;
    }

    if !opts.eval {
        for (i, name) in opts.sources.iter().enumerate() {
            write_wav(&dir.join(format!("audio_source_{name}.wav")), 1, opts, &mut noise)?;
            write_audio_timestamps(&dir.join(format!("audio_source_timestamps_{name}.txt")), opts)?;
            write_positions(
                &dir.join(format!("position_source_{name}.txt")),
                0,
                0.5 + i as f64,
                opts,
            )?;
        }
    }
    Ok(())
}

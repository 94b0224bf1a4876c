// Folder-level loading tests: dev/eval branching, microphone tensors,
// required-time parsing and the fatal empty-folder exit.

use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{NaiveDate, Timelike};
use locata_loader::data::sample::{SampleOptions, write_sample_dataset};
use locata_loader::{LoadError, load_locata_data};
use tempfile::tempdir;

const TIME_HEADER: &str = "year\tmonth\tday\thour\tminute\tsecond";

fn write_wav(path: &Path, channels: u16, frames: usize) {
    write_wav_at(path, channels, frames, 16000);
}

fn write_wav_at(path: &Path, channels: u16, frames: usize, sample_rate: u32) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..frames * channels as usize {
        writer.write_sample((i % 100) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

fn write_required_time(dir: &Path) {
    std::fs::write(
        dir.join("required_time.txt"),
        format!("{TIME_HEADER}\tvalid_flag\n2020\t1\t1\t0\t0\t0\ttrue\n2020\t1\t1\t0\t0\t1\tfalse\n"),
    )
    .unwrap();
}

fn write_audio_timestamps(dir: &Path, role: &str, name: &str) {
    std::fs::write(
        dir.join(format!("{role}_timestamps_{name}.txt")),
        format!("{TIME_HEADER}\n2020\t1\t1\t0\t0\t0\n2020\t1\t1\t0\t0\t0.5\n"),
    )
    .unwrap();
}

fn position_header(mics: usize) -> String {
    let mut header = format!(
        "{TIME_HEADER}\tx\ty\tz\tref_vec_x\tref_vec_y\tref_vec_z\
         \trotation_11\trotation_12\trotation_13\trotation_21\trotation_22\trotation_23\
         \trotation_31\trotation_32\trotation_33"
    );
    for m in 1..=mics {
        header.push_str(&format!("\tmic{m}_x\tmic{m}_y\tmic{m}_z"));
    }
    header
}

fn write_position(dir: &Path, file: &str, mics: usize, rows: usize) -> PathBuf {
    let mut content = position_header(mics);
    content.push('\n');
    for r in 0..rows {
        content.push_str(&format!(
            "2020\t1\t1\t0\t0\t{r}\t{r}.5\t1\t2\t0.1\t0.2\t0.3\t1\t0\t0\t0\t1\t0\t0\t0\t1"
        ));
        for m in 1..=mics {
            content.push_str(&format!("\t{m}{r}.1\t{m}{r}.2\t{m}{r}.3"));
        }
        content.push('\n');
    }
    let path = dir.join(file);
    std::fs::write(&path, content).unwrap();
    path
}

fn write_array(dir: &Path, name: &str, channels: u16, frames: usize, mics: usize) {
    write_wav(&dir.join(format!("audio_array_{name}.wav")), channels, frames);
    write_audio_timestamps(dir, "audio_array", name);
    write_position(dir, &format!("position_array_{name}.txt"), mics, 3);
}

#[test]
fn array_audio_is_keyed_by_name_with_full_length() {
    let dir = tempdir().unwrap();
    write_required_time(dir.path());
    write_array(dir.path(), "dicit", 2, 1000, 2);
    write_array(dir.path(), "benchmark2", 4, 750, 4);
    write_array(dir.path(), "dummy", 1, 10, 0);

    let ds = load_locata_data(dir.path(), false).unwrap();

    let names: Vec<&str> = ds.audio_array.data.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["benchmark2", "dicit", "dummy"]);
    assert_eq!(ds.audio_array.data["dicit"].shape(), &[1000, 2]);
    assert_eq!(ds.audio_array.data["benchmark2"].shape(), &[750, 4]);
    assert_eq!(ds.audio_array.data["dummy"].nrows(), 10);
    assert_eq!(ds.audio_array.sample_rate, Some(16000));

    let time = ds.audio_array.time.as_ref().unwrap();
    assert_eq!(time.shape(), &[6, 2]);
    assert_eq!(time[[5, 1]], 0.5);
}

#[test]
fn two_mics_stack_into_third_axis() {
    let dir = tempdir().unwrap();
    write_required_time(dir.path());
    write_array(dir.path(), "dicit", 2, 100, 2);

    let ds = load_locata_data(dir.path(), false).unwrap();
    let rec = &ds.position_array.data["dicit"];
    let mic = rec.mic.as_ref().unwrap();

    assert_eq!(mic.shape(), &[3, 3, 2]);
    // mic1 row 2: 12.1, 12.2, 12.3; mic2 row 0: 20.1, 20.2, 20.3
    assert_eq!(mic[[0, 2, 0]], 12.1);
    assert_eq!(mic[[2, 2, 0]], 12.3);
    assert_eq!(mic[[0, 0, 1]], 20.1);
    assert_eq!(mic[[1, 0, 1]], 20.2);

    assert_eq!(rec.position.shape(), &[3, 3]);
    assert_eq!(rec.position[[0, 1]], 1.5);
    assert_eq!(rec.ref_vec.row(2).to_vec(), vec![0.1, 0.1, 0.1]);
}

#[test]
fn table_without_mic_columns_has_no_mic_field() {
    let dir = tempdir().unwrap();
    write_required_time(dir.path());
    write_array(dir.path(), "dummy", 1, 100, 0);

    let ds = load_locata_data(dir.path(), false).unwrap();
    assert!(ds.position_array.data["dummy"].mic.is_none());
}

#[test]
fn eval_mode_withholds_sources() {
    let dir = tempdir().unwrap();
    write_required_time(dir.path());
    write_array(dir.path(), "eigenmike", 4, 200, 4);

    let ds = load_locata_data(dir.path(), false).unwrap();
    assert!(ds.audio_source.is_none());
    assert!(ds.position_source.is_none());
    assert_eq!(ds.position_array.data.len(), 1);
}

#[test]
fn eval_mode_ignores_source_files_present() {
    let dir = tempdir().unwrap();
    let opts = SampleOptions {
        arrays: vec![("dicit".to_string(), 2)],
        frames: 480,
        rows: 5,
        ..Default::default()
    };
    write_sample_dataset(dir.path(), &opts).unwrap();

    let ds = load_locata_data(dir.path(), false).unwrap();
    assert!(ds.audio_source.is_none());
    assert!(ds.position_source.is_none());
    assert_eq!(ds.audio_array.len(), 1);
}

#[test]
fn dev_mode_loads_sources_and_counts_them() {
    let dir = tempdir().unwrap();
    let opts = SampleOptions {
        arrays: vec![("dicit".to_string(), 2)],
        sources: vec!["talker1".to_string(), "talker2".to_string()],
        frames: 480,
        rows: 5,
        ..Default::default()
    };
    write_sample_dataset(dir.path(), &opts).unwrap();

    let ds = load_locata_data(dir.path(), true).unwrap();
    let sources = ds.audio_source.as_ref().unwrap();
    assert_eq!(sources.source_count, 2);
    assert_eq!(sources.audio.data["talker2"].shape(), &[480, 1]);

    let positions = ds.position_source.as_ref().unwrap();
    assert!(positions.data.contains_key("talker1"));
    assert!(positions.data["talker1"].mic.is_none());
    assert_eq!(positions.time.as_ref().unwrap().len(), 5);
}

#[test]
fn dev_mode_with_only_source_audio_is_accepted() {
    let dir = tempdir().unwrap();
    write_required_time(dir.path());
    write_wav(&dir.path().join("audio_source_talker1.wav"), 1, 50);
    write_audio_timestamps(dir.path(), "audio_source", "talker1");

    let ds = load_locata_data(dir.path(), true).unwrap();
    assert!(ds.audio_array.is_empty());
    assert_eq!(ds.audio_array.sample_rate, None);
    assert_eq!(ds.audio_source.unwrap().source_count, 1);
}

#[test]
fn required_time_flags_follow_rows() {
    let dir = tempdir().unwrap();
    write_required_time(dir.path());
    write_array(dir.path(), "dummy", 1, 10, 0);

    let ds = load_locata_data(dir.path(), false).unwrap();
    let rt = &ds.required_time;
    assert_eq!(rt.time.len(), 2);
    assert_eq!(rt.valid_flag, vec![true, false]);
    assert_eq!(rt.time[0].date(), NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
    assert_eq!(rt.time[1].second(), 1);
}

#[test]
fn folder_without_audio_is_fatal() {
    let dir = tempdir().unwrap();
    write_required_time(dir.path());

    let err = load_locata_data(dir.path(), true).unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(err, LoadError::UnexpectedAudio { .. }));
}

#[test]
fn eval_folder_with_only_source_audio_is_fatal() {
    let dir = tempdir().unwrap();
    write_required_time(dir.path());
    write_wav(&dir.path().join("audio_source_talker1.wav"), 1, 50);
    write_audio_timestamps(dir.path(), "audio_source", "talker1");

    let err = load_locata_data(dir.path(), false).unwrap_err();
    assert!(err.is_fatal());
}

#[test]
fn missing_timestamp_file_propagates() {
    let dir = tempdir().unwrap();
    write_required_time(dir.path());
    write_wav(&dir.path().join("audio_array_dicit.wav"), 1, 10);

    let err = load_locata_data(dir.path(), false).unwrap_err();
    assert!(!err.is_fatal());
    assert!(matches!(err, LoadError::MissingTimestamps(_)));
}

#[test]
fn cli_exits_nonzero_and_logs_on_empty_folder() {
    let dir = tempdir().unwrap();
    write_required_time(dir.path());

    let output = Command::new(env!("CARGO_BIN_EXE_locata-loader"))
        .arg(dir.path())
        .env("RUST_LOG", "error")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unexpected audio file in folder"), "stderr: {stderr}");
}

#[test]
fn cli_prints_summary() {
    let dir = tempdir().unwrap();
    write_required_time(dir.path());
    write_array(dir.path(), "dicit", 2, 100, 2);

    let output = Command::new(env!("CARGO_BIN_EXE_locata-loader"))
        .arg(dir.path())
        .arg("--eval")
        .output()
        .unwrap();

    assert!(output.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["audio_array"][0]["name"], "dicit");
    assert_eq!(summary["audio_array"][0]["frames"], 100);
    assert_eq!(summary["position_array"][0]["mics"], 2);
    assert!(summary["audio_source"].is_null());
    assert_eq!(summary["valid_time"], 1);
}

#[test]
fn last_file_in_name_order_sets_shared_fields() {
    let dir = tempdir().unwrap();
    write_required_time(dir.path());
    // written out of order on purpose; loading follows sorted file names
    write_wav_at(&dir.path().join("audio_array_b.wav"), 1, 480, 48000);
    write_wav_at(&dir.path().join("audio_array_a.wav"), 1, 160, 16000);
    std::fs::write(
        dir.path().join("audio_array_timestamps_a.txt"),
        format!("{TIME_HEADER}\n2020\t1\t1\t0\t0\t0\n"),
    )
    .unwrap();
    std::fs::write(
        dir.path().join("audio_array_timestamps_b.txt"),
        format!("{TIME_HEADER}\n2021\t2\t3\t4\t5\t6\n2021\t2\t3\t4\t5\t7\n"),
    )
    .unwrap();
    write_position(dir.path(), "position_array_b.txt", 0, 2);
    write_position(dir.path(), "position_array_a.txt", 0, 4);

    let ds = load_locata_data(dir.path(), false).unwrap();

    assert_eq!(ds.audio_array.sample_rate, Some(48000));
    let time = ds.audio_array.time.as_ref().unwrap();
    assert_eq!(time.shape(), &[6, 2]);
    assert_eq!(time[[0, 0]], 2021.0);
    assert_eq!(time[[5, 1]], 7.0);

    let positions = &ds.position_array;
    assert_eq!(positions.data["a"].time.len(), 4);
    assert_eq!(positions.data["b"].time.len(), 2);
    assert_eq!(positions.time.as_ref().unwrap(), &positions.data["b"].time);
}

#[test]
fn cli_help_succeeds() {
    let output = Command::new(env!("CARGO_BIN_EXE_locata-loader"))
        .arg("--help")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--eval"), "stdout: {stdout}");
}

#[test]
fn cli_rejects_unknown_flag() {
    let dir = tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_locata-loader"))
        .arg(dir.path())
        .arg("--evl")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn generator_rejects_unknown_flag_without_writing() {
    let dir = tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_generate_sample"))
        .current_dir(dir.path())
        .arg("--evl")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(!dir.path().join("--evl").exists());
    assert!(!dir.path().join("sample_locata").exists());
}

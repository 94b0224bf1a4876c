//! Loader for LOCATA recording folders: microphone-array and source audio,
//! position tracks and required-time tables.

pub mod data;

pub use data::error::{LoadError, Result};
pub use data::loader::{get_locata_truth, load_locata_data};
pub use data::model::{
    AudioBatch, DatasetSummary, LocataDataset, NamedCollection, PositionBatch, PositionRecord,
    RequiredTime, SourceAudio,
};

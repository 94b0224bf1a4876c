//! Data layer: core types, table and audio reading, dataset assembly.
//!
//! Architecture:
//! ```text
//!   recording folder
//!        │
//!        ▼
//!   ┌──────────┐   required_time.txt
//!   │  loader   │── *.wav ──────────▶ audio    (+ timestamps_<name>.txt)
//!   └──────────┘── *.txt ──────────▶ position
//!        │                 both read through `table`
//!        ▼
//!   ┌──────────────┐
//!   │ LocataDataset │  arrays, sources, positions, required time
//!   └──────────────┘
//! ```

pub mod audio;
pub mod error;
pub mod loader;
pub mod model;
pub mod position;
pub mod sample;
pub mod table;

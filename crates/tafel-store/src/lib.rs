//! File-backed repositories.
//!
//! Each table is one pretty-printed JSON document, `<data_dir>/<id>.json`.
//! Saved templates live the same way under `<data_dir>/templates/`. The
//! directories are created on first write.

mod json_dir;
pub mod tables;
pub mod templates;

pub use tables::FileTableRepository;
pub use templates::FileTemplateRepository;

//! Use cases for Tafel random tables.
//!
//! The [`TemplateResolver`] is the heart of the crate: it expands every
//! `{{...}}` reference in a template by rolling on the referenced table,
//! recursing into rolled content that is itself a template, with cycle
//! detection and a hard depth ceiling. [`RollService`] and
//! [`TemplateService`] wrap it for the two top-level entry points, rolling on
//! a table and evaluating a saved template. Storage is reached only through
//! the [`TableRepository`] and [`TemplateRepository`] ports.

pub mod error;
pub mod memory;
pub mod ports;
pub mod resolver;
pub mod roll;
pub mod tables;
pub mod templates;

pub use error::{EngineError, EngineResult, RepoError};
pub use memory::{InMemoryTableRepository, InMemoryTemplateRepository};
pub use ports::{TableFilter, TableRepository, TemplateFilter, TemplateRepository};
pub use resolver::{TemplateResolver, Visited};
pub use roll::RollService;
pub use tables::{TableService, TableUpdate};
pub use templates::{TemplateEvaluation, TemplateService, TemplateUpdate};

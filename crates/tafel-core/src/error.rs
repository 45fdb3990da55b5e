/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Validation failures raised while building or mutating domain values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    /// A table was constructed without an identifier.
    #[error("table ID is required")]
    MissingTableId,

    /// A table was constructed without a name.
    #[error("table name is required")]
    MissingTableName,

    /// A saved template was constructed without an identifier.
    #[error("template ID is required")]
    MissingTemplateId,

    /// A saved template was constructed without a name.
    #[error("template name is required")]
    MissingTemplateName,

    /// Entry weights must be strictly positive.
    #[error("weight must be greater than zero, got {0}")]
    InvalidWeight(f64),

    /// A range whose lower bound exceeds its upper bound.
    #[error("minimum value {min} cannot be greater than maximum value {max}")]
    InvalidRange {
        /// Requested lower bound.
        min: i64,
        /// Requested upper bound.
        max: i64,
    },

    /// A range string that is not of the form `min-max`.
    #[error("invalid range format \"{0}\", expected \"min-max\"")]
    RangeFormat(String),

    /// A reference asked for fewer than one roll.
    #[error("roll count must be at least 1")]
    InvalidRollCount,

    /// An entry with the same ID is already present in the table.
    #[error("entry with ID {0} already exists")]
    DuplicateEntry(String),

    /// The entry ID is not present in the table.
    #[error("entry with ID {0} does not exist")]
    EntryNotFound(String),

    /// Rolling requires at least one entry.
    #[error("cannot roll on an empty table: {0}")]
    EmptyTable(String),
}

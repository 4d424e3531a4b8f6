// ⚠️ Catalog errors
//
// Only usage and structural problems are errors. A single entity failing its
// business rules is not: that is reported through `Validate::errors()`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    // ========================================================================
    // USAGE (caller misuse, nothing mutated)
    // ========================================================================
    #[error("incorrect level {0}: level must be non-negative")]
    InvalidLevel(i64),

    #[error("missing required argument '{0}'")]
    MissingArgument(&'static str),

    #[error("unknown currency '{0}'")]
    UnknownCurrency(String),

    // ========================================================================
    // STRUCTURAL (category tree cannot be ordered)
    // ========================================================================
    #[error("category '{id}' is its own ancestor")]
    CategoryCycle { id: String },

    #[error("category '{id}' references missing parent '{parent_id}'")]
    DanglingParent { id: String, parent_id: String },

    // ========================================================================
    // CONVERSION
    // ========================================================================
    #[error("currency '{id}' has unusable rate '{rate}'")]
    InvalidRate { id: String, rate: String },
}

impl CatalogError {
    /// Structural errors come from a malformed category tree.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            CatalogError::CategoryCycle { .. } | CatalogError::DanglingParent { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;

use super::FlatRow;

/// The terminal result of processing one identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The user was fetched; one row per repository, or a single placeholder row.
    Rows { identifier: String, rows: Vec<FlatRow> },

    /// The user could not be processed.
    Failure { identifier: String, reason: String },
}

impl FetchOutcome {
    #[must_use]
    pub fn failure(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failure {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }

    /// The identifier this outcome belongs to.
    #[must_use]
    pub fn identifier(&self) -> &str {
        match self {
            Self::Rows { identifier, .. } | Self::Failure { identifier, .. } => identifier,
        }
    }

    /// Returns `true` if the outcome carries rows.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Rows { .. })
    }
}

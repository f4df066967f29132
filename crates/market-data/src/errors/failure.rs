use serde::Serialize;

/// Classification of a market-type failure.
///
/// Used by the batch coordinator to report why a category was skipped.
///
/// # Behavior Summary
///
/// | Kind | Typical cause | Batch reaction |
/// |------|---------------|----------------|
/// | `Fetch` | transport error, non-200 status, payload shape mismatch | skip category |
/// | `Configuration` | unknown market type, adapter/source mismatch | skip category |
/// | `Normalize` | required raw column missing | skip category |
/// | `Resource` | temp file or output file could not be written | skip category |
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The remote source could not be reached or returned an unusable payload.
    Fetch,

    /// The caller asked for something the catalog does not describe.
    ///
    /// Never silently mis-mapped: the category fails fast.
    Configuration,

    /// The payload was well-formed but could not be mapped to the canonical schema.
    Normalize,

    /// Local file system failure (temporary download file, output file).
    Resource,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Configuration => "configuration",
            Self::Normalize => "normalize",
            Self::Resource => "resource",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

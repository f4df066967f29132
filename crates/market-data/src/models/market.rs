use serde::{Deserialize, Serialize};

/// Exchange data source.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketSource {
    /// Shanghai Stock Exchange (JSONP quote endpoint)
    Sse,
    /// Shenzhen Stock Exchange (xlsx report download)
    Szse,
}

impl MarketSource {
    pub const ALL: [MarketSource; 2] = [MarketSource::Sse, MarketSource::Szse];

    /// Stable lowercase identifier, used in file names and error messages.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Sse => "sse",
            Self::Szse => "szse",
        }
    }

    /// Fixed width security codes are left-padded to.
    ///
    /// `None` means codes are kept as received.
    pub fn code_width(&self) -> Option<usize> {
        match self {
            Self::Sse => Some(6),
            Self::Szse => None,
        }
    }
}

impl std::fmt::Display for MarketSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// One tradable-instrument category within one exchange source.
///
/// Defined once in the embedded catalog and never mutated at runtime.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketTypeDescriptor {
    /// Category key, e.g. "equity", "fund", "index"
    pub key: String,

    /// Localized category name as the exchange labels it
    pub display_name: String,

    /// Opaque identifier passed to the remote endpoint (URL path or report tab)
    pub source_parameter: String,

    /// Raw field holding the security code
    pub code_field: String,

    /// Raw field holding the instrument display name
    pub name_field: String,
}

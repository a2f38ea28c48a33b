//! Field extraction from free-text check lines.
//!
//! The local keyword extractor and the remote extractors all produce a
//! [`ParsedInput`]; the caller decides which one runs.

mod keywords;
pub mod numbers;
pub mod patterns;
pub mod payload;
#[cfg(feature = "remote")]
mod backend;
#[cfg(feature = "remote")]
mod llm;
#[cfg(all(test, feature = "remote"))]
mod stub;

pub use keywords::{guess_item, parse_input};
pub use payload::{ParseResponse, RawPayload};
#[cfg(feature = "remote")]
pub use backend::BackendExtractor;
#[cfg(feature = "remote")]
pub use llm::{LlmExtractor, parse_json_response};

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;
use crate::models::config::OptiConfig;
use crate::models::pricing::ParsedInput;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for text-to-[`ParsedInput`] extractors.
pub trait InputExtractor {
    /// Short name used in logs and output.
    fn name(&self) -> &'static str;

    /// Extract the fields of one check line.
    fn extract(&self, text: &str) -> impl Future<Output = Result<ParsedInput>> + Send;
}

/// Which extractor to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractorKind {
    /// Local keyword rules.
    #[default]
    Local,
    /// Language model via chat completions.
    Llm,
    /// The parse proxy's HTTP endpoint.
    Backend,
}

impl fmt::Display for ExtractorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractorKind::Local => write!(f, "local"),
            ExtractorKind::Llm => write!(f, "llm"),
            ExtractorKind::Backend => write!(f, "backend"),
        }
    }
}

impl FromStr for ExtractorKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(ExtractorKind::Local),
            "llm" | "ai" => Ok(ExtractorKind::Llm),
            "backend" | "proxy" => Ok(ExtractorKind::Backend),
            other => Err(format!("unknown extractor: {other}")),
        }
    }
}

/// Keyword-rule extractor. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalExtractor;

impl LocalExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl InputExtractor for LocalExtractor {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn extract(&self, text: &str) -> Result<ParsedInput> {
        Ok(parse_input(text))
    }
}

/// Runtime-selected extractor.
pub enum Extractor {
    Local(LocalExtractor),
    #[cfg(feature = "remote")]
    Llm(LlmExtractor),
    #[cfg(feature = "remote")]
    Backend(BackendExtractor),
}

impl Extractor {
    /// Build the extractor of the given kind from configuration.
    pub fn from_config(kind: ExtractorKind, config: &OptiConfig) -> Result<Self> {
        match kind {
            ExtractorKind::Local => Ok(Extractor::Local(LocalExtractor::new())),
            #[cfg(feature = "remote")]
            ExtractorKind::Llm => Ok(Extractor::Llm(LlmExtractor::new(config.llm.clone())?)),
            #[cfg(feature = "remote")]
            ExtractorKind::Backend => {
                Ok(Extractor::Backend(BackendExtractor::new(config.remote.clone())?))
            }
            #[cfg(not(feature = "remote"))]
            other => {
                let _ = config;
                Err(ExtractionError::Unavailable(other.to_string()))
            }
        }
    }
}

impl InputExtractor for Extractor {
    fn name(&self) -> &'static str {
        match self {
            Extractor::Local(e) => e.name(),
            #[cfg(feature = "remote")]
            Extractor::Llm(e) => e.name(),
            #[cfg(feature = "remote")]
            Extractor::Backend(e) => e.name(),
        }
    }

    async fn extract(&self, text: &str) -> Result<ParsedInput> {
        match self {
            Extractor::Local(e) => e.extract(text).await,
            #[cfg(feature = "remote")]
            Extractor::Llm(e) => e.extract(text).await,
            #[cfg(feature = "remote")]
            Extractor::Backend(e) => e.extract(text).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extractor_kind_parsing() {
        assert_eq!("local".parse::<ExtractorKind>(), Ok(ExtractorKind::Local));
        assert_eq!("LLM".parse::<ExtractorKind>(), Ok(ExtractorKind::Llm));
        assert_eq!("proxy".parse::<ExtractorKind>(), Ok(ExtractorKind::Backend));
        assert!("regex".parse::<ExtractorKind>().is_err());
        assert_eq!(ExtractorKind::Backend.to_string(), "backend");
    }

    #[tokio::test]
    async fn test_local_extractor_matches_parse_input() {
        let text = "Monster EK 0,89 VK 1,29";
        let extractor = Extractor::from_config(ExtractorKind::Local, &OptiConfig::default()).unwrap();
        assert_eq!(extractor.name(), "local");
        assert_eq!(extractor.extract(text).await.unwrap(), parse_input(text));
    }
}

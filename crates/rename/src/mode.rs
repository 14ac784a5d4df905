use crate::error::{Error, ErrorKind};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// The naming algorithm applied to a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RuleMode {
    /// Marketplace image slots: `MAIN`, `PT01`…, `SWITCH` (requires a prefix).
    Amazon,
    /// `prefix` + two-digit position + `suffix`.
    #[default]
    PrefixIndex,
    /// Names taken from a comma-separated list.
    CustomSequence,
    /// Placeholder names reserved for generated descriptions.
    AiGenerated,
}
impl RuleMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Amazon => "amazon",
            Self::PrefixIndex => "prefix-index",
            Self::CustomSequence => "custom-sequence",
            Self::AiGenerated => "ai-generated",
        }
    }

    pub fn all() -> [Self; 4] {
        [Self::Amazon, Self::PrefixIndex, Self::CustomSequence, Self::AiGenerated]
    }
}
impl FromStr for RuleMode {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let sanitized: String =
            s.chars().filter(|c| c.is_alphanumeric()).flat_map(char::to_lowercase).collect();
        Ok(match sanitized.as_str() {
            "amazon" => Self::Amazon,
            "prefixindex" | "prefix" | "index" => Self::PrefixIndex,
            "customsequence" | "sequence" | "custom" => Self::CustomSequence,
            "aigenerated" | "ai" => Self::AiGenerated,
            _ => exn::bail!(ErrorKind::UnknownMode(s.to_string())),
        })
    }
}
impl Display for RuleMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

use crate::RuleMode;
use crate::error::{ErrorKind, Result};

/// Everything a rename rule reads besides the selection itself.
///
/// Fields a mode doesn't use are carried along untouched so a derived item
/// records exactly what was in effect when it was created.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleParameters {
    pub mode: RuleMode,
    pub prefix: String,
    pub suffix: String,
    /// Comma-separated names used by [`RuleMode::CustomSequence`].
    pub sequence: String,
}
impl RuleParameters {
    pub fn new(mode: RuleMode) -> Self {
        Self { mode, ..Default::default() }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn with_sequence(mut self, sequence: impl Into<String>) -> Self {
        self.sequence = sequence.into();
        self
    }

    /// Check the parameters the mode requires.
    ///
    /// | Mode                         | Requires                |
    /// |------------------------------|-------------------------|
    /// | [`RuleMode::Amazon`]         | non-blank `prefix`      |
    /// | [`RuleMode::CustomSequence`] | non-blank `sequence`    |
    /// | others                       | nothing                 |
    pub fn validate(&self) -> Result<()> {
        match self.mode {
            RuleMode::Amazon if self.prefix.trim().is_empty() => {
                exn::bail!(ErrorKind::InvalidModeParameters { mode: self.mode.as_str(), field: "prefix" })
            },
            RuleMode::CustomSequence if self.sequence.trim().is_empty() => {
                exn::bail!(ErrorKind::InvalidModeParameters { mode: self.mode.as_str(), field: "sequence" })
            },
            _ => Ok(()),
        }
    }

    /// Sequence entries: split on commas, trimmed, empties dropped.
    pub fn sequence_tokens(&self) -> Vec<&str> {
        self.sequence.split(',').map(str::trim).filter(|token| !token.is_empty()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(RuleParameters::new(RuleMode::Amazon).with_prefix("SKU1"), true)]
    #[case(RuleParameters::new(RuleMode::Amazon), false)]
    #[case(RuleParameters::new(RuleMode::Amazon).with_prefix("   "), false)]
    #[case(RuleParameters::new(RuleMode::PrefixIndex), true)]
    #[case(RuleParameters::new(RuleMode::CustomSequence).with_sequence("A,B"), true)]
    #[case(RuleParameters::new(RuleMode::CustomSequence).with_sequence(" \t"), false)]
    #[case(RuleParameters::new(RuleMode::AiGenerated), true)]
    fn test_validate(#[case] params: RuleParameters, #[case] valid: bool) {
        assert_eq!(params.validate().is_ok(), valid);
    }

    #[test]
    fn test_validate_names_missing_field() {
        let err = RuleParameters::new(RuleMode::CustomSequence).validate().unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidModeParameters { mode: "custom-sequence", field: "sequence" });
    }

    #[rstest]
    #[case("A,B", &["A", "B"])]
    #[case(" front , ,back,, ", &["front", "back"])]
    #[case(",,", &[])]
    fn test_sequence_tokens(#[case] sequence: &str, #[case] expected: &[&str]) {
        let params = RuleParameters::new(RuleMode::CustomSequence).with_sequence(sequence);
        assert_eq!(params.sequence_tokens(), expected);
    }
}

use crate::derived::{DerivedItem, GroupKey};
use crate::error::{ErrorKind, Result};
use crate::extension::extension;
use crate::{RuleMode, RuleParameters};
use orderly_board::{Item, ItemId};
use time::UtcDateTime;
use tracing::instrument;

/// A rename rule whose parameters have been validated.
///
/// Construction is where invalid parameters are refused, so once a
/// [`Renamer`] exists, applying it cannot fail.
///
/// ```
/// use orderly_board::Item;
/// use orderly_rename::{Renamer, RuleMode, RuleParameters};
///
/// let items = [Item::new("1", "a.jpg", 0, "image/jpeg"), Item::new("2", "b.jpg", 0, "image/jpeg")];
/// let renamer = Renamer::new(RuleParameters::new(RuleMode::PrefixIndex).with_prefix("IMG-")).unwrap();
/// let names: Vec<_> = renamer.apply(&items).into_iter().map(|d| d.derived_name).collect();
/// assert_eq!(names, ["IMG-01.jpg", "IMG-02.jpg"]);
///
/// assert!(Renamer::new(RuleParameters::new(RuleMode::Amazon)).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Renamer {
    parameters: RuleParameters,
}
impl Renamer {
    pub fn new(parameters: RuleParameters) -> Result<Self> {
        parameters.validate()?;
        Ok(Self { parameters })
    }

    pub fn parameters(&self) -> &RuleParameters {
        &self.parameters
    }

    /// Rename the selection (given in selection order) as of now.
    pub fn apply<'a>(&self, selected: impl IntoIterator<Item = &'a Item>) -> Vec<DerivedItem> {
        apply(selected, &self.parameters)
    }

    pub fn apply_at<'a>(&self, selected: impl IntoIterator<Item = &'a Item>, created_at: UtcDateTime) -> Vec<DerivedItem> {
        apply_at(selected, &self.parameters, created_at)
    }

    /// Like [`apply`](Self::apply), but refuses an empty selection so the
    /// caller can disable the action instead of producing nothing.
    pub fn apply_non_empty<'a>(&self, selected: impl IntoIterator<Item = &'a Item>) -> Result<Vec<DerivedItem>> {
        let derived = self.apply(selected);
        if derived.is_empty() {
            exn::bail!(ErrorKind::EmptySelection);
        }
        Ok(derived)
    }
}

/// Derive new names for `selected`, stamped with the current time.
///
/// Parameters are not validated here; see [`RuleParameters::validate`] or use
/// a [`Renamer`].
pub fn apply<'a>(selected: impl IntoIterator<Item = &'a Item>, parameters: &RuleParameters) -> Vec<DerivedItem> {
    apply_at(selected, parameters, UtcDateTime::now())
}

/// Derive new names for `selected` with an explicit creation time. Every
/// resulting item shares the same [`GroupKey`] and `created_at`.
#[instrument(skip_all, fields(mode = %parameters.mode))]
pub fn apply_at<'a>(
    selected: impl IntoIterator<Item = &'a Item>,
    parameters: &RuleParameters,
    created_at: UtcDateTime,
) -> Vec<DerivedItem> {
    let selected: Vec<&Item> = selected.into_iter().collect();
    if selected.is_empty() {
        return Vec::new();
    }
    let group_key = GroupKey::new(&parameters.prefix, created_at);
    let total = selected.len();
    let derived: Vec<DerivedItem> = selected
        .into_iter()
        .enumerate()
        .map(|(index, source)| {
            let derived_name = file_name(parameters, index, total, extension(source.name()));
            let mut item = source.clone();
            item.id = ItemId::from(format!("{group_key}/{:02}", index + 1));
            item.display_name = Some(derived_name.clone());
            DerivedItem {
                item,
                derived_name,
                source_id: source.id.clone(),
                parameters: parameters.clone(),
                group_key: group_key.clone(),
                created_at,
            }
        })
        .collect();
    tracing::debug!(%group_key, count = derived.len(), "Derived new names");
    derived
}

/// Full output filename for the item at `index` of `total` selected items.
pub fn file_name(parameters: &RuleParameters, index: usize, total: usize, ext: &str) -> String {
    match parameters.mode {
        RuleMode::Amazon => format!("{}.{}{ext}", parameters.prefix, amazon_type(index, total)),
        RuleMode::PrefixIndex => format!("{}{:02}{}{ext}", parameters.prefix, index + 1, parameters.suffix),
        RuleMode::CustomSequence => format!("{}{ext}", sequence_name(&parameters.sequence_tokens(), index)),
        RuleMode::AiGenerated => format!("AI-Generated-{:02}{ext}", index + 1),
    }
}

fn amazon_type(index: usize, total: usize) -> String {
    match index {
        0 => "MAIN".to_string(),
        i if total > 1 && i == total - 1 => "SWITCH".to_string(),
        i => format!("PT{i:02}"),
    }
}

/// Past the end of the list, the last entry is reused with the overflow
/// count appended as text: `["A", "B"]` continues `B1`, `B2`, …
// Literal concatenation only reads naturally when the last entry is numeric
// (`"1,2"` gives `21`, `22`). Kept as-is rather than guessing intent.
fn sequence_name(tokens: &[&str], index: usize) -> String {
    match tokens {
        [] => (index + 1).to_string(),
        tokens if index < tokens.len() => tokens[index].to_string(),
        [.., last] => format!("{last}{}", index - tokens.len() + 1),
    }
}

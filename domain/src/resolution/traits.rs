//! Behavior a record must expose to participate in resolution.

use crate::core::Identifier;

/// A record that free text can resolve to.
///
/// `label` is one line of disambiguating context for a clarification list,
/// enough that a human can pick the right row from text alone. `summary` is
/// the fuller sentence shown in a confirmation prompt before a protected
/// mutation runs.
pub trait ResolvableRow {
    fn id(&self) -> &Identifier;

    fn label(&self) -> String;

    fn summary(&self) -> String {
        self.label()
    }
}

use crate::params::ParameterCollection;
use crate::types::{CommandKind, IsolationLevel};

/// The single live command of a provider: text, kind, transaction binding and parameters.
#[derive(Debug, Clone, Default)]
pub struct Command {
    text: String,
    kind: CommandKind,
    transaction: Option<IsolationLevel>,
    parameters: ParameterCollection,
    bind_by_name: bool,
}

impl Command {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind parameters by name instead of by position.
    #[must_use]
    pub fn with_bind_by_name(mut self, bind_by_name: bool) -> Self {
        self.bind_by_name = bind_by_name;
        self
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn set_text(&mut self, text: impl Into<String>, kind: CommandKind) {
        self.text = text.into();
        self.kind = kind;
    }

    #[must_use]
    pub fn bind_by_name(&self) -> bool {
        self.bind_by_name
    }

    /// Isolation level of the transaction this command is enlisted in, if any.
    #[must_use]
    pub fn transaction(&self) -> Option<IsolationLevel> {
        self.transaction
    }

    pub(crate) fn attach_transaction(&mut self, isolation: IsolationLevel) {
        self.transaction = Some(isolation);
    }

    pub(crate) fn detach_transaction(&mut self) {
        self.transaction = None;
    }

    #[must_use]
    pub fn parameters(&self) -> &ParameterCollection {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut ParameterCollection {
        &mut self.parameters
    }
}

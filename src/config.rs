/// Options for constructing a [`DbClientProvider`](crate::provider::DbClientProvider).
#[derive(Debug, Clone)]
pub struct ProviderOptions {
    pub connection_string: String,
    /// Open the connection while constructing the provider.
    pub open_on_create: bool,
}

impl ProviderOptions {
    #[must_use]
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            open_on_create: true,
        }
    }

    #[must_use]
    pub fn with_open_on_create(mut self, open_on_create: bool) -> Self {
        self.open_on_create = open_on_create;
        self
    }
}

/// Fluent builder for provider options.
#[derive(Debug, Clone)]
pub struct ProviderOptionsBuilder {
    opts: ProviderOptions,
}

impl ProviderOptionsBuilder {
    #[must_use]
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            opts: ProviderOptions::new(connection_string),
        }
    }

    #[must_use]
    pub fn open_on_create(mut self, open_on_create: bool) -> Self {
        self.opts.open_on_create = open_on_create;
        self
    }

    #[must_use]
    pub fn finish(self) -> ProviderOptions {
        self.opts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_eagerly_by_default() {
        let opts = ProviderOptions::new("a.db");
        assert!(opts.open_on_create);
        assert!(!opts.clone().with_open_on_create(false).open_on_create);
        let built = ProviderOptionsBuilder::new("a.db").open_on_create(false).finish();
        assert_eq!(built.connection_string, "a.db");
        assert!(!built.open_on_create);
    }
}

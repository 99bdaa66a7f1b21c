//! Parameterized action template: a name, some display metadata and one async body.

use std::{collections::HashMap, fmt, future::Future, sync::Arc};

use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;
use wallet_provider::WalletProvider;

use crate::{config::ConsoleConfig, error::RegistryError, runner::ActionScope};

pub type ActionFuture = BoxFuture<'static, anyhow::Result<String>>;
pub type ActionBody = Arc<dyn Fn(ActionContext) -> ActionFuture + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionGroup {
    Connection,
    Basics,
    State,
    Signing,
    Simulation,
    Transactions,
    Various,
    Prohibited,
}

impl ActionGroup {
    pub const ALL: [ActionGroup; 8] = [
        Self::Connection,
        Self::Basics,
        Self::State,
        Self::Signing,
        Self::Simulation,
        Self::Transactions,
        Self::Various,
        Self::Prohibited,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::Connection => "Connection",
            Self::Basics => "Basics",
            Self::State => "State",
            Self::Signing => "Signing",
            Self::Simulation => "Simulation",
            Self::Transactions => "Transactions",
            Self::Various => "Various",
            Self::Prohibited => "Prohibited Actions",
        }
    }
}

/// Everything an action body may touch.
#[derive(Clone)]
pub struct ActionContext {
    pub wallet: Arc<dyn WalletProvider>,
    pub config: Arc<ConsoleConfig>,
    pub scope: ActionScope,
    pub input: Option<String>,
}

impl ActionContext {
    pub fn log(&self, line: impl Into<String>) {
        self.scope.append(line);
    }
}

#[derive(Clone)]
pub struct ActionSpec {
    pub name: String,
    pub label: String,
    pub group: ActionGroup,
    pub requires_connection: bool,
    pub prohibited: bool,
    /// Placeholder for the free-text input the action reads, if any.
    pub input_hint: Option<String>,
    body: ActionBody,
}

impl ActionSpec {
    pub fn new<F, Fut>(
        name: impl Into<String>,
        label: impl Into<String>,
        group: ActionGroup,
        body: F,
    ) -> Self
    where
        F: Fn(ActionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<String>> + Send + 'static,
    {
        Self {
            name: name.into(),
            label: label.into(),
            group,
            requires_connection: false,
            prohibited: group == ActionGroup::Prohibited,
            input_hint: None,
            body: Arc::new(move |ctx| body(ctx).boxed()),
        }
    }

    pub fn requires_connection(mut self) -> Self {
        self.requires_connection = true;
        self
    }

    pub fn with_input(mut self, hint: impl Into<String>) -> Self {
        self.input_hint = Some(hint.into());
        self
    }

    pub fn invoke(&self, ctx: ActionContext) -> ActionFuture {
        (self.body)(ctx)
    }
}

impl fmt::Debug for ActionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionSpec")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("group", &self.group)
            .field("requires_connection", &self.requires_connection)
            .field("prohibited", &self.prohibited)
            .finish_non_exhaustive()
    }
}

/// Named actions in registration order.
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    specs: Vec<ActionSpec>,
    index: HashMap<String, usize>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, spec: ActionSpec) -> Result<(), RegistryError> {
        if self.index.contains_key(&spec.name) {
            return Err(RegistryError::DuplicateAction(spec.name));
        }
        self.index.insert(spec.name.clone(), self.specs.len());
        self.specs.push(spec);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ActionSpec> {
        self.index.get(name).map(|&i| &self.specs[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionSpec> {
        self.specs.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(|spec| spec.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

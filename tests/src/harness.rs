//! A controller wired to an in-memory property store.

use std::sync::Arc;

use keel_controller::handlers::{self, add_definition, AddHandler};
use keel_controller::{
    ControllerConfig, ModelController, OperationRegistryBuilder, OperationResponse, ProcessType,
    SharedHandler, TransactionResult,
};
use keel_core::{Operation, PathAddress, Value};
use keel_registry::{AttrDef, OperationDefinition};
use keel_sysprop::{
    self as sysprop, InMemoryPropertyStore, ProcessEnvironmentUpdater, PropertyCall,
    SystemPropertyConfig,
};

use crate::error::ScenarioResult;

/// A generic resource registered with the model-only ADD handler and any
/// custom operations.
struct CustomResource {
    pattern: PathAddress,
    attributes: Vec<AttrDef>,
    operations: Vec<(OperationDefinition, SharedHandler)>,
}

/// Builder for a [`Harness`].
pub struct HarnessBuilder {
    process_type: ProcessType,
    booting: bool,
    use_boottime: bool,
    updater: bool,
    protected: Vec<String>,
    preset: Vec<(String, String)>,
    resources: Vec<CustomResource>,
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self {
            process_type: ProcessType::Server,
            booting: false,
            use_boottime: true,
            updater: true,
            protected: Vec::new(),
            preset: Vec::new(),
            resources: Vec::new(),
        }
    }
}

impl HarnessBuilder {
    pub fn process_type(mut self, process_type: ProcessType) -> Self {
        self.process_type = process_type;
        self
    }

    /// Start the controller in boot mode.
    pub fn booting(mut self) -> Self {
        self.booting = true;
        self
    }

    pub fn boottime(mut self, use_boottime: bool) -> Self {
        self.use_boottime = use_boottime;
        self
    }

    /// Leave the process environment alone: properties become model-only.
    pub fn without_updater(mut self) -> Self {
        self.updater = false;
        self
    }

    /// Names that may only be set while booting.
    pub fn protected<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.protected.extend(names.into_iter().map(Into::into));
        self
    }

    /// A live property present before any operation runs.
    pub fn preset(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.preset.push((name.into(), value.into()));
        self
    }

    /// Register a generic resource with `add` and the given operations.
    pub fn resource(
        mut self,
        pattern: PathAddress,
        attributes: Vec<AttrDef>,
        operations: Vec<(OperationDefinition, SharedHandler)>,
    ) -> Self {
        self.resources.push(CustomResource {
            pattern,
            attributes,
            operations,
        });
        self
    }

    pub fn build(self) -> ScenarioResult<Harness> {
        let store = Arc::new(InMemoryPropertyStore::with_values(self.preset));
        let updater = Arc::new(ProcessEnvironmentUpdater::with_protected(self.protected));

        let mut builder = OperationRegistryBuilder::new();
        handlers::register_global_operations(&mut builder)?;

        let mut config = SystemPropertyConfig::new().with_boottime(self.use_boottime);
        if self.updater {
            config = config.with_updater(updater.clone());
        }
        sysprop::register(&mut builder, store.clone(), config)?;

        for resource in self.resources {
            let add = add_definition(&resource.attributes);
            let mut registration = builder
                .add_resource(resource.pattern)
                .attrs(resource.attributes)
                .operation(add, Arc::new(AddHandler));
            for (definition, handler) in resource.operations {
                registration = registration.operation(definition, handler);
            }
            registration.done()?;
        }

        let config = ControllerConfig::new()
            .with_process_type(self.process_type)
            .with_booting(self.booting);
        Ok(Harness {
            controller: ModelController::new(builder.build()?, config),
            store,
            updater,
        })
    }
}

/// Controller plus the collaborators tests inspect.
pub struct Harness {
    controller: ModelController,
    store: Arc<InMemoryPropertyStore>,
    updater: Arc<ProcessEnvironmentUpdater>,
}

impl Harness {
    pub fn builder() -> HarnessBuilder {
        HarnessBuilder::default()
    }

    /// A server with an updater and no protected names.
    pub fn new() -> ScenarioResult<Self> {
        Self::builder().build()
    }

    pub fn controller(&self) -> &ModelController {
        &self.controller
    }

    pub fn store(&self) -> &InMemoryPropertyStore {
        &self.store
    }

    pub fn updater(&self) -> &ProcessEnvironmentUpdater {
        &self.updater
    }

    pub fn execute(&self, operation: Operation) -> TransactionResult<OperationResponse> {
        self.controller.execute(operation)
    }

    pub fn composite(&self, operations: Vec<Operation>) -> TransactionResult<OperationResponse> {
        self.controller.execute_composite(operations)
    }

    pub fn boot(&self, operations: Vec<Operation>) -> TransactionResult<OperationResponse> {
        self.controller.boot(operations)
    }

    /// Live value of a property.
    pub fn property(&self, name: &str) -> Option<String> {
        self.store.values().get(name).cloned()
    }

    /// Store calls that touched `name`.
    pub fn calls_for(&self, name: &str) -> Vec<PropertyCall> {
        self.store.calls_for(name)
    }

    /// Whether the committed model holds a resource at `address`.
    pub fn has_resource(&self, address: &PathAddress) -> bool {
        self.controller.snapshot().contains(address)
    }

    /// A committed attribute value.
    pub fn attribute(&self, address: &PathAddress, name: &str) -> Option<Value> {
        self.controller
            .snapshot()
            .get(address)
            .and_then(|node| node.get_attr(name).cloned())
    }

    pub fn is_reload_required(&self) -> bool {
        self.controller.process().is_reload_required()
    }
}

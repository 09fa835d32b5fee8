//! Role discovery: resolves one implementation per role and wires it into a
//! dispatcher.
//!
//! Implementations are described by [`RoleBinding`] values. A
//! [`RoleManifest`] gathers the bindings to consider, either declared
//! explicitly or collected from the compile-time registry populated by the
//! [`task_role!`](crate::task_role) macro. [`configure`] then checks that
//! every role has at most one binding whose factory fulfils the role's
//! contract, instantiates each component and registers it with a
//! [`DispatcherBuilder`].
//!
//! Discovery runs once at startup. Any [`DiscoveryError`] it reports means
//! the plugin is mis-wired and should not serve requests.
//!
//! # Example
//!
//! ```
//! use strum::{AsRefStr, EnumIter};
//! use task_plugin_api::configuration::ConfigurationEnum;
//! use task_plugin_api::discovery::{RoleBinding, RoleManifest, discover};
//!
//! #[derive(Debug, Clone, Copy, AsRefStr, EnumIter)]
//! enum Params {
//!     Message,
//! }
//!
//! impl ConfigurationEnum for Params {}
//!
//! let manifest = RoleManifest::new()
//!     .declare(RoleBinding::configuration_enum::<Params>("Params", module_path!()));
//! let dispatcher = discover(&manifest).expect("manifest is well formed");
//! assert_eq!(dispatcher.request_names(), vec!["configuration"]);
//! ```

use std::fmt;

use strum::{EnumIter, IntoEnumIterator};
use tracing::{debug, error};

use crate::configuration::{ConfigurationEnum, EnumConfiguration, TaskConfiguration};
use crate::dispatcher::{Dispatcher, DispatcherBuilder};
use crate::error::{DiscoveryError, PluginError};
use crate::execution::TaskExecutor;
use crate::protocol::request_names;
use crate::validation::TaskValidator;
use crate::view::TaskView;

/// Tracing target for discovery operations.
const DISCOVERY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::discovery");

/// The four roles a task plugin can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    /// Declares the task's configuration parameters.
    Configuration,
    /// Validates submitted parameter values.
    Validator,
    /// Supplies the display name and settings template.
    View,
    /// Runs the task.
    Executor,
}

impl Role {
    /// Returns the name of the contract a component in this role fulfils.
    #[must_use]
    pub const fn contract(self) -> &'static str {
        match self {
            Self::Configuration => "ConfigurationEnum",
            Self::Validator => "TaskValidator",
            Self::View => "TaskView",
            Self::Executor => "TaskExecutor",
        }
    }

    /// Returns the request name this role answers.
    #[must_use]
    pub const fn request_name(self) -> &'static str {
        match self {
            Self::Configuration => request_names::CONFIGURATION,
            Self::Validator => request_names::VALIDATE,
            Self::View => request_names::VIEW,
            Self::Executor => request_names::EXECUTE,
        }
    }
}

/// Builds a configuration provider.
pub type ConfigurationFactory = fn() -> Result<Box<dyn TaskConfiguration>, PluginError>;
/// Builds a validator.
pub type ValidatorFactory = fn() -> Result<Box<dyn TaskValidator>, PluginError>;
/// Builds a view.
pub type ViewFactory = fn() -> Result<Box<dyn TaskView>, PluginError>;
/// Builds an executor.
pub type ExecutorFactory = fn() -> Result<Box<dyn TaskExecutor>, PluginError>;

#[derive(Clone, Copy)]
enum FactoryKind {
    Configuration(ConfigurationFactory),
    Validator(ValidatorFactory),
    View(ViewFactory),
    Executor(ExecutorFactory),
}

/// Produces a role component on demand.
///
/// A factory is tied to the contract it produces. Configuration factories
/// can only be built from a [`ConfigurationEnum`], so every configuration
/// provider found by discovery is an enumeration of parameters.
#[derive(Clone, Copy)]
pub struct ComponentFactory {
    kind: FactoryKind,
}

impl ComponentFactory {
    /// Factory for the parameters declared by the enumeration `E`.
    #[must_use]
    pub const fn configuration_enum<E: ConfigurationEnum>() -> Self {
        Self {
            kind: FactoryKind::Configuration(enum_configuration::<E>),
        }
    }

    /// Factory producing validators.
    #[must_use]
    pub const fn validator(factory: ValidatorFactory) -> Self {
        Self {
            kind: FactoryKind::Validator(factory),
        }
    }

    /// Factory producing views.
    #[must_use]
    pub const fn view(factory: ViewFactory) -> Self {
        Self {
            kind: FactoryKind::View(factory),
        }
    }

    /// Factory producing executors.
    #[must_use]
    pub const fn executor(factory: ExecutorFactory) -> Self {
        Self {
            kind: FactoryKind::Executor(factory),
        }
    }

    /// Returns the role whose contract this factory fulfils.
    #[must_use]
    pub const fn produces(&self) -> Role {
        match self.kind {
            FactoryKind::Configuration(_) => Role::Configuration,
            FactoryKind::Validator(_) => Role::Validator,
            FactoryKind::View(_) => Role::View,
            FactoryKind::Executor(_) => Role::Executor,
        }
    }
}

impl fmt::Debug for ComponentFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentFactory")
            .field("produces", &self.produces())
            .finish()
    }
}

fn enum_configuration<E: ConfigurationEnum>() -> Result<Box<dyn TaskConfiguration>, PluginError> {
    Ok(Box::new(EnumConfiguration::<E>::new()))
}

fn default_validator<T>() -> Result<Box<dyn TaskValidator>, PluginError>
where
    T: TaskValidator + Default + 'static,
{
    Ok(Box::new(T::default()))
}

fn default_view<T>() -> Result<Box<dyn TaskView>, PluginError>
where
    T: TaskView + Default + 'static,
{
    Ok(Box::new(T::default()))
}

fn default_executor<T>() -> Result<Box<dyn TaskExecutor>, PluginError>
where
    T: TaskExecutor + Default + 'static,
{
    Ok(Box::new(T::default()))
}

/// A registered implementation of a role.
///
/// The role tag is what discovery groups bindings by; the factory decides
/// what is actually produced. A binding whose tag and factory disagree is
/// reported as [`DiscoveryError::Incompatible`].
#[derive(Debug, Clone, Copy)]
pub struct RoleBinding {
    role: Role,
    type_name: &'static str,
    module_path: &'static str,
    factory: ComponentFactory,
}

impl RoleBinding {
    /// Creates a binding from its parts.
    #[must_use]
    pub const fn new(
        role: Role,
        type_name: &'static str,
        module_path: &'static str,
        factory: ComponentFactory,
    ) -> Self {
        Self {
            role,
            type_name,
            module_path,
            factory,
        }
    }

    /// Binds the configuration role to the enumeration `E`.
    #[must_use]
    pub const fn configuration_enum<E: ConfigurationEnum>(
        type_name: &'static str,
        module_path: &'static str,
    ) -> Self {
        Self::new(
            Role::Configuration,
            type_name,
            module_path,
            ComponentFactory::configuration_enum::<E>(),
        )
    }

    /// Binds the validator role to `T`, built with [`Default`].
    #[must_use]
    pub const fn validator<T: TaskValidator + Default + 'static>(
        type_name: &'static str,
        module_path: &'static str,
    ) -> Self {
        Self::new(
            Role::Validator,
            type_name,
            module_path,
            ComponentFactory::validator(default_validator::<T>),
        )
    }

    /// Binds the view role to `T`, built with [`Default`].
    #[must_use]
    pub const fn view<T: TaskView + Default + 'static>(
        type_name: &'static str,
        module_path: &'static str,
    ) -> Self {
        Self::new(
            Role::View,
            type_name,
            module_path,
            ComponentFactory::view(default_view::<T>),
        )
    }

    /// Binds the executor role to `T`, built with [`Default`].
    #[must_use]
    pub const fn executor<T: TaskExecutor + Default + 'static>(
        type_name: &'static str,
        module_path: &'static str,
    ) -> Self {
        Self::new(
            Role::Executor,
            type_name,
            module_path,
            ComponentFactory::executor(default_executor::<T>),
        )
    }

    /// Returns the role this binding was registered under.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns the registered type's name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the module the binding was declared in.
    #[must_use]
    pub const fn module_path(&self) -> &'static str {
        self.module_path
    }

    /// Returns `true` when the binding was declared in `region` or one of its
    /// submodules.
    #[must_use]
    pub fn is_within(&self, region: &str) -> bool {
        self.module_path
            .strip_prefix(region)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
    }

    fn instantiation_error(&self, source: &PluginError) -> DiscoveryError {
        DiscoveryError::Instantiation {
            type_name: self.type_name.to_owned(),
            role: self.role,
            message: source.to_string(),
        }
    }

    fn incompatible(&self) -> DiscoveryError {
        DiscoveryError::Incompatible {
            type_name: self.type_name.to_owned(),
            role: self.role,
            expected: self.role.contract(),
        }
    }
}

inventory::collect!(RoleBinding);

/// Registers a role implementation with the compile-time registry.
///
/// Registered bindings are found by [`RoleManifest::scan`] when the scanned
/// region contains the module the macro was invoked in. Validators, views
/// and executors are built with [`Default`]; the configuration role takes a
/// [`ConfigurationEnum`](crate::configuration::ConfigurationEnum).
///
/// ```ignore
/// task_plugin_api::task_role!(configuration: EchoParams);
/// task_plugin_api::task_role!(validator: EchoValidator);
/// task_plugin_api::task_role!(view: EchoView);
/// task_plugin_api::task_role!(executor: EchoExecutor);
/// ```
#[macro_export]
macro_rules! task_role {
    (configuration: $ty:ty) => {
        $crate::inventory::submit! {
            $crate::discovery::RoleBinding::configuration_enum::<$ty>(
                stringify!($ty),
                module_path!(),
            )
        }
    };
    (validator: $ty:ty) => {
        $crate::inventory::submit! {
            $crate::discovery::RoleBinding::validator::<$ty>(stringify!($ty), module_path!())
        }
    };
    (view: $ty:ty) => {
        $crate::inventory::submit! {
            $crate::discovery::RoleBinding::view::<$ty>(stringify!($ty), module_path!())
        }
    };
    (executor: $ty:ty) => {
        $crate::inventory::submit! {
            $crate::discovery::RoleBinding::executor::<$ty>(stringify!($ty), module_path!())
        }
    };
}

/// The set of bindings discovery considers.
#[derive(Debug, Clone, Default)]
pub struct RoleManifest {
    bindings: Vec<RoleBinding>,
}

impl RoleManifest {
    /// Creates an empty manifest.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Collects every registered binding declared in `region` or below it.
    ///
    /// `region` is a module path such as `my_plugin` or `my_plugin::roles`.
    #[must_use]
    pub fn scan(region: &str) -> Self {
        let bindings: Vec<RoleBinding> = inventory::iter::<RoleBinding>
            .into_iter()
            .filter(|binding| binding.is_within(region))
            .copied()
            .collect();
        debug!(
            target: DISCOVERY_TARGET,
            region,
            found = bindings.len(),
            "scanned role registry"
        );
        Self { bindings }
    }

    /// Adds a binding.
    #[must_use]
    pub fn declare(mut self, binding: RoleBinding) -> Self {
        self.bindings.push(binding);
        self
    }

    /// Returns the bindings in declaration order.
    #[must_use]
    pub fn bindings(&self) -> &[RoleBinding] {
        &self.bindings
    }

    fn candidates(&self, role: Role) -> Vec<&RoleBinding> {
        self.bindings
            .iter()
            .filter(|binding| binding.role == role)
            .collect()
    }
}

/// Registers the manifest's components with `builder`.
///
/// Roles without a binding are skipped, leaving their request name
/// unhandled.
///
/// # Errors
///
/// Returns [`DiscoveryError::Ambiguous`] when a role has more than one
/// binding, [`DiscoveryError::Incompatible`] when a binding's factory does
/// not produce its role's contract, and [`DiscoveryError::Instantiation`]
/// when a factory fails.
pub fn configure(
    manifest: &RoleManifest,
    builder: DispatcherBuilder,
) -> Result<DispatcherBuilder, DiscoveryError> {
    Role::iter()
        .try_fold(builder, |current, role| bind_role(manifest, role, current))
        .inspect_err(|failure| {
            error!(target: DISCOVERY_TARGET, error = %failure, "role discovery failed");
        })
}

/// Builds a dispatcher from the manifest using the default codec and job
/// console.
///
/// # Errors
///
/// Returns a [`DiscoveryError`] under the same conditions as [`configure`].
pub fn discover(manifest: &RoleManifest) -> Result<Dispatcher, DiscoveryError> {
    configure(manifest, DispatcherBuilder::new()).map(|builder| builder.build())
}

fn bind_role(
    manifest: &RoleManifest,
    role: Role,
    builder: DispatcherBuilder,
) -> Result<DispatcherBuilder, DiscoveryError> {
    let candidates = manifest.candidates(role);
    let binding = match candidates.as_slice() {
        [] => {
            debug!(target: DISCOVERY_TARGET, %role, "no implementation registered");
            return Ok(builder);
        }
        [single] => *single,
        several => {
            return Err(DiscoveryError::Ambiguous {
                role,
                candidates: several
                    .iter()
                    .map(|binding| binding.type_name.to_owned())
                    .collect(),
            });
        }
    };

    debug!(
        target: DISCOVERY_TARGET,
        %role,
        type_name = binding.type_name,
        "binding role implementation"
    );
    match binding.factory.kind {
        FactoryKind::Configuration(factory) if role == Role::Configuration => factory()
            .map(|configuration| builder.with_configuration(configuration))
            .map_err(|source| binding.instantiation_error(&source)),
        FactoryKind::Validator(factory) if role == Role::Validator => factory()
            .map(|validator| builder.with_validator(validator))
            .map_err(|source| binding.instantiation_error(&source)),
        FactoryKind::View(factory) if role == Role::View => factory()
            .map(|view| builder.with_view(view))
            .map_err(|source| binding.instantiation_error(&source)),
        FactoryKind::Executor(factory) if role == Role::Executor => factory()
            .map(|executor| builder.with_executor(executor))
            .map_err(|source| binding.instantiation_error(&source)),
        _ => Err(binding.incompatible()),
    }
}

use std::{fmt, marker::PhantomData, sync::Arc};

use crate::{resolve_arguments, Arguments, Context, DynInstance, Parameter, ProviderKind, Result};

/// Produces the instances of a binding.
///
/// The injector ships [`ValueProvider`], [`ClassProvider`] and [`FactoryProvider`],
/// any other type implementing this trait can be bound with
/// [`BindOptions::to_provider`](crate::BindOptions::to_provider).
///
/// The returned instance must be produced for the key of the binding,
/// otherwise resolving the key fails with
/// [`ResolutionError::TypeMismatch`](crate::ResolutionError::TypeMismatch).
pub trait Provider: Send + Sync + 'static {
    /// Produces an instance, resolving its dependencies through `cx`.
    fn provide(&self, cx: &mut Context<'_>) -> Result<DynInstance>;

    /// Returns the strategy of the provider.
    fn kind(&self) -> ProviderKind {
        ProviderKind::Custom
    }
}

/// A type that can be upcast to `I`.
///
/// Every type implements `Implements<Self>`. To bind a concrete type to a
/// trait object key, implement `Implements<dyn Trait>` for it, either with the
/// [`implements!`](crate::implements) macro or with the `implements` argument
/// of `#[Injectable]`.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use rigging::{implements, Implements};
///
/// trait Service: Send + Sync {}
///
/// struct ServiceImpl;
///
/// impl Service for ServiceImpl {}
///
/// implements!(ServiceImpl => dyn Service);
///
/// # fn main() {
/// let _: Arc<dyn Service> = <ServiceImpl as Implements<dyn Service>>::upcast(Arc::new(ServiceImpl));
/// # }
/// ```
pub trait Implements<I: ?Sized>: Send + Sync + 'static {
    /// Converts `this` to an `Arc<I>`.
    fn upcast(this: Arc<Self>) -> Arc<I>;
}

impl<T> Implements<T> for T
where
    T: ?Sized + Send + Sync + 'static,
{
    fn upcast(this: Arc<Self>) -> Arc<T> {
        this
    }
}

/// A type that is constructed from its declared parameters.
///
/// Usually generated by the `#[Injectable]` attribute macro.
pub trait Injectable: Sized + Send + Sync + 'static {
    /// Returns the declared parameters of the constructor, in declaration order.
    fn parameters() -> Vec<Parameter> {
        Vec::new()
    }

    /// Constructs the type from its resolved arguments.
    fn construct(args: Arguments) -> Result<Self>;
}

/// A callable that produces instances from its declared parameters.
///
/// Usually generated by the `#[Factory]` attribute macro, or created from a
/// closure with [`factory_fn`].
pub trait Factory: Send + Sync + 'static {
    /// The type produced by the factory.
    type Output: ?Sized + Send + Sync + 'static;

    /// Returns the declared parameters of the callable, in declaration order.
    fn parameters(&self) -> Vec<Parameter> {
        Vec::new()
    }

    /// Calls the factory with its resolved arguments.
    fn call(&self, args: Arguments) -> Result<Arc<Self::Output>>;
}

/// A [`Factory`] created from a closure, see [`factory_fn`].
pub struct FnFactory<T: ?Sized, F> {
    parameters: Vec<Parameter>,
    call: F,
    _marker: PhantomData<fn() -> Arc<T>>,
}

/// Creates a [`Factory`] from a parameter list and a closure.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use rigging::{factory_fn, Injector, Parameter};
///
/// # fn main() -> rigging::Result<()> {
/// let injector = Injector::new();
/// injector.bind::<i32>(|b| b.to_value(10))?;
/// injector.bind::<String>(|b| {
///     b.to_factory(factory_fn(
///         vec![Parameter::positional("x").marked::<i32>()],
///         |mut args| {
///             let x = args.positional::<i32>("x")?;
///             Ok(Arc::new(format!("f({})", x)))
///         },
///     ))
/// })?;
///
/// assert_eq!(*injector.get::<String>()?, "f(10)");
/// # Ok(())
/// # }
/// ```
pub fn factory_fn<T, F>(parameters: Vec<Parameter>, call: F) -> FnFactory<T, F>
where
    T: ?Sized + Send + Sync + 'static,
    F: Fn(Arguments) -> Result<Arc<T>> + Send + Sync + 'static,
{
    FnFactory {
        parameters,
        call,
        _marker: PhantomData,
    }
}

impl<T, F> Factory for FnFactory<T, F>
where
    T: ?Sized + Send + Sync + 'static,
    F: Fn(Arguments) -> Result<Arc<T>> + Send + Sync + 'static,
{
    type Output = T;

    fn parameters(&self) -> Vec<Parameter> {
        self.parameters.clone()
    }

    fn call(&self, args: Arguments) -> Result<Arc<T>> {
        (self.call)(args)
    }
}

/// Returns a fixed instance.
pub struct ValueProvider {
    instance: DynInstance,
}

impl ValueProvider {
    /// Creates a provider returning `instance` on every call.
    pub fn new<K>(instance: Arc<K>) -> Self
    where
        K: ?Sized + Send + Sync + 'static,
    {
        Self {
            instance: DynInstance::new(instance),
        }
    }
}

impl Provider for ValueProvider {
    fn provide(&self, _: &mut Context<'_>) -> Result<DynInstance> {
        Ok(self.instance.clone())
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Value
    }
}

impl fmt::Debug for ValueProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueProvider")
            .field("ty", self.instance.ty())
            .finish()
    }
}

/// Constructs `C` and upcasts it to the key `K`.
pub struct ClassProvider<C, K: ?Sized> {
    _marker: PhantomData<fn() -> (C, Arc<K>)>,
}

impl<C, K> ClassProvider<C, K>
where
    C: Injectable + Implements<K>,
    K: ?Sized + Send + Sync + 'static,
{
    /// Creates a provider constructing `C`.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<C, K> Default for ClassProvider<C, K>
where
    C: Injectable + Implements<K>,
    K: ?Sized + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C, K> Provider for ClassProvider<C, K>
where
    C: Injectable + Implements<K>,
    K: ?Sized + Send + Sync + 'static,
{
    fn provide(&self, cx: &mut Context<'_>) -> Result<DynInstance> {
        let parameters = C::parameters();

        let arguments = if parameters.is_empty() {
            Arguments::default()
        } else {
            resolve_arguments(cx, &parameters)?
        };

        let instance = Arc::new(C::construct(arguments)?);
        Ok(DynInstance::new(<C as Implements<K>>::upcast(instance)))
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Class
    }
}

/// Calls a [`Factory`] and upcasts its output to the key `K`.
pub struct FactoryProvider<F, K: ?Sized> {
    factory: F,
    _marker: PhantomData<fn() -> Arc<K>>,
}

impl<F, K> FactoryProvider<F, K>
where
    F: Factory,
    F::Output: Implements<K>,
    K: ?Sized + Send + Sync + 'static,
{
    /// Creates a provider calling `factory`.
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            _marker: PhantomData,
        }
    }
}

impl<F, K> Provider for FactoryProvider<F, K>
where
    F: Factory,
    F::Output: Implements<K>,
    K: ?Sized + Send + Sync + 'static,
{
    fn provide(&self, cx: &mut Context<'_>) -> Result<DynInstance> {
        let parameters = self.factory.parameters();
        let arguments = resolve_arguments(cx, &parameters)?;

        let output = self.factory.call(arguments)?;
        Ok(DynInstance::new(<F::Output as Implements<K>>::upcast(
            output,
        )))
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Factory
    }
}

macro_rules! default_injectable {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Injectable for $ty {
                fn construct(_: Arguments) -> Result<Self> {
                    Ok(<$ty as ::core::default::Default>::default())
                }
            }
        )+
    };
}

default_injectable! {
    bool, char, String,
    i8, i16, i32, i64, i128, isize,
    u8, u16, u32, u64, u128, usize,
    f32, f64,
}

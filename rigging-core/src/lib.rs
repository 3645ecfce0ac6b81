/// Represents how a declared parameter receives its argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParamKind {
    /// positional parameter.
    ///
    /// 1. resolved arguments are passed in declaration order.
    /// 2. tuple struct fields and function arguments are positional.
    Positional,
    /// keyword parameter.
    ///
    /// 1. resolved arguments are looked up by the parameter name.
    /// 2. named struct fields are keyword parameters.
    Keyword,
    /// variadic positional parameter, never injected.
    VarPositional,
    /// variadic keyword parameter, never injected.
    VarKeyword,
}

impl ParamKind {
    /// Returns whether the parameter is variadic.
    pub fn is_variadic(&self) -> bool {
        matches!(self, ParamKind::VarPositional | ParamKind::VarKeyword)
    }
}

/// Represents the strategy a provider uses to produce an instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProviderKind {
    /// returns a fixed value.
    Value,
    /// constructs a type from its declared parameters.
    Class,
    /// invokes a callable with its declared parameters.
    Factory,
    /// a user supplied provider.
    Custom,
}

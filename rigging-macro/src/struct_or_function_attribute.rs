use proc_macro2::Span;
use syn::{
    meta::ParseNestedMeta, parse::Parse, parse_quote, spanned::Spanned, LitBool, Path, Token, Type,
};

// #[Injectable(
//     implements = [dyn Trait, ..],
//     auto_register = true,
//     rigging_path = path::to::rigging,
// )]

#[derive(Default)]
pub(crate) struct StructOrFunctionAttribute {
    implements: Option<(Span, Vec<Type>)>,
    auto_register: Option<(Span, bool)>,
    rigging_path: Option<(Span, Path)>,
}

impl StructOrFunctionAttribute {
    pub(crate) fn parse(&mut self, meta: ParseNestedMeta) -> syn::Result<()> {
        let meta_path = &meta.path;
        let meta_path_span = meta_path.span();

        macro_rules! check_duplicate {
            ($argument:tt) => {
                if self.$argument.is_some() {
                    return Err(meta.error(concat!(
                        "duplicate `",
                        stringify!($argument),
                        "` argument"
                    )));
                }
            };
        }

        if meta_path.is_ident("implements") {
            check_duplicate!(implements);

            let input = meta.value()?;
            let content;
            syn::bracketed!(content in input);

            let types = content
                .parse_terminated(Type::parse, Token![,])?
                .into_iter()
                .collect();

            self.implements = Some((meta_path_span, types));
            return Ok(());
        }

        if meta_path.is_ident("auto_register") {
            check_duplicate!(auto_register);

            self.auto_register = Some((
                meta_path_span,
                if meta.input.is_empty() || meta.input.peek(Token![,]) {
                    true
                } else {
                    meta.value()?.parse::<LitBool>()?.value
                },
            ));
            return Ok(());
        }

        if meta_path.is_ident("rigging_path") {
            check_duplicate!(rigging_path);

            let path = meta.value()?.call(Path::parse_mod_style)?;
            self.rigging_path = Some((meta_path_span, path));
            return Ok(());
        }

        Err(meta.error(
            "the argument must be one of: `implements`, `auto_register`, `rigging_path`",
        ))
    }

    /// Rejects the arguments that only apply to structs.
    pub(crate) fn require_function_arguments(&self) -> syn::Result<()> {
        let errors = [
            self.implements.as_ref().map(|(span, _)| *span),
            self.auto_register.as_ref().map(|(span, _)| *span),
        ]
        .into_iter()
        .flatten()
        .map(|span| {
            syn::Error::new(
                span,
                "only `rigging_path` is supported on functions, \
                bind the factory to each key with `to_factory` instead",
            )
        })
        .reduce(|mut a, b| {
            a.combine(b);
            a
        });

        match errors {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub(crate) fn simplify(self) -> SimpleStructOrFunctionAttribute {
        let StructOrFunctionAttribute {
            implements,
            auto_register,
            rigging_path,
        } = self;

        SimpleStructOrFunctionAttribute {
            implements: implements.map(|(_, types)| types).unwrap_or_default(),
            auto_register: auto_register
                .map(|(_, auto_register)| auto_register)
                .unwrap_or(true),
            rigging_path: rigging_path
                .map(|(_, path)| path)
                .unwrap_or_else(|| parse_quote!(::rigging)),
        }
    }
}

pub(crate) struct SimpleStructOrFunctionAttribute {
    pub(crate) implements: Vec<Type>,
    pub(crate) auto_register: bool,
    pub(crate) rigging_path: Path,
}

use proc_macro2::TokenStream;
use quote::quote;
use rigging_core::ParamKind;
use syn::{
    punctuated::Punctuated, spanned::Spanned, AngleBracketedGenericArguments, Attribute, Field,
    Fields, FieldsNamed, FieldsUnnamed, FnArg, GenericArgument, Ident, Pat, PatIdent, PatType,
    Path, PathArguments, PathSegment, Token, Type, TypePath,
};

use crate::field_or_argument_attribute::{
    FieldOrArgumentAttribute, SimpleFieldOrArgumentAttribute,
};

/// Returns `T` if `ty` is written as `Arc<T>`, with any leading path.
pub(crate) fn extract_arc_type(ty: &Type) -> Option<&Type> {
    extract_path_type(ty, "Arc")
}

/// Returns the first generic argument of `ty` if its last segment is `ty_name`.
pub(crate) fn extract_path_type<'a>(ty: &'a Type, ty_name: &str) -> Option<&'a Type> {
    let Type::Path(TypePath {
        qself: None,
        path: Path { segments, .. },
    }) = ty
    else {
        return None;
    };

    let PathSegment {
        ident,
        arguments: PathArguments::AngleBracketed(AngleBracketedGenericArguments { args, .. }),
    } = segments.last()?
    else {
        return None;
    };

    if ident != ty_name {
        return None;
    }

    match args.first()? {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    }
}

pub(crate) struct ResolveOne {
    pub(crate) parameter: TokenStream,
    pub(crate) value: TokenStream,
}

fn kind_methods(kind: ParamKind) -> (TokenStream, TokenStream, TokenStream) {
    match kind {
        ParamKind::Keyword => (quote!(keyword), quote!(keyword), quote!(keyword_or_else)),
        _ => (
            quote!(positional),
            quote!(positional),
            quote!(positional_or_else),
        ),
    }
}

fn generate_only_one_field_or_argument_resolve(
    attrs: &mut Vec<Attribute>,
    ty: &Type,
    name: &str,
    kind: ParamKind,
    allow_keyword: bool,
    rigging_path: &Path,
) -> syn::Result<ResolveOne> {
    let SimpleFieldOrArgumentAttribute { default, keyword } =
        match FieldOrArgumentAttribute::from_attrs(attrs)? {
            Some(attr) => attr.simplify(),
            None => Default::default(),
        };

    let kind = match keyword {
        Some(span) if !allow_keyword => {
            return Err(syn::Error::new(
                span,
                "`keyword` only applies to function arguments, struct fields take their kind from the struct",
            ))
        }
        Some(_) => ParamKind::Keyword,
        None => kind,
    };

    let (create, take, take_or_else) = kind_methods(kind);
    let marker = extract_arc_type(ty);

    let mut parameter = quote! {
        #rigging_path::Parameter::#create(#name)
    };

    if let Some(marker) = marker {
        parameter = quote! { #parameter.marked::<#marker>() };
    }

    if default.is_some() {
        parameter = quote! { #parameter.with_default() };
    }

    let value = match (marker, default) {
        (Some(marker), None) => quote! {
            args.#take::<#marker>(#name)?
        },
        (Some(marker), Some(default)) => quote! {
            args.#take_or_else::<#marker, _>(#name, || #default)?
        },
        (None, Some(default)) => quote! {
            #default
        },
        (None, None) => {
            return Err(syn::Error::new(
                ty.span(),
                "only `Arc<T>` is injected, \
                please change the type to `Arc<T>`, or provide a value with `#[di(default)]` or `#[di(default = expr)]`",
            ))
        }
    };

    Ok(ResolveOne { parameter, value })
}

pub(crate) struct ArgumentResolveStmts {
    pub(crate) parameters: Vec<TokenStream>,
    pub(crate) values: Vec<TokenStream>,
}

pub(crate) fn generate_argument_resolve_methods(
    inputs: &mut Punctuated<FnArg, Token![,]>,
    rigging_path: &Path,
) -> syn::Result<ArgumentResolveStmts> {
    let capacity = inputs.len();

    let mut parameters = Vec::with_capacity(capacity);
    let mut values = Vec::with_capacity(capacity);

    for (index, input) in inputs.iter_mut().enumerate() {
        match input {
            FnArg::Receiver(r) => {
                return Err(syn::Error::new(r.span(), "not support `self` receiver"))
            }
            FnArg::Typed(PatType { attrs, pat, ty, .. }) => {
                let name = match pat.as_ref() {
                    Pat::Ident(PatIdent { ident, .. }) => ident.to_string(),
                    _ => format!("arg{}", index),
                };

                let ResolveOne { parameter, value } = generate_only_one_field_or_argument_resolve(
                    attrs,
                    ty,
                    &name,
                    ParamKind::Positional,
                    true,
                    rigging_path,
                )?;

                parameters.push(parameter);
                values.push(value);
            }
        }
    }

    Ok(ArgumentResolveStmts { parameters, values })
}

pub(crate) struct FieldResolveStmts {
    pub(crate) parameters: Vec<TokenStream>,
    pub(crate) fields: ResolvedFields,
}

pub(crate) enum ResolvedFields {
    Unit,
    Named {
        field_names: Vec<Ident>,
        field_values: Vec<TokenStream>,
    },
    Unnamed(Vec<TokenStream>),
}

pub(crate) fn generate_field_resolve_stmts(
    fields: &mut Fields,
    rigging_path: &Path,
) -> syn::Result<FieldResolveStmts> {
    match fields {
        Fields::Unit => Ok(FieldResolveStmts {
            parameters: Vec::new(),
            fields: ResolvedFields::Unit,
        }),
        Fields::Named(FieldsNamed { named, .. }) => {
            let capacity = named.len();

            let mut parameters = Vec::with_capacity(capacity);
            let mut field_names = Vec::with_capacity(capacity);
            let mut field_values = Vec::with_capacity(capacity);

            for Field {
                attrs,
                ident: field_name,
                ty,
                ..
            } in named.iter_mut()
            {
                let Some(field_name) = field_name.clone() else {
                    return Err(syn::Error::new(ty.span(), "named field without a name"));
                };

                let ResolveOne { parameter, value } = generate_only_one_field_or_argument_resolve(
                    attrs,
                    ty,
                    &field_name.to_string(),
                    ParamKind::Keyword,
                    false,
                    rigging_path,
                )?;

                parameters.push(parameter);
                field_names.push(field_name);
                field_values.push(value);
            }

            Ok(FieldResolveStmts {
                parameters,
                fields: ResolvedFields::Named {
                    field_names,
                    field_values,
                },
            })
        }
        Fields::Unnamed(FieldsUnnamed { unnamed, .. }) => {
            let capacity = unnamed.len();

            let mut parameters = Vec::with_capacity(capacity);
            let mut field_values = Vec::with_capacity(capacity);

            for (index, Field { attrs, ty, .. }) in unnamed.iter_mut().enumerate() {
                let ResolveOne { parameter, value } = generate_only_one_field_or_argument_resolve(
                    attrs,
                    ty,
                    &index.to_string(),
                    ParamKind::Positional,
                    false,
                    rigging_path,
                )?;

                parameters.push(parameter);
                field_values.push(value);
            }

            Ok(FieldResolveStmts {
                parameters,
                fields: ResolvedFields::Unnamed(field_values),
            })
        }
    }
}

#[cfg(feature = "auto-register")]
pub(crate) fn check_auto_register_with_generics(
    auto_register: bool,
    generics: &syn::Generics,
) -> syn::Result<()> {
    if auto_register && !generics.params.is_empty() {
        return Err(syn::Error::new(
            generics.span(),
            "not support auto register generics struct, \
            please remove generics, or use `#[Injectable(auto_register = false)]` to disable auto register",
        ));
    }

    Ok(())
}

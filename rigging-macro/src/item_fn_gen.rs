use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{spanned::Spanned, GenericParam, ItemFn, ReturnType, Type};

use crate::{
    commons::{self, ArgumentResolveStmts},
    struct_or_function_attribute::{SimpleStructOrFunctionAttribute, StructOrFunctionAttribute},
};

// #[Factory]
// fn Number(#[di(keyword)] base: Arc<i32>) -> Result<i64> {
//     Ok(*base as i64 * 2)
// }

enum Output<'a> {
    Unit,
    Value(&'a Type),
    Arc(&'a Type),
}

impl<'a> Output<'a> {
    fn from_type(ty: &'a Type) -> Self {
        match commons::extract_arc_type(ty) {
            Some(inner) => Output::Arc(inner),
            None => Output::Value(ty),
        }
    }

    fn ty(&self) -> TokenStream {
        match self {
            Output::Unit => quote!(()),
            Output::Value(ty) | Output::Arc(ty) => quote!(#ty),
        }
    }

    fn wrap(&self, value: TokenStream) -> TokenStream {
        match self {
            Output::Arc(_) => value,
            Output::Unit | Output::Value(_) => quote! {
                ::std::sync::Arc::new(#value)
            },
        }
    }
}

pub(crate) fn generate(
    attribute: StructOrFunctionAttribute,
    mut item_fn: ItemFn,
) -> syn::Result<TokenStream> {
    attribute.require_function_arguments()?;

    let SimpleStructOrFunctionAttribute {
        implements: _,
        auto_register: _,
        rigging_path,
    } = attribute.simplify();

    if let Some(asyncness) = item_fn.sig.asyncness {
        return Err(syn::Error::new(
            asyncness.span(),
            "not support async function, resolution is synchronous",
        ));
    }

    let ArgumentResolveStmts { parameters, values } =
        commons::generate_argument_resolve_methods(&mut item_fn.sig.inputs, &rigging_path)?;

    let (impl_generics, ty_generics, where_clause) = item_fn.sig.generics.split_for_impl();

    let vis = &item_fn.vis;

    let docs = item_fn
        .attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"));

    let ident = &item_fn.sig.ident;

    let (output, fallible) = match &item_fn.sig.output {
        ReturnType::Default => (Output::Unit, false),
        ReturnType::Type(_, ty) => match commons::extract_path_type(ty, "Result") {
            Some(ok) => (Output::from_type(ok), true),
            None => (Output::from_type(ty), false),
        },
    };

    let struct_definition = if item_fn.sig.generics.params.is_empty() {
        quote! {
            #vis struct #ident;
        }
    } else {
        let members = item_fn
            .sig
            .generics
            .params
            .iter()
            .filter_map(|param| match param {
                GenericParam::Type(ty) => Some(ty),
                _ => None,
            })
            .enumerate()
            .map(|(idx, ty)| {
                let ty_ident = &ty.ident;
                let ident = format_ident!("_mark{}", idx);
                quote! { #ident: ::core::marker::PhantomData<fn() -> #ty_ident> }
            });

        quote! {
            #[derive(Default)]
            #vis struct #ident #ty_generics { #(#members),* }
        }
    };

    let variables = (0..values.len())
        .map(|idx| format_ident!("arg{}", idx))
        .collect::<Vec<_>>();

    let turbofish = ty_generics.as_turbofish();

    let call = if fallible {
        quote! { #ident #turbofish (#(#variables),*)? }
    } else {
        quote! { #ident #turbofish (#(#variables),*) }
    };

    let output_ty = output.ty();
    let result = output.wrap(call);

    let expand = quote! {
        #(#docs)*
        #[allow(non_camel_case_types)]
        #struct_definition

        impl #impl_generics #rigging_path::Factory for #ident #ty_generics #where_clause {
            type Output = #output_ty;

            fn parameters(&self) -> ::std::vec::Vec<#rigging_path::Parameter> {
                ::std::vec![
                    #(
                        #parameters,
                    )*
                ]
            }

            #[allow(unused_mut, unused_variables)]
            fn call(
                &self,
                mut args: #rigging_path::Arguments,
            ) -> #rigging_path::Result<::std::sync::Arc<Self::Output>> {
                #[allow(non_snake_case, clippy::too_many_arguments)]
                #item_fn

                #(
                    let #variables = #values;
                )*

                ::core::result::Result::Ok(#result)
            }
        }
    };

    Ok(expand)
}

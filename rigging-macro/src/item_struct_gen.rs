use proc_macro2::TokenStream;
use quote::quote;
use syn::ItemStruct;

use crate::{
    commons::{self, FieldResolveStmts, ResolvedFields},
    struct_or_function_attribute::{SimpleStructOrFunctionAttribute, StructOrFunctionAttribute},
};

// #[Injectable(implements = [dyn Service])]
// struct A {
//     b: Arc<B>,
//     #[di(default = 3)]
//     retries: u8,
// }

pub(crate) fn generate(
    attribute: StructOrFunctionAttribute,
    mut item_struct: ItemStruct,
) -> syn::Result<TokenStream> {
    let SimpleStructOrFunctionAttribute {
        implements,
        auto_register,
        rigging_path,
    } = attribute.simplify();

    #[cfg(feature = "auto-register")]
    commons::check_auto_register_with_generics(auto_register, &item_struct.generics)?;

    let FieldResolveStmts { parameters, fields } =
        commons::generate_field_resolve_stmts(&mut item_struct.fields, &rigging_path)?;

    let struct_ident = &item_struct.ident;

    let (impl_generics, ty_generics, where_clause) = item_struct.generics.split_for_impl();

    let instance = match fields {
        ResolvedFields::Unit => quote! {
            #struct_ident
        },
        ResolvedFields::Named {
            field_names,
            field_values,
        } => quote! {
            #struct_ident {
                #(
                    #field_names: #field_values,
                )*
            }
        },
        ResolvedFields::Unnamed(field_values) => quote! {
            #struct_ident(
                #(
                    #field_values,
                )*
            )
        },
    };

    let implements = implements.iter().map(|interface| {
        quote! {
            impl #impl_generics #rigging_path::Implements<#interface> for #struct_ident #ty_generics #where_clause {
                fn upcast(this: ::std::sync::Arc<Self>) -> ::std::sync::Arc<#interface> {
                    this
                }
            }
        }
    });

    let auto_register = if auto_register && cfg!(feature = "auto-register") {
        quote! {
            #rigging_path::register_constructible!(#struct_ident);
        }
    } else {
        quote! {}
    };

    let expand = quote! {
        #item_struct

        impl #impl_generics #rigging_path::Injectable for #struct_ident #ty_generics #where_clause {
            fn parameters() -> ::std::vec::Vec<#rigging_path::Parameter> {
                ::std::vec![
                    #(
                        #parameters,
                    )*
                ]
            }

            #[allow(unused_mut, unused_variables)]
            fn construct(mut args: #rigging_path::Arguments) -> #rigging_path::Result<Self> {
                ::core::result::Result::Ok(#instance)
            }
        }

        #(#implements)*

        #auto_register
    };

    Ok(expand)
}

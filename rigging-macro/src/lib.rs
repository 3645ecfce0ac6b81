mod commons;
mod field_or_argument_attribute;
mod item_fn_gen;
mod item_struct_gen;
mod struct_or_function_attribute;

use proc_macro::TokenStream;
use syn::{parse::Parser, spanned::Spanned, Item};

use crate::struct_or_function_attribute::StructOrFunctionAttribute;

fn parse_attribute(attr: TokenStream) -> syn::Result<StructOrFunctionAttribute> {
    let mut attribute = StructOrFunctionAttribute::default();
    let parser = syn::meta::parser(|meta| attribute.parse(meta));
    parser.parse(attr)?;
    Ok(attribute)
}

#[proc_macro_attribute]
#[allow(non_snake_case)]
pub fn Injectable(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attribute = match parse_attribute(attr) {
        Ok(attribute) => attribute,
        Err(e) => return e.to_compile_error().into(),
    };

    let item = syn::parse_macro_input!(item as Item);

    let result = match item {
        Item::Struct(item_struct) => item_struct_gen::generate(attribute, item_struct),
        _ => Err(syn::Error::new(
            item.span(),
            "expected struct, use `#[Factory]` for functions",
        )),
    };

    result.unwrap_or_else(|e| e.to_compile_error()).into()
}

#[proc_macro_attribute]
#[allow(non_snake_case)]
pub fn Factory(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attribute = match parse_attribute(attr) {
        Ok(attribute) => attribute,
        Err(e) => return e.to_compile_error().into(),
    };

    let item = syn::parse_macro_input!(item as Item);

    let result = match item {
        Item::Fn(item_fn) => item_fn_gen::generate(attribute, item_fn),
        _ => Err(syn::Error::new(
            item.span(),
            "expected function, use `#[Injectable]` for structs",
        )),
    };

    result.unwrap_or_else(|e| e.to_compile_error()).into()
}

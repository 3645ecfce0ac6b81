use proc_macro2::Span;
use syn::{parse_quote, spanned::Spanned, Attribute, Expr, Token};

// #[di(
//     default = expr,
//     keyword,
// )]

pub(crate) struct FieldOrArgumentAttribute {
    default: Option<(Span, Expr)>,
    keyword: Option<Span>,
}

impl TryFrom<&Attribute> for FieldOrArgumentAttribute {
    type Error = syn::Error;

    fn try_from(attr: &Attribute) -> Result<Self, Self::Error> {
        let mut default: Option<(Span, Expr)> = None;
        let mut keyword: Option<Span> = None;

        attr.parse_nested_meta(|meta| {
            macro_rules! check_duplicate {
                ($attribute:tt) => {
                    if $attribute.is_some() {
                        return Err(meta.error(concat!(
                            "the `",
                            stringify!($attribute),
                            "` attribute can only be set once"
                        )));
                    }
                };
            }

            let meta_path = &meta.path;
            let meta_path_span = meta_path.span();

            if meta_path.is_ident("default") {
                check_duplicate!(default);

                default = Some((
                    meta_path_span,
                    if !meta.input.peek(Token![=]) {
                        parse_quote!(::core::default::Default::default())
                    } else {
                        meta.value()?.parse::<Expr>()?
                    },
                ));

                return Ok(());
            }

            if meta_path.is_ident("keyword") {
                check_duplicate!(keyword);
                keyword = Some(meta_path_span);
                return Ok(());
            }

            Err(meta.error("the attribute must be one of: `default`, `keyword`"))
        })?;

        Ok(FieldOrArgumentAttribute { default, keyword })
    }
}

impl FieldOrArgumentAttribute {
    pub(crate) fn from_attrs(
        attrs: &mut Vec<Attribute>,
    ) -> syn::Result<Option<FieldOrArgumentAttribute>> {
        let mut field_or_argument_attr = None;
        let mut errors = Vec::with_capacity(2);
        let mut already_appeared_di = false;

        attrs.retain(|attr| {
            if !attr.path().is_ident("di") {
                return true;
            }

            if already_appeared_di {
                let err = syn::Error::new(attr.span(), "only one `#[di(..)]` attribute is allowed");
                errors.push(err);
            } else {
                match FieldOrArgumentAttribute::try_from(attr) {
                    Ok(o) => field_or_argument_attr = Some(o),
                    Err(e) => errors.push(e),
                }
            }

            already_appeared_di = true;
            false
        });

        if let Some(e) = errors.into_iter().reduce(|mut a, b| {
            a.combine(b);
            a
        }) {
            return Err(e);
        }

        Ok(field_or_argument_attr)
    }

    pub(crate) fn simplify(self) -> SimpleFieldOrArgumentAttribute {
        let FieldOrArgumentAttribute { default, keyword } = self;

        SimpleFieldOrArgumentAttribute {
            default: default.map(|(_, expr)| expr),
            keyword,
        }
    }
}

#[derive(Default)]
pub(crate) struct SimpleFieldOrArgumentAttribute {
    pub(crate) default: Option<Expr>,
    pub(crate) keyword: Option<Span>,
}

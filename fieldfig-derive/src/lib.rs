//! `#[derive(Config)]` for fieldfig.
//!
//! Field attributes:
//!
//! * `#[config(ignore)]` - not walked at all; the field may have any type.
//! * `#[config(env = "NAME")]`, `#[config(env(skip))]`, `#[config(env(omit_prefix))]`
//! * `#[config(flag = "name")]`, `#[config(flag(skip))]`, `#[config(flag(omit_prefix))]`
//! * `#[config(format = "2006-01-02")]` - timestamp layout.
//! * `#[config(nested)]` - the field is itself a `Config` (or `Option` of one).
//! * `#[config(help = "...")]` - flag help; defaults to the doc comment.
//!
//! Container attribute: `#[config(validate = path::to::fn)]`, called as
//! `fn(&Self) -> Result<(), E>` after loading.
//!
//! Only `pub` fields are walked.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::meta::ParseNestedMeta;
use syn::{Data, DeriveInput, Fields, LitStr, Token, Visibility, parse_macro_input};

#[proc_macro_derive(Config, attributes(config))]
pub fn derive_config(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[derive(Default)]
enum Tag {
    #[default]
    Derive,
    Rename(String),
    Skip,
    OmitPrefix,
}

impl Tag {
    fn tokens(&self) -> TokenStream2 {
        match self {
            Tag::Derive => quote!(::fieldfig::NameTag::Derive),
            Tag::Rename(name) => quote!(::fieldfig::NameTag::Rename(#name)),
            Tag::Skip => quote!(::fieldfig::NameTag::Skip),
            Tag::OmitPrefix => quote!(::fieldfig::NameTag::OmitPrefix),
        }
    }
}

#[derive(Default)]
struct FieldAttrs {
    ignore: bool,
    nested: bool,
    env: Tag,
    flag: Tag,
    format: Option<String>,
    help: Option<String>,
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Config can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Config can only be derived for structs",
            ));
        }
    };

    let validate = container_validate(input)?;

    let mut steps = Vec::new();
    for field in fields {
        let attrs = field_attrs(field)?;
        if attrs.ignore || !matches!(field.vis, Visibility::Public(_)) {
            continue;
        }
        let Some(ident) = &field.ident else { continue };

        let name = ident.unraw().to_string();
        let ty = &field.ty;
        let type_name = quote!(#ty).to_string().replace(' ', "");
        let env = attrs.env.tokens();
        let flag = attrs.flag.tokens();
        let format = option_tokens(attrs.format.as_deref());
        let help = option_tokens(attrs.help.as_deref().or(doc_help(field).as_deref()));

        let info = quote! {
            ::fieldfig::FieldInfo {
                name: #name,
                type_name: #type_name,
                env: #env,
                flag: #flag,
                format: #format,
                help: #help,
            }
        };
        steps.push(if attrs.nested {
            quote!(visitor.nested(&#info, &mut self.#ident)?;)
        } else {
            quote!(visitor.leaf(&#info, ::fieldfig::Value::slot(&mut self.#ident))?;)
        });
    }

    let validate_fn = validate.map(|path| {
        quote! {
            fn validate(&self) -> ::core::result::Result<(), ::fieldfig::BoxError> {
                #path(self).map_err(::core::convert::Into::into)
            }
        }
    });

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics ::fieldfig::Config for #ident #ty_generics #where_clause {
            fn walk(
                &mut self,
                visitor: &mut dyn ::fieldfig::Visitor,
            ) -> ::core::result::Result<(), ::fieldfig::FieldfigError> {
                #(#steps)*
                ::core::result::Result::Ok(())
            }

            #validate_fn
        }

        impl #impl_generics ::fieldfig::Section for #ident #ty_generics #where_clause {
            fn enter(
                &mut self,
                visitor: &mut dyn ::fieldfig::Visitor,
            ) -> ::core::result::Result<(), ::fieldfig::FieldfigError> {
                ::fieldfig::Config::walk(self, visitor)
            }
        }
    })
}

fn container_validate(input: &DeriveInput) -> syn::Result<Option<syn::Path>> {
    let mut validate = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("config") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("validate") {
                validate = Some(meta.value()?.parse::<syn::Path>()?);
                Ok(())
            } else {
                Err(meta.error("unsupported container attribute, expected `validate = path`"))
            }
        })?;
    }
    Ok(validate)
}

fn field_attrs(field: &syn::Field) -> syn::Result<FieldAttrs> {
    let mut attrs = FieldAttrs::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("config") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("ignore") {
                attrs.ignore = true;
            } else if meta.path.is_ident("nested") {
                attrs.nested = true;
            } else if meta.path.is_ident("env") {
                attrs.env = name_tag(&meta)?;
            } else if meta.path.is_ident("flag") {
                attrs.flag = name_tag(&meta)?;
            } else if meta.path.is_ident("format") {
                attrs.format = Some(meta.value()?.parse::<LitStr>()?.value());
            } else if meta.path.is_ident("help") {
                attrs.help = Some(meta.value()?.parse::<LitStr>()?.value());
            } else {
                return Err(meta.error("unsupported config attribute"));
            }
            Ok(())
        })?;
    }
    Ok(attrs)
}

/// `env = "NAME"`, `env(skip)` or `env(omit_prefix)`.
fn name_tag(meta: &ParseNestedMeta) -> syn::Result<Tag> {
    if meta.input.peek(Token![=]) {
        let name = meta.value()?.parse::<LitStr>()?;
        return Ok(Tag::Rename(name.value()));
    }
    let mut tag = None;
    meta.parse_nested_meta(|inner| {
        if inner.path.is_ident("skip") {
            tag = Some(Tag::Skip);
            Ok(())
        } else if inner.path.is_ident("omit_prefix") {
            tag = Some(Tag::OmitPrefix);
            Ok(())
        } else {
            Err(inner.error("expected `skip` or `omit_prefix`"))
        }
    })?;
    tag.ok_or_else(|| meta.error("expected `skip` or `omit_prefix`"))
}

/// Doc comment lines joined into one line of help text.
fn doc_help(field: &syn::Field) -> Option<String> {
    let lines: Vec<String> = field
        .attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            syn::Meta::NameValue(nv) => match &nv.value {
                syn::Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Str(s),
                    ..
                }) => Some(s.value().trim().to_string()),
                _ => None,
            },
            _ => None,
        })
        .filter(|line| !line.is_empty())
        .collect();
    if lines.is_empty() {
        None
    } else {
        Some(lines.join(" "))
    }
}

fn option_tokens(value: Option<&str>) -> TokenStream2 {
    match value {
        Some(v) => quote!(::core::option::Option::Some(#v)),
        None => quote!(::core::option::Option::None),
    }
}

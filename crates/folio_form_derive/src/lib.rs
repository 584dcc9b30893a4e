use proc_macro::TokenStream;
use proc_macro2::{Ident, Span, TokenStream as TokenStream2};
use proc_macro_crate::{FoundCrate, crate_name};
use quote::{format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, parse_macro_input};

#[proc_macro_derive(FormModel, attributes(form))]
pub fn derive_form_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(error) => error.to_compile_error().into(),
    }
}

struct FieldAttrs {
    kind: TokenStream2,
    label: Option<String>,
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            input.ident,
            "FormModel derive currently supports only non-generic structs",
        ));
    }

    let model_ident = input.ident;
    let fields_struct_ident = format_ident!("{model_ident}Fields");

    let named_fields = match input.data {
        Data::Struct(data) => match data.fields {
            Fields::Named(fields) => fields.named,
            _ => {
                return Err(syn::Error::new(
                    Span::call_site(),
                    "FormModel derive requires a struct with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new(
                Span::call_site(),
                "FormModel derive is only supported on structs",
            ));
        }
    };

    let folio = folio_path();
    let mut lens_defs = Vec::new();
    let mut fields_methods = Vec::new();
    let mut read_entries = Vec::new();
    let mut set_arms = Vec::new();
    let mut clear_stmts = Vec::new();

    for field in named_fields {
        let Some(field_ident) = field.ident else {
            continue;
        };
        let attrs = parse_field_attrs(&field.attrs, &folio)?;
        let field_name = field_ident.to_string();
        let label = attrs.label.unwrap_or_else(|| humanize(&field_name));
        let kind = attrs.kind;
        let lens_ident = format_ident!("{model_ident}{}Lens", to_pascal_case(&field_name));

        lens_defs.push(quote! {
            #[derive(Clone, Copy, Debug, Default)]
            pub struct #lens_ident;

            impl #folio::form::FieldLens<#model_ident> for #lens_ident {
                fn key(self) -> #folio::form::FieldKey {
                    #folio::form::FieldKey::new(#field_name)
                }

                fn get<'a>(self, model: &'a #model_ident) -> &'a ::std::string::String {
                    &model.#field_ident
                }

                fn set(self, model: &mut #model_ident, value: ::std::string::String) {
                    model.#field_ident = value;
                }
            }
        });

        fields_methods.push(quote! {
            pub const fn #field_ident(&self) -> #lens_ident {
                #lens_ident
            }
        });

        read_entries.push(quote! {
            #folio::form::Field {
                key: #folio::form::FieldKey::new(#field_name),
                label: ::std::string::String::from(#label),
                kind: #kind,
                raw_value: ::std::clone::Clone::clone(&self.#field_ident),
            }
        });

        set_arms.push(quote! {
            #field_name => {
                self.#field_ident = value;
                true
            }
        });

        clear_stmts.push(quote! {
            ::std::string::String::clear(&mut self.#field_ident);
        });
    }

    Ok(quote! {
        #[derive(Clone, Copy, Debug, Default)]
        pub struct #fields_struct_ident;

        impl #fields_struct_ident {
            #(#fields_methods)*
        }

        impl #folio::form::FormModel for #model_ident {
            type Fields = #fields_struct_ident;

            fn fields() -> Self::Fields {
                #fields_struct_ident
            }

            fn read_fields(&self) -> ::std::vec::Vec<#folio::form::Field> {
                ::std::vec![#(#read_entries),*]
            }

            fn set_value(
                &mut self,
                key: &#folio::form::FieldKey,
                value: ::std::string::String,
            ) -> bool {
                match key.as_str() {
                    #(#set_arms)*
                    _ => {
                        let _ = value;
                        false
                    }
                }
            }

            fn clear(&mut self) {
                #(#clear_stmts)*
            }
        }

        #(#lens_defs)*
    })
}

fn parse_field_attrs(attrs: &[Attribute], folio: &TokenStream2) -> syn::Result<FieldAttrs> {
    let mut parsed = FieldAttrs {
        kind: quote!(#folio::form::FieldKind::Unclassified),
        label: None,
    };
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("form")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("kind") {
                let value: LitStr = meta.value()?.parse()?;
                let variant = match value.value().as_str() {
                    "required-text" => quote!(RequiredText),
                    "email" => quote!(Email),
                    "long-text" => quote!(LongText),
                    "unclassified" => quote!(Unclassified),
                    other => {
                        return Err(syn::Error::new(
                            value.span(),
                            format!(
                                "unknown field kind `{other}`, expected one of \
                                 required-text, email, long-text, unclassified"
                            ),
                        ));
                    }
                };
                parsed.kind = quote!(#folio::form::FieldKind::#variant);
                Ok(())
            } else if meta.path.is_ident("label") {
                let value: LitStr = meta.value()?.parse()?;
                parsed.label = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported form attribute, expected `kind` or `label`"))
            }
        })?;
    }
    Ok(parsed)
}

fn folio_path() -> TokenStream2 {
    match crate_name("folio") {
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(::#ident)
        }
        Ok(FoundCrate::Itself) => quote!(crate),
        Err(_) => quote!(::folio),
    }
}

fn to_pascal_case(input: &str) -> String {
    let mut out = String::new();
    for segment in input.split('_') {
        if segment.is_empty() {
            continue;
        }
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

// Keep in step with `folio::form::default_label`.
fn humanize(input: &str) -> String {
    let spaced = input.replace(['_', '-'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

use crate::attr::FieldAttrs;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Error, Field, Fields};

// derive_record
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match syn::parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };

    match expand(&input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error(),
    }
}

fn expand(input: &DeriveInput) -> Result<TokenStream, Error> {
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = if let Data::Struct(data) = &input.data {
        if let Fields::Named(named) = &data.fields {
            &named.named
        } else {
            return Err(Error::new_spanned(
                &data.fields,
                "Record can only be derived for structs with named fields",
            ));
        }
    } else {
        return Err(Error::new_spanned(
            &input.ident,
            "Record can only be derived for structs with named fields",
        ));
    };

    let mut descriptors = Vec::with_capacity(fields.len());
    for field in fields {
        let attrs = FieldAttrs::parse(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        descriptors.push(descriptor(field, &attrs));
    }

    Ok(quote! {
        impl #impl_generics ::cqltable::record::Record for #ident #ty_generics #where_clause {
            const FIELDS: &'static [::cqltable::record::FieldDescriptor<Self>] = &[
                #(#descriptors),*
            ];
        }
    })
}

fn descriptor(field: &Field, attrs: &FieldAttrs) -> TokenStream {
    let field_ident = field.ident.as_ref().expect("named field");
    let field_ty = &field.ty;

    // raw identifiers keep their declared spelling without the prefix
    let ident = field_ident.to_string();
    let ident = ident.trim_start_matches("r#");

    let rename = opt_str(attrs.rename.as_deref());
    let alias = opt_str(attrs.alias.as_deref());
    let type_hint = opt_str(attrs.type_hint.as_deref());

    quote! {
        ::cqltable::record::FieldDescriptor {
            ident: #ident,
            rename: #rename,
            alias: #alias,
            type_hint: #type_hint,
            column_type: <#field_ty as ::cqltable::traits::FieldValue>::column_type,
            get: |record: &Self| {
                ::cqltable::traits::FieldValue::to_value(&record.#field_ident)
            },
            set: |record: &mut Self, value: &::cqltable::value::Value| {
                match <#field_ty as ::cqltable::traits::FieldValue>::from_value(value) {
                    ::core::option::Option::Some(v) => {
                        record.#field_ident = v;
                        true
                    }
                    ::core::option::Option::None => false,
                }
            },
        }
    }
}

fn opt_str(value: Option<&str>) -> TokenStream {
    match value {
        Some(s) => quote!(::core::option::Option::Some(#s)),
        None => quote!(::core::option::Option::None),
    }
}

use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields};

pub fn derive_enumerated(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let name_str = name.to_string();

    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(name, "Enumerated derive requires an enum"));
    };

    let mut variants = Vec::new();
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "Enumerated derive supports unit variants only",
            ));
        }
        variants.push(&variant.ident);
    }
    let constants: Vec<String> = variants.iter().map(|v| v.to_string()).collect();

    Ok(quote! {
        impl odm_rust::FieldType for #name {
            fn kind() -> odm_rust::FieldKind {
                odm_rust::FieldKind::Enum(odm_rust::EnumInfo::new(#name_str, &[#(#constants),*]))
            }

            fn to_field(&self) -> odm_rust::FieldValue {
                match self {
                    #(#name::#variants => odm_rust::FieldValue::Enum(#constants),)*
                }
            }

            fn from_field(
                value: odm_rust::FieldValue,
            ) -> ::core::result::Result<Self, odm_rust::FieldError> {
                let constant = match &value {
                    odm_rust::FieldValue::Enum(constant) => *constant,
                    odm_rust::FieldValue::Str(constant) => constant.as_str(),
                    odm_rust::FieldValue::Null => {
                        return ::core::result::Result::Err(odm_rust::FieldError::NullToNonNullable {
                            expected: #name_str.to_string(),
                        });
                    }
                    other => {
                        return ::core::result::Result::Err(
                            odm_rust::FieldError::conversion(#name_str, other.describe())
                        );
                    }
                };
                match constant {
                    #(#constants => ::core::result::Result::Ok(#name::#variants),)*
                    unknown => ::core::result::Result::Err(odm_rust::FieldError::UnknownConstant {
                        enumeration: #name_str,
                        name: unknown.to_string(),
                    }),
                }
            }
        }
    })
}

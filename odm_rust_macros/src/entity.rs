use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, LitStr};

#[derive(Default)]
struct FieldAttrs {
    identity: bool,
    surrogate_id: bool,
    reference: bool,
    embedded: bool,
    generated: bool,
    indexed: bool,
    rename: Option<String>,
    skip: bool,
}

pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let name_str = name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let collection = match extract_collection(input)? {
        Some(c) => quote! { ::core::option::Option::Some(#c) },
        None => quote! { ::core::option::Option::None },
    };

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Entity derive requires a struct with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Entity derive requires a struct with named fields",
            ))
        }
    };

    let mut descriptors = Vec::new();
    let mut reads = Vec::new();
    let mut writes = Vec::new();

    for field in fields {
        let attrs = parse_field_attrs(field)?;
        if attrs.skip {
            continue;
        }

        let ident = field.ident.as_ref().ok_or_else(|| {
            syn::Error::new_spanned(field, "Entity derive requires named fields")
        })?;
        let ty = &field.ty;
        let field_name = ident.to_string();

        let rename = attrs
            .rename
            .as_ref()
            .map(|key| quote! { .rename(#key) });
        let FieldAttrs {
            identity,
            surrogate_id,
            reference,
            embedded,
            generated,
            indexed,
            ..
        } = attrs;

        descriptors.push(quote! {
            odm_rust::FieldDescriptor::new(#field_name, <#ty as odm_rust::FieldType>::kind())
                #rename
                .with_roles(odm_rust::FieldRoles {
                    identity: #identity,
                    surrogate_id: #surrogate_id,
                    reference: #reference,
                    embedded: #embedded,
                    generated: #generated,
                    indexed: #indexed,
                })
        });
        reads.push(quote! {
            #field_name => ::core::option::Option::Some(
                odm_rust::FieldType::to_field(&self.#ident)
            ),
        });
        writes.push(quote! {
            #field_name => {
                self.#ident = <#ty as odm_rust::FieldType>::from_field(value)?;
                ::core::result::Result::Ok(())
            }
        });
    }

    Ok(quote! {
        impl #impl_generics odm_rust::Entity for #name #ty_generics #where_clause {
            fn type_ref(&self) -> odm_rust::TypeRef {
                odm_rust::TypeRef::of::<Self>()
            }

            fn shape() -> odm_rust::EntityShape {
                odm_rust::EntityShape::new(
                    #name_str,
                    #collection,
                    ::std::vec![#(#descriptors),*],
                )
            }

            fn read_field(&self, name: &str) -> ::core::option::Option<odm_rust::FieldValue> {
                match name {
                    #(#reads)*
                    _ => ::core::option::Option::None,
                }
            }

            fn write_field(
                &mut self,
                name: &str,
                value: odm_rust::FieldValue,
            ) -> ::core::result::Result<(), odm_rust::FieldError> {
                match name {
                    #(#writes)*
                    _ => ::core::result::Result::Err(
                        odm_rust::FieldError::UnknownField(name.to_string())
                    ),
                }
            }
        }

        impl #impl_generics odm_rust::FieldType for #name #ty_generics #where_clause {
            fn kind() -> odm_rust::FieldKind {
                odm_rust::FieldKind::Object(odm_rust::TypeRef::of::<Self>())
            }

            fn to_field(&self) -> odm_rust::FieldValue {
                let cloned = ::core::clone::Clone::clone(self);
                odm_rust::FieldValue::Object(::std::boxed::Box::new(cloned))
            }

            fn from_field(
                value: odm_rust::FieldValue,
            ) -> ::core::result::Result<Self, odm_rust::FieldError> {
                match value {
                    odm_rust::FieldValue::Object(entity) => {
                        let found = odm_rust::Entity::type_ref(&*entity).name();
                        odm_rust::AsAny::into_any(entity)
                            .downcast::<Self>()
                            .map(|boxed| *boxed)
                            .map_err(|_| {
                                let found = ::std::format!("object {}", found);
                                odm_rust::FieldError::conversion(#name_str, found)
                            })
                    }
                    // absent sub-document: keep the default
                    odm_rust::FieldValue::Null => {
                        ::core::result::Result::Ok(::core::default::Default::default())
                    }
                    other => ::core::result::Result::Err(
                        odm_rust::FieldError::conversion(#name_str, other.describe())
                    ),
                }
            }
        }
    })
}

fn extract_collection(input: &DeriveInput) -> syn::Result<Option<String>> {
    let mut collection = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("entity") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("collection") {
                let value: LitStr = meta.value()?.parse()?;
                collection = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("expected `collection = \"...\"`"))
            }
        })?;
    }
    Ok(collection)
}

fn parse_field_attrs(field: &Field) -> syn::Result<FieldAttrs> {
    let mut attrs = FieldAttrs::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("entity") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("id") {
                attrs.identity = true;
            } else if meta.path.is_ident("surrogate_id") {
                attrs.surrogate_id = true;
            } else if meta.path.is_ident("reference") {
                attrs.reference = true;
            } else if meta.path.is_ident("embedded") {
                attrs.embedded = true;
            } else if meta.path.is_ident("generated") {
                attrs.generated = true;
            } else if meta.path.is_ident("indexed") {
                attrs.indexed = true;
            } else if meta.path.is_ident("skip") {
                attrs.skip = true;
            } else if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                attrs.rename = Some(value.value());
            } else {
                return Err(meta.error("unknown entity field attribute"));
            }
            Ok(())
        })?;
    }
    Ok(attrs)
}

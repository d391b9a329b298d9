mod entity;
mod enumerated;

use proc_macro::TokenStream;

/// Derive macro implementing `odm_rust::Entity` and `odm_rust::FieldType`
/// for a struct with named fields.
///
/// The type must also implement `Default`, `Clone` and `Debug`.
///
/// # Usage
///
/// ```ignore
/// #[derive(Debug, Clone, Default, Entity)]
/// #[entity(collection = "books")]
/// struct Book {
///     #[entity(id)]
///     id: String,
///     #[entity(rename = "t", indexed)]
///     title: String,
///     #[entity(reference)]
///     author: Option<Ref<Author>>,
///     #[entity(embedded)]
///     cover: Cover,
///     #[entity(skip)]
///     scratch: u32,
/// }
/// ```
///
/// Struct attributes:
/// - `collection = "..."`: collection name (default: the struct name)
///
/// Field attributes:
/// - `id`: identity, stored under `_id`
/// - `surrogate_id`, `generated`, `indexed`: recorded in metadata only
/// - `reference`: stored as the referenced entity's identity
/// - `embedded`: stored inline in this document
/// - `rename = "..."`: document key (default: the field name)
/// - `skip`: not mapped
#[proc_macro_derive(Entity, attributes(entity))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    entity::derive_entity(input)
}

/// Derive macro implementing `odm_rust::FieldType` for a unit-only enum.
/// Variants are stored by name, matched case-sensitively.
///
/// ```ignore
/// #[derive(Debug, Clone, Copy, PartialEq, Enumerated)]
/// enum Genre { Poetry, Prose }
/// ```
#[proc_macro_derive(Enumerated)]
pub fn derive_enumerated(input: TokenStream) -> TokenStream {
    enumerated::derive_enumerated(input)
}

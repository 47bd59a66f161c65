#[macro_use]
extern crate serde_derive;

use wasm_bindgen::prelude::*;

pub mod ast;
pub mod build;
pub mod error;
pub mod hooks;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod prune;
pub mod reachability;
pub mod schema;
pub mod transformer;
pub mod utils;

pub use build::{build_schema, build_schema_from_sdl};
pub use error::{Error, ParseError, Result};
pub use hooks::{
    FieldConfig, FieldConfigMap, FieldsTransformationContext, SchemaTransformer, TypeHandle,
    TypeId,
};
pub use printer::print_schema;
pub use prune::prune_unreachable;
pub use schema::{NamedType, RootTypes, SchemaGraph, TypeKind, TypeRef};
pub use transformer::transform_schema;
pub use utils::{order_types_topologically, walk_fields};

fn to_js_error(error: Error) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// Builds the schema described by `sdl` and returns it as a plain JS object.
#[wasm_bindgen]
pub fn parse(sdl: &str) -> std::result::Result<JsValue, JsValue> {
    let schema = build_schema_from_sdl(sdl).map_err(to_js_error)?;
    JsValue::from_serde(&schema).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Prints `sdl` back without the types that are unreachable from its roots
/// and directives.
#[wasm_bindgen(js_name = removeUnusedTypes)]
pub fn remove_unused_types(sdl: &str) -> std::result::Result<String, JsValue> {
    let schema = build_schema_from_sdl(sdl).map_err(to_js_error)?;
    let pruned = prune_unreachable(&schema).map_err(to_js_error)?;
    Ok(print_schema(&pruned))
}

//! Column schema: type tokens, converters and the builder reading header rows
//!
//! Every sheet carries its own schema in the first four rows:
//! - row 0: column names (`pos.x` groups into an object, repeated names into an array)
//! - row 1: type tokens (`string`, `number`, `bool`, `link_number`, ...)
//! - row 3: export scopes (`cs` = client and server)

mod builder;
mod converter;
mod translation;

pub use builder::{
    is_ignored, Schema, SchemaBuilder, HEADER_ROWS, IGNORE_MARKER, NAME_ROW, SCOPE_ROW, TYPE_ROW,
};
pub use converter::{Aggregate, AggregateKind, Converter, Leaf, LeafKind, RowContext};
pub use translation::{translation_key, TranslationTable};

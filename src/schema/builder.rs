//! Schema builder: header rows → ordered list of column converters

use crate::error::{ExportError, ExportResult};
use crate::schema::{Aggregate, AggregateKind, Converter, Leaf, LeafKind};
use crate::types::{Row, Sheet};
use std::collections::HashMap;
use tracing::debug;

/// Row holding column display names
pub const NAME_ROW: usize = 0;
/// Row holding column type tokens
pub const TYPE_ROW: usize = 1;
/// Row holding export-scope tokens (row 2 is unused)
pub const SCOPE_ROW: usize = 3;
/// Number of fixed header rows before data starts
pub const HEADER_ROWS: usize = 4;
/// Names, type tokens and sheet names starting with this are skipped
pub const IGNORE_MARKER: &str = "ignore";

/// True if `text` starts with the ignore marker (case-insensitive)
pub fn is_ignored(text: &str) -> bool {
    text.get(..IGNORE_MARKER.len())
        .map(|prefix| prefix.eq_ignore_ascii_case(IGNORE_MARKER))
        .unwrap_or(false)
}

/// Resolved column layout of one sheet for one export scope
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    pub converters: Vec<Converter>,
}

impl Schema {
    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    /// Converter producing the row identifier
    pub fn identifier(&self) -> Option<&Leaf> {
        match self.converters.first() {
            Some(Converter::Leaf(leaf)) => Some(leaf),
            _ => None,
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.converters.iter().map(|c| c.name().to_string()).collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.converters.iter().map(|c| c.label().to_string()).collect()
    }
}

/// How a column name groups with its neighbours
#[derive(Debug, PartialEq)]
enum ColumnKey<'a> {
    /// `key.field`
    Field { key: &'a str, field: &'a str },
    /// Bare name repeated at another position
    Element(&'a str),
    Standalone(&'a str),
}

impl<'a> ColumnKey<'a> {
    fn group(&self) -> &'a str {
        match self {
            ColumnKey::Field { key, .. } => key,
            ColumnKey::Element(name) | ColumnKey::Standalone(name) => name,
        }
    }
}

pub struct SchemaBuilder<'a> {
    scope: &'a str,
}

impl<'a> SchemaBuilder<'a> {
    /// Builder for the export pass selecting columns whose scope cell
    /// contains `scope` (e.g. `c` for client, `s` for server)
    pub fn new(scope: &'a str) -> Self {
        Self { scope }
    }

    pub fn build(&self, sheet: &Sheet) -> ExportResult<Schema> {
        let Some(name_row) = sheet.row(NAME_ROW) else {
            return Ok(Schema::default());
        };
        let empty = Row::default();
        let type_row = sheet.row(TYPE_ROW).unwrap_or(&empty);
        let scope_row = sheet.row(SCOPE_ROW).unwrap_or(&empty);

        let retained = retained_columns(name_row, type_row);
        debug!(
            sheet = %sheet.name,
            columns = ?retained.iter().map(|(i, _)| *i).collect::<Vec<_>>(),
            "Export name columns"
        );

        let mut converters: Vec<Converter> = Vec::new();
        let mut groups: HashMap<String, usize> = HashMap::new();

        for (index, name) in &retained {
            let located = |e: ExportError, row: usize| {
                e.in_sheet(&sheet.name, Some(row + 1), Some(name.as_str()))
            };

            let scope = scope_row.cell(*index).header_text().ok_or_else(|| {
                located(
                    ExportError::Config(format!("Missing export scope for column '{}'", name)),
                    SCOPE_ROW,
                )
            })?;
            if !scope.contains(self.scope) {
                continue;
            }

            let token = type_row.cell(*index).header_text().ok_or_else(|| {
                located(
                    ExportError::Config(format!("Missing type for column '{}'", name)),
                    TYPE_ROW,
                )
            })?;
            let kind = LeafKind::parse(&token).map_err(|e| located(e, TYPE_ROW))?;

            let column_key = classify(name, *index, &retained)
                .map_err(|e| located(e, NAME_ROW))?;
            let leaf_name = match column_key {
                ColumnKey::Field { field, .. } => field,
                _ => name.as_str(),
            };
            let leaf = Leaf::new(*index, leaf_name, kind);
            let group = column_key.group();

            if let Some(&position) = groups.get(group) {
                if let Converter::Aggregate(agg) = &mut converters[position] {
                    if agg.kind == AggregateKind::Object && agg.field(&leaf.name).is_some() {
                        return Err(located(
                            ExportError::Config(format!(
                                "Field '{}' appears twice in '{}'",
                                leaf.name, agg.name
                            )),
                            NAME_ROW,
                        ));
                    }
                    agg.push(leaf);
                }
                continue;
            }

            let aggregate_kind = match column_key {
                ColumnKey::Field { .. } => Some(AggregateKind::Object),
                ColumnKey::Element(_) if matches!(leaf.kind, LeafKind::Links(_)) => {
                    Some(AggregateKind::Links)
                }
                ColumnKey::Element(_) => Some(AggregateKind::Array),
                ColumnKey::Standalone(_) => None,
            };

            match aggregate_kind {
                Some(kind) => {
                    let mut agg = Aggregate::new(group, kind);
                    agg.push(leaf);
                    groups.insert(group.to_string(), converters.len());
                    converters.push(Converter::Aggregate(agg));
                }
                None => converters.push(Converter::Leaf(leaf)),
            }
        }

        let schema = Schema { converters };
        validate_identifier(&schema).map_err(|e| e.in_sheet(&sheet.name, None, None))?;
        Ok(schema)
    }
}

/// Non-blank, non-ignored name columns in position order
fn retained_columns(name_row: &Row, type_row: &Row) -> Vec<(usize, String)> {
    (0..name_row.len())
        .filter_map(|index| {
            let name = name_row.cell(index).header_text()?;
            if name.is_empty() || is_ignored(&name) {
                return None;
            }
            if let Some(token) = type_row.cell(index).header_text() {
                if is_ignored(&token) {
                    return None;
                }
            }
            Some((index, name))
        })
        .collect()
}

fn classify<'a>(
    name: &'a str,
    index: usize,
    retained: &[(usize, String)],
) -> ExportResult<ColumnKey<'a>> {
    if let Some((key, field)) = name.split_once('.') {
        if key.is_empty() || field.is_empty() {
            return Err(ExportError::Config(format!(
                "Malformed field name '{}'",
                name
            )));
        }
        return Ok(ColumnKey::Field { key, field });
    }

    let repeated = retained
        .iter()
        .any(|(other, other_name)| *other != index && other_name == name);
    if repeated {
        Ok(ColumnKey::Element(name))
    } else {
        Ok(ColumnKey::Standalone(name))
    }
}

fn validate_identifier(schema: &Schema) -> ExportResult<()> {
    match schema.converters.first() {
        None => Ok(()),
        Some(Converter::Aggregate(agg)) => Err(ExportError::Config(format!(
            "Identifier column '{}' can not be an object or array",
            agg.name
        ))),
        Some(Converter::Leaf(leaf)) if leaf.kind.is_translate() => Err(ExportError::Config(
            format!("Identifier column '{}' can not be translate", leaf.name),
        )),
        Some(Converter::Leaf(_)) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(names: &[&str], types: &[&str], scopes: &[&str]) -> Sheet {
        Sheet::new(
            "Items",
            vec![
                Row::from_strings(names),
                Row::from_strings(types),
                Row::default(),
                Row::from_strings(scopes),
            ],
        )
    }

    #[test]
    fn test_is_ignored() {
        assert!(is_ignored("ignore_note"));
        assert!(is_ignored("IgnoreMe"));
        assert!(!is_ignored("ign"));
        assert!(!is_ignored("name"));
    }

    #[test]
    fn test_standalone_columns() {
        let schema = SchemaBuilder::new("c")
            .build(&sheet(&["id", "hp"], &["string", "int"], &["cs", "cs"]))
            .unwrap();
        assert_eq!(schema.names(), vec!["id", "hp"]);
        assert_eq!(schema.labels(), vec!["string", "number"]);
        assert_eq!(schema.identifier().map(|l| l.index), Some(0));
    }

    #[test]
    fn test_dotted_names_group_into_object() {
        let schema = SchemaBuilder::new("c")
            .build(&sheet(
                &["id", "pos.x", "name", "pos.y"],
                &["string", "number", "string", "number"],
                &["cs", "cs", "cs", "cs"],
            ))
            .unwrap();
        assert_eq!(schema.names(), vec!["id", "pos", "name"]);
        match &schema.converters[1] {
            Converter::Aggregate(agg) => {
                assert_eq!(agg.kind, AggregateKind::Object);
                let fields: Vec<&str> = agg.children.iter().map(|c| c.name.as_str()).collect();
                assert_eq!(fields, vec!["x", "y"]);
            }
            other => panic!("Expected aggregate, got {other:?}"),
        }
    }

    #[test]
    fn test_repeated_names_group_into_array() {
        let schema = SchemaBuilder::new("c")
            .build(&sheet(
                &["id", "tag", "tag", "drop", "drop"],
                &["string", "string", "string", "links_number", "links_number"],
                &["c", "c", "c", "c", "c"],
            ))
            .unwrap();
        assert_eq!(schema.names(), vec!["id", "tag", "drop"]);
        assert_eq!(schema.labels(), vec!["string", "json", "links"]);
        match &schema.converters[2] {
            Converter::Aggregate(agg) => assert_eq!(agg.children.len(), 2),
            other => panic!("Expected aggregate, got {other:?}"),
        }
    }

    #[test]
    fn test_scope_filters_columns() {
        let source = sheet(
            &["id", "client_only", "server_only"],
            &["string", "string", "string"],
            &["cs", "c", "s"],
        );
        let client = SchemaBuilder::new("c").build(&source).unwrap();
        let server = SchemaBuilder::new("s").build(&source).unwrap();
        assert_eq!(client.names(), vec!["id", "client_only"]);
        assert_eq!(server.names(), vec!["id", "server_only"]);
    }

    #[test]
    fn test_ignored_and_blank_columns_are_skipped() {
        let schema = SchemaBuilder::new("c")
            .build(&sheet(
                &["id", "", "ignore_note", "hp", "dev"],
                &["string", "string", "string", "int", "ignore"],
                &["c", "c", "c", "c", "c"],
            ))
            .unwrap();
        assert_eq!(schema.names(), vec!["id", "hp"]);
    }

    #[test]
    fn test_missing_scope_is_configuration_error() {
        let err = SchemaBuilder::new("c")
            .build(&sheet(&["id", "hp"], &["string", "int"], &["c"]))
            .unwrap_err();
        assert!(err.is_configuration());
        match err {
            ExportError::Sheet { row, column, .. } => {
                assert_eq!(row, Some(4));
                assert_eq!(column.as_deref(), Some("hp"));
            }
            other => panic!("Expected located error, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_type_names_token() {
        let err = SchemaBuilder::new("c")
            .build(&sheet(&["id", "pos"], &["string", "vector3"], &["c", "c"]))
            .unwrap_err();
        assert!(err.to_string().contains("vector3"), "got: {err}");
    }

    #[test]
    fn test_identifier_must_not_be_aggregate() {
        let err = SchemaBuilder::new("c")
            .build(&sheet(
                &["pos.x", "pos.y"],
                &["number", "number"],
                &["c", "c"],
            ))
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_sheet_without_header_is_empty() {
        let schema = SchemaBuilder::new("c")
            .build(&Sheet::new("Empty", vec![]))
            .unwrap();
        assert!(schema.is_empty());
    }

    #[test]
    fn test_out_of_scope_duplicate_still_forms_array() {
        let schema = SchemaBuilder::new("c")
            .build(&sheet(
                &["id", "tag", "tag"],
                &["string", "string", "string"],
                &["c", "c", "s"],
            ))
            .unwrap();
        match &schema.converters[1] {
            Converter::Aggregate(agg) => {
                assert_eq!(agg.kind, AggregateKind::Array);
                assert_eq!(agg.children.len(), 1);
            }
            other => panic!("Expected aggregate, got {other:?}"),
        }
    }

    #[test]
    fn test_repeated_object_field_is_configuration_error() {
        let err = SchemaBuilder::new("c")
            .build(&sheet(
                &["id", "pos.x", "pos.y", "pos.x"],
                &["string", "number", "number", "number"],
                &["c", "c", "c", "c"],
            ))
            .unwrap_err();
        assert!(err.is_configuration());
        match err {
            ExportError::Sheet { row, column, .. } => {
                assert_eq!(row, Some(1));
                assert_eq!(column.as_deref(), Some("pos.x"));
            }
            other => panic!("Expected located error, got {other:?}"),
        }
    }
}

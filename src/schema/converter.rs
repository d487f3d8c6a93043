//! Column converters: leaf types and the object/array aggregates built on them

use crate::error::{ExportError, ExportResult};
use crate::schema::TranslationTable;
use crate::types::{format_number, CellValue, Row};
use serde_json::{Map, Number, Value};

//==============================================================================
// Type tokens
//==============================================================================

/// Leaf column type, resolved once from the type row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafKind {
    String,
    Number,
    Boolean,
    Color,
    Json,
    Translate,
    /// Reference to another table's row, converted as the inner type
    Link(Box<LeafKind>),
    /// Element of a reference list, converted as the inner type
    Links(Box<LeafKind>),
}

impl LeafKind {
    /// Parse a type token such as `number`, `bool` or `link_number`
    pub fn parse(token: &str) -> ExportResult<Self> {
        let token = token.trim();
        if let Some(kind) = Self::parse_reference(token)? {
            return Ok(kind);
        }
        Self::parse_primitive(token).ok_or_else(|| ExportError::UnknownType(token.to_string()))
    }

    fn parse_reference(token: &str) -> ExportResult<Option<Self>> {
        let (wrap, inner): (fn(Box<LeafKind>) -> LeafKind, &str) =
            if let Some(inner) = token.strip_prefix("links") {
                (LeafKind::Links, inner)
            } else if let Some(inner) = token.strip_prefix("link") {
                (LeafKind::Link, inner)
            } else {
                return Ok(None);
            };

        // Bare `link` / `links` reference by string id
        if inner.is_empty() {
            return Ok(Some(wrap(Box::new(LeafKind::String))));
        }

        let inner = inner
            .strip_prefix('_')
            .ok_or_else(|| ExportError::UnknownType(token.to_string()))?;
        let inner = Self::parse_primitive(inner)
            .ok_or_else(|| ExportError::UnknownType(token.to_string()))?;
        Ok(Some(wrap(Box::new(inner))))
    }

    fn parse_primitive(token: &str) -> Option<Self> {
        match token {
            "string" => Some(LeafKind::String),
            "number" | "int" => Some(LeafKind::Number),
            "boolean" | "bool" => Some(LeafKind::Boolean),
            "color" => Some(LeafKind::Color),
            "json" => Some(LeafKind::Json),
            "translate" => Some(LeafKind::Translate),
            _ => None,
        }
    }

    /// Type label written to the second header line
    pub fn label(&self) -> &'static str {
        match self {
            LeafKind::String => "string",
            LeafKind::Number => "number",
            LeafKind::Boolean => "boolean",
            LeafKind::Color => "color",
            LeafKind::Json => "json",
            LeafKind::Translate => "translate",
            LeafKind::Link(_) => "link",
            LeafKind::Links(_) => "links",
        }
    }

    pub fn is_translate(&self) -> bool {
        matches!(self, LeafKind::Translate)
    }
}

//==============================================================================
// Row context
//==============================================================================

/// Per-row conversion state: the row identifier and the sheet's translations
pub struct RowContext<'a> {
    pub id: &'a str,
    pub translations: &'a mut TranslationTable,
}

impl<'a> RowContext<'a> {
    pub fn new(id: &'a str, translations: &'a mut TranslationTable) -> Self {
        Self { id, translations }
    }
}

//==============================================================================
// Leaf converter
//==============================================================================

/// Converter owning a single column
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub index: usize,
    pub name: String,
    pub kind: LeafKind,
}

impl Leaf {
    pub fn new(index: usize, name: impl Into<String>, kind: LeafKind) -> Self {
        Self {
            index,
            name: name.into(),
            kind,
        }
    }

    /// Delimited-text form of the cell. Localizable text is always empty here.
    pub fn text(&self, row: &Row) -> ExportResult<String> {
        text_of(&self.kind, row.cell(self.index))
    }

    /// Structured form for embedding in an aggregate; `None` means omit
    pub fn structured(&self, row: &Row) -> ExportResult<Option<Value>> {
        structured_of(&self.kind, row.cell(self.index))
    }

    /// Text conversion that also records localizable text for the row
    pub fn convert(&self, row: &Row, ctx: &mut RowContext<'_>) -> ExportResult<String> {
        self.record_translation(row, ctx);
        self.text(row)
    }

    fn structured_in(&self, row: &Row, ctx: &mut RowContext<'_>) -> ExportResult<Option<Value>> {
        self.record_translation(row, ctx);
        self.structured(row)
    }

    fn record_translation(&self, row: &Row, ctx: &mut RowContext<'_>) {
        if !self.kind.is_translate() {
            return;
        }
        if let CellValue::Text(rich) = row.cell(self.index) {
            ctx.translations.record(&self.name, ctx.id, rich.display());
        }
    }
}

fn text_of(kind: &LeafKind, cell: &CellValue) -> ExportResult<String> {
    match kind {
        LeafKind::String => Ok(string_text(cell)),
        LeafKind::Number => number_text(cell),
        LeafKind::Boolean => Ok(if boolean_value(cell) { "1" } else { "0" }.to_string()),
        LeafKind::Color | LeafKind::Json => Ok(cell.raw_text()),
        LeafKind::Translate => Ok(String::new()),
        LeafKind::Link(inner) | LeafKind::Links(inner) => text_of(inner, cell),
    }
}

fn structured_of(kind: &LeafKind, cell: &CellValue) -> ExportResult<Option<Value>> {
    match kind {
        LeafKind::String | LeafKind::Color | LeafKind::Json => {
            let text = text_of(kind, cell)?;
            Ok((!text.is_empty()).then_some(Value::String(text)))
        }
        LeafKind::Number => {
            let text = number_text(cell)?;
            if text.is_empty() {
                return Ok(None);
            }
            parse_number(&text).map(|n| Some(json_number(n)))
        }
        LeafKind::Boolean => Ok(Some(Value::Bool(boolean_value(cell)))),
        LeafKind::Translate => Ok(None),
        LeafKind::Link(inner) | LeafKind::Links(inner) => structured_of(inner, cell),
    }
}

fn string_text(cell: &CellValue) -> String {
    let text = match cell {
        CellValue::Blank => String::new(),
        CellValue::Text(rich) => rich.display(),
        CellValue::Number(n) => format_number(*n),
        CellValue::Formula { cached, .. } => match cached.resolved() {
            CellValue::Text(rich) => rich.display(),
            CellValue::Number(n) => format_number(*n),
            other => other.raw_text(),
        },
        other => other.raw_text(),
    };
    text.trim().to_string()
}

fn number_text(cell: &CellValue) -> ExportResult<String> {
    match cell.resolved() {
        CellValue::Blank => Ok(String::new()),
        CellValue::Number(n) => Ok(format_number(*n)),
        CellValue::Text(rich) => {
            let text = rich.text.trim();
            if text.is_empty() {
                return Ok(String::new());
            }
            parse_number(text)?;
            Ok(text.to_string())
        }
        other => Err(ExportError::Data(format!(
            "Cell value {} can not convert to number",
            other.raw_text()
        ))),
    }
}

fn parse_number(text: &str) -> ExportResult<f64> {
    text.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| {
            ExportError::Data(format!("Cell value {} can not convert to number", text))
        })
}

/// Integral values become JSON integers so `1.0` serializes as `1`
fn json_number(n: f64) -> Value {
    const MAX_SAFE: f64 = 9_007_199_254_740_992.0;
    if n.fract() == 0.0 && n.abs() < MAX_SAFE {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

fn boolean_value(cell: &CellValue) -> bool {
    match cell.resolved() {
        CellValue::Bool(b) => *b,
        CellValue::Number(n) => *n == 1.0,
        CellValue::Text(rich) => rich.text == "true",
        _ => false,
    }
}

//==============================================================================
// Aggregates
//==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateKind {
    /// Dotted column names, `key.field`
    Object,
    /// Repeated bare column names
    Array,
    /// Repeated bare column names of a `links_*` type
    Links,
}

impl AggregateKind {
    pub fn label(&self) -> &'static str {
        match self {
            AggregateKind::Object | AggregateKind::Array => "json",
            AggregateKind::Links => "links",
        }
    }
}

/// Several leaf columns exported as one JSON column
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub name: String,
    pub kind: AggregateKind,
    pub children: Vec<Leaf>,
}

impl Aggregate {
    pub fn new(name: impl Into<String>, kind: AggregateKind) -> Self {
        Self {
            name: name.into(),
            kind,
            children: Vec::new(),
        }
    }

    pub fn push(&mut self, leaf: Leaf) {
        self.children.push(leaf);
    }

    /// Child leaf named `name`
    pub fn field(&self, name: &str) -> Option<&Leaf> {
        self.children.iter().find(|leaf| leaf.name == name)
    }

    pub fn convert(&self, row: &Row, ctx: &mut RowContext<'_>) -> ExportResult<String> {
        if self.children.is_empty() {
            return Err(ExportError::Data(format!(
                "No valid columns in '{}'",
                self.name
            )));
        }

        match self.kind {
            AggregateKind::Object => {
                let mut fields = Map::new();
                for child in &self.children {
                    if let Some(value) = child.structured_in(row, ctx)? {
                        fields.insert(child.name.clone(), value);
                    }
                }
                if fields.is_empty() {
                    return Ok(String::new());
                }
                Ok(serde_json::to_string(&Value::Object(fields))?)
            }
            AggregateKind::Array | AggregateKind::Links => {
                let mut items = Vec::with_capacity(self.children.len());
                for child in &self.children {
                    if let Some(value) = child.structured_in(row, ctx)? {
                        items.push(value);
                    }
                }
                Ok(serde_json::to_string(&Value::Array(items))?)
            }
        }
    }
}

//==============================================================================
// Resolved column
//==============================================================================

/// One output column: a standalone leaf or an aggregate
#[derive(Debug, Clone, PartialEq)]
pub enum Converter {
    Leaf(Leaf),
    Aggregate(Aggregate),
}

impl Converter {
    /// Display name written to the first header line
    pub fn name(&self) -> &str {
        match self {
            Converter::Leaf(leaf) => &leaf.name,
            Converter::Aggregate(agg) => &agg.name,
        }
    }

    /// Type label written to the second header line
    pub fn label(&self) -> &'static str {
        match self {
            Converter::Leaf(leaf) => leaf.kind.label(),
            Converter::Aggregate(agg) => agg.kind.label(),
        }
    }

    pub fn convert(&self, row: &Row, ctx: &mut RowContext<'_>) -> ExportResult<String> {
        match self {
            Converter::Leaf(leaf) => leaf.convert(row, ctx),
            Converter::Aggregate(agg) => agg.convert(row, ctx),
        }
    }
}

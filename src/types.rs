//! In-memory sheet model handed from workbook ingestion to the exporter.
//!
//! A [`Sheet`] is an ordered list of [`Row`]s; a row is indexed by column
//! position and reads past its end as [`CellValue::Blank`].

//==============================================================================
// Cells
//==============================================================================

/// RGB font color of a rich-text run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn is_black(&self) -> bool {
        self.0 == 0 && self.1 == 0 && self.2 == 0
    }

    /// Hex form used by color markup, e.g. `FF0000`
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// A formatting run: byte offset where it starts plus its font color
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub start: usize,
    pub color: Option<Rgb>,
}

/// String cell content with optional formatting runs
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RichText {
    pub text: String,
    /// Runs in ascending `start` order; empty for plain strings
    pub runs: Vec<TextRun>,
}

impl RichText {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            runs: Vec::new(),
        }
    }

    pub fn with_runs(text: impl Into<String>, runs: Vec<TextRun>) -> Self {
        Self {
            text: text.into(),
            runs,
        }
    }

    /// Text with line breaks removed and non-black runs wrapped in
    /// `<color=#RRGGBBFF>..</color>` markup
    pub fn display(&self) -> String {
        if self.runs.is_empty() {
            return strip_newlines(&self.text);
        }

        let mut out = String::with_capacity(self.text.len());
        for (i, run) in self.runs.iter().enumerate() {
            let end = self
                .runs
                .get(i + 1)
                .map(|next| next.start)
                .unwrap_or(self.text.len());
            let Some(segment) = self.text.get(run.start..end) else {
                continue;
            };
            match run.color {
                Some(color) if !color.is_black() => {
                    out.push_str(&format!("<color=#{}FF>{}</color>", color.hex(), segment));
                }
                _ => out.push_str(segment),
            }
        }
        strip_newlines(&out)
    }
}

fn strip_newlines(text: &str) -> String {
    text.chars().filter(|c| *c != '\n' && *c != '\r').collect()
}

/// Runtime kind and value of one cell
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Blank,
    Text(RichText),
    Number(f64),
    Bool(bool),
    /// Formula cell; `cached` holds the last computed result
    Formula {
        formula: String,
        cached: Box<CellValue>,
    },
    /// Spreadsheet error value such as `#DIV/0!`
    Error(String),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(RichText::plain(s))
    }

    pub fn formula(formula: impl Into<String>, cached: CellValue) -> Self {
        CellValue::Formula {
            formula: formula.into(),
            cached: Box::new(cached),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Blank)
    }

    /// Value with any formula wrapper removed
    pub fn resolved(&self) -> &CellValue {
        match self {
            CellValue::Formula { cached, .. } => cached.resolved(),
            other => other,
        }
    }

    /// Plain text of a header cell (names, type tokens, scope flags)
    pub fn header_text(&self) -> Option<String> {
        match self.resolved() {
            CellValue::Text(rich) => Some(rich.text.trim().to_string()),
            CellValue::Number(n) => Some(format_number(*n)),
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Blank | CellValue::Error(_) | CellValue::Formula { .. } => None,
        }
    }

    /// Raw text of the cell without rich-text processing
    pub fn raw_text(&self) -> String {
        match self {
            CellValue::Blank => String::new(),
            CellValue::Text(rich) => rich.text.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::Formula { cached, .. } => cached.raw_text(),
            CellValue::Error(e) => e.clone(),
        }
    }
}

/// Decimal text of a numeric cell (`1` for 1.0, `1.5` for 1.5)
pub fn format_number(n: f64) -> String {
    format!("{}", n)
}

//==============================================================================
// Rows and sheets
//==============================================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    cells: Vec<CellValue>,
}

static BLANK: CellValue = CellValue::Blank;

impl Row {
    pub fn new(cells: Vec<CellValue>) -> Self {
        Self { cells }
    }

    /// Row of plain string cells; empty strings become blanks
    pub fn from_strings<S: AsRef<str>>(values: &[S]) -> Self {
        Self::new(
            values
                .iter()
                .map(|v| {
                    let v = v.as_ref();
                    if v.is_empty() {
                        CellValue::Blank
                    } else {
                        CellValue::text(v)
                    }
                })
                .collect(),
        )
    }

    pub fn cell(&self, index: usize) -> &CellValue {
        self.cells.get(index).unwrap_or(&BLANK)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(CellValue::is_blank)
    }

    pub fn set(&mut self, index: usize, value: CellValue) {
        if self.cells.len() <= index {
            self.cells.resize(index + 1, CellValue::Blank);
        }
        self.cells[index] = value;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Row>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }
}

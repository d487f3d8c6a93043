//! Output destinations for exported tables

use crate::error::ExportResult;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Field delimiter of exported tables
pub const FIELD_DELIMITER: char = '\t';

/// Opens one named stream per exported table
pub trait OutputTarget {
    fn open(&mut self, name: &str) -> ExportResult<Box<dyn Write>>;
}

/// Write one delimited line, terminated by `\n`
pub fn write_line<S: AsRef<str>>(out: &mut dyn Write, fields: &[S]) -> io::Result<()> {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            write!(out, "{}", FIELD_DELIMITER)?;
        }
        out.write_all(field.as_ref().as_bytes())?;
    }
    out.write_all(b"\n")
}

/// Writes `<dir>/<name>`, creating the directory on first use
#[derive(Debug, Clone)]
pub struct DirectoryTarget {
    dir: PathBuf,
}

impl DirectoryTarget {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl OutputTarget for DirectoryTarget {
    fn open(&mut self, name: &str) -> ExportResult<Box<dyn Write>> {
        fs::create_dir_all(&self.dir)?;
        let file = File::create(self.path(name))?;
        Ok(Box::new(BufWriter::new(file)))
    }
}

/// Keeps every opened stream in memory, keyed by name
#[derive(Debug, Clone, Default)]
pub struct MemoryTarget {
    files: Rc<RefCell<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Contents written under `name`, if it was opened
    pub fn contents(&self, name: &str) -> Option<String> {
        self.files
            .borrow()
            .get(name)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn names(&self) -> Vec<String> {
        self.files.borrow().keys().cloned().collect()
    }
}

impl OutputTarget for MemoryTarget {
    fn open(&mut self, name: &str) -> ExportResult<Box<dyn Write>> {
        self.files.borrow_mut().insert(name.to_string(), Vec::new());
        Ok(Box::new(MemoryStream {
            name: name.to_string(),
            files: Rc::clone(&self.files),
        }))
    }
}

struct MemoryStream {
    name: String,
    files: Rc<RefCell<BTreeMap<String, Vec<u8>>>>,
}

impl Write for MemoryStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.files
            .borrow_mut()
            .entry(self.name.clone())
            .or_default()
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

//! Header and row parsing
//!
//! Lines are split positionally on the delimiter; quoting is not supported.
//! A field that is not a finite number is kept as its trimmed text, so a
//! corrupt row never aborts ingestion of the rest of the file.

use std::collections::HashMap;
use std::fmt;

/// A single field value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    /// Parse a raw field
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Number(n),
            _ => Value::Text(trimmed.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(_) => None,
        }
    }

    /// Empty text counts as "no value"; any number is present
    pub fn is_present(&self) -> bool {
        match self {
            Value::Number(_) => true,
            Value::Text(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Ordered, unique column names with a name -> index lookup
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl Header {
    /// Build a header from the first line of the file.
    ///
    /// Names are trimmed. A repeated name gets a `_2`, `_3`, ... suffix so
    /// that every column stays addressable.
    pub fn parse(line: &str, delimiter: char) -> Self {
        let mut names = Vec::new();
        let mut index = HashMap::new();

        for raw in line.split(delimiter) {
            let base = raw.trim();
            let mut name = base.to_string();
            let mut n = 2;
            while index.contains_key(&name) {
                name = format!("{}_{}", base, n);
                n += 1;
            }
            index.insert(name.clone(), names.len());
            names.push(name);
        }

        Self { names, index }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }
}

/// One record, exactly one value per header column, in header order
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Numeric value of a column, `None` for text
    pub fn number(&self, idx: usize) -> Option<f64> {
        self.values.get(idx).and_then(Value::as_f64)
    }

    /// True if the column at `idx` holds a non-empty value.
    /// An absent column (`None`) never carries a message.
    pub fn has_message(&self, idx: Option<usize>) -> bool {
        idx.and_then(|i| self.values.get(i))
            .is_some_and(Value::is_present)
    }
}

/// Parse one raw line against a header.
///
/// Missing trailing fields become empty text, surplus fields are dropped.
pub fn parse_row(header: &Header, line: &str, delimiter: char) -> Row {
    let mut fields = line.split(delimiter);
    let values = (0..header.len())
        .map(|_| fields.next().map(Value::parse).unwrap_or(Value::Text(String::new())))
        .collect();
    Row::new(values)
}

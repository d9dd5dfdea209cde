use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{ClassTableError, UnknownClass};

/// Name of the class every segmentation class list must start with.
pub const BACKGROUND_CLASS: &str = "_background_";

/// Ordered, duplicate-free class names. A class id is its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTable {
    names: Vec<String>,
    ids: HashMap<String, usize>,
}

impl ClassTable {
    pub fn new<I, S>(names: I) -> Result<Self, ClassTableError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = ClassTable {
            names: Vec::new(),
            ids: HashMap::new(),
        };
        for (index, name) in names.into_iter().enumerate() {
            let name: String = name.into();
            if table.ids.contains_key(&name) {
                return Err(ClassTableError::Duplicate { name, index });
            }
            table.ids.insert(name.clone(), table.names.len());
            table.names.push(name);
        }
        if table.names.is_empty() {
            return Err(ClassTableError::Empty);
        }
        Ok(table)
    }

    /// Parse a class list: one name per line, blank lines ignored.
    pub fn parse(text: &str) -> Result<Self, ClassTableError> {
        Self::new(text.lines().map(str::trim).filter(|line| !line.is_empty()))
    }

    pub fn from_file(path: &Path) -> Result<Self, ClassTableError> {
        Self::parse(&fs::read_to_string(path)?)
    }

    /// Check that id 0 is the background class, as segmentation requires.
    pub fn require_background(self) -> Result<Self, ClassTableError> {
        match self.names.first() {
            Some(first) if first == BACKGROUND_CLASS => Ok(self),
            first => Err(ClassTableError::MissingBackground {
                expected: BACKGROUND_CLASS,
                found: first.cloned().unwrap_or_default(),
            }),
        }
    }

    pub fn id_of(&self, name: &str) -> Result<usize, UnknownClass> {
        self.get(name).ok_or_else(|| UnknownClass(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.ids.get(name).copied()
    }

    pub fn name(&self, id: usize) -> Option<&str> {
        self.names.get(id).map(String::as_str)
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
}

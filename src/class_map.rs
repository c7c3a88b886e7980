//! Mapping from class name to YOLO class id.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

/// Class names in id order plus a name lookup.
///
/// Built from a class file where the 0-based line index is the class id.
/// A name listed twice resolves to its last line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassMap {
    names: Vec<String>,
    ids: HashMap<String, usize>,
}

impl ClassMap {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let ids = names
            .iter()
            .enumerate()
            .map(|(id, name)| (name.clone(), id))
            .collect();
        Self { names, ids }
    }

    /// Parse class file contents, one name per line.
    pub fn parse(contents: &str) -> Self {
        Self::from_names(contents.lines())
    }

    /// Read and parse a class file.
    pub fn load(path: &Path) -> io::Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(Self::parse(&contents))
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.ids.get(label).copied()
    }

    /// Class names by id, including shadowed duplicates.
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

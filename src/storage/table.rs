use crate::core::error::EngineError;
use crate::core::vector::FeatureVector;
use crate::storage::format::{TableSchema, DELIMITER};
use memmap2::Mmap;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Feature table is not valid UTF-8")]
    Utf8,
    #[error("Line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Line {line}: expected {expected} values, found {found}")]
    ColumnCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("Line {line}: duplicate id '{id}'")]
    DuplicateId { line: usize, id: String },
    #[error("Feature table has no rows")]
    Empty,
    #[error("Invalid config: {0}")]
    Config(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// An in-memory, read-only feature table. Rows keep file order, which is
/// the order ranking ties are resolved in.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    dimension: usize,
    vectors: Vec<FeatureVector>,
    index: HashMap<String, usize>,
}

impl FeatureTable {
    pub fn from_vectors(vectors: Vec<FeatureVector>) -> Result<Self, StorageError> {
        let first = vectors.first().ok_or(StorageError::Empty)?;
        let dimension = first.dimension();

        let mut index = HashMap::with_capacity(vectors.len());
        for (row, vector) in vectors.iter().enumerate() {
            if vector.dimension() != dimension {
                return Err(StorageError::ColumnCount {
                    line: row + 1,
                    expected: dimension,
                    found: vector.dimension(),
                });
            }
            if index.insert(vector.id().to_string(), row).is_some() {
                return Err(StorageError::DuplicateId {
                    line: row + 1,
                    id: vector.id().to_string(),
                });
            }
        }

        Ok(Self {
            dimension,
            vectors,
            index,
        })
    }

    /// Maps the file and parses it. The first line is a header and is skipped.
    pub fn load(path: &Path) -> Result<Self, StorageError> {
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Err(StorageError::Empty);
        }
        let mmap = unsafe { Mmap::map(&file)? };
        let text = std::str::from_utf8(&mmap).map_err(|_| StorageError::Utf8)?;

        let table = Self::parse(text)?;
        info!(path = %path.display(), rows = table.len(), dimension = table.dimension(), "Loaded feature table");
        Ok(table)
    }

    pub fn parse(text: &str) -> Result<Self, StorageError> {
        let mut vectors = Vec::new();
        let mut dimension = None;
        let mut index = HashMap::new();

        for (i, raw) in text.lines().enumerate().skip(1) {
            let line = i + 1;
            let raw = raw.trim_end_matches('\r');
            if raw.trim().is_empty() {
                continue;
            }

            let mut fields: Vec<&str> = raw.split(DELIMITER).map(str::trim).collect();
            // Writers that end every field with a delimiter leave an empty tail.
            if fields.len() > 1 && fields.last().is_some_and(|f| f.is_empty()) {
                fields.pop();
            }

            let id = fields[0];
            if id.is_empty() {
                return Err(StorageError::Parse {
                    line,
                    message: "missing id".to_string(),
                });
            }

            let values = fields[1..]
                .iter()
                .map(|f| {
                    f.parse::<f32>().map_err(|e| StorageError::Parse {
                        line,
                        message: format!("invalid value '{}': {}", f, e),
                    })
                })
                .collect::<Result<Vec<f32>, _>>()?;

            let expected = *dimension.get_or_insert(values.len());
            if values.len() != expected {
                return Err(StorageError::ColumnCount {
                    line,
                    expected,
                    found: values.len(),
                });
            }
            if index.insert(id.to_string(), vectors.len()).is_some() {
                return Err(StorageError::DuplicateId {
                    line,
                    id: id.to_string(),
                });
            }
            vectors.push(FeatureVector::new(id, values));
        }

        match dimension {
            Some(dimension) => Ok(Self {
                dimension,
                vectors,
                index,
            }),
            None => Err(StorageError::Empty),
        }
    }

    pub fn save(&self, path: &Path, schema: &TableSchema) -> Result<(), StorageError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer, schema)?;
        writer.flush()?;
        Ok(())
    }

    pub fn write_to<W: Write>(&self, writer: &mut W, schema: &TableSchema) -> Result<(), StorageError> {
        if schema.dimension() != self.dimension {
            return Err(EngineError::DimensionMismatch {
                expected: self.dimension,
                found: schema.dimension(),
            }
            .into());
        }

        writeln!(writer, "{}", schema.header())?;
        for vector in &self.vectors {
            write!(writer, "{}", vector.id())?;
            for value in vector.values() {
                write!(writer, "{}{}", DELIMITER, value)?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&FeatureVector> {
        self.index.get(id).map(|&row| &self.vectors[row])
    }

    pub fn vectors(&self) -> &[FeatureVector] {
        &self.vectors
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.vectors.iter().map(|v| v.id())
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};

use csv::{ReaderBuilder, Trim, WriterBuilder};
use log::trace;

use crate::error::{FLiESError, FLiESResult};

/// A table column, either as read from the file or already numeric
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Text(Vec<String>),
    Numeric(Vec<f64>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Text(values) => values.len(),
            Column::Numeric(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cell(&self, row: usize) -> String {
        match self {
            Column::Text(values) => values[row].clone(),
            Column::Numeric(values) => values[row].to_string(),
        }
    }
}

/// Parse one numeric cell: blanks and NaN are missing values
pub fn parse_cell(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() || text.eq_ignore_ascii_case("nan") {
        return Some(f64::NAN);
    }
    text.parse::<f64>().ok()
}

/// Ordered set of named, equally long columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_reader<R: Read>(reader: R) -> FLiESResult<Self> {
        let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
        let names: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();
        let mut values: Vec<Vec<String>> = vec![vec![]; names.len()];

        for result in reader.records() {
            let record = result?;
            for (column, cell) in values.iter_mut().zip(record.iter()) {
                column.push(cell.to_owned());
            }
        }

        let columns = values.into_iter().map(Column::Text).collect();
        let table = Self { names, columns };
        trace!(
            "Read table with {} columns and {} rows",
            table.names.len(),
            table.n_rows()
        );
        Ok(table)
    }

    pub fn from_path(path: impl AsRef<Path>) -> FLiESResult<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> FLiESResult<()> {
        let mut writer = WriterBuilder::new().from_writer(writer);
        writer.write_record(&self.names)?;
        for row in 0..self.n_rows() {
            writer.write_record(self.columns.iter().map(|column| column.cell(row)))?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn to_path(&self, path: impl AsRef<Path>) -> FLiESResult<()> {
        let file = File::create(path)?;
        self.to_writer(file)
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|index| &self.columns[index])
    }

    fn require(&self, name: &str) -> FLiESResult<&Column> {
        self.column(name)
            .ok_or_else(|| FLiESError::MissingColumn(vec![name.to_owned()]))
    }

    /// Cells of a column as text
    pub fn text(&self, name: &str) -> FLiESResult<Vec<String>> {
        let column = self.require(name)?;
        Ok((0..column.len()).map(|row| column.cell(row)).collect())
    }

    /// Cells of a column as numbers, parsing text columns on demand
    pub fn numeric(&self, name: &str) -> FLiESResult<Vec<f64>> {
        match self.require(name)? {
            Column::Numeric(values) => Ok(values.clone()),
            Column::Text(values) => values
                .iter()
                .enumerate()
                .map(|(row, text)| {
                    parse_cell(text).ok_or_else(|| FLiESError::ValueParse {
                        column: name.to_owned(),
                        row,
                        value: text.clone(),
                    })
                })
                .collect(),
        }
    }

    /// Add a column at the end, or replace the column with the same name
    pub fn insert(&mut self, name: &str, column: Column) -> FLiESResult<()> {
        if !self.columns.is_empty() && column.len() != self.n_rows() {
            return Err(FLiESError::LengthMismatch {
                column: name.to_owned(),
                expected: self.n_rows(),
                got: column.len(),
            });
        }
        match self.names.iter().position(|n| n == name) {
            Some(index) => self.columns[index] = column,
            None => {
                self.names.push(name.to_owned());
                self.columns.push(column);
            }
        }
        Ok(())
    }

    pub fn insert_numeric(&mut self, name: &str, values: Vec<f64>) -> FLiESResult<()> {
        self.insert(name, Column::Numeric(values))
    }
}

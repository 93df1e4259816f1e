use std::collections::HashMap;
use std::fmt::Display;

use parse_display::Display;
use serde::{Deserialize, Serialize};
use terrors::OneOf;

use crate::{
    command::{Command, ColumnDefinition},
    ColumnType, InvalidValueError, Value,
};

#[derive(Debug, Display, Clone)]
#[display("Table \"{0}\" does not exist.")]
pub struct NoSuchTableError(String);

#[derive(Debug, Display, Clone)]
#[display("Table \"{0}\" already exists.")]
pub struct TableExistsError(String);

#[derive(Debug, Display, Clone)]
#[display("Table \"{0}\" has no primary key.")]
pub struct NoPrimaryKeyError(String);

#[derive(Debug, Display, Clone)]
#[display("Primary key {0} already exists.")]
pub struct DuplicateKeyError(Value);

#[derive(Debug, Display, Clone)]
#[display("No record with primary key {0}.")]
pub struct RecordNotFoundError(Value);

/// The ordered column declarations of one table. Fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<ColumnDefinition>,
}

impl Schema {
    pub fn new(columns: Vec<ColumnDefinition>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns.iter()
    }

    pub fn ty_of(&self, column: &str) -> Option<ColumnType> {
        self.columns
            .iter()
            .find(|definition| definition.identifier == column)
            .map(|definition| definition.ty)
    }

}

/// One typed row, built against exactly one schema.
///
/// Every schema column appears as a field; a column the source data omitted
/// holds [Value::Nil]. Reading a column that is not in the record at all
/// yields `None`, which keeps "present but nil" and "not a field" apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    fields: HashMap<String, Value>,
}

impl Record {
    pub fn new(
        raw_fields: &HashMap<String, String>,
        schema: &Schema,
    ) -> Result<Self, InvalidValueError> {
        let mut fields = HashMap::new();
        for ColumnDefinition { identifier, ty } in schema.columns() {
            let value = match raw_fields.get(identifier) {
                Some(raw) => Value::coerce(raw, *ty)?,
                None => Value::Nil,
            };

            fields.insert(identifier.clone(), value);
        }

        Ok(Self { fields })
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    /// Overwrites a field without consulting any schema. Construction and
    /// [Table::update] are the places that enforce one.
    pub fn set(&mut self, column: impl Into<String>, value: Value) {
        self.fields.insert(column.into(), value);
    }

    pub fn fields(&self) -> &HashMap<String, Value> {
        &self.fields
    }
}

/// Declared reference to another table. Bookkeeping only, never enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub column: String,
    pub references_table: String,
    pub references_column: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    name: String,
    schema: Schema,
    primary_key: Option<String>,
    #[serde(with = "index_serde")]
    records: HashMap<Value, Record>,
    foreign_keys: Vec<ForeignKey>,
}

impl Table {
    pub fn new(name: impl Into<String>, schema: Schema, primary_key: Option<String>) -> Self {
        Self {
            name: name.into(),
            schema,
            primary_key,
            records: HashMap::new(),
            foreign_keys: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn primary_key(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(&self, key: &Value) -> Option<&Record> {
        self.records.get(key)
    }

    /// Iteration order is the index's own; nothing guarantees it stable.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    pub fn add_foreign_key(&mut self, foreign_key: ForeignKey) {
        self.foreign_keys.push(foreign_key);
    }

    pub fn foreign_keys(&self) -> &[ForeignKey] {
        &self.foreign_keys
    }

    /// Coerces a raw id with the primary key column's type. A primary key
    /// declared without a matching schema column coerces as a plain string.
    fn key_of(
        &self,
        raw_id: &str,
    ) -> Result<Value, OneOf<(NoPrimaryKeyError, InvalidValueError)>> {
        let Some(primary_key) = &self.primary_key else {
            return Err(OneOf::new(NoPrimaryKeyError(self.name.clone())));
        };

        let ty = self.schema.ty_of(primary_key).unwrap_or(ColumnType::Str);
        Value::coerce(raw_id, ty).map_err(OneOf::new)
    }

    /// A record without the primary key field indexes under [Value::Nil],
    /// so a second such insert collides.
    pub fn insert(
        &mut self,
        record: Record,
    ) -> Result<(), OneOf<(NoPrimaryKeyError, DuplicateKeyError)>> {
        let Some(primary_key) = &self.primary_key else {
            return Err(OneOf::new(NoPrimaryKeyError(self.name.clone())));
        };

        let key = record.get(primary_key).cloned().unwrap_or(Value::Nil);
        if self.records.contains_key(&key) {
            return Err(OneOf::new(DuplicateKeyError(key)));
        }

        self.records.insert(key, record);
        Ok(())
    }

    /// Coerces and applies every change whose column is in the schema;
    /// columns outside the schema are ignored without error.
    pub fn update(
        &mut self,
        raw_id: &str,
        changes: &HashMap<String, String>,
    ) -> Result<(), OneOf<(NoPrimaryKeyError, InvalidValueError, RecordNotFoundError)>> {
        let key = self.key_of(raw_id).map_err(OneOf::broaden)?;
        let Some(record) = self.records.get_mut(&key) else {
            return Err(OneOf::new(RecordNotFoundError(key)));
        };

        for (column, raw) in changes {
            let Some(ty) = self.schema.ty_of(column) else {
                continue;
            };

            let value = Value::coerce(raw, ty).map_err(OneOf::new)?;
            record.set(column.clone(), value);
        }

        Ok(())
    }

    pub fn delete(
        &mut self,
        raw_id: &str,
    ) -> Result<Record, OneOf<(NoPrimaryKeyError, InvalidValueError, RecordNotFoundError)>> {
        let key = self.key_of(raw_id).map_err(OneOf::broaden)?;
        let Some(record) = self.records.remove(&key) else {
            return Err(OneOf::new(RecordNotFoundError(key)));
        };

        Ok(record)
    }

    /// Full scan. A record matches when every condition column holds exactly
    /// the condition value; a field the record does not carry matches nothing.
    pub fn query(&self, conditions: &HashMap<String, Value>) -> Vec<&Record> {
        self.records
            .values()
            .filter(|record| {
                conditions
                    .iter()
                    .all(|(column, value)| record.get(column) == Some(value))
            })
            .collect()
    }

    /// Nested-loop equality join over every record pair. Both records must
    /// carry `on`; the merged row takes all fields of both, with `other`
    /// winning every shared column, `on` included.
    pub fn join(&self, other: &Table, on: &str) -> Vec<HashMap<String, Value>> {
        let mut rows = Vec::new();
        for record in self.records.values() {
            for other_record in other.records.values() {
                let (Some(lhs), Some(rhs)) = (record.get(on), other_record.get(on)) else {
                    continue;
                };
                if lhs != rhs {
                    continue;
                }

                let mut merged = record.fields().clone();
                for (column, value) in other_record.fields() {
                    merged.insert(column.clone(), value.clone());
                }

                rows.push(merged);
            }
        }

        rows
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let headers: Vec<String> = self
            .schema
            .columns()
            .map(|definition| definition.identifier.clone())
            .collect();
        let rows: Vec<Vec<String>> = self
            .records()
            .map(|record| {
                headers
                    .iter()
                    .map(|column| record.get(column).unwrap_or(&Value::Nil).to_string())
                    .collect()
            })
            .collect();

        write_grid(f, &headers, &rows)
    }
}

fn write_grid(
    f: &mut std::fmt::Formatter<'_>,
    headers: &[String],
    rows: &[Vec<String>],
) -> std::fmt::Result {
    const PADDING: usize = 1;

    let mut max_widths = Vec::with_capacity(headers.len());
    for (i, header) in headers.iter().enumerate() {
        let max_width = rows
            .iter()
            .fold(header.len(), |acc, row| acc.max(row[i].len()));
        max_widths.push(max_width);
    }

    write!(f, "|")?;
    for (header, max_width) in headers.iter().zip(&max_widths) {
        for _ in 0..PADDING {
            write!(f, " ")?;
        }

        write!(f, "{header}")?;
        for _ in 0..max_width - header.len() + PADDING {
            write!(f, " ")?;
        }

        write!(f, "|")?;
    }
    writeln!(f)?;
    write!(f, "+")?;
    for max_width in &max_widths {
        for _ in 0..max_width + PADDING * 2 {
            write!(f, "-")?;
        }

        write!(f, "+")?;
    }

    for row in rows {
        writeln!(f)?;
        write!(f, "|")?;
        for (cell, max_width) in row.iter().zip(&max_widths) {
            for _ in 0..PADDING {
                write!(f, " ")?;
            }

            write!(f, "{cell}")?;
            for _ in 0..max_width - cell.len() + PADDING {
                write!(f, " ")?;
            }

            write!(f, "|")?;
        }
    }

    Ok(())
}

pub type CommandRunError = OneOf<(
    NoSuchTableError,
    TableExistsError,
    NoPrimaryKeyError,
    DuplicateKeyError,
    RecordNotFoundError,
    InvalidValueError,
)>;

#[derive(Debug, Clone)]
pub enum CommandRunOutput {
    TableCreated {
        table: String,
    },
    RecordAdded {
        table: String,
    },
    RecordUpdated {
        table: String,
        id: String,
    },
    RecordRemoved {
        table: String,
        id: String,
    },
    Joined {
        columns: Vec<String>,
        rows: Vec<HashMap<String, Value>>,
    },
    Listing {
        table: Table,
    },
}

impl Display for CommandRunOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandRunOutput::TableCreated { table } => {
                write!(f, "Table \"{table}\" created.")
            }
            CommandRunOutput::RecordAdded { table } => {
                write!(f, "Record added to \"{table}\".")
            }
            CommandRunOutput::RecordUpdated { table, id } => {
                write!(f, "Record \"{id}\" updated in \"{table}\".")
            }
            CommandRunOutput::RecordRemoved { table, id } => {
                write!(f, "Record \"{id}\" removed from \"{table}\".")
            }
            CommandRunOutput::Joined { columns, rows } => {
                let cells: Vec<Vec<String>> = rows
                    .iter()
                    .map(|row| {
                        columns
                            .iter()
                            .map(|column| row.get(column).unwrap_or(&Value::Nil).to_string())
                            .collect()
                    })
                    .collect();
                write_grid(f, columns, &cells)
            }
            CommandRunOutput::Listing { table } => write!(f, "{table}"),
        }
    }
}

/// Marker pushed by the transaction stubs. Carries nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionMarker;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    name: String,
    tables: HashMap<String, Table>,
    #[serde(skip)]
    transactions: Vec<TransactionMarker>,
}

impl Database {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: HashMap::new(),
            transactions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn create_table(
        &mut self,
        name: &str,
        schema: Schema,
        primary_key: Option<String>,
    ) -> Result<(), TableExistsError> {
        if self.tables.contains_key(name) {
            return Err(TableExistsError(name.to_owned()));
        }

        self.tables
            .insert(name.to_owned(), Table::new(name, schema, primary_key));
        Ok(())
    }

    /// Absence is not an error here; command execution turns it into one.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(name)
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    // Transactions are unimplemented: begin/commit/rollback move markers on
    // a stack that nothing reads. No isolation, no undo.
    pub fn begin_transaction(&mut self) {
        self.transactions.push(TransactionMarker);
    }

    pub fn commit_transaction(&mut self) {
        self.transactions.pop();
    }

    pub fn rollback_transaction(&mut self) {
        self.transactions.pop();
    }

    pub fn transaction_depth(&self) -> usize {
        self.transactions.len()
    }

    pub fn run_command(
        &mut self,
        command: Command,
    ) -> Result<CommandRunOutput, CommandRunError> {
        match command {
            Command::Build {
                table,
                definitions,
                primary_key,
            } => {
                self.create_table(&table, Schema::new(definitions), primary_key)
                    .map_err(OneOf::new)?;
                Ok(CommandRunOutput::TableCreated { table })
            }
            Command::Insert { table, fields } => {
                let Some(target) = self.table_mut(&table) else {
                    return Err(OneOf::new(NoSuchTableError(table)));
                };

                let record = Record::new(&fields, target.schema()).map_err(OneOf::new)?;
                target.insert(record).map_err(OneOf::broaden)?;
                Ok(CommandRunOutput::RecordAdded { table })
            }
            Command::Update { table, id, changes } => {
                let Some(target) = self.table_mut(&table) else {
                    return Err(OneOf::new(NoSuchTableError(table)));
                };

                target.update(&id, &changes).map_err(OneOf::broaden)?;
                Ok(CommandRunOutput::RecordUpdated { table, id })
            }
            Command::Delete { table, id } => {
                let Some(target) = self.table_mut(&table) else {
                    return Err(OneOf::new(NoSuchTableError(table)));
                };

                target.delete(&id).map_err(OneOf::broaden)?;
                Ok(CommandRunOutput::RecordRemoved { table, id })
            }
            Command::Join {
                left,
                right,
                column,
            } => {
                let Some(lhs) = self.table(&left) else {
                    return Err(OneOf::new(NoSuchTableError(left)));
                };
                let Some(rhs) = self.table(&right) else {
                    return Err(OneOf::new(NoSuchTableError(right)));
                };

                let rows = lhs.join(rhs, &column);
                let mut columns: Vec<String> = lhs
                    .schema()
                    .columns()
                    .map(|definition| definition.identifier.clone())
                    .collect();
                for definition in rhs.schema().columns() {
                    if !columns.contains(&definition.identifier) {
                        columns.push(definition.identifier.clone());
                    }
                }

                Ok(CommandRunOutput::Joined { columns, rows })
            }
            Command::Show { table } => {
                let Some(target) = self.table(&table) else {
                    return Err(OneOf::new(NoSuchTableError(table)));
                };

                Ok(CommandRunOutput::Listing {
                    table: target.clone(),
                })
            }
        }
    }
}

// The index is keyed by typed values, which JSON objects cannot express;
// snapshots carry it as a list of key/record pairs instead.
mod index_serde {
    use std::collections::HashMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{Record, Value};

    pub fn serialize<S: Serializer>(
        index: &HashMap<Value, Record>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let pairs: Vec<(&Value, &Record)> = index.iter().collect();
        pairs.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<HashMap<Value, Record>, D::Error> {
        let pairs = Vec::<(Value, Record)>::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}

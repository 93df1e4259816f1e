pub use crate::command::{ColumnDefinition, Command};
pub use crate::database::{
    CommandRunOutput, Database, ForeignKey, Record, Schema, Table,
};
pub use crate::parser::{parse, ParseError};
pub use crate::session::{ExecuteError, Session};
pub use crate::store::{Store, StoreError};
pub use crate::{ColumnType, InvalidValueError, Value};

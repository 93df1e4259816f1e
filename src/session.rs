use std::fmt::Display;
use std::path::Path;

use crate::{
    database::{CommandRunError, CommandRunOutput, Database},
    parser::{self, ParseError},
    store::{Store, StoreError},
};

/// A database bound to its snapshot file: the unit the REPL talks to.
pub struct Session {
    database: Database,
    store: Store,
}

impl Session {
    /// Restores the snapshot at `path` when one exists, otherwise starts
    /// `name` empty.
    pub fn open(name: &str, path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let store = Store::new(path);
        let database = match store.restore()? {
            Some(database) => database,
            None => Database::new(name),
        };

        Ok(Self { database, store })
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Parses and runs one command, then snapshots the whole database.
    /// Every command snapshots, `show` included; a failed command does not.
    pub fn execute(&mut self, line: &str) -> Result<CommandRunOutput, ExecuteError> {
        let command = parser::parse(line)?;
        let output = self.database.run_command(command)?;
        self.store.persist(&self.database)?;
        Ok(output)
    }
}

#[derive(Debug)]
pub enum ExecuteError {
    Parse(ParseError),
    Run(CommandRunError),
    Store(StoreError),
}

impl From<ParseError> for ExecuteError {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

impl From<CommandRunError> for ExecuteError {
    fn from(err: CommandRunError) -> Self {
        Self::Run(err)
    }
}

impl From<StoreError> for ExecuteError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl Display for ExecuteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecuteError::Parse(err) => write!(f, "{err}"),
            ExecuteError::Run(err) => write!(f, "{err}"),
            ExecuteError::Store(err) => write!(f, "{err}"),
        }
    }
}

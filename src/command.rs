use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ColumnType;

/// A fully parsed command, one per input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Build {
        table: String,
        definitions: Vec<ColumnDefinition>,
        primary_key: Option<String>,
    },
    Insert {
        table: String,
        fields: HashMap<String, String>,
    },
    Update {
        table: String,
        id: String,
        changes: HashMap<String, String>,
    },
    Delete {
        table: String,
        id: String,
    },
    Join {
        left: String,
        right: String,
        column: String,
    },
    Show {
        table: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub identifier: String,
    pub ty: ColumnType,
}

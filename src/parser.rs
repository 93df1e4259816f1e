use std::collections::HashMap;

use parse_display::Display;

use crate::{
    command::{ColumnDefinition, Command},
    lexer::{self, TokenCursor},
    ColumnType,
};

const BUILD_SHAPE: &str = "build <table> <column> <type> ... [primarykey <column>]";
const INSERT_SHAPE: &str = "add in <table> <column> <value> ...";
const UPDATE_SHAPE: &str = "change <table> <id> <column> <value> ...";
const DELETE_SHAPE: &str = "kick out <table> <id>";
const JOIN_SHAPE: &str = "mix it up <table1> <table2> <column>";
const SHOW_SHAPE: &str = "show <table>";

#[derive(Debug, Display, Clone, PartialEq)]
pub enum ParseError {
    #[display("Empty command.")]
    Empty,
    #[display("Unknown command \"{0}\".")]
    UnknownCommand(String),
    #[display("Expected: {0}.")]
    Malformed(String),
    #[display("Unclosed quote in value for column \"{column}\".")]
    UnclosedQuote { column: String },
}

/// Parses one line of input into a [Command].
///
/// Command words are matched case-insensitively; table and column names are
/// taken as written.
pub fn parse(src: &str) -> Result<Command, ParseError> {
    let mut tokens = TokenCursor::new(lexer::tokenize(src));
    let Some(word) = tokens.next() else {
        return Err(ParseError::Empty);
    };

    match word.to_lowercase().as_str() {
        "build" => build(&mut tokens),
        "add" => {
            expect_word(&mut tokens, "in", INSERT_SHAPE)?;
            insert(&mut tokens)
        }
        "change" => update(&mut tokens),
        "kick" => {
            expect_word(&mut tokens, "out", DELETE_SHAPE)?;
            delete(&mut tokens)
        }
        "mix" => {
            expect_word(&mut tokens, "it", JOIN_SHAPE)?;
            expect_word(&mut tokens, "up", JOIN_SHAPE)?;
            join(&mut tokens)
        }
        "show" => show(&mut tokens),
        _ => Err(ParseError::UnknownCommand(word)),
    }
}

fn expect_word(tokens: &mut TokenCursor, expected: &str, shape: &str) -> Result<(), ParseError> {
    match tokens.next() {
        Some(word) if word.eq_ignore_ascii_case(expected) => Ok(()),
        _ => Err(ParseError::Malformed(shape.to_owned())),
    }
}

fn build(tokens: &mut TokenCursor) -> Result<Command, ParseError> {
    let Some(table) = tokens.next() else {
        return Err(ParseError::Malformed(BUILD_SHAPE.to_owned()));
    };
    if tokens.remaining() < 2 {
        return Err(ParseError::Malformed(BUILD_SHAPE.to_owned()));
    }

    let mut definitions = Vec::new();
    let mut primary_key = None;
    while let Some(word) = tokens.next() {
        if word.eq_ignore_ascii_case("primarykey") {
            let Some(column) = tokens.next() else {
                return Err(ParseError::Malformed(
                    "a column name after primarykey".to_owned(),
                ));
            };

            // Words after the primary key column are ignored.
            primary_key = Some(column);
            break;
        }

        let Some(ty) = tokens.next() else {
            return Err(ParseError::Malformed(format!(
                "a type for column \"{word}\""
            )));
        };

        definitions.push(ColumnDefinition {
            identifier: word,
            ty: type_tag(&ty),
        });
    }

    Ok(Command::Build {
        table,
        definitions,
        primary_key,
    })
}

// Any unrecognized type word falls back to the generic string tag.
fn type_tag(word: &str) -> ColumnType {
    match word.to_lowercase().as_str() {
        "int" => ColumnType::Int,
        "float" => ColumnType::Float,
        "boolean" => ColumnType::Bool,
        "date" => ColumnType::Date,
        "char" => ColumnType::Char,
        "text" => ColumnType::Text,
        _ => ColumnType::Str,
    }
}

fn insert(tokens: &mut TokenCursor) -> Result<Command, ParseError> {
    let Some(table) = tokens.next() else {
        return Err(ParseError::Malformed(INSERT_SHAPE.to_owned()));
    };
    if tokens.remaining() < 2 {
        return Err(ParseError::Malformed(INSERT_SHAPE.to_owned()));
    }

    let fields = field_pairs(tokens)?;
    Ok(Command::Insert { table, fields })
}

fn update(tokens: &mut TokenCursor) -> Result<Command, ParseError> {
    let (Some(table), Some(id)) = (tokens.next(), tokens.next()) else {
        return Err(ParseError::Malformed(UPDATE_SHAPE.to_owned()));
    };
    if tokens.remaining() < 2 {
        return Err(ParseError::Malformed(UPDATE_SHAPE.to_owned()));
    }

    let changes = field_pairs(tokens)?;
    Ok(Command::Update { table, id, changes })
}

/// Reads `<column> <value>` pairs until the words run out. Values get the
/// quoted re-join treatment from the lexer; column names do not.
fn field_pairs(tokens: &mut TokenCursor) -> Result<HashMap<String, String>, ParseError> {
    let mut fields = HashMap::new();
    while let Some(column) = tokens.next() {
        match tokens.next_value() {
            Some(Ok(value)) => {
                fields.insert(column, value);
            }
            Some(Err(lexer::UnclosedQuoteError)) => {
                return Err(ParseError::UnclosedQuote { column });
            }
            None => {
                return Err(ParseError::Malformed(format!(
                    "a value for column \"{column}\""
                )));
            }
        }
    }

    Ok(fields)
}

fn delete(tokens: &mut TokenCursor) -> Result<Command, ParseError> {
    let (Some(table), Some(id)) = (tokens.next(), tokens.next()) else {
        return Err(ParseError::Malformed(DELETE_SHAPE.to_owned()));
    };
    if tokens.next().is_some() {
        return Err(ParseError::Malformed(DELETE_SHAPE.to_owned()));
    }

    Ok(Command::Delete { table, id })
}

fn join(tokens: &mut TokenCursor) -> Result<Command, ParseError> {
    let (Some(left), Some(right), Some(column)) = (tokens.next(), tokens.next(), tokens.next())
    else {
        return Err(ParseError::Malformed(JOIN_SHAPE.to_owned()));
    };
    if tokens.next().is_some() {
        return Err(ParseError::Malformed(JOIN_SHAPE.to_owned()));
    }

    Ok(Command::Join {
        left,
        right,
        column,
    })
}

fn show(tokens: &mut TokenCursor) -> Result<Command, ParseError> {
    let Some(table) = tokens.next() else {
        return Err(ParseError::Malformed(SHOW_SHAPE.to_owned()));
    };
    if tokens.next().is_some() {
        return Err(ParseError::Malformed(SHOW_SHAPE.to_owned()));
    }

    Ok(Command::Show { table })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_with_primary_key() {
        let command = parse("build users name text age int primarykey name").unwrap();
        assert_eq!(
            command,
            Command::Build {
                table: "users".to_owned(),
                definitions: vec![
                    ColumnDefinition {
                        identifier: "name".to_owned(),
                        ty: ColumnType::Text,
                    },
                    ColumnDefinition {
                        identifier: "age".to_owned(),
                        ty: ColumnType::Int,
                    },
                ],
                primary_key: Some("name".to_owned()),
            }
        );
    }

    #[test]
    fn build_without_primary_key() {
        let Command::Build { primary_key, .. } = parse("build notes body text").unwrap() else {
            panic!("expected a build command");
        };
        assert_eq!(primary_key, None);
    }

    #[test]
    fn build_type_words_are_case_insensitive() {
        let Command::Build { definitions, .. } =
            parse("build t a INT b Boolean c DATE d CHAR e FLOAT").unwrap()
        else {
            panic!("expected a build command");
        };
        let tags: Vec<ColumnType> = definitions.into_iter().map(|def| def.ty).collect();
        assert_eq!(
            tags,
            [
                ColumnType::Int,
                ColumnType::Bool,
                ColumnType::Date,
                ColumnType::Char,
                ColumnType::Float,
            ]
        );
    }

    #[test]
    fn unknown_type_word_falls_back_to_str() {
        let Command::Build { definitions, .. } = parse("build t a varchar").unwrap() else {
            panic!("expected a build command");
        };
        assert_eq!(definitions[0].ty, ColumnType::Str);
    }

    #[test]
    fn command_words_are_case_insensitive() {
        assert!(parse("BUILD t a int").is_ok());
        assert!(parse("Add In t a 1").is_ok());
        assert!(parse("KICK OUT t 1").is_ok());
        assert!(parse("Mix It Up a b c").is_ok());
    }

    #[test]
    fn insert_collects_pairs() {
        let Command::Insert { table, fields } = parse("add in users name 'Ada' age 30").unwrap()
        else {
            panic!("expected an insert command");
        };
        assert_eq!(table, "users");
        assert_eq!(fields["name"], "Ada");
        assert_eq!(fields["age"], "30");
    }

    #[test]
    fn update_shape() {
        let Command::Update { table, id, changes } = parse("change users Ada age 31").unwrap()
        else {
            panic!("expected an update command");
        };
        assert_eq!(table, "users");
        assert_eq!(id, "Ada");
        assert_eq!(changes["age"], "31");
    }

    #[test]
    fn delete_and_join_and_show_arity() {
        assert_eq!(
            parse("kick out users Ada").unwrap(),
            Command::Delete {
                table: "users".to_owned(),
                id: "Ada".to_owned(),
            }
        );
        assert_eq!(
            parse("mix it up t1 t2 id").unwrap(),
            Command::Join {
                left: "t1".to_owned(),
                right: "t2".to_owned(),
                column: "id".to_owned(),
            }
        );
        assert_eq!(
            parse("show users").unwrap(),
            Command::Show {
                table: "users".to_owned(),
            }
        );

        assert!(matches!(
            parse("kick out users"),
            Err(ParseError::Malformed(_))
        ));
        assert!(matches!(
            parse("kick out users Ada extra"),
            Err(ParseError::Malformed(_))
        ));
        assert!(matches!(parse("mix it up t1 t2"), Err(ParseError::Malformed(_))));
        assert!(matches!(parse("show"), Err(ParseError::Malformed(_))));
        assert!(matches!(parse("show a b"), Err(ParseError::Malformed(_))));
    }

    #[test]
    fn secondary_words_are_checked() {
        assert!(matches!(parse("add users a 1"), Err(ParseError::Malformed(_))));
        assert!(matches!(parse("kick users 1"), Err(ParseError::Malformed(_))));
        assert!(matches!(parse("mix up it a b c"), Err(ParseError::Malformed(_))));
        assert!(matches!(parse("kick"), Err(ParseError::Malformed(_))));
    }

    #[test]
    fn unknown_and_empty_commands() {
        assert_eq!(
            parse("frobnicate users"),
            Err(ParseError::UnknownCommand("frobnicate".to_owned()))
        );
        assert_eq!(parse(""), Err(ParseError::Empty));
        assert_eq!(parse("   "), Err(ParseError::Empty));
    }

    #[test]
    fn quoted_value_spans_words() {
        let Command::Insert { fields, .. } = parse("add in users name 'New York' age 1").unwrap()
        else {
            panic!("expected an insert command");
        };
        assert_eq!(fields["name"], "New York");
    }

    #[test]
    fn unclosed_quote_names_the_column() {
        assert_eq!(
            parse("add in users name 'Ada age 30"),
            Err(ParseError::UnclosedQuote {
                column: "name".to_owned(),
            })
        );
    }

    #[test]
    fn missing_value_names_the_column() {
        assert_eq!(
            parse("change users Ada age 31 name"),
            Err(ParseError::Malformed("a value for column \"name\"".to_owned()))
        );
    }

    #[test]
    fn build_requires_primary_key_name() {
        assert!(matches!(
            parse("build users name text primarykey"),
            Err(ParseError::Malformed(_))
        ));
    }
}

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, ParseError};
use crate::response::Response;
use crate::store::Store;

/// Get the value of `key`. If the key does not exist the `(nil)` marker is
/// returned.
#[derive(Debug, PartialEq)]
pub struct Get {
    pub key: String,
}

impl Executable for Get {
    fn exec(self, store: &Store) -> Response {
        match store.get(&self.key) {
            Some(value) => Response::Value(value),
            None => Response::Nil,
        }
    }
}

impl TryFrom<&mut CommandParser<'_>> for Get {
    type Error = ParseError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser
            .next_token()
            .ok_or(ParseError::WrongArity { command: "GET" })?;
        parser.finish("GET")?;

        Ok(Self {
            key: key.to_string(),
        })
    }
}

use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, ParseError};
use crate::response::Response;
use crate::store::Store;

/// Set `key` to `value`, overwriting any previous value. Always answers
/// `OK`; whether the write created or updated the entry is not observable
/// on the wire.
#[derive(Debug, PartialEq)]
pub struct Set {
    pub key: String,
    pub value: Bytes,
}

impl Executable for Set {
    fn exec(self, store: &Store) -> Response {
        store.set(self.key, self.value);
        Response::Ok
    }
}

impl TryFrom<&mut CommandParser<'_>> for Set {
    type Error = ParseError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser
            .next_token()
            .ok_or(ParseError::WrongArity { command: "SET" })?
            .to_string();
        let value = parser
            .next_token()
            .ok_or(ParseError::WrongArity { command: "SET" })?;
        let value = Bytes::copy_from_slice(value.as_bytes());

        // Values are single tokens; `SET k a b` is malformed rather than
        // an implicit join of the tail.
        parser.finish("SET")?;

        Ok(Self { key, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Line;
    use crate::commands::Command;

    #[test]
    fn set_and_overwrite() {
        let store = Store::new();

        let cmd = Command::try_from(Line::from("SET key1 first")).unwrap();
        assert_eq!(cmd.exec(&store), Response::Ok);
        assert_eq!(store.get("key1"), Some(Bytes::from("first")));

        let cmd = Command::try_from(Line::from("SET key1 second")).unwrap();
        assert_eq!(cmd.exec(&store), Response::Ok);
        assert_eq!(store.get("key1"), Some(Bytes::from("second")));
    }

    #[test]
    fn missing_value() {
        let err = Command::try_from(Line::from("SET key1")).unwrap_err();

        assert_eq!(err, ParseError::WrongArity { command: "SET" });
    }

    #[test]
    fn value_with_embedded_whitespace() {
        let err = Command::try_from(Line::from("SET key1 two words")).unwrap_err();

        assert_eq!(err, ParseError::WrongArity { command: "SET" });
    }
}

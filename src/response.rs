use bytes::Bytes;
use std::fmt;

/// A reply on the wire. Every response is a single `\n`-terminated line.
///
/// `Nil` (a GET on an absent key) is a normal response, not an error; the
/// only error responses are malformed command lines.
#[derive(Clone, Debug, PartialEq)]
pub enum Response {
    /// `OK\n`, answering a successful SET.
    Ok,
    /// `<value>\n`, answering a successful GET.
    Value(Bytes),
    /// `(nil)\n`, answering a GET on a key that was never set.
    Nil,
    /// `(error) <detail>\n`, answering a malformed command line.
    Error(String),
}

impl From<Response> for Vec<u8> {
    fn from(response: Response) -> Vec<u8> {
        match response {
            Response::Ok => b"OK\n".to_vec(),
            Response::Value(data) => {
                let mut bytes = Vec::with_capacity(data.len() + 1);
                bytes.extend_from_slice(&data);
                bytes.push(b'\n');
                bytes
            }
            Response::Nil => b"(nil)\n".to_vec(),
            Response::Error(detail) => format!("(error) {}\n", detail).into_bytes(),
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Ok => write!(f, "OK"),
            Response::Value(data) => write!(f, "{}", String::from_utf8_lossy(data)),
            Response::Nil => write!(f, "(nil)"),
            Response::Error(detail) => write!(f, "(error) {}", detail),
        }
    }
}

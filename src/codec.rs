use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;
use tokio_util::codec::{Decoder, Encoder};

use crate::response::Response;
use crate::Error;

/// Upper bound on a single command line, to prevent an unterminated stream
/// from growing the read buffer without limit.
const MAX_LINE_LENGTH: usize = 1024 * 1024;

/// One complete command line, with the terminating `\n` (and an optional
/// preceding `\r`) already stripped.
///
/// The bytes are carried raw; whether they form valid UTF-8 is a command
/// parsing question, answered on the wire as an error line rather than by
/// tearing down the connection.
#[derive(Clone, Debug, PartialEq)]
pub struct Line(pub Bytes);

impl Line {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for Line {
    fn from(s: &str) -> Line {
        Line(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

/// Frames the byte stream into `\n`-terminated lines and serializes
/// responses. TCP gives no message boundaries: bytes accumulate in `src`
/// until a full line is available, and a single read may carry several
/// lines, which `decode` hands out one at a time.
pub struct LineCodec;

impl Decoder for LineCodec {
    type Item = Line;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(at) = src.iter().position(|byte| *byte == b'\n') else {
            if src.len() > MAX_LINE_LENGTH {
                return Err("protocol error; line exceeds maximum length".into());
            }
            // Not enough data for a full line yet.
            return Ok(None);
        };

        if at > MAX_LINE_LENGTH {
            return Err("protocol error; line exceeds maximum length".into());
        }

        let mut line = src.split_to(at + 1);
        line.truncate(at);
        if line.last() == Some(&b'\r') {
            line.truncate(at - 1);
        }

        Ok(Some(Line(line.freeze())))
    }

    // A connection can end with a final command still unterminated in the
    // buffer; it is delivered as a line of whatever remained.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(line) => Ok(Some(line)),
            None if src.is_empty() => Ok(None),
            None => Ok(Some(Line(src.split().freeze()))),
        }
    }
}

impl Encoder<Response> for LineCodec {
    type Error = Error;

    fn encode(&mut self, response: Response, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let bytes: Vec<u8> = response.into();
        dst.reserve(bytes.len());
        dst.put_slice(&bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_complete_line() {
        let mut codec = LineCodec;
        let mut buffer = BytesMut::from("SET key_0_0 value_42\n");

        let line = codec.decode(&mut buffer).unwrap();

        assert_eq!(line, Some(Line::from("SET key_0_0 value_42")));
        assert!(buffer.is_empty());
    }

    #[test]
    fn decode_strips_carriage_return() {
        let mut codec = LineCodec;
        let mut buffer = BytesMut::from("GET key_0_0\r\n");

        let line = codec.decode(&mut buffer).unwrap();

        assert_eq!(line, Some(Line::from("GET key_0_0")));
    }

    #[test]
    fn decode_waits_for_a_full_line() {
        let mut codec = LineCodec;
        let mut buffer = BytesMut::from("SET key_0_0 val");

        assert_eq!(codec.decode(&mut buffer).unwrap(), None);

        // The rest of the command arrives in a later read.
        buffer.extend_from_slice(b"ue_42\nGET");

        let line = codec.decode(&mut buffer).unwrap();
        assert_eq!(line, Some(Line::from("SET key_0_0 value_42")));

        // The trailing partial command stays buffered.
        assert_eq!(codec.decode(&mut buffer).unwrap(), None);
        assert_eq!(&buffer[..], b"GET");
    }

    #[test]
    fn decode_hands_out_coalesced_lines_one_at_a_time() {
        let mut codec = LineCodec;
        let mut buffer = BytesMut::from("SET a 1\nSET b 2\nGET a\n");

        assert_eq!(codec.decode(&mut buffer).unwrap(), Some(Line::from("SET a 1")));
        assert_eq!(codec.decode(&mut buffer).unwrap(), Some(Line::from("SET b 2")));
        assert_eq!(codec.decode(&mut buffer).unwrap(), Some(Line::from("GET a")));
        assert_eq!(codec.decode(&mut buffer).unwrap(), None);
    }

    #[test]
    fn decode_passes_raw_bytes_through() {
        let mut codec = LineCodec;
        let mut buffer = BytesMut::from(&b"GET \xff\xfe\n"[..]);

        let line = codec.decode(&mut buffer).unwrap().unwrap();

        assert_eq!(line.as_bytes(), b"GET \xff\xfe");
    }

    #[test]
    fn decode_eof_flushes_an_unterminated_line() {
        let mut codec = LineCodec;
        let mut buffer = BytesMut::from("GET key_0_0");

        let line = codec.decode_eof(&mut buffer).unwrap();

        assert_eq!(line, Some(Line::from("GET key_0_0")));
        assert_eq!(codec.decode_eof(&mut buffer).unwrap(), None);
    }

    #[test]
    fn decode_rejects_oversized_lines() {
        let mut codec = LineCodec;
        let mut buffer = BytesMut::new();
        buffer.resize(MAX_LINE_LENGTH + 1, b'x');

        assert!(codec.decode(&mut buffer).is_err());
    }

    #[test]
    fn encode_response() {
        let mut codec = LineCodec;
        let mut buffer = BytesMut::new();

        codec.encode(Response::Ok, &mut buffer).unwrap();
        codec
            .encode(Response::Value(Bytes::from("value_42")), &mut buffer)
            .unwrap();
        codec.encode(Response::Nil, &mut buffer).unwrap();

        assert_eq!(&buffer[..], b"OK\nvalue_42\n(nil)\n");
    }
}

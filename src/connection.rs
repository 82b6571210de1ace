use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::{timeout, Duration};
use tokio_util::codec::{Decoder, Framed};
use uuid::Uuid;

use crate::codec::{Line, LineCodec};
use crate::response::Response;
use crate::Result;

/// How long a partial line may sit in the read buffer with no further data
/// before it is served as a command in its own right. Clients like the
/// stress-test script send a bare `SET k v` with no trailing newline and
/// then block on the reply, so an unterminated command must not be held
/// until the peer gives up. Lines split across writes still assemble as
/// long as the pieces arrive within this window.
const PARTIAL_LINE_IDLE: Duration = Duration::from_millis(100);

/// One client session, from accept to disconnect.
///
/// The socket is wrapped in a `Framed` line codec: data read from the socket
/// accumulates in the read buffer until a complete line can be handed out,
/// and responses are written back through the same framing. The connection
/// drops its buffers with the socket; nothing outlives the session.
pub struct Connection {
    pub id: Uuid,
    frames: Framed<TcpStream, LineCodec>,
}

impl Connection {
    pub fn new(stream: TcpStream) -> Connection {
        Connection {
            id: Uuid::new_v4(),
            frames: Framed::new(stream, LineCodec),
        }
    }

    /// Reads the next command line. `None` means the peer closed the
    /// connection. A line that stays unterminated past the idle window is
    /// delivered as-is, matching clients that never send the newline.
    pub async fn read_line(&mut self) -> Result<Option<Line>> {
        loop {
            match timeout(PARTIAL_LINE_IDLE, self.frames.next()).await {
                Ok(frame) => return frame.transpose(),
                // Idle with a partial command buffered: flush it.
                Err(_) if !self.frames.read_buffer().is_empty() => {
                    return LineCodec.decode_eof(self.frames.read_buffer_mut());
                }
                // Idle between commands; keep waiting.
                Err(_) => {}
            }
        }
    }

    /// Writes one response line and flushes it, so the reply is on the wire
    /// before the next command is read.
    pub async fn write_response(&mut self, response: Response) -> Result<()> {
        self.frames.send(response).await
    }
}

use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info, instrument};

use crate::commands::executable::Executable;
use crate::commands::Command;
use crate::connection::Connection;
use crate::response::Response;
use crate::store::Store;
use crate::Error;

pub async fn run(addr: SocketAddr, store: Store) -> Result<(), Error> {
    let _ = tracing_subscriber::fmt()
        .try_init()
        .map_err(|e| debug!("Failed to initialize global tracing: {}", e));

    let listener = TcpListener::bind(addr).await?;

    info!("Key-value server listening on {}", listener.local_addr()?);

    loop {
        // A failed accept (a reset peer, file descriptors exhausted under
        // connection churn) must not stop the acceptor.
        let (socket, client_address) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!("accept error: {}", e);
                sleep(Duration::from_millis(100)).await;
                continue;
            }
        };
        let store = store.clone();
        debug!("Accepted connection from {:?}", client_address);

        // Each connection runs on its own task; a handler failing never
        // stops the accept loop or touches other connections.
        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, client_address, store).await {
                error!("connection error: {}", e);
            }
        });
    }
}

#[instrument(
    name = "connection",
    skip(stream, store),
    fields(connection_id, client_address)
)]
async fn handle_connection(
    stream: TcpStream,
    client_address: SocketAddr,
    store: Store,
) -> Result<(), Error> {
    let mut conn = Connection::new(stream);

    tracing::Span::current()
        .record("connection_id", conn.id.to_string())
        .record("client_address", client_address.to_string());

    while let Some(line) = conn.read_line().await? {
        debug!("Received line from client: {:?}", line);

        // A malformed line is answered on the wire and the session goes on;
        // only a broken socket ends the connection.
        let response = match Command::try_from(line) {
            Ok(cmd) => cmd.exec(&store),
            Err(e) => Response::Error(e.to_string()),
        };

        debug!("Sending response to client: {:?}", response);
        conn.write_response(response).await?;
    }

    debug!("Connection closed");
    Ok(())
}

//! Newline-delimited JSON over TCP.
//!
//! Each line a client sends is one command; each line the server writes is
//! one [`ServerMessage`]. Replies to a command and pushed views share the
//! socket, so a client tells them apart by the `type` field.
use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use runtime::{Connection, ConnectionId, Outbox, RuntimeHandle, ServerMessage};

/// Accept connections until the listener fails.
pub async fn serve(listener: TcpListener, handle: RuntimeHandle) -> Result<()> {
    info!(target: "server", addr = %listener.local_addr()?, "listening");

    loop {
        let (stream, peer) = listener.accept().await?;
        let handle = handle.clone();

        tokio::spawn(async move {
            if let Err(error) = handle_client(stream, handle).await {
                warn!(target: "server", %peer, error = %error, "connection ended with error");
            }
        });
    }
}

async fn handle_client(stream: TcpStream, handle: RuntimeHandle) -> Result<()> {
    let Connection { id, mut outbox } = handle.connect().await?;
    debug!(target: "server", connection = %id, "client connected");

    let pumped = pump(stream, &handle, id, &mut outbox).await;

    handle.disconnect(id).await?;
    debug!(target: "server", connection = %id, "client disconnected");

    pumped
}

/// Relay lines to the runtime and outbox frames to the socket until either
/// side closes.
async fn pump(
    stream: TcpStream,
    handle: &RuntimeHandle,
    id: ConnectionId,
    outbox: &mut Outbox,
) -> Result<()> {
    let (reader, writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();
    let mut writer = BufWriter::new(writer);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    return Ok(());
                };
                if line.trim().is_empty() {
                    continue;
                }
                let reply = handle.submit_text(id, &line).await;
                write_frame(&mut writer, &reply).await?;
            }
            frame = outbox.recv() => {
                let Some(frame) = frame else {
                    return Ok(());
                };
                write_frame(&mut writer, &frame).await?;
            }
        }
    }
}

async fn write_frame<W>(writer: &mut W, frame: &ServerMessage) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut text = frame.encode()?;
    text.push('\n');
    writer.write_all(text.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

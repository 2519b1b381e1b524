//! Whole-message transport over a byte stream, one packet record at a time.
//!
//! A message goes out as `size` records of [`PACKET_TOTAL_SIZE`] bytes
//! written back to back in sequence order. The reader takes the packet
//! count from the first record, reads the rest, and checks that the
//! sequence numbers line up before handing the data back.

use std::sync::atomic::{AtomicU64, Ordering};

use syncbox_protocol::{PACKET_TOTAL_SIZE, Packet};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::sync::Mutex;

use crate::{Connection, ConnectionId, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Largest message a connection accepts by default, in packets (64 MiB of
/// payload).
///
/// Envelope bytes are base64 text inside JSON, and a file's content is
/// base64 again inside its `FileRequest`, so a file grows by roughly 16/9
/// on the way to the wire. This default admits files up to about 36 MiB.
pub const DEFAULT_MAX_PACKETS: u32 = 64 * 1024;

/// A [`Connection`] that frames messages as packet sequences on `S`.
///
/// The read and write halves are locked independently, so one task can
/// wait in [`recv`](Connection::recv) while another sends. Two concurrent
/// senders never interleave their packets.
///
/// Receiving is cancel safe: bytes and packets read before a `recv` future
/// is dropped stay buffered, and the next `recv` resumes the same message.
/// Any receive error other than a clean close leaves the stream at an
/// unknown position, so every later `recv` fails with
/// [`TransportError::ConnectionClosed`].
pub struct PacketConnection<S> {
    id: ConnectionId,
    reader: Mutex<RecvState<ReadHalf<S>>>,
    writer: Mutex<WriteHalf<S>>,
    max_packets: u32,
}

impl<S> PacketConnection<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    /// Wraps a connected stream.
    pub fn new(stream: S) -> Self {
        let (reader, writer) = tokio::io::split(stream);
        let id = ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(%id, "packet connection opened");
        Self {
            id,
            reader: Mutex::new(RecvState::new(reader)),
            writer: Mutex::new(writer),
            max_packets: DEFAULT_MAX_PACKETS,
        }
    }

    /// Caps the number of packets a single incoming message may announce.
    pub fn with_max_packets(mut self, max_packets: u32) -> Self {
        self.max_packets = max_packets;
        self
    }

    /// The largest message, in packets, this connection accepts.
    pub fn max_packets(&self) -> u32 {
        self.max_packets
    }

    /// Writes `packets` in order and flushes.
    pub async fn send_packets(&self, packets: &[Packet]) -> Result<(), TransportError> {
        let mut writer = self.writer.lock().await;
        for packet in packets {
            writer
                .write_all(&packet.to_bytes())
                .await
                .map_err(TransportError::SendFailed)?;
        }
        writer.flush().await.map_err(TransportError::SendFailed)?;
        tracing::debug!(id = %self.id, packets = packets.len(), "sent message");
        Ok(())
    }

    /// Reads the packets of the next message.
    ///
    /// Returns `Ok(None)` if the stream ends cleanly before the first byte
    /// of a message.
    pub async fn recv_packets(&self) -> Result<Option<Vec<Packet>>, TransportError> {
        let mut state = self.reader.lock().await;
        if state.failed {
            return Err(TransportError::ConnectionClosed(
                "an earlier receive failed".into(),
            ));
        }

        let result = state.next_message(self.max_packets).await;
        match &result {
            Ok(Some(packets)) => {
                tracing::debug!(id = %self.id, packets = packets.len(), "received message");
            }
            Ok(None) => {}
            Err(e) => {
                tracing::debug!(id = %self.id, error = %e, "receive failed");
                state.failed = true;
            }
        }
        result
    }
}

/// Read side of a connection, with whatever part of the current message
/// has arrived so far.
struct RecvState<R> {
    reader: R,
    record: [u8; PACKET_TOTAL_SIZE],
    filled: usize,
    packets: Vec<Packet>,
    failed: bool,
}

impl<R> RecvState<R>
where
    R: AsyncRead + Unpin,
{
    fn new(reader: R) -> Self {
        Self {
            reader,
            record: [0u8; PACKET_TOTAL_SIZE],
            filled: 0,
            packets: Vec::new(),
            failed: false,
        }
    }

    /// Reads records until one message is complete, then checks it.
    async fn next_message(
        &mut self,
        max_packets: u32,
    ) -> Result<Option<Vec<Packet>>, TransportError> {
        loop {
            if let Some(first) = self.packets.first() {
                if self.packets.len() >= first.size() as usize {
                    break;
                }
            }

            match self.read_record().await? {
                Some(packet) => {
                    if self.packets.is_empty() && packet.size() > max_packets {
                        return Err(TransportError::MessageTooLarge(packet.size()));
                    }
                    self.packets.push(packet);
                }
                None => {
                    let Some(first) = self.packets.first() else {
                        return Ok(None);
                    };
                    return Err(TransportError::ShortRead {
                        expected: first.size() as usize * PACKET_TOTAL_SIZE,
                        received: self.packets.len() * PACKET_TOTAL_SIZE,
                    });
                }
            }
        }

        let packets = std::mem::take(&mut self.packets);
        syncbox_protocol::validate_sequence(&packets)?;
        Ok(Some(packets))
    }

    /// Reads exactly one record. `Ok(None)` means EOF before any byte of it.
    async fn read_record(&mut self) -> Result<Option<Packet>, TransportError> {
        while self.filled < PACKET_TOTAL_SIZE {
            let n = self
                .reader
                .read(&mut self.record[self.filled..])
                .await
                .map_err(TransportError::ReceiveFailed)?;
            if n == 0 {
                if self.filled == 0 {
                    return Ok(None);
                }
                return Err(TransportError::ShortRead {
                    expected: PACKET_TOTAL_SIZE,
                    received: self.filled,
                });
            }
            self.filled += n;
        }
        self.filled = 0;
        Ok(Some(Packet::from_bytes(&self.record)))
    }
}

impl<S> Connection for PacketConnection<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        let packets = syncbox_protocol::serialize(data)?;
        self.send_packets(&packets).await
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        Ok(self
            .recv_packets()
            .await?
            .map(|packets| syncbox_protocol::deserialize(&packets)))
    }

    async fn close(&self) -> Result<(), Self::Error> {
        tracing::debug!(id = %self.id, "closing packet connection");
        self.writer
            .lock()
            .await
            .shutdown()
            .await
            .map_err(TransportError::SendFailed)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_read_record_clean_eof() {
        let mut state = RecvState::new(&[0u8; 0][..]);
        assert!(state.read_record().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_record_partial_is_short_read() {
        let bytes = [0u8; 100];
        let mut state = RecvState::new(&bytes[..]);
        let err = state.read_record().await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::ShortRead { expected: PACKET_TOTAL_SIZE, received: 100 }
        ));
    }

    #[tokio::test]
    async fn test_read_record_full() {
        let packet = Packet::new(1, 0, [9u8; 1024]).unwrap();
        let record = packet.to_bytes();
        let mut state = RecvState::new(&record[..]);
        assert_eq!(state.read_record().await.unwrap(), Some(packet));
        assert_eq!(state.filled, 0);
    }

    #[tokio::test]
    async fn test_read_record_resumes_after_cancel() {
        let packet = Packet::new(1, 0, [5u8; 1024]).unwrap();
        let record = packet.to_bytes();
        let (mut tx, rx) = tokio::io::duplex(4096);
        let mut state = RecvState::new(rx);

        tx.write_all(&record[..500]).await.unwrap();
        let cancelled =
            tokio::time::timeout(Duration::from_millis(20), state.read_record()).await;
        assert!(cancelled.is_err());
        assert_eq!(state.filled, 500);

        tx.write_all(&record[500..]).await.unwrap();
        assert_eq!(state.read_record().await.unwrap(), Some(packet));
    }

    #[tokio::test]
    async fn test_zero_size_packet_is_out_of_sequence() {
        let record = Packet::new(0, 0, [0u8; 1024]).unwrap().to_bytes();
        let mut state = RecvState::new(&record[..]);
        let err = state.next_message(DEFAULT_MAX_PACKETS).await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::Framing(syncbox_protocol::ProtocolError::OutOfSequence { .. })
        ));
    }

    #[tokio::test]
    async fn test_connection_ids_are_unique() {
        let (a, b) = tokio::io::duplex(64);
        let a = PacketConnection::new(a);
        let b = PacketConnection::new(b);
        assert_ne!(a.id(), b.id());
    }
}

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::common::{
    HEADER_SIZE, MAX_PACKET_SIZE, MIN_PACKET_SIZE, PacketType, SIZE_FIELD_SIZE,
    TERMINATOR_SIZE,
};
use crate::errors::RconError;

/// One decoded frame. `kind` is kept as the raw wire value because its meaning
/// depends on what the reader was waiting for, see [`PacketType::from_wire`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub id: i32,
    pub kind: i32,
    pub body: Vec<u8>,
}

impl Packet {
    pub fn packet_type(&self, awaiting_auth: bool) -> Option<PacketType> {
        PacketType::from_wire(self.kind, awaiting_auth)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Builds the wire frame for `body`.
///
/// The body must be at most [`crate::common::MAX_BODY_LEN`] bytes; callers check
/// that before building a frame, the protocol has no way to split outgoing commands.
pub fn encode(id: i32, kind: PacketType, body: &[u8]) -> Vec<u8> {
    let size = MIN_PACKET_SIZE + body.len();

    let mut buffer = Vec::with_capacity(SIZE_FIELD_SIZE + size);

    buffer.extend_from_slice(&(size as i32).to_le_bytes());
    buffer.extend_from_slice(&id.to_le_bytes());
    buffer.extend_from_slice(&i32::from(kind).to_le_bytes());
    buffer.extend_from_slice(body);
    buffer.extend_from_slice(&[0u8; TERMINATOR_SIZE]);

    buffer
}

/// Parses the frame at the start of `buf`. Bytes past the end of the frame are ignored
/// and the two terminator bytes are not inspected.
pub fn decode(buf: &[u8]) -> Result<Packet, RconError> {
    if buf.len() < HEADER_SIZE {
        return Err(RconError::Framing(format!(
            "need {} header bytes, have {}",
            HEADER_SIZE,
            buf.len()
        )));
    }

    let size = read_i32(&buf[0..4]);
    let id = read_i32(&buf[4..8]);
    let kind = read_i32(&buf[8..12]);

    let size = checked_size(size)?;
    let frame_len = SIZE_FIELD_SIZE + size;
    if frame_len > buf.len() {
        return Err(RconError::Framing(format!(
            "declared size {} needs {} bytes, have {}",
            size,
            frame_len,
            buf.len()
        )));
    }

    let body = buf[HEADER_SIZE..frame_len - TERMINATOR_SIZE].to_vec();
    Ok(Packet { id, kind, body })
}

/// Reads exactly one frame from a byte stream, however the transport splits or
/// coalesces the bytes.
pub async fn read_packet<S: AsyncRead + Unpin>(stream: &mut S) -> Result<Packet, RconError> {
    let mut size_bytes = [0u8; SIZE_FIELD_SIZE];
    stream.read_exact(&mut size_bytes).await?;
    let size = checked_size(i32::from_le_bytes(size_bytes))?;
    if size > MAX_PACKET_SIZE {
        return Err(RconError::Framing(format!(
            "declared size {} exceeds maximum of {}",
            size, MAX_PACKET_SIZE
        )));
    }

    let mut frame = vec![0u8; SIZE_FIELD_SIZE + size];
    frame[..SIZE_FIELD_SIZE].copy_from_slice(&size_bytes);
    stream.read_exact(&mut frame[SIZE_FIELD_SIZE..]).await?;

    decode(&frame)
}

pub async fn write_packet<S: AsyncWrite + Unpin>(
    stream: &mut S,
    id: i32,
    kind: PacketType,
    body: &[u8],
) -> Result<(), RconError> {
    let buf = encode(id, kind, body);
    stream.write_all(&buf).await?;
    stream.flush().await?;
    Ok(())
}

fn checked_size(size: i32) -> Result<usize, RconError> {
    match usize::try_from(size) {
        Ok(size) if size >= MIN_PACKET_SIZE => Ok(size),
        _ => Err(RconError::Framing(format!(
            "declared size {} is below minimum of {}",
            size, MIN_PACKET_SIZE
        ))),
    }
}

fn read_i32(bytes: &[u8]) -> i32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(bytes);
    i32::from_le_bytes(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::MAX_BODY_LEN;

    use proptest::prelude::*;
    use tokio::io::duplex;

    #[test]
    fn encode_matches_captured_auth_frame() {
        let bytes = encode(0, PacketType::Auth, b"pw");
        let expected: Vec<u8> = vec![
            12, 0, 0, 0, // size
            0, 0, 0, 0, // id
            3, 0, 0, 0, // type
            b'p', b'w', 0, 0,
        ];
        assert_eq!(bytes, expected);
    }

    #[test]
    fn encode_empty_body_is_minimum_frame() {
        let bytes = encode(7, PacketType::ResponseValue, b"");
        assert_eq!(bytes.len(), SIZE_FIELD_SIZE + MIN_PACKET_SIZE);
        assert_eq!(&bytes[0..4], &10i32.to_le_bytes());
    }

    #[test]
    fn decode_reads_server_response() {
        let mut bytes = encode(0, PacketType::ResponseValue, b"hostname: test");
        bytes.extend_from_slice(b"trailing");
        let packet = decode(&bytes).unwrap();

        assert_eq!(packet.id, 0);
        assert_eq!(packet.packet_type(false), Some(PacketType::ResponseValue));
        assert_eq!(packet.body_text(), "hostname: test");
    }

    #[test]
    fn decode_ignores_terminator_contents() {
        let mut bytes = encode(1, PacketType::ExecCommand, b"abc");
        let len = bytes.len();
        bytes[len - 2] = b'x';
        bytes[len - 1] = b'y';
        assert_eq!(decode(&bytes).unwrap().body, b"abc");
    }

    #[test]
    fn decode_rejects_short_header() {
        let res = decode(&[10, 0, 0, 0, 0, 0]);
        assert!(matches!(res, Err(RconError::Framing(_))));
    }

    #[test]
    fn decode_rejects_truncated_body() {
        let bytes = encode(1, PacketType::ResponseValue, b"hello world");
        let res = decode(&bytes[..bytes.len() - 1]);
        assert!(matches!(res, Err(RconError::Framing(_))));
    }

    #[test]
    fn decode_rejects_negative_size() {
        let mut bytes = encode(1, PacketType::ResponseValue, b"");
        bytes[0..4].copy_from_slice(&(-5i32).to_le_bytes());
        assert!(matches!(decode(&bytes), Err(RconError::Framing(_))));
    }

    #[tokio::test]
    async fn read_packet_assembles_split_writes() {
        let (mut client, mut server) = duplex(64);
        let bytes = encode(0, PacketType::ResponseValue, b"players: 3");

        let writer = tokio::spawn(async move {
            for chunk in bytes.chunks(3) {
                server.write_all(chunk).await.unwrap();
                server.flush().await.unwrap();
                tokio::task::yield_now().await;
            }
        });

        let packet = read_packet(&mut client).await.unwrap();
        assert_eq!(packet.body_text(), "players: 3");
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn read_packet_reads_coalesced_frames_one_at_a_time() {
        let (mut client, mut server) = duplex(256);
        let mut bytes = encode(0, PacketType::ResponseValue, b"");
        bytes.extend(encode(0, PacketType::AuthResponse, b""));
        server.write_all(&bytes).await.unwrap();

        let first = read_packet(&mut client).await.unwrap();
        let second = read_packet(&mut client).await.unwrap();
        assert_eq!(first.kind, 0);
        assert_eq!(second.packet_type(true), Some(PacketType::AuthResponse));
    }

    #[tokio::test]
    async fn read_packet_rejects_oversized_frame() {
        let (mut client, mut server) = duplex(64);
        server
            .write_all(&((MAX_PACKET_SIZE + 1) as i32).to_le_bytes())
            .await
            .unwrap();

        let res = read_packet(&mut client).await;
        assert!(matches!(res, Err(RconError::Framing(_))));
    }

    #[tokio::test]
    async fn read_packet_rejects_undersized_frame() {
        let (mut client, mut server) = duplex(64);
        server.write_all(&4i32.to_le_bytes()).await.unwrap();

        let res = read_packet(&mut client).await;
        assert!(matches!(res, Err(RconError::Framing(_))));
    }

    #[tokio::test]
    async fn read_packet_reports_eof_mid_frame_as_io() {
        let (mut client, mut server) = duplex(64);
        let bytes = encode(0, PacketType::ResponseValue, b"cut short");
        server.write_all(&bytes[..8]).await.unwrap();
        drop(server);

        let res = read_packet(&mut client).await;
        assert!(matches!(res, Err(RconError::Io(_))));
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(
            id in any::<i32>(),
            kind in prop_oneof![
                Just(PacketType::Auth),
                Just(PacketType::ExecCommand),
                Just(PacketType::ResponseValue),
            ],
            body in proptest::collection::vec(any::<u8>(), 0..=MAX_BODY_LEN),
        ) {
            let bytes = encode(id, kind, &body);
            prop_assert_eq!(read_i32(&bytes[0..4]) as usize, bytes.len() - SIZE_FIELD_SIZE);

            let packet = decode(&bytes).unwrap();
            prop_assert_eq!(packet.id, id);
            prop_assert_eq!(packet.kind, i32::from(kind));
            prop_assert_eq!(packet.body, body);
        }

        #[test]
        fn decode_rejects_every_truncation(
            body in proptest::collection::vec(any::<u8>(), 0..64),
            cut in 1usize..16,
        ) {
            let bytes = encode(0, PacketType::ExecCommand, &body);
            let keep = bytes.len().saturating_sub(cut);
            prop_assert!(matches!(decode(&bytes[..keep]), Err(RconError::Framing(_))));
        }
    }
}

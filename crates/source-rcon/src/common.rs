/// Correlation id used for every request. Only one request is ever in flight,
/// so a single fixed id is enough to match replies.
pub const SENTINEL_ID: i32 = 0;

/// Id a Source server puts on the auth reply when the password is wrong.
pub const AUTH_REJECTED_ID: i32 = -1;

/// Largest value accepted in the `size` field of a frame.
pub const MAX_PACKET_SIZE: usize = 4096;

/// `size` of a frame with an empty body: id + type + two null terminators.
pub const MIN_PACKET_SIZE: usize = ID_FIELD_SIZE + TYPE_FIELD_SIZE + TERMINATOR_SIZE;

/// Longest body that still fits in a single frame.
pub const MAX_BODY_LEN: usize = MAX_PACKET_SIZE - MIN_PACKET_SIZE;

pub(crate) const SIZE_FIELD_SIZE: usize = 4;
pub(crate) const ID_FIELD_SIZE: usize = 4;
pub(crate) const TYPE_FIELD_SIZE: usize = 4;
pub(crate) const TERMINATOR_SIZE: usize = 2;
pub(crate) const HEADER_SIZE: usize = SIZE_FIELD_SIZE + ID_FIELD_SIZE + TYPE_FIELD_SIZE;

/// Packet type codes of the Source RCON protocol.
///
/// `AuthResponse` and `ExecCommand` share the wire value `2`. Which one a frame
/// carries depends on what the client was waiting for, never on the number alone.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PacketType {
    ResponseValue,
    AuthResponse,
    ExecCommand,
    Auth,
}

impl From<PacketType> for i32 {
    fn from(kind: PacketType) -> i32 {
        match kind {
            PacketType::Auth => 3,
            PacketType::AuthResponse => 2,
            PacketType::ExecCommand => 2,
            PacketType::ResponseValue => 0,
        }
    }
}

impl PacketType {
    /// Resolves a wire value. `awaiting_auth` picks between the two meanings of `2`.
    pub fn from_wire(value: i32, awaiting_auth: bool) -> Option<PacketType> {
        match value {
            3 => Some(PacketType::Auth),
            2 if awaiting_auth => Some(PacketType::AuthResponse),
            2 => Some(PacketType::ExecCommand),
            0 => Some(PacketType::ResponseValue),
            _ => None,
        }
    }
}

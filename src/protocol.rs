//! Wire protocol constants and bitmask predicates
//!
//! Every message is a fixed 2-byte datagram: byte 0 is an opaque index that
//! is carried through the pipeline untouched, byte 1 is a command bitmask.
//! Responses mirror the accepted command byte-for-byte.

/// Fixed message size in bytes
pub const MSG_SIZE: usize = 2;

/// Offset of the opaque index byte
pub const INDEX_BYTE: usize = 0;

/// Offset of the command bitmask byte
pub const STATUS_BYTE: usize = 1;

/// Event-request bit
pub const MASK_EVENT: u8 = 0x20;

/// Sync-request bit
pub const MASK_SYNC: u8 = 0x10;

/// Shutdown-request bits
pub const MASK_QUIT: u8 = 0x03;

/// All recognized command bits; anything outside is ignored
pub const MASK_COMMANDS: u8 = 0x3f;

/// A 2-byte command/response packet
pub type Packet = [u8; MSG_SIZE];

/// True if the event bit is asserted
#[inline]
pub fn has_event(status: u8) -> bool {
    status & MASK_EVENT != 0
}

/// True if the sync bit is asserted
#[inline]
pub fn has_sync(status: u8) -> bool {
    status & MASK_SYNC != 0
}

/// True if any shutdown bit is asserted
#[inline]
pub fn has_shutdown(status: u8) -> bool {
    status & MASK_QUIT != 0
}

/// Strip unrecognized bits from a status byte
#[inline]
pub fn commands(status: u8) -> u8 {
    status & MASK_COMMANDS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_predicates() {
        assert!(has_event(0x20));
        assert!(has_event(0x3f));
        assert!(!has_event(0x10));

        assert!(has_sync(0x10));
        assert!(!has_sync(0x20));

        assert!(has_shutdown(0x01));
        assert!(has_shutdown(0x02));
        assert!(has_shutdown(0x03));
        assert!(!has_shutdown(0x30));
    }

    #[test]
    fn test_commands_strips_unrecognized_bits() {
        assert_eq!(commands(0xff), MASK_COMMANDS);
        assert_eq!(commands(0xc0), 0x00);
        assert_eq!(commands(0x30), 0x30);
    }
}

//! SPI command protocol spoken by badge bitstreams.

// Commands
pub const CMD_NOP1: u8 = 0x00;
pub const CMD_LOOPBACK: u8 = 0xf1;
pub const CMD_LCD_PASSTHROUGH: u8 = 0xf2;
pub const CMD_BUTTON_REPORT: u8 = 0xf4;
pub const CMD_FREAD_GET: u8 = 0xf8;
pub const CMD_FREAD_PUT: u8 = 0xf9;
pub const CMD_IRQ_ACK: u8 = 0xfd;
pub const CMD_RESP_ACK: u8 = 0xfe;
pub const CMD_NOP2: u8 = 0xff;

// Request bits (low nibble of the status byte)
pub const REQ_FREAD: u8 = 1 << 0;

/// File read request as reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileReadRequest {
    pub file_id: u32,
    pub offset: u32,
    pub length: usize,
}

impl FileReadRequest {
    /// Size of the `RESP_ACK` reply carrying a request.
    pub const WIRE_LEN: usize = 12;

    /// Decode the reply: two status bytes, BE file id, BE offset, BE (len - 1).
    pub fn decode(buf: &[u8; Self::WIRE_LEN]) -> Self {
        Self {
            file_id: u32::from_be_bytes([buf[2], buf[3], buf[4], buf[5]]),
            offset: u32::from_be_bytes([buf[6], buf[7], buf[8], buf[9]]),
            length: u16::from_be_bytes([buf[10], buf[11]]) as usize + 1,
        }
    }
}

//! Track descriptor fields shared by all the TOC formats.
//!
//! Every descriptor starts with a byte packing the 4-bit ADR field
//! (what the Q subchannel of the track carries) in the high nibble
//! and the 4-bit CONTROL field (track attributes) in the low nibble.
//! Both are kept bit-for-bit, including values this crate doesn't
//! interpret.

use crate::{TocError, TocResult};

/// Track number used for the lead-out in the simple TOC
pub const LEAD_OUT_TRACK: u8 = 0xaa;

/// FullTOC point of the descriptor holding the first track of a session
pub const FIRST_TRACK_POINT: u8 = 0xa0;

/// FullTOC point of the descriptor holding the last track of a session
pub const LAST_TRACK_POINT: u8 = 0xa1;

/// FullTOC point of the descriptor holding the lead-out of a session
pub const LEAD_OUT_POINT: u8 = 0xa2;

/// Highest track number a CD can hold
pub const MAX_TRACK: u8 = 99;

/// Size in bytes of a simple TOC (and multi-session) track descriptor
pub const TRACK_ENTRY_SIZE: usize = 8;

/// Content of the sub-Q channel of a track (ADR field, 4 bits)
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Adr(u8);

impl Adr {
    /// The sub-Q channel contains nothing
    pub const NOTHING: Adr = Adr(0);
    /// The sub-Q channel contains the current position
    pub const POSITION: Adr = Adr(1);
    /// The sub-Q channel contains the media catalog number
    pub const MCN: Adr = Adr(2);
    /// The sub-Q channel contains the ISRC
    pub const ISRC: Adr = Adr(3);

    /// Build an ADR from its 4-bit value. Returns `None` if `adr`
    /// doesn't fit in 4 bits.
    pub const fn new(adr: u8) -> Option<Adr> {
        if adr <= 0xf {
            Some(Adr(adr))
        } else {
            None
        }
    }

    /// Raw 4-bit value
    pub const fn value(self) -> u8 {
        self.0
    }
}

/// CONTROL field of a track descriptor (4 bits)
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Control(u8);

impl Control {
    /// Audio track with pre-emphasis
    pub const PRE_EMPHASIS: u8 = 1;
    /// Digital copy permitted
    pub const COPY_PERMITTED: u8 = 1 << 1;
    /// Data track
    pub const DATA: u8 = 1 << 2;
    /// Four-channel audio
    pub const FOUR_CHANNEL: u8 = 1 << 3;

    /// Build a control field from its 4-bit value. Returns `None` if
    /// `ctrl` doesn't fit in 4 bits.
    pub const fn new(ctrl: u8) -> Option<Control> {
        if ctrl <= 0xf {
            Some(Control(ctrl))
        } else {
            None
        }
    }

    /// Raw 4-bit value
    pub const fn value(self) -> u8 {
        self.0
    }

    /// True if this is a data track
    pub fn data(self) -> bool {
        self.0 & Control::DATA != 0
    }

    /// True if this is an audio track
    pub fn audio(self) -> bool {
        !self.data()
    }

    /// True if this is an audio track and pre-emphasis is enabled.
    pub fn pre_emphasis(self) -> bool {
        self.audio() && (self.0 & Control::PRE_EMPHASIS != 0)
    }

    /// True if the "digital copy permitted" flag is set
    pub fn digital_copy_permitted(self) -> bool {
        self.0 & Control::COPY_PERMITTED != 0
    }

    /// True if this is a 4-channel audio track
    pub fn four_channel_audio(self) -> bool {
        self.audio() && (self.0 & Control::FOUR_CHANNEL != 0)
    }
}

/// Split a packed ADR/CONTROL byte
pub fn unpack_adr_control(b: u8) -> (Adr, Control) {
    (Adr(b >> 4), Control(b & 0xf))
}

/// Pack ADR and CONTROL back into a single byte
pub fn pack_adr_control(adr: Adr, control: Control) -> u8 {
    (adr.0 << 4) | control.0
}

/// A single 8-byte track descriptor as found in the simple TOC and the
/// multi-session summary: one reserved byte, ADR/CONTROL, track number,
/// one reserved byte and the big-endian LBA of the start of the track.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackEntry {
    /// Format of the sub-Q channel
    pub adr: Adr,
    /// Track attributes
    pub control: Control,
    /// Track number, or `LEAD_OUT_TRACK`
    pub number: u8,
    /// LBA of the first sector of the track
    pub lba: u32,
}

impl TrackEntry {
    /// Decode an entry from its raw bytes. The reserved bytes are
    /// ignored.
    pub fn parse(raw: &[u8; TRACK_ENTRY_SIZE]) -> TrackEntry {
        let (adr, control) = unpack_adr_control(raw[1]);

        TrackEntry {
            adr,
            control,
            number: raw[2],
            lba: u32::from_be_bytes(*array_ref![raw, 4, 4]),
        }
    }

    /// Encode this entry, reserved bytes are set to 0
    pub fn to_bytes(&self) -> [u8; TRACK_ENTRY_SIZE] {
        let lba = self.lba.to_be_bytes();

        [
            0,
            pack_adr_control(self.adr, self.control),
            self.number,
            0,
            lba[0],
            lba[1],
            lba[2],
            lba[3],
        ]
    }

    /// True if this is the lead-out entry
    pub fn is_lead_out(&self) -> bool {
        self.number == LEAD_OUT_TRACK
    }
}

/// Decode the 4-byte header shared by every TOC format: the
/// big-endian length of everything following the length field, then
/// two 1-byte fields (first/last track or first/last session).
///
/// Fails if the declared length doesn't account for exactly the rest
/// of `buf`.
pub fn parse_header(buf: &[u8]) -> TocResult<(u8, u8)> {
    if buf.len() < 4 {
        return Err(TocError::Truncated {
            expected: 4,
            got: buf.len(),
        });
    }

    let declared = u16::from_be_bytes(*array_ref![buf, 0, 2]) as usize;
    let actual = buf.len() - 2;

    if declared != actual {
        return Err(TocError::LengthMismatch { declared, actual });
    }

    Ok((buf[2], buf[3]))
}

/// Encode a header for a payload of `records_len` bytes following the
/// header.
pub fn write_header(out: &mut Vec<u8>, records_len: usize, first: u8, last: u8) {
    // The two 1-byte header fields are covered by the length
    let len = (records_len + 2) as u16;

    out.extend_from_slice(&len.to_be_bytes());
    out.push(first);
    out.push(last);
}

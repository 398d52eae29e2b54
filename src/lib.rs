//! Codecs for the Compact Disc (CD) table of contents structures
//! returned by the MMC READ TOC command, and computation of the
//! FreeDB and MusicBrainz disc IDs from them.
//!
//! Three formats are supported:
//!
//! * The simple TOC (`Toc`): one LBA per track plus the lead-out.
//! * The multi-session summary (`Sessions`): where the last session
//!   starts.
//! * The full TOC (`FullToc`): raw Q subchannel descriptors from the
//!   lead-in, covering every session and its pseudotracks.

#![warn(missing_docs)]

#[macro_use]
extern crate arrayref;
extern crate thiserror;

pub use discid::{DiscLayout, FreedbVariant};
pub use full_toc::{FullToc, FullTocEntry, FullTocTrack, PseudotrackSlot, Session};
pub use msf::Msf;
pub use sessions::Sessions;
pub use toc::Toc;
pub use track::{Adr, Control, TrackEntry};

use thiserror::Error;

pub mod discid;
pub mod full_toc;
pub mod msf;
pub mod sessions;
pub mod toc;
pub mod track;

#[cfg(test)]
mod tests;

/// Possible session formats, as stored in the disc type byte of the
/// first track pseudotrack of each session.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SessionFormat {
    /// CD-DA (audio CD, "red book" specification) or CD-ROM ("yellow
    /// book" specification) session
    CdDaCdRom,
    /// CD-i (compact disc interactive, "green book"
    /// specification). Used on Philips' CD-i console.
    Cdi,
    /// CD-ROM XA (extended architecture). Used on Sony's PlayStation
    /// console.
    CdXa,
}

impl SessionFormat {
    /// Decode a disc type byte. Besides the MMC values (0x00, 0x10,
    /// 0x20) the compact encoding 0x01 (CD-i) and 0x02 (CD-XA) is
    /// accepted. Returns `None` for anything else.
    pub fn from_disc_type(disc_type: u8) -> Option<SessionFormat> {
        let f = match disc_type {
            0x00 => SessionFormat::CdDaCdRom,
            0x10 | 0x01 => SessionFormat::Cdi,
            0x20 | 0x02 => SessionFormat::CdXa,
            _ => return None,
        };

        Some(f)
    }

    /// Disc type byte for this format
    pub fn disc_type(self) -> u8 {
        match self {
            SessionFormat::CdDaCdRom => 0x00,
            SessionFormat::Cdi => 0x10,
            SessionFormat::CdXa => 0x20,
        }
    }
}

/// Broad classification of `TocError`s
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum ErrorKind {
    /// The input bytes or structures are inconsistent
    Format,
    /// A value doesn't fit in the range supported by the operation
    Range,
}

/// Error type for TOC operations.
#[allow(missing_docs)]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TocError {
    #[error("Buffer too short: expected at least {expected} bytes, got {got}")]
    Truncated { expected: usize, got: usize },
    #[error("Declared length {declared} doesn't match the {actual} bytes following the length field")]
    LengthMismatch { declared: usize, actual: usize },
    #[error("{len} bytes of descriptors is not a multiple of the {record_size}-byte record size")]
    BadRecordSize { len: usize, record_size: usize },
    #[error("Expected {expected} descriptors, got {got}")]
    EntryCount { expected: usize, got: usize },
    #[error("Empty table of contents")]
    EmptyToc,
    #[error("Invalid track range {first}-{last}")]
    BadTrackRange { first: u8, last: u8 },
    #[error("Tracks out of order: expected track {expected}, got {got}")]
    NonMonotonicTracks { expected: u8, got: u8 },
    #[error("Expected the lead-out descriptor, got track {0}")]
    BadLeadOut(u8),
    #[error("Invalid session {session} (sessions {first}-{last})")]
    BadSession { session: u8, first: u8, last: u8 },
    #[error("Session {session} has no descriptor for point 0x{point:02x}")]
    MissingPseudotrack { session: u8, point: u8 },
    #[error("Session {session} has more than one descriptor for point 0x{point:02x}")]
    DuplicatePseudotrack { session: u8, point: u8 },
    #[error("Session {0} contains no track")]
    EmptySession(u8),
    #[error("Track {0} is missing from the table of contents")]
    MissingTrack(u8),
    #[error("Invalid MSF")]
    InvalidMsf,
    #[error("Track {track} ends before it starts")]
    BadLength { track: u8 },
    #[error("Track number {0} is out of range")]
    TrackOutOfRange(u8),
    #[error("Address {0} is out of range")]
    AddressOutOfRange(u32),
}

impl TocError {
    /// Return the classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            TocError::TrackOutOfRange(_) | TocError::AddressOutOfRange(_) => ErrorKind::Range,
            _ => ErrorKind::Format,
        }
    }
}

/// Convenience type alias for a `Result<R, TocError>`
pub type TocResult<R> = std::result::Result<R, TocError>;

#[test]
fn tocerror_display() {
    // Make sure that TocError implements Display. This should be true if we set an
    // `#[error("...")]` for every variant
    println!("{}", TocError::EmptyToc);

    assert_eq!(TocError::TrackOutOfRange(100).kind(), ErrorKind::Range);
    assert_eq!(TocError::InvalidMsf.kind(), ErrorKind::Format);
}

#[test]
fn session_format() {
    for f in [SessionFormat::CdDaCdRom, SessionFormat::Cdi, SessionFormat::CdXa] {
        assert_eq!(SessionFormat::from_disc_type(f.disc_type()), Some(f));
    }

    assert_eq!(SessionFormat::from_disc_type(0x01), Some(SessionFormat::Cdi));
    assert_eq!(SessionFormat::from_disc_type(0x02), Some(SessionFormat::CdXa));
    assert_eq!(SessionFormat::from_disc_type(0x30), None);
}

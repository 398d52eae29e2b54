//! Multi-session summary, as returned by the MMC READ TOC command with
//! format 0001b.
//!
//! It's a lot cheaper to request than the full TOC and it's enough to
//! tell if a disc has more than one session and where the last one
//! starts. Enhanced CDs put their data track in a second session, so
//! this is what the disc ID code uses to figure out which tracks are
//! actually audio.

use log::debug;

use crate::track::{self, Adr, Control, TrackEntry, TRACK_ENTRY_SIZE};
use crate::{TocError, TocResult};

/// Multi-session summary
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sessions {
    /// Number of the first complete session
    first_session: u8,
    /// Number of the last complete session
    last_session: u8,
    /// First track of the last session
    last_session_track: TrackEntry,
}

impl Sessions {
    /// Build a summary from its parts
    pub fn new(first_session: u8, last_session: u8, last_session_track: TrackEntry) -> TocResult<Sessions> {
        if first_session == 0 || first_session > last_session {
            return Err(TocError::BadSession {
                session: first_session,
                first: first_session,
                last: last_session,
            });
        }

        Ok(Sessions {
            first_session,
            last_session,
            last_session_track,
        })
    }

    /// Parse the binary representation of a multi-session summary
    pub fn deserialize(buf: &[u8]) -> TocResult<Sessions> {
        let (first_session, last_session) = track::parse_header(buf)?;

        let records = &buf[4..];

        if records.len() != TRACK_ENTRY_SIZE {
            return Err(TocError::EntryCount {
                expected: 1,
                got: records.len() / TRACK_ENTRY_SIZE,
            });
        }

        let entry = TrackEntry::parse(array_ref![records, 0, TRACK_ENTRY_SIZE]);

        let sessions = Sessions::new(first_session, last_session, entry)?;

        debug!(
            "Parsed session summary: sessions {}-{}, last session starts with track {} at LBA {}",
            first_session, last_session, entry.number, entry.lba
        );

        Ok(sessions)
    }

    /// Return the binary representation of this summary. This is the
    /// exact inverse of `deserialize`.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + TRACK_ENTRY_SIZE);

        track::write_header(&mut out, TRACK_ENTRY_SIZE, self.first_session, self.last_session);
        out.extend_from_slice(&self.last_session_track.to_bytes());

        out
    }

    /// Number of the first complete session
    pub fn first_session(&self) -> u8 {
        self.first_session
    }

    /// Number of the last complete session
    pub fn last_session(&self) -> u8 {
        self.last_session
    }

    /// True if the disc has more than one session
    pub fn is_multisession(&self) -> bool {
        self.first_session != self.last_session
    }

    /// Descriptor of the first track in the last session
    pub fn last_session_track(&self) -> &TrackEntry {
        &self.last_session_track
    }

    /// Control flags of the first track in the last session
    pub fn last_session_control(&self) -> Control {
        self.last_session_track.control
    }

    /// Sub-Q channel format of the first track in the last session
    pub fn last_session_adr(&self) -> Adr {
        self.last_session_track.adr
    }

    /// Number of the first track in the last session
    pub fn last_session_track_number(&self) -> u8 {
        self.last_session_track.number
    }

    /// Start LBA of the first track in the last session
    pub fn last_session_address(&self) -> u32 {
        self.last_session_track.lba
    }
}

//! Full table of contents, as returned by the MMC READ TOC command
//! with format 0010b.
//!
//! This is pretty much the raw Q subchannel data found in the lead-in
//! of every session: one 11-byte descriptor per track with its
//! absolute MSF, plus three "pseudotracks" per session:
//!
//! * point 0xa0: number of the first track of the session and disc
//!   type (stored in the PSEC field)
//! * point 0xa1: number of the last track of the session
//! * point 0xa2: absolute MSF of the session's lead-out
//!
//! Unlike the simple TOC it's not always available (some drives and
//! OS APIs don't support it) but it has the session boundaries
//! explicitly.

use std::fmt;

use log::{debug, warn};

use crate::msf::Msf;
use crate::track::{self, Adr, Control, FIRST_TRACK_POINT, LAST_TRACK_POINT, LEAD_OUT_POINT, LEAD_OUT_TRACK};
use crate::{SessionFormat, TocError, TocResult};

/// Size in bytes of a full TOC descriptor
pub const FULL_TOC_ENTRY_SIZE: usize = 11;

/// The three pseudotracks recorded in the lead-in of every session
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PseudotrackSlot {
    /// Point 0xa0, first track of the session and disc type
    FirstTrack = 0,
    /// Point 0xa1, last track of the session
    LastTrack = 1,
    /// Point 0xa2, lead-out of the session
    LeadOut = 2,
}

impl PseudotrackSlot {
    /// All slots, in the order they're recorded in the lead-in
    pub const ALL: [PseudotrackSlot; 3] = [
        PseudotrackSlot::FirstTrack,
        PseudotrackSlot::LastTrack,
        PseudotrackSlot::LeadOut,
    ];

    /// Return the slot for `point`, if it's a pseudotrack point.
    /// `LEAD_OUT_TRACK` is accepted as an alias for the lead-out.
    pub fn from_point(point: u8) -> Option<PseudotrackSlot> {
        let s = match point {
            FIRST_TRACK_POINT => PseudotrackSlot::FirstTrack,
            LAST_TRACK_POINT => PseudotrackSlot::LastTrack,
            LEAD_OUT_POINT | LEAD_OUT_TRACK => PseudotrackSlot::LeadOut,
            _ => return None,
        };

        Some(s)
    }

    /// Point value of this slot in the full TOC
    pub fn point(self) -> u8 {
        match self {
            PseudotrackSlot::FirstTrack => FIRST_TRACK_POINT,
            PseudotrackSlot::LastTrack => LAST_TRACK_POINT,
            PseudotrackSlot::LeadOut => LEAD_OUT_POINT,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// A single decoded full TOC descriptor. The time fields are kept
/// raw: PMIN/PSEC/PFRAME only hold an MSF for track and lead-out
/// points and ADR 5 descriptors reuse MIN/SEC/FRAME for other data.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FullTocEntry {
    /// Session number
    pub session: u8,
    /// Format of the sub-Q channel
    pub adr: Adr,
    /// Track attributes
    pub control: Control,
    /// Track number or pseudotrack point
    pub point: u8,
    /// MIN/SEC/FRAME fields, position of this descriptor within the
    /// lead-in
    pub point_address: [u8; 3],
    /// PMIN/PSEC/PFRAME fields
    pub data: [u8; 3],
}

impl FullTocEntry {
    /// Decode a descriptor from its raw bytes. The reserved bytes are
    /// ignored.
    pub fn parse(raw: &[u8; FULL_TOC_ENTRY_SIZE]) -> FullTocEntry {
        let (adr, control) = track::unpack_adr_control(raw[1]);

        FullTocEntry {
            session: raw[0],
            adr,
            control,
            point: raw[3],
            point_address: *array_ref![raw, 4, 3],
            data: *array_ref![raw, 8, 3],
        }
    }

    /// Encode this descriptor, reserved bytes are set to 0
    pub fn to_bytes(&self) -> [u8; FULL_TOC_ENTRY_SIZE] {
        let a = self.point_address;

        [
            self.session,
            track::pack_adr_control(self.adr, self.control),
            0,
            self.point,
            a[0],
            a[1],
            a[2],
            0,
            self.data[0],
            self.data[1],
            self.data[2],
        ]
    }

    /// Return the MIN/SEC/FRAME fields as an MSF
    pub fn point_msf(&self) -> Option<Msf> {
        Msf::from_bytes(&self.point_address)
    }

    /// Return the PMIN/PSEC/PFRAME fields as an MSF
    pub fn address(&self) -> Option<Msf> {
        Msf::from_bytes(&self.data)
    }
}

/// A real (non-pseudo) track of the full TOC
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FullTocTrack {
    /// Session this track belongs to
    pub session: u8,
    /// Format of the sub-Q channel
    pub adr: Adr,
    /// Track attributes
    pub control: Control,
    /// Track number
    pub number: u8,
    /// Position of the descriptor within the lead-in
    pub point_address: Msf,
    /// Absolute MSF of the start of the track
    pub address: Msf,
    /// Length up to the next track of the session or to the session's
    /// lead-out
    pub length: Msf,
}

impl FullTocTrack {
    /// Return the raw descriptor for this track
    pub fn to_entry(&self) -> FullTocEntry {
        FullTocEntry {
            session: self.session,
            adr: self.adr,
            control: self.control,
            point: self.number,
            point_address: self.point_address.to_bytes(),
            data: self.address.to_bytes(),
        }
    }
}

/// Everything the full TOC tells us about a single session
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Session {
    /// Session number
    number: u8,
    /// First track, from the 0xa0 pseudotrack
    first_track: u8,
    /// Last track, from the 0xa1 pseudotrack
    last_track: u8,
    /// Absolute MSF of the lead-out, from the 0xa2 pseudotrack
    lead_out: Msf,
    /// Distance between the first track of the session and its lead-out
    length: Msf,
    /// Pseudotrack descriptors indexed by `PseudotrackSlot`
    pseudotracks: [FullTocEntry; 3],
}

impl Session {
    /// Session number
    pub fn number(&self) -> u8 {
        self.number
    }

    /// Number of the first track in this session
    pub fn first_track(&self) -> u8 {
        self.first_track
    }

    /// Number of the last track in this session
    pub fn last_track(&self) -> u8 {
        self.last_track
    }

    /// Raw disc type byte (PSEC of the 0xa0 pseudotrack)
    pub fn disc_type(&self) -> u8 {
        self.pseudotracks[PseudotrackSlot::FirstTrack.index()].data[1]
    }

    /// Session format, `None` if the disc type byte is not one of the
    /// values defined by the standard
    pub fn format(&self) -> Option<SessionFormat> {
        SessionFormat::from_disc_type(self.disc_type())
    }

    /// Absolute MSF of the lead-out of this session
    pub fn lead_out(&self) -> Msf {
        self.lead_out
    }

    /// Length of the session, from its first track to its lead-out
    pub fn length(&self) -> Msf {
        self.length
    }

    /// Return the descriptor for the pseudotrack `slot`
    pub fn pseudotrack(&self, slot: PseudotrackSlot) -> &FullTocEntry {
        &self.pseudotracks[slot.index()]
    }

    /// Control flags of the pseudotrack `slot`
    pub fn control(&self, slot: PseudotrackSlot) -> Control {
        self.pseudotrack(slot).control
    }

    /// Sub-Q channel format of the pseudotrack `slot`
    pub fn adr(&self, slot: PseudotrackSlot) -> Adr {
        self.pseudotrack(slot).adr
    }
}

/// Full table of contents
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FullToc {
    /// Number of the first complete session
    first_session: u8,
    /// Number of the last complete session
    last_session: u8,
    /// Sessions `first_session..=last_session`
    sessions: Vec<Session>,
    /// Real tracks of all sessions, in order
    tracks: Vec<FullTocTrack>,
}

impl FullToc {
    /// Build a full TOC from its raw descriptors. Pseudotracks are
    /// moved to their session and all the lengths are computed.
    ///
    /// Descriptors with a point that's neither a track number nor one
    /// of the pseudotracks (ADR 5 entries found on multi-session
    /// discs for instance) are ignored.
    pub fn new(first_session: u8, last_session: u8, entries: &[FullTocEntry]) -> TocResult<FullToc> {
        if first_session == 0 || first_session > last_session {
            return Err(TocError::BadSession {
                session: first_session,
                first: first_session,
                last: last_session,
            });
        }

        let nsessions = (last_session - first_session) as usize + 1;

        let mut slots: Vec<[Option<FullTocEntry>; 3]> = vec![[None; 3]; nsessions];
        let mut raw_tracks = Vec::new();

        for e in entries {
            if e.session < first_session || e.session > last_session {
                return Err(TocError::BadSession {
                    session: e.session,
                    first: first_session,
                    last: last_session,
                });
            }

            let slot = match e.point {
                1..=track::MAX_TRACK => {
                    raw_tracks.push(*e);
                    continue;
                }
                FIRST_TRACK_POINT => PseudotrackSlot::FirstTrack,
                LAST_TRACK_POINT => PseudotrackSlot::LastTrack,
                LEAD_OUT_POINT => PseudotrackSlot::LeadOut,
                p => {
                    warn!(
                        "Ignoring full TOC descriptor with point 0x{:02x} (ADR {}) in session {}",
                        p,
                        e.adr.value(),
                        e.session
                    );
                    continue;
                }
            };

            let s = &mut slots[(e.session - first_session) as usize][slot.index()];

            if s.is_some() {
                return Err(TocError::DuplicatePseudotrack {
                    session: e.session,
                    point: e.point,
                });
            }

            *s = Some(*e);
        }

        let mut sessions = Vec::with_capacity(nsessions);

        for (i, session_slots) in slots.iter().enumerate() {
            let number = first_session + i as u8;

            let pseudotrack = |slot: PseudotrackSlot| {
                session_slots[slot.index()].ok_or(TocError::MissingPseudotrack {
                    session: number,
                    point: slot.point(),
                })
            };

            let first = pseudotrack(PseudotrackSlot::FirstTrack)?;
            let last = pseudotrack(PseudotrackSlot::LastTrack)?;
            let lead_out = pseudotrack(PseudotrackSlot::LeadOut)?;

            let lead_out_msf = lead_out.address().ok_or(TocError::InvalidMsf)?;

            sessions.push(Session {
                number,
                first_track: first.data[0],
                last_track: last.data[0],
                lead_out: lead_out_msf,
                // Filled below once we have the tracks
                length: Msf::ZERO,
                pseudotracks: [first, last, lead_out],
            });
        }

        let tracks = reconcile(&mut sessions, first_session, &raw_tracks)?;

        Ok(FullToc {
            first_session,
            last_session,
            sessions,
            tracks,
        })
    }

    /// Parse the binary representation of a full TOC
    pub fn deserialize(buf: &[u8]) -> TocResult<FullToc> {
        let (first_session, last_session) = track::parse_header(buf)?;

        let records = &buf[4..];

        if records.len() % FULL_TOC_ENTRY_SIZE != 0 {
            return Err(TocError::BadRecordSize {
                len: records.len(),
                record_size: FULL_TOC_ENTRY_SIZE,
            });
        }

        let entries: Vec<FullTocEntry> = records
            .chunks_exact(FULL_TOC_ENTRY_SIZE)
            .map(|r| FullTocEntry::parse(array_ref![r, 0, FULL_TOC_ENTRY_SIZE]))
            .collect();

        let toc = FullToc::new(first_session, last_session, &entries)?;

        debug!(
            "Parsed full TOC: sessions {}-{}, tracks {}-{}, lead-out at {}",
            toc.first_session,
            toc.last_session,
            toc.first_track(),
            toc.last_track(),
            toc.disc_length()
        );

        Ok(toc)
    }

    /// Return the binary representation of this full TOC. Each session
    /// is written with its pseudotracks first, then its tracks.
    pub fn serialize(&self) -> Vec<u8> {
        let nentries = self.sessions.len() * 3 + self.tracks.len();
        let records_len = nentries * FULL_TOC_ENTRY_SIZE;
        let mut out = Vec::with_capacity(4 + records_len);

        track::write_header(&mut out, records_len, self.first_session, self.last_session);

        for s in &self.sessions {
            for p in &s.pseudotracks {
                out.extend_from_slice(&p.to_bytes());
            }

            for t in self.tracks.iter().filter(|t| t.session == s.number) {
                out.extend_from_slice(&t.to_entry().to_bytes());
            }
        }

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

    /// All the sessions, in order
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Return session number `session`
    pub fn session(&self, session: u8) -> Option<&Session> {
        if session < self.first_session {
            return None;
        }

        self.sessions.get((session - self.first_session) as usize)
    }

    /// Real tracks of the disc, pseudotracks excluded
    pub fn tracks(&self) -> &[FullTocTrack] {
        &self.tracks
    }

    /// Return track number `track`
    pub fn track(&self, track: u8) -> Option<&FullTocTrack> {
        self.tracks.iter().find(|t| t.number == track)
    }

    /// First track of the first session
    pub fn first_track(&self) -> u8 {
        self.sessions[0].first_track
    }

    /// Last track of the last session
    pub fn last_track(&self) -> u8 {
        self.sessions[self.sessions.len() - 1].last_track
    }

    /// Raw disc type of the first session
    pub fn disc_type(&self) -> u8 {
        self.sessions[0].disc_type()
    }

    /// Lead-out of the last session
    pub fn disc_length(&self) -> Msf {
        self.sessions[self.sessions.len() - 1].lead_out
    }

    /// Session of track `track`
    pub fn track_session(&self, track: u8) -> Option<u8> {
        self.track(track).map(|t| t.session)
    }

    /// Control flags of track `track`
    pub fn track_control(&self, track: u8) -> Option<Control> {
        self.track(track).map(|t| t.control)
    }

    /// Sub-Q channel format of track `track`
    pub fn track_adr(&self, track: u8) -> Option<Adr> {
        self.track(track).map(|t| t.adr)
    }

    /// Absolute MSF of the start of track `track`. `LEAD_OUT_TRACK`
    /// returns the lead-out of the last session.
    pub fn track_address(&self, track: u8) -> Option<Msf> {
        if track == LEAD_OUT_TRACK {
            return Some(self.disc_length());
        }

        self.track(track).map(|t| t.address)
    }

    /// Length of track `track`
    pub fn track_length(&self, track: u8) -> Option<Msf> {
        self.track(track).map(|t| t.length)
    }

    /// Position within the lead-in of session `session` of the
    /// descriptor for `point`, which can be a track of that session or
    /// a pseudotrack point.
    pub fn point_address(&self, session: u8, point: u8) -> Option<Msf> {
        let s = self.session(session)?;

        if let Some(slot) = PseudotrackSlot::from_point(point) {
            return s.pseudotrack(slot).point_msf();
        }

        self.track(point)
            .filter(|t| t.session == session)
            .map(|t| t.point_address)
    }
}

/// Check the track list and compute the lengths of all tracks and
/// sessions
fn reconcile(
    sessions: &mut [Session],
    first_session: u8,
    raw_tracks: &[FullTocEntry],
) -> TocResult<Vec<FullTocTrack>> {
    let mut tracks: Vec<FullTocTrack> = Vec::with_capacity(raw_tracks.len());

    for e in raw_tracks {
        if let Some(prev) = tracks.last() {
            if e.point <= prev.number || e.session < prev.session {
                return Err(TocError::NonMonotonicTracks {
                    expected: prev.number + 1,
                    got: e.point,
                });
            }
        }

        let address = e.address().ok_or(TocError::InvalidMsf)?;
        let point_address = e.point_msf().ok_or(TocError::InvalidMsf)?;

        tracks.push(FullTocTrack {
            session: e.session,
            adr: e.adr,
            control: e.control,
            number: e.point,
            point_address,
            address,
            length: Msf::ZERO,
        });
    }

    for i in 0..tracks.len() {
        let t = tracks[i];
        let session = &sessions[(t.session - first_session) as usize];

        // The last track of a session ends at the session's lead-out
        let end = match tracks.get(i + 1) {
            Some(next) if next.session == t.session => next.address,
            _ => session.lead_out,
        };

        tracks[i].length = end
            .checked_sub(t.address)
            .ok_or(TocError::BadLength { track: t.number })?;
    }

    for s in sessions.iter_mut() {
        if s.first_track == 0 || s.last_track < s.first_track || s.last_track > track::MAX_TRACK {
            return Err(TocError::BadTrackRange {
                first: s.first_track,
                last: s.last_track,
            });
        }

        let first = match tracks.iter().find(|t| t.session == s.number) {
            Some(t) => t,
            None => return Err(TocError::EmptySession(s.number)),
        };

        // The session must hold exactly the tracks its pseudotracks
        // announce
        let mut expected = s.first_track;

        for t in tracks.iter().filter(|t| t.session == s.number) {
            if t.number < s.first_track || t.number > s.last_track {
                return Err(TocError::BadTrackRange {
                    first: s.first_track,
                    last: s.last_track,
                });
            }

            if t.number != expected {
                return Err(TocError::MissingTrack(expected));
            }

            expected += 1;
        }

        if expected <= s.last_track {
            return Err(TocError::MissingTrack(expected));
        }

        s.length = s
            .lead_out
            .checked_sub(first.address)
            .ok_or(TocError::BadLength { track: first.number })?;
    }

    Ok(tracks)
}

impl fmt::Debug for FullToc {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            fmt,
            "Full ToC: {} session{}, {} track{}, total length {}",
            self.sessions.len(),
            if self.sessions.len() == 1 { "" } else { "s" },
            self.tracks.len(),
            if self.tracks.len() == 1 { "" } else { "s" },
            self.disc_length()
        )?;

        for s in &self.sessions {
            writeln!(
                fmt,
                " Session {}: tracks {}-{} type 0x{:02x} lead-out {} length {}",
                s.number, s.first_track, s.last_track, s.disc_type(), s.lead_out, s.length
            )?;

            for t in self.tracks.iter().filter(|t| t.session == s.number) {
                writeln!(
                    fmt,
                    "  - Track {:02}: start {} length {} control {:x}",
                    t.number,
                    t.address,
                    t.length,
                    t.control.value(),
                )?;
            }
        }

        Ok(())
    }
}

//! Disc identifiers computed from the table of contents.
//!
//! Two algorithms are supported:
//!
//! * The FreeDB (formerly CDDB) disc ID, a 32bit value built from the
//!   track start times.
//! * The MusicBrainz disc ID, a base64-encoded SHA-1 digest of the
//!   track offsets.
//!
//! Both only make sense for the audio part of the disc, which is where
//! things get murky for "Enhanced CDs" that have a data track in a
//! second session: MusicBrainz always leaves that session out, while
//! FreeDB IDs are found in the wild computed both ways. The original
//! CDDB algorithm counts every track up to the final lead-out, libdiscid
//! drops the data session just like MusicBrainz does. `FreedbVariant`
//! selects between the two.
//!
//! Both algorithms consume a `DiscLayout`, the normalized list of
//! absolute track offsets, which is built from a `Toc` (optionally
//! helped by a `Sessions` summary) or from a `FullToc`.

use log::debug;

use crate::full_toc::FullToc;
use crate::msf::{MULTISESSION_GAP_FRAMES, PREGAP_FRAMES};
use crate::sessions::Sessions;
use crate::toc::Toc;
use crate::track::MAX_TRACK;
use crate::{TocError, TocResult};

pub mod freedb;
pub mod musicbrainz;

/// Selects how the FreeDB ID treats a data session at the end of the
/// disc
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FreedbVariant {
    /// Original CDDB algorithm: every track counts, up to the lead-out
    /// of the last session
    #[default]
    Cddb,
    /// libdiscid behaviour: the last session is left out when it
    /// contains data, the lead-out is moved back to the end of the
    /// previous session
    LibDiscId,
}

/// Track offsets in the form consumed by the disc ID algorithms. All
/// offsets are absolute frame counts (LBA + 150).
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiscLayout {
    /// First track taken into account
    first_track: u8,
    /// Last track taken into account
    last_track: u8,
    /// Absolute offset of the lead-out
    lead_out: u32,
    /// Absolute offset of every track, indexed by track number - 1.
    /// Unused slots are 0.
    #[cfg_attr(feature = "serde", serde(with = "serde_big_array::BigArray"))]
    offsets: [u32; MAX_TRACK as usize],
}

impl DiscLayout {
    /// Build a layout for tracks `first_track..=last_track`. `offsets`
    /// contains the absolute offset of each of these tracks, in order.
    pub fn new(first_track: u8, last_track: u8, lead_out: u32, offsets: &[u32]) -> TocResult<DiscLayout> {
        if first_track == 0 || first_track > MAX_TRACK {
            return Err(TocError::TrackOutOfRange(first_track));
        }

        if last_track > MAX_TRACK {
            return Err(TocError::TrackOutOfRange(last_track));
        }

        if last_track < first_track {
            return Err(TocError::BadTrackRange {
                first: first_track,
                last: last_track,
            });
        }

        let ntracks = (last_track - first_track) as usize + 1;

        if offsets.len() != ntracks {
            return Err(TocError::EntryCount {
                expected: ntracks,
                got: offsets.len(),
            });
        }

        if lead_out < offsets[0] {
            return Err(TocError::AddressOutOfRange(lead_out));
        }

        let mut layout = DiscLayout {
            first_track,
            last_track,
            lead_out,
            offsets: [0; MAX_TRACK as usize],
        };

        let start = (first_track - 1) as usize;
        layout.offsets[start..start + ntracks].copy_from_slice(offsets);

        Ok(layout)
    }

    /// First track taken into account
    pub fn first_track(&self) -> u8 {
        self.first_track
    }

    /// Last track taken into account
    pub fn last_track(&self) -> u8 {
        self.last_track
    }

    /// Number of tracks taken into account
    pub fn track_count(&self) -> u8 {
        self.last_track - self.first_track + 1
    }

    /// Absolute offset of the lead-out
    pub fn lead_out(&self) -> u32 {
        self.lead_out
    }

    /// Absolute offset of `track`, `None` if it's not part of the
    /// layout
    pub fn offset(&self, track: u8) -> Option<u32> {
        if track < self.first_track || track > self.last_track {
            return None;
        }

        Some(self.offsets[(track - 1) as usize])
    }

    /// Absolute offsets of the tracks taken into account, in order
    pub fn track_offsets(&self) -> &[u32] {
        let start = (self.first_track - 1) as usize;
        let end = self.last_track as usize;

        &self.offsets[start..end]
    }

    /// Compute the FreeDB disc ID for this layout
    pub fn freedb_id(&self) -> u32 {
        freedb::disc_id(self)
    }

    /// Compute the MusicBrainz disc ID for this layout
    pub fn musicbrainz_id(&self) -> String {
        musicbrainz::disc_id(self)
    }
}

impl Toc {
    /// Layout of tracks `first_track..=last_track` ending at LBA
    /// `lead_out`
    fn layout_until(&self, last_track: u8, lead_out: u32) -> TocResult<DiscLayout> {
        let offsets = (self.first_track()..=last_track)
            .map(|t| match self.track_address(t) {
                Some(lba) => lba
                    .checked_add(PREGAP_FRAMES)
                    .ok_or(TocError::AddressOutOfRange(lba)),
                None => Err(TocError::TrackOutOfRange(t)),
            })
            .collect::<TocResult<Vec<u32>>>()?;

        let lead_out = lead_out
            .checked_add(PREGAP_FRAMES)
            .ok_or(TocError::AddressOutOfRange(lead_out))?;

        DiscLayout::new(self.first_track(), last_track, lead_out, &offsets)
    }

    /// Layout of the whole disc
    fn full_layout(&self) -> TocResult<DiscLayout> {
        self.layout_until(self.last_track(), self.disc_length())
    }

    /// Layout of every session but the last one, which starts with
    /// track `track` at LBA `lba`. The lead-out of the previous session
    /// sits `MULTISESSION_GAP_FRAMES` before it.
    fn layout_before_session(&self, track: u8, lba: u32) -> TocResult<DiscLayout> {
        let last_track = match track.checked_sub(1) {
            Some(t) if t >= self.first_track() => t,
            _ => return Err(TocError::TrackOutOfRange(track)),
        };

        let lead_out = lba
            .checked_sub(MULTISESSION_GAP_FRAMES)
            .ok_or(TocError::AddressOutOfRange(lba))?;

        self.layout_until(last_track, lead_out)
    }

    /// Layout without the trailing data track, assuming it's the only
    /// track of a second session
    fn audio_session_layout(&self) -> TocResult<DiscLayout> {
        let last = &self.tracks()[self.tracks().len() - 1];

        self.layout_before_session(last.number, last.lba)
    }

    /// Return the layout used for the MusicBrainz ID.
    ///
    /// If `sessions` describes a multi-session disc the last session is
    /// left out, whatever it contains. Without a session summary a disc
    /// starting with audio and ending with a data track is assumed to
    /// hold that data track alone in a second session.
    pub fn disc_layout(&self, sessions: Option<&Sessions>) -> TocResult<DiscLayout> {
        match sessions {
            Some(s) if s.is_multisession() => {
                self.layout_before_session(s.last_session_track_number(), s.last_session_address())
            }
            Some(_) => self.full_layout(),
            None if self.has_trailing_data_track() => self.audio_session_layout(),
            None => self.full_layout(),
        }
    }

    /// Compute the FreeDB disc ID of this TOC.
    ///
    /// Without a session summary (or for a single session disc) this
    /// is the original CDDB algorithm. A multi-session summary whose
    /// last session starts with a data track selects the libdiscid
    /// variant.
    pub fn freedb_id(&self, sessions: Option<&Sessions>) -> TocResult<u32> {
        let layout = match sessions {
            Some(s) if s.is_multisession() && s.last_session_control().data() => {
                self.layout_before_session(s.last_session_track_number(), s.last_session_address())?
            }
            _ => self.full_layout()?,
        };

        let id = layout.freedb_id();

        debug!("FreeDB ID for TOC: {:08x} ({} tracks)", id, layout.track_count());

        Ok(id)
    }

    /// Compute the FreeDB disc ID of this TOC using the given variant.
    /// The libdiscid variant only differs when the disc starts with an
    /// audio track and ends with a data track.
    pub fn freedb_id_variant(&self, variant: FreedbVariant) -> TocResult<u32> {
        let layout = match variant {
            FreedbVariant::LibDiscId if self.has_trailing_data_track() => self.audio_session_layout()?,
            _ => self.full_layout()?,
        };

        let id = layout.freedb_id();

        debug!("FreeDB ID for TOC ({:?}): {:08x}", variant, id);

        Ok(id)
    }

    /// Compute the MusicBrainz disc ID of this TOC. See `disc_layout`
    /// for the way `sessions` is used.
    pub fn musicbrainz_id(&self, sessions: Option<&Sessions>) -> TocResult<String> {
        let id = self.disc_layout(sessions)?.musicbrainz_id();

        debug!("MusicBrainz ID for TOC: {}", id);

        Ok(id)
    }
}

impl FullToc {
    /// Layout of every track from the first one up to `last_track`,
    /// ending at the absolute frame `lead_out`
    fn layout_until(&self, last_track: u8, lead_out: u32) -> TocResult<DiscLayout> {
        let offsets = (self.first_track()..=last_track)
            .map(|t| match self.track(t) {
                Some(track) => Ok(track.address.sector_index()),
                None => Err(TocError::MissingTrack(t)),
            })
            .collect::<TocResult<Vec<u32>>>()?;

        DiscLayout::new(self.first_track(), last_track, lead_out, &offsets)
    }

    /// Layout of the whole disc, up to the lead-out of the last session
    fn full_layout(&self) -> TocResult<DiscLayout> {
        self.layout_until(self.last_track(), self.disc_length().sector_index())
    }

    /// Return the layout used for the MusicBrainz ID: on multi-session
    /// discs the last session is left out.
    pub fn disc_layout(&self) -> TocResult<DiscLayout> {
        let sessions = self.sessions();

        if sessions.len() < 2 {
            return self.full_layout();
        }

        let s = &sessions[sessions.len() - 2];

        self.layout_until(s.last_track(), s.lead_out().sector_index())
    }

    /// True if the disc has more than one session and the last one
    /// starts with a data track
    fn has_data_session(&self) -> bool {
        let sessions = self.sessions();
        let last = &sessions[sessions.len() - 1];

        sessions.len() > 1
            && self
                .track(last.first_track())
                .map_or(false, |t| t.control.data())
    }

    /// Compute the FreeDB disc ID of this full TOC. The libdiscid
    /// variant only differs from the CDDB one when the last session
    /// starts with a data track.
    pub fn freedb_id(&self, variant: FreedbVariant) -> TocResult<u32> {
        let layout = match variant {
            FreedbVariant::LibDiscId if self.has_data_session() => self.disc_layout()?,
            _ => self.full_layout()?,
        };

        let id = layout.freedb_id();

        debug!("FreeDB ID for full TOC ({:?}): {:08x}", variant, id);

        Ok(id)
    }

    /// Compute the MusicBrainz disc ID of this full TOC
    pub fn musicbrainz_id(&self) -> TocResult<String> {
        let id = self.disc_layout()?.musicbrainz_id();

        debug!("MusicBrainz ID for full TOC: {}", id);

        Ok(id)
    }
}

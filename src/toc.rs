//! Simple table of contents, as returned by the MMC READ TOC command
//! with format 0000b: one descriptor per track with its LBA, followed
//! by the lead-out.

use std::fmt;

use log::debug;

use crate::track::{self, Adr, Control, TrackEntry, LEAD_OUT_TRACK, TRACK_ENTRY_SIZE};
use crate::{TocError, TocResult};

/// Table of contents
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Toc {
    /// Number of the first track
    first_track: u8,
    /// Number of the last track
    last_track: u8,
    /// Tracks `first_track..=last_track`, in order
    tracks: Vec<TrackEntry>,
    /// Lead-out entry
    lead_out: TrackEntry,
}

impl Toc {
    /// Build a TOC from its track list and lead-out. The tracks must
    /// be consecutive and numbered from `first_track`.
    pub fn new(first_track: u8, tracks: Vec<TrackEntry>, lead_out: TrackEntry) -> TocResult<Toc> {
        if tracks.is_empty() {
            return Err(TocError::EmptyToc);
        }

        if first_track == 0 || first_track >= track::FIRST_TRACK_POINT {
            return Err(TocError::BadTrackRange {
                first: first_track,
                last: tracks[tracks.len() - 1].number,
            });
        }

        let mut expected = first_track;

        for t in &tracks {
            if t.number != expected {
                return Err(TocError::NonMonotonicTracks {
                    expected,
                    got: t.number,
                });
            }

            expected = expected.checked_add(1).ok_or(TocError::NonMonotonicTracks {
                expected,
                got: t.number,
            })?;
        }

        if !lead_out.is_lead_out() {
            return Err(TocError::BadLeadOut(lead_out.number));
        }

        let last_track = expected - 1;

        if last_track >= track::FIRST_TRACK_POINT {
            return Err(TocError::BadTrackRange {
                first: first_track,
                last: last_track,
            });
        }

        Ok(Toc {
            first_track,
            last_track,
            tracks,
            lead_out,
        })
    }

    /// Parse the binary representation of a TOC
    pub fn deserialize(buf: &[u8]) -> TocResult<Toc> {
        let (first_track, last_track) = track::parse_header(buf)?;

        if first_track > last_track {
            return Err(TocError::BadTrackRange {
                first: first_track,
                last: last_track,
            });
        }

        let records = &buf[4..];

        if records.len() % TRACK_ENTRY_SIZE != 0 {
            return Err(TocError::BadRecordSize {
                len: records.len(),
                record_size: TRACK_ENTRY_SIZE,
            });
        }

        // One entry per track plus the lead-out
        let expected = (last_track - first_track) as usize + 2;
        let nentries = records.len() / TRACK_ENTRY_SIZE;

        if nentries != expected {
            return Err(TocError::EntryCount {
                expected,
                got: nentries,
            });
        }

        let mut tracks: Vec<TrackEntry> = records
            .chunks_exact(TRACK_ENTRY_SIZE)
            .map(|r| TrackEntry::parse(array_ref![r, 0, TRACK_ENTRY_SIZE]))
            .collect();

        let lead_out = match tracks.pop() {
            Some(l) => l,
            None => return Err(TocError::EmptyToc),
        };

        let toc = Toc::new(first_track, tracks, lead_out)?;

        if toc.last_track != last_track {
            return Err(TocError::BadTrackRange {
                first: first_track,
                last: last_track,
            });
        }

        debug!(
            "Parsed TOC: tracks {}-{}, lead-out at LBA {}",
            toc.first_track, toc.last_track, toc.lead_out.lba
        );

        Ok(toc)
    }

    /// Return the binary representation of this TOC. This is the exact
    /// inverse of `deserialize`.
    pub fn serialize(&self) -> Vec<u8> {
        let records_len = (self.tracks.len() + 1) * TRACK_ENTRY_SIZE;
        let mut out = Vec::with_capacity(4 + records_len);

        track::write_header(&mut out, records_len, self.first_track, self.last_track);

        for t in self.tracks.iter().chain(std::iter::once(&self.lead_out)) {
            out.extend_from_slice(&t.to_bytes());
        }

        out
    }

    /// Number of the first track
    pub fn first_track(&self) -> u8 {
        self.first_track
    }

    /// Number of the last track
    pub fn last_track(&self) -> u8 {
        self.last_track
    }

    /// Return the full track list, lead-out excluded
    pub fn tracks(&self) -> &[TrackEntry] {
        &self.tracks
    }

    /// Lead-out entry
    pub fn lead_out(&self) -> &TrackEntry {
        &self.lead_out
    }

    /// Total length of the disc, i.e. the LBA of the lead-out
    pub fn disc_length(&self) -> u32 {
        self.lead_out.lba
    }

    /// Return the entry for track `track`. `LEAD_OUT_TRACK` returns the
    /// lead-out.
    pub fn track(&self, track: u8) -> Option<&TrackEntry> {
        if track == LEAD_OUT_TRACK {
            return Some(&self.lead_out);
        }

        if track < self.first_track || track > self.last_track {
            return None;
        }

        self.tracks.get((track - self.first_track) as usize)
    }

    /// Control flags of track `track`
    pub fn track_control(&self, track: u8) -> Option<Control> {
        self.track(track).map(|t| t.control)
    }

    /// Sub-Q channel format of track `track`
    pub fn track_adr(&self, track: u8) -> Option<Adr> {
        self.track(track).map(|t| t.adr)
    }

    /// Start LBA of track `track`
    pub fn track_address(&self, track: u8) -> Option<u32> {
        self.track(track).map(|t| t.lba)
    }

    /// Length of track `track` in sectors: up to the next track or, for
    /// the last one, up to the lead-out. Returns `None` if the track
    /// doesn't exist or if the addresses are not increasing.
    pub fn track_length(&self, track: u8) -> Option<u32> {
        if track < self.first_track || track > self.last_track {
            return None;
        }

        let start = self.track(track)?.lba;
        let end = if track == self.last_track {
            self.lead_out.lba
        } else {
            self.track(track + 1)?.lba
        };

        end.checked_sub(start)
    }

    /// First track of the disc is an audio track while the last one
    /// is a data track. This is the usual layout of "Enhanced CDs"
    /// where the data lives in a second session.
    pub fn has_trailing_data_track(&self) -> bool {
        let first = &self.tracks[0];
        let last = &self.tracks[self.tracks.len() - 1];

        self.tracks.len() > 1 && first.control.audio() && last.control.data()
    }
}

impl fmt::Debug for Toc {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            fmt,
            "ToC: {} track{}, lead-out at LBA {}",
            self.tracks.len(),
            if self.tracks.len() == 1 { "" } else { "s" },
            self.lead_out.lba
        )?;

        for t in self.tracks.iter() {
            writeln!(
                fmt,
                " - Track {:02}: LBA {} length {} control {:x} adr {:x}",
                t.number,
                t.lba,
                self.track_length(t.number).unwrap_or(0),
                t.control.value(),
                t.adr.value(),
            )?;
        }

        Ok(())
    }
}

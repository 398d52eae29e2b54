//! Disc ID tests using the TOCs of real discs

use crate::track::LEAD_OUT_TRACK;
use crate::{
    Adr, Control, ErrorKind, FreedbVariant, FullToc, FullTocEntry, Msf, Sessions, Toc, TocError,
    TrackEntry,
};

/// Plain audio CD, 13 tracks
const CDDA: [u32; 14] = [
    179318, 33, 9215, 21515, 37148, 49738, 61485, 77613, 89395, 112275, 124103, 136260, 148358,
    154275,
];

/// Data track followed by 9 audio tracks
const DATA_FIRST: [u32; 11] = [
    262878, 0, 183381, 186504, 190348, 198331, 208208, 217926, 230854, 243284, 251868,
];

/// Enhanced CD: 12 audio tracks and a data track in a second session
const DATA_LAST: [u32; 14] = [
    258988, 0, 21445, 34557, 61903, 83000, 98620, 112124, 135655, 154145, 176766, 194590, 213436,
    244076,
];

fn entry(number: u8, data: bool, lba: u32) -> TrackEntry {
    TrackEntry {
        adr: Adr::POSITION,
        control: Control::new(if data { Control::DATA } else { 0 }).unwrap(),
        number,
        lba,
    }
}

/// Build a TOC from the lead-out LBA followed by the LBA of every track
fn toc(lbas: &[u32], data_tracks: &[u8]) -> Toc {
    let tracks = lbas[1..]
        .iter()
        .enumerate()
        .map(|(i, &lba)| {
            let n = i as u8 + 1;
            entry(n, data_tracks.contains(&n), lba)
        })
        .collect();

    Toc::new(1, tracks, entry(LEAD_OUT_TRACK, false, lbas[0])).unwrap()
}

fn full_entry(session: u8, data: bool, point: u8, payload: [u8; 3]) -> FullTocEntry {
    FullTocEntry {
        session,
        adr: Adr::POSITION,
        control: Control::new(if data { Control::DATA } else { 0 }).unwrap(),
        point,
        point_address: [0; 3],
        data: payload,
    }
}

fn lba_bytes(lba: u32) -> [u8; 3] {
    Msf::from_lba(lba).unwrap().to_bytes()
}

/// Build a full TOC. `sessions` lists the last track and the lead-out
/// LBA of every session.
fn full_toc(lbas: &[u32], data_tracks: &[u8], sessions: &[(u8, u32)]) -> FullToc {
    let mut entries = Vec::new();
    let mut first = 1;

    for (i, &(last, lead_out)) in sessions.iter().enumerate() {
        let session = i as u8 + 1;
        let data = data_tracks.contains(&first);

        entries.push(full_entry(session, data, 0xa0, [first, 0, 0]));
        entries.push(full_entry(session, data, 0xa1, [last, 0, 0]));
        entries.push(full_entry(session, data, 0xa2, lba_bytes(lead_out)));

        for n in first..=last {
            let lba = lbas[n as usize];

            entries.push(full_entry(session, data_tracks.contains(&n), n, lba_bytes(lba)));
        }

        first = last + 1;
    }

    FullToc::new(1, sessions.len() as u8, &entries).unwrap()
}

fn data_last_sessions() -> Sessions {
    Sessions::new(1, 2, entry(13, true, 244076)).unwrap()
}

#[test]
fn cdda_toc() {
    let toc = toc(&CDDA, &[]);

    assert_eq!(toc.freedb_id(None).unwrap(), 0xc009560d);
    assert_eq!(toc.freedb_id_variant(FreedbVariant::LibDiscId).unwrap(), 0xc009560d);
    assert_eq!(toc.musicbrainz_id(None).unwrap(), "5cVTKwEtQPTiqT4A3ktiYJ14WzQ-");
}

#[test]
fn cdda_full_toc() {
    let toc = full_toc(&CDDA, &[], &[(13, CDDA[0])]);

    assert_eq!(toc.freedb_id(FreedbVariant::Cddb).unwrap(), 0xc009560d);
    assert_eq!(toc.freedb_id(FreedbVariant::LibDiscId).unwrap(), 0xc009560d);
    assert_eq!(toc.musicbrainz_id().unwrap(), "5cVTKwEtQPTiqT4A3ktiYJ14WzQ-");
}

#[test]
fn data_first_toc() {
    let toc = toc(&DATA_FIRST, &[1]);

    assert!(!toc.has_trailing_data_track());
    assert_eq!(toc.freedb_id(None).unwrap(), 0x9d0db10a);
    assert_eq!(toc.freedb_id_variant(FreedbVariant::LibDiscId).unwrap(), 0x9d0db10a);
    assert_eq!(toc.musicbrainz_id(None).unwrap(), "ry6UkUayKgncrSiv06fnFKJCadM-");
}

#[test]
fn data_first_full_toc() {
    let toc = full_toc(&DATA_FIRST, &[1], &[(10, DATA_FIRST[0])]);

    assert_eq!(toc.freedb_id(FreedbVariant::Cddb).unwrap(), 0x9d0db10a);
    assert_eq!(toc.freedb_id(FreedbVariant::LibDiscId).unwrap(), 0x9d0db10a);
    assert_eq!(toc.musicbrainz_id().unwrap(), "ry6UkUayKgncrSiv06fnFKJCadM-");
}

#[test]
fn data_first_toc_and_sessions() {
    let toc = toc(&DATA_FIRST, &[1]);
    let sessions = Sessions::new(1, 1, entry(1, true, 0)).unwrap();

    assert_eq!(toc.freedb_id(Some(&sessions)).unwrap(), 0x9d0db10a);
    assert_eq!(
        toc.musicbrainz_id(Some(&sessions)).unwrap(),
        "ry6UkUayKgncrSiv06fnFKJCadM-"
    );
}

#[test]
fn data_last_toc() {
    let toc = toc(&DATA_LAST, &[13]);

    assert!(toc.has_trailing_data_track());

    // Original CDDB algorithm counts the data track
    assert_eq!(toc.freedb_id(None).unwrap(), 0xbe0d7d0d);
    assert_eq!(toc.freedb_id_variant(FreedbVariant::Cddb).unwrap(), 0xbe0d7d0d);
    assert_eq!(toc.freedb_id_variant(FreedbVariant::LibDiscId).unwrap(), 0xae0c1e0c);

    // MusicBrainz always leaves it out
    assert_eq!(toc.musicbrainz_id(None).unwrap(), "iIqthNFjPeboX2O1GKpqvcQIWDc-");
}

#[test]
fn data_last_toc_and_sessions() {
    let toc = toc(&DATA_LAST, &[13]);
    let sessions = data_last_sessions();

    assert_eq!(toc.freedb_id(Some(&sessions)).unwrap(), 0xae0c1e0c);
    assert_eq!(
        toc.musicbrainz_id(Some(&sessions)).unwrap(),
        "iIqthNFjPeboX2O1GKpqvcQIWDc-"
    );

    let layout = toc.disc_layout(Some(&sessions)).unwrap();

    assert_eq!(layout.last_track(), 12);
    assert_eq!(layout.lead_out(), 244076 - 11400 + 150);
}

#[test]
fn data_last_full_toc() {
    let toc = full_toc(&DATA_LAST, &[13], &[(12, 244076 - 11400), (13, DATA_LAST[0])]);

    assert_eq!(toc.session(1).unwrap().lead_out(), Msf::new(51, 44, 26).unwrap());

    assert_eq!(toc.freedb_id(FreedbVariant::Cddb).unwrap(), 0xbe0d7d0d);
    assert_eq!(toc.freedb_id(FreedbVariant::LibDiscId).unwrap(), 0xae0c1e0c);
    assert_eq!(toc.musicbrainz_id().unwrap(), "iIqthNFjPeboX2O1GKpqvcQIWDc-");
}

#[test]
fn full_toc_round_trip_keeps_ids() {
    let toc = full_toc(&DATA_LAST, &[13], &[(12, 244076 - 11400), (13, DATA_LAST[0])]);
    let parsed = FullToc::deserialize(&toc.serialize()).unwrap();

    assert_eq!(parsed.musicbrainz_id().unwrap(), "iIqthNFjPeboX2O1GKpqvcQIWDc-");
    assert_eq!(parsed.freedb_id(FreedbVariant::LibDiscId).unwrap(), 0xae0c1e0c);
}

#[test]
fn toc_round_trip_keeps_ids() {
    let toc = toc(&CDDA, &[]);
    let parsed = Toc::deserialize(&toc.serialize()).unwrap();

    assert_eq!(parsed, toc);
    assert_eq!(parsed.freedb_id(None).unwrap(), 0xc009560d);
}

#[test]
fn single_session_summary_changes_nothing() {
    let toc = toc(&CDDA, &[]);
    let sessions = Sessions::new(1, 1, entry(1, false, 33)).unwrap();

    assert_eq!(toc.freedb_id(Some(&sessions)).unwrap(), 0xc009560d);
    assert_eq!(
        toc.musicbrainz_id(Some(&sessions)).unwrap(),
        "5cVTKwEtQPTiqT4A3ktiYJ14WzQ-"
    );
}

#[test]
fn ids_are_deterministic() {
    let a = toc(&DATA_LAST, &[13]);
    let b = toc(&DATA_LAST, &[13]);

    assert_eq!(a.musicbrainz_id(None).unwrap(), b.musicbrainz_id(None).unwrap());
    assert_eq!(a.freedb_id(None).unwrap(), b.freedb_id(None).unwrap());
}

#[test]
fn musicbrainz_id_depends_on_every_offset() {
    let reference = toc(&CDDA, &[]).musicbrainz_id(None).unwrap();

    for i in 0..CDDA.len() {
        let mut lbas = CDDA;
        lbas[i] += 1;

        let id = toc(&lbas, &[]).musicbrainz_id(None).unwrap();

        assert_ne!(id, reference, "offset {} didn't change the ID", i);
    }
}

#[test]
fn too_many_tracks() {
    let tracks = (98..=100).map(|n| entry(n, false, n as u32 * 1000)).collect();
    let toc = Toc::new(98, tracks, entry(LEAD_OUT_TRACK, false, 200_000)).unwrap();

    let err = toc.musicbrainz_id(None).unwrap_err();

    assert_eq!(err, TocError::TrackOutOfRange(100));
    assert_eq!(err.kind(), ErrorKind::Range);
    assert_eq!(toc.freedb_id(None).unwrap_err().kind(), ErrorKind::Range);
}

#[test]
fn session_gap_underflow() {
    let toc = toc(&DATA_LAST, &[13]);
    let sessions = Sessions::new(1, 2, entry(13, true, 1000)).unwrap();

    let err = toc.freedb_id(Some(&sessions)).unwrap_err();

    assert_eq!(err, TocError::AddressOutOfRange(1000));
    assert_eq!(err.kind(), ErrorKind::Range);
}

#[test]
fn audio_second_session() {
    // Same layout as DATA_LAST but track 13 in the second session is audio
    let toc = toc(&DATA_LAST, &[]);
    let sessions = Sessions::new(1, 2, entry(13, false, 244076)).unwrap();
    let full = full_toc(&DATA_LAST, &[], &[(12, 244076 - 11400), (13, DATA_LAST[0])]);

    // MusicBrainz leaves the last session out whatever it contains
    let id = full.musicbrainz_id().unwrap();

    assert_eq!(id, "iIqthNFjPeboX2O1GKpqvcQIWDc-");
    assert_eq!(toc.musicbrainz_id(Some(&sessions)).unwrap(), id);

    // Without a data track both FreeDB variants agree
    assert_eq!(full.freedb_id(FreedbVariant::Cddb).unwrap(), 0xbe0d7d0d);
    assert_eq!(full.freedb_id(FreedbVariant::LibDiscId).unwrap(), 0xbe0d7d0d);
    assert_eq!(toc.freedb_id(Some(&sessions)).unwrap(), 0xbe0d7d0d);
    assert_eq!(toc.freedb_id_variant(FreedbVariant::LibDiscId).unwrap(), 0xbe0d7d0d);
}

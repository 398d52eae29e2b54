//! MusicBrainz disc ID.
//!
//! The ID is the SHA-1 of an ASCII string made of the first and last
//! track numbers (2 uppercase hex digits each) followed by 100 offsets
//! (8 uppercase hex digits each): the lead-out then tracks 1 to 99,
//! with 0 for the tracks not on the disc. The 20-byte digest is
//! encoded in base64 with an URL-friendly alphabet where `+`, `/` and
//! `=` become `.`, `_` and `-`.

use base64::alphabet::Alphabet;
use base64::engine::general_purpose::{GeneralPurpose, PAD};
use base64::Engine;
use log::trace;
use sha1::{Digest, Sha1};

use super::DiscLayout;
use crate::track::MAX_TRACK;

const ALPHABET: Alphabet =
    match Alphabet::new("ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789._") {
        Ok(a) => a,
        Err(_) => panic!("invalid MusicBrainz base64 alphabet"),
    };

const ENGINE: GeneralPurpose = GeneralPurpose::new(&ALPHABET, PAD);

/// Length of the string fed to SHA-1
const DIGEST_INPUT_LEN: usize = 2 + 2 + 8 * (MAX_TRACK as usize + 1);

/// Build the hex string hashed to compute the ID of `layout`
fn digest_input(layout: &DiscLayout) -> String {
    let mut s = String::with_capacity(DIGEST_INPUT_LEN);

    s.push_str(&format!("{:02X}", layout.first_track()));
    s.push_str(&format!("{:02X}", layout.last_track()));
    s.push_str(&format!("{:08X}", layout.lead_out()));

    for track in 1..=MAX_TRACK {
        s.push_str(&format!("{:08X}", layout.offset(track).unwrap_or(0)));
    }

    s
}

/// Compute the MusicBrainz ID of `layout`
pub fn disc_id(layout: &DiscLayout) -> String {
    let input = digest_input(layout);

    trace!("MusicBrainz digest input: {}", input);

    let mut hasher = Sha1::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();

    ENGINE.encode(digest).replace('=', "-")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn input_layout() {
        let layout = DiscLayout::new(1, 2, 0x1_0000, &[150, 0x1234]).unwrap();
        let s = digest_input(&layout);

        assert_eq!(s.len(), DIGEST_INPUT_LEN);
        assert_eq!(s.len(), 804);
        assert!(s.starts_with("01020001000000000096000012340000000000000000"));
        assert!(s[12 + 8 * 2..].chars().all(|c| c == '0'));
    }

    #[test]
    fn id_format() {
        let layout = DiscLayout::new(1, 1, 1000, &[150]).unwrap();
        let id = disc_id(&layout);

        assert_eq!(id.len(), 28);
        assert!(id.ends_with('-'));
        assert!(id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-'));
    }
}

//! FreeDB/CDDB disc ID.
//!
//! The 32bit ID is made of three fields:
//!
//! ```text
//!  31       24 23                 8 7        0
//! +-----------+--------------------+----------+
//! | checksum  |   length (secs)    |  tracks  |
//! +-----------+--------------------+----------+
//! ```
//!
//! The checksum is the sum of the decimal digits of every track start
//! time in seconds, modulo 255. The length is the number of seconds
//! between the start of the first track and the lead-out.

use log::trace;

use super::DiscLayout;
use crate::msf::FRAMES_PER_SECOND;

/// Sum of the decimal digits of `n`
fn digit_sum(mut n: u32) -> u32 {
    let mut sum = 0;

    while n > 0 {
        sum += n % 10;
        n /= 10;
    }

    sum
}

/// Compute the FreeDB ID of `layout`
pub fn disc_id(layout: &DiscLayout) -> u32 {
    let offsets = layout.track_offsets();

    let checksum = offsets
        .iter()
        .map(|&o| digit_sum(o / FRAMES_PER_SECOND))
        .sum::<u32>()
        % 255;

    let first = offsets[0] / FRAMES_PER_SECOND;
    // 16bit field
    let length = (layout.lead_out() / FRAMES_PER_SECOND - first) & 0xffff;

    trace!(
        "FreeDB checksum {}, length {}s, {} tracks",
        checksum,
        length,
        layout.track_count()
    );

    (checksum << 24) | (length << 8) | layout.track_count() as u32
}

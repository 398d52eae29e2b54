//! Compact discs were originally meant for storing music so positions
//! on the disc are stored in "minute:second:frame" format, where
//! frame means sector.
//!
//! There are 75 frames/sectors in a second, 60 seconds in a
//! minute. Unlike the Q subchannel, the TOC data returned by a drive
//! stores all three components as plain binary bytes.
//!
//! The other addressing scheme is the Logical Block Address (LBA)
//! used by the simple TOC. LBA 0 is the first sector of the program
//! area, which sits at absolute MSF 00:02:00 because of the
//! mandatory 150 sector pregap of track 01.

use std::str::FromStr;
use std::{fmt, ops};

use crate::TocError;

/// Number of frames (sectors) in one second
pub const FRAMES_PER_SECOND: u32 = 75;

/// Number of frames in one minute
pub const FRAMES_PER_MINUTE: u32 = 60 * FRAMES_PER_SECOND;

/// Offset between LBA 0 and absolute MSF 00:00:00
pub const PREGAP_FRAMES: u32 = 150;

/// Number of frames between the lead-out of a session and the first
/// track of the following one: 6750 frames of lead-out, 4500 frames of
/// lead-in and the 150 frame pregap.
pub const MULTISESSION_GAP_FRAMES: u32 = 11_400;

/// CD "minute:second:frame" timestamp stored as a binary triplet. In
/// this context "frame" is synonymous with "sector".
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Msf(u8, u8, u8);

impl Msf {
    /// MSF for 00:00:00
    pub const ZERO: Msf = Msf(0, 0, 0);

    /// MSF for 00:02:00, the absolute position of LBA 0
    pub const LBA_ZERO: Msf = Msf(0, 2, 0);

    /// MSF for 99:59:74
    pub const MAX: Msf = Msf(99, 59, 74);

    /// Build an MSF from its three binary components. Returns `None`
    /// if `m` is greater than 99, `s` greater than 59 or `f` greater
    /// than 74.
    pub const fn new(m: u8, s: u8, f: u8) -> Option<Msf> {
        if m <= 99 && s < 60 && f < 75 {
            Some(Msf(m, s, f))
        } else {
            None
        }
    }

    /// Build an MSF from a raw 3-byte TOC field
    pub fn from_bytes(b: &[u8; 3]) -> Option<Msf> {
        Msf::new(b[0], b[1], b[2])
    }

    /// Return the raw 3-byte TOC representation
    pub const fn to_bytes(self) -> [u8; 3] {
        [self.0, self.1, self.2]
    }

    /// Returns the value of the minutes in this MSF
    pub const fn minutes(self) -> u8 {
        self.0
    }

    /// Returns the value of the seconds in this MSF
    pub const fn seconds(self) -> u8 {
        self.1
    }

    /// Returns the value of the frames in this MSF
    pub const fn frames(self) -> u8 {
        self.2
    }

    /// Convert an MSF into a sector index. In this convention sector
    /// index 0 is MSF 00:00:00
    pub const fn sector_index(self) -> u32 {
        let Msf(m, s, f) = self;

        (m as u32) * FRAMES_PER_MINUTE + (s as u32) * FRAMES_PER_SECOND + (f as u32)
    }

    /// Build an MSF from a sector index. Returns None if the index is
    /// out of range.
    pub const fn from_sector_index(si: u32) -> Option<Msf> {
        let m = si / FRAMES_PER_MINUTE;

        if m > 99 {
            return None;
        }

        let si = si % FRAMES_PER_MINUTE;

        let s = si / FRAMES_PER_SECOND;
        let f = si % FRAMES_PER_SECOND;

        Some(Msf(m as u8, s as u8, f as u8))
    }

    /// Convert an LBA into the absolute MSF of that sector
    pub fn from_lba(lba: u32) -> Option<Msf> {
        lba.checked_add(PREGAP_FRAMES)
            .and_then(Msf::from_sector_index)
    }

    /// Convert this absolute MSF into an LBA. Returns `None` for
    /// positions within the pregap of track 01.
    pub const fn lba(self) -> Option<u32> {
        self.sector_index().checked_sub(PREGAP_FRAMES)
    }

    /// Checked MSF addition. Computes `self + other`, returning
    /// `None` if overflow occurred.
    pub fn checked_add(self, other: Msf) -> Option<Msf> {
        // The maximum sector index for a valid MSF is 449_999 so the
        // u32 addition itself can't overflow
        Msf::from_sector_index(self.sector_index() + other.sector_index())
    }

    /// Computes `self - rhs`, returning `None` if overflow occurred
    pub fn checked_sub(self, rhs: Msf) -> Option<Msf> {
        let a = self.sector_index();
        let b = rhs.sector_index();

        a.checked_sub(b).and_then(Msf::from_sector_index)
    }
}

impl fmt::Display for Msf {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let Msf(m, s, f) = *self;

        write!(fmt, "{:02}:{:02}:{:02}", m, s, f)
    }
}

impl fmt::Debug for Msf {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", self)
    }
}

impl ops::Sub for Msf {
    type Output = Msf;

    fn sub(self, rhs: Msf) -> Msf {
        self.checked_sub(rhs)
            .unwrap_or_else(|| panic!("MSF subtraction overflow {} - {}", self, rhs))
    }
}

impl ops::Add for Msf {
    type Output = Msf;

    fn add(self, rhs: Msf) -> Msf {
        self.checked_add(rhs)
            .unwrap_or_else(|| panic!("MSF addition overflow: {} + {}", self, rhs))
    }
}

impl FromStr for Msf {
    type Err = TocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut msf = [0u8; 3];
        let mut count = 0;

        for (i, s) in s.split(':').enumerate() {
            if i >= 3 {
                return Err(TocError::InvalidMsf);
            }

            count += 1;
            msf[i] = u8::from_str(s).map_err(|_| TocError::InvalidMsf)?;
        }

        if count != 3 {
            return Err(TocError::InvalidMsf);
        }

        Msf::new(msf[0], msf[1], msf[2]).ok_or(TocError::InvalidMsf)
    }
}

#[cfg(test)]
mod test {
    use super::Msf;
    use std::str::FromStr;

    #[test]
    fn conversions() {
        for &(m, s, f) in &[
            (0, 0, 0),
            (1, 0, 0),
            (0, 1, 0),
            (0, 0, 1),
            (12, 34, 56),
            (99, 59, 74),
        ] {
            let m = Msf::new(m, s, f).unwrap();

            assert_eq!(m, Msf::from_sector_index(m.sector_index()).unwrap());
        }

        assert!(Msf::from_sector_index(100 * 60 * 75).is_none());
        assert!(Msf::new(0, 60, 0).is_none());
        assert!(Msf::new(0, 0, 75).is_none());
        assert!(Msf::new(100, 0, 0).is_none());
    }

    #[test]
    fn lba() {
        assert_eq!(Msf::from_lba(0), Some(Msf::LBA_ZERO));
        assert_eq!(Msf::from_lba(33), Msf::new(0, 2, 33));
        assert_eq!(Msf::from_lba(244076), Msf::new(54, 16, 26));
        assert_eq!(Msf::new(51, 44, 26).unwrap().lba(), Some(232676));
        assert_eq!(Msf::new(0, 1, 74).unwrap().lba(), None);
        assert_eq!(Msf::LBA_ZERO.lba(), Some(0));
    }

    #[test]
    fn substractions() {
        let m = Msf::new(12, 34, 56).unwrap();
        let n = Msf::new(0, 0, 2).unwrap();

        assert_eq!(m - n, Msf::new(12, 34, 54).unwrap());

        let m = Msf::new(12, 34, 1).unwrap();
        let n = Msf::new(0, 52, 10).unwrap();

        assert_eq!(m - n, Msf::new(11, 41, 66).unwrap());

        let m = Msf::new(57, 35, 13).unwrap();
        let n = Msf::new(54, 16, 26).unwrap();

        assert_eq!(m - n, Msf::new(3, 18, 62).unwrap());

        assert!(n.checked_sub(m).is_none());
    }

    #[test]
    fn ordering() {
        assert!(Msf::new(1, 0, 0).unwrap() > Msf::new(0, 59, 74).unwrap());
        assert!(Msf::new(0, 2, 1).unwrap() > Msf::LBA_ZERO);
    }

    #[test]
    fn from_str() {
        assert_eq!(Msf::from_str("00:00:00").unwrap(), Msf::ZERO);
        assert_eq!(Msf::from_str("01:02:03").unwrap(), Msf::new(1, 2, 3).unwrap());
        assert_eq!(Msf::from_str("99:59:74").unwrap(), Msf::MAX);

        assert!(Msf::from_str("00").is_err());
        assert!(Msf::from_str("00:00").is_err());
        assert!(Msf::from_str("00:00:00:00").is_err());

        assert!(Msf::from_str("99:99:99").is_err());
        assert!(Msf::from_str("00:60:00").is_err());
        assert!(Msf::from_str("00:00:75").is_err());
    }

    #[test]
    fn display() {
        assert_eq!(Msf::new(4, 16, 40).unwrap().to_string(), "04:16:40");
    }
}

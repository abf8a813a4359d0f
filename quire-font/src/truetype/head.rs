use crate::ParseOptions;
use crate::error::{FontError, Result};
use crate::truetype::read_fixed;
use log::warn;
use quire_common::byte::Reader;

/// The font header table.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HeaderTable {
    pub version: f64,
    pub font_revision: f64,
    pub checksum_adjustment: u32,
    pub magic_number: u32,
    pub flags: u16,
    pub units_per_em: u16,
    /// `None` if the stored date could not be represented.
    pub created: Option<DateTime>,
    pub modified: Option<DateTime>,
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
    pub mac_style: u16,
    pub lowest_rec_ppem: u16,
    pub font_direction_hint: i16,
    /// 0 for short `loca` offsets, 1 for long ones.
    pub index_to_loc_format: i16,
    pub glyph_data_format: i16,
}

impl HeaderTable {
    pub(crate) fn parse(data: &[u8], options: ParseOptions) -> Result<Self> {
        let (table, created, modified) =
            Self::read(&mut Reader::new(data)).ok_or(FontError::Truncated { table: "head" })?;

        Ok(Self {
            created: read_date(created, options)?,
            modified: read_date(modified, options)?,
            ..table
        })
    }

    /// Read the table, returning the raw `created` and `modified` dates
    /// separately.
    fn read(r: &mut Reader<'_>) -> Option<(Self, i64, i64)> {
        let version = read_fixed(r)?;
        let font_revision = read_fixed(r)?;
        let checksum_adjustment = r.read_u32()?;
        let magic_number = r.read_u32()?;
        let flags = r.read_u16()?;
        let units_per_em = r.read_u16()?;
        let created = r.read_u64()? as i64;
        let modified = r.read_u64()? as i64;

        let table = Self {
            version,
            font_revision,
            checksum_adjustment,
            magic_number,
            flags,
            units_per_em,
            created: None,
            modified: None,
            x_min: r.read_i16()?,
            y_min: r.read_i16()?,
            x_max: r.read_i16()?,
            y_max: r.read_i16()?,
            mac_style: r.read_u16()?,
            lowest_rec_ppem: r.read_u16()?,
            font_direction_hint: r.read_i16()?,
            index_to_loc_format: r.read_i16()?,
            glyph_data_format: r.read_i16()?,
        };

        Some((table, created, modified))
    }
}

fn read_date(seconds: i64, options: ParseOptions) -> Result<Option<DateTime>> {
    match DateTime::from_mac_epoch(seconds) {
        Some(date) => Ok(Some(date)),
        None if options.lenient => {
            warn!("ignoring invalid date in `head` table ({seconds} seconds since 1904)");
            Ok(None)
        }
        None => Err(FontError::InvalidDate(seconds)),
    }
}

/// A calendar date and time in UTC.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTime {
    /// Days from 0000-03-01 to 1904-01-01 in the proleptic Gregorian calendar.
    const MAC_EPOCH_DAYS: i64 = 695_361;

    /// Convert a `LONGDATETIME`, the number of seconds since
    /// 1904-01-01T00:00:00.
    ///
    /// Returns `None` for dates outside of the years 1 to 9999.
    pub fn from_mac_epoch(seconds: i64) -> Option<Self> {
        let days = seconds.div_euclid(86_400);
        let time = seconds.rem_euclid(86_400);

        let days = days.checked_add(Self::MAC_EPOCH_DAYS)?;

        // Hinnant's `civil_from_days`, with days counted from 0000-03-01.
        let era = days.div_euclid(146_097);
        let day_of_era = days.rem_euclid(146_097);
        let year_of_era =
            (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
        let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
        let mp = (5 * day_of_year + 2) / 153;
        let day = day_of_year - (153 * mp + 2) / 5 + 1;
        let month = if mp < 10 { mp + 3 } else { mp - 9 };
        let year = year_of_era + era * 400 + i64::from(month <= 2);

        if !(1..=9999).contains(&year) {
            return None;
        }

        Some(Self {
            year: year as u16,
            month: month as u8,
            day: day as u8,
            hour: (time / 3600) as u8,
            minute: (time / 60 % 60) as u8,
            second: (time % 60) as u8,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::truetype::tests::head;

    #[test]
    fn mac_epoch() {
        let date = |year, month, day, hour, minute, second| DateTime {
            year,
            month,
            day,
            hour,
            minute,
            second,
        };

        assert_eq!(DateTime::from_mac_epoch(0), Some(date(1904, 1, 1, 0, 0, 0)));
        assert_eq!(
            DateTime::from_mac_epoch(3_660_681_600 + 86_400 * 59 + 3661),
            Some(date(2020, 2, 29, 1, 1, 1))
        );
        assert_eq!(DateTime::from_mac_epoch(-1), Some(date(1903, 12, 31, 23, 59, 59)));
        assert_eq!(DateTime::from_mac_epoch(i64::MAX), None);
        assert_eq!(DateTime::from_mac_epoch(i64::MIN), None);
    }

    #[test]
    fn parse_header() {
        let table = HeaderTable::parse(&head(1), ParseOptions::default()).unwrap();

        assert_eq!(table.version, 1.0);
        assert_eq!(table.magic_number, 0x5F0F_3CF5);
        assert_eq!(table.created.unwrap().year, 2020);
        assert_eq!(table.modified.unwrap().year, 1904);
        assert_eq!((table.x_min, table.y_max), (-10, 800));
        assert_eq!(table.index_to_loc_format, 1);
    }

    #[test]
    fn invalid_date() {
        let mut data = head(0);
        data[20..28].copy_from_slice(&i64::MAX.to_be_bytes());

        assert_eq!(
            HeaderTable::parse(&data, ParseOptions::default()),
            Err(FontError::InvalidDate(i64::MAX))
        );

        let table = HeaderTable::parse(&data, ParseOptions::lenient(true)).unwrap();
        assert_eq!(table.created, None);
    }

    #[test]
    fn truncated() {
        assert_eq!(
            HeaderTable::parse(&head(0)[..40], ParseOptions::default()),
            Err(FontError::Truncated { table: "head" })
        );
    }
}

/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::time::SystemTime;
use time::OffsetDateTime;

/// Formats a timestamp as `YYYYMMDD'T'HHMMSS'Z'` in UTC, the format of the `X-Sdk-Date` header.
pub(crate) fn format_date_time(time: SystemTime) -> String {
    let time = OffsetDateTime::from(time);
    format!(
        "{:04}{:02}{:02}T{:02}{:02}{:02}Z",
        time.year(),
        u8::from(time.month()),
        time.day(),
        time.hour(),
        time.minute(),
        time.second()
    )
}

#[cfg(test)]
pub(crate) mod test_parsers {
    use std::time::SystemTime;
    use time::{macros::format_description, PrimitiveDateTime};

    pub(crate) fn parse_date_time(date_time_str: &str) -> Result<SystemTime, time::error::Parse> {
        let format = format_description!("[year][month][day]T[hour][minute][second]Z");
        let date_time = PrimitiveDateTime::parse(date_time_str, format)?;
        Ok(date_time.assume_utc().into())
    }
}

#[cfg(test)]
mod tests {
    use super::format_date_time;
    use crate::date_time::test_parsers::parse_date_time;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    #[test]
    fn format_epoch() {
        assert_eq!("19700101T000000Z", format_date_time(UNIX_EPOCH));
    }

    #[test]
    fn format_pads_every_field() {
        // 2019-01-02T03:04:05Z
        let time = UNIX_EPOCH + Duration::from_secs(1_546_398_245);
        assert_eq!("20190102T030405Z", format_date_time(time));
    }

    #[test]
    fn format_truncates_subseconds() {
        let time = UNIX_EPOCH + Duration::from_millis(1_546_398_245_999);
        assert_eq!("20190102T030405Z", format_date_time(time));
    }

    #[test]
    fn parse_then_format() {
        let time = parse_date_time("20191115T033655Z").unwrap();
        assert_eq!("20191115T033655Z", format_date_time(time));
        assert!(time > UNIX_EPOCH && time < SystemTime::now());
    }

    #[test]
    fn parse_rejects_wrong_format() {
        assert!(parse_date_time("2019-11-15T03:36:55Z").is_err());
    }
}

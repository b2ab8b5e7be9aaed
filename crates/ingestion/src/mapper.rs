//! Record mappers.
//!
//! Each mapper turns the columns of one data row (request id already
//! stripped) into the canonical field order for its record kind.

use chrono::{Duration, NaiveDateTime};
use feedline_core::{CanonicalRecord, Error, RecordKind, Result};

/// Timestamp layout used by interval bars.
const BAR_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Number of tick fields passed through.
const TICK_FIELDS: usize = 10;

/// Converts a data row into a canonical record.
pub trait RecordMapper {
    /// Record kind produced.
    fn kind(&self) -> RecordKind;

    /// Minimum number of columns `map` accepts.
    fn min_columns(&self) -> usize;

    /// Map one data row. Fails with [`Error::TooFewColumns`] on short rows.
    fn map(&self, columns: &[&str]) -> Result<CanonicalRecord>;
}

fn check_arity(kind: RecordKind, columns: &[&str], required: usize) -> Result<()> {
    if columns.len() < required {
        return Err(Error::TooFewColumns {
            record: kind.as_str(),
            required,
            actual: columns.len(),
        });
    }
    Ok(())
}

/// Tick rows are already in canonical order.
///
/// Columns: timestamp, last, last size, total volume, bid, ask, tick id,
/// basis for last, market center, conditions, trailing blank.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickMapper;

impl RecordMapper for TickMapper {
    fn kind(&self) -> RecordKind {
        RecordKind::Tick
    }

    fn min_columns(&self) -> usize {
        TICK_FIELDS
    }

    fn map(&self, columns: &[&str]) -> Result<CanonicalRecord> {
        check_arity(self.kind(), columns, self.min_columns())?;
        Ok(columns[..TICK_FIELDS].iter().copied().collect())
    }
}

/// One-minute bars.
///
/// Columns: interval end, high, low, open, close, cumulative volume,
/// period volume, open interest, trailing blank. Emits interval start,
/// open, high, low, close, period volume.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinuteBarMapper;

impl MinuteBarMapper {
    /// Shift an interval-end timestamp back to the interval start.
    pub fn interval_start(timestamp: &str) -> Result<String> {
        let end = NaiveDateTime::parse_from_str(timestamp, BAR_TIMESTAMP_FORMAT).map_err(|e| {
            Error::InvalidTimestamp {
                value: timestamp.to_string(),
                reason: e.to_string(),
            }
        })?;
        let start = end
            .checked_sub_signed(Duration::minutes(1))
            .ok_or_else(|| Error::InvalidTimestamp {
                value: timestamp.to_string(),
                reason: "out of range".to_string(),
            })?;
        Ok(start.format(BAR_TIMESTAMP_FORMAT).to_string())
    }
}

impl RecordMapper for MinuteBarMapper {
    fn kind(&self) -> RecordKind {
        RecordKind::MinuteBar
    }

    fn min_columns(&self) -> usize {
        8
    }

    fn map(&self, columns: &[&str]) -> Result<CanonicalRecord> {
        check_arity(self.kind(), columns, self.min_columns())?;
        let start = Self::interval_start(columns[0])?;
        Ok(CanonicalRecord::new(vec![
            start,
            columns[3].to_string(),
            columns[1].to_string(),
            columns[2].to_string(),
            columns[4].to_string(),
            columns[6].to_string(),
        ]))
    }
}

/// Daily bars.
///
/// Columns: date, high, low, open, close, volume, open interest, trailing
/// blank. Emits date, open, high, low, close, volume, open interest.
#[derive(Debug, Clone, Copy, Default)]
pub struct EodBarMapper;

impl RecordMapper for EodBarMapper {
    fn kind(&self) -> RecordKind {
        RecordKind::EodBar
    }

    fn min_columns(&self) -> usize {
        7
    }

    fn map(&self, columns: &[&str]) -> Result<CanonicalRecord> {
        check_arity(self.kind(), columns, self.min_columns())?;
        Ok([
            columns[0], columns[3], columns[1], columns[2], columns[4], columns[5], columns[6],
        ]
        .into_iter()
        .collect())
    }
}

impl RecordMapper for RecordKind {
    fn kind(&self) -> RecordKind {
        *self
    }

    fn min_columns(&self) -> usize {
        match self {
            RecordKind::Tick => TickMapper.min_columns(),
            RecordKind::MinuteBar => MinuteBarMapper.min_columns(),
            RecordKind::EodBar => EodBarMapper.min_columns(),
        }
    }

    fn map(&self, columns: &[&str]) -> Result<CanonicalRecord> {
        match self {
            RecordKind::Tick => TickMapper.map(columns),
            RecordKind::MinuteBar => MinuteBarMapper.map(columns),
            RecordKind::EodBar => EodBarMapper.map(columns),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedline_core::{split_row, Delimiter};

    const VALID_TICK: &str =
        "999,2019-02-25 11:30:06.691,23.8800,12,6714,23.8700,23.9700,6,O,25,3D87,";
    const SHORT_TICK: &str = "999,2019-02-25 11:30:06.691,23.8800,12,6714,23.8700,23.9700,6,O,25";
    const VALID_MINUTE_BAR: &str =
        "999,2019-02-26 12:22:00,23.8000,23.8000,23.8000,23.8000,13578,100,0,";
    const SHORT_MINUTE_BAR: &str = "999,2019-02-26 12:22:00,23.8000,23.8000,23.8000,23.8000";
    const VALID_EOD_BAR: &str = "999,2019-02-21,24.0600,23.8038,23.8700,24.0000,29183,0,";
    const SHORT_EOD_BAR: &str = "999,2019-02-21,24.0600,23.8038,23.8700,24.0000,29183";

    /// Columns after the request id.
    fn make_data_columns(line: &str) -> Vec<&str> {
        split_row(line).into_iter().skip(1).collect()
    }

    fn assert_too_few(result: Result<CanonicalRecord>, kind: RecordKind) {
        match result {
            Err(Error::TooFewColumns { record, .. }) => assert_eq!(record, kind.as_str()),
            other => panic!("expected TooFewColumns, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_tick() {
        let record = TickMapper.map(&make_data_columns(VALID_TICK)).unwrap();
        assert_eq!(record.len(), 10);
        assert_eq!(
            record.join(Delimiter::Comma),
            "2019-02-25 11:30:06.691,23.8800,12,6714,23.8700,23.9700,6,O,25,3D87"
        );
    }

    #[test]
    fn test_tick_without_trailing_blank() {
        let columns = make_data_columns(
            "999,2019-02-25 11:30:06.691,23.8800,12,6714,23.8700,23.9700,6,O,25,3D87",
        );
        assert_eq!(columns.len(), 10);

        let record = TickMapper.map(&columns).unwrap();
        assert_eq!(
            record.join(Delimiter::Comma),
            "2019-02-25 11:30:06.691,23.8800,12,6714,23.8700,23.9700,6,O,25,3D87"
        );

        let result = crate::dispatcher::dispatch(
            &split_row("999,2019-02-25 11:30:06.691,23.8800,12,6714,23.8700,23.9700,6,O,25,3D87"),
            "999",
            &TickMapper,
            Delimiter::Comma,
        )
        .unwrap();
        assert_eq!(result.as_line(), record.join(Delimiter::Comma));
    }

    #[test]
    fn test_tick_too_few_columns() {
        assert_too_few(TickMapper.map(&make_data_columns(SHORT_TICK)), RecordKind::Tick);
        assert_too_few(TickMapper.map(&[]), RecordKind::Tick);
    }

    #[test]
    fn test_valid_minute_bar() {
        let record = MinuteBarMapper.map(&make_data_columns(VALID_MINUTE_BAR)).unwrap();
        assert_eq!(
            record.join(Delimiter::Comma),
            "2019-02-26 12:21:00,23.8000,23.8000,23.8000,23.8000,100"
        );
    }

    #[test]
    fn test_minute_bar_field_order() {
        let columns = ["2019-02-26 12:22:00", "10", "7", "8", "9", "5000", "42", "3", ""];
        let record = MinuteBarMapper.map(&columns).unwrap();
        assert_eq!(
            record.fields(),
            &["2019-02-26 12:21:00", "8", "10", "7", "9", "42"]
        );
    }

    #[test]
    fn test_minute_bar_too_few_columns() {
        assert_too_few(
            MinuteBarMapper.map(&make_data_columns(SHORT_MINUTE_BAR)),
            RecordKind::MinuteBar,
        );
        assert_too_few(MinuteBarMapper.map(&[]), RecordKind::MinuteBar);
    }

    #[test]
    fn test_interval_start_rollover() {
        let cases = [
            ("2019-02-26 12:00:00", "2019-02-26 11:59:00"),
            ("2019-03-01 00:00:00", "2019-02-28 23:59:00"),
            ("2020-03-01 00:00:00", "2020-02-29 23:59:00"),
            ("2019-01-01 00:00:00", "2018-12-31 23:59:00"),
            ("2019-02-26 12:22:30", "2019-02-26 12:21:30"),
        ];
        for (end, start) in cases {
            assert_eq!(MinuteBarMapper::interval_start(end).unwrap(), start);
        }
    }

    #[test]
    fn test_invalid_minute_bar_timestamp() {
        let columns = ["2019-02-26", "1", "1", "1", "1", "1", "1", "0", ""];
        let err = MinuteBarMapper.map(&columns).unwrap_err();
        assert!(matches!(err, Error::InvalidTimestamp { .. }));
    }

    #[test]
    fn test_valid_eod_bar() {
        let record = EodBarMapper.map(&make_data_columns(VALID_EOD_BAR)).unwrap();
        assert_eq!(
            record.join(Delimiter::Comma),
            "2019-02-21,23.8700,24.0600,23.8038,24.0000,29183,0"
        );
    }

    #[test]
    fn test_eod_bar_too_few_columns() {
        assert_too_few(EodBarMapper.map(&make_data_columns(SHORT_EOD_BAR)), RecordKind::EodBar);
        assert_too_few(EodBarMapper.map(&[]), RecordKind::EodBar);
    }

    #[test]
    fn test_record_kind_delegates() {
        let eod = make_data_columns(VALID_EOD_BAR);
        assert_eq!(
            RecordKind::EodBar.map(&eod).unwrap(),
            EodBarMapper.map(&eod).unwrap()
        );
        assert_eq!(RecordKind::Tick.min_columns(), 10);
        assert_eq!(RecordKind::MinuteBar.min_columns(), 8);
        assert_eq!(RecordKind::EodBar.min_columns(), 7);
        for kind in RecordKind::ALL {
            assert_eq!(kind.kind(), kind);
        }
    }
}

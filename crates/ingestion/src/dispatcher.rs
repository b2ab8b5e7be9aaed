//! Line classification.
//!
//! Decides what kind of message a split feed row is and, for data rows,
//! hands the columns after the request id to the active record mapper.
//!
//! Checks run in a fixed order because several message shapes overlap in
//! column count:
//! 1. empty row
//! 2. system notice
//! 3. end-of-stream sentinel
//! 4. error notice
//! 5. request id mismatch
//! 6. row shorter than the record shape
//! 7. data row

use feedline_core::{
    Delimiter, Dispatch, Error, Result, SkipReason, END_OF_STREAM, ERROR_MARKER, NO_DATA,
    SYSTEM_MARKER,
};
use tracing::{debug, trace, warn};

use crate::mapper::RecordMapper;

/// Classify one row and map it if it is data for `request_id`.
pub fn dispatch<M>(
    columns: &[&str],
    request_id: &str,
    mapper: &M,
    delimiter: Delimiter,
) -> Result<Dispatch>
where
    M: RecordMapper + ?Sized,
{
    let Some(&first) = columns.first() else {
        return Err(Error::malformed("empty row"));
    };
    let second = columns.get(1).copied();

    if first == SYSTEM_MARKER && first != request_id {
        debug!(notice = ?columns, "ignoring system message");
        return Ok(Dispatch::Skip(SkipReason::SystemNotice));
    }

    if first == END_OF_STREAM || second == Some(END_OF_STREAM) {
        trace!(request_id = first, "end of stream");
        return Ok(Dispatch::EndOfStream);
    }

    if let Some((notice_id, payload)) = error_notice(columns, request_id) {
        warn!(request_id = notice_id, error = payload, "upstream error notice");
        let request_id = notice_id.to_string();
        if payload == NO_DATA {
            return Err(Error::UpstreamNoData { request_id });
        }
        let message = if payload.is_empty() {
            "unknown error".to_string()
        } else {
            payload.to_string()
        };
        return Err(Error::Upstream { request_id, message });
    }

    if first != request_id {
        debug!(expected = request_id, actual = first, "row for another request");
        return Err(Error::SubscriptionMismatch {
            expected: request_id.to_string(),
            actual: first.to_string(),
        });
    }

    let data = &columns[1..];
    if data.len() < mapper.min_columns() {
        debug!(
            record = %mapper.kind(),
            required = mapper.min_columns(),
            actual = data.len(),
            "skipping short row"
        );
        return Ok(Dispatch::Skip(SkipReason::TooFewColumns));
    }

    let record = match mapper.map(data) {
        Ok(record) => record,
        Err(e @ Error::TooFewColumns { .. }) => {
            debug!(record = %mapper.kind(), error = %e, "skipping short row");
            return Ok(Dispatch::Skip(SkipReason::TooFewColumns));
        }
        Err(e) => return Err(e),
    };
    let line = record.join(delimiter);
    trace!(record = %mapper.kind(), fields = record.len(), %line, "mapped row");
    Ok(Dispatch::Line(line))
}

/// Same as [`dispatch`], with the delimiter chosen by a "use tabs" flag.
pub fn classify_and_map<M>(
    columns: &[&str],
    request_id: &str,
    mapper: &M,
    use_tab_delimiter: bool,
) -> Result<Dispatch>
where
    M: RecordMapper + ?Sized,
{
    dispatch(
        columns,
        request_id,
        mapper,
        Delimiter::from_tab_flag(use_tab_delimiter),
    )
}

/// `(request id, payload)` of an error notice.
///
/// Notices for a request read `<id>,E,<payload>,...`; notices without a
/// request id read `E,<payload>,...`.
fn error_notice<'a>(columns: &[&'a str], request_id: &str) -> Option<(&'a str, &'a str)> {
    match columns {
        [id, marker, rest @ ..] if *marker == ERROR_MARKER => {
            Some((*id, rest.first().copied().unwrap_or("")))
        }
        [marker, rest @ ..] if *marker == ERROR_MARKER && *marker != request_id => {
            Some(("", rest.first().copied().unwrap_or("")))
        }
        _ => None,
    }
}

//! Parser for lines emitted by the CICS console.
//!
//! The console emits asynchronous line-oriented status text. Each line is
//! classified by its keyword prefix and then run through a per-kind field
//! extractor. Extraction failures are reported as errors so callers can
//! observe them, but a failed line is simply dropped; nothing here is
//! fatal to the listener.
//!
//! # Line formats
//!
//! ```text
//! FREQ: 7044.0 RX/TX
//! CHAN: 'Ham CODAN 003'
//! SCAN: OFF
//! SIDEBAND: USB
//! GPS-POSITION:   'Ham CODAN 005',   1542,   1882, 17/08 14:45, 2753.0015, S, 14023.6726, E, 051521
//! ```

use nom::{
    IResult, Parser,
    bytes::complete::take_while,
    character::complete::char,
    sequence::preceded,
};
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

use crate::message::{CicsMessage, GpsFix, MessageKind};

/// Errors that can occur during field extraction.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid station id: {0}")]
    InvalidStationId(String),

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Classify a raw console line by its keyword prefix.
///
/// Prefixes are tested in order and matching is case-sensitive, anchored
/// to the start of the line. `CALL` deliberately has no trailing colon:
/// the console emits several call-state variants that all begin with
/// those four characters.
pub fn classify(line: &str) -> MessageKind {
    if line.starts_with('>') {
        MessageKind::Prompt
    } else if line.starts_with("FREQ:") {
        MessageKind::Frequency
    } else if line.starts_with("CHAN:") {
        MessageKind::Channel
    } else if line.starts_with("SCAN:") {
        MessageKind::Scan
    } else if line.starts_with("SIDEBAND:") {
        MessageKind::Sideband
    } else if line.starts_with("CALL") {
        MessageKind::Call
    } else if line.starts_with("LINK:") {
        MessageKind::Link
    } else if line.starts_with("GPS-POSITION:") {
        MessageKind::GpsPosition
    } else {
        MessageKind::Unrecognized
    }
}

/// Strip a trailing line terminator (any mix of `\r` and `\n`).
fn strip_terminator(token: &str) -> &str {
    token.trim_end_matches(['\r', '\n'])
}

/// Extract the second single-space-delimited token of a line.
///
/// Splitting is on single spaces: a double space yields an empty token,
/// which is a valid (empty) value. A line with no space at all after the
/// leading keyword is a structural failure.
fn second_token(line: &str) -> ParseResult<&str> {
    let result: IResult<&str, &str> = preceded(
        (take_while(|c: char| c != ' '), char(' ')),
        take_while(|c: char| c != ' '),
    )
    .parse(line);

    match result {
        Ok((_, token)) => Ok(strip_terminator(token)),
        Err(_) => Err(ParseError::MissingField("second token")),
    }
}

/// Extract the text following the first apostrophe, up to the next
/// apostrophe or the end of the line.
///
/// The console quotes channel names; a missing closing quote is accepted
/// and the name runs to the end of the line.
fn quoted_name(line: &str) -> ParseResult<&str> {
    let result: IResult<&str, &str> = preceded(
        (take_while(|c: char| c != '\''), char('\'')),
        take_while(|c: char| c != '\''),
    )
    .parse(line);

    match result {
        Ok((_, name)) => Ok(strip_terminator(name)),
        Err(_) => Err(ParseError::MissingField("quoted channel name")),
    }
}

/// Parse a numeric station id field.
fn parse_station_id(field: &str) -> ParseResult<u32> {
    field
        .trim()
        .parse::<u32>()
        .map_err(|_| ParseError::InvalidStationId(field.trim().to_string()))
}

/// Split a `dddmm.mmmm` coordinate into whole degrees and decimal minutes.
///
/// `degree_digits` is 2 for latitude and 3 for longitude.
fn split_coordinate(text: &str, degree_digits: usize) -> ParseResult<(Decimal, Decimal)> {
    let degrees = text
        .get(..degree_digits)
        .ok_or_else(|| ParseError::InvalidCoordinate(text.to_string()))?;
    let minutes = text
        .get(degree_digits..)
        .ok_or_else(|| ParseError::InvalidCoordinate(text.to_string()))?;

    let degrees = Decimal::from_str(degrees)
        .map_err(|_| ParseError::InvalidCoordinate(text.to_string()))?;
    let minutes = Decimal::from_str(minutes)
        .map_err(|_| ParseError::InvalidCoordinate(text.to_string()))?;

    Ok((degrees, minutes))
}

/// Decode a latitude field (`ddmm.mmmm`) with its hemisphere letter.
///
/// Only `S` negates; any other hemisphere text leaves the value positive.
fn decode_latitude(text: &str, hemisphere: &str) -> ParseResult<Decimal> {
    let (degrees, minutes) = split_coordinate(text, 2)?;
    let value = degrees + minutes / Decimal::from(60);
    Ok(if hemisphere == "S" { -value } else { value })
}

/// Decode a longitude field (`dddmm.mmmm`) with its hemisphere letter.
///
/// Minutes are sliced from the longitude field's own text. Only `W`
/// negates.
fn decode_longitude(text: &str, hemisphere: &str) -> ParseResult<Decimal> {
    let (degrees, minutes) = split_coordinate(text, 3)?;
    let value = degrees + minutes / Decimal::from(60);
    Ok(if hemisphere == "W" { -value } else { value })
}

/// Parse a complete GPS beacon report line.
///
/// The line is comma-separated with nine fields; field 0 holds the
/// `GPS-POSITION:` label and the quoted channel name and is discarded.
/// Extra trailing fields are ignored.
///
/// # Example
///
/// ```
/// use cics_listener::parser::parse_gps_position;
///
/// let line = "GPS-POSITION:   'Ham CODAN 005',   1542,   1882, 17/08 14:45, 2753.0015, S, 14023.6726, E, 051521";
/// let fix = parse_gps_position(line).unwrap();
/// assert_eq!(fix.source_id, 1542);
/// assert_eq!(fix.utc_time, "051521");
/// ```
pub fn parse_gps_position(line: &str) -> ParseResult<GpsFix> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < 9 {
        return Err(ParseError::MissingField("gps report field"));
    }

    let source_id = parse_station_id(fields[1])?;
    let dest_id = parse_station_id(fields[2])?;
    let local_time = fields[3].trim().to_string();
    let latitude = decode_latitude(fields[4].trim(), fields[5].trim())?;
    let longitude = decode_longitude(fields[6].trim(), fields[7].trim())?;
    let utc_time = strip_terminator(fields[8].trim()).to_string();

    Ok(GpsFix {
        source_id,
        dest_id,
        local_time,
        latitude,
        longitude,
        utc_time,
    })
}

/// Classify and extract one raw console line.
///
/// Returns `Ok(None)` for prompt and unrecognized lines (dropped without
/// error), `Ok(Some(message))` for a successfully extracted data line,
/// and `Err` when a recognized line fails field extraction.
///
/// # Example
///
/// ```
/// use cics_listener::parser::parse_line;
/// use cics_listener::message::CicsMessage;
///
/// let msg = parse_line("FREQ: 7044.0 RX/TX\r\n").unwrap();
/// assert_eq!(msg, Some(CicsMessage::Frequency("7044.0".to_string())));
/// ```
pub fn parse_line(line: &str) -> ParseResult<Option<CicsMessage>> {
    let message = match classify(line) {
        MessageKind::Prompt | MessageKind::Unrecognized => return Ok(None),
        MessageKind::Frequency => CicsMessage::Frequency(second_token(line)?.to_string()),
        MessageKind::Channel => CicsMessage::Channel(quoted_name(line)?.to_string()),
        MessageKind::Scan => CicsMessage::Scan(second_token(line)?.to_string()),
        MessageKind::Sideband => CicsMessage::Sideband(second_token(line)?.to_string()),
        MessageKind::Call => CicsMessage::Call(second_token(line)?.to_string()),
        MessageKind::Link => CicsMessage::Link(second_token(line)?.to_string()),
        MessageKind::GpsPosition => CicsMessage::GpsPosition(parse_gps_position(line)?),
    };
    Ok(Some(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const GPS_LINE: &str = "GPS-POSITION:   'Ham CODAN 005',   1542,   1882, 17/08 14:45, 2753.0015, S, 14023.6726, E, 051521\r\n";

    #[test]
    fn test_classify_recognized_prefixes() {
        assert_eq!(classify("> "), MessageKind::Prompt);
        assert_eq!(classify("FREQ: 7044.0 RX/TX"), MessageKind::Frequency);
        assert_eq!(classify("CHAN: 'Ham CODAN 003'"), MessageKind::Channel);
        assert_eq!(classify("SCAN: OFF"), MessageKind::Scan);
        assert_eq!(classify("SIDEBAND: USB"), MessageKind::Sideband);
        assert_eq!(classify("CALL: IN-PROGRESS"), MessageKind::Call);
        assert_eq!(classify("CALLING 1234"), MessageKind::Call);
        assert_eq!(classify("LINK: ESTABLISHED"), MessageKind::Link);
        assert_eq!(classify(GPS_LINE), MessageKind::GpsPosition);
    }

    #[test]
    fn test_classify_unrecognized() {
        assert_eq!(classify(""), MessageKind::Unrecognized);
        assert_eq!(classify("garbage"), MessageKind::Unrecognized);
        // Case-sensitive
        assert_eq!(classify("freq: 7044.0"), MessageKind::Unrecognized);
        // Anchored to start of line
        assert_eq!(classify(" FREQ: 7044.0"), MessageKind::Unrecognized);
        assert_eq!(classify("XFREQ: 7044.0"), MessageKind::Unrecognized);
    }

    #[test]
    fn test_parse_frequency() {
        let msg = parse_line("FREQ: 7044.0 RX/TX\r\n").unwrap();
        assert_eq!(msg, Some(CicsMessage::Frequency("7044.0".to_string())));
    }

    #[test]
    fn test_parse_channel() {
        let msg = parse_line("CHAN: 'Ham CODAN 003'\r\n").unwrap();
        assert_eq!(msg, Some(CicsMessage::Channel("Ham CODAN 003".to_string())));
    }

    #[test]
    fn test_parse_channel_unterminated_quote() {
        let msg = parse_line("CHAN: 'Ham CODAN 003\r\n").unwrap();
        assert_eq!(msg, Some(CicsMessage::Channel("Ham CODAN 003".to_string())));
    }

    #[test]
    fn test_parse_scan_state() {
        let msg = parse_line("SCAN: OFF\r\n").unwrap();
        assert_eq!(msg, Some(CicsMessage::Scan("OFF".to_string())));

        // Terminator already stripped upstream is fine too
        let msg = parse_line("SCAN: ON").unwrap();
        assert_eq!(msg, Some(CicsMessage::Scan("ON".to_string())));
    }

    #[test]
    fn test_parse_sideband_call_link() {
        assert_eq!(
            parse_line("SIDEBAND: USB\r\n").unwrap(),
            Some(CicsMessage::Sideband("USB".to_string()))
        );
        assert_eq!(
            parse_line("CALL: 1234\r\n").unwrap(),
            Some(CicsMessage::Call("1234".to_string()))
        );
        assert_eq!(
            parse_line("LINK: ESTABLISHED\r\n").unwrap(),
            Some(CicsMessage::Link("ESTABLISHED".to_string()))
        );
    }

    #[test]
    fn test_prompt_and_unrecognized_produce_nothing() {
        assert_eq!(parse_line("> \r\n").unwrap(), None);
        assert_eq!(parse_line("BATTERY LOW\r\n").unwrap(), None);
    }

    #[test]
    fn test_missing_delimiter_is_an_error() {
        assert!(parse_line("FREQ:\r\n").is_err());
        assert!(parse_line("CHAN: no quotes here\r\n").is_err());
    }

    #[test]
    fn test_double_space_yields_empty_value() {
        // Splitting is on single spaces; a double space produces an empty
        // second token, which is stored as-is.
        let msg = parse_line("FREQ:  7044.0").unwrap();
        assert_eq!(msg, Some(CicsMessage::Frequency(String::new())));
    }

    #[test]
    fn test_parse_gps_position_full_line() {
        let fix = parse_gps_position(GPS_LINE).unwrap();

        assert_eq!(fix.source_id, 1542);
        assert_eq!(fix.dest_id, 1882);
        assert_eq!(fix.local_time, "17/08 14:45");
        assert_eq!(fix.utc_time, "051521");

        // 2753.0015 S -> -(27 + 53.0015/60), computed in exact decimal
        let expected_lat =
            -(Decimal::from(27) + Decimal::from_str("53.0015").unwrap() / Decimal::from(60));
        assert_eq!(fix.latitude, expected_lat);
        assert_eq!(
            fix.latitude.round_dp(4),
            Decimal::from_str("-27.8834").unwrap()
        );

        // 14023.6726 E -> 140 + 23.6726/60, from the longitude field's own
        // characters
        let expected_lon =
            Decimal::from(140) + Decimal::from_str("23.6726").unwrap() / Decimal::from(60);
        assert_eq!(fix.longitude, expected_lon);
        assert_eq!(
            fix.longitude.round_dp(4),
            Decimal::from_str("140.3945").unwrap()
        );
    }

    #[test]
    fn test_gps_northern_western_hemispheres() {
        let line = "GPS-POSITION: 'Net', 12, 34, 01/01 00:00, 4530.0000, N, 07245.0000, W, 120000";
        let fix = parse_gps_position(line).unwrap();

        assert_eq!(
            fix.latitude,
            Decimal::from(45) + Decimal::from(30) / Decimal::from(60)
        );
        assert_eq!(
            fix.longitude,
            -(Decimal::from(72) + Decimal::from(45) / Decimal::from(60))
        );
    }

    #[test]
    fn test_gps_unknown_hemisphere_stays_positive() {
        let line = "GPS-POSITION: 'Net', 12, 34, 01/01 00:00, 4530.0000, X, 07245.0000, Y, 120000";
        let fix = parse_gps_position(line).unwrap();
        assert!(fix.latitude > Decimal::ZERO);
        assert!(fix.longitude > Decimal::ZERO);
    }

    #[test]
    fn test_gps_too_few_fields() {
        let line = "GPS-POSITION: 'Net', 12, 34, 01/01 00:00, 4530.0000, S";
        assert!(matches!(
            parse_gps_position(line),
            Err(ParseError::MissingField(_))
        ));
    }

    #[test]
    fn test_gps_bad_station_id() {
        let line =
            "GPS-POSITION: 'Net', banana, 34, 01/01 00:00, 4530.0000, S, 07245.0000, E, 120000";
        assert!(matches!(
            parse_gps_position(line),
            Err(ParseError::InvalidStationId(_))
        ));
    }

    #[test]
    fn test_gps_truncated_coordinate() {
        // Latitude with no minutes portion cannot be decoded
        let line = "GPS-POSITION: 'Net', 12, 34, 01/01 00:00, 45, S, 07245.0000, E, 120000";
        assert!(matches!(
            parse_gps_position(line),
            Err(ParseError::InvalidCoordinate(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_latitude_decodes_exactly(
            deg in 0u32..90,
            min in 0u32..60,
            frac in 0u32..10_000,
        ) {
            let text = format!("{:02}{:02}.{:04}", deg, min, frac);
            let decoded = decode_latitude(&text, "S").unwrap();

            let minutes = Decimal::from_str(&format!("{:02}.{:04}", min, frac)).unwrap();
            let expected = -(Decimal::from(deg) + minutes / Decimal::from(60));
            prop_assert_eq!(decoded, expected);
        }

        #[test]
        fn prop_longitude_decodes_exactly(
            deg in 0u32..180,
            min in 0u32..60,
            frac in 0u32..10_000,
        ) {
            let text = format!("{:03}{:02}.{:04}", deg, min, frac);
            let decoded = decode_longitude(&text, "E").unwrap();

            let minutes = Decimal::from_str(&format!("{:02}.{:04}", min, frac)).unwrap();
            let expected = Decimal::from(deg) + minutes / Decimal::from(60);
            prop_assert_eq!(decoded, expected);
        }
    }
}

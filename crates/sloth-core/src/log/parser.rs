use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    /// The quoted request segment: `"<METHOD> <path>[ <protocol>]"`.
    static ref REQUEST_PATTERN: Regex =
        Regex::new(r#""(?P<method>[A-Z]+) (?P<path>[^\s"]+)(?: (?P<protocol>HTTP/\d(?:\.\d)?))?""#)
            .unwrap();
}

/// One successfully parsed access log line
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRecord {
    pub request_path: String,
    pub request_time: f64,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LineParseError {
    #[error("no quoted request segment")]
    MissingRequest,

    #[error("no request time after the request segment")]
    MissingRequestTime,

    #[error("invalid request time: {0:?}")]
    InvalidRequestTime(String),
}

/// Parser for the nginx `ui_short` access log format.
///
/// The accepted grammar, as a regular expression:
///
/// ```text
/// ^.*?"(?P<method>[A-Z]+) (?P<path>[^\s"]+)( HTTP/\d(\.\d)?)?"(\s.*)?\s(?P<time>\S+)\s*$
/// ```
///
/// The first quoted `METHOD path [protocol]` segment supplies the request
/// path; the last whitespace-separated token of the line, which must come
/// after that segment, is the request time in seconds. Lines from the
/// deployed format look like:
///
/// ```text
/// 1.196.116.32 -  - [29/Jun/2017:03:50:22 +0300] "GET /api/v2/banner/25019354 HTTP/1.1" 200 927 "-" "Lynx/2.8.8dev.9" "-" "1498697422-2190034393-4708-9752759" "dc7161be3" 0.390
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct LineParser;

impl LineParser {
    pub fn parse(&self, line: &str) -> Result<ParsedRecord, LineParseError> {
        let caps = REQUEST_PATTERN
            .captures(line)
            .ok_or(LineParseError::MissingRequest)?;

        let request_end = caps.get(0).map_or(line.len(), |m| m.end());
        let tail = &line[request_end..];

        let token = tail
            .split_whitespace()
            .last()
            .ok_or(LineParseError::MissingRequestTime)?;

        let request_time = parse_request_time(token)?;

        Ok(ParsedRecord {
            request_path: caps["path"].to_string(),
            request_time,
        })
    }
}

/// Non-numeric, non-finite and negative values are all rejected
fn parse_request_time(token: &str) -> Result<f64, LineParseError> {
    match token.parse::<f64>() {
        Ok(time) if time.is_finite() && time >= 0.0 => Ok(time),
        _ => Err(LineParseError::InvalidRequestTime(token.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UI_SHORT_LINE: &str = r#"1.196.116.32 -  - [29/Jun/2017:03:50:22 +0300] "GET /api/v2/banner/25019354 HTTP/1.1" 200 927 "-" "Lynx/2.8.8dev.9 libwww-FM/2.14 SSL-MM/1.4.1 GNUTLS/2.10.5" "-" "1498697422-2190034393-4708-9752759" "dc7161be3" 0.390"#;

    fn parse(line: &str) -> Result<ParsedRecord, LineParseError> {
        LineParser.parse(line)
    }

    #[test]
    fn test_parse_ui_short_line() {
        let record = parse(UI_SHORT_LINE).unwrap();
        assert_eq!(record.request_path, "/api/v2/banner/25019354");
        assert_eq!(record.request_time, 0.390);
    }

    #[test]
    fn test_parse_minimal_line() {
        let record =
            parse(r#"127.0.0.1 - - [01/Jan/2022:00:00:00 +0000] "GET /test-url HTTP/1.1" 200 0.123"#)
                .unwrap();
        assert_eq!(record.request_path, "/test-url");
        assert_eq!(record.request_time, 0.123);
    }

    #[test]
    fn test_parse_request_without_protocol() {
        let record = parse(r#"1.2.3.4 - - [x] "POST /api/1/photo/upload" 200 12 0.002"#).unwrap();
        assert_eq!(record.request_path, "/api/1/photo/upload");
        assert_eq!(record.request_time, 0.002);
    }

    #[test]
    fn test_trailing_whitespace_is_ignored() {
        let record = parse("1.2.3.4 \"GET /a HTTP/1.0\" 200 1.5 \r\n").unwrap();
        assert_eq!(record.request_time, 1.5);
    }

    #[test]
    fn test_missing_quotes() {
        assert_eq!(
            parse("1.2.3.4 - - [x] GET /a HTTP/1.1 200 0.1"),
            Err(LineParseError::MissingRequest)
        );
    }

    #[test]
    fn test_dash_request() {
        assert_eq!(
            parse(r#"1.2.3.4 - - [x] "-" 400 0 "-" "-" "-" "-" "-" 0.000"#),
            Err(LineParseError::MissingRequest)
        );
    }

    #[test]
    fn test_missing_time() {
        assert_eq!(
            parse(r#"1.2.3.4 - - [x] "GET /a HTTP/1.1""#),
            Err(LineParseError::MissingRequestTime)
        );
    }

    #[test]
    fn test_non_numeric_time_fails_closed() {
        assert_eq!(
            parse(r#"1.2.3.4 - - [x] "GET /a HTTP/1.1" 200 "-""#),
            Err(LineParseError::InvalidRequestTime("\"-\"".to_string()))
        );
        assert!(matches!(
            parse(r#"1.2.3.4 "GET /a HTTP/1.1" 200 abc"#),
            Err(LineParseError::InvalidRequestTime(_))
        ));
    }

    #[test]
    fn test_non_finite_and_negative_times_rejected() {
        for token in ["nan", "inf", "-0.5"] {
            let line = format!(r#"1.2.3.4 "GET /a HTTP/1.1" 200 {token}"#);
            assert_eq!(
                parse(&line),
                Err(LineParseError::InvalidRequestTime(token.to_string()))
            );
        }
    }

    #[test]
    fn test_empty_line() {
        assert_eq!(parse(""), Err(LineParseError::MissingRequest));
    }

    #[test]
    fn test_parse_is_deterministic() {
        assert_eq!(parse(UI_SHORT_LINE), parse(UI_SHORT_LINE));
    }
}

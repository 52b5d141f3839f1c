use super::types::{
    Header, HttpVersion, Limits, ParseError, ParseErrorKind, Request, RequestLine, Response,
    StatusLine, header_value,
};

const CRLF: &[u8] = b"\r\n";
const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseStatus<T> {
    NeedMore,
    Complete { message: T },
    Error { error: ParseError },
}

/// Incremental HTTP/1.1 request parser. Bytes are pushed as they arrive;
/// a completed message is drained from the internal buffer so pipelined
/// requests on the same connection can be pulled out with `poll`.
#[derive(Debug, Default)]
pub struct RequestParser {
    buffer: Vec<u8>,
    limits: Limits,
}

impl RequestParser {
    pub fn new() -> Self {
        Self::with_limits(Limits::default())
    }

    pub fn with_limits(limits: Limits) -> Self {
        Self {
            buffer: Vec::new(),
            limits,
        }
    }

    pub fn push(&mut self, bytes: &[u8]) -> ParseStatus<Request> {
        self.buffer.extend_from_slice(bytes);
        self.poll()
    }

    /// Re-attempts a parse on already-buffered bytes without new input.
    pub fn poll(&mut self) -> ParseStatus<Request> {
        match parse_request(&self.buffer, self.limits) {
            Ok(Some((message, consumed))) => {
                self.buffer.drain(..consumed);
                ParseStatus::Complete { message }
            }
            Ok(None) => ParseStatus::NeedMore,
            Err(error) => ParseStatus::Error { error },
        }
    }
}

#[derive(Debug, Default)]
pub struct ResponseParser {
    buffer: Vec<u8>,
    limits: Limits,
    /// Responses to HEAD carry headers describing a body that is never
    /// sent; framing must ignore Content-Length for them.
    head_response: bool,
}

impl ResponseParser {
    pub fn new() -> Self {
        Self::with_limits(Limits::default())
    }

    /// Parser aware of the request method the response answers.
    pub fn for_method(method: &str) -> Self {
        Self {
            head_response: method.eq_ignore_ascii_case("HEAD"),
            ..Self::new()
        }
    }

    pub fn with_limits(limits: Limits) -> Self {
        Self {
            buffer: Vec::new(),
            limits,
            head_response: false,
        }
    }

    pub fn push(&mut self, bytes: &[u8]) -> ParseStatus<Response> {
        self.buffer.extend_from_slice(bytes);
        self.poll()
    }

    pub fn poll(&mut self) -> ParseStatus<Response> {
        match parse_response(&self.buffer, self.limits, self.head_response) {
            Ok(Some((message, consumed))) => {
                self.buffer.drain(..consumed);
                ParseStatus::Complete { message }
            }
            Ok(None) => ParseStatus::NeedMore,
            Err(error) => ParseStatus::Error { error },
        }
    }
}

type Parsed<T> = Result<Option<(T, usize)>, ParseError>;

fn parse_request(buffer: &[u8], limits: Limits) -> Parsed<Request> {
    let Some(headers_end) = find_headers_end(buffer, limits)? else {
        return Ok(None);
    };

    let (line_text, rest) = split_first_line(&buffer[..headers_end])?;
    let line = parse_request_line(line_text)?;
    let headers = parse_headers(rest)?;

    let body_start = headers_end + HEADER_TERMINATOR.len();
    let Some((body, body_len)) = parse_body(buffer, body_start, &headers, limits)? else {
        return Ok(None);
    };

    Ok(Some((
        Request {
            line,
            headers,
            body,
        },
        body_start + body_len,
    )))
}

fn parse_response(buffer: &[u8], limits: Limits, head_response: bool) -> Parsed<Response> {
    let Some(headers_end) = find_headers_end(buffer, limits)? else {
        return Ok(None);
    };

    let (line_text, rest) = split_first_line(&buffer[..headers_end])?;
    let line = parse_status_line(line_text)?;
    let headers = parse_headers(rest)?;

    let body_start = headers_end + HEADER_TERMINATOR.len();
    if head_response || !status_allows_body(line.status_code) {
        return Ok(Some((
            Response {
                line,
                headers,
                body: Vec::new(),
            },
            body_start,
        )));
    }

    let Some((body, body_len)) = parse_body(buffer, body_start, &headers, limits)? else {
        return Ok(None);
    };

    Ok(Some((
        Response {
            line,
            headers,
            body,
        },
        body_start + body_len,
    )))
}

fn find_headers_end(buffer: &[u8], limits: Limits) -> Result<Option<usize>, ParseError> {
    match twoway::find_bytes(buffer, HEADER_TERMINATOR) {
        Some(index) if index > limits.max_header_bytes => Err(ParseError {
            kind: ParseErrorKind::HeaderTooLarge,
        }),
        Some(index) => Ok(Some(index)),
        None if buffer.len() > limits.max_header_bytes => Err(ParseError {
            kind: ParseErrorKind::HeaderTooLarge,
        }),
        None => Ok(None),
    }
}

fn split_first_line(head: &[u8]) -> Result<(&str, &str), ParseError> {
    let text = std::str::from_utf8(head).map_err(|_| ParseError {
        kind: ParseErrorKind::InvalidStartLine,
    })?;
    Ok(match text.split_once("\r\n") {
        Some((line, rest)) => (line, rest),
        None => (text, ""),
    })
}

fn parse_request_line(line: &str) -> Result<RequestLine, ParseError> {
    let invalid = ParseError {
        kind: ParseErrorKind::InvalidStartLine,
    };

    let mut parts = line.split_whitespace();
    let method = parts.next().ok_or(invalid.clone())?;
    let target = parts.next().ok_or(invalid.clone())?;
    let version = parts.next().unwrap_or("HTTP/1.1");
    if parts.next().is_some() {
        return Err(invalid);
    }

    Ok(RequestLine {
        method: method.to_string(),
        target: target.to_string(),
        version: parse_version(version),
    })
}

fn parse_status_line(line: &str) -> Result<StatusLine, ParseError> {
    let invalid = ParseError {
        kind: ParseErrorKind::InvalidStatusLine,
    };

    let mut parts = line.splitn(3, ' ');
    let version = parts.next().ok_or(invalid.clone())?;
    let status_code = parts
        .next()
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or(invalid)?;
    let reason = parts.next().unwrap_or("");

    Ok(StatusLine {
        version: parse_version(version),
        status_code,
        reason: reason.to_string(),
    })
}

/// 1xx, 204, and 304 responses never carry a body.
fn status_allows_body(status_code: u16) -> bool {
    !matches!(status_code, 100..=199 | 204 | 304)
}

fn parse_version(raw: &str) -> HttpVersion {
    match raw {
        "HTTP/1.0" => HttpVersion::Http10,
        "HTTP/1.1" => HttpVersion::Http11,
        other => HttpVersion::Other(other.to_string()),
    }
}

fn parse_headers(text: &str) -> Result<Vec<Header>, ParseError> {
    let mut headers: Vec<Header> = Vec::new();

    for line in text.split("\r\n") {
        if line.is_empty() {
            continue;
        }

        // Obsolete line folding continues the previous header value.
        if line.starts_with(' ') || line.starts_with('\t') {
            let Some(last) = headers.last_mut() else {
                return Err(ParseError {
                    kind: ParseErrorKind::InvalidHeader,
                });
            };
            last.value.push(' ');
            last.value.push_str(line.trim());
            continue;
        }

        let Some((raw_name, value)) = line.split_once(':') else {
            return Err(ParseError {
                kind: ParseErrorKind::InvalidHeader,
            });
        };

        headers.push(Header {
            name: raw_name.trim().to_ascii_lowercase(),
            raw_name: raw_name.to_string(),
            value: value.trim().to_string(),
        });
    }

    Ok(headers)
}

/// Returns the body and its on-wire length, or None when more bytes are
/// needed. Messages with neither Content-Length nor chunked encoding are
/// treated as having no body.
fn parse_body(
    buffer: &[u8],
    body_start: usize,
    headers: &[Header],
    limits: Limits,
) -> Parsed<Vec<u8>> {
    if let Some(length) = content_length(headers) {
        if length > limits.max_body_bytes {
            return Err(ParseError {
                kind: ParseErrorKind::BodyTooLarge,
            });
        }
        if buffer.len() < body_start + length {
            return Ok(None);
        }
        return Ok(Some((
            buffer[body_start..body_start + length].to_vec(),
            length,
        )));
    }

    if is_chunked(headers) {
        return parse_chunked(buffer, body_start, limits);
    }

    Ok(Some((Vec::new(), 0)))
}

fn content_length(headers: &[Header]) -> Option<usize> {
    header_value(headers, "content-length").and_then(|value| value.trim().parse::<usize>().ok())
}

fn is_chunked(headers: &[Header]) -> bool {
    header_value(headers, "transfer-encoding")
        .map(|value| {
            value
                .split(',')
                .any(|encoding| encoding.trim().eq_ignore_ascii_case("chunked"))
        })
        .unwrap_or(false)
}

fn parse_chunked(buffer: &[u8], body_start: usize, limits: Limits) -> Parsed<Vec<u8>> {
    let mut cursor = body_start;
    let mut body = Vec::new();

    loop {
        let Some(line_end) = twoway::find_bytes(&buffer[cursor..], CRLF).map(|off| cursor + off)
        else {
            return Ok(None);
        };
        let size_text = std::str::from_utf8(&buffer[cursor..line_end]).map_err(|_| ParseError {
            kind: ParseErrorKind::InvalidChunk,
        })?;
        let size_text = size_text.split(';').next().unwrap_or("").trim();
        let size = usize::from_str_radix(size_text, 16).map_err(|_| ParseError {
            kind: ParseErrorKind::InvalidChunk,
        })?;
        cursor = line_end + CRLF.len();

        if size == 0 {
            // Trailer section is not supported; expect the final CRLF.
            if buffer.len() < cursor + CRLF.len() {
                return Ok(None);
            }
            cursor += CRLF.len();
            break;
        }

        if buffer.len() < cursor + size + CRLF.len() {
            return Ok(None);
        }
        if body.len() + size > limits.max_body_bytes {
            return Err(ParseError {
                kind: ParseErrorKind::BodyTooLarge,
            });
        }
        body.extend_from_slice(&buffer[cursor..cursor + size]);
        cursor += size;

        if &buffer[cursor..cursor + CRLF.len()] != CRLF {
            return Err(ParseError {
                kind: ParseErrorKind::InvalidChunk,
            });
        }
        cursor += CRLF.len();
    }

    Ok(Some((body, cursor - body_start)))
}

#[cfg(test)]
mod tests {
    use super::{ParseStatus, RequestParser, ResponseParser};
    use crate::http1::Limits;

    #[test]
    fn parses_simple_request() {
        let mut parser = RequestParser::new();
        let status = parser.push(b"GET /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n");

        match status {
            ParseStatus::Complete { message } => {
                assert_eq!(message.line.method, "GET");
                assert_eq!(message.line.target, "/index.html");
                assert_eq!(message.header("host"), Some("example.com"));
            }
            other => panic!("unexpected status {other:?}"),
        }
    }

    #[test]
    fn parses_request_split_across_reads() {
        let mut parser = RequestParser::new();
        assert!(matches!(
            parser.push(b"POST /submit HTTP/1.1\r\nContent-Le"),
            ParseStatus::NeedMore
        ));
        let status = parser.push(b"ngth: 4\r\n\r\nabcd");
        match status {
            ParseStatus::Complete { message } => assert_eq!(message.body, b"abcd"),
            other => panic!("unexpected status {other:?}"),
        }
    }

    #[test]
    fn poll_yields_pipelined_request_without_new_bytes() {
        let mut parser = RequestParser::new();
        let both = b"GET /a HTTP/1.1\r\nHost: h\r\n\r\nGET /b HTTP/1.1\r\nHost: h\r\n\r\n";
        let first = parser.push(both);
        let ParseStatus::Complete { message } = first else {
            panic!("expected first request");
        };
        assert_eq!(message.line.target, "/a");

        let second = parser.poll();
        let ParseStatus::Complete { message } = second else {
            panic!("expected pipelined request");
        };
        assert_eq!(message.line.target, "/b");
        assert!(matches!(parser.poll(), ParseStatus::NeedMore));
    }

    #[test]
    fn parses_chunked_response() {
        let mut parser = ResponseParser::new();
        let status =
            parser.push(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n0\r\n\r\n");
        match status {
            ParseStatus::Complete { message } => {
                assert_eq!(message.line.status_code, 200);
                assert_eq!(message.body, b"hello");
            }
            other => panic!("unexpected status {other:?}"),
        }
    }

    #[test]
    fn chunked_body_waits_for_terminator() {
        let mut parser = ResponseParser::new();
        let status = parser.push(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhel");
        assert!(matches!(status, ParseStatus::NeedMore));
        let status = parser.push(b"lo\r\n0\r\n\r\n");
        assert!(matches!(status, ParseStatus::Complete { .. }));
    }

    #[test]
    fn head_response_completes_without_waiting_for_body() {
        let mut parser = ResponseParser::for_method("HEAD");
        let status = parser.push(b"HTTP/1.1 200 OK\r\nContent-Length: 17\r\n\r\n");
        match status {
            ParseStatus::Complete { message } => {
                assert_eq!(message.line.status_code, 200);
                assert!(message.body.is_empty());
                assert_eq!(message.header("content-length"), Some("17"));
            }
            other => panic!("unexpected status {other:?}"),
        }
    }

    #[test]
    fn not_modified_response_has_no_body() {
        let mut parser = ResponseParser::new();
        let status = parser.push(b"HTTP/1.1 304 Not Modified\r\nContent-Length: 5\r\n\r\n");
        match status {
            ParseStatus::Complete { message } => {
                assert_eq!(message.line.status_code, 304);
                assert!(message.body.is_empty());
            }
            other => panic!("unexpected status {other:?}"),
        }
    }

    #[test]
    fn rejects_oversized_headers() {
        let mut parser = RequestParser::with_limits(Limits {
            max_header_bytes: 16,
            max_body_bytes: 1024,
        });
        let status = parser.push(b"GET /a-very-long-target HTTP/1.1\r\nHost: example.com\r\n\r\n");
        assert!(matches!(status, ParseStatus::Error { .. }));
    }

    #[test]
    fn keeps_absolute_form_target() {
        let mut parser = RequestParser::new();
        let status = parser.push(b"GET http://example.com/path?q=1 HTTP/1.1\r\nHost: example.com\r\n\r\n");
        match status {
            ParseStatus::Complete { message } => {
                assert_eq!(message.line.target, "http://example.com/path?q=1");
            }
            other => panic!("unexpected status {other:?}"),
        }
    }

    #[test]
    fn folds_obsolete_continuation_lines() {
        let mut parser = RequestParser::new();
        let status = parser.push(b"GET / HTTP/1.1\r\nX-Note: one\r\n\ttwo\r\n\r\n");
        match status {
            ParseStatus::Complete { message } => {
                assert_eq!(message.header("x-note"), Some("one two"));
            }
            other => panic!("unexpected status {other:?}"),
        }
    }
}

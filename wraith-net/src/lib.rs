mod http1;
mod tls;

pub use http1::{
    Header, HttpVersion, Limits, ParseError, ParseErrorKind, ParseStatus, Request, RequestLine,
    RequestParser, Response, ResponseParser, StatusLine,
};

pub use tls::{
    CaCertificate, CertCache, LeafCertificate, TlsError, TlsErrorKind, build_acceptor,
    export_ca_cert, generate_ca, issue_leaf,
};

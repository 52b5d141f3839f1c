mod acceptor;
mod ca;
mod cache;
mod cert;
mod types;

pub use acceptor::build_acceptor;
pub use ca::{export_ca_cert, generate_ca};
pub use cache::CertCache;
pub use cert::issue_leaf;
pub use types::{CaCertificate, LeafCertificate, TlsError, TlsErrorKind};

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Duration, Utc};
use rcgen::{Certificate, CertificateParams, DistinguishedName, DnType, IsCa, KeyUsagePurpose};

use super::types::{CaCertificate, TlsError, TlsErrorKind};

const CA_VALIDITY_DAYS: i64 = 30;

/// Generates a fresh in-memory root. The private key never leaves the
/// process; only the certificate can be exported for client trust.
pub fn generate_ca(common_name: &str, organization: &str) -> Result<CaCertificate, TlsError> {
    let mut params = CertificateParams::new(Vec::new());
    params.is_ca = IsCa::Ca(rcgen::BasicConstraints::Unconstrained);
    params.key_usages = vec![
        KeyUsagePurpose::KeyCertSign,
        KeyUsagePurpose::CrlSign,
        KeyUsagePurpose::DigitalSignature,
    ];

    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, common_name);
    dn.push(DnType::OrganizationName, organization);
    params.distinguished_name = dn;

    // Start the window a day in the past to tolerate client clock skew.
    let now = Utc::now();
    let not_before = now - Duration::days(1);
    let not_after = now + Duration::days(CA_VALIDITY_DAYS);
    params.not_before = rcgen::date_time_ymd(
        not_before.year(),
        not_before.month() as u8,
        not_before.day() as u8,
    );
    params.not_after = rcgen::date_time_ymd(
        not_after.year(),
        not_after.month() as u8,
        not_after.day() as u8,
    );
    params.serial_number = Some(random_serial()?);

    let cert = Certificate::from_params(params)
        .map_err(|err| TlsError::new(TlsErrorKind::Rcgen, err.to_string()))?;
    let cert_pem = cert
        .serialize_pem()
        .map_err(|err| TlsError::new(TlsErrorKind::Rcgen, err.to_string()))?
        .into_bytes();

    Ok(CaCertificate { cert_pem, cert })
}

/// Writes the root certificate PEM so clients can install it. The key is
/// deliberately not written.
pub fn export_ca_cert(dir: impl AsRef<Path>, ca: &CaCertificate) -> Result<PathBuf, TlsError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|err| TlsError::new(TlsErrorKind::Io, err.to_string()))?;

    let cert_path = dir.join("wraith-ca.pem");
    fs::write(&cert_path, &ca.cert_pem)
        .map_err(|err| TlsError::new(TlsErrorKind::Io, err.to_string()))?;

    Ok(cert_path)
}

pub(super) fn random_serial() -> Result<rcgen::SerialNumber, TlsError> {
    let mut bytes = [0u8; 16];
    openssl::rand::rand_bytes(&mut bytes)
        .map_err(|err| TlsError::new(TlsErrorKind::OpenSsl, err.to_string()))?;
    Ok(rcgen::SerialNumber::from(bytes.to_vec()))
}

//! One-time password generation for the OTP relay

use crate::errors::{MonitorError, Result};
use totp_rs::{Algorithm, Secret, TOTP};

/// Wraps a provisioned TOTP secret and produces codes on demand
#[derive(Debug, Clone)]
pub struct OtpGenerator {
    totp: TOTP,
}

impl OtpGenerator {
    /// Build a generator from either an `otpauth://` provisioning URI or a raw
    /// base32 secret.
    ///
    /// Raw secrets use the common authenticator defaults (SHA-1, 6 digits,
    /// 30-second step); a URI carries its own parameters. Secrets shorter than
    /// the RFC 4226 minimum are accepted, as authenticator apps accept them.
    pub fn from_secret(secret: &str) -> Result<Self> {
        let secret = secret.trim();

        let totp = if secret.starts_with("otpauth://") {
            TOTP::from_url_unchecked(secret)
                .map_err(|e| MonitorError::Otp(format!("invalid otpauth URI: {:?}", e)))?
        } else {
            let bytes = Secret::Encoded(secret.to_uppercase())
                .to_bytes()
                .map_err(|e| MonitorError::Otp(format!("invalid base32 secret: {:?}", e)))?;
            TOTP::new_unchecked(Algorithm::SHA1, 6, 1, 30, bytes, None, String::new())
        };

        Ok(Self { totp })
    }

    /// Generate the code for the current system time
    pub fn generate(&self) -> Result<String> {
        self.totp
            .generate_current()
            .map_err(|e| MonitorError::Otp(format!("system time error: {}", e)))
    }

    /// Generate the code for a specific Unix timestamp
    pub fn generate_at(&self, unix_seconds: u64) -> String {
        self.totp.generate(unix_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Base32 encoding of the RFC 6238 reference secret "12345678901234567890"
    const RFC_SECRET: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";

    #[test]
    fn test_rfc6238_vector() {
        let generator = OtpGenerator::from_secret(RFC_SECRET).unwrap();

        // RFC 6238 appendix B, T = 59, truncated to 6 digits
        assert_eq!(generator.generate_at(59), "287082");
        assert_eq!(generator.generate_at(1111111109), "081804");
    }

    #[test]
    fn test_lowercase_secret_is_normalized() {
        let generator = OtpGenerator::from_secret(&RFC_SECRET.to_lowercase()).unwrap();
        assert_eq!(generator.generate_at(59), "287082");
    }

    #[test]
    fn test_otpauth_uri_secret() {
        let uri = format!(
            "otpauth://totp/Example:alice@example.com?secret={}&issuer=Example",
            RFC_SECRET
        );
        let generator = OtpGenerator::from_secret(&uri).unwrap();
        assert_eq!(generator.generate_at(59), "287082");
    }

    #[test]
    fn test_invalid_base32_is_rejected() {
        let result = OtpGenerator::from_secret("not a base32 secret!!");
        assert!(matches!(result, Err(MonitorError::Otp(_))));
    }

    #[test]
    fn test_invalid_uri_is_rejected() {
        let result = OtpGenerator::from_secret("otpauth://totp/Example?issuer=Example");
        assert!(matches!(result, Err(MonitorError::Otp(_))));
    }
}

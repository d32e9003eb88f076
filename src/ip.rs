use std::borrow::Cow;

use validator::{Validate, ValidationError};

/// Dotted-decimal IPv4 check.
///
/// Each of the four octets is one to three ASCII digits with a value of at
/// most 255. Leading zeros are allowed (`"010.0.0.1"`), surrounding
/// whitespace is not.
pub fn is_valid_ipv4(candidate: &str) -> bool {
    let mut octets = 0;
    for part in candidate.split('.') {
        octets += 1;
        if octets > 4 || !is_octet(part) {
            return false;
        }
    }
    octets == 4
}

fn is_octet(part: &str) -> bool {
    if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    part.parse::<u16>().is_ok_and(|value| value <= 255)
}

/// A submission of the search box, validated before any network call.
#[derive(Debug, Validate)]
pub struct LookupRequest {
    #[validate(custom(function = "validate_search_input"))]
    pub ip: String,
}

impl LookupRequest {
    pub fn new(ip: impl Into<String>) -> Self {
        Self { ip: ip.into() }
    }
}

fn validate_search_input(ip: &str) -> Result<(), ValidationError> {
    if ip.trim().is_empty() {
        return Err(
            ValidationError::new("empty").with_message(Cow::Borrowed("IP address cannot be empty"))
        );
    }
    if !is_valid_ipv4(ip) {
        return Err(ValidationError::new("invalid_format")
            .with_message(Cow::Borrowed("Invalid IP address format")));
    }
    Ok(())
}

//! Free-text address splitting.
//!
//! Upstream addresses look like `"123 Main St, North York, ON M2N 5V9"` but
//! the locality and postal code are frequently missing or misplaced.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::PostalAddress;

/// Known localities, in match priority order. The first entry is the
/// principal city and the default when nothing matches.
pub const KNOWN_LOCALITIES: &[&str] = &[
    "Toronto",
    "North York",
    "Scarborough",
    "Etobicoke",
    "East York",
    "York",
];

static POSTAL_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([A-Z]\d[A-Z])\s?(\d[A-Z]\d)\b").expect("postal code pattern is valid")
});

static LOCALITY_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    KNOWN_LOCALITIES
        .iter()
        .map(|name| {
            let pattern = format!(r"(?i),\s*{}\b", regex::escape(name));
            (*name, Regex::new(&pattern).expect("locality pattern is valid"))
        })
        .collect()
});

/// Split a free-text address into its postal parts.
///
/// Empty or blank input returns `None` rather than a default-locality
/// address.
pub fn parse_address(raw: &str) -> Option<PostalAddress> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let postal_code = POSTAL_CODE
        .captures(raw)
        .map(|caps| format!("{} {}", &caps[1], &caps[2]).to_uppercase());

    let locality_match = LOCALITY_PATTERNS
        .iter()
        .find_map(|(name, re)| re.find(raw).map(|m| (*name, m.start())));

    let (locality, street) = match locality_match {
        Some((name, start)) => {
            let street = raw[..start].trim().trim_end_matches(',').trim_end();
            let street = if street.is_empty() { raw } else { street };
            (name, street)
        }
        None => (KNOWN_LOCALITIES[0], raw),
    };

    Some(PostalAddress::new(street, locality, postal_code))
}

/// Legacy flat mapping: the whole string is the street, locality is the
/// principal city.
pub fn flat_address(raw: &str) -> PostalAddress {
    PostalAddress::new(raw.trim(), KNOWN_LOCALITIES[0], None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_address_is_split() {
        let address = parse_address("123 Main St, North York, ON M2N 5V9").unwrap();
        assert_eq!(address.street_address, "123 Main St");
        assert_eq!(address.address_locality, "North York");
        assert_eq!(address.postal_code.as_deref(), Some("M2N 5V9"));
        assert_eq!(address.address_region, "ON");
        assert_eq!(address.address_country, "CA");
    }

    #[test]
    fn postal_code_is_normalized() {
        let address = parse_address("1 Yonge St, Toronto, ON m5e1w7").unwrap();
        assert_eq!(address.postal_code.as_deref(), Some("M5E 1W7"));
        assert_eq!(address.street_address, "1 Yonge St");
        assert_eq!(address.address_locality, "Toronto");
    }

    #[test]
    fn first_listed_locality_wins() {
        let address = parse_address("1 Bloor St, Toronto, North York").unwrap();
        assert_eq!(address.address_locality, "Toronto");
        assert_eq!(address.street_address, "1 Bloor St");
    }

    #[test]
    fn york_does_not_match_inside_north_york() {
        let address = parse_address("5100 Yonge St, North York").unwrap();
        assert_eq!(address.address_locality, "North York");
    }

    #[test]
    fn locality_must_follow_a_comma() {
        let address = parse_address("Scarborough Town Centre").unwrap();
        assert_eq!(address.address_locality, "Toronto");
        assert_eq!(address.street_address, "Scarborough Town Centre");
    }

    #[test]
    fn no_locality_keeps_whole_string() {
        let address = parse_address("Nathan Phillips Square, ON M5H 2N2").unwrap();
        assert_eq!(address.street_address, "Nathan Phillips Square, ON M5H 2N2");
        assert_eq!(address.address_locality, "Toronto");
        assert_eq!(address.postal_code.as_deref(), Some("M5H 2N2"));
    }

    #[test]
    fn empty_input_yields_none() {
        assert_eq!(parse_address(""), None);
        assert_eq!(parse_address("   "), None);
    }

    #[test]
    fn flat_address_keeps_raw_street() {
        let address = flat_address("123 Main St, North York");
        assert_eq!(address.street_address, "123 Main St, North York");
        assert_eq!(address.address_locality, "Toronto");
        assert_eq!(address.postal_code, None);
    }
}

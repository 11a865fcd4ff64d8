/*
 * strongs.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Strong's number identifiers.
 */

use std::str::FromStr;

/// A Greek Strong's number, displayed as `G<n>`.
///
/// Ordering is numeric, so `G976 < G1722`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StrongsNumber(pub u32);

impl StrongsNumber {
    /// Find the first `G<digits>` token inside a larger string.
    ///
    /// ```ignore
    /// let n = StrongsNumber::find_in("BIMNRSTWH=Βίβλος=G0976=N-NSF;");
    /// assert_eq!(n, Some(StrongsNumber(976)));
    /// ```
    pub fn find_in(text: &str) -> Option<Self> {
        let mut rest = text;
        while let Some(idx) = rest.find('G') {
            let digits: String = rest[idx + 1..]
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            if let Ok(n) = digits.parse() {
                return Some(Self(n));
            }
            rest = &rest[idx + 1..];
        }
        None
    }
}

impl FromStr for StrongsNumber {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = s
            .strip_prefix('G')
            .or_else(|| s.strip_prefix('g'))
            .unwrap_or(s);
        digits
            .parse()
            .map(Self)
            .map_err(|_| format!("Invalid Strong's number: {}", s))
    }
}

impl std::fmt::Display for StrongsNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "G{}", self.0)
    }
}

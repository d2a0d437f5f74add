//! Recipient list ingestion: parsing an uploaded address blob into a
//! deduplicated, insertion-ordered set, plus page slicing for the dashboard
//! table.

use alloy_primitives::Address;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct ParsedRecipients {
    pub valid: Vec<Address>,
    pub invalid: Vec<String>,
}

/// Parse a comma-separated address blob.
///
/// All whitespace is stripped first, so the payload may be spread over any
/// number of lines. Empty tokens are discarded, valid addresses are
/// deduplicated case-insensitively preserving first-seen order, and malformed
/// tokens are collected unchanged for reporting. Pure function over text.
pub fn parse(raw: &str) -> ParsedRecipients {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

    let mut valid = Vec::new();
    let mut invalid = Vec::new();
    let mut seen: HashSet<Address> = HashSet::new();

    for token in compact.split(',') {
        if token.is_empty() {
            continue;
        }
        match checked_address(token) {
            // Address equality is over the raw bytes, so the dedup is
            // case-insensitive by construction.
            Some(address) => {
                if seen.insert(address) {
                    valid.push(address);
                }
            }
            None => invalid.push(token.to_string()),
        }
    }

    ParsedRecipients { valid, invalid }
}

/// Validate one token as an account address.
///
/// Single-case hex carries no checksum information and is accepted as-is;
/// mixed-case input must carry a valid EIP-55 checksum.
fn checked_address(token: &str) -> Option<Address> {
    let hex_part = token.strip_prefix("0x")?;
    if hex_part.len() != 40 {
        return None;
    }

    let address: Address = token.parse().ok()?;

    let has_lower = hex_part.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex_part.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        Address::parse_checksummed(token, None).ok()?;
    }

    Some(address)
}

/// The current recipient set. Replaced wholesale on each upload, never
/// incrementally mutated.
#[derive(Debug, Clone, Default)]
pub struct RecipientSet {
    addresses: Vec<Address>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageEntry {
    /// 1-based absolute row number, stable across pages.
    pub row: usize,
    pub address: Address,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub page: usize,
    pub page_count: usize,
    pub total: usize,
    pub entries: Vec<PageEntry>,
}

impl RecipientSet {
    pub fn new(addresses: Vec<Address>) -> Self {
        Self { addresses }
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    pub fn page_count(&self, page_size: usize) -> usize {
        self.addresses.len().div_ceil(page_size)
    }

    /// Slice out one 1-based page. Pages past the end come back empty rather
    /// than failing, matching what the dashboard table renders.
    pub fn page(&self, page: usize, page_size: usize) -> Page {
        let page = page.max(1);
        let start = (page - 1) * page_size;
        let entries = self
            .addresses
            .iter()
            .enumerate()
            .skip(start)
            .take(page_size)
            .map(|(idx, &address)| PageEntry {
                row: idx + 1,
                address,
            })
            .collect();

        Page {
            page,
            page_count: self.page_count(page_size),
            total: self.addresses.len(),
            entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Checksummed test vectors from the EIP-55 reference set.
    const ADDR_A: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
    const ADDR_B: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";
    const ADDR_C: &str = "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB";

    #[test]
    fn test_parse_dedups_case_variants_and_reports_invalid() {
        let raw = format!(
            "{}, {}, {}, not-an-address",
            ADDR_A,
            ADDR_A.to_lowercase(),
            ADDR_B
        );
        let parsed = parse(&raw);

        assert_eq!(parsed.valid.len(), 2);
        assert_eq!(parsed.valid[0], ADDR_A.parse::<Address>().unwrap());
        assert_eq!(parsed.valid[1], ADDR_B.parse::<Address>().unwrap());
        assert_eq!(parsed.invalid, vec!["not-an-address".to_string()]);
    }

    #[test]
    fn test_parse_is_idempotent_on_valid_output() {
        let raw = format!("{},{},{},junk,0x123", ADDR_A, ADDR_C, ADDR_A.to_uppercase().replace("0X", "0x"));
        let first = parse(&raw);

        let rejoined = first
            .valid
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let second = parse(&rejoined);

        assert_eq!(first.valid, second.valid);
        assert!(second.invalid.is_empty());
    }

    #[test]
    fn test_parse_strips_whitespace_and_empty_tokens() {
        let raw = format!("\n  {} ,\t\n, {} ,,\n", ADDR_A, ADDR_B);
        let parsed = parse(&raw);
        assert_eq!(parsed.valid.len(), 2);
        assert!(parsed.invalid.is_empty());
    }

    #[test]
    fn test_bad_checksum_is_invalid() {
        // Flip the case of one checksummed nibble.
        let broken = ADDR_A.replacen("aA", "Aa", 1);
        assert_ne!(broken, ADDR_A);
        let parsed = parse(&broken);
        assert!(parsed.valid.is_empty());
        assert_eq!(parsed.invalid, vec![broken]);
    }

    #[test]
    fn test_single_case_hex_needs_no_checksum() {
        let parsed = parse(&ADDR_A.to_lowercase());
        assert_eq!(parsed.valid.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        let parsed = parse("  \n , ,, ");
        assert!(parsed.valid.is_empty());
        assert!(parsed.invalid.is_empty());
    }

    #[test]
    fn test_pagination_of_twelve_recipients() {
        let addresses: Vec<Address> = (1..=12u64)
            .map(|i| Address::from_slice(&{
                let mut bytes = [0u8; 20];
                bytes[19] = i as u8;
                bytes
            }))
            .collect();
        let set = RecipientSet::new(addresses);

        assert_eq!(set.page_count(5), 3);

        let page1 = set.page(1, 5);
        assert_eq!(page1.entries.len(), 5);
        assert_eq!(page1.entries[0].row, 1);
        assert_eq!(page1.entries[4].row, 5);

        let page3 = set.page(3, 5);
        assert_eq!(page3.entries.len(), 2);
        assert_eq!(page3.entries[0].row, 11);
        assert_eq!(page3.entries[1].row, 12);
        assert_eq!(page3.page_count, 3);

        let past_end = set.page(4, 5);
        assert!(past_end.entries.is_empty());
    }
}

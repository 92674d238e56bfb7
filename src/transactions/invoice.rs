//! Amount extraction from the human readable part of a BOLT11 invoice.
//!
//! Only the `ln<network><amount><multiplier>` prefix is read; the rest of the
//! invoice is not decoded or verified.

/// Network prefixes in match order. `tbs` and `bcrt` are reached when the
/// shorter prefix is not directly followed by a digit.
const NETWORK_PREFIXES: [&str; 4] = ["bc", "tb", "tbs", "bcrt"];

const MSAT_PER_BTC: u64 = 100_000_000_000;

/// Millisatoshi amount encoded in `invoice`, or 0 when none can be read
pub fn parse_invoice_amount_msat(invoice: &str) -> u64 {
    let lower = invoice.to_ascii_lowercase();
    let mut search_from = 0;

    while let Some(offset) = lower[search_from..].find("ln") {
        let after_ln = search_from + offset + 2;
        let rest = &lower[after_ln..];

        for prefix in NETWORK_PREFIXES {
            let Some(amount_part) = rest.strip_prefix(prefix) else {
                continue;
            };
            let digit_count = amount_part
                .bytes()
                .take_while(u8::is_ascii_digit)
                .count();
            if digit_count == 0 {
                continue;
            }

            let multiplier = amount_part.as_bytes().get(digit_count).copied();
            return amount_to_msat(&amount_part[..digit_count], multiplier);
        }

        search_from += offset + 1;
    }

    0
}

fn amount_to_msat(digits: &str, multiplier: Option<u8>) -> u64 {
    let Ok(amount) = digits.parse::<u64>() else {
        return 0;
    };

    match multiplier {
        Some(b'm') => amount.saturating_mul(100_000_000),
        Some(b'u') => amount.saturating_mul(100_000),
        Some(b'n') => amount.saturating_mul(100),
        Some(b'p') => amount / 10,
        _ => amount.saturating_mul(MSAT_PER_BTC),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplier_table() {
        assert_eq!(parse_invoice_amount_msat("lnbc100m"), 10_000_000_000);
        assert_eq!(parse_invoice_amount_msat("lnbc5u"), 500_000);
        assert_eq!(parse_invoice_amount_msat("lnbc1n"), 100);
        assert_eq!(parse_invoice_amount_msat("lnbc7p"), 0);
        assert_eq!(parse_invoice_amount_msat("lnbc25p"), 2);
        assert_eq!(parse_invoice_amount_msat("lnbc2"), 200_000_000_000);
    }

    #[test]
    fn test_realistic_invoice() {
        let invoice = "lnbc2500u1pvjluezpp5qqqsyqcyq5rqwzqfqqqsyqcyq5rqwzqfqqqsyqcyq5rqwzqfqypqdq5xysxxatsyp3k7enxv4jsxqzpu";
        assert_eq!(parse_invoice_amount_msat(invoice), 250_000_000);
    }

    #[test]
    fn test_network_prefixes() {
        assert_eq!(parse_invoice_amount_msat("lntb20m1p"), 2_000_000_000);
        assert_eq!(parse_invoice_amount_msat("lntbs3u1p"), 300_000);
        assert_eq!(parse_invoice_amount_msat("lnbcrt500n1p"), 50_000);
    }

    #[test]
    fn test_case_insensitive_and_embedded() {
        assert_eq!(parse_invoice_amount_msat("LNBC10U1P"), 1_000_000);
        assert_eq!(
            parse_invoice_amount_msat("lightning:lnbc10u1pxyz"),
            1_000_000
        );
    }

    #[test]
    fn test_unparseable_invoices_are_zero() {
        assert_eq!(parse_invoice_amount_msat(""), 0);
        assert_eq!(parse_invoice_amount_msat("not an invoice"), 0);
        assert_eq!(parse_invoice_amount_msat("lnxy100u"), 0);
        assert_eq!(parse_invoice_amount_msat("lnbc"), 0);
        assert_eq!(parse_invoice_amount_msat("lnbc99999999999999999999999u"), 0);
    }

    #[test]
    fn test_huge_amounts_saturate() {
        assert_eq!(parse_invoice_amount_msat("lnbc999999999"), u64::MAX);
    }
}

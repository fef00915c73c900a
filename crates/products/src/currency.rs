//! Price display helpers.
//!
//! Formats follow the locale each currency is shown in: grouping separator,
//! decimal separator and symbol placement. Amounts always carry two fraction
//! digits and round half away from zero to the cent.

/// No-break space, placed between an amount and a trailing symbol.
const NBSP: char = '\u{a0}';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Currency {
    /// US dollar, `en-US`.
    Usd,
    /// Euro, `de-DE`.
    Eur,
    /// Pound sterling, `en-GB`.
    Gbp,
    /// Ghanaian cedi, `en-GH`.
    Ghs,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Ghs => "GHS",
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
            Currency::Ghs => "GH₵",
        }
    }

    /// `(grouping, decimal)` separators.
    fn separators(&self) -> (char, char) {
        match self {
            Currency::Eur => ('.', ','),
            Currency::Usd | Currency::Gbp | Currency::Ghs => (',', '.'),
        }
    }

    fn symbol_trails(&self) -> bool {
        matches!(self, Currency::Eur)
    }
}

/// Format `value` as an amount of `currency`.
///
/// Non-finite values have no sensible rendering and come back as their plain
/// `f64` text.
pub fn format_currency(value: f64, currency: Currency) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let (whole, fraction) = round_to_cents(value.abs());
    let negative = value < 0.0 && (whole != "0" || fraction != "00");

    let (group, decimal) = currency.separators();
    let amount = format!("{}{decimal}{fraction}", group_thousands(&whole, group));

    let sign = if negative { "-" } else { "" };
    if currency.symbol_trails() {
        format!("{sign}{amount}{NBSP}{}", currency.symbol())
    } else {
        format!("{sign}{}{amount}", currency.symbol())
    }
}

/// Split a non-negative `value` into whole and two-digit fraction text.
///
/// Rounds the shortest decimal form of `value` rather than `value * 100`, so
/// `1.005` becomes `1.01` and magnitudes past `u128` keep every digit.
fn round_to_cents(value: f64) -> (String, String) {
    let text = value.to_string();
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().chain(std::iter::repeat(b'0')).take(2))
        .map(|b| b - b'0')
        .collect();

    if frac_part.as_bytes().get(2).is_some_and(|&d| d >= b'5') {
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == 9 {
                *digit = 0;
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, 1);
        }
    }

    let (whole, fraction) = digits.split_at(digits.len() - 2);
    let to_text = |ds: &[u8]| ds.iter().map(|d| char::from(b'0' + d)).collect::<String>();
    let whole = to_text(whole);
    let whole = match whole.trim_start_matches('0') {
        "" => "0".to_string(),
        trimmed => trimmed.to_string(),
    };
    (whole, to_text(fraction))
}

fn group_thousands(digits: &str, separator: char) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

pub fn to_dollars(value: f64) -> String {
    format_currency(value, Currency::Usd)
}

pub fn to_euro(value: f64) -> String {
    format_currency(value, Currency::Eur)
}

pub fn to_pounds(value: f64) -> String {
    format_currency(value, Currency::Gbp)
}

pub fn to_ghana_cedis(value: f64) -> String {
    format_currency(value, Currency::Ghs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_each_locale() {
        assert_eq!(to_dollars(1234.56), "$1,234.56");
        assert_eq!(to_euro(1234.56), "1.234,56\u{a0}€");
        assert_eq!(to_pounds(1234.56), "£1,234.56");
        assert_eq!(to_ghana_cedis(1234.56), "GH₵1,234.56");
    }

    #[test]
    fn always_two_fraction_digits() {
        assert_eq!(to_dollars(1.0), "$1.00");
        assert_eq!(to_dollars(0.5), "$0.50");
        assert_eq!(to_dollars(0.0), "$0.00");
    }

    #[test]
    fn rounds_to_the_cent() {
        assert_eq!(to_dollars(2.999), "$3.00");
        assert_eq!(to_dollars(1_000_000.004), "$1,000,000.00");
    }

    #[test]
    fn half_cents_round_away_from_zero_in_decimal() {
        assert_eq!(to_dollars(1.005), "$1.01");
        assert_eq!(to_dollars(0.145), "$0.15");
        assert_eq!(to_dollars(99.995), "$100.00");
        assert_eq!(to_dollars(-1.005), "-$1.01");
        assert_eq!(to_dollars(0.144), "$0.14");
    }

    #[test]
    fn huge_amounts_keep_their_digits() {
        assert_eq!(
            to_dollars(1e40),
            "$10,000,000,000,000,000,000,000,000,000,000,000,000,000.00"
        );
    }

    #[test]
    fn tiny_negative_amounts_are_unsigned_zero() {
        assert_eq!(to_dollars(-0.001), "$0.00");
        assert_eq!(to_dollars(1e-7), "$0.00");
    }

    #[test]
    fn negative_amounts_lead_with_sign() {
        assert_eq!(to_dollars(-12.5), "-$12.50");
        assert_eq!(to_euro(-1000.0), "-1.000,00\u{a0}€");
    }

    #[test]
    fn non_finite_values_pass_through() {
        assert_eq!(to_dollars(f64::NAN), "NaN");
        assert_eq!(to_dollars(f64::INFINITY), "inf");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: stripping the formatting recovers the cent amount.
            #[test]
            fn digits_round_trip_cents(cents in 0u64..10_000_000_000) {
                let value = cents as f64 / 100.0;
                for currency in [Currency::Usd, Currency::Eur, Currency::Gbp, Currency::Ghs] {
                    let text = format_currency(value, currency);
                    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
                    prop_assert_eq!(digits.parse::<u64>().unwrap(), cents);
                }
            }

            /// Property: groups between separators are exactly three digits.
            #[test]
            fn groups_are_three_digits(whole in 0u64..1_000_000_000_000) {
                let text = to_dollars(whole as f64);
                let integer = text.trim_start_matches('$').split('.').next().unwrap().to_string();
                let groups: Vec<&str> = integer.split(',').collect();
                prop_assert!(groups[0].len() >= 1 && groups[0].len() <= 3);
                for g in &groups[1..] {
                    prop_assert_eq!(g.len(), 3);
                }
            }
        }
    }
}

//! Display helpers: symbols, formatting and country defaults.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// A currency offered to users when picking an expense currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurrencyInfo {
    /// ISO code.
    pub code: &'static str,
    /// English name.
    pub name: &'static str,
    /// Display symbol.
    pub symbol: &'static str,
}

/// Currencies offered in pickers, in display order.
pub const SUPPORTED_CURRENCIES: &[CurrencyInfo] = &[
    CurrencyInfo { code: "USD", name: "US Dollar", symbol: "$" },
    CurrencyInfo { code: "EUR", name: "Euro", symbol: "€" },
    CurrencyInfo { code: "GBP", name: "British Pound", symbol: "£" },
    CurrencyInfo { code: "INR", name: "Indian Rupee", symbol: "₹" },
    CurrencyInfo { code: "JPY", name: "Japanese Yen", symbol: "¥" },
    CurrencyInfo { code: "AUD", name: "Australian Dollar", symbol: "A$" },
    CurrencyInfo { code: "CAD", name: "Canadian Dollar", symbol: "C$" },
    CurrencyInfo { code: "CHF", name: "Swiss Franc", symbol: "Fr" },
    CurrencyInfo { code: "CNY", name: "Chinese Yuan", symbol: "¥" },
    CurrencyInfo { code: "SEK", name: "Swedish Krona", symbol: "kr" },
    CurrencyInfo { code: "NZD", name: "New Zealand Dollar", symbol: "NZ$" },
    CurrencyInfo { code: "SGD", name: "Singapore Dollar", symbol: "S$" },
    CurrencyInfo { code: "HKD", name: "Hong Kong Dollar", symbol: "HK$" },
    CurrencyInfo { code: "NOK", name: "Norwegian Krone", symbol: "kr" },
    CurrencyInfo { code: "KRW", name: "South Korean Won", symbol: "₩" },
    CurrencyInfo { code: "MXN", name: "Mexican Peso", symbol: "$" },
    CurrencyInfo { code: "BRL", name: "Brazilian Real", symbol: "R$" },
    CurrencyInfo { code: "ZAR", name: "South African Rand", symbol: "R" },
];

/// Currency used when a country is not in the lookup table.
pub const DEFAULT_CURRENCY: &str = "USD";

const COUNTRY_CURRENCIES: &[(&str, &str)] = &[
    ("United States", "USD"),
    ("India", "INR"),
    ("United Kingdom", "GBP"),
    ("Germany", "EUR"),
    ("France", "EUR"),
    ("Japan", "JPY"),
    ("Australia", "AUD"),
    ("Canada", "CAD"),
    ("Switzerland", "CHF"),
    ("China", "CNY"),
    ("Singapore", "SGD"),
];

/// Symbol for a code, falling back to the code itself.
#[must_use]
pub fn symbol_for(code: &str) -> &str {
    SUPPORTED_CURRENCIES
        .iter()
        .find(|c| c.code.eq_ignore_ascii_case(code))
        .map_or(code, |c| c.symbol)
}

/// Base currency for a company registered in `country`.
#[must_use]
pub fn currency_for_country(country: &str) -> &'static str {
    let country = country.trim();
    COUNTRY_CURRENCIES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(country))
        .map_or(DEFAULT_CURRENCY, |(_, code)| code)
}

/// Formats an amount as `"{symbol} 1,234.50"`: two decimals, comma grouping.
#[must_use]
pub fn format_amount(amount: Decimal, code: &str) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{} {sign}{grouped}.{frac_part}", symbol_for(code))
}

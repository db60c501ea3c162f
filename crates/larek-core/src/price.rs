//! Price labels.
//!
//! Prices are whole synapses (the shop's currency unit). A catalog price of
//! `None` means the product is priceless and cannot be bought.

/// Currency unit appended to every price label.
pub const CURRENCY_UNIT: &str = "synapses";

/// Label shown instead of a price for priceless products.
pub const PRICELESS_LABEL: &str = "Priceless";

/// Format an optional catalog price for display.
pub fn price_label(price: Option<u64>) -> String {
    match price {
        Some(amount) => amount_label(amount),
        None => PRICELESS_LABEL.to_string(),
    }
}

/// Format a known amount (cart lines, totals) for display.
pub fn amount_label(amount: u64) -> String {
    format!("{} {}", amount, CURRENCY_UNIT)
}

/// Sum prices, saturating instead of wrapping.
pub fn sum_prices<I>(prices: I) -> u64
where
    I: IntoIterator<Item = u64>,
{
    prices.into_iter().fold(0u64, |acc, p| acc.saturating_add(p))
}

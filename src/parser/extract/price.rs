use scraper::Html;
use tracing::error;

use crate::parser::select::{css, resolve_first};

const PRICE_PLANS: &[crate::parser::select::Plan] = &[
    css("span.a-price span[aria-hidden=\"true\"]::text"),
    css("span.aok-offscreen::text"),
];

/// Extract `(price, discount_percentage)` from a product page. Parse failures
/// are logged and coerced to `(0.0, 0.0)`; this never fails upward.
pub fn extract(doc: &Html) -> (f64, f64) {
    let root = doc.root_element();

    let mut price_str = resolve_first(root, PRICE_PLANS, "0");
    if price_str == "0" {
        // Some layouts only carry the split whole/fraction rendering.
        let whole = resolve_first(root, &[css("span.priceToPay .a-price-whole::text")], "0");
        let fraction = resolve_first(root, &[css("span.priceToPay .a-price-fraction::text")], "00");
        let composed = format!("{}.{}", whole, fraction);
        if composed != "0.00" {
            price_str = composed;
        }
    }
    let discount_str = resolve_first(root, &[css("span.savingPriceOverride::text")], "0.0");

    let price = price_str.replace(['$', ','], "").trim().parse::<f64>();
    let discount = discount_str.replace(['%', ','], "").trim().parse::<f64>();
    match (price, discount) {
        (Ok(price), Ok(discount)) => (price, discount),
        _ => {
            error!("failed to parse price '{}' / discount '{}'", price_str, discount_str);
            (0.0, 0.0)
        }
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_and_discount() {
        let doc = Html::parse_document(
            "<div><span class='a-price'><span aria-hidden='true'>$123.45</span></span>\
             <span class='savingPriceOverride'>20%</span></div>",
        );
        assert_eq!(extract(&doc), (123.45, 20.0));
    }

    #[test]
    fn thousands_separators_stripped() {
        let doc = Html::parse_document(
            "<div><span class='aok-offscreen'>$1,299.00</span></div>",
        );
        assert_eq!(extract(&doc), (1299.0, 0.0));
    }

    #[test]
    fn whole_and_fraction_composed_when_display_price_missing() {
        let doc = Html::parse_document(
            "<div><span class='priceToPay'><span class='a-price-whole'>42</span>\
             <span class='a-price-fraction'>99</span></span></div>",
        );
        assert_eq!(extract(&doc), (42.99, 0.0));
    }

    #[test]
    fn unparsable_price_coerces_both_to_zero() {
        let doc = Html::parse_document(
            "<div><span class='aok-offscreen'>Currently unavailable</span>\
             <span class='savingPriceOverride'>20%</span></div>",
        );
        assert_eq!(extract(&doc), (0.0, 0.0));
    }

    #[test]
    fn empty_page_defaults_to_zero() {
        let doc = Html::parse_document("<div></div>");
        assert_eq!(extract(&doc), (0.0, 0.0));
    }
}

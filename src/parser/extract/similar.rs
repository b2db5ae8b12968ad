use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use crate::model::SimilarProduct;
use crate::parser::select::{css, resolve_first};

static EMBEDDED_ASIN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"B0[A-Z0-9]+").unwrap());

const CARD_ROW: &str = "._product-comparison-desktop_desktopFaceoutStyle_asin__2eMLv";
const PRICE_ROW: &str =
    "._product-comparison-desktop_desktopFaceoutStyle_tableAttribute__2V-c2 > span.a-price";

/// Extract the "frequently compared" product cards with their parallel price
/// row. When the two rows disagree in length, products are dropped from the
/// FRONT until they match (DOM-order artifact kept as-is); the current
/// product itself is excluded.
pub fn extract(doc: &Html, product_asin: &str) -> Vec<SimilarProduct> {
    let card_sel = Selector::parse(CARD_ROW).unwrap();
    let price_sel = Selector::parse(PRICE_ROW).unwrap();

    let mut products: Vec<SimilarProduct> = doc
        .select(&card_sel)
        .map(|card| {
            let asin = resolve_first(card, &[css("div.a-image-container::attr(id)")], "");
            let asin = EMBEDDED_ASIN_RE
                .find(&asin)
                .map(|m| m.as_str().to_string());
            let url = asin
                .as_deref()
                .map(|a| format!("https://www.amazon.com/dp/{}", a))
                .unwrap_or_default();
            SimilarProduct {
                title: resolve_first(card, &[css("img::attr(alt)")], ""),
                image: resolve_first(card, &[css("img::attr(src)")], ""),
                asin,
                url,
                price: String::new(),
            }
        })
        .collect();

    let prices: Vec<String> = doc
        .select(&price_sel)
        .map(|cell| resolve_first(cell, &[css("span.a-offscreen::text")], ""))
        .collect();

    while products.len() > prices.len() {
        products.remove(0);
    }

    for (product, price) in products.iter_mut().zip(prices) {
        product.price = price;
    }

    products
        .into_iter()
        .filter(|p| p.asin.as_deref() != Some(product_asin))
        .collect()
}

// ── Tests ──

use scraper::{ElementRef, Html, Selector};
use tracing::error;

use crate::model::ListingProduct;
use crate::parser::select::{css, resolve_first};

pub const MAX_PRODUCTS: usize = 15;

const CARDS_PRIMARY: &str = "div.puis-card-container > div.a-section > div.puisg-row";
const CARDS_FALLBACK: &str = "div.puis-card-container > div.a-section";

/// Extract up to [`MAX_PRODUCTS`] result summaries from a search listing
/// page. Single pass, no coordination state.
pub fn extract(doc: &Html) -> Vec<ListingProduct> {
    let primary = Selector::parse(CARDS_PRIMARY).unwrap();
    let fallback = Selector::parse(CARDS_FALLBACK).unwrap();

    let cards: Vec<ElementRef> = {
        let hits: Vec<ElementRef> = doc.select(&primary).collect();
        if hits.is_empty() {
            doc.select(&fallback).collect()
        } else {
            hits
        }
    };

    cards
        .into_iter()
        .take(MAX_PRODUCTS)
        .map(parse_card)
        .collect()
}

fn parse_card(card: ElementRef) -> ListingProduct {
    let href = resolve_first(card, &[css("a.a-link-normal::attr(href)")], "");
    let product_id = super::asin_from_url(&href);

    let title = resolve_first(
        card,
        &[
            css(".a-size-medium.a-color-base.a-text-normal::text"),
            css("div[data-cy=\"title-recipe\"] span.a-text-normal::text"),
        ],
        "",
    );

    let price_str = resolve_first(card, &[css(".a-price-whole::text")], "0");
    let price = match price_str.replace([',', '$'], "").parse::<f64>() {
        Ok(p) => p,
        Err(_) => {
            error!("failed to parse listing price '{}'", price_str);
            0.0
        }
    };

    let rating_str = resolve_first(card, &[css(".a-icon-alt::text")], "0");
    let rating = match rating_str.split(' ').next().unwrap_or("").parse::<f64>() {
        Ok(r) => r,
        Err(_) => {
            error!("failed to parse listing rating '{}'", rating_str);
            0.0
        }
    };

    let discount = resolve_first(
        card,
        &[css("span.s-coupon-clipped::text"), css("span.s-coupon-unclipped::text")],
        "No discount information",
    );

    ListingProduct {
        product_id,
        image_url: resolve_first(card, &[css(".s-image::attr(src)")], ""),
        title,
        price,
        rating,
        brand: resolve_first(card, &[css(".a-row.a-color-secondary h2 .a-size-medium::text")], ""),
        stock: resolve_first(card, &[css(".a-size-base.a-color-price::text")], ""),
        discount,
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn card(n: usize) -> String {
        format!(
            r#"<div class="puis-card-container"><div class="a-section"><div class="puisg-row">
                 <a class="a-link-normal" href="/Acme-Laptop/dp/B0AAAAAA{n:02}/ref=sr_1_{n}"></a>
                 <img class="s-image" src="https://img/{n}.jpg">
                 <span class="a-size-medium a-color-base a-text-normal">Product {n}</span>
                 <span class="a-price-whole">1,299.</span>
                 <span class="a-icon-alt">4.5 out of 5 stars</span>
                 <div class="a-row a-color-secondary"><h2><span class="a-size-medium">Acme</span></h2></div>
                 <span class="a-size-base a-color-price">Only 3 left in stock</span>
               </div></div></div>"#
        )
    }

    #[test]
    fn caps_at_fifteen_cards() {
        let html: String = (1..=16).map(card).collect();
        let doc = Html::parse_document(&html);
        let products = extract(&doc);
        assert_eq!(products.len(), MAX_PRODUCTS);
    }

    #[test]
    fn card_fields() {
        let doc = Html::parse_document(&card(7));
        let products = extract(&doc);
        let p = &products[0];
        assert_eq!(p.product_id.as_deref(), Some("B0AAAAAA07"));
        assert_eq!(p.title, "Product 7");
        assert_eq!(p.price, 1299.0);
        assert_eq!(p.rating, 4.5);
        assert_eq!(p.brand, "Acme");
        assert_eq!(p.stock, "Only 3 left in stock");
        assert_eq!(p.image_url, "https://img/7.jpg");
        assert_eq!(p.discount, "No discount information");
    }

    #[test]
    fn coupon_text_used_when_present() {
        let html = r#"<div class="puis-card-container"><div class="a-section"><div class="puisg-row">
            <span class="s-coupon-unclipped">Save 15% with coupon</span>
        </div></div></div>"#;
        let doc = Html::parse_document(html);
        let products = extract(&doc);
        assert_eq!(products[0].discount, "Save 15% with coupon");
    }

    #[test]
    fn fallback_container_when_primary_missing() {
        let html = r#"<div class="puis-card-container"><div class="a-section">
            <span class="a-size-medium a-color-base a-text-normal">Flat card</span>
        </div></div>"#;
        let doc = Html::parse_document(html);
        let products = extract(&doc);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].title, "Flat card");
    }

    #[test]
    fn empty_page_yields_no_products() {
        let doc = Html::parse_document("<div></div>");
        assert!(extract(&doc).is_empty());
    }
}

pub mod listing;
pub mod price;
pub mod product;
pub mod qa;
pub mod reviews;
pub mod similar;
pub mod specs;
pub mod variants;

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use scraper::Html;

use crate::model::Product;

static ASIN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/dp/([A-Z0-9]{10})").unwrap());

/// Parse the 10-character product identifier out of a `/dp/<ASIN>` URL.
pub fn asin_from_url(url: &str) -> Option<String> {
    ASIN_RE.captures(url).map(|caps| caps[1].to_string())
}

/// Run every main-page extractor and assemble the product record. Reviews and
/// Q&A stay empty here; they arrive from the side fetches and are merged in
/// at job completion.
pub fn product_record(doc: &Html, product_id: &str, job_id: &str, domain: &str) -> Product {
    let (price, discount_percentage) = price::extract(doc);
    let now = Utc::now();

    Product {
        product_id: product_id.to_string(),
        job_id: job_id.to_string(),
        domain: domain.to_string(),
        title: product::title(doc),
        description: product::description(doc),
        image_url: product::image_url(doc),
        specs: specs::extract(doc),
        features: product::features(doc),
        rating: product::rating(doc),
        number_of_reviews: product::number_of_reviews(doc),
        price,
        discount_percentage,
        stock: product::stock(doc),
        variants: variants::extract(doc),
        similar_products: similar::extract(doc, product_id),
        reviews: Vec::new(),
        qa: Vec::new(),
        created_at: now,
        updated_at: now,
        generated_review: String::new(),
    }
}

// ── Tests ──

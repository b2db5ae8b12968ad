use scraper::{Html, Selector};
use tracing::error;

use crate::model::Review;
use crate::parser::select::{css, resolve_first};

/// Collect the review blocks of one page into `acc`, skipping any review
/// whose author is already present. Repeated calls with the same accumulator
/// extend it incrementally.
pub fn collect(doc: &Html, acc: &mut Vec<Review>) {
    let review_sel = Selector::parse("div[data-hook=\"review\"]").unwrap();

    for block in doc.select(&review_sel) {
        let rating_str = resolve_first(
            block,
            &[css("i[data-hook=\"review-star-rating\"] > span::text")],
            "0",
        );
        let date = resolve_first(block, &[css("span[data-hook=\"review-date\"]::text")], "No Date");
        let mut text = resolve_first(
            block,
            &[css("span[data-hook=\"review-body\"]::text")],
            "No Review Text",
        );
        if text == "No Review Text" {
            text = resolve_first(
                block,
                &[css("div[data-hook=\"review-collapsed\"] > span::text")],
                "No Review Text",
            );
        }
        let author = resolve_first(block, &[css("span.a-profile-name::text")], "Anonymous");

        let rating = match rating_str.split(" out of").next().unwrap_or("").trim().parse::<f64>() {
            Ok(r) => r,
            Err(_) => {
                error!("failed to parse review rating '{}'", rating_str);
                0.0
            }
        };

        let author = Some(author);
        if acc.iter().any(|r| r.author == author) {
            continue;
        }
        acc.push(Review { rating, date, text, author });
    }
}

/// Merge the three per-page review lists into one, deduplicated by author:
/// critical reviews form the base, then positive and default reviews are
/// appended only when their author is not yet present. Authors are stripped
/// afterwards, once all dedup comparisons are done.
pub fn merge(critical: Vec<Review>, positive: Vec<Review>, default: Vec<Review>) -> Vec<Review> {
    let mut merged = critical;
    for review in positive.into_iter().chain(default) {
        if !merged.iter().any(|r| r.author == review.author) {
            merged.push(review);
        }
    }
    for review in &mut merged {
        review.author = None;
    }
    merged
}

// ── Tests ──

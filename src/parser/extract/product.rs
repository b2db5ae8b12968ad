use scraper::{Html, Selector};
use tracing::error;

use crate::parser::select::{css, path, resolve_all, resolve_first};

pub fn title(doc: &Html) -> String {
    resolve_first(doc.root_element(), &[css("#productTitle::text")], "")
}

/// Product description from the overview table, one `key: value` line per
/// row; book pages carry it in an expander instead.
pub fn description(doc: &Html) -> String {
    let row_sel = Selector::parse("#poExpander > div > div > table tr").unwrap();
    let mut lines = String::new();

    for row in doc.select(&row_sel) {
        let key = resolve_first(row, &[css("td.a-span3 > span::text")], "");
        let value = resolve_first(row, &[css("td.a-span9 > span::text")], "");
        if !key.is_empty() && !value.is_empty() {
            lines.push_str(&format!("{}: {}\n", key, value));
        }
    }
    if !lines.is_empty() {
        return lines;
    }

    let book_sel = Selector::parse(
        "div[data-a-expander-name=\"book_description_expander\"] div[aria-expanded=\"false\"]",
    )
    .unwrap();
    match doc.select(&book_sel).next() {
        Some(expander) => resolve_all(expander, &[css("span::own-text")], vec![]).join(" "),
        None => String::new(),
    }
}

pub fn image_url(doc: &Html) -> String {
    resolve_first(
        doc.root_element(),
        &[path("div[id=imgTagWrapperId]/img::attr(src)")],
        "",
    )
}

pub fn rating(doc: &Html) -> f64 {
    let raw = resolve_first(
        doc.root_element(),
        &[css("a.a-popover-trigger.a-declarative span.a-size-base.a-color-base::text")],
        "0.0",
    );
    match raw.parse::<f64>() {
        Ok(r) => r,
        Err(_) => {
            error!("failed to parse rating '{}'", raw);
            0.0
        }
    }
}

pub fn number_of_reviews(doc: &Html) -> String {
    let parent_sel = Selector::parse("div#averageCustomerReviews").unwrap();
    let Some(parent) = doc.select(&parent_sel).next() else {
        return String::new();
    };
    resolve_first(parent, &[css("span#acrCustomerReviewText::text")], "")
}

pub fn features(doc: &Html) -> Vec<String> {
    resolve_all(
        doc.root_element(),
        &[path("div[id=feature-bullets]/li/span[class~=a-list-item]::text")],
        vec![],
    )
    .into_iter()
    .filter(|f| !f.is_empty())
    .collect()
}

pub fn stock(doc: &Html) -> String {
    resolve_first(doc.root_element(), &[css("div#availability span::text")], "In Stock")
}

// ── Tests ──

use std::collections::HashMap;

use scraper::{Html, Selector};

use crate::parser::select::{css, resolve_first};

/// Extract the product specification mapping. Up to three fixed tables are
/// merged, later tables overwriting earlier keys; pages without the main
/// table fall back to the detail bullet list.
pub fn extract(doc: &Html) -> HashMap<String, String> {
    let mut specs = table_pairs(doc, "table#productDetails_detailBullets_sections1");
    if specs.is_empty() {
        specs.extend(detail_bullets(doc));
    }
    specs.extend(table_pairs(doc, "table#productDetails_techSpec_section_1"));
    specs.extend(table_pairs(doc, "table#productDetails_techSpec_section_2"));
    specs
}

fn table_pairs(doc: &Html, table_selector: &str) -> HashMap<String, String> {
    let table_sel = Selector::parse(table_selector).unwrap();
    let row_sel = Selector::parse("tr").unwrap();
    let mut pairs = HashMap::new();

    let Some(table) = doc.select(&table_sel).next() else {
        return pairs;
    };

    for row in table.select(&row_sel) {
        let key = resolve_first(row, &[css("th::text")], "Unknown Spec");
        if key == "Unknown Spec" {
            continue;
        }
        let value = match key.as_str() {
            "Customer Reviews" => {
                let rating = resolve_first(
                    row,
                    &[css("td.a-size-base span.a-size-base.a-color-base::text")],
                    "0.0",
                );
                let count = resolve_first(row, &[css("span#acrCustomerReviewText::text")], "0");
                format!("{} out of 5 stars ({})", rating, count)
            }
            "Best Sellers Rank" => {
                let rank = resolve_first(
                    row,
                    &[css("td > span > span:first-child::own-text")],
                    "Not Available",
                );
                let category = resolve_first(
                    row,
                    &[css("td > span > span:first-child > a::text")],
                    "Not Available",
                );
                let rank2 = resolve_first(
                    row,
                    &[css("td > span > span:nth-child(3)::own-text")],
                    "Not Available",
                );
                let category2 = resolve_first(
                    row,
                    &[css("td > span > span:nth-child(3) > a::text")],
                    "Not Available",
                );
                format!("{} {}, {} {}", rank, category, rank2, category2)
            }
            _ => resolve_first(row, &[css("td::text")], "Not Available"),
        };
        pairs.insert(key, value);
    }

    pairs
}

/// Fallback for pages that list details as bullets instead of a table.
fn detail_bullets(doc: &Html) -> HashMap<String, String> {
    let li_sel =
        Selector::parse("#detailBullets_feature_div > ul.detail-bullet-list > li").unwrap();
    let mut pairs = HashMap::new();

    for detail in doc.select(&li_sel) {
        let key = resolve_first(detail, &[css("span.a-text-bold::text")], "")
            .replace(':', "")
            .trim()
            .to_string();
        let value = resolve_first(detail, &[css("span:nth-child(2)::text")], "");
        if !key.is_empty() && !value.is_empty() {
            pairs.insert(key, value);
        }
    }

    pairs
}

// ── Tests ──

use scraper::{ElementRef, Html, Selector};

use crate::model::QaPair;
use crate::parser::select::{css, resolve_all, resolve_first};

/// Extract question/answer pairs. Each element whose id contains "question"
/// holds the question text; the immediately following sibling element holds
/// the answer candidates, of which the second one is the actual answer (the
/// first is the "showing N answers" header). Pairs missing either side are
/// dropped.
pub fn extract(doc: &Html) -> Vec<QaPair> {
    let question_sel = Selector::parse("[id*=\"question\"]").unwrap();
    let mut pairs = Vec::new();

    for question_el in doc.select(&question_sel) {
        let question = resolve_first(question_el, &[css("div > div > a > span::text")], "");

        let answer = question_el
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .next()
            .map(|sibling| resolve_all(sibling, &[css("div > span::text")], vec![]))
            .and_then(|answers| answers.into_iter().nth(1))
            .unwrap_or_default();

        if !question.is_empty() && !answer.is_empty() {
            pairs.push(QaPair { question, answer });
        }
    }

    pairs
}

// ── Tests ──

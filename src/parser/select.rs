use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};

static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Normalize an extracted string: drop bidi direction marks, collapse
/// whitespace runs (newlines and tabs included) to single spaces, delete
/// literal `\n` / `\r` escape sequences, trim.
pub fn clean_text(text: &str) -> String {
    let text = text.replace(['\u{200e}', '\u{200f}'], "");
    let text = WS_RE.replace_all(&text, " ");
    text.replace("\\n", "").replace("\\r", "").trim().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Css,
    Path,
}

/// One selector alternative for a field. Plans are tried in order; the first
/// one that yields a match wins.
#[derive(Debug, Clone, Copy)]
pub struct Plan {
    pub kind: QueryKind,
    pub query: &'static str,
}

pub const fn css(query: &'static str) -> Plan {
    Plan { kind: QueryKind::Css, query }
}

pub const fn path(query: &'static str) -> Plan {
    Plan { kind: QueryKind::Path, query }
}

/// Try each plan in order and return the first normalized match. Once a plan
/// yields anything, no further plans are tried; if normalization leaves an
/// empty string, `default` is returned instead.
pub fn resolve_first(scope: ElementRef, plans: &[Plan], default: &str) -> String {
    for plan in plans {
        if let Some(raw) = run_plan(scope, plan).into_iter().next() {
            let cleaned = clean_text(&raw);
            if cleaned.is_empty() {
                return default.to_string();
            }
            return cleaned;
        }
    }
    default.to_string()
}

/// Try each plan in order and return all normalized matches from the first
/// plan that yields any, or `default` when none does.
pub fn resolve_all(scope: ElementRef, plans: &[Plan], default: Vec<String>) -> Vec<String> {
    for plan in plans {
        let raw = run_plan(scope, plan);
        if !raw.is_empty() {
            return raw.iter().map(|s| clean_text(s)).collect();
        }
    }
    default
}

fn run_plan(scope: ElementRef, plan: &Plan) -> Vec<String> {
    let (query, target) = split_target(plan.query);
    match plan.kind {
        QueryKind::Css => {
            let selector = Selector::parse(query)
                .unwrap_or_else(|e| panic!("invalid css selector '{}': {:?}", query, e));
            scope
                .select(&selector)
                .filter_map(|el| extract_target(el, &target))
                .collect()
        }
        QueryKind::Path => run_path(scope, query)
            .into_iter()
            .filter_map(|el| extract_target(el, &target))
            .collect(),
    }
}

enum Target {
    Text,
    OwnText,
    Attr(String),
}

/// Split the extraction-target suffix off a query. `::text` is the default.
/// An unknown suffix is a programmer error in a query table, not a data error.
fn split_target(query: &str) -> (&str, Target) {
    match query.rsplit_once("::") {
        Some((sel, "text")) => (sel, Target::Text),
        Some((sel, "own-text")) => (sel, Target::OwnText),
        Some((sel, t)) if t.starts_with("attr(") && t.ends_with(')') => {
            (sel, Target::Attr(t["attr(".len()..t.len() - 1].to_string()))
        }
        Some((_, t)) => panic!("unsupported extraction target '::{}' in query '{}'", t, query),
        None => (query, Target::Text),
    }
}

fn extract_target(el: ElementRef, target: &Target) -> Option<String> {
    match target {
        Target::Text => Some(el.text().collect()),
        Target::OwnText => Some(
            el.children()
                .filter_map(|n| n.value().as_text().map(|t| &*t.text))
                .collect(),
        ),
        Target::Attr(name) => el.value().attr(name).map(str::to_string),
    }
}

// ── Path queries ──
//
// Minimal path language for fields where a CSS selector is awkward:
// `/`-separated steps, each a tag name with an optional attribute filter
// (`[attr=value]` exact, `[attr~=value]` whitespace-token member) or `*`.
// Every step matches descendants of the previous step's matches, in document
// order and deduplicated.

struct Step {
    name: Option<String>,
    attr: Option<AttrFilter>,
}

struct AttrFilter {
    key: String,
    value: String,
    token: bool,
}

impl Step {
    fn parse(step: &str) -> Self {
        let (name_part, attr) = match step.split_once('[') {
            Some((name, rest)) => {
                let body = rest
                    .strip_suffix(']')
                    .unwrap_or_else(|| panic!("unterminated attribute filter in path step '{}'", step));
                let (key, value, token) = if let Some((k, v)) = body.split_once("~=") {
                    (k, v, true)
                } else if let Some((k, v)) = body.split_once('=') {
                    (k, v, false)
                } else {
                    panic!("invalid attribute filter in path step '{}'", step)
                };
                (
                    name,
                    Some(AttrFilter {
                        key: key.to_string(),
                        value: value.to_string(),
                        token,
                    }),
                )
            }
            None => (step, None),
        };
        let name = match name_part {
            "" | "*" => None,
            n => Some(n.to_string()),
        };
        Step { name, attr }
    }

    fn matches(&self, el: &ElementRef) -> bool {
        if let Some(name) = &self.name {
            if el.value().name() != name {
                return false;
            }
        }
        if let Some(filter) = &self.attr {
            let Some(value) = el.value().attr(&filter.key) else {
                return false;
            };
            if filter.token {
                if !value.split_whitespace().any(|tok| tok == filter.value) {
                    return false;
                }
            } else if value != filter.value {
                return false;
            }
        }
        true
    }
}

fn run_path<'a>(scope: ElementRef<'a>, query: &str) -> Vec<ElementRef<'a>> {
    let mut frontier = vec![scope];
    for step in query.split('/').map(Step::parse) {
        let mut seen = HashSet::new();
        let mut next = Vec::new();
        for el in &frontier {
            for node in el.descendants().skip(1) {
                if let Some(child) = ElementRef::wrap(node) {
                    if step.matches(&child) && seen.insert(child.id()) {
                        next.push(child);
                    }
                }
            }
        }
        frontier = next;
        if frontier.is_empty() {
            break;
        }
    }
    frontier
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn doc(html: &str) -> Html {
        Html::parse_document(html)
    }

    #[test]
    fn clean_text_strips_bidi_and_collapses_whitespace() {
        assert_eq!(clean_text("\u{200e} 4.5 out \n\t of  5 \u{200f}"), "4.5 out of 5");
        assert_eq!(clean_text("line\\none\\rtwo"), "lineonetwo");
        assert_eq!(clean_text("   "), "");
    }

    #[test]
    fn first_plan_with_match_wins() {
        let html = doc("<div><span class='b'>second</span></div>");
        let plans = [css("span.a::text"), css("span.b::text")];
        assert_eq!(resolve_first(html.root_element(), &plans, "none"), "second");
    }

    #[test]
    fn later_plans_skipped_after_success() {
        let html = doc("<div><span class='a'>first</span><span class='b'>second</span></div>");
        let plans = [css("span.a::text"), css("span.b::text")];
        assert_eq!(resolve_first(html.root_element(), &plans, "none"), "first");
    }

    #[test]
    fn default_when_nothing_matches() {
        let html = doc("<div></div>");
        assert_eq!(
            resolve_first(html.root_element(), &[css("span.missing::text")], "fallback"),
            "fallback"
        );
    }

    #[test]
    fn empty_after_normalization_falls_to_default() {
        // The plan matches, so no further plans are tried, but the cleaned
        // text is empty and the default applies.
        let html = doc("<div><span class='a'>   </span><span class='b'>real</span></div>");
        let plans = [css("span.a::text"), css("span.b::text")];
        assert_eq!(resolve_first(html.root_element(), &plans, "dflt"), "dflt");
    }

    #[test]
    fn resolve_all_returns_every_match_of_first_plan() {
        let html = doc("<ul><li>one</li><li> two </li></ul><p>extra</p>");
        let all = resolve_all(html.root_element(), &[css("li::text"), css("p::text")], vec![]);
        assert_eq!(all, vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn resolve_all_default_passthrough() {
        let html = doc("<div></div>");
        let default = vec!["a".to_string(), "b".to_string()];
        let all = resolve_all(html.root_element(), &[css("li::text")], default.clone());
        assert_eq!(all, default);
    }

    #[test]
    fn attr_target_skips_elements_without_attribute() {
        let html = doc("<div><img alt='x'><img src='https://img/1.jpg'></div>");
        assert_eq!(
            resolve_first(html.root_element(), &[css("img::attr(src)")], ""),
            "https://img/1.jpg"
        );
    }

    #[test]
    fn own_text_excludes_nested_elements() {
        let html = doc("<td><span>#55 in <a>Electronics</a></span></td>");
        assert_eq!(
            resolve_first(html.root_element(), &[css("span::own-text")], ""),
            "#55 in"
        );
        assert_eq!(
            resolve_first(html.root_element(), &[css("span::text")], ""),
            "#55 in Electronics"
        );
    }

    #[test]
    fn path_steps_match_descendants_at_each_level() {
        let html = doc(
            "<div id='feature-bullets'><ul><li><span class='a-list-item big'>Fast CPU</span></li>\
             <li><span class='a-list-item'>Light</span></li></ul></div>\
             <li><span class='a-list-item'>outside</span></li>",
        );
        let plans = [path("div[id=feature-bullets]/li/span[class~=a-list-item]::text")];
        let all = resolve_all(html.root_element(), &plans, vec![]);
        assert_eq!(all, vec!["Fast CPU".to_string(), "Light".to_string()]);
    }

    #[test]
    fn path_attr_target() {
        let html = doc("<div id='imgTagWrapperId'><img src='https://img/main.jpg'></div>");
        let plans = [path("div[id=imgTagWrapperId]/img::attr(src)")];
        assert_eq!(
            resolve_first(html.root_element(), &plans, ""),
            "https://img/main.jpg"
        );
    }

    #[test]
    fn rerunning_resolution_is_idempotent() {
        let html = doc("<div><span class='a'>stable</span></div>");
        let plans = [css("span.a::text")];
        let first = resolve_first(html.root_element(), &plans, "");
        let second = resolve_first(html.root_element(), &plans, "");
        assert_eq!(first, second);
    }

    #[test]
    #[should_panic(expected = "unsupported extraction target")]
    fn unknown_target_is_a_programmer_error() {
        let html = doc("<div></div>");
        resolve_first(html.root_element(), &[css("div::html")], "");
    }
}

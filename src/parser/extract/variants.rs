use std::collections::HashMap;

use scraper::{Html, Selector};

use crate::model::VariantOption;
use crate::parser::select::{clean_text, css, path, resolve_first};

/// Extract variant sections (capacity, color, ...) from the twister form.
/// Sections without a resolvable title are skipped entirely.
pub fn extract(doc: &Html) -> HashMap<String, Vec<VariantOption>> {
    let form_sel = Selector::parse("form#twister").unwrap();
    let section_sel = Selector::parse("div.a-section.a-spacing-small").unwrap();
    let option_sel = Selector::parse("li.swatchAvailable, li.swatchSelect").unwrap();

    let mut variants = HashMap::new();
    let Some(form) = doc.select(&form_sel).next() else {
        return variants;
    };

    for section in form.select(&section_sel) {
        let title = resolve_first(section, &[path("label[class~=a-form-label]::text")], "");
        if title.is_empty() {
            continue;
        }

        let mut options = Vec::new();
        for option in section.select(&option_sel) {
            // The swatch title attribute names the option; fall back to the
            // swatch's visible text.
            let mut name = option
                .value()
                .attr("title")
                .map(clean_text)
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| resolve_first(option, &[css("span::text")], ""));
            if name.contains("Click to select") {
                name = name.replace("Click to select", "").trim().to_string();
            }

            let image = {
                let src = resolve_first(option, &[path("img::attr(src)")], "");
                (!src.is_empty()).then_some(src)
            };
            let color = image.is_some().then(|| name.clone());

            options.push(VariantOption { name, color, image });
        }

        variants.insert(title, options);
    }

    variants
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    const TWISTER: &str = r#"
        <form id="twister">
          <div class="a-section a-spacing-small">
            <label class="a-form-label">Capacity</label>
            <ul>
              <li class="swatchSelect" title="Click to select 512 GB"><span>512 GB</span></li>
              <li class="swatchAvailable"><span>1 TB</span></li>
              <li class="swatchUnavailable"><span>2 TB</span></li>
            </ul>
          </div>
          <div class="a-section a-spacing-small">
            <ul><li class="swatchAvailable"><span>orphan option</span></li></ul>
          </div>
          <div class="a-section a-spacing-small">
            <label class="a-form-label">Color</label>
            <ul>
              <li class="swatchAvailable" title="Silver"><img src="https://img/silver.jpg"></li>
            </ul>
          </div>
        </form>
    "#;

    #[test]
    fn titled_sections_with_options() {
        let doc = Html::parse_document(TWISTER);
        let variants = extract(&doc);
        assert_eq!(variants.len(), 2);
        let capacity = &variants["Capacity"];
        assert_eq!(capacity.len(), 2);
        assert_eq!(capacity[0].name, "512 GB");
        assert_eq!(capacity[1].name, "1 TB");
        assert!(capacity[0].image.is_none());
    }

    #[test]
    fn untitled_sections_skipped() {
        let doc = Html::parse_document(TWISTER);
        let variants = extract(&doc);
        assert!(variants.values().flatten().all(|o| o.name != "orphan option"));
    }

    #[test]
    fn swatch_image_sets_color_and_image() {
        let doc = Html::parse_document(TWISTER);
        let variants = extract(&doc);
        let silver = &variants["Color"][0];
        assert_eq!(silver.name, "Silver");
        assert_eq!(silver.color.as_deref(), Some("Silver"));
        assert_eq!(silver.image.as_deref(), Some("https://img/silver.jpg"));
    }

    #[test]
    fn no_twister_form_yields_empty_map() {
        let doc = Html::parse_document("<div></div>");
        assert!(extract(&doc).is_empty());
    }
}

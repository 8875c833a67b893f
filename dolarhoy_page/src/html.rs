//! Static HTML to [`DomNode`] conversion.
//!
//! Used when the page is fetched without a browser. There is no style engine
//! here, so visibility is judged from the `hidden` attribute and the inline
//! `style` declarations only.

use std::collections::BTreeMap;

use scraper::{ElementRef, Html, Node};

use crate::dom::{DomNode, ElementNode};

/// Elements whose contents never show up as page text.
pub(crate) const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Parses a full HTML document into a tree rooted at `<html>`.
pub fn parse_html(html: &str) -> DomNode {
    let document = Html::parse_document(html);
    convert(document.root_element(), false)
}

fn convert(element: ElementRef<'_>, inherited_hidden: bool) -> DomNode {
    let value = element.value();
    let style = value.attr("style").map(parse_inline_style).unwrap_or_default();

    // `visibility` inherits, `display` and `opacity` are per element.
    let visibility_hidden = match style.get("visibility").map(String::as_str) {
        Some("hidden") | Some("collapse") => true,
        Some("visible") => false,
        _ => inherited_hidden,
    };
    let display_none = style.get("display").map(String::as_str) == Some("none");
    let transparent = style
        .get("opacity")
        .and_then(|v| v.parse::<f64>().ok())
        .is_some_and(|v| v == 0.0);
    let visible = value.attr("hidden").is_none() && !display_none && !transparent && !visibility_hidden;

    let mut children = Vec::new();
    for child in element.children() {
        match child.value() {
            Node::Text(text) => children.push(DomNode::text(text.to_string())),
            Node::Element(el) if SKIPPED_TAGS.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    children.push(convert(child_el, visibility_hidden));
                }
            }
            _ => {}
        }
    }

    let attributes: BTreeMap<String, String> = value
        .attrs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    DomNode::Element(ElementNode {
        tag: value.name().to_string(),
        attributes,
        visible,
        children,
    })
}

fn parse_inline_style(style: &str) -> BTreeMap<String, String> {
    style
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .map(|(prop, val)| {
            let val = val.trim().to_ascii_lowercase();
            let val = val.trim_end_matches("!important").trim().to_string();
            (prop.trim().to_ascii_lowercase(), val)
        })
        .collect()
}

use chrono::{TimeZone, Utc};
use dolarhoy_lib::dolarhoy_page::{parse_html, Document, DomNode};
use dolarhoy_lib::{find_card, has_numeric_value, Assembler, RateCategory, RateQuote};

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

fn assembler() -> Assembler {
    Assembler::new("https://www.dolarhoy.com/", "America/Argentina/Buenos_Aires")
}

fn el(tag: &str, children: Vec<DomNode>) -> DomNode {
    DomNode::element(tag, children)
}

fn txt(text: &str) -> DomNode {
    DomNode::text(text)
}

#[test]
fn home_page_yields_every_category() {
    let root = parse_html(&load_fixture("dolarhoy_home.html"));
    let at = Utc.with_ymd_and_hms(2025, 1, 10, 15, 0, 0).unwrap();
    let record = assembler().assemble_at(&Document::new(&root), at);

    assert_eq!(record.timestamp, "2025-01-10T15:00:00.000Z");
    let quote = |compra, venta| RateQuote {
        compra: Some(compra),
        venta: Some(venta),
    };
    assert_eq!(record.data.blue, quote(1420.0, 1460.0));
    assert_eq!(record.data.oficial, quote(1030.5, 1070.5));
    assert_eq!(record.data.mep, quote(1445.3, 1447.8));
    assert_eq!(record.data.cripto, quote(1480.0, 1495.0));
    assert_eq!(record.data.ccl, quote(1470.1, 1475.9));
    assert_eq!(record.data.tarjeta.venta, Some(1898.0));
    assert!(has_numeric_value(&record));
}

#[test]
fn home_page_skips_nav_and_hidden_titles() {
    let root = parse_html(&load_fixture("dolarhoy_home.html"));
    let doc = Document::new(&root);

    let oficial = find_card(&doc, "Dólar Oficial").unwrap();
    assert!(oficial.closest("section").is_some());
    assert!(oficial.closest("header").is_none());
    assert!(!oficial.text_content().contains("$1,00"));
}

#[test]
fn blue_only_page_leaves_other_categories_null() {
    let root = el(
        "html",
        vec![el(
            "body",
            vec![el(
                "div",
                vec![
                    el("h2", vec![txt("Dólar blue")]),
                    el("p", vec![txt("Cotización actualizada")]),
                    el("div", vec![el("span", vec![txt("Compra")]), el("span", vec![txt("$1.420,00")])]),
                    el("div", vec![el("span", vec![txt("Venta")]), el("span", vec![txt("$1.460,00")])]),
                ],
            )],
        )],
    );
    let record = assembler().assemble(&root);

    assert_eq!(
        record.data.blue,
        RateQuote {
            compra: Some(1420.0),
            venta: Some(1460.0)
        }
    );
    for category in RateCategory::ALL {
        if category != RateCategory::Blue {
            assert_eq!(record.data.quote(category), RateQuote::default(), "{}", category);
        }
    }
    assert!(has_numeric_value(&record));
}

#[test]
fn page_without_titles_fails_validation() {
    let root = el(
        "body",
        vec![el("div", vec![txt("Compra $1.420,00 Venta $1.460,00")])],
    );
    let record = assembler().assemble(&root);
    assert!(record.data.slots().all(|slot| slot.is_none()));
    assert!(!has_numeric_value(&record));
}

#[test]
fn title_only_in_nav_is_never_a_card() {
    let root = el(
        "body",
        vec![
            el("nav", vec![el("div", vec![txt("Dólar blue")])]),
            el("div", vec![txt("Compra $1.420,00 Venta $1.460,00")]),
        ],
    );
    let doc = Document::new(&root);
    assert!(find_card(&doc, "Dólar blue").is_none());
    assert!(!has_numeric_value(&assembler().assemble(&root)));
}

#[test]
fn record_serializes_in_history_layout() {
    let root = parse_html(&load_fixture("dolarhoy_home.html"));
    let record = assembler().assemble(&root);
    let value = serde_json::to_value(&record).unwrap();

    assert!(value["timestamp"].as_str().unwrap().ends_with('Z'));
    assert_eq!(value["source"], "https://www.dolarhoy.com/");
    assert_eq!(value["data"]["blue"]["compra"], 1420.0);
    assert!(value["data"]["tarjeta"].get("compra").is_none());
}

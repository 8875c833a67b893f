use anyhow::Result;
use dolarhoy_lib::{RateCategory, ScrapeRecord};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug, PartialEq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

/// One category of a single record.
#[derive(Tabled, Serialize)]
struct RateRow {
    #[tabled(rename = "Category")]
    #[serde(rename = "Category")]
    category: String,
    #[tabled(rename = "Compra")]
    #[serde(rename = "Compra")]
    compra: String,
    #[tabled(rename = "Venta")]
    #[serde(rename = "Venta")]
    venta: String,
}

/// One record per line, compra/venta per category.
#[derive(Tabled, Serialize)]
struct HistoryRow {
    #[tabled(rename = "Timestamp")]
    #[serde(rename = "Timestamp")]
    timestamp: String,
    #[tabled(rename = "Blue C")]
    #[serde(rename = "Blue Compra")]
    blue_compra: String,
    #[tabled(rename = "Blue V")]
    #[serde(rename = "Blue Venta")]
    blue_venta: String,
    #[tabled(rename = "Oficial C")]
    #[serde(rename = "Oficial Compra")]
    oficial_compra: String,
    #[tabled(rename = "Oficial V")]
    #[serde(rename = "Oficial Venta")]
    oficial_venta: String,
    #[tabled(rename = "MEP C")]
    #[serde(rename = "MEP Compra")]
    mep_compra: String,
    #[tabled(rename = "MEP V")]
    #[serde(rename = "MEP Venta")]
    mep_venta: String,
    #[tabled(rename = "Cripto C")]
    #[serde(rename = "Cripto Compra")]
    cripto_compra: String,
    #[tabled(rename = "Cripto V")]
    #[serde(rename = "Cripto Venta")]
    cripto_venta: String,
    #[tabled(rename = "CCL C")]
    #[serde(rename = "CCL Compra")]
    ccl_compra: String,
    #[tabled(rename = "CCL V")]
    #[serde(rename = "CCL Venta")]
    ccl_venta: String,
    #[tabled(rename = "Tarjeta V")]
    #[serde(rename = "Tarjeta Venta")]
    tarjeta_venta: String,
}

// -- Row builders --

fn build_rate_rows(record: &ScrapeRecord) -> Vec<RateRow> {
    RateCategory::ALL
        .into_iter()
        .map(|category| {
            let quote = record.data.quote(category);
            RateRow {
                category: category_label(category).to_string(),
                compra: format_price(quote.compra),
                venta: format_price(quote.venta),
            }
        })
        .collect()
}

fn build_history_rows(records: &[ScrapeRecord]) -> Vec<HistoryRow> {
    records
        .iter()
        .map(|r| {
            let d = &r.data;
            HistoryRow {
                timestamp: r.timestamp.clone(),
                blue_compra: format_price(d.blue.compra),
                blue_venta: format_price(d.blue.venta),
                oficial_compra: format_price(d.oficial.compra),
                oficial_venta: format_price(d.oficial.venta),
                mep_compra: format_price(d.mep.compra),
                mep_venta: format_price(d.mep.venta),
                cripto_compra: format_price(d.cripto.compra),
                cripto_venta: format_price(d.cripto.venta),
                ccl_compra: format_price(d.ccl.compra),
                ccl_venta: format_price(d.ccl.venta),
                tarjeta_venta: format_price(d.tarjeta.venta),
            }
        })
        .collect()
}

// -- Printers --

/// Prints one record in `format`. JSON keeps the stored layout.
pub fn print_record(record: &ScrapeRecord, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(record),
        OutputFormat::Table => {
            println!("{} ({})", record.timestamp, record.timezone);
            println!("{}", Table::new(build_rate_rows(record)));
        }
        OutputFormat::Markdown => {
            let mut table = Table::new(build_rate_rows(record));
            table.with(Style::markdown());
            println!("{}", table);
        }
        OutputFormat::Csv => write_csv(build_rate_rows(record))?,
    }
    Ok(())
}

pub fn print_history(records: &[ScrapeRecord], format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&records),
        OutputFormat::Table => println!("{}", Table::new(build_history_rows(records))),
        OutputFormat::Markdown => {
            let mut table = Table::new(build_history_rows(records));
            table.with(Style::markdown());
            println!("{}", table);
        }
        OutputFormat::Csv => write_csv(build_history_rows(records))?,
    }
    Ok(())
}

fn write_csv<T: Serialize>(rows: Vec<T>) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

fn category_label(category: RateCategory) -> &'static str {
    match category {
        RateCategory::Blue => "Blue",
        RateCategory::Oficial => "Oficial",
        RateCategory::Mep => "MEP",
        RateCategory::Cripto => "Cripto",
        RateCategory::Ccl => "CCL",
        RateCategory::Tarjeta => "Tarjeta",
    }
}

/// `$1.475,90`, or `-` when unknown.
fn format_price(value: Option<f64>) -> String {
    let Some(value) = value else {
        return "-".to_string();
    };
    let fixed = format!("{:.2}", value.abs());
    let (int_part, dec_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::new();
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*c);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}${},{}", sign, grouped, dec_part)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dolarhoy_lib::{RateData, RateQuote, VentaQuote};

    fn sample() -> ScrapeRecord {
        ScrapeRecord {
            timestamp: "2025-01-10T15:00:00.000Z".into(),
            timezone: "America/Argentina/Buenos_Aires".into(),
            source: "https://www.dolarhoy.com/".into(),
            data: RateData {
                blue: RateQuote {
                    compra: Some(1420.0),
                    venta: Some(1460.0),
                },
                tarjeta: VentaQuote {
                    venta: Some(1898.5),
                },
                ..Default::default()
            },
        }
    }

    #[test]
    fn format_price_uses_es_ar_separators() {
        assert_eq!(format_price(Some(1475.9)), "$1.475,90");
        assert_eq!(format_price(Some(1234567.891)), "$1.234.567,89");
        assert_eq!(format_price(Some(12.0)), "$12,00");
        assert_eq!(format_price(Some(-0.25)), "-$0,25");
        assert_eq!(format_price(None), "-");
    }

    #[test]
    fn rate_rows_cover_every_category() {
        let rows = build_rate_rows(&sample());
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].category, "Blue");
        assert_eq!(rows[0].venta, "$1.460,00");
        assert_eq!(rows[1].compra, "-");
        assert_eq!(rows[5].category, "Tarjeta");
        assert_eq!(rows[5].compra, "-");
        assert_eq!(rows[5].venta, "$1.898,50");
    }

    #[test]
    fn history_rows_keep_order() {
        let mut later = sample();
        later.timestamp = "2025-01-10T15:10:00.000Z".into();
        let rows = build_history_rows(&[sample(), later]);
        assert_eq!(rows[1].timestamp, "2025-01-10T15:10:00.000Z");
        assert_eq!(rows[0].tarjeta_venta, "$1.898,50");
    }

    #[test]
    fn markdown_table_has_headers() {
        let mut table = Table::new(build_rate_rows(&sample()));
        table.with(Style::markdown());
        let rendered = table.to_string();
        assert!(rendered.contains("| Category"));
        assert!(rendered.contains("$1.420,00"));
    }

    #[test]
    fn csv_uses_long_headers() {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        for row in build_history_rows(&[sample()]) {
            wtr.serialize(row).unwrap();
        }
        let text = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        assert!(text.starts_with("Timestamp,Blue Compra,Blue Venta"));
        assert!(text.contains("\"$1.420,00\""));
    }
}

use super::ui;
use crate::core::rates::{CurrencyRecord, Selector};
use crate::pipeline::{Outcome, RateStage, Representation};
use comfy_table::Cell;
use std::io::{self, Write};
use tracing::error;

pub const UNAVAILABLE_MESSAGE: &str = "Could not fetch currency rates. Try again later.";
pub const NO_MATCH_MESSAGE: &str = "No currencies matched the requested identifiers.";

pub fn display_as_table(records: &[CurrencyRecord]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Code"),
        ui::header_cell("Currency"),
        ui::header_cell("Rate (RUB)"),
    ]);

    for record in records {
        table.add_row(vec![
            Cell::new(&record.code),
            Cell::new(&record.name),
            ui::rate_cell(record),
        ]);
    }

    format!(
        "{}\n\n{}",
        ui::style_text("Currency Rates", ui::StyleType::Title),
        table
    )
}

/// Asks `stage` for its representation and writes it to `out`.
///
/// Anything that is not rate data goes to `diagnostics`: the unavailable and
/// no match messages as well as stage failures. `out` only ever receives the
/// table or the formatted text, so a header-only CSV on `out` is told apart
/// by what `diagnostics` got. Only write errors are returned.
pub async fn render<W: Write, E: Write>(
    stage: &dyn RateStage,
    selector: &Selector,
    out: &mut W,
    diagnostics: &mut E,
) -> io::Result<()> {
    let representation = match stage.produce(selector).await {
        Ok(representation) => representation,
        Err(e) => {
            error!(error = %e, "Failed to produce currency rates");
            return writeln!(
                diagnostics,
                "{}",
                ui::style_text(
                    &format!("Failed to produce currency rates: {e:#}"),
                    ui::StyleType::Error
                )
            );
        }
    };

    let outcome = representation.outcome();
    match representation {
        Representation::Snapshot(records) if !records.is_empty() => {
            writeln!(out, "{}", display_as_table(&records))?
        }
        Representation::Snapshot(_) | Representation::Unavailable => {}
        Representation::Json(formatted) => writeln!(out, "{}", formatted.text)?,
        // Rows already end with a newline
        Representation::Csv(formatted) => write!(out, "{}", formatted.text)?,
    }

    match outcome {
        Outcome::Rates => Ok(()),
        Outcome::NoMatch => writeln!(
            diagnostics,
            "{}",
            ui::style_text(NO_MATCH_MESSAGE, ui::StyleType::Subtle)
        ),
        Outcome::Unavailable => writeln!(
            diagnostics,
            "{}",
            ui::style_text(UNAVAILABLE_MESSAGE, ui::StyleType::Error)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_utils::FixedStage;
    use crate::pipeline::{CsvStage, Formatted, JsonStage};

    struct Rendered {
        out: String,
        diagnostics: String,
    }

    async fn render_to_strings(stage: &dyn RateStage) -> Rendered {
        let mut out = Vec::new();
        let mut diagnostics = Vec::new();
        render(stage, &Selector::All, &mut out, &mut diagnostics)
            .await
            .unwrap();
        Rendered {
            out: String::from_utf8(out).unwrap(),
            diagnostics: String::from_utf8(diagnostics).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_render_snapshot_table() {
        let stage = FixedStage::new(Representation::Snapshot(vec![CurrencyRecord::new(
            "USD",
            "Доллар США",
            "74,23",
        )]));
        let rendered = render_to_strings(&stage).await;
        assert!(rendered.out.contains("Currency Rates"));
        assert!(rendered.out.contains("USD"));
        assert!(rendered.out.contains("Доллар США"));
        assert!(rendered.out.contains("74,23"));
        assert!(rendered.diagnostics.is_empty());
    }

    #[test]
    fn test_table_marks_unparseable_rate() {
        let table = display_as_table(&[
            CurrencyRecord::new("USD", "Доллар США", "74,23"),
            CurrencyRecord::new("XXX", "Нет курса", "n/a,?"),
        ]);
        assert!(table.contains("74,23"));
        assert!(table.contains("N/A"));
        assert!(!table.contains("n/a,?"));
    }

    #[tokio::test]
    async fn test_render_distinguishes_unavailable_and_empty() {
        let unavailable = render_to_strings(&FixedStage::new(Representation::Unavailable)).await;
        let empty = render_to_strings(&FixedStage::new(Representation::Snapshot(vec![]))).await;

        assert!(unavailable.diagnostics.contains(UNAVAILABLE_MESSAGE));
        assert!(empty.diagnostics.contains(NO_MATCH_MESSAGE));
        assert_ne!(unavailable.diagnostics, empty.diagnostics);
    }

    #[tokio::test]
    async fn test_csv_unavailable_differs_from_csv_no_match() {
        let unavailable =
            render_to_strings(&CsvStage::new(FixedStage::boxed(Representation::Unavailable)))
                .await;
        let empty = render_to_strings(&CsvStage::new(FixedStage::boxed(
            Representation::Snapshot(vec![]),
        )))
        .await;

        // stdout stays machine readable, the difference is on the diagnostics stream
        assert_eq!(unavailable.out, "code;value;name\n");
        assert_eq!(empty.out, "code;value;name\n");
        assert!(unavailable.diagnostics.contains(UNAVAILABLE_MESSAGE));
        assert!(empty.diagnostics.contains(NO_MATCH_MESSAGE));
        assert_ne!(
            (unavailable.out, unavailable.diagnostics),
            (empty.out, empty.diagnostics)
        );
    }

    #[tokio::test]
    async fn test_json_csv_unavailable_reports_diagnostic() {
        let stage = CsvStage::new(Box::new(JsonStage::new(FixedStage::boxed(
            Representation::Unavailable,
        ))));
        let rendered = render_to_strings(&stage).await;

        assert_eq!(rendered.out, "code;value;name\n");
        assert!(rendered.diagnostics.contains(UNAVAILABLE_MESSAGE));
    }

    #[tokio::test]
    async fn test_json_unavailable_reports_diagnostic() {
        let unavailable =
            render_to_strings(&JsonStage::new(FixedStage::boxed(Representation::Unavailable)))
                .await;
        let empty = render_to_strings(&JsonStage::new(FixedStage::boxed(
            Representation::Snapshot(vec![]),
        )))
        .await;

        assert!(unavailable.out.contains("R9999"));
        assert!(unavailable.diagnostics.contains(UNAVAILABLE_MESSAGE));
        assert_eq!(empty.out, "[]\n");
        assert!(empty.diagnostics.contains(NO_MATCH_MESSAGE));
    }

    #[tokio::test]
    async fn test_render_text_verbatim() {
        let csv = "code;value;name\nUSD;74,23;Доллар США\n";
        let rendered = render_to_strings(&FixedStage::new(Representation::Csv(Formatted::new(
            csv,
            Outcome::Rates,
        ))))
        .await;
        assert_eq!(rendered.out, csv);
        assert!(rendered.diagnostics.is_empty());

        let json = r#"[{"USD": ["Доллар США", "74,23"]}]"#;
        let rendered = render_to_strings(&FixedStage::new(Representation::Json(Formatted::new(
            json,
            Outcome::Rates,
        ))))
        .await;
        assert_eq!(rendered.out, format!("{json}\n"));
    }

    #[tokio::test]
    async fn test_render_stage_error_as_diagnostic() {
        let stage = CsvStage::new(FixedStage::boxed(Representation::Json(Formatted::new(
            "not json",
            Outcome::Rates,
        ))));
        let rendered = render_to_strings(&stage).await;
        assert!(rendered.out.is_empty());
        assert!(
            rendered
                .diagnostics
                .contains("Failed to produce currency rates")
        );
    }
}

//! CSV export of the current view.
//!
//! Header line carries the bare column names (quoted only when a name needs
//! it); every data cell is quoted with embedded quotes doubled. Cells hold
//! each value's raw text, not its display formatting.

use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use tracing::info;

use crate::domain::ChartImage;
use crate::error::ExportError;
use crate::query::View;

/// Default leading columns for trade exports.
pub const PREFERRED_COLUMNS: [&str; 8] = [
    "created_time",
    "ticker",
    "taker_side",
    "yes_price",
    "no_price",
    "price",
    "count",
    "trade_id",
];

/// Preferred columns present in the view first, then the rest in
/// first-seen order.
pub fn export_columns<S: AsRef<str>>(view: &View<'_>, preferred: &[S]) -> Vec<String> {
    let mut seen: Vec<&str> = Vec::new();
    for record in view.iter() {
        for c in record.columns() {
            if !seen.contains(&c) {
                seen.push(c);
            }
        }
    }

    let mut columns: Vec<String> = preferred
        .iter()
        .map(AsRef::as_ref)
        .filter(|p| seen.contains(p))
        .map(str::to_string)
        .collect();
    for c in seen {
        if !columns.iter().any(|known| known == c) {
            columns.push(c.to_string());
        }
    }
    columns
}

fn writer(style: QuoteStyle, buf: Vec<u8>) -> csv::Writer<Vec<u8>> {
    WriterBuilder::new()
        .quote_style(style)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(buf)
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, ExportError> {
    wtr.into_inner()
        .map_err(|e| ExportError::Csv(csv::Error::from(e.into_error())))
}

/// Render the view as CSV text.
pub fn serialize<S: AsRef<str>>(view: &View<'_>, preferred: &[S]) -> Result<String, ExportError> {
    if view.is_empty() {
        return Err(ExportError::NothingToExport);
    }
    let columns = export_columns(view, preferred);

    let mut header = writer(QuoteStyle::Necessary, Vec::new());
    header.write_record(&columns)?;
    let buf = finish(header)?;

    let mut body = writer(QuoteStyle::Always, buf);
    for record in view.iter() {
        body.write_record(
            columns
                .iter()
                .map(|c| record.get(c).map(|v| v.to_text()).unwrap_or_default()),
        )?;
    }
    let buf = finish(body)?;

    String::from_utf8(buf).map_err(|e| {
        ExportError::Csv(csv::Error::from(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e,
        )))
    })
}

/// `trades_<YYYY-MM-DD>.csv`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("trades_{}.csv", date.format("%Y-%m-%d"))
}

/// Write the view to `dir/trades_<date>.csv`, creating `dir` if needed.
pub fn write_csv<S: AsRef<str>>(
    view: &View<'_>,
    preferred: &[S],
    dir: &Path,
    date: NaiveDate,
) -> Result<PathBuf, ExportError> {
    let text = serialize(view, preferred)?;
    let path = dir.join(export_file_name(date));
    let io_err = |source| ExportError::Io {
        path: path.clone(),
        source,
    };
    fs::create_dir_all(dir).map_err(io_err)?;
    fs::write(&path, text).map_err(io_err)?;
    info!(path = %path.display(), rows = view.len(), "exported trades");
    Ok(path)
}

/// Decode a chart payload to PNG bytes. A `data:` URL prefix is accepted.
pub fn chart_png(image: &ChartImage) -> Result<Vec<u8>, ExportError> {
    let data = image.image_data.trim();
    let data = match data.strip_prefix("data:") {
        Some(url) => url.split_once(',').map_or(url, |(_, payload)| payload),
        None => data,
    };
    Ok(STANDARD.decode(data)?)
}

/// Write a chart to `dir/chart_<type>_<date>.png`.
pub fn write_chart(image: &ChartImage, dir: &Path, date: NaiveDate) -> Result<PathBuf, ExportError> {
    let png = chart_png(image)?;
    let path = dir.join(format!(
        "chart_{}_{}.png",
        image.chart_type,
        date.format("%Y-%m-%d")
    ));
    let io_err = |source| ExportError::Io {
        path: path.clone(),
        source,
    };
    fs::create_dir_all(dir).map_err(io_err)?;
    fs::write(&path, png).map_err(io_err)?;
    info!(path = %path.display(), "saved chart");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Record, Value};

    fn dataset() -> Vec<Record> {
        vec![
            Record::new()
                .with("trade_id", "t1")
                .with("yes_price", 45i64)
                .with("note", "said \"hi\", left")
                .with("created_time", "2024-05-01T12:00:00Z"),
            Record::new()
                .with("trade_id", "t2")
                .with("yes_price", Value::Null)
                .with("created_time", "2024-05-01T13:00:00Z")
                .with("extra", 1.5),
        ]
    }

    #[test]
    fn preferred_columns_lead() {
        let d = dataset();
        let rows = [0, 1];
        let view = View::over(&d, &rows);
        assert_eq!(
            export_columns(&view, &PREFERRED_COLUMNS),
            ["created_time", "yes_price", "trade_id", "note", "extra"]
        );
    }

    #[test]
    fn quoting_rules() {
        let d = dataset();
        let rows = [0, 1];
        let view = View::over(&d, &rows);
        let text = serialize(&view, &PREFERRED_COLUMNS).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "created_time,yes_price,trade_id,note,extra");
        assert_eq!(
            lines[1],
            r#""2024-05-01T12:00:00Z","45","t1","said ""hi"", left","""#
        );
        assert_eq!(lines[2], r#""2024-05-01T13:00:00Z","","t2","","1.5""#);
        assert!(text.ends_with('\n'));
        assert!(!text.contains('\r'));
    }

    #[test]
    fn header_quoted_only_when_needed() {
        let d = vec![Record::new().with("a,b", "x").with("plain", "y")];
        let rows = [0];
        let text = serialize(&View::over(&d, &rows), &[] as &[&str]).unwrap();
        assert_eq!(text.lines().next(), Some(r#""a,b",plain"#));
    }

    #[test]
    fn follows_view_order() {
        let d = dataset();
        let rows = [1, 0];
        let text = serialize(&View::over(&d, &rows), &["trade_id"]).unwrap();
        let ids: Vec<&str> = text.lines().skip(1).map(|l| &l[..4]).collect();
        assert_eq!(ids, [r#""t2""#, r#""t1""#]);
    }

    #[test]
    fn empty_view_is_an_error() {
        let d = dataset();
        let view = View::over(&d, &[]);
        assert!(matches!(
            serialize(&view, &PREFERRED_COLUMNS),
            Err(ExportError::NothingToExport)
        ));
    }

    #[test]
    fn writes_dated_file() {
        let dir = tempfile::tempdir().unwrap();
        let d = dataset();
        let rows = [0];
        let date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let path = write_csv(&View::over(&d, &rows), &PREFERRED_COLUMNS, &dir.path().join("out"), date)
            .unwrap();
        assert_eq!(path.file_name().unwrap(), "trades_2024-05-02.csv");
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.starts_with("created_time,yes_price,trade_id,note\n"));
    }

    #[test]
    fn chart_payload_decodes_to_png() {
        let image = ChartImage {
            chart_type: "price".into(),
            image_data: "iVBORw0KGgo=".into(),
        };
        let png = chart_png(&image).unwrap();
        assert_eq!(&png[1..4], b"PNG");

        let url = ChartImage {
            image_data: "data:image/png;base64,iVBORw0KGgo=".into(),
            ..image.clone()
        };
        assert_eq!(chart_png(&url).unwrap(), png);

        let bad = ChartImage {
            image_data: "***".into(),
            ..image
        };
        assert!(matches!(chart_png(&bad), Err(ExportError::InvalidImage(_))));
    }

    #[test]
    fn writes_chart_file() {
        let dir = tempfile::tempdir().unwrap();
        let image = ChartImage {
            chart_type: "volume".into(),
            image_data: "iVBORw0KGgo=".into(),
        };
        let date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let path = write_chart(&image, dir.path(), date).unwrap();
        assert_eq!(path.file_name().unwrap(), "chart_volume_2024-05-02.png");
        assert_eq!(std::fs::read(path).unwrap().len(), 8);
    }
}

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::record_batch::RecordBatchReader;
use calamine::{open_workbook_auto, DataType as SheetCell, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::LoadError;
use super::model::{Cell, PointRecord, PointTable, RawTable};
use crate::config::{CoordColumns, PointColumns};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Read both source datasets and inner-join them into a [`PointTable`].
pub fn load_points(
    points_path: &Path,
    coords_path: &Path,
    point_columns: &PointColumns,
    coord_columns: &CoordColumns,
) -> Result<PointTable, LoadError> {
    let points = read_table(points_path)?;
    log::info!(
        "Read {} point rows from {}",
        points.rows.len(),
        points.path().display()
    );
    let coords = read_table(coords_path)?;
    log::info!(
        "Read {} coordinate rows from {}",
        coords.rows.len(),
        coords.path().display()
    );

    join(&points, &coords, point_columns, coord_columns)
}

/// Load a single tabular file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xls` / `.ods` – first worksheet, first row is the header
/// * `.csv`     – header row, comma separated
/// * `.json`    – `[{ "column": value, ... }, ...]`
/// * `.parquet` – flat columns (strings, ints, floats, bools)
pub fn read_table(path: &Path) -> Result<RawTable, LoadError> {
    std::fs::metadata(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "ods" => read_spreadsheet(path),
        "csv" => read_csv(path),
        "json" => read_json(path),
        "parquet" | "pq" => read_parquet(path),
        other => Err(LoadError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension: other.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Join
// ---------------------------------------------------------------------------

/// Inner join of the points sheet against the coordinates sheet.
///
/// Only latitude and longitude are taken from the right side. Joined rows
/// with an absent coordinate are dropped. Duplicate ids on the right yield
/// one row per match, in right-side order.
pub fn join(
    points: &RawTable,
    coords: &RawTable,
    point_columns: &PointColumns,
    coord_columns: &CoordColumns,
) -> Result<PointTable, LoadError> {
    let id_col = points.column(&point_columns.id)?;
    let name_col = points.column(&point_columns.name)?;
    let company_col = points.column(&point_columns.company)?;
    let category_col = points.column(&point_columns.category)?;
    let neighborhood_col = points.column(&point_columns.neighborhood)?;
    let address_col = points.column(&point_columns.address)?;

    let coord_id_col = coords.column(&coord_columns.id)?;
    let lat_col = coords.column(&coord_columns.lat)?;
    let lon_col = coords.column(&coord_columns.lon)?;

    let mut by_id: HashMap<i64, Vec<usize>> = HashMap::new();
    for row in 0..coords.rows.len() {
        if let Some(id) = coords.cell(row, coord_id_col).as_id() {
            by_id.entry(id).or_default().push(row);
        }
    }

    let mut records = Vec::new();
    let mut dropped = 0usize;

    for row in 0..points.rows.len() {
        let Some(id) = points.cell(row, id_col).as_id() else {
            continue;
        };
        let Some(matches) = by_id.get(&id) else {
            continue;
        };
        for &coord_row in matches {
            let lat = coords.cell(coord_row, lat_col).as_f64();
            let lon = coords.cell(coord_row, lon_col).as_f64();
            let (Some(lat), Some(lon)) = (lat, lon) else {
                dropped += 1;
                continue;
            };
            records.push(PointRecord {
                id,
                name: points.cell(row, name_col).as_text(),
                company: points.cell(row, company_col).as_text(),
                category: points.cell(row, category_col).as_text(),
                neighborhood: points.cell(row, neighborhood_col).as_text(),
                address: points.cell(row, address_col).as_text(),
                lat,
                lon,
            });
        }
    }

    if dropped > 0 {
        log::debug!("Dropped {dropped} joined rows without latitude/longitude");
    }
    log::info!("Joined table has {} points", records.len());

    let table = PointTable::from_records(records);
    if table.is_empty() {
        log::warn!(
            "No identifiers of {} matched {}",
            points.path().display(),
            coords.path().display()
        );
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

fn read_spreadsheet(path: &Path) -> Result<RawTable, LoadError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| LoadError::parse(path, "spreadsheet", e))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| LoadError::NoWorksheet {
            path: path.to_path_buf(),
        })?
        .map_err(|e| LoadError::parse(path, "spreadsheet", e))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|r| r.iter().map(|c| c.to_string()).collect())
        .unwrap_or_default();

    let rows = rows
        .map(|r| r.iter().map(sheet_cell).collect())
        .collect();

    Ok(RawTable {
        path: path.to_path_buf(),
        headers,
        rows,
    })
}

fn sheet_cell(cell: &SheetCell) -> Cell {
    match cell {
        SheetCell::String(s) => Cell::Text(s.clone()),
        SheetCell::Int(i) => Cell::Integer(*i),
        SheetCell::Float(f) => Cell::Float(*f),
        SheetCell::Bool(b) => Cell::Bool(*b),
        SheetCell::Empty => Cell::Null,
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn read_csv(path: &Path) -> Result<RawTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| LoadError::parse(path, "CSV", e))?;
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| LoadError::parse(path, "CSV", e))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record =
            result.map_err(|e| LoadError::parse(path, "CSV", format!("row {row_no}: {e}")))?;
        rows.push(record.iter().map(csv_cell).collect());
    }

    Ok(RawTable {
        path: path.to_path_buf(),
        headers,
        rows,
    })
}

/// CSV cells stay text; ids and coordinates are parsed on use.
fn csv_cell(s: &str) -> Cell {
    if s.is_empty() {
        Cell::Null
    } else {
        Cell::Text(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "numero": 1, "Nome do Ponto": "Kiosk A", "Empresa": "Acme" },
///   { "numero": 2, "Nome do Ponto": "Kiosk B", "Empresa": null }
/// ]
/// ```
fn read_json(path: &Path) -> Result<RawTable, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue = serde_json::from_str(&text).map_err(|e| LoadError::parse(path, "JSON", e))?;

    let records = root
        .as_array()
        .ok_or_else(|| LoadError::parse(path, "JSON", "expected top-level array"))?;

    let mut headers: Vec<String> = Vec::new();
    let mut seen: BTreeSet<String> = BTreeSet::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::parse(path, "JSON", format!("row {i} is not an object")))?;
        for key in obj.keys() {
            if seen.insert(key.clone()) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_to_cell).unwrap_or(Cell::Null))
                .collect()
        })
        .collect();

    Ok(RawTable {
        path: path.to_path_buf(),
        headers,
        rows,
    })
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::String(s) => Cell::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Cell::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Cell::Float(f)
            } else {
                Cell::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => Cell::Bool(*b),
        JsonValue::Null => Cell::Null,
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet file, as written by `df.to_parquet()` or by the
/// `generate_sample` binary.
fn read_parquet(path: &Path) -> Result<RawTable, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .and_then(|builder| builder.build())
        .map_err(|e| LoadError::parse(path, "Parquet", e))?;

    let headers: Vec<String> = reader
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.map_err(|e| LoadError::parse(path, "Parquet", e))?;
        for row in 0..batch.num_rows() {
            rows.push(
                batch
                    .columns()
                    .iter()
                    .map(|col| extract_cell(col, row))
                    .collect(),
            );
        }
    }

    Ok(RawTable {
        path: path.to_path_buf(),
        headers,
        rows,
    })
}

/// Extract a single value from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> Cell {
    if col.is_null(row) {
        return Cell::Null;
    }
    let cell = match col.data_type() {
        DataType::Utf8 => col
            .as_string_opt::<i32>()
            .map(|s| Cell::Text(s.value(row).to_string())),
        DataType::LargeUtf8 => col
            .as_string_opt::<i64>()
            .map(|s| Cell::Text(s.value(row).to_string())),
        DataType::Int32 => col
            .as_primitive_opt::<Int32Type>()
            .map(|a| Cell::Integer(a.value(row) as i64)),
        DataType::Int64 => col
            .as_primitive_opt::<Int64Type>()
            .map(|a| Cell::Integer(a.value(row))),
        DataType::Float32 => col
            .as_primitive_opt::<Float32Type>()
            .map(|a| Cell::Float(a.value(row) as f64)),
        DataType::Float64 => col
            .as_primitive_opt::<Float64Type>()
            .map(|a| Cell::Float(a.value(row))),
        DataType::Boolean => col.as_boolean_opt().map(|a| Cell::Bool(a.value(row))),
        other => {
            log::warn!("Unsupported Parquet column type {other:?}, reading as null");
            None
        }
    };
    cell.unwrap_or(Cell::Null)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::data::model::Dimension;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn columns() -> (PointColumns, CoordColumns) {
        (PointColumns::default(), CoordColumns::default())
    }

    const POINTS_CSV: &str = "\
numero,Nome do Ponto,Empresa,Categoria,Bairro,Endereço Completo
1,Kiosk A,Acme,Food,Centro,Rua XV 100
2,Kiosk B,Beta,Retail,Centro,Rua XV 200
";

    #[test]
    fn join_keeps_only_matching_ids() {
        let dir = tempfile::tempdir().unwrap();
        let points = write_file(&dir, "points.csv", POINTS_CSV);
        let coords = write_file(&dir, "coords.csv", "enum,lat,lon\n1,-25.43,-49.27\n3,-25.0,-49.0\n");
        let (pc, cc) = columns();

        let table = load_points(&points, &coords, &pc, &cc).unwrap();

        assert_eq!(table.len(), 1);
        let rec = &table.records[0];
        assert_eq!(rec.id, 1);
        assert_eq!(rec.name.as_deref(), Some("Kiosk A"));
        assert_eq!(rec.company.as_deref(), Some("Acme"));
        assert_eq!(rec.address.as_deref(), Some("Rua XV 100"));
        assert_eq!((rec.lat, rec.lon), (-25.43, -49.27));
        assert!(table.distinct(Dimension::Company).contains("Acme"));
        assert!(!table.distinct(Dimension::Company).contains("Beta"));
    }

    #[test]
    fn rows_without_coordinates_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let points = write_file(&dir, "points.csv", POINTS_CSV);
        let coords = write_file(&dir, "coords.csv", "enum,lat,lon\n1,,-49.27\n2,-25.44,-49.28\n");
        let (pc, cc) = columns();

        let table = load_points(&points, &coords, &pc, &cc).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.records[0].id, 2);
        assert!(table.records.iter().all(|r| r.lat.is_finite() && r.lon.is_finite()));
    }

    #[test]
    fn duplicate_right_ids_produce_one_row_per_match() {
        let dir = tempfile::tempdir().unwrap();
        let points = write_file(&dir, "points.csv", POINTS_CSV);
        let coords = write_file(
            &dir,
            "coords.csv",
            "enum,lat,lon\n1,-25.1,-49.1\n1,-25.2,-49.2\n",
        );
        let (pc, cc) = columns();

        let table = load_points(&points, &coords, &pc, &cc).unwrap();

        let lats: Vec<f64> = table.records.iter().map(|r| r.lat).collect();
        assert_eq!(lats, vec![-25.1, -25.2]);
    }

    #[test]
    fn float_ids_join_integer_ids() {
        let dir = tempfile::tempdir().unwrap();
        let points = write_file(&dir, "points.csv", POINTS_CSV);
        let coords = write_file(
            &dir,
            "coords.json",
            r#"[{"enum": 2.0, "lat": -25.5, "lon": -49.3, "extra": "x"}]"#,
        );
        let (pc, cc) = columns();

        let table = load_points(&points, &coords, &pc, &cc).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.records[0].name.as_deref(), Some("Kiosk B"));
    }

    #[test]
    fn disjoint_ids_give_an_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let points = write_file(&dir, "points.csv", POINTS_CSV);
        let coords = write_file(&dir, "coords.csv", "enum,lat,lon\n9,-25.4,-49.2\n");
        let (pc, cc) = columns();

        let table = load_points(&points, &coords, &pc, &cc).unwrap();

        assert!(table.is_empty());
        assert!(table.distinct(Dimension::Category).is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_table(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "points.txt", "a,b\n");
        let err = read_table(&path).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat { ref extension, .. } if extension == "txt"));
    }

    #[test]
    fn missing_id_column_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let points = write_file(&dir, "points.csv", POINTS_CSV);
        let coords = write_file(&dir, "coords.csv", "id,lat,lon\n1,-25.43,-49.27\n");
        let (pc, cc) = columns();

        let err = load_points(&points, &coords, &pc, &cc).unwrap_err();

        match err {
            LoadError::MissingColumn { column, .. } => assert_eq!(column, "enum"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_text_cells_are_absent() {
        let dir = tempfile::tempdir().unwrap();
        let points = write_file(
            &dir,
            "points.csv",
            "numero,Nome do Ponto,Empresa,Categoria,Bairro,Endereço Completo\n5,Solo,,Food,,\n",
        );
        let coords = write_file(&dir, "coords.csv", "enum,lat,lon\n5,-25.4,-49.2\n");
        let (pc, cc) = columns();

        let table = load_points(&points, &coords, &pc, &cc).unwrap();

        let rec = &table.records[0];
        assert_eq!(rec.company, None);
        assert_eq!(rec.neighborhood, None);
        assert!(table.distinct(Dimension::Company).is_empty());
    }

    #[test]
    fn csv_text_columns_keep_their_text() {
        let dir = tempfile::tempdir().unwrap();
        let points = write_file(
            &dir,
            "points.csv",
            "numero,Nome do Ponto,Empresa,Categoria,Bairro,Endereço Completo\n1,007,NaN,1e3,Centro,0800\n",
        );
        let coords = write_file(&dir, "coords.csv", "enum,lat,lon\n01,-25.4,-49.2\n");
        let (pc, cc) = columns();

        let table = load_points(&points, &coords, &pc, &cc).unwrap();

        let rec = &table.records[0];
        assert_eq!(rec.name.as_deref(), Some("007"));
        assert_eq!(rec.company.as_deref(), Some("NaN"));
        assert_eq!(rec.category.as_deref(), Some("1e3"));
        assert_eq!(rec.address.as_deref(), Some("0800"));
        assert!(table.distinct(Dimension::Company).contains("NaN"));
    }

    fn write_parquet(path: &Path, batch: &arrow::record_batch::RecordBatch) {
        let file = std::fs::File::create(path).unwrap();
        let mut writer = parquet::arrow::ArrowWriter::try_new(file, batch.schema(), None).unwrap();
        writer.write(batch).unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn parquet_sources_join_with_nulls_as_absent() {
        use std::sync::Arc;

        use arrow::array::{Float64Array, Int64Array, StringArray};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;

        let dir = tempfile::tempdir().unwrap();
        let text = |values: Vec<Option<&str>>| -> ArrayRef { Arc::new(StringArray::from(values)) };

        let points_schema = Arc::new(Schema::new(vec![
            Field::new("numero", DataType::Int64, false),
            Field::new("Nome do Ponto", DataType::Utf8, true),
            Field::new("Empresa", DataType::Utf8, true),
            Field::new("Categoria", DataType::Utf8, true),
            Field::new("Bairro", DataType::Utf8, true),
            Field::new("Endereço Completo", DataType::Utf8, true),
        ]));
        let points_batch = RecordBatch::try_new(
            points_schema,
            vec![
                Arc::new(Int64Array::from(vec![1, 2, 3])),
                text(vec![Some("Kiosk A"), Some("Kiosk B"), Some("Kiosk C")]),
                text(vec![Some("Acme"), None, Some("Beta")]),
                text(vec![Some("Food"), Some("Retail"), Some("Food")]),
                text(vec![Some("Centro"), Some("Batel"), Some("Centro")]),
                text(vec![None, None, Some("Rua XV 300")]),
            ],
        )
        .unwrap();

        let coords_schema = Arc::new(Schema::new(vec![
            Field::new("enum", DataType::Int64, false),
            Field::new("lat", DataType::Float64, true),
            Field::new("lon", DataType::Float64, true),
        ]));
        let coords_batch = RecordBatch::try_new(
            coords_schema,
            vec![
                Arc::new(Int64Array::from(vec![1, 2, 3])),
                Arc::new(Float64Array::from(vec![Some(-25.43), Some(-25.44), None])),
                Arc::new(Float64Array::from(vec![Some(-49.27), Some(-49.28), Some(-49.29)])),
            ],
        )
        .unwrap();

        let points = dir.path().join("points.parquet");
        let coords = dir.path().join("coords.parquet");
        write_parquet(&points, &points_batch);
        write_parquet(&coords, &coords_batch);
        let (pc, cc) = columns();

        let table = load_points(&points, &coords, &pc, &cc).unwrap();

        let ids: Vec<i64> = table.records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(table.records[0].company.as_deref(), Some("Acme"));
        assert_eq!(table.records[0].address, None);
        assert_eq!(table.records[1].company, None);
        assert_eq!((table.records[1].lat, table.records[1].lon), (-25.44, -49.28));
    }

    #[test]
    fn xlsx_sources_use_first_worksheet() {
        use rust_xlsxwriter::Workbook;

        let dir = tempfile::tempdir().unwrap();
        let points = dir.path().join("Pontos.xlsx");
        let coords = dir.path().join("lat-long.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        let headers = ["numero", "Nome do Ponto", "Empresa", "Categoria", "Bairro", "Endereço Completo"];
        for (col, header) in headers.iter().enumerate() {
            sheet.write_string(0, col as u16, *header).unwrap();
        }
        sheet.write_number(1, 0, 10.0).unwrap();
        sheet.write_string(1, 1, "Kiosk A").unwrap();
        sheet.write_string(1, 2, "Café Expresso").unwrap();
        sheet.write_string(1, 3, "Food").unwrap();
        sheet.write_string(1, 5, "Rua XV 100").unwrap();
        sheet.write_number(2, 0, 11.0).unwrap();
        sheet.write_string(2, 1, "Kiosk B").unwrap();
        workbook.save(&points).unwrap();

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, header) in ["enum", "lat", "lon"].iter().enumerate() {
            sheet.write_string(0, col as u16, *header).unwrap();
        }
        sheet.write_number(1, 0, 10.0).unwrap();
        sheet.write_number(1, 1, -25.43).unwrap();
        sheet.write_number(1, 2, -49.27).unwrap();
        sheet.write_number(2, 0, 11.0).unwrap();
        sheet.write_number(2, 2, -49.28).unwrap();
        workbook.save(&coords).unwrap();
        let (pc, cc) = columns();

        let table = load_points(&points, &coords, &pc, &cc).unwrap();

        assert_eq!(table.len(), 1);
        let rec = &table.records[0];
        assert_eq!(rec.id, 10);
        assert_eq!(rec.company.as_deref(), Some("Café Expresso"));
        assert_eq!(rec.neighborhood, None);
        assert_eq!((rec.lat, rec.lon), (-25.43, -49.27));
    }
}

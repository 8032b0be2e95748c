use crate::data::{Cell, LoadError, Table, LOGIN, PROFIT};
use std::{fs::File, io::ErrorKind, path::Path};

/// Opens `path` and loads it with `read_table`, turning a missing file into
/// `SourceNotFound` so the caller can tell it apart from other I/O trouble.
pub(crate) fn load_table(path: &Path) -> Result<Table, LoadError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => LoadError::SourceNotFound(path.to_path_buf()),
        _ => LoadError::Io(e),
    })?;
    read_table(file)
}

/// Simple CSV importer for the raw trade table. Nothing is filtered or typed here:
/// every field is kept verbatim as text, except empty fields which are `Missing`
/// right away. Whitespace is left alone too, that's the cleaner's job.
///
/// Spreadsheet exports tend to drop trailing empty cells, so a row shorter than the
/// header is padded with `Missing`. A longer one is another story: we can't tell
/// which column the extra fields belong to, so that's a hard error.
pub(crate) fn read_table<R: std::io::Read>(reader: R) -> Result<Table, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let columns: Vec<String> = rdr.headers()?.iter().map(str::to_owned).collect();
    for required in [LOGIN, PROFIT] {
        if !columns.iter().any(|c| c == required) {
            return Err(LoadError::MissingColumn(required));
        }
    }
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.len() > columns.len() {
            return Err(LoadError::TooManyFields {
                line: record.position().map_or(0, |p| p.line()),
                expected: columns.len(),
                found: record.len(),
            });
        }
        let mut row: Vec<Cell> = record
            .iter()
            .map(|field| {
                if field.is_empty() {
                    Cell::Missing
                } else {
                    Cell::text(field)
                }
            })
            .collect();
        row.resize(columns.len(), Cell::Missing);
        rows.push(row);
    }
    Ok(Table { columns, rows })
}

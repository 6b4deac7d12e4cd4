//! `.xlsx` backup workbooks

use std::borrow::Cow;
use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader, Xlsx};
use chrono::NaiveDate;
use rust_xlsxwriter::Workbook;
use tracing::{debug, info};

use obra_core::{ConstructionState, EntityKind};

use crate::{from_sheet, to_sheet, Cell, ExchangeResult, Sheet};

/// `ObraApp_Backup_2024-05-01.xlsx`
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("ObraApp_Backup_{}.xlsx", date.format("%Y-%m-%d"))
}

/// The four sheets of a snapshot, in backup order
pub fn state_to_sheets(state: &ConstructionState) -> Vec<Sheet> {
    vec![
        to_sheet(&state.contractors),
        to_sheet(&state.projects),
        to_sheet(&state.certificates),
        to_sheet(&state.payments),
    ]
}

/// Rebuild a snapshot from whatever sheets are present.
/// Sheets are matched by exact name; absent ones yield empty collections.
pub fn sheets_to_state(sheets: &[Sheet]) -> ExchangeResult<ConstructionState> {
    let find = |kind: EntityKind| sheets.iter().find(|s| s.name == kind.sheet_name());

    let mut state = ConstructionState::new();
    if let Some(sheet) = find(EntityKind::Contractor) {
        state.contractors = from_sheet(sheet)?;
    }
    if let Some(sheet) = find(EntityKind::Project) {
        state.projects = from_sheet(sheet)?;
    }
    if let Some(sheet) = find(EntityKind::Certificate) {
        state.certificates = from_sheet(sheet)?;
    }
    if let Some(sheet) = find(EntityKind::Payment) {
        state.payments = from_sheet(sheet)?;
    }
    Ok(state)
}

fn build_workbook(state: &ConstructionState) -> ExchangeResult<Workbook> {
    let mut workbook = Workbook::new();
    for sheet in state_to_sheets(state) {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.name.as_str())?;

        for (col, header) in sheet.headers.iter().enumerate() {
            worksheet.write_string(0, col as u16, header.as_str())?;
        }
        for (r, cells) in sheet.rows.iter().enumerate() {
            let row = (r + 1) as u32;
            for (col, cell) in cells.iter().enumerate() {
                let col = col as u16;
                match cell {
                    Cell::Empty => {}
                    Cell::Text(s) => {
                        worksheet.write_string(row, col, escape_text(s))?;
                    }
                    Cell::Number(n) => {
                        worksheet.write_number(row, col, *n)?;
                    }
                }
            }
        }
        debug!(sheet = %sheet.name, rows = sheet.rows.len(), "sheet written");
    }
    Ok(workbook)
}

/// Encode a snapshot as `.xlsx` bytes
pub fn export_workbook(state: &ConstructionState) -> ExchangeResult<Vec<u8>> {
    let mut workbook = build_workbook(state)?;
    Ok(workbook.save_to_buffer()?)
}

/// Write a backup workbook to `path`
pub fn export_to_path(state: &ConstructionState, path: impl AsRef<Path>) -> ExchangeResult<()> {
    let bytes = export_workbook(state)?;
    std::fs::write(path.as_ref(), bytes)?;
    info!(
        path = %path.as_ref().display(),
        records = state.total_records(),
        "backup exported"
    );
    Ok(())
}

// ----------------------------------------------------------------------------
// Cell text escapes
//
// Cell XML cannot carry most control characters, so they are stored as
// `_xHHHH_`. A `_` that starts a literal `_x` is itself stored as `_x005F_`
// so every escape decodes unambiguously.
// ----------------------------------------------------------------------------

fn escape_text(s: &str) -> Cow<'_, str> {
    let needs_escape = s.contains("_x") || s.chars().any(is_escaped_control);
    if !needs_escape {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 8);
    for (i, ch) in s.char_indices() {
        if is_escaped_control(ch) {
            out.push_str(&format!("_x{:04X}_", u32::from(ch)));
        } else if ch == '_' && s[i + 1..].starts_with('x') {
            out.push_str("_x005F_");
        } else {
            out.push(ch);
        }
    }
    Cow::Owned(out)
}

fn is_escaped_control(ch: char) -> bool {
    ch.is_ascii_control() && ch != '\t' && ch != '\n' && ch != '\x7F'
}

fn unescape_text(s: &str) -> Cow<'_, str> {
    if !s.contains("_x") {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find("_x") {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match decode_escape(tail) {
            Some(ch) => {
                out.push(ch);
                rest = &tail[7..];
            }
            None => {
                out.push('_');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// `_xHHHH_` at the start of `tail`
fn decode_escape(tail: &str) -> Option<char> {
    let hex = tail.get(2..6)?;
    if tail.as_bytes().get(6) != Some(&b'_') || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    char::from_u32(u32::from_str_radix(hex, 16).ok()?)
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) => Cell::text(unescape_text(s)),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::text(s.as_str()),
        Data::Error(e) => Cell::Text(e.to_string()),
    }
}

/// Read every sheet of an `.xlsx` document
pub fn read_sheets(bytes: &[u8]) -> ExchangeResult<Vec<Sheet>> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let mut sheets = Vec::new();

    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name)?;
        let mut rows = range.rows();
        let headers = rows
            .next()
            .map(|cells| cells.iter().map(|c| cell_from_data(c).to_string()).collect())
            .unwrap_or_default();
        let rows = rows
            .map(|cells| cells.iter().map(cell_from_data).collect())
            .collect();
        sheets.push(Sheet {
            name,
            headers,
            rows,
        });
    }
    Ok(sheets)
}

/// Decode a backup workbook into a snapshot
pub fn import_workbook(bytes: &[u8]) -> ExchangeResult<ConstructionState> {
    let sheets = read_sheets(bytes)?;
    let state = sheets_to_state(&sheets)?;
    debug!(
        sheets = sheets.len(),
        records = state.total_records(),
        "backup decoded"
    );
    Ok(state)
}

/// Read a backup workbook from `path`
pub fn import_from_path(path: impl AsRef<Path>) -> ExchangeResult<ConstructionState> {
    let bytes = std::fs::read(path.as_ref())?;
    let state = import_workbook(&bytes)?;
    info!(
        path = %path.as_ref().display(),
        records = state.total_records(),
        "backup imported"
    );
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use obra_core::{Certificate, Contractor, EntityId, Payment, Project, ProjectStatus, Rating};
    use proptest::prelude::*;

    fn sample_state() -> ConstructionState {
        ConstructionState {
            contractors: vec![Contractor {
                id: EntityId::new("c1"),
                name: "Constructora del Sur".into(),
                tax_id: "30-70000000-1".into(),
                contact: "+54 11 5555-0000".into(),
                specialty: Some("Hidráulica".into()),
                rating: Some(Rating::Score(4.5)),
            }],
            projects: vec![Project {
                id: EntityId::new("p1"),
                name: "Acueducto Norte".into(),
                file_number: "00123".into(),
                budget: 1_250_000.75,
                contractor_id: EntityId::new("c1"),
                start_date: "2024-02-15".into(),
                status: ProjectStatus::Paused,
            }],
            certificates: vec![Certificate {
                id: EntityId::new("ce1"),
                project_id: EntityId::new("p1"),
                period: "Marzo 2024".into(),
                physical_progress: 12.5,
                financial_amount: 156_250.1,
                timestamp: "2024-03-31T12:00:00.000Z".into(),
            }],
            payments: vec![Payment {
                id: EntityId::new("pa1"),
                project_id: EntityId::new("p1"),
                amount: 100_000.0,
                date: "2024-04-05".into(),
                reference: "OP 45/2024".into(),
            }],
        }
    }

    #[test]
    fn test_backup_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(backup_file_name(date), "ObraApp_Backup_2024-05-01.xlsx");
    }

    #[test]
    fn test_xlsx_round_trip() {
        let state = sample_state();
        let bytes = export_workbook(&state).unwrap();
        let back = import_workbook(&bytes).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_sheet_names_in_order() {
        let bytes = export_workbook(&sample_state()).unwrap();
        let names: Vec<_> = read_sheets(&bytes).unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["Contratistas", "Obras", "Certificados", "Pagos"]);
    }

    #[test]
    fn test_round_trip_with_only_some_collections() {
        let mut state = sample_state();
        state.contractors.clear();
        state.certificates.clear();
        let back = import_workbook(&export_workbook(&state).unwrap()).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_missing_sheets_import_empty() {
        let sheets = state_to_sheets(&sample_state())
            .into_iter()
            .filter(|s| s.name == "Pagos")
            .collect::<Vec<_>>();
        let state = sheets_to_state(&sheets).unwrap();

        assert!(state.contractors.is_empty());
        assert!(state.projects.is_empty());
        assert!(state.certificates.is_empty());
        assert_eq!(state.payments.len(), 1);
    }

    #[test]
    fn test_garbage_bytes_fail() {
        assert!(import_workbook(b"definitely not a zip").is_err());
    }

    #[test]
    fn test_export_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.xlsx");
        export_to_path(&sample_state(), &path).unwrap();
        assert_eq!(import_from_path(&path).unwrap(), sample_state());
    }

    #[test]
    fn test_control_characters_survive_round_trip() {
        let mut state = sample_state();
        state.contractors[0].name = "Linea1\r\nLinea2".into();
        state.contractors[0].contact = "tab\there _x000D_ literal".into();
        state.payments[0].reference = "_x000D\r\u{1}".into();

        let back = import_workbook(&export_workbook(&state).unwrap()).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("plain"), "plain");
        assert_eq!(escape_text("a\rb"), "a_x000D_b");
        assert_eq!(escape_text("_x0041_"), "_x005F_x0041_");
        assert_eq!(escape_text("snake_case"), "snake_case");
        assert_eq!(unescape_text("a_x000D_b"), "a\rb");
        assert_eq!(unescape_text("_x005F_x0041_"), "_x0041_");
        assert_eq!(unescape_text("_xZZZZ_ _x12"), "_xZZZZ_ _x12");
    }

    fn text() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 _xñá/.\r\n\t-]{0,16}"
    }

    fn id() -> impl Strategy<Value = EntityId> {
        "[a-z0-9]{9}".prop_map(EntityId::new)
    }

    fn amount() -> impl Strategy<Value = f64> {
        prop_oneof![
            (-10_000_000i64..10_000_000).prop_map(|n| n as f64),
            -1.0e12..1.0e12f64,
        ]
    }

    fn rating() -> impl Strategy<Value = Option<Rating>> {
        prop_oneof![
            Just(None),
            (0.0..10.0f64).prop_map(|s| Some(Rating::Score(s))),
            "[A-Za-z+ ]{0,6}[A-Za-z+]".prop_map(|l| Some(Rating::Label(l))),
        ]
    }

    fn contractor() -> impl Strategy<Value = Contractor> {
        (id(), text(), text(), text(), proptest::option::of("[a-zA-Z_\r ]{0,8}[a-z]"), rating())
            .prop_map(|(id, name, tax_id, contact, specialty, rating)| Contractor {
                id,
                name,
                tax_id,
                contact,
                specialty,
                rating,
            })
    }

    fn project() -> impl Strategy<Value = Project> {
        let status = prop_oneof![
            Just(ProjectStatus::Active),
            Just(ProjectStatus::Paused),
            Just(ProjectStatus::Completed),
        ];
        (id(), text(), text(), amount(), id(), text(), status).prop_map(
            |(id, name, file_number, budget, contractor_id, start_date, status)| Project {
                id,
                name,
                file_number,
                budget,
                contractor_id,
                start_date,
                status,
            },
        )
    }

    fn certificate() -> impl Strategy<Value = Certificate> {
        (id(), id(), text(), -100.0..200.0f64, amount(), text()).prop_map(
            |(id, project_id, period, physical_progress, financial_amount, timestamp)| {
                Certificate {
                    id,
                    project_id,
                    period,
                    physical_progress,
                    financial_amount,
                    timestamp,
                }
            },
        )
    }

    fn payment() -> impl Strategy<Value = Payment> {
        (id(), id(), amount(), text(), text()).prop_map(
            |(id, project_id, amount, date, reference)| Payment {
                id,
                project_id,
                amount,
                date,
                reference,
            },
        )
    }

    fn state() -> impl Strategy<Value = ConstructionState> {
        use proptest::collection::vec;
        (
            vec(contractor(), 0..4),
            vec(project(), 0..4),
            vec(certificate(), 0..4),
            vec(payment(), 0..4),
        )
            .prop_map(|(contractors, projects, certificates, payments)| ConstructionState {
                contractors,
                projects,
                certificates,
                payments,
            })
            .prop_filter("non-empty snapshot", |s| !s.is_empty())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_workbook_round_trip(state in state()) {
            let bytes = export_workbook(&state).unwrap();
            let back = import_workbook(&bytes).unwrap();
            prop_assert_eq!(back, state);
        }
    }
}

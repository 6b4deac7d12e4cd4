//! Row layout of each entity kind

use obra_core::{Certificate, Contractor, EntityKind, Payment, Project, ProjectStatus, Rating};

use crate::{Cell, ExchangeResult, RowReader, SheetRecord};

impl SheetRecord for Contractor {
    const KIND: EntityKind = EntityKind::Contractor;
    const HEADERS: &'static [&'static str] =
        &["id", "name", "taxId", "contact", "specialty", "rating"];

    fn to_cells(&self) -> Vec<Cell> {
        vec![
            Cell::text(self.id.as_str()),
            Cell::text(&self.name),
            Cell::text(&self.tax_id),
            Cell::text(&self.contact),
            self.specialty.as_deref().map(Cell::text).unwrap_or_default(),
            match &self.rating {
                Some(Rating::Score(score)) => Cell::Number(*score),
                Some(Rating::Label(label)) => Cell::text(label),
                None => Cell::Empty,
            },
        ]
    }

    fn from_row(row: &RowReader<'_>) -> ExchangeResult<Self> {
        let rating = match row.raw("rating") {
            Cell::Empty => None,
            Cell::Number(n) => Some(Rating::Score(*n)),
            Cell::Text(s) => Some(Rating::Label(s.clone())),
        };
        Ok(Contractor {
            id: row.id("id"),
            name: row.text("name"),
            tax_id: row.text("taxId"),
            contact: row.text("contact"),
            specialty: row.optional_text("specialty"),
            rating,
        })
    }
}

impl SheetRecord for Project {
    const KIND: EntityKind = EntityKind::Project;
    const HEADERS: &'static [&'static str] = &[
        "id",
        "name",
        "fileNumber",
        "budget",
        "contractorId",
        "startDate",
        "status",
    ];

    fn to_cells(&self) -> Vec<Cell> {
        vec![
            Cell::text(self.id.as_str()),
            Cell::text(&self.name),
            Cell::text(&self.file_number),
            Cell::Number(self.budget),
            Cell::text(self.contractor_id.as_str()),
            Cell::text(&self.start_date),
            Cell::text(self.status.as_str()),
        ]
    }

    fn from_row(row: &RowReader<'_>) -> ExchangeResult<Self> {
        let status = match row.optional_text("status") {
            None => ProjectStatus::default(),
            Some(raw) => raw
                .parse::<ProjectStatus>()
                .map_err(|_| row.invalid("status", raw))?,
        };
        Ok(Project {
            id: row.id("id"),
            name: row.text("name"),
            file_number: row.text("fileNumber"),
            budget: row.number("budget")?,
            contractor_id: row.id("contractorId"),
            start_date: row.text("startDate"),
            status,
        })
    }
}

impl SheetRecord for Certificate {
    const KIND: EntityKind = EntityKind::Certificate;
    const HEADERS: &'static [&'static str] = &[
        "id",
        "projectId",
        "period",
        "physicalProgress",
        "financialAmount",
        "timestamp",
    ];

    fn to_cells(&self) -> Vec<Cell> {
        vec![
            Cell::text(self.id.as_str()),
            Cell::text(self.project_id.as_str()),
            Cell::text(&self.period),
            Cell::Number(self.physical_progress),
            Cell::Number(self.financial_amount),
            Cell::text(&self.timestamp),
        ]
    }

    fn from_row(row: &RowReader<'_>) -> ExchangeResult<Self> {
        Ok(Certificate {
            id: row.id("id"),
            project_id: row.id("projectId"),
            period: row.text("period"),
            physical_progress: row.number("physicalProgress")?,
            financial_amount: row.number("financialAmount")?,
            timestamp: row.text("timestamp"),
        })
    }
}

impl SheetRecord for Payment {
    const KIND: EntityKind = EntityKind::Payment;
    const HEADERS: &'static [&'static str] = &["id", "projectId", "amount", "date", "reference"];

    fn to_cells(&self) -> Vec<Cell> {
        vec![
            Cell::text(self.id.as_str()),
            Cell::text(self.project_id.as_str()),
            Cell::Number(self.amount),
            Cell::text(&self.date),
            Cell::text(&self.reference),
        ]
    }

    fn from_row(row: &RowReader<'_>) -> ExchangeResult<Self> {
        Ok(Payment {
            id: row.id("id"),
            project_id: row.id("projectId"),
            amount: row.number("amount")?,
            date: row.text("date"),
            reference: row.text("reference"),
        })
    }
}

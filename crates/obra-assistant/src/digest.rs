//! Plain-text digest of the current state and the prompt built around it

use obra_core::{Certificate, ConstructionState, Payment, Project};

/// Auditing instruction sent with every question
pub const SYSTEM_INSTRUCTION: &str = "Eres un Experto en Auditoría de Obra Pública. \
Tu misión es analizar los datos que te provee el usuario.
Debes enfocarte en:
1. Desvíos: Si el avance físico es menor al esperado según el monto certificado.
2. Deuda: Alertar sobre saldos impagos críticos.
3. Plazos: Evaluar si el ritmo de certificación es coherente con el presupuesto total.
Responde en español, con tono técnico pero claro, usando Markdown.";

fn project_entry(p: &Project) -> String {
    format!("[{}, EXP: {}, Presupuesto: ${}]", p.name, p.file_number, p.budget)
}

fn certificate_entry(c: &Certificate) -> String {
    format!(
        "[ObraID: {}, Avance Físico: {}%, Avance Financiero: ${}]",
        c.project_id, c.physical_progress, c.financial_amount
    )
}

fn payment_entry(p: &Payment) -> String {
    format!("[ObraID: {}, Monto: ${}]", p.project_id, p.amount)
}

fn join<T>(items: &[T], entry: fn(&T) -> String) -> String {
    items.iter().map(entry).collect::<Vec<_>>().join(", ")
}

/// Three lines: projects, certificates and payments. Amounts are raw
/// numbers, not display-formatted.
pub fn state_digest(state: &ConstructionState) -> String {
    format!(
        "PROYECTOS: {}\nCERTIFICADOS: {}\nPAGOS: {}",
        join(&state.projects, project_entry),
        join(&state.certificates, certificate_entry),
        join(&state.payments, payment_entry),
    )
}

/// User turn sent to the model
pub fn build_prompt(digest: &str, question: &str) -> String {
    format!("CONTEXTO DE DATOS:\n{digest}\n\nPREGUNTA USUARIO: {question}")
}

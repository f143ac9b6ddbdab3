//! Generated documents: request protocols, completion reports, CSV exports
//!
//! Generation and download are two separate steps. Generating stores the
//! rendered bytes and returns a document id; the client then fetches the
//! bytes by id.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::ServiceRequest;
use shared::resolver::{ResolvedRequest, PLACEHOLDER};

/// Document service for protocols, reports, and exports
#[derive(Clone)]
pub struct DocumentService {
    db: PgPool,
}

/// Kind of generated document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Protocol,
    Report,
    CsvExport,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Protocol => "protocol",
            DocumentKind::Report => "report",
            DocumentKind::CsvExport => "csv_export",
        }
    }
}

/// Reference to a stored document
#[derive(Debug, Serialize)]
pub struct DocumentRef {
    pub id: Uuid,
    pub request_id: Uuid,
    pub kind: String,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
}

/// A stored document with its bytes
#[derive(Debug)]
pub struct DocumentContent {
    pub request_id: Uuid,
    pub kind: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    id: Uuid,
    request_id: Uuid,
    kind: String,
    content_type: String,
    created_at: DateTime<Utc>,
}

impl From<DocumentRow> for DocumentRef {
    fn from(row: DocumentRow) -> Self {
        DocumentRef {
            id: row.id,
            request_id: row.request_id,
            kind: row.kind,
            content_type: row.content_type,
            created_at: row.created_at,
        }
    }
}

impl DocumentService {
    /// Create a new DocumentService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Render and store the submission protocol for a request
    pub async fn generate_protocol(
        &self,
        request: &ServiceRequest,
        resolved: &ResolvedRequest,
    ) -> AppResult<DocumentRef> {
        let body = render_protocol(request, resolved);
        self.store(
            request.id,
            DocumentKind::Protocol,
            "text/plain; charset=utf-8",
            body.into_bytes(),
        )
        .await
    }

    /// Render and store the completion report for a concluded request
    pub async fn generate_report(
        &self,
        request: &ServiceRequest,
        resolved: &ResolvedRequest,
    ) -> AppResult<DocumentRef> {
        if request.completion_report.is_none() {
            return Err(AppError::Validation {
                field: "completion_report".to_string(),
                message: "Request has no completion report yet".to_string(),
                message_pt: "A solicitação ainda não possui relatório de conclusão".to_string(),
            });
        }
        let body = render_report(request, resolved);
        self.store(
            request.id,
            DocumentKind::Report,
            "text/plain; charset=utf-8",
            body.into_bytes(),
        )
        .await
    }

    /// Export a set of resolved requests as CSV and store the result
    pub async fn export_csv(&self, resolved: &[ResolvedRequest]) -> AppResult<DocumentRef> {
        let content = render_csv(resolved)
            .map_err(|e| AppError::Internal(format!("CSV rendering failed: {}", e)))?;

        // Exports cover many requests; anchor the row on the nil id
        self.store(Uuid::nil(), DocumentKind::CsvExport, "text/csv", content)
            .await
    }

    /// Fetch a stored document's bytes
    pub async fn get_document(&self, id: Uuid) -> AppResult<DocumentContent> {
        let row = sqlx::query_as::<_, (Uuid, String, String, Vec<u8>)>(
            "SELECT request_id, kind, content_type, content FROM documents WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Document".to_string()))?;

        Ok(DocumentContent {
            request_id: row.0,
            kind: row.1,
            content_type: row.2,
            content: row.3,
        })
    }

    /// List the documents generated for a request
    pub async fn get_request_documents(&self, request_id: Uuid) -> AppResult<Vec<DocumentRef>> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, request_id, kind, content_type, created_at
            FROM documents
            WHERE request_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(request_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(DocumentRef::from).collect())
    }

    async fn store(
        &self,
        request_id: Uuid,
        kind: DocumentKind,
        content_type: &str,
        content: Vec<u8>,
    ) -> AppResult<DocumentRef> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            INSERT INTO documents (request_id, kind, content_type, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, request_id, kind, content_type, created_at
            "#,
        )
        .bind(request_id)
        .bind(kind.as_str())
        .bind(content_type)
        .bind(&content)
        .fetch_one(&self.db)
        .await?;

        Ok(DocumentRef::from(row))
    }
}

fn render_protocol(request: &ServiceRequest, resolved: &ResolvedRequest) -> String {
    let mut out = String::new();
    out.push_str("PROTOCOLO DE SOLICITAÇÃO DE SERVIÇO\n");
    out.push_str("====================================\n\n");
    out.push_str(&format!("Protocolo: {}\n", request.id));
    out.push_str(&format!("Data de envio: {}\n", request.submission_date));
    out.push_str(&format!("Agricultor: {}\n", resolved.farmer_name));
    out.push_str(&format!("Propriedade: {}\n", resolved.property_name));
    out.push_str(&format!("Serviço: {}\n", resolved.service_name));
    out.push_str(&format!("Situação: {}\n", request.status));
    if let Some(ref note) = request.note {
        out.push_str(&format!("\nObservações:\n{}\n", note));
    }
    out
}

fn render_report(request: &ServiceRequest, resolved: &ResolvedRequest) -> String {
    let execution = request
        .execution_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string());
    let report = request.completion_report.as_deref().unwrap_or(PLACEHOLDER);

    let mut out = String::new();
    out.push_str("RELATÓRIO DE CONCLUSÃO DE SERVIÇO\n");
    out.push_str("==================================\n\n");
    out.push_str(&format!("Protocolo: {}\n", request.id));
    out.push_str(&format!("Agricultor: {}\n", resolved.farmer_name));
    out.push_str(&format!("Propriedade: {}\n", resolved.property_name));
    out.push_str(&format!("Serviço: {}\n", resolved.service_name));
    out.push_str(&format!(
        "Responsável: {}\n",
        resolved.assignee_name.as_deref().unwrap_or(PLACEHOLDER)
    ));
    out.push_str(&format!("Data de execução: {}\n", execution));
    out.push_str(&format!("\nRelatório:\n{}\n", report));
    out
}

fn render_csv(resolved: &[ResolvedRequest]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "id",
        "agricultor",
        "propriedade",
        "servico",
        "veiculo",
        "responsavel",
        "situacao",
        "data_envio",
        "data_execucao",
    ])?;

    for row in resolved {
        writer.write_record([
            row.id.to_string(),
            row.farmer_name.clone(),
            row.property_name.clone(),
            row.service_name.clone(),
            row.vehicle_name.clone().unwrap_or_default(),
            row.assignee_name.clone().unwrap_or_default(),
            row.status.to_string(),
            row.submission_date.to_string(),
            row.execution_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(std::io::Error::new(std::io::ErrorKind::Other, e)))
}

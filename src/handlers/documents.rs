// src/handlers/documents.rs

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::{common::error::AppError, config::AppState};

// GET /api/despachos/{id}/pdf
#[utoipa::path(
    get,
    path = "/api/despachos/{id}/pdf",
    tag = "Despachos",
    params(("id" = i32, Path, description = "ID do despacho")),
    responses(
        (status = 200, description = "Folha de despacho em PDF (application/pdf)")
    )
)]
pub async fn dispatch_sheet_pdf(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let pdf_bytes = app_state.document_service.dispatch_sheet(id).await?;

    // O navegador abre direto na visualização de impressão
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (header::CONTENT_DISPOSITION, format!("inline; filename=\"despacho_{}.pdf\"", id)),
    ];

    Ok((headers, pdf_bytes).into_response())
}

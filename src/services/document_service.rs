// src/services/document_service.rs

use std::path::{Path, PathBuf};

use genpdf::{elements, style, Element};
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    models::dispatch::{DispatchDetail, DispatchWithDetails},
    services::dispatch_service::DispatchService,
};

const FONT_FAMILY: &str = "Roboto";

#[derive(Clone)]
pub struct DocumentService {
    dispatches: DispatchService,
    fonts_dir: PathBuf,
}

impl DocumentService {
    pub fn new(dispatches: DispatchService, fonts_dir: PathBuf) -> Self {
        Self { dispatches, fonts_dir }
    }

    /// Folha de despacho imprimível (cabeçalho + tabela por categoria).
    pub async fn dispatch_sheet(&self, id: i32) -> Result<Vec<u8>, AppError> {
        let despacho = self.dispatches.get(id).await?;
        let fonts_dir = self.fonts_dir.clone();

        // A renderização é síncrona e pesada
        tokio::task::spawn_blocking(move || render_dispatch_sheet(&fonts_dir, &despacho))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de renderização: {}", e))?
    }
}

fn pdf_err(e: genpdf::error::Error) -> AppError {
    AppError::PdfError(e.to_string())
}

fn render_dispatch_sheet(fonts_dir: &Path, despacho: &DispatchWithDetails) -> Result<Vec<u8>, AppError> {
    let font_family = genpdf::fonts::from_files(fonts_dir, FONT_FAMILY, None).map_err(|e| {
        AppError::PdfError(format!("Fonte {} não encontrada em {}: {}", FONT_FAMILY, fonts_dir.display(), e))
    })?;

    let header = &despacho.header;
    let mut doc = genpdf::Document::new(font_family);
    doc.set_title(format!("Despacho #{}", header.id));
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);

    // --- CABEÇALHO ---
    doc.push(
        elements::Paragraph::new(format!("Detalles del Despacho #{}", header.id))
            .styled(style::Style::new().bold().with_font_size(16)),
    );
    doc.push(elements::Break::new(1));
    doc.push(elements::Paragraph::new(format!("Fecha: {}", header.fecha.format("%d/%m/%Y"))));
    doc.push(elements::Paragraph::new(format!("Ruta: {} ({})", header.ruta_nombre, header.ruta_tipo)));
    doc.push(elements::Paragraph::new(format!("Usuario: {}", header.usuario_nombre)));
    doc.push(elements::Paragraph::new(format!("Estado: {}", header.estado.label())));
    doc.push(
        elements::Paragraph::new(format!("Total Venta: ${:.2}", sheet_total(&despacho.detalles)))
            .styled(style::Style::new().bold()),
    );
    doc.push(elements::Break::new(1.5));

    // --- UMA TABELA POR CATEGORIA ---
    let bold = style::Style::new().bold();
    for group in despacho.detalles.chunk_by(|a, b| a.categoria_id == b.categoria_id) {
        doc.push(elements::Paragraph::new(group[0].categoria_nombre.clone()).styled(bold.with_font_size(12)));

        // Produto (3), Medida (2), Preço (2), quantidades (1 cada), Valor (2)
        let mut table = elements::TableLayout::new(vec![3, 2, 2, 1, 1, 1, 1, 2]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let mut head = table.row();
        for title in ["Producto", "Medida", "Precio", "Salida", "Recarga", "Retorno", "Vendido", "Valor ($)"] {
            head.push_element(elements::Paragraph::new(title).styled(bold));
        }
        head.push().map_err(pdf_err)?;

        for d in group {
            table
                .row()
                .element(elements::Paragraph::new(d.producto_nombre.clone()))
                .element(elements::Paragraph::new(d.medida.clone()))
                .element(elements::Paragraph::new(format!("${:.2}", d.precio_unitario)))
                .element(elements::Paragraph::new(d.salida_manana.to_string()))
                .element(elements::Paragraph::new(d.recarga_mediodia.to_string()))
                .element(elements::Paragraph::new(d.retorno_tarde.to_string()))
                .element(elements::Paragraph::new(d.total_vendido.to_string()))
                .element(elements::Paragraph::new(format!("${:.2}", d.valor_venta)))
                .push()
                .map_err(pdf_err)?;
        }

        doc.push(table);
        doc.push(elements::Break::new(1));
    }

    let mut buffer = Vec::new();
    doc.render(&mut buffer).map_err(pdf_err)?;
    Ok(buffer)
}

fn sheet_total(detalles: &[DispatchDetail]) -> Decimal {
    detalles.iter().map(|d| d.valor_venta).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dispatch::{DispatchHeader, DispatchState};
    use chrono::NaiveDate;

    fn detail(id: i32, categoria_id: i32, valor: Decimal) -> DispatchDetail {
        DispatchDetail {
            id,
            despacho_id: 1,
            producto_id: id,
            producto_nombre: format!("Producto {id}"),
            medida: "Fardo".into(),
            categoria_id,
            categoria_nombre: format!("Categoría {categoria_id}"),
            precio_unitario: valor,
            salida_manana: 1,
            recarga_mediodia: 0,
            retorno_tarde: 0,
            total_vendido: 1,
            valor_venta: valor,
        }
    }

    #[test]
    fn total_is_sum_of_sale_values() {
        let detalles = vec![detail(1, 1, Decimal::new(150, 2)), detail(2, 2, Decimal::new(225, 2))];
        assert_eq!(sheet_total(&detalles), Decimal::new(375, 2));
        assert_eq!(sheet_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn missing_fonts_are_a_pdf_error() {
        let despacho = DispatchWithDetails {
            header: DispatchHeader {
                id: 1,
                fecha: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
                estado: DispatchState::Completado,
                usuario_id: 5,
                usuario_nombre: "Ana".into(),
                ruta_id: 1,
                ruta_nombre: "Ruta Centro".into(),
                ruta_tipo: "GRUPO AJE".into(),
            },
            detalles: vec![detail(1, 1, Decimal::ONE)],
        };

        let err = render_dispatch_sheet(Path::new("/caminho/que/nao/existe"), &despacho).unwrap_err();
        assert!(matches!(err, AppError::PdfError(_)));
        assert_eq!(err.public_message(), "No se pudo generar el documento");
    }
}

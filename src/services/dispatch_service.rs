// src/services/dispatch_service.rs

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{DispatchRepository, PgDispatchStore},
    models::dispatch::{
        DetailQuantities, Dispatch, DispatchOutcome, DispatchRequest, DispatchState, DispatchSummary,
        DispatchWithDetails, QuantityField,
    },
};

pub const INCOMPLETE_DATA: &str = "Datos incompletos o inválidos";

/// Operações de persistência que a máquina de estados precisa.
///
/// Em produção é implementada sobre a transação aberta pelo serviço
/// (`PgDispatchStore`); nos testes, sobre um mapa em memória.
#[async_trait]
pub trait DispatchStore: Send {
    /// Busca o despacho da chave (rota, data, usuário), travando a linha.
    async fn find_for_update(
        &mut self,
        ruta_id: i32,
        fecha: NaiveDate,
        usuario_id: i32,
    ) -> Result<Option<Dispatch>, AppError>;

    async fn insert_dispatch(
        &mut self,
        fecha: NaiveDate,
        ruta_id: i32,
        usuario_id: i32,
        estado: DispatchState,
    ) -> Result<i32, AppError>;

    async fn update_state(&mut self, id: i32, estado: DispatchState) -> Result<(), AppError>;

    async fn product_price(&mut self, producto_id: i32) -> Result<Option<Decimal>, AppError>;

    async fn insert_detail(
        &mut self,
        despacho_id: i32,
        producto_id: i32,
        precio_unitario: Decimal,
        salida_manana: i32,
    ) -> Result<(), AppError>;

    async fn find_detail(
        &mut self,
        despacho_id: i32,
        producto_id: i32,
    ) -> Result<Option<DetailQuantities>, AppError>;

    async fn set_quantity(&mut self, detail_id: i32, field: QuantityField, value: i32) -> Result<(), AppError>;
}

#[derive(Debug, Clone, Copy)]
struct DispatchKey {
    fecha: NaiveDate,
    ruta_id: i32,
    usuario_id: i32,
}

fn validate_request(req: &DispatchRequest) -> Result<DispatchKey, AppError> {
    let (Some(fecha), Some(ruta_id), Some(usuario_id)) = (req.fecha, req.ruta_id, req.usuario_id) else {
        return Err(AppError::invalid(INCOMPLETE_DATA));
    };
    if ruta_id <= 0 || usuario_id <= 0 || req.productos.is_empty() {
        return Err(AppError::invalid(INCOMPLETE_DATA));
    }

    let mut seen = HashSet::new();
    for p in &req.productos {
        if p.producto_id <= 0 {
            return Err(AppError::invalid(INCOMPLETE_DATA));
        }
        if p.salida_manana < 0 || p.recarga_mediodia < 0 || p.retorno_tarde < 0 {
            return Err(AppError::invalid("Las cantidades no pueden ser negativas"));
        }
        if !seen.insert(p.producto_id) {
            return Err(AppError::invalid("Un producto no puede repetirse en el mismo despacho"));
        }
    }

    Ok(DispatchKey { fecha, ruta_id, usuario_id })
}

/// Registra um checkpoint: cria o despacho do dia ou o avança.
///
/// Todas as regras são checadas antes da primeira escrita; ainda assim o
/// chamador deve rodar isto dentro de uma transação.
pub async fn apply_dispatch<S>(store: &mut S, req: &DispatchRequest) -> Result<DispatchOutcome, AppError>
where
    S: DispatchStore + ?Sized,
{
    let key = validate_request(req)?;

    match store.find_for_update(key.ruta_id, key.fecha, key.usuario_id).await? {
        Some(existing) => advance(store, existing, req).await,
        None => create(store, key, req).await,
    }
}

async fn create<S>(store: &mut S, key: DispatchKey, req: &DispatchRequest) -> Result<DispatchOutcome, AppError>
where
    S: DispatchStore + ?Sized,
{
    if req.estado != DispatchState::INITIAL {
        return Err(AppError::business(
            "Para un nuevo despacho, el estado debe ser Salida Mañana",
        ));
    }

    let outgoing: Vec<_> = req.productos.iter().filter(|p| p.salida_manana > 0).collect();
    if outgoing.is_empty() {
        return Err(AppError::invalid("Debe registrar al menos un producto con salida"));
    }

    // Preço vem do catálogo no momento da saída
    let mut priced = Vec::with_capacity(outgoing.len());
    for p in outgoing {
        let price = store
            .product_price(p.producto_id)
            .await?
            .ok_or_else(|| AppError::business(format!("El producto {} no existe", p.producto_id)))?;
        priced.push((p.producto_id, price, p.salida_manana));
    }

    let id = store
        .insert_dispatch(key.fecha, key.ruta_id, key.usuario_id, DispatchState::INITIAL)
        .await?;
    for (producto_id, price, salida) in priced {
        store.insert_detail(id, producto_id, price, salida).await?;
    }

    tracing::info!(despacho_id = id, ruta_id = key.ruta_id, fecha = %key.fecha, "despacho criado");
    Ok(DispatchOutcome { id, created: true, estado: DispatchState::INITIAL })
}

async fn advance<S>(store: &mut S, existing: Dispatch, req: &DispatchRequest) -> Result<DispatchOutcome, AppError>
where
    S: DispatchStore + ?Sized,
{
    let current = existing.estado;
    let target = req.estado;
    if !current.can_transition_to(target) {
        return Err(AppError::business(format!(
            "No se puede cambiar el estado de {} a {}",
            current, target
        )));
    }

    // Só a coluna do novo estado; produtos sem detalhe são ignorados.
    let mut updates = Vec::new();
    if let Some(field) = target.quantity_field() {
        for p in &req.productos {
            let Some(detail) = store.find_detail(existing.id, p.producto_id).await? else {
                tracing::debug!(despacho_id = existing.id, producto_id = p.producto_id, "produto sem detalhe, ignorado");
                continue;
            };
            let value = p.value_for(field);
            if field == QuantityField::Retorno && i64::from(value) > detail.dispatched() {
                return Err(AppError::business("El retorno no puede superar lo despachado"));
            }
            updates.push((detail.id, field, value));
        }
    }

    store.update_state(existing.id, target).await?;
    for (detail_id, field, value) in updates {
        store.set_quantity(detail_id, field, value).await?;
    }

    // Retorno registrado fecha o despacho
    let final_state = if target == DispatchState::RetornoTarde {
        store.update_state(existing.id, DispatchState::TERMINAL).await?;
        DispatchState::TERMINAL
    } else {
        target
    };

    tracing::info!(despacho_id = existing.id, de = %current, para = %final_state, "despacho avançado");
    Ok(DispatchOutcome { id: existing.id, created: false, estado: final_state })
}

#[derive(Clone)]
pub struct DispatchService {
    repo: DispatchRepository,
    pool: PgPool,
}

impl DispatchService {
    pub fn new(repo: DispatchRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn list(&self) -> Result<Vec<DispatchSummary>, AppError> {
        self.repo.list_summaries(&self.pool, None).await
    }

    pub async fn list_by_user(&self, usuario_id: i32) -> Result<Vec<DispatchSummary>, AppError> {
        if usuario_id <= 0 {
            return Err(AppError::invalid("ID de usuario inválido"));
        }
        self.repo.list_summaries(&self.pool, Some(usuario_id)).await
    }

    pub async fn get(&self, id: i32) -> Result<DispatchWithDetails, AppError> {
        if id <= 0 {
            return Err(AppError::invalid("ID de despacho inválido"));
        }
        let header = self
            .repo
            .find_header(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("Despacho no encontrado"))?;
        let detalles = self.repo.list_details(&self.pool, id).await?;
        Ok(DispatchWithDetails { header, detalles })
    }

    /// Roda a máquina de estados numa transação. Qualquer erro faz rollback
    /// (o `Transaction` é descartado sem commit).
    pub async fn record(&self, req: &DispatchRequest) -> Result<DispatchOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        let outcome = {
            let mut store = PgDispatchStore::new(&self.repo, &mut *tx);
            apply_dispatch(&mut store, req).await?
        };

        tx.commit().await?;
        Ok(outcome)
    }
}

// src/handlers/products.rs
//
// Produtos e categorias dividem o mesmo endpoint.

use axum::extract::State;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    common::{
        command::{ActionCommand, ActionSet},
        error::AppError,
        lenient,
        response::ApiResponse,
    },
    config::AppState,
    models::product::{CategoryPayload, ProductPayload},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(tag = "action")]
pub enum ProductCommand {
    /// Com `id` devolve um produto; sem, o catálogo inteiro.
    #[serde(rename = "listar")]
    List {
        #[serde(default, deserialize_with = "lenient::opt_id")]
        id: Option<i32>,
    },

    #[serde(rename = "listarPorCategoria")]
    ListByCategory {
        #[serde(default, deserialize_with = "lenient::opt_id")]
        categoria_id: Option<i32>,
    },

    #[serde(rename = "crear")]
    Create {
        #[serde(flatten)]
        producto: ProductPayload,
    },

    #[serde(rename = "actualizar")]
    Update {
        #[serde(deserialize_with = "lenient::id")]
        id: i32,
        #[serde(flatten)]
        producto: ProductPayload,
    },

    #[serde(rename = "eliminar")]
    Delete {
        #[serde(default, deserialize_with = "lenient::opt_id")]
        id: Option<i32>,
    },

    #[serde(rename = "listarCategorias")]
    ListCategories,

    #[serde(rename = "crearCategoria")]
    CreateCategory {
        #[serde(flatten)]
        categoria: CategoryPayload,
    },

    #[serde(rename = "actualizarCategoria")]
    UpdateCategory {
        #[serde(deserialize_with = "lenient::id")]
        id: i32,
        #[serde(flatten)]
        categoria: CategoryPayload,
    },

    #[serde(rename = "eliminarCategoria")]
    DeleteCategory {
        #[serde(default, deserialize_with = "lenient::opt_id")]
        id: Option<i32>,
    },
}

impl ActionSet for ProductCommand {
    const ACTIONS: &'static [&'static str] = &[
        "listar",
        "listarPorCategoria",
        "crear",
        "actualizar",
        "eliminar",
        "listarCategorias",
        "crearCategoria",
        "actualizarCategoria",
        "eliminarCategoria",
    ];
}

// POST /api/productos
#[utoipa::path(
    post,
    path = "/api/productos",
    tag = "Productos",
    request_body = ProductCommand,
    responses(
        (status = 200, description = "`{ success, mensaje?, productos | producto | categorias | id }`")
    )
)]
pub async fn handle_products(
    State(app_state): State<AppState>,
    ActionCommand(command): ActionCommand<ProductCommand>,
) -> Result<ApiResponse, AppError> {
    let service = &app_state.product_service;

    match command {
        ProductCommand::List { id: Some(id) } => ApiResponse::ok().data("producto", service.get(id).await?),
        ProductCommand::List { id: None } => ApiResponse::ok().data("productos", service.list().await?),

        ProductCommand::ListByCategory { categoria_id } => {
            let productos = service.list_by_category(categoria_id.unwrap_or_default()).await?;
            ApiResponse::ok().data("productos", productos)
        }

        ProductCommand::Create { producto } => {
            let id = service.create(producto).await?;
            Ok(ApiResponse::created(id, "Producto creado correctamente"))
        }

        ProductCommand::Update { id, producto } => {
            service.update(id, producto).await?;
            Ok(ApiResponse::ok().message("Producto actualizado correctamente"))
        }

        ProductCommand::Delete { id } => {
            service.delete(id.unwrap_or_default()).await?;
            Ok(ApiResponse::ok().message("Producto eliminado correctamente"))
        }

        ProductCommand::ListCategories => {
            ApiResponse::ok().data("categorias", service.list_categories().await?)
        }

        ProductCommand::CreateCategory { categoria } => {
            let id = service.create_category(categoria).await?;
            Ok(ApiResponse::created(id, "Categoría creada correctamente"))
        }

        ProductCommand::UpdateCategory { id, categoria } => {
            service.update_category(id, categoria).await?;
            Ok(ApiResponse::ok().message("Categoría actualizada correctamente"))
        }

        ProductCommand::DeleteCategory { id } => {
            service.delete_category(id.unwrap_or_default()).await?;
            Ok(ApiResponse::ok().message("Categoría eliminada correctamente"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::command::parse_command;
    use rust_decimal::Decimal;
    use serde_json::json;

    #[test]
    fn update_reads_id_and_flat_fields() {
        let command: ProductCommand = parse_command(json!({
            "action": "actualizar",
            "id": "12",
            "nombre": "Pepsi 3L",
            "precio": 2.25,
            "medida": "Fardo",
            "categoria_id": "3"
        }))
        .unwrap();

        let ProductCommand::Update { id, producto } = command else {
            panic!("esperava actualizar");
        };
        assert_eq!(id, 12);
        assert_eq!(producto.categoria_id, 3);
        assert_eq!(producto.precio, Decimal::new(225, 2));
    }

    #[test]
    fn list_without_id_means_whole_catalogue() {
        let command: ProductCommand = parse_command(json!({ "action": "listar", "id": "" })).unwrap();
        assert!(matches!(command, ProductCommand::List { id: None }));
    }

    #[test]
    fn create_without_required_fields_is_invalid_input() {
        let err = parse_command::<ProductCommand>(json!({ "action": "crear", "nombre": "X" })).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}

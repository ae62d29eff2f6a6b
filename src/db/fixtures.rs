// src/db/fixtures.rs

//! Linhas mínimas para os testes que rodam contra o Postgres (`#[sqlx::test]`).

use sqlx::PgPool;

pub async fn category(pool: &PgPool, nombre: &str) -> i32 {
    sqlx::query_scalar("INSERT INTO categorias (nombre) VALUES ($1) RETURNING id")
        .bind(nombre)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn product(pool: &PgPool, categoria_id: i32, nombre: &str) -> i32 {
    sqlx::query_scalar(
        "INSERT INTO productos (nombre, precio, medida, categoria_id) VALUES ($1, 1.50, 'Fardo', $2) RETURNING id",
    )
    .bind(nombre)
    .bind(categoria_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn driver(pool: &PgPool, dui: &str, numero_licencia: &str) -> i32 {
    sqlx::query_scalar(
        r#"
        INSERT INTO motoristas (nombre, dui, numero_licencia, tipo_licencia)
        VALUES ('Carlos Martínez', $1, $2, 'pesada')
        RETURNING id
        "#,
    )
    .bind(dui)
    .bind(numero_licencia)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn route(pool: &PgPool, nombre: &str, placa: Option<&str>, motorista_id: Option<i32>) -> i32 {
    sqlx::query_scalar(
        r#"
        INSERT INTO rutas (nombre, tipo, placa_vehiculo, motorista_id)
        VALUES ($1, 'GRUPO AJE', $2, $3)
        RETURNING id
        "#,
    )
    .bind(nombre)
    .bind(placa)
    .bind(motorista_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Usuário comum com um hash qualquer; os testes daqui não fazem login.
pub async fn user(pool: &PgPool, dui: &str) -> i32 {
    sqlx::query_scalar(
        "INSERT INTO usuarios (nombre, dui, password, rol) VALUES ('Ana López', $1, 'x', 'user') RETURNING id",
    )
    .bind(dui)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Despacho de hoje com um detalhe do produto informado.
pub async fn dispatch(pool: &PgPool, ruta_id: i32, usuario_id: i32, producto_id: i32) -> i32 {
    let id: i32 = sqlx::query_scalar(
        "INSERT INTO despachos (fecha, ruta_id, usuario_id) VALUES (CURRENT_DATE, $1, $2) RETURNING id",
    )
    .bind(ruta_id)
    .bind(usuario_id)
    .fetch_one(pool)
    .await
    .unwrap();

    sqlx::query(
        r#"
        INSERT INTO detalles_despacho (despacho_id, producto_id, precio_unitario, salida_manana)
        VALUES ($1, $2, 1.50, 10)
        "#,
    )
    .bind(id)
    .bind(producto_id)
    .execute(pool)
    .await
    .unwrap();
    id
}

/// Despacho completo: categoria, produto, rota e usuário novos.
pub struct Seeded {
    pub categoria_id: i32,
    pub producto_id: i32,
    pub ruta_id: i32,
    pub usuario_id: i32,
    pub despacho_id: i32,
}

pub async fn seeded_dispatch(pool: &PgPool) -> Seeded {
    let categoria_id = category(pool, "Gaseosas").await;
    let producto_id = product(pool, categoria_id, "Coca-Cola 2.5L").await;
    let ruta_id = route(pool, "Ruta Centro", Some("P123-456"), None).await;
    let usuario_id = user(pool, "01234567-8").await;
    let despacho_id = dispatch(pool, ruta_id, usuario_id, producto_id).await;
    Seeded { categoria_id, producto_id, ruta_id, usuario_id, despacho_id }
}

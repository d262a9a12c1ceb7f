// src/clientes/clientes_router.rs

use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use log::error;
use sqlx::{query, query_as, Row};

use super::clientes_structs::{Cliente, NuevoCliente};
use crate::shared::shared_structs::Mensaje;
use crate::AppState;

const COLUMNAS: &str = "id, name, email, phone, tipo_documento, documento";

/// Lista todos los clientes registrados.
#[get("/api/clients")]
pub async fn buscar_clientes(data: web::Data<AppState>) -> impl Responder {
    let consulta = format!("SELECT {} FROM clientes ORDER BY id", COLUMNAS);
    match query_as::<_, Cliente>(&consulta).fetch_all(&data.db_pool).await {
        Ok(clientes) => HttpResponse::Ok().json(clientes),
        Err(e) => {
            error!("Error al buscar clientes: {:?}", e);
            HttpResponse::InternalServerError().json(Mensaje::nuevo("Error al buscar clientes"))
        }
    }
}

/// Busca un cliente por su ID.
#[get("/api/clients/{id}")]
pub async fn buscar_cliente_por_id(
    data: web::Data<AppState>,
    path: web::Path<i32>,
) -> HttpResponse {
    let id = path.into_inner();
    let consulta = format!("SELECT {} FROM clientes WHERE id = $1", COLUMNAS);
    match query_as::<_, Cliente>(&consulta)
        .bind(id)
        .fetch_optional(&data.db_pool)
        .await
    {
        Ok(Some(cliente)) => HttpResponse::Ok().json(cliente),
        Ok(None) => HttpResponse::NotFound().json(Mensaje::nuevo("Cliente no encontrado")),
        Err(e) => {
            error!("Error al buscar cliente {}: {:?}", id, e);
            HttpResponse::InternalServerError().json(Mensaje::nuevo("Error al buscar cliente"))
        }
    }
}

/// Registra un nuevo cliente. Los cinco campos son obligatorios.
#[post("/api/clients")]
pub async fn registrar_cliente(
    data: web::Data<AppState>,
    item: web::Json<NuevoCliente>,
) -> HttpResponse {
    if !item.campos_completos() {
        return HttpResponse::BadRequest().json(Mensaje::nuevo("Faltan campos requeridos"));
    }

    let resultado = query(
        "INSERT INTO clientes (name, email, phone, tipo_documento, documento) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(&item.name)
    .bind(&item.email)
    .bind(&item.phone)
    .bind(&item.tipo_documento)
    .bind(&item.documento)
    .fetch_one(&data.db_pool)
    .await;

    match resultado.and_then(|row| row.try_get::<i32, _>("id")) {
        Ok(id) => {
            let item = item.into_inner();
            HttpResponse::Created().json(Cliente {
                id,
                name: item.name,
                email: item.email,
                phone: item.phone,
                tipo_documento: item.tipo_documento,
                documento: item.documento,
            })
        }
        Err(e) => {
            error!("Error al insertar cliente: {:?}", e);
            HttpResponse::InternalServerError().json(Mensaje::nuevo("Error al insertar cliente"))
        }
    }
}

/// Actualiza un cliente existente con los cinco campos completos.
#[put("/api/clients/{id}")]
pub async fn actualizar_cliente(
    data: web::Data<AppState>,
    path: web::Path<i32>,
    item: web::Json<NuevoCliente>,
) -> HttpResponse {
    let id = path.into_inner();
    if !item.campos_completos() {
        return HttpResponse::BadRequest().json(Mensaje::nuevo("Faltan campos requeridos"));
    }

    let resultado = query(
        "UPDATE clientes SET name = $1, email = $2, phone = $3, tipo_documento = $4, \
         documento = $5 WHERE id = $6",
    )
    .bind(&item.name)
    .bind(&item.email)
    .bind(&item.phone)
    .bind(&item.tipo_documento)
    .bind(&item.documento)
    .bind(id)
    .execute(&data.db_pool)
    .await;

    match resultado {
        Ok(res) if res.rows_affected() > 0 => {
            let item = item.into_inner();
            HttpResponse::Ok().json(Cliente {
                id,
                name: item.name,
                email: item.email,
                phone: item.phone,
                tipo_documento: item.tipo_documento,
                documento: item.documento,
            })
        }
        Ok(_) => HttpResponse::NotFound().json(Mensaje::nuevo("Cliente no encontrado")),
        Err(e) => {
            error!("Error al actualizar cliente {}: {:?}", id, e);
            HttpResponse::InternalServerError().json(Mensaje::nuevo("Error al actualizar cliente"))
        }
    }
}

/// Elimina un cliente. El historial de ventas que lo referencia se conserva.
#[delete("/api/clients/{id}")]
pub async fn eliminar_cliente(data: web::Data<AppState>, path: web::Path<i32>) -> HttpResponse {
    let id = path.into_inner();
    match query("DELETE FROM clientes WHERE id = $1")
        .bind(id)
        .execute(&data.db_pool)
        .await
    {
        Ok(res) if res.rows_affected() > 0 => {
            HttpResponse::Ok().json(Mensaje::nuevo("Cliente eliminado correctamente"))
        }
        Ok(_) => HttpResponse::NotFound().json(Mensaje::nuevo("Cliente no encontrado")),
        Err(e) => {
            error!("Error al eliminar cliente {}: {:?}", id, e);
            HttpResponse::InternalServerError().json(Mensaje::nuevo("Error al eliminar cliente"))
        }
    }
}

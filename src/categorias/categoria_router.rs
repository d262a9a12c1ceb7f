// src/categorias/categoria_router.rs

use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use log::error;
use sqlx::{query, query_as, Row};

use super::categoria_structs::{Categoria, NuevaCategoria};
use crate::shared::shared_structs::Mensaje;
use crate::AppState;

/// Registra una nueva categoría.
#[post("/api/categorias")]
pub async fn registrar_categoria(
    data: web::Data<AppState>,
    item: web::Json<NuevaCategoria>,
) -> HttpResponse {
    if item.categoria.trim().is_empty() {
        return HttpResponse::BadRequest().json(Mensaje::nuevo("Faltan campos requeridos"));
    }

    let resultado = query("INSERT INTO categorias (categoria) VALUES ($1) RETURNING id")
        .bind(&item.categoria)
        .fetch_one(&data.db_pool)
        .await;

    match resultado.and_then(|row| row.try_get::<i32, _>("id")) {
        Ok(id) => HttpResponse::Created().json(Categoria {
            id,
            categoria: item.into_inner().categoria,
        }),
        Err(e) => {
            error!("Error al insertar categoría: {:?}", e);
            HttpResponse::InternalServerError()
                .json(Mensaje::nuevo("Hubo un error al crear la categoría"))
        }
    }
}

/// Lista todas las categorías.
#[get("/api/categorias")]
pub async fn buscar_categorias(data: web::Data<AppState>) -> impl Responder {
    match query_as::<_, Categoria>("SELECT id, categoria FROM categorias ORDER BY id")
        .fetch_all(&data.db_pool)
        .await
    {
        Ok(categorias) => HttpResponse::Ok().json(categorias),
        Err(e) => {
            error!("Error al buscar categorías: {:?}", e);
            HttpResponse::InternalServerError().json(Mensaje::nuevo("Error al buscar categorías"))
        }
    }
}

/// Busca una categoría por su ID.
#[get("/api/categorias/{id}")]
pub async fn buscar_categoria_por_id(
    data: web::Data<AppState>,
    path: web::Path<i32>,
) -> HttpResponse {
    let id = path.into_inner();
    match query_as::<_, Categoria>("SELECT id, categoria FROM categorias WHERE id = $1")
        .bind(id)
        .fetch_optional(&data.db_pool)
        .await
    {
        Ok(Some(categoria)) => HttpResponse::Ok().json(categoria),
        Ok(None) => HttpResponse::NotFound().json(Mensaje::nuevo("Categoría no encontrada")),
        Err(e) => {
            error!("Error al buscar categoría {}: {:?}", id, e);
            HttpResponse::InternalServerError().json(Mensaje::nuevo("Error al buscar categoría"))
        }
    }
}

/// Actualiza una categoría existente.
#[put("/api/categorias/{id}")]
pub async fn actualizar_categoria(
    data: web::Data<AppState>,
    path: web::Path<i32>,
    item: web::Json<NuevaCategoria>,
) -> HttpResponse {
    let id = path.into_inner();
    if item.categoria.trim().is_empty() {
        return HttpResponse::BadRequest().json(Mensaje::nuevo("Faltan campos requeridos"));
    }

    match query("UPDATE categorias SET categoria = $1 WHERE id = $2")
        .bind(&item.categoria)
        .bind(id)
        .execute(&data.db_pool)
        .await
    {
        Ok(res) if res.rows_affected() > 0 => HttpResponse::Ok().json(Categoria {
            id,
            categoria: item.into_inner().categoria,
        }),
        Ok(_) => HttpResponse::NotFound().json(Mensaje::nuevo("Categoría no encontrada")),
        Err(e) => {
            error!("Error al actualizar categoría {}: {:?}", id, e);
            HttpResponse::InternalServerError().json(Mensaje::nuevo("Error al actualizar categoría"))
        }
    }
}

/// Elimina una categoría.
#[delete("/api/categorias/{id}")]
pub async fn eliminar_categoria(data: web::Data<AppState>, path: web::Path<i32>) -> HttpResponse {
    let id = path.into_inner();
    match query("DELETE FROM categorias WHERE id = $1")
        .bind(id)
        .execute(&data.db_pool)
        .await
    {
        Ok(res) if res.rows_affected() > 0 => {
            HttpResponse::Ok().json(Mensaje::nuevo("Categoría eliminada"))
        }
        Ok(_) => HttpResponse::NotFound().json(Mensaje::nuevo("Categoría no encontrada")),
        Err(e) => {
            error!("Error al eliminar categoría {}: {:?}", id, e);
            HttpResponse::InternalServerError().json(Mensaje::nuevo("Error al eliminar categoría"))
        }
    }
}

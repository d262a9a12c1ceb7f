// src/productos/productos_router.rs

use actix_multipart::Multipart;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use log::error;
use sqlx::{query, query_as, Row};

use super::productos_structs::{Producto, COLUMNAS_PRODUCTO};
use crate::shared::shared_structs::Mensaje;
use crate::shared::subida;
use crate::AppState;

/// Lista todos los productos del inventario.
#[get("/api/products")]
pub async fn buscar_productos(data: web::Data<AppState>) -> impl Responder {
    let consulta = format!("SELECT {} FROM productos ORDER BY id", COLUMNAS_PRODUCTO);
    match query_as::<_, Producto>(&consulta).fetch_all(&data.db_pool).await {
        Ok(productos) => HttpResponse::Ok().json(productos),
        Err(e) => {
            error!("Error al buscar productos: {:?}", e);
            HttpResponse::InternalServerError().json(Mensaje::nuevo("Error al buscar productos"))
        }
    }
}

/// Busca un producto por su ID.
#[get("/api/products/{id}")]
pub async fn buscar_producto_por_id(
    data: web::Data<AppState>,
    path: web::Path<i32>,
) -> HttpResponse {
    let id = path.into_inner();
    match producto_por_id(&data, id).await {
        Ok(Some(producto)) => HttpResponse::Ok().json(producto),
        Ok(None) => HttpResponse::NotFound().json(Mensaje::nuevo("Producto no encontrado")),
        Err(e) => {
            error!("Error al buscar producto {}: {:?}", id, e);
            HttpResponse::InternalServerError().json(Mensaje::nuevo("Error al buscar producto"))
        }
    }
}

/// Crea un nuevo producto.
///
/// El cuerpo es multipart: campos de texto `nombre`, `precio`, `descripcion`
/// y `stock` (todos obligatorios) más una parte `imagen` opcional. La imagen
/// se valida por tipo MIME y tamaño antes de tocar la base de datos.
#[post("/api/products")]
pub async fn registrar_producto(data: web::Data<AppState>, payload: Multipart) -> HttpResponse {
    let formulario = match subida::leer_formulario_producto(payload, &data.config).await {
        Ok(f) => f,
        Err(e) => return HttpResponse::BadRequest().json(Mensaje::nuevo(e.to_string())),
    };

    let (nombre, precio, descripcion, stock) = match (
        formulario.nombre,
        formulario.precio,
        formulario.descripcion,
        formulario.stock,
    ) {
        (Some(n), Some(p), Some(d), Some(s)) => (n, p, d, s),
        _ => {
            // La imagen pudo haberse escrito a disco antes de detectar el faltante
            if let Some(imagen) = &formulario.imagen {
                subida::eliminar_imagen(&data.config, imagen);
            }
            return HttpResponse::BadRequest().json(Mensaje::nuevo("Faltan campos requeridos"));
        }
    };

    let resultado = query(
        "INSERT INTO productos (nombre, precio, descripcion, stock, imagen) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(&nombre)
    .bind(&precio)
    .bind(&descripcion)
    .bind(stock)
    .bind(&formulario.imagen)
    .fetch_one(&data.db_pool)
    .await;

    match resultado.and_then(|row| row.try_get::<i32, _>("id")) {
        Ok(id) => HttpResponse::Created().json(Producto {
            id,
            nombre,
            precio,
            descripcion,
            stock,
            imagen: formulario.imagen,
            ventas: 0,
        }),
        Err(e) => {
            error!("Error al insertar producto: {:?}", e);
            if let Some(imagen) = &formulario.imagen {
                subida::eliminar_imagen(&data.config, imagen);
            }
            HttpResponse::InternalServerError().json(Mensaje::nuevo("Error al insertar producto"))
        }
    }
}

/// Actualiza un producto existente. Mismo multipart que el alta, pero todos
/// los campos son opcionales: lo ausente conserva el valor guardado. Una
/// imagen nueva reemplaza a la anterior y borra su archivo.
#[put("/api/products/{id}")]
pub async fn actualizar_producto(
    data: web::Data<AppState>,
    path: web::Path<i32>,
    payload: Multipart,
) -> HttpResponse {
    let id = path.into_inner();

    let formulario = match subida::leer_formulario_producto(payload, &data.config).await {
        Ok(f) => f,
        Err(e) => return HttpResponse::BadRequest().json(Mensaje::nuevo(e.to_string())),
    };

    let actual = match producto_por_id(&data, id).await {
        Ok(Some(p)) => p,
        Ok(None) => {
            if let Some(imagen) = &formulario.imagen {
                subida::eliminar_imagen(&data.config, imagen);
            }
            return HttpResponse::NotFound().json(Mensaje::nuevo("Producto no encontrado"));
        }
        Err(e) => {
            error!("Error al buscar producto {}: {:?}", id, e);
            return HttpResponse::InternalServerError()
                .json(Mensaje::nuevo("Error al actualizar producto"));
        }
    };

    let imagen_anterior = actual.imagen.clone();
    let actualizado = Producto {
        id,
        nombre: formulario.nombre.unwrap_or(actual.nombre),
        precio: formulario.precio.unwrap_or(actual.precio),
        descripcion: formulario.descripcion.unwrap_or(actual.descripcion),
        stock: formulario.stock.unwrap_or(actual.stock),
        imagen: formulario.imagen.or(actual.imagen),
        ventas: actual.ventas,
    };

    let resultado = query(
        "UPDATE productos SET nombre = $1, precio = $2, descripcion = $3, stock = $4, \
         imagen = $5 WHERE id = $6",
    )
    .bind(&actualizado.nombre)
    .bind(&actualizado.precio)
    .bind(&actualizado.descripcion)
    .bind(actualizado.stock)
    .bind(&actualizado.imagen)
    .bind(id)
    .execute(&data.db_pool)
    .await;

    match resultado {
        Ok(_) => {
            // Con imagen nueva guardada, la vieja queda huérfana en disco
            if imagen_cambiada(&actualizado.imagen, &imagen_anterior) {
                if let Some(anterior) = &imagen_anterior {
                    subida::eliminar_imagen(&data.config, anterior);
                }
            }
            HttpResponse::Ok().json(actualizado)
        }
        Err(e) => {
            error!("Error al actualizar producto {}: {:?}", id, e);
            // El UPDATE no se aplicó: la imagen recién subida no la referencia nadie
            if imagen_cambiada(&actualizado.imagen, &imagen_anterior) {
                if let Some(nueva) = &actualizado.imagen {
                    subida::eliminar_imagen(&data.config, nueva);
                }
            }
            HttpResponse::InternalServerError().json(Mensaje::nuevo("Error al actualizar producto"))
        }
    }
}

/// Esta actualización reemplazó la imagen del producto.
fn imagen_cambiada(actual: &Option<String>, anterior: &Option<String>) -> bool {
    actual.is_some() && actual != anterior
}

/// Elimina un producto y, si tenía imagen, borra el archivo del disco.
/// Un archivo que no se pudo borrar no hace fallar la respuesta.
#[delete("/api/products/{id}")]
pub async fn eliminar_producto(data: web::Data<AppState>, path: web::Path<i32>) -> HttpResponse {
    let id = path.into_inner();

    let imagen = match query("SELECT imagen FROM productos WHERE id = $1")
        .bind(id)
        .fetch_optional(&data.db_pool)
        .await
    {
        Ok(Some(row)) => row.try_get::<Option<String>, _>("imagen").unwrap_or(None),
        Ok(None) => {
            return HttpResponse::NotFound().json(Mensaje::nuevo("Producto no encontrado"))
        }
        Err(e) => {
            error!("Error al buscar producto {}: {:?}", id, e);
            return HttpResponse::InternalServerError()
                .json(Mensaje::nuevo("Error al eliminar producto"));
        }
    };

    match query("DELETE FROM productos WHERE id = $1")
        .bind(id)
        .execute(&data.db_pool)
        .await
    {
        Ok(res) if res.rows_affected() > 0 => {
            if let Some(imagen) = &imagen {
                subida::eliminar_imagen(&data.config, imagen);
            }
            HttpResponse::Ok().json(Mensaje::nuevo("Producto eliminado"))
        }
        Ok(_) => HttpResponse::NotFound().json(Mensaje::nuevo("Producto no encontrado")),
        Err(e) => {
            error!("Error al eliminar producto {}: {:?}", id, e);
            HttpResponse::InternalServerError().json(Mensaje::nuevo("Error al eliminar producto"))
        }
    }
}

async fn producto_por_id(data: &AppState, id: i32) -> Result<Option<Producto>, sqlx::Error> {
    let consulta = format!("SELECT {} FROM productos WHERE id = $1", COLUMNAS_PRODUCTO);
    query_as::<_, Producto>(&consulta)
        .bind(id)
        .fetch_optional(&data.db_pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imagen_nueva_sobre_anterior_es_cambio() {
        assert!(imagen_cambiada(&Some("2.png".into()), &Some("1.png".into())));
    }

    #[test]
    fn primera_imagen_es_cambio() {
        assert!(imagen_cambiada(&Some("1.png".into()), &None));
    }

    #[test]
    fn sin_imagen_nueva_no_hay_cambio() {
        // Sin parte `imagen` en el PUT, se conserva la guardada
        assert!(!imagen_cambiada(&Some("1.png".into()), &Some("1.png".into())));
        assert!(!imagen_cambiada(&None, &None));
    }
}

// src/productos/productos_structs.rs

use bigdecimal::BigDecimal;
use serde::Serialize;
use sqlx::FromRow;

/// Producto del inventario.
///
/// `stock` nunca baja de cero: solo lo muta el procesador de ventas (dentro de
/// su transacción) o una edición directa vía PUT. `ventas` acumula las unidades
/// vendidas históricamente. `imagen` es el nombre de archivo bajo la carpeta
/// de subidas, servido en `/uploads/{imagen}`.
#[derive(Serialize, FromRow)]
pub struct Producto {
    pub id: i32,
    pub nombre: String,
    pub precio: BigDecimal,
    pub descripcion: String,
    pub stock: i32,
    pub imagen: Option<String>,
    pub ventas: i32,
}

/// Columnas de producto en el orden de `Producto`, para compartir entre consultas.
pub const COLUMNAS_PRODUCTO: &str = "id, nombre, precio, descripcion, stock, imagen, ventas";

// src/categorias/categoria_structs.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Categoría de productos.
#[derive(Serialize, FromRow)]
pub struct Categoria {
    pub id: i32,
    pub categoria: String,
}

/// Datos de alta o actualización de una categoría.
#[derive(Deserialize)]
pub struct NuevaCategoria {
    pub categoria: String,
}

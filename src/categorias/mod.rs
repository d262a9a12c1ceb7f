// src/categorias/mod.rs

// Structs de categorías
pub mod categoria_structs;
// Rutas CRUD de categorías
pub mod categoria_router;

// src/productos/mod.rs

// Structs del inventario de productos
pub mod productos_structs;
// Rutas CRUD de productos (con imagen adjunta)
pub mod productos_router;

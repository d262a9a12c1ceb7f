// src/clientes/mod.rs

// Structs del directorio de clientes
pub mod clientes_structs;
// Rutas CRUD de clientes
pub mod clientes_router;

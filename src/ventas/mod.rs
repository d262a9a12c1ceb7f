// src/ventas/mod.rs

// Structs de ventas y su taxonomía de errores
pub mod ventas_structs;
// Rutas de ventas: registro transaccional y listado con agregados
pub mod ventas_router;
// Boleta de una venta en PDF
pub mod boleta;

// src/shared/mod.rs

// Structs compartidas entre los módulos de rutas
pub mod shared_structs;
// Lectura de formularios multipart con imagen (productos)
pub mod subida;

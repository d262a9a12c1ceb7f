// src/shared/shared_structs.rs

use serde::Serialize;

/// Cuerpo JSON estándar para respuestas que solo llevan un mensaje,
/// tanto errores (`400`/`404`/`500`) como confirmaciones de borrado.
#[derive(Serialize)]
pub struct Mensaje {
    pub message: String,
}

impl Mensaje {
    pub fn nuevo(message: impl Into<String>) -> Mensaje {
        Mensaje {
            message: message.into(),
        }
    }
}

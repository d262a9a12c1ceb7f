// src/clientes/clientes_structs.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Cliente tal como vive en la base de datos.
/// Los nombres JSON conservan el contrato original del API (camelCase
/// para el tipo de documento).
#[derive(Serialize, FromRow)]
pub struct Cliente {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(rename = "tipoDocumento")]
    pub tipo_documento: String,
    pub documento: String,
}

/// Datos de alta o actualización de un cliente. Todos los campos son
/// obligatorios; la validación de no-vacío la hace la ruta.
#[derive(Deserialize)]
pub struct NuevoCliente {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(rename = "tipoDocumento")]
    pub tipo_documento: String,
    pub documento: String,
}

impl NuevoCliente {
    /// Un cliente no puede crearse con campos en blanco.
    pub fn campos_completos(&self) -> bool {
        ![
            &self.name,
            &self.email,
            &self.phone,
            &self.tipo_documento,
            &self.documento,
        ]
        .iter()
        .any(|campo| campo.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cliente_valido() -> NuevoCliente {
        NuevoCliente {
            name: "María Pérez".into(),
            email: "maria@example.com".into(),
            phone: "987654321".into(),
            tipo_documento: "DNI".into(),
            documento: "12345678".into(),
        }
    }

    #[test]
    fn cliente_completo_pasa_validacion() {
        assert!(cliente_valido().campos_completos());
    }

    #[test]
    fn campo_en_blanco_no_pasa() {
        let mut cliente = cliente_valido();
        cliente.documento = "   ".into();
        assert!(!cliente.campos_completos());
    }
}

// src/config.rs

use std::env;
use std::path::PathBuf;

/// Tipos MIME aceptados para las imágenes de producto.
/// "image/jpg" no es un tipo estándar pero algunos clientes lo envían igual.
pub const MIMES_PERMITIDOS: &[&str] = &["image/jpeg", "image/png", "image/jpg"];

/// Tamaño máximo de una imagen de producto: 5MB.
pub const MAX_IMAGEN_BYTES: usize = 5 * 1024 * 1024;

/// Configuración de la aplicación, leída del entorno al arrancar.
///
/// Variables reconocidas:
/// - `DATABASE_URL` (obligatoria): cadena de conexión a PostgreSQL.
/// - `PORT`: puerto de escucha, por defecto 3000.
/// - `UPLOADS_DIR`: carpeta donde se guardan las imágenes subidas, por defecto `uploads`.
/// - `FONTS_DIR`: carpeta con la familia TTF LiberationSans para las boletas,
///   por defecto `fonts`.
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub puerto: u16,
    pub uploads_dir: PathBuf,
    pub fonts_dir: PathBuf,
    pub max_imagen_bytes: usize,
    pub mimes_permitidos: Vec<String>,
}

impl Config {
    pub fn desde_env() -> Result<Config, String> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| "La variable DATABASE_URL no está definida".to_string())?;

        let puerto = puerto_desde(env::var("PORT").ok())?;

        Ok(Config {
            database_url,
            puerto,
            uploads_dir: PathBuf::from(env::var("UPLOADS_DIR").unwrap_or_else(|_| "uploads".into())),
            fonts_dir: PathBuf::from(env::var("FONTS_DIR").unwrap_or_else(|_| "fonts".into())),
            max_imagen_bytes: MAX_IMAGEN_BYTES,
            mimes_permitidos: MIMES_PERMITIDOS.iter().map(|m| m.to_string()).collect(),
        })
    }

    /// Indica si el tipo MIME declarado para una imagen está en la lista blanca.
    pub fn mime_permitido(&self, mime: &str) -> bool {
        self.mimes_permitidos.iter().any(|m| m == mime)
    }
}

/// Interpreta el valor de `PORT`; ausente usa 3000, inválido es un error de arranque.
fn puerto_desde(valor: Option<String>) -> Result<u16, String> {
    match valor {
        None => Ok(3000),
        Some(v) => v
            .parse::<u16>()
            .map_err(|_| format!("PORT inválido: {}", v)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_de_prueba() -> Config {
        Config {
            database_url: "postgres://localhost/puntoventa".into(),
            puerto: 3000,
            uploads_dir: PathBuf::from("uploads"),
            fonts_dir: PathBuf::from("fonts"),
            max_imagen_bytes: MAX_IMAGEN_BYTES,
            mimes_permitidos: MIMES_PERMITIDOS.iter().map(|m| m.to_string()).collect(),
        }
    }

    #[test]
    fn puerto_por_defecto() {
        assert_eq!(puerto_desde(None), Ok(3000));
    }

    #[test]
    fn puerto_explicito() {
        assert_eq!(puerto_desde(Some("8080".into())), Ok(8080));
    }

    #[test]
    fn puerto_invalido_es_error() {
        assert!(puerto_desde(Some("ochenta".into())).is_err());
    }

    #[test]
    fn mimes_de_imagen() {
        let config = config_de_prueba();
        assert!(config.mime_permitido("image/jpeg"));
        assert!(config.mime_permitido("image/png"));
        assert!(config.mime_permitido("image/jpg"));
        assert!(!config.mime_permitido("application/pdf"));
        assert!(!config.mime_permitido("image/gif"));
    }
}

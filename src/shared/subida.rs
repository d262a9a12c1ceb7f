// src/shared/subida.rs

use actix_multipart::{Field, Multipart};
use bigdecimal::BigDecimal;
use chrono::Utc;
use futures::StreamExt;
use std::error::Error;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use crate::config::Config;

/// Campos de un formulario multipart de producto. Todos opcionales: el POST
/// exige los de texto, el PUT toma los presentes y conserva el resto.
/// `imagen` es el nombre del archivo ya guardado en la carpeta de subidas.
#[derive(Default)]
pub struct FormularioProducto {
    pub nombre: Option<String>,
    pub precio: Option<BigDecimal>,
    pub descripcion: Option<String>,
    pub stock: Option<i32>,
    pub imagen: Option<String>,
}

/// Lee el multipart completo de un producto: campos de texto más una imagen
/// opcional bajo el nombre de parte `imagen`.
///
/// La imagen se valida ANTES de persistir nada de ella: tipo MIME en la lista
/// blanca y tamaño acotado mientras se escribe a disco. Si el límite se excede
/// a mitad de la escritura, el archivo parcial se elimina. Si otra parte falla
/// DESPUÉS de haber guardado la imagen (un `precio` que no parsea, por
/// ejemplo), el archivo ya guardado también se elimina: un formulario
/// rechazado no deja nada en disco.
pub async fn leer_formulario_producto(
    payload: Multipart,
    config: &Config,
) -> Result<FormularioProducto, Box<dyn Error>> {
    let mut formulario = FormularioProducto::default();
    match leer_partes(payload, config, &mut formulario).await {
        Ok(()) => Ok(formulario),
        Err(e) => {
            descartar_imagen_guardada(config, &formulario);
            Err(e)
        }
    }
}

async fn leer_partes(
    mut payload: Multipart,
    config: &Config,
    formulario: &mut FormularioProducto,
) -> Result<(), Box<dyn Error>> {
    while let Some(item) = payload.next().await {
        let mut field = item?;
        let nombre_parte = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        match nombre_parte.as_deref() {
            Some("nombre") => formulario.nombre = Some(leer_texto(&mut field).await?),
            Some("descripcion") => formulario.descripcion = Some(leer_texto(&mut field).await?),
            Some("precio") => {
                let texto = leer_texto(&mut field).await?;
                let precio = BigDecimal::from_str(texto.trim())
                    .map_err(|_| format!("El campo precio es inválido: {}", texto))?;
                formulario.precio = Some(precio);
            }
            Some("stock") => {
                let texto = leer_texto(&mut field).await?;
                let stock = texto
                    .trim()
                    .parse::<i32>()
                    .map_err(|_| format!("El campo stock es inválido: {}", texto))?;
                formulario.stock = Some(stock);
            }
            Some("imagen") => {
                formulario.imagen = Some(guardar_imagen(&mut field, config).await?);
            }
            // Partes desconocidas se ignoran, igual que los campos extra de un JSON
            _ => consumir(&mut field).await?,
        }
    }

    Ok(())
}

/// Borra del disco la imagen de un formulario que terminó rechazado.
fn descartar_imagen_guardada(config: &Config, formulario: &FormularioProducto) {
    if let Some(imagen) = &formulario.imagen {
        eliminar_imagen(config, imagen);
    }
}

/// Acumula el contenido de una parte de texto como UTF-8.
async fn leer_texto(field: &mut Field) -> Result<String, Box<dyn Error>> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        bytes.extend_from_slice(&chunk?);
    }
    Ok(String::from_utf8(bytes)?)
}

/// Descarta el contenido de una parte sin usarlo.
async fn consumir(field: &mut Field) -> Result<(), Box<dyn Error>> {
    while let Some(chunk) = field.next().await {
        chunk?;
    }
    Ok(())
}

/// Valida y guarda la parte `imagen` en la carpeta de subidas.
/// Devuelve el nombre del archivo guardado.
async fn guardar_imagen(field: &mut Field, config: &Config) -> Result<String, Box<dyn Error>> {
    let mime = field
        .content_type()
        .map(|m| m.essence_str().to_string())
        .ok_or("La imagen no declara tipo MIME")?;
    if !config.mime_permitido(&mime) {
        return Err(format!(
            "Tipo de imagen no permitido: {}. Use JPEG o PNG.",
            mime
        )
        .into());
    }

    let original = field
        .content_disposition()
        .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
        .unwrap_or_default();
    let nombre = nombre_archivo_unico(&original, Utc::now().timestamp_millis());
    let destino = config.uploads_dir.join(&nombre);

    let mut archivo = fs::File::create(&destino)?;
    let mut escritos: usize = 0;
    while let Some(chunk) = field.next().await {
        let chunk = match chunk {
            Ok(c) => c,
            Err(e) => {
                let _ = fs::remove_file(&destino);
                return Err(e.into());
            }
        };
        escritos += chunk.len();
        if escritos > config.max_imagen_bytes {
            drop(archivo);
            let _ = fs::remove_file(&destino);
            return Err("La imagen supera el tamaño máximo de 5MB".into());
        }
        if let Err(e) = archivo.write_all(&chunk) {
            let _ = fs::remove_file(&destino);
            return Err(e.into());
        }
    }

    Ok(nombre)
}

/// Elimina del disco la imagen asociada a un producto. Nunca falla hacia el
/// llamador: un archivo que no se pudo borrar solo deja un aviso en el log.
pub fn eliminar_imagen(config: &Config, imagen: &str) {
    let ruta = config.uploads_dir.join(imagen);
    if let Err(e) = fs::remove_file(&ruta) {
        log::warn!("No se pudo eliminar la imagen {:?}: {}", ruta, e);
    }
}

/// Nombre único para un archivo subido: marca de tiempo en milisegundos
/// más la extensión original, como hacía el multer del sistema previo.
fn nombre_archivo_unico(original: &str, marca_ms: i64) -> String {
    match Path::new(original).extension() {
        Some(ext) => format!("{}.{}", marca_ms, ext.to_string_lossy()),
        None => marca_ms.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MAX_IMAGEN_BYTES, MIMES_PERMITIDOS};
    use std::path::PathBuf;

    fn config_en(dir: PathBuf) -> Config {
        Config {
            database_url: "postgres://localhost/puntoventa".into(),
            puerto: 3000,
            uploads_dir: dir,
            fonts_dir: PathBuf::from("fonts"),
            max_imagen_bytes: MAX_IMAGEN_BYTES,
            mimes_permitidos: MIMES_PERMITIDOS.iter().map(|m| m.to_string()).collect(),
        }
    }

    #[test]
    fn formulario_rechazado_no_deja_imagen_en_disco() {
        let config = config_en(std::env::temp_dir());
        let nombre = "descarte-prueba.png";
        let ruta = config.uploads_dir.join(nombre);
        fs::write(&ruta, b"png").unwrap();

        let formulario = FormularioProducto {
            imagen: Some(nombre.into()),
            ..FormularioProducto::default()
        };
        descartar_imagen_guardada(&config, &formulario);
        assert!(!ruta.exists());
    }

    #[test]
    fn descarte_sin_imagen_no_hace_nada() {
        let config = config_en(std::env::temp_dir());
        descartar_imagen_guardada(&config, &FormularioProducto::default());
    }

    #[test]
    fn nombre_unico_conserva_extension() {
        assert_eq!(nombre_archivo_unico("foto.png", 1700000000000), "1700000000000.png");
        assert_eq!(nombre_archivo_unico("a.b.JPG", 42), "42.JPG");
    }

    #[test]
    fn nombre_unico_sin_extension() {
        assert_eq!(nombre_archivo_unico("foto", 42), "42");
        assert_eq!(nombre_archivo_unico("", 42), "42");
    }
}

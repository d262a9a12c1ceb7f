// src/ventas/boleta.rs

use actix_web::{get, web, HttpResponse};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use genpdf::elements::{Break, Paragraph};
use genpdf::style::Style;
use genpdf::{Alignment, Document, Element, SimplePageDecorator};
use log::error;
use sqlx::query_as;
use std::error::Error;
use std::path::Path;

use crate::shared::shared_structs::Mensaje;
use crate::AppState;

#[derive(sqlx::FromRow)]
struct VentaBoleta {
    id: i32,
    cliente_id: i32,
    total: BigDecimal,
    fecha: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct ClienteBoleta {
    name: String,
    email: String,
    phone: String,
    tipo_documento: String,
    documento: String,
}

/// Renglón de la boleta: `precio` es el congelado al vender.
/// `nombre` es nulo si el producto fue eliminado después.
#[derive(sqlx::FromRow)]
struct ItemBoleta {
    nombre: Option<String>,
    cantidad: i32,
    precio: BigDecimal,
}

/// Genera la boleta en PDF de una venta y la sirve inline.
///
/// 404 si la venta no existe. Si el cliente o algún producto referenciado ya
/// no se pueden resolver, o las fuentes TTF no están disponibles, responde
/// 500 sin tocar la base de datos (la boleta es solo lectura).
#[get("/api/ventas/boleta/{id}")]
pub async fn generar_boleta(data: web::Data<AppState>, path: web::Path<i32>) -> HttpResponse {
    let id = path.into_inner();

    let venta = match query_as::<_, VentaBoleta>(
        "SELECT id, cliente_id, total, fecha FROM ventas WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&data.db_pool)
    .await
    {
        Ok(Some(v)) => v,
        Ok(None) => return HttpResponse::NotFound().json(Mensaje::nuevo("Venta no encontrada")),
        Err(e) => {
            error!("Error al buscar la venta {}: {:?}", id, e);
            return HttpResponse::InternalServerError()
                .json(Mensaje::nuevo("Error generando la boleta"));
        }
    };

    let cliente = match query_as::<_, ClienteBoleta>(
        "SELECT name, email, phone, tipo_documento, documento FROM clientes WHERE id = $1",
    )
    .bind(venta.cliente_id)
    .fetch_optional(&data.db_pool)
    .await
    {
        Ok(Some(c)) => c,
        Ok(None) => {
            error!("La venta {} referencia un cliente inexistente", id);
            return HttpResponse::InternalServerError()
                .json(Mensaje::nuevo("Error generando la boleta"));
        }
        Err(e) => {
            error!("Error al buscar el cliente de la venta {}: {:?}", id, e);
            return HttpResponse::InternalServerError()
                .json(Mensaje::nuevo("Error generando la boleta"));
        }
    };

    let items = match query_as::<_, ItemBoleta>(
        "SELECT p.nombre, i.cantidad, i.precio \
         FROM venta_items i LEFT JOIN productos p ON p.id = i.producto_id \
         WHERE i.venta_id = $1 ORDER BY i.id",
    )
    .bind(id)
    .fetch_all(&data.db_pool)
    .await
    {
        Ok(items) => items,
        Err(e) => {
            error!("Error al buscar los renglones de la venta {}: {:?}", id, e);
            return HttpResponse::InternalServerError()
                .json(Mensaje::nuevo("Error generando la boleta"));
        }
    };

    match renderizar_boleta(&venta, &cliente, &items, &data.config.fonts_dir) {
        Ok(bytes) => HttpResponse::Ok()
            .content_type("application/pdf")
            .insert_header(("Content-Disposition", "inline; filename=\"boleta.pdf\""))
            .body(bytes),
        Err(e) => {
            error!("Error generando la boleta {}: {}", id, e);
            HttpResponse::InternalServerError().json(Mensaje::nuevo("Error generando la boleta"))
        }
    }
}

/// Arma el documento de una página y lo renderiza en memoria.
/// Formato puro: el mismo contenido de venta produce el mismo texto.
fn renderizar_boleta(
    venta: &VentaBoleta,
    cliente: &ClienteBoleta,
    items: &[ItemBoleta],
    fonts_dir: &Path,
) -> Result<Vec<u8>, Box<dyn Error>> {
    let fuente = genpdf::fonts::from_files(fonts_dir, "LiberationSans", None)?;
    let mut doc = Document::new(fuente);
    doc.set_title(format!("Boleta de venta {}", venta.id));
    doc.set_font_size(12);

    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(15);
    doc.set_page_decorator(decorator);

    doc.push(
        Paragraph::new("BOLETA DE VENTA")
            .aligned(Alignment::Center)
            .styled(Style::new().bold().with_font_size(20)),
    );
    doc.push(Break::new(1));

    for linea in lineas_cliente(cliente) {
        doc.push(Paragraph::new(linea));
    }
    doc.push(Break::new(1));

    doc.push(Paragraph::new("Productos:").styled(Style::new().bold()));
    for item in items {
        doc.push(Paragraph::new(linea_item(item)?));
    }
    doc.push(Break::new(1));

    doc.push(
        Paragraph::new(linea_total(&venta.total))
            .aligned(Alignment::Right)
            .styled(Style::new().bold().with_font_size(14)),
    );
    doc.push(Paragraph::new(format!(
        "Fecha: {}",
        venta.fecha.format("%d/%m/%Y %H:%M")
    )));
    doc.push(Break::new(1));

    doc.push(Paragraph::new("¡Gracias por su compra!").aligned(Alignment::Center));
    doc.push(
        Paragraph::new("Dirección de tu tienda | Teléfono: 123-456-7890")
            .aligned(Alignment::Center),
    );

    let mut bytes = Vec::new();
    doc.render(&mut bytes)?;
    Ok(bytes)
}

/// Bloque de identidad del cliente, una línea por campo.
fn lineas_cliente(cliente: &ClienteBoleta) -> Vec<String> {
    vec![
        format!("Cliente: {}", cliente.name),
        format!("Email: {}", cliente.email),
        format!("Teléfono: {}", cliente.phone),
        format!("Tipo de Documento: {}", cliente.tipo_documento),
        format!("Número de Documento: {}", cliente.documento),
    ]
}

/// `nombre - S/. precio x cantidad = S/. subtotal`, subtotal a dos decimales.
fn linea_item(item: &ItemBoleta) -> Result<String, Box<dyn Error>> {
    let nombre = item
        .nombre
        .as_deref()
        .ok_or("Producto de la venta no encontrado")?;
    let subtotal = (&item.precio * BigDecimal::from(item.cantidad)).with_scale(2);
    Ok(format!(
        "{} - S/. {} x {} = S/. {}",
        nombre, item.precio, item.cantidad, subtotal
    ))
}

fn linea_total(total: &BigDecimal) -> String {
    format!("Total: S/. {}", total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn item(nombre: &str, precio: &str, cantidad: i32) -> ItemBoleta {
        ItemBoleta {
            nombre: Some(nombre.into()),
            cantidad,
            precio: BigDecimal::from_str(precio).unwrap(),
        }
    }

    #[test]
    fn renglon_con_subtotal_a_dos_decimales() {
        assert_eq!(
            linea_item(&item("Coca Cola", "5.00", 4)).unwrap(),
            "Coca Cola - S/. 5.00 x 4 = S/. 20.00"
        );
        assert_eq!(
            linea_item(&item("Pan", "2.5", 3)).unwrap(),
            "Pan - S/. 2.5 x 3 = S/. 7.50"
        );
    }

    #[test]
    fn renglon_sin_producto_es_error() {
        let item = ItemBoleta {
            nombre: None,
            cantidad: 1,
            precio: BigDecimal::from(1),
        };
        assert!(linea_item(&item).is_err());
    }

    #[test]
    fn renglones_identicos_para_la_misma_venta() {
        let a = linea_item(&item("Leche", "4.20", 2)).unwrap();
        let b = linea_item(&item("Leche", "4.20", 2)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn bloque_del_cliente_en_orden() {
        let cliente = ClienteBoleta {
            name: "María Pérez".into(),
            email: "maria@example.com".into(),
            phone: "987654321".into(),
            tipo_documento: "DNI".into(),
            documento: "12345678".into(),
        };
        let lineas = lineas_cliente(&cliente);
        assert_eq!(lineas[0], "Cliente: María Pérez");
        assert_eq!(lineas[3], "Tipo de Documento: DNI");
        assert_eq!(lineas.len(), 5);
    }

    #[test]
    fn linea_de_total_respeta_lo_guardado() {
        assert_eq!(
            linea_total(&BigDecimal::from_str("20.00").unwrap()),
            "Total: S/. 20.00"
        );
    }
}

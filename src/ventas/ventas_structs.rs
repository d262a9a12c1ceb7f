// src/ventas/ventas_structs.rs

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cuerpo de `POST /api/ventas`.
///
/// `total` lo calcula y envía el llamador: se persiste tal cual, sin
/// recomputarlo del lado del servidor (contrato heredado del API original).
/// `fecha` ausente toma la hora actual.
#[derive(Deserialize)]
pub struct NuevaVenta {
    pub cliente: i32,
    pub productos: Vec<ItemNuevaVenta>,
    pub total: BigDecimal,
    pub fecha: Option<DateTime<Utc>>,
}

/// Renglón pedido dentro de una venta nueva.
#[derive(Deserialize)]
pub struct ItemNuevaVenta {
    pub producto: i32,
    pub cantidad: i32,
}

/// Renglón persistido: referencia al producto, cantidad y el precio unitario
/// congelado al momento de la venta. Si el producto cambia de precio después,
/// el historial no se altera.
#[derive(Serialize, Clone)]
pub struct ItemVenta {
    pub producto: i32,
    pub cantidad: i32,
    pub precio: BigDecimal,
}

/// Venta recién registrada, tal como se responde con 201.
#[derive(Serialize)]
pub struct VentaCreada {
    pub id: i32,
    pub cliente: i32,
    pub productos: Vec<ItemVenta>,
    pub total: BigDecimal,
    pub fecha: DateTime<Utc>,
}

/// Resumen de cliente incrustado en el listado de ventas.
#[derive(Serialize, Clone)]
pub struct ClienteResumen {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(rename = "tipoDocumento")]
    pub tipo_documento: String,
    pub documento: String,
}

/// Resumen de producto incrustado en cada renglón del listado.
#[derive(Serialize, Clone)]
pub struct ProductoResumen {
    pub id: i32,
    pub nombre: String,
    pub precio: BigDecimal,
}

/// Renglón de venta con su producto resuelto para mostrar. `producto` queda
/// en `null` cuando el producto fue eliminado después de la venta.
#[derive(Serialize, Clone)]
pub struct ItemVentaDetalle {
    pub producto: Option<ProductoResumen>,
    pub cantidad: i32,
    pub precio: BigDecimal,
}

/// Venta desnormalizada para el listado. `cliente` queda en `null` si el
/// cliente fue eliminado después de la venta.
#[derive(Serialize)]
pub struct VentaDetalle {
    pub id: i32,
    pub cliente: Option<ClienteResumen>,
    pub productos: Vec<ItemVentaDetalle>,
    pub total: BigDecimal,
    pub fecha: DateTime<Utc>,
}

/// Entrada del ranking de más vendidos.
#[derive(Serialize, PartialEq, Debug)]
pub struct RankingProducto {
    pub nombre: String,
    pub cantidad: i64,
}

/// Respuesta de `GET /api/ventas`.
#[derive(Serialize)]
pub struct ListadoVentas {
    pub ventas: Vec<VentaDetalle>,
    #[serde(rename = "totalVentas")]
    pub total_ventas: BigDecimal,
    #[serde(rename = "productosMasVendidos")]
    pub productos_mas_vendidos: Vec<RankingProducto>,
}

/// Fallos del procesador de ventas. En el router, todos menos `Interno`
/// responden 400; `Interno` responde 500.
#[derive(Debug)]
pub enum ErrorVenta {
    ClienteNoEncontrado,
    ProductoNoEncontrado(i32),
    StockInsuficiente(String),
    VentaVacia,
    CantidadInvalida(i32),
    Interno(sqlx::Error),
}

impl fmt::Display for ErrorVenta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorVenta::ClienteNoEncontrado => write!(f, "Cliente no encontrado"),
            ErrorVenta::ProductoNoEncontrado(id) => {
                write!(f, "Producto con ID {} no encontrado", id)
            }
            ErrorVenta::StockInsuficiente(nombre) => {
                write!(f, "No hay suficiente stock para el producto {}", nombre)
            }
            ErrorVenta::VentaVacia => write!(f, "La venta no contiene productos"),
            ErrorVenta::CantidadInvalida(id) => {
                write!(f, "Cantidad inválida para el producto con ID {}", id)
            }
            ErrorVenta::Interno(_) => write!(f, "Hubo un error al registrar la venta"),
        }
    }
}

impl From<sqlx::Error> for ErrorVenta {
    fn from(e: sqlx::Error) -> Self {
        ErrorVenta::Interno(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mensajes_de_error_nombran_al_culpable() {
        assert_eq!(
            ErrorVenta::ProductoNoEncontrado(7).to_string(),
            "Producto con ID 7 no encontrado"
        );
        assert_eq!(
            ErrorVenta::StockInsuficiente("Coca Cola".into()).to_string(),
            "No hay suficiente stock para el producto Coca Cola"
        );
        assert_eq!(
            ErrorVenta::ClienteNoEncontrado.to_string(),
            "Cliente no encontrado"
        );
    }
}

// src/ventas/ventas_router.rs

use actix_web::{get, post, web, HttpResponse};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use log::{error, warn};
use sqlx::{query, query_as, Pool, Postgres, Row};
use std::collections::HashMap;

use super::ventas_structs::{
    ClienteResumen, ErrorVenta, ItemVenta, ItemVentaDetalle, ListadoVentas, NuevaVenta,
    ProductoResumen, RankingProducto, VentaCreada, VentaDetalle,
};
use crate::productos::productos_structs::{Producto, COLUMNAS_PRODUCTO};
use crate::shared::shared_structs::Mensaje;
use crate::AppState;

/// Registra una venta.
///
/// Toda la operación corre dentro de UNA transacción: se valida el cliente,
/// y por cada renglón en orden de entrada se busca el producto bloqueándolo
/// con `FOR UPDATE`, se verifica el stock, se descuenta y se congela el precio
/// unitario vigente. Cualquier fallo revierte la transacción completa: ningún
/// descuento parcial queda aplicado y dos ventas concurrentes sobre el mismo
/// producto no pueden sobrevender.
#[post("/api/ventas")]
pub async fn registrar_venta(
    data: web::Data<AppState>,
    item: web::Json<NuevaVenta>,
) -> HttpResponse {
    match procesar_venta(&data.db_pool, item.into_inner()).await {
        Ok(venta) => HttpResponse::Created().json(venta),
        Err(ErrorVenta::Interno(e)) => {
            error!("Error al registrar la venta: {:?}", e);
            HttpResponse::InternalServerError()
                .json(Mensaje::nuevo("Hubo un error al registrar la venta"))
        }
        Err(e) => HttpResponse::BadRequest().json(Mensaje::nuevo(e.to_string())),
    }
}

/// Núcleo transaccional del registro de una venta.
async fn procesar_venta(
    pool: &Pool<Postgres>,
    venta: NuevaVenta,
) -> Result<VentaCreada, ErrorVenta> {
    if venta.productos.is_empty() {
        return Err(ErrorVenta::VentaVacia);
    }
    for item in &venta.productos {
        if item.cantidad <= 0 {
            return Err(ErrorVenta::CantidadInvalida(item.producto));
        }
    }

    let mut transaction = pool.begin().await?;

    // El cliente debe existir al momento de la venta
    let cliente = query("SELECT id FROM clientes WHERE id = $1")
        .bind(venta.cliente)
        .fetch_optional(&mut *transaction)
        .await?;
    if cliente.is_none() {
        let _ = transaction.rollback().await;
        return Err(ErrorVenta::ClienteNoEncontrado);
    }

    let consulta_producto = format!(
        "SELECT {} FROM productos WHERE id = $1 FOR UPDATE",
        COLUMNAS_PRODUCTO
    );

    let mut items: Vec<ItemVenta> = Vec::with_capacity(venta.productos.len());
    for pedido in &venta.productos {
        let producto = query_as::<_, Producto>(&consulta_producto)
            .bind(pedido.producto)
            .fetch_optional(&mut *transaction)
            .await?;

        let producto = match producto {
            Some(p) => p,
            None => {
                let _ = transaction.rollback().await;
                return Err(ErrorVenta::ProductoNoEncontrado(pedido.producto));
            }
        };

        if producto.stock < pedido.cantidad {
            let _ = transaction.rollback().await;
            return Err(ErrorVenta::StockInsuficiente(producto.nombre));
        }

        query("UPDATE productos SET stock = stock - $1, ventas = ventas + $1 WHERE id = $2")
            .bind(pedido.cantidad)
            .bind(pedido.producto)
            .execute(&mut *transaction)
            .await?;

        // Precio congelado al momento de la venta
        items.push(ItemVenta {
            producto: producto.id,
            cantidad: pedido.cantidad,
            precio: producto.precio,
        });
    }

    let fecha = venta.fecha.unwrap_or_else(Utc::now);
    let fila = query("INSERT INTO ventas (cliente_id, total, fecha) VALUES ($1, $2, $3) RETURNING id")
        .bind(venta.cliente)
        .bind(&venta.total)
        .bind(fecha)
        .fetch_one(&mut *transaction)
        .await?;
    let venta_id: i32 = fila.try_get("id")?;

    for item in &items {
        query(
            "INSERT INTO venta_items (venta_id, producto_id, cantidad, precio) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(venta_id)
        .bind(item.producto)
        .bind(item.cantidad)
        .bind(&item.precio)
        .execute(&mut *transaction)
        .await?;
    }

    transaction.commit().await?;

    Ok(VentaCreada {
        id: venta_id,
        cliente: venta.cliente,
        productos: items,
        total: venta.total,
        fecha,
    })
}

/// Fila del listado de ventas con el cliente resuelto por LEFT JOIN:
/// las columnas del cliente son nulas si este fue eliminado.
#[derive(sqlx::FromRow)]
struct FilaVenta {
    id: i32,
    total: BigDecimal,
    fecha: DateTime<Utc>,
    cliente_id: Option<i32>,
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    tipo_documento: Option<String>,
    documento: Option<String>,
}

/// Renglón con el producto resuelto por LEFT JOIN. `precio` es el congelado
/// de la venta; `precio_actual` el vigente del producto para mostrar.
#[derive(sqlx::FromRow)]
struct FilaItem {
    venta_id: i32,
    producto_id: i32,
    cantidad: i32,
    precio: BigDecimal,
    nombre: Option<String>,
    precio_actual: Option<BigDecimal>,
}

/// Lista todas las ventas con cliente y productos resueltos, y agrega el
/// total histórico y el ranking de productos más vendidos.
#[get("/api/ventas")]
pub async fn listar_ventas(data: web::Data<AppState>) -> HttpResponse {
    let filas_ventas = query_as::<_, FilaVenta>(
        "SELECT v.id, v.total, v.fecha, c.id AS cliente_id, c.name, c.email, c.phone, \
         c.tipo_documento, c.documento \
         FROM ventas v LEFT JOIN clientes c ON c.id = v.cliente_id ORDER BY v.id",
    )
    .fetch_all(&data.db_pool)
    .await;

    let filas_items = query_as::<_, FilaItem>(
        "SELECT i.venta_id, i.producto_id, i.cantidad, i.precio, p.nombre, \
         p.precio AS precio_actual \
         FROM venta_items i LEFT JOIN productos p ON p.id = i.producto_id \
         ORDER BY i.venta_id, i.id",
    )
    .fetch_all(&data.db_pool)
    .await;

    let (filas_ventas, filas_items) = match (filas_ventas, filas_items) {
        (Ok(v), Ok(i)) => (v, i),
        (Err(e), _) | (_, Err(e)) => {
            error!("Error al obtener las ventas: {:?}", e);
            return HttpResponse::InternalServerError()
                .json(Mensaje::nuevo("Error al obtener las ventas"));
        }
    };

    let mut items_por_venta: HashMap<i32, Vec<ItemVentaDetalle>> = HashMap::new();
    for fila in filas_items {
        let producto = match (fila.nombre, fila.precio_actual) {
            (Some(nombre), Some(precio)) => Some(ProductoResumen {
                id: fila.producto_id,
                nombre,
                precio,
            }),
            _ => None,
        };
        items_por_venta
            .entry(fila.venta_id)
            .or_default()
            .push(ItemVentaDetalle {
                producto,
                cantidad: fila.cantidad,
                precio: fila.precio,
            });
    }

    let ventas: Vec<VentaDetalle> = filas_ventas
        .into_iter()
        .map(|fila| {
            let cliente = match (
                fila.cliente_id,
                fila.name,
                fila.email,
                fila.phone,
                fila.tipo_documento,
                fila.documento,
            ) {
                (Some(id), Some(name), Some(email), Some(phone), Some(td), Some(doc)) => {
                    Some(ClienteResumen {
                        id,
                        name,
                        email,
                        phone,
                        tipo_documento: td,
                        documento: doc,
                    })
                }
                _ => None,
            };
            VentaDetalle {
                id: fila.id,
                cliente,
                productos: items_por_venta.remove(&fila.id).unwrap_or_default(),
                total: fila.total,
                fecha: fila.fecha,
            }
        })
        .collect();

    let total_ventas = total_de_ventas(&ventas);
    let productos_mas_vendidos = ranking_mas_vendidos(&ventas);

    HttpResponse::Ok().json(ListadoVentas {
        ventas,
        total_ventas,
        productos_mas_vendidos,
    })
}

/// Suma de los campos `total` guardados, sin recomputar desde los renglones.
pub fn total_de_ventas(ventas: &[VentaDetalle]) -> BigDecimal {
    ventas
        .iter()
        .fold(BigDecimal::from(0), |acumulado, venta| acumulado + &venta.total)
}

/// Ranking de productos más vendidos: agrupa los renglones de todas las
/// ventas por nombre de producto sumando cantidades y ordena de mayor a
/// menor. El orden es estable, así que los empates conservan el orden de
/// primera aparición. Un renglón cuyo producto ya no existe se omite con
/// un aviso en el log.
pub fn ranking_mas_vendidos(ventas: &[VentaDetalle]) -> Vec<RankingProducto> {
    let mut conteo: Vec<RankingProducto> = Vec::new();
    for venta in ventas {
        for item in &venta.productos {
            match &item.producto {
                Some(producto) => {
                    match conteo.iter_mut().find(|r| r.nombre == producto.nombre) {
                        Some(entrada) => entrada.cantidad += item.cantidad as i64,
                        None => conteo.push(RankingProducto {
                            nombre: producto.nombre.clone(),
                            cantidad: item.cantidad as i64,
                        }),
                    }
                }
                None => warn!(
                    "Renglón de la venta {} con producto inexistente, omitido del ranking",
                    venta.id
                ),
            }
        }
    }
    conteo.sort_by(|a, b| b.cantidad.cmp(&a.cantidad));
    conteo
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ventas::ventas_structs::ItemNuevaVenta;
    use std::str::FromStr;

    // Pool perezoso: las validaciones previas a la transacción no tocan la base
    fn pool_sin_conexion() -> Pool<Postgres> {
        Pool::<Postgres>::connect_lazy("postgres://localhost/puntoventa").unwrap()
    }

    #[actix_web::test]
    async fn venta_sin_productos_es_rechazada() {
        let venta = NuevaVenta {
            cliente: 1,
            productos: vec![],
            total: BigDecimal::from(0),
            fecha: None,
        };
        assert!(matches!(
            procesar_venta(&pool_sin_conexion(), venta).await,
            Err(ErrorVenta::VentaVacia)
        ));
    }

    #[actix_web::test]
    async fn cantidad_no_positiva_es_rechazada() {
        for cantidad in [0, -3] {
            let venta = NuevaVenta {
                cliente: 1,
                productos: vec![
                    ItemNuevaVenta { producto: 4, cantidad: 2 },
                    ItemNuevaVenta { producto: 9, cantidad },
                ],
                total: BigDecimal::from(0),
                fecha: None,
            };
            assert!(matches!(
                procesar_venta(&pool_sin_conexion(), venta).await,
                Err(ErrorVenta::CantidadInvalida(9))
            ));
        }
    }

    fn venta(id: i32, total: &str, items: Vec<ItemVentaDetalle>) -> VentaDetalle {
        VentaDetalle {
            id,
            cliente: None,
            productos: items,
            total: BigDecimal::from_str(total).unwrap(),
            fecha: Utc::now(),
        }
    }

    fn item(nombre: &str, cantidad: i32) -> ItemVentaDetalle {
        ItemVentaDetalle {
            producto: Some(ProductoResumen {
                id: 1,
                nombre: nombre.into(),
                precio: BigDecimal::from(10),
            }),
            cantidad,
            precio: BigDecimal::from(10),
        }
    }

    fn item_sin_producto(cantidad: i32) -> ItemVentaDetalle {
        ItemVentaDetalle {
            producto: None,
            cantidad,
            precio: BigDecimal::from(10),
        }
    }

    #[test]
    fn ranking_suma_y_ordena_descendente() {
        let ventas = vec![
            venta(1, "30", vec![item("A", 3), item("B", 5)]),
            venta(2, "20", vec![item("A", 2)]),
        ];
        // A suma 5 y B suma 5: empate resuelto por orden de aparición (A primero)
        assert_eq!(
            ranking_mas_vendidos(&ventas),
            vec![
                RankingProducto { nombre: "A".into(), cantidad: 5 },
                RankingProducto { nombre: "B".into(), cantidad: 5 },
            ]
        );
    }

    #[test]
    fn ranking_ordena_por_cantidad() {
        let ventas = vec![venta(1, "0", vec![item("A", 1), item("B", 7), item("C", 4)])];
        let ranking = ranking_mas_vendidos(&ventas);
        assert_eq!(
            ranking.iter().map(|r| r.nombre.as_str()).collect::<Vec<_>>(),
            vec!["B", "C", "A"]
        );
    }

    #[test]
    fn ranking_omite_productos_inexistentes() {
        let ventas = vec![venta(1, "0", vec![item("A", 2), item_sin_producto(9)])];
        assert_eq!(
            ranking_mas_vendidos(&ventas),
            vec![RankingProducto { nombre: "A".into(), cantidad: 2 }]
        );
    }

    #[test]
    fn total_suma_los_totales_guardados() {
        let ventas = vec![
            venta(1, "20.00", vec![]),
            venta(2, "15.50", vec![]),
        ];
        assert_eq!(total_de_ventas(&ventas), BigDecimal::from_str("35.50").unwrap());
    }

    #[test]
    fn total_de_cero_ventas_es_cero() {
        assert_eq!(total_de_ventas(&[]), BigDecimal::from(0));
    }
}

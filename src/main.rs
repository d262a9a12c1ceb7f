// src/main.rs

use actix_files::Files;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::info;
use sqlx::{Pool, Postgres};

mod categorias; // Módulo de categorías
mod clientes;   // Módulo de clientes
mod config;     // Configuración desde el entorno
mod productos;  // Módulo de productos
mod shared;     // Structs y utilidades compartidas
mod ventas;     // Módulo de ventas (núcleo) y boletas

use config::Config;

/// Estado compartido entre las rutas: el pool de conexiones y la configuración.
pub struct AppState {
    pub db_pool: Pool<Postgres>,
    pub config: Config,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = match Config::desde_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuración inválida: {}", e);
            std::process::exit(1);
        }
    };

    // La carpeta de subidas debe existir antes de servirla y escribir en ella
    std::fs::create_dir_all(&config.uploads_dir)?;

    let db_pool = Pool::<Postgres>::connect(&config.database_url)
        .await
        .expect("Falla al conectar a la base de datos PostgreSQL");

    info!("Conectado a la base de datos PostgreSQL");

    let puerto = config.puerto;
    let uploads_dir = config.uploads_dir.clone();
    let app_state = web::Data::new(AppState { db_pool, config });

    info!("Servidor corriendo en el puerto {}", puerto);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())

            // Módulo de Ventas
            .service(ventas::ventas_router::registrar_venta)
            .service(ventas::ventas_router::listar_ventas)
            .service(ventas::boleta::generar_boleta)

            // Módulo de Productos
            .service(productos::productos_router::buscar_productos)
            .service(productos::productos_router::buscar_producto_por_id)
            .service(productos::productos_router::registrar_producto)
            .service(productos::productos_router::actualizar_producto)
            .service(productos::productos_router::eliminar_producto)

            // Módulo de Clientes
            .service(clientes::clientes_router::buscar_clientes)
            .service(clientes::clientes_router::buscar_cliente_por_id)
            .service(clientes::clientes_router::registrar_cliente)
            .service(clientes::clientes_router::actualizar_cliente)
            .service(clientes::clientes_router::eliminar_cliente)

            // Módulo de Categorías
            .service(categorias::categoria_router::registrar_categoria)
            .service(categorias::categoria_router::buscar_categorias)
            .service(categorias::categoria_router::buscar_categoria_por_id)
            .service(categorias::categoria_router::actualizar_categoria)
            .service(categorias::categoria_router::eliminar_categoria)

            // Imágenes de productos subidas
            .service(Files::new("/uploads", uploads_dir.clone()))
    })
    .bind(("0.0.0.0", puerto))?
    .run()
    .await
}

use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use charge_expedition::config::environment::EnvironmentConfig;
use charge_expedition::{create_app_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("🔋 Charge Expedition - Panel de pruebas de carga");
    info!("================================================");

    let config = EnvironmentConfig::default();
    info!("📂 Datos: {}", config.data_dir.display());
    info!("📝 Registros: {}", config.records_file.display());
    info!("🧭 Estrategia del reporte: {}", config.report_strategy.display_name());

    let addr: SocketAddr = config.server_url().parse()?;
    let app = create_app_router(AppState::new(config));

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("   POST /api/sessions - Abrir sesión de operador");
    info!("   DELETE /api/sessions/:id - Cerrar sesión");
    info!("🚀 Mission Start:");
    info!("   GET  /api/mission-start/briefing - Briefing de la misión");
    info!("📋 Mission Report:");
    info!("   GET  /api/mission-report/overview - Métricas y mapa");
    info!("   GET  /api/mission-report/segments - Tabla de navegación");
    info!("   GET  /api/mission-report/sessions/:id/form - Formulario de campo");
    info!("   POST /api/mission-report/sessions/:id/start-time - Capturar inicio");
    info!("   POST /api/mission-report/sessions/:id/end-time - Capturar fin");
    info!("   POST /api/mission-report/sessions/:id/records - Enviar registro");
    info!("   GET  /api/mission-report/records - Registros guardados");
    info!("   GET  /api/mission-report/records/download - Descargar CSV");
    info!("   POST /api/mission-report/sessions/:id/navigation - Elegir tramo");
    info!("   GET  /api/mission-report/sessions/:id/qr-panel - Panel del QR");
    info!("   GET  /api/mission-report/sessions/:id/qr.png - Imagen del QR");
    info!("🏁 Mission Completed:");
    info!("   GET  /api/mission-completed/summary - Resumen de resultados");

    // Iniciar servidor en background
    let server_handle = tokio::spawn(async move {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                error!("❌ Error del servidor: {}", e);
                e
            })
    });

    // Esperar a que el servidor termine
    if let Err(e) = server_handle.await? {
        error!("❌ Servidor terminó con error: {}", e);
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}

mod classifier;
mod config;
mod diagnosis;
mod report;
mod routes;

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use classifier::remote::RemoteModelLoader;
use classifier::{ClassifierAdapter, ModelLoader};
use config::{AppConfig, ClassifierBackend, ClassifierConfig};
use diagnosis::DiagnosisService;
use routes::configure_routes;
use shared::{Resolver, UploadLimits};
use std::env;
use std::path::Path;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    dotenv::dotenv().ok();

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    } else {
        log::error!("Failed to get the current working directory.");
    }

    let config = AppConfig::load().map_err(|e| {
        log::error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let loader = build_loader(&config.classifier).map_err(|e| {
        log::error!("{}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    let limits = UploadLimits::new(config.upload.max_bytes);
    let service = web::Data::new(DiagnosisService::new(
        ClassifierAdapter::from_boxed(loader),
        Resolver::new(config.resolver.fallback),
        limits,
    ));
    log::info!(
        "Upload limit {} bytes, fallback policy '{}'",
        limits.max_bytes,
        config.resolver.fallback.as_ref()
    );

    let frontend_dir = resolve_frontend_dir(config.server.frontend_dir.clone());
    match &frontend_dir {
        Some(dir) => log::info!("Serving frontend from {}", dir),
        None => log::warn!("Frontend build not found; serving the API only"),
    }

    let bind_address = format!("0.0.0.0:{}", config.server.port);
    log::info!("Starting server on {}", bind_address);

    let app_service = service.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .expose_headers(vec![actix_web::http::header::CONTENT_DISPOSITION])
                    .max_age(3600),
            )
            .app_data(app_service.clone())
            .configure(|cfg| configure_routes(cfg, limits, frontend_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await?;

    // Workers are gone; release the model handle explicitly.
    match std::sync::Arc::try_unwrap(service.into_inner()) {
        Ok(mut service) => service.dispose(),
        Err(_) => log::warn!("Diagnosis service still shared at shutdown"),
    }
    log::info!("Server stopped");
    Ok(())
}

fn build_loader(config: &ClassifierConfig) -> Result<Box<dyn ModelLoader>, String> {
    match config.backend {
        ClassifierBackend::Remote => {
            if config.remote.token.is_none() {
                log::warn!("INFERENCE_TOKEN is not set; requests may be rate limited");
            }
            Ok(Box::new(RemoteModelLoader::from_config(&config.remote)))
        }
        #[cfg(feature = "torch")]
        ClassifierBackend::Torch => Ok(Box::new(
            classifier::torch::TorchModelLoader::from_config(&config.torch),
        )),
        #[cfg(not(feature = "torch"))]
        ClassifierBackend::Torch => {
            Err("classifier backend 'torch' requires building with --features torch".to_string())
        }
    }
}

fn resolve_frontend_dir(configured: Option<String>) -> Option<String> {
    let candidate = configured.unwrap_or_else(|| {
        if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
            format!("{}/../frontend/dist", manifest_dir)
        } else {
            "/usr/src/app/frontend/dist".to_string()
        }
    });
    Path::new(&candidate).is_dir().then_some(candidate)
}

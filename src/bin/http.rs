#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use chrono::Utc;
    use project_scheduler::{EngineConfig, Project, http_api, persistence};

    let addr: SocketAddr = std::env::var("PROJECT_SCHEDULER_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    // Optional snapshot to serve, optional engine config for a fresh project
    let project = match std::env::var("PROJECT_SCHEDULER_SNAPSHOT") {
        Ok(path) => persistence::load_project_from_json(path)?,
        Err(_) => {
            let config = match std::env::var("PROJECT_SCHEDULER_CONFIG") {
                Ok(path) => EngineConfig::load_json(path)?,
                Err(_) => EngineConfig::default(),
            };
            Project::with_config("New Project", Utc::now().date_naive(), config)?
        }
    };

    println!("project-scheduler HTTP API listening on http://{addr}");
    http_api::serve(addr, project).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}

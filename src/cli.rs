use std::error::Error;

use clap::{Parser, Subcommand};
use portal_spa::mask::{self, MaskKind};
use portal_spa::validation::{FieldConstraints, FieldId, validation_message};
use portal_spa::{RouteTable, View};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "portal-spa",
    about = "Inspect and serve the Portal Solidário client behavior",
    version
)]
pub struct Cli {
    /// Emit JSON instead of human-readable tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply an input mask (cpf, telefone, cep) to a raw value.
    Mask {
        kind: MaskKind,
        value: String,
    },
    /// Run the registration form constraints for one field.
    Validate {
        /// Field id, e.g. `cpf`, `email`, `telefone`.
        field: FieldId,
        value: String,
    },
    /// Show which route and document a path resolves to.
    Route {
        path: String,
    },
    /// Render a route through the SPA loader and report what was mounted.
    #[cfg(feature = "web")]
    Preview {
        #[arg(default_value = "/")]
        path: String,
        /// Site configuration JSON.
        #[arg(long)]
        config: Option<std::path::PathBuf>,
    },
    /// Start the development server.
    #[cfg(feature = "web")]
    Serve {
        /// Address to bind, e.g. 127.0.0.1:8080.
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: std::net::SocketAddr,
        /// Directory with the wasm-bindgen output, served under /pkg.
        #[arg(long)]
        assets_dir: Option<std::path::PathBuf>,
        /// Site configuration JSON.
        #[arg(long)]
        config: Option<std::path::PathBuf>,
    },
}

pub fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing();
    match cli.command {
        Command::Mask { kind, value } => handle_mask(kind, &value, cli.json),
        Command::Validate { field, value } => handle_validate(field, &value, cli.json),
        Command::Route { path } => handle_route(&path, cli.json),
        #[cfg(feature = "web")]
        Command::Preview { path, config } => handle_preview(&path, config, cli.json),
        #[cfg(feature = "web")]
        Command::Serve {
            addr,
            assets_dir,
            config,
        } => handle_serve(addr, assets_dir, config),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_mask(kind: MaskKind, value: &str, as_json: bool) -> Result<(), Box<dyn Error>> {
    let masked = kind.apply(value);
    if as_json {
        let payload = json!({
            "kind": kind.to_string(),
            "input": value,
            "masked": masked,
            "digits": mask::digit_count(&masked),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("{masked}");
    }
    Ok(())
}

fn handle_validate(field: FieldId, value: &str, as_json: bool) -> Result<(), Box<dyn Error>> {
    let value = match field.mask() {
        Some(kind) => kind.apply(value),
        None => value.to_string(),
    };
    let validity = FieldConstraints::default_for(field).check(field, &value);
    let message = validation_message(field, &validity);

    if as_json {
        let payload = json!({
            "field": field.as_str(),
            "value": value,
            "valid": validity.is_valid(),
            "message": message,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        match message {
            Some(message) => println!("{}: {message}", field.label()),
            None => println!("{}: ok ({value})", field.label()),
        }
    }
    Ok(())
}

fn handle_route(path: &str, as_json: bool) -> Result<(), Box<dyn Error>> {
    let routes = RouteTable::standard();
    let resolved = routes.resolve(path);

    if as_json {
        let payload = match resolved {
            Some(route) => json!({
                "path": path,
                "route": route.path,
                "document": route.document,
                "view": view_name(route.view),
            }),
            None => json!({
                "path": path,
                "route": null,
                "fallback": routes.home().path,
            }),
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    match resolved {
        Some(route) => {
            let width = "DOCUMENT".len().max(route.document.len());
            println!("{:<width$}  {}", "DOCUMENT", "VIEW", width = width);
            println!("{:-<width$}  {}", "", "----", width = width);
            println!("{:<width$}  {}", route.document, route.view, width = width);
        }
        None => println!(
            "No route for \"{path}\"; the loader falls back to {}.",
            routes.home().path
        ),
    }
    Ok(())
}

fn view_name(view: View) -> String {
    view.to_string()
}

#[cfg(feature = "web")]
fn load_site(config: Option<std::path::PathBuf>) -> Result<portal_spa::SiteConfig, Box<dyn Error>> {
    match config {
        Some(path) => Ok(portal_spa::SiteConfig::load(path)?),
        None => Ok(portal_spa::SiteConfig::default()),
    }
}

#[cfg(feature = "web")]
fn handle_preview(
    path: &str,
    config: Option<std::path::PathBuf>,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    use parking_lot::Mutex;
    use portal_spa::NavOutcome;
    use portal_spa::headless::HeadlessDocument;
    use portal_spa::router::navigate;
    use portal_spa::web::RouterFetcher;

    let site = load_site(config)?;
    let fetcher = RouterFetcher::for_site(site.clone());
    let host = HeadlessDocument::new(site.clone(), path);
    let router = Mutex::new(portal_spa::Router::new(site, RouteTable::standard(), host)?);
    let request = router.lock().initial(path);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let outcome = runtime.block_on(navigate(&router, &fetcher, request));

    let router = router.lock();
    let document = router.host();
    let fields: Vec<&str> = document
        .form()
        .map(|form| form.fields().iter().map(|field| field.id().as_str()).collect())
        .unwrap_or_default();

    if as_json {
        let payload = json!({
            "requested": path,
            "location": document.location(),
            "title": document.title(),
            "view": router.mounted_view().map(view_name),
            "cta_bound": document.cta_bound(),
            "form_fields": fields,
            "error": document.error_notice(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    match outcome {
        NavOutcome::Rendered { path, title } => {
            println!("Rendered {path} as \"{title}\"");
            if let Some(view) = router.mounted_view() {
                println!("View: {view}");
            }
            if document.cta_bound() {
                println!("Call to action bound");
            }
            if !fields.is_empty() {
                println!("Form fields: {}", fields.join(", "));
            }
        }
        NavOutcome::Failed { path, error } => {
            return Err(format!("Failed to load {path}: {error}").into());
        }
        NavOutcome::Superseded { path } => println!("Navigation to {path} was superseded"),
    }
    Ok(())
}

#[cfg(feature = "web")]
fn handle_serve(
    addr: std::net::SocketAddr,
    assets_dir: Option<std::path::PathBuf>,
    config: Option<std::path::PathBuf>,
) -> Result<(), Box<dyn Error>> {
    let site = load_site(config)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(portal_spa::web::serve(portal_spa::web::WebConfig {
        addr,
        assets_dir,
        site,
    }))?;
    Ok(())
}

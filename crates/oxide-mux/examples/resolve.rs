//! Resolves a request against a small demo route table.
//!
//! ```text
//! cargo run -p oxide-mux --example resolve -- http://www.domain.com/products/42
//! cargo run -p oxide-mux --example resolve -- --method post /api/v1/users
//! cargo run -p oxide-mux --example resolve -- --url-for article category=tech id=7
//! ```

use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use oxide_mux::{Request, Response, Router};

/// Matches a request against the demo routes and prints the outcome.
#[derive(Parser)]
#[command(name = "resolve")]
#[command(about, long_about = None)]
struct Cli {
    /// HTTP method of the request.
    #[arg(short, long, env = "MUX_METHOD", default_value = "GET")]
    method: String,

    /// Build the URL of this named route instead of resolving a request.
    #[arg(long)]
    url_for: Option<String>,

    /// Request target, or `name=value` variables with `--url-for`.
    args: Vec<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

async fn product_handler(req: Request) -> Response {
    let key = req.vars().get("key").unwrap_or("unknown");
    Response::text(format!("product {key}"))
}

async fn article_handler(req: Request) -> Response {
    Response::json(&serde_json::json!({
        "category": req.vars().get("category"),
        "id": req.vars().parse::<u64>("id"),
    }))
}

async fn create_user_handler(_req: Request) -> Response {
    Response::text("user created").status(201)
}

fn routes() -> oxide_mux::Result<Router> {
    let mut router = Router::new();

    let shop = router.host("www.domain.com")?.subrouter();
    shop.route("/products/{key}", product_handler)?.name("product")?;

    router
        .get("/articles/{category}/{id:[0-9]+}", article_handler)?
        .name("article")?;

    let api = router.path_prefix("/api/v1")?.subrouter();
    api.post("/api/v1/users", create_user_handler)?
        .headers(&["Content-Type", ""])?
        .name("create_user")?;

    Ok(router)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::TRACE
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let router = routes()?;

    if let Some(name) = &cli.url_for {
        let pairs: Vec<(&str, &str)> = cli
            .args
            .iter()
            .filter_map(|arg| arg.split_once('='))
            .collect();
        let url = router.url_for(name, &pairs)?;
        info!(route = %name, url = %url, "built URL");
        return Ok(());
    }

    let target = cli.args.first().map_or("/", String::as_str);
    let request = Request::new(cli.method.as_str(), target).header("Content-Type", "text/plain");

    match router.resolve(&request) {
        Some(matched) => {
            let vars: Vec<String> = matched.vars.iter().map(|(k, v)| format!("{k}={v}")).collect();
            info!(route = ?matched.route.get_name(), vars = ?vars, "matched");
        }
        None => info!("no route matched"),
    }

    let response = router.handle(request).await;
    info!(
        status = response.status,
        body = %response.body_string().unwrap_or_default(),
        "handled"
    );
    Ok(())
}

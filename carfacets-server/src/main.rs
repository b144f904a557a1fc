#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use carfacets_http::serve;
use clap::{parser::ValueSource, ArgMatches, CommandFactory, FromArgMatches, Parser};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:7800";

#[derive(Parser)]
#[command(name = "carfacets", version, about = "Faceted filter counts for car listings")]
struct Cli {
    /// Directory holding settings.json, items.json and catalog.json.
    #[arg(long, env = "CARFACETS_DATA_DIR", default_value = "./data")]
    data_dir: String,
    #[arg(long, env = "CARFACETS_BIND_ADDR")]
    bind_addr: Option<String>,
    #[arg(long, env = "CARFACETS_PORT")]
    port: Option<u16>,

    /// Bind to 127.0.0.1:0 (OS-assigned ephemeral port). Prints resolved address at startup.
    #[arg(long)]
    auto_port: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    let bind_addr = resolve_bind_addr(&cli, &matches)
        .map_err(|msg| std::io::Error::new(std::io::ErrorKind::InvalidInput, msg))?;
    std::env::set_var("CARFACETS_DATA_DIR", &cli.data_dir);
    std::env::set_var("CARFACETS_BIND_ADDR", &bind_addr);
    serve().await
}

/// Command-line flags win over env vars; `--port` alone binds loopback.
fn resolve_bind_addr(cli: &Cli, matches: &ArgMatches) -> Result<String, String> {
    if cli.auto_port && is_set_on_command_line(matches, "bind_addr") {
        return Err("--auto-port cannot be used with --bind-addr".to_string());
    }
    if cli.auto_port && is_set_on_command_line(matches, "port") {
        return Err("--auto-port cannot be used with --port".to_string());
    }

    if is_set_on_command_line(matches, "bind_addr") {
        if let Some(bind_addr) = &cli.bind_addr {
            return Ok(bind_addr.clone());
        }
    }
    if cli.auto_port {
        return Ok("127.0.0.1:0".to_string());
    }
    if is_set_on_command_line(matches, "port") {
        if let Some(port) = cli.port {
            return Ok(format!("127.0.0.1:{port}"));
        }
    }

    if let Some(bind_addr) = &cli.bind_addr {
        return Ok(bind_addr.clone());
    }
    if let Some(port) = cli.port {
        return Ok(format!("127.0.0.1:{port}"));
    }
    Ok(DEFAULT_BIND_ADDR.to_string())
}

fn is_set_on_command_line(matches: &ArgMatches, arg: &str) -> bool {
    matches.value_source(arg) == Some(ValueSource::CommandLine)
}

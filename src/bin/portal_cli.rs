//!
//! iot-portal CLI binary
//! ---------------------
//! Command-line client for the portal gateway. Verifies the session, shows the caller's
//! role, then runs one operation through the request dispatcher and prints the result.

use std::collections::BTreeMap;
use std::env;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};

use iot_portal::cli::print_envelope;
use iot_portal::client::Portal;
use iot_portal::config::{self, ClientConfig};
use iot_portal::identity::{EnvSessionProvider, SessionProvider, StaticSessionProvider};
use iot_portal::operation::Method;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--gateway <url>] [--token <id-token>] [--json] <command>\n\nCommands:\n  role                         show the caller's group\n  devices                      list devices\n  download <s3Path>            request a file download by path\n  call <operation> [--method GET|POST] [--param k=v]... [--body <json>]\n                               dispatch an arbitrary operation name (rejected unless allow-listed)\n\nFlags:\n  --gateway <url>   Gateway base URL (env: {gw}, default {dgw})\n  --token <t>       Identity token (default: read from env {tok} on every call)\n  --json            Print raw JSON instead of tables\n  -h, --help        Show this help",
        gw = config::ENV_GATEWAY_URL, dgw = config::DEFAULT_GATEWAY_URL, tok = config::ENV_ID_TOKEN
    );
}

fn take_value(args: &mut Vec<String>, flag: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == flag)?;
    if pos + 1 >= args.len() { return None; }
    let val = args.remove(pos + 1);
    args.remove(pos);
    Some(val)
}

fn take_flag(args: &mut Vec<String>, flag: &str) -> bool {
    match args.iter().position(|a| a == flag) {
        Some(pos) => { args.remove(pos); true }
        None => false,
    }
}

fn take_all_values(args: &mut Vec<String>, flag: &str) -> Vec<String> {
    let mut out = Vec::new();
    while let Some(v) = take_value(args, flag) { out.push(v); }
    out
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let mut args: Vec<String> = env::args().collect();
    let program = args.remove(0);
    if args.is_empty() || take_flag(&mut args, "--help") || take_flag(&mut args, "-h") {
        print_usage(&program);
        return Ok(());
    }

    let gateway = take_value(&mut args, "--gateway");
    let token = take_value(&mut args, "--token");
    let raw_json = take_flag(&mut args, "--json");
    let method = take_value(&mut args, "--method");
    let params = take_all_values(&mut args, "--param");
    let body = take_value(&mut args, "--body");

    let cfg = match gateway {
        Some(url) => ClientConfig::new(&url),
        None => ClientConfig::from_env(),
    }
    .context("invalid gateway URL")?;
    let provider: Arc<dyn SessionProvider> = match token {
        Some(t) => Arc::new(StaticSessionProvider::signed_in(t)),
        None => Arc::new(EnvSessionProvider::default()),
    };
    let portal = Portal::connect(&cfg, provider)?;

    let role = portal.verify_session().await;
    eprintln!("You're logged in as: {}", role);

    let Some(command) = args.first().cloned() else {
        print_usage(&program);
        return Err(anyhow!("missing command"));
    };
    let outcome = match command.as_str() {
        "role" => return Ok(()),
        "devices" => portal.list_devices().await,
        "download" => {
            let path = args.get(1).context("download needs an <s3Path>")?;
            portal.download_file(path).await
        }
        "call" => {
            let name = args.get(1).context("call needs an <operation>")?;
            let method = match method {
                Some(m) => Method::parse(&m).with_context(|| format!("unsupported method: {}", m))?,
                None => Method::Get,
            };
            let mut query = BTreeMap::new();
            for p in params {
                let (k, v) = p.split_once('=').with_context(|| format!("--param expects k=v, got {}", p))?;
                query.insert(k.to_string(), v.to_string());
            }
            let body = match body {
                Some(b) => Some(serde_json::from_str(&b).context("--body is not valid JSON")?),
                None => None,
            };
            let query = if query.is_empty() { None } else { Some(query) };
            portal.dispatcher().dispatch(name, method, query, body).await
        }
        other => {
            print_usage(&program);
            return Err(anyhow!("unknown command: {}", other));
        }
    };

    if let Some(result) = portal.state().last_result {
        if raw_json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            print_envelope(&result);
        }
    }
    outcome.map(|_| ()).map_err(|e| anyhow!(e))
}

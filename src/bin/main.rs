//! Mintkiosk CLI - drive the mint kiosk from a terminal.
//!
//! One-shot commands mirror the page actions:
//!   mintkiosk status             → render the current view-model
//!   mintkiosk connect            → authorize an account, print the view
//!   mintkiosk mint               → connect + mint + wait for confirmation
//!   mintkiosk count              → read the total-minted counter
//!
//! Interactive and hosted fronts:
//!   mintkiosk repl               → the kiosk as a prompt loop
//!   mintkiosk serve              → HTTP facade (view-model + actions as JSON)
//!
//! The chain backend is the in-process simulated chain; flags script it into
//! any scenario the kiosk has to handle:
//!   --no-provider                no wallet installed
//!   --reject                     the user declines every prompt
//!   --preauth                    accounts already authorized (restore path)
//!   --chain-id 0x1               provider reports a different chain
//!   --minted 49 --cap 50         one token left before "Max NFTs minted"
//!
//! Configuration resolves file < env < flags: `.mintkiosk.json` (written by
//! `mintkiosk init`), then `MINTKIOSK_*` variables, then command-line flags.

use mintkiosk::logging::init_logging;
use mintkiosk::{
    ChainServices, ChainId, KioskConfig, MemoryNotifier, MintSession, Notifier, SimChain,
    SimChainConfig, TerminalNotifier,
};
use mintkiosk::chain::Address;
use serde_json::{json, Value};
use std::env;
use std::io::{self, IsTerminal, Write};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const CONFIG_FILE: &str = ".mintkiosk.json";

fn main() {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let opts = match ParsedArgs::parse(&args[1..]) {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("{}", serde_json::to_string(&json!({"error": e})).unwrap());
            std::process::exit(2);
        }
    };

    if opts.help {
        print_usage();
        return;
    }

    if opts.version {
        println!("mintkiosk 0.1.0");
        return;
    }

    let result = match opts.command.as_deref() {
        Some("init") => cmd_init(&opts),
        Some("status") => cmd_status(&opts),
        Some("connect") => cmd_connect(&opts),
        Some("mint") => cmd_mint(&opts),
        Some("count") => cmd_count(&opts),
        Some("repl") => cmd_repl(&opts),
        Some("serve") => cmd_serve(&opts),
        Some(cmd) => Err(format!("Unknown command: {}", cmd)),
        None => {
            print_usage();
            return;
        }
    };

    match result {
        Ok(output) => {
            let formatted = if opts.pretty || (!opts.json && io::stdout().is_terminal()) {
                serde_json::to_string_pretty(&output).unwrap()
            } else {
                serde_json::to_string(&output).unwrap()
            };
            println!("{}", formatted);
        }
        Err(e) => {
            let err = json!({"error": e});
            if opts.pretty || io::stdout().is_terminal() {
                eprintln!("{}", serde_json::to_string_pretty(&err).unwrap());
            } else {
                eprintln!("{}", serde_json::to_string(&err).unwrap());
            }
            std::process::exit(1);
        }
    }
}

#[derive(Default)]
struct ParsedArgs {
    command: Option<String>,
    // Kiosk config overrides
    expected_chain: Option<ChainId>,
    contract: Option<Address>,
    cap: Option<u64>,
    collection: Option<String>,
    // Simulated backend knobs
    chain_id: Option<ChainId>,
    no_provider: bool,
    reject: bool,
    preauth: bool,
    accounts: Vec<Address>,
    minted: Option<u64>,
    delay_ms: Option<u64>,
    // Server options
    port: Option<u16>,
    // Output options
    json: bool,
    pretty: bool,
    help: bool,
    version: bool,
}

impl ParsedArgs {
    fn parse(args: &[String]) -> Result<Self, String> {
        // Load .env file if present
        if let Ok(contents) = std::fs::read_to_string(".env") {
            for line in contents.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    let value = value.trim().trim_matches('"');
                    if !value.is_empty() && env::var(key.trim()).is_err() {
                        env::set_var(key.trim(), value);
                    }
                }
            }
        }

        let mut opts = ParsedArgs::default();
        let mut positional = Vec::new();
        let mut i = 0;

        fn value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str, String> {
            if *i + 1 < args.len() {
                *i += 1;
                Ok(&args[*i])
            } else {
                Err(format!("{} requires a value", flag))
            }
        }

        while i < args.len() {
            let arg = &args[i];
            match arg.as_str() {
                "--help" | "-h" => opts.help = true,
                "--version" | "-V" => opts.version = true,
                "--json" => opts.json = true,
                "--pretty" => opts.pretty = true,
                "--no-provider" => opts.no_provider = true,
                "--reject" => opts.reject = true,
                "--preauth" => opts.preauth = true,
                "--expected-chain" => {
                    let raw = value(args, &mut i, "--expected-chain")?;
                    opts.expected_chain = Some(raw.parse()?);
                }
                "--contract" => {
                    let raw = value(args, &mut i, "--contract")?;
                    opts.contract =
                        Some(Address::from_str(raw).map_err(|e| format!("--contract: {}", e))?);
                }
                "--cap" => {
                    let raw = value(args, &mut i, "--cap")?;
                    opts.cap = Some(raw.parse().map_err(|_| format!("--cap: invalid number: {}", raw))?);
                }
                "--collection" => {
                    opts.collection = Some(value(args, &mut i, "--collection")?.to_string());
                }
                "--chain-id" => {
                    let raw = value(args, &mut i, "--chain-id")?;
                    opts.chain_id = Some(raw.parse()?);
                }
                "--accounts" | "-a" => {
                    let raw = value(args, &mut i, "--accounts")?;
                    for part in raw.split(',').filter(|s| !s.trim().is_empty()) {
                        let addr = Address::from_str(part.trim())
                            .map_err(|e| format!("--accounts: {}", e))?;
                        opts.accounts.push(addr);
                    }
                }
                "--minted" => {
                    let raw = value(args, &mut i, "--minted")?;
                    opts.minted =
                        Some(raw.parse().map_err(|_| format!("--minted: invalid number: {}", raw))?);
                }
                "--delay-ms" => {
                    let raw = value(args, &mut i, "--delay-ms")?;
                    opts.delay_ms =
                        Some(raw.parse().map_err(|_| format!("--delay-ms: invalid number: {}", raw))?);
                }
                "--port" | "-p" => {
                    let raw = value(args, &mut i, "--port")?;
                    opts.port = raw.parse().ok();
                }
                _ if !arg.starts_with('-') => positional.push(arg.clone()),
                _ => {} // Ignore unknown flags
            }
            i += 1;
        }

        if !positional.is_empty() {
            opts.command = Some(positional.remove(0));
        }

        if opts.port.is_none() {
            opts.port = env::var("MINTKIOSK_PORT").ok().and_then(|s| s.parse().ok());
        }

        Ok(opts)
    }
}

fn print_usage() {
    println!(
        r#"mintkiosk - wallet-session kiosk for a capped NFT mint

USAGE:
    mintkiosk <command> [options]

COMMANDS:
    init                    Write kiosk config to {config}
    status                  Restore the session and print the view-model
    connect                 Authorize an account and print the view-model
    mint                    Connect, mint, wait for confirmation
    count                   Read the total-minted counter
    repl                    Interactive kiosk
    serve                   Start the HTTP facade

KIOSK OPTIONS (file < env < flags):
    --expected-chain <id>   Chain the contract lives on (default 0x4, env: MINTKIOSK_CHAIN)
    --contract <addr>       Contract address (env: MINTKIOSK_CONTRACT)
    --cap <n>               Supply cap (default 50, env: MINTKIOSK_CAP)
    --collection <name>     Collection name (env: MINTKIOSK_COLLECTION)

BACKEND OPTIONS (simulated chain):
    --chain-id <id>         Chain the provider reports (default: expected chain)
    --no-provider           Run with no wallet provider injected
    --reject                Decline every authorization prompt
    --preauth               Wallet accounts count as already authorized
    --accounts, -a <list>   Comma-separated wallet account addresses
    --minted <n>            Tokens already minted at startup
    --delay-ms <n>          Confirmation latency in milliseconds

SERVER OPTIONS:
    --port, -p <port>       Server port (default: 8080, env: MINTKIOSK_PORT)

OUTPUT OPTIONS:
    --json                  Raw JSON output
    --pretty                Pretty-print JSON
    --version, -V           Print version

EXAMPLES:
    # Happy path: connect and mint against the local simulated chain
    mintkiosk mint --delay-ms 200

    # Wrong-network notice, nothing else happens
    mintkiosk status --chain-id 0x1

    # Last token, then the cap revert
    mintkiosk repl --minted 49 --cap 50

    # Pipe-friendly
    mintkiosk count --json | jq .minted
"#,
        config = CONFIG_FILE
    );
}

fn build_config(opts: &ParsedArgs) -> KioskConfig {
    let mut config = if std::path::Path::new(CONFIG_FILE).exists() {
        match KioskConfig::load(CONFIG_FILE) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable {}", CONFIG_FILE);
                KioskConfig::default()
            }
        }
    } else {
        KioskConfig::default()
    };
    config = config.apply_env();

    if let Some(chain) = opts.expected_chain {
        config = config.with_expected_chain(chain);
    }
    if let Some(contract) = opts.contract {
        config = config.with_contract_address(contract);
    }
    if let Some(cap) = opts.cap {
        config = config.with_supply_cap(cap);
    }
    if let Some(ref name) = opts.collection {
        config = config.with_collection_name(name.clone());
    }
    config
}

fn build_backend(opts: &ParsedArgs, config: &KioskConfig) -> Option<ChainServices> {
    if opts.no_provider {
        return None;
    }
    let mut sim_config = SimChainConfig::default()
        .with_chain_id(opts.chain_id.unwrap_or(config.expected_chain))
        .with_contract(config.contract_address)
        .with_supply_cap(config.supply_cap)
        .with_initial_minted(opts.minted.unwrap_or(0));
    if !opts.accounts.is_empty() {
        sim_config = sim_config.with_wallet_accounts(opts.accounts.clone());
    }
    if opts.preauth {
        sim_config = sim_config.preauthorized();
    }
    if opts.reject {
        sim_config = sim_config.rejecting_prompts();
    }
    if let Some(ms) = opts.delay_ms {
        sim_config = sim_config.with_confirm_delay(Duration::from_millis(ms));
    }
    Some(ChainServices::from_sim(Arc::new(SimChain::new(sim_config))))
}

fn build_session(opts: &ParsedArgs, notifier: Arc<dyn Notifier>) -> MintSession {
    let config = build_config(opts);
    let backend = build_backend(opts, &config);
    MintSession::new(backend, config, notifier)
}

fn runtime() -> Result<tokio::runtime::Runtime, String> {
    tokio::runtime::Runtime::new().map_err(|e| format!("Failed to create runtime: {}", e))
}

/// Page-load behavior: restore the session and fetch the counter, treating
/// failures as startup noise rather than fatal errors.
async fn startup(session: &MintSession) {
    if let Err(e) = session.restore_session().await {
        tracing::debug!(error = %e, "session restore skipped");
    }
    if let Err(e) = session.refresh_count().await {
        tracing::debug!(error = %e, "initial counter read skipped");
    }
}

fn view_json(session: &MintSession) -> Value {
    let config = session.config();
    json!({
        "collection": config.collection_name.clone(),
        "contract": config.contract_address,
        "chain": config.expected_chain,
        "view": session.view(),
    })
}

fn cmd_init(opts: &ParsedArgs) -> Result<Value, String> {
    let config = build_config(opts);
    config
        .save(CONFIG_FILE)
        .map_err(|e| format!("Failed to save config: {}", e))?;
    Ok(json!({
        "status": "initialized",
        "config": CONFIG_FILE,
        "collection": config.collection_name.clone(),
        "chain": config.expected_chain,
        "contract": config.contract_address,
        "cap": config.supply_cap,
    }))
}

fn cmd_status(opts: &ParsedArgs) -> Result<Value, String> {
    let rt = runtime()?;
    let session = build_session(opts, Arc::new(TerminalNotifier));
    rt.block_on(startup(&session));
    Ok(view_json(&session))
}

fn cmd_connect(opts: &ParsedArgs) -> Result<Value, String> {
    let rt = runtime()?;
    let session = build_session(opts, Arc::new(TerminalNotifier));
    rt.block_on(async {
        startup(&session).await;
        session.connect().await.map_err(|e| e.to_string())?;
        Ok(view_json(&session))
    })
}

fn cmd_mint(opts: &ParsedArgs) -> Result<Value, String> {
    let rt = runtime()?;
    let session = build_session(opts, Arc::new(TerminalNotifier));
    rt.block_on(async {
        startup(&session).await;
        if session.view().account.is_none() {
            session.connect().await.map_err(|e| e.to_string())?;
        }
        let view = session.mint().await.map_err(|e| e.to_string())?;
        // Give the watcher a beat to print the confirmation notice.
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(json!({"view": view}))
    })
}

fn cmd_count(opts: &ParsedArgs) -> Result<Value, String> {
    let rt = runtime()?;
    let session = build_session(opts, Arc::new(TerminalNotifier));
    let minted = rt
        .block_on(session.refresh_count())
        .map_err(|e| e.to_string())?;
    Ok(json!({"minted": minted, "cap": session.config().supply_cap}))
}

fn cmd_repl(opts: &ParsedArgs) -> Result<Value, String> {
    let rt = runtime()?;
    let session = build_session(opts, Arc::new(TerminalNotifier));
    rt.block_on(startup(&session));

    let config = session.config();
    println!("{}", config.collection_name);
    println!("{}", config.tagline);
    println!("Type 'help' for commands.\n");

    loop {
        let view = session.view();
        match view.account {
            Some(account) => print!("{} / {} minted | {} > ", view.minted, view.cap, account),
            None => print!("{} / {} minted | not connected > ", view.minted, view.cap),
        }
        io::stdout().flush().ok();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "quit" | "exit" | "q" => break,
            "help" | "?" => {
                println!("Commands:");
                println!("  connect  - Authorize a wallet account");
                println!("  mint     - Mint a token and wait for confirmation");
                println!("  count    - Refresh the total-minted counter");
                println!("  status   - Show the current view-model");
                println!("  quit     - Exit");
            }
            "connect" => {
                if let Err(e) = rt.block_on(session.connect()) {
                    println!("Connect failed: {}", e);
                }
            }
            "mint" => match rt.block_on(session.mint()) {
                Ok(view) => {
                    // Let the watcher print its confirmation before the prompt redraws.
                    rt.block_on(tokio::time::sleep(Duration::from_millis(50)));
                    println!("{} / {} minted", view.minted, view.cap)
                }
                Err(e) => println!("Mint failed: {}", e),
            },
            "count" => match rt.block_on(session.refresh_count()) {
                Ok(minted) => println!("{} / {} minted", minted, session.config().supply_cap),
                Err(e) => println!("Error: {}", e),
            },
            "status" => {
                println!("{}", serde_json::to_string_pretty(&view_json(&session)).unwrap())
            }
            cmd => println!("Unknown: {}. Type 'help'.", cmd),
        }
    }

    session.close();
    println!("Goodbye!");
    Ok(json!({"status": "exited"}))
}

fn cmd_serve(opts: &ParsedArgs) -> Result<Value, String> {
    let port = opts.port.unwrap_or(8080);
    let notices = Arc::new(MemoryNotifier::new());
    let session = Arc::new(build_session(opts, notices.clone()));

    let rt = runtime()?;
    rt.block_on(async {
        startup(&session).await;

        let router = mintkiosk::create_router(session.clone(), notices);
        let addr = format!("0.0.0.0:{}", port);

        info!("Mintkiosk facade listening on http://{}", addr);
        info!("Endpoints:");
        info!("  GET  /health    - Health check");
        info!("  GET  /state     - Collection info + view-model");
        info!("  GET  /count     - Refresh the minted counter");
        info!("  GET  /notices   - Drain queued notices");
        info!("  POST /connect   - Authorize an account");
        info!("  POST /mint      - Mint and wait for confirmation");

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| format!("Failed to bind: {}", e))?;

        tokio::select! {
            result = axum::serve(listener, router) => {
                result.map_err(|e| format!("Server error: {}", e))?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received, stopping server...");
            }
        }

        session.close();
        Ok::<(), String>(())
    })?;

    Ok(json!({"status": "stopped"}))
}

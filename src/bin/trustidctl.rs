use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};
use trustid_sidecar::{config, envelope, introspection, startup};

/// trustidctl — configure and exercise a running TrustID sidecar.
///
/// Works against a sidecar running anywhere reachable over HTTP: this tool
/// can generate/validate config files, mint envelope keys, and seal a
/// message end to end through the scoring API.
#[derive(Debug, Parser)]
#[command(name = "trustidctl")]
#[command(version)]
struct Cli {
    /// Base URL for the sidecar (used by commands that call the HTTP API)
    #[arg(long, default_value = "http://127.0.0.1:18900")]
    url: String,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Print/validate configuration.
    Config {
        #[command(subcommand)]
        cmd: ConfigCmd,
    },

    /// GET /health
    Health,

    /// Generate a fresh base64 envelope key suitable for AES_KEY_B64.
    GenKey,

    /// Seal a plaintext message, score it via /v1/phishing/score, and print
    /// the opened assessment.
    ///
    /// The envelope key resolves the same way the sidecar resolves it:
    /// secrets file (if given) first, then the environment.
    Score {
        /// Path to a KEY=VALUE secrets file holding AES_KEY_B64
        #[arg(long)]
        secrets_file: Option<PathBuf>,

        /// Message text; reads stdin when omitted
        message: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCmd {
    /// Print a config example to stdout
    Example,

    /// Validate a config file (loads and parses TOML)
    Validate {
        #[arg(long)]
        path: PathBuf,
    },

    /// Show current config file (raw TOML)
    Show {
        #[arg(long)]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.cmd {
        Cmd::Config { cmd } => handle_config(cmd)?,

        Cmd::Health => {
            let u = format!("{}/health", cli.url.trim_end_matches('/'));
            let txt = reqwest::blocking::get(&u)
                .with_context(|| format!("GET {u}"))?
                .text()
                .context("read response")?;
            println!("{txt}");
        }

        Cmd::GenKey => {
            println!("{}", envelope::generate_key_b64());
        }

        Cmd::Score { secrets_file, message } => {
            let store = startup::build_secret_store(secrets_file)?;
            let key = startup::resolve_envelope_key(&store)?;

            let text = match message {
                Some(m) => m,
                None => {
                    let mut s = String::new();
                    io::stdin().read_to_string(&mut s).context("read stdin")?;
                    s
                }
            };

            score_via_api(&cli.url, &key, &text)?;
        }
    }

    Ok(())
}

fn score_via_api(base_url: &str, key: &envelope::EnvelopeKey, text: &str) -> Result<()> {
    let sealed = envelope::seal(key, text).context("seal message")?;

    let u = format!("{}/v1/phishing/score", base_url.trim_end_matches('/'));
    let resp = reqwest::blocking::Client::new()
        .post(&u)
        .json(&json!({ "message": sealed }))
        .send()
        .with_context(|| format!("POST {u}"))?;

    let status = resp.status();
    let v: Value = resp.json().context("parse json")?;
    if !status.is_success() {
        println!("{}", serde_json::to_string_pretty(&v).unwrap_or_else(|_| v.to_string()));
        anyhow::bail!("request failed: {status}");
    }

    let sealed_resp = v
        .get("encrypted")
        .and_then(Value::as_str)
        .context("response missing 'encrypted'")?;
    let opened = envelope::open(key, sealed_resp).context("open response envelope")?;
    let assessment: Value = serde_json::from_str(&opened).context("parse assessment json")?;

    let schema = introspection::assessment_schema();
    let compiled = jsonschema::JSONSchema::compile(&schema)
        .map_err(|e| anyhow::anyhow!("compile assessment schema: {e}"))?;
    if !compiled.is_valid(&assessment) {
        eprintln!("warning: assessment does not match the published schema");
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&assessment).unwrap_or_else(|_| assessment.to_string())
    );
    Ok(())
}

fn handle_config(cmd: ConfigCmd) -> Result<()> {
    match cmd {
        ConfigCmd::Example => {
            let ex = include_str!("../../config.example.toml");
            print!("{ex}");
            Ok(())
        }
        ConfigCmd::Validate { path } => {
            let _ = config::Config::load(&path).with_context(|| format!("load {path:?}"))?;
            eprintln!("OK: {path:?}");
            Ok(())
        }
        ConfigCmd::Show { path } => {
            let txt = fs::read_to_string(&path).with_context(|| format!("read {path:?}"))?;
            print!("{txt}");
            Ok(())
        }
    }
}

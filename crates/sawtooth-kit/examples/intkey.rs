//! The intkey example client: named unsigned integers on a Sawtooth ledger.
//!
//! Each intkey state entry is a JSON map of `{name: value}` stored at an
//! address derived from the family prefix and the name's digest. The CLI
//! exposes the family's three verbs plus listing, lookup, and batch status.
//!
//! ```text
//! intkey --url http://localhost:8008 set counter 5
//! intkey --wait 30 inc counter 1
//! intkey --direct --url tcp://localhost:4004 show counter
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use sawtooth_kit::{Error, PayloadCodec, Sawtooth, SawtoothBuilder, hex_digest};

const FAMILY_NAME: &str = "intkey";
const FAMILY_VERSION: &str = "1.0";

// ============================================================================
// Family codec
// ============================================================================

/// One intkey operation.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct IntkeyPayload {
    verb: String,
    name: String,
    value: u32,
}

/// JSON codec for the intkey family.
struct IntkeyCodec;

impl PayloadCodec for IntkeyCodec {
    type Payload = IntkeyPayload;
    type StateValue = BTreeMap<String, u32>;

    fn family_name(&self) -> &str {
        FAMILY_NAME
    }

    fn family_version(&self) -> &str {
        FAMILY_VERSION
    }

    fn encode_payload(&self, payload: &IntkeyPayload) -> Result<Vec<u8>, Error> {
        serde_json::to_vec(payload).map_err(|e| Error::Codec(e.to_string()))
    }

    fn decode_payload(&self, bytes: &[u8]) -> Result<IntkeyPayload, Error> {
        serde_json::from_slice(bytes).map_err(|e| Error::Codec(e.to_string()))
    }

    fn input_addresses(&self, payload: &IntkeyPayload) -> Vec<String> {
        vec![address(&payload.name)]
    }

    fn output_addresses(&self, payload: &IntkeyPayload) -> Vec<String> {
        vec![address(&payload.name)]
    }

    fn encode_state(&self, value: &Self::StateValue) -> Result<Vec<u8>, Error> {
        serde_json::to_vec(value).map_err(|e| Error::Codec(e.to_string()))
    }

    fn decode_state(&self, bytes: &[u8]) -> Result<Self::StateValue, Error> {
        serde_json::from_slice(bytes).map_err(|e| Error::Codec(e.to_string()))
    }
}

/// The six-character family namespace prefix.
fn address_prefix() -> String {
    hex_digest(FAMILY_NAME.as_bytes())[..6].to_string()
}

/// The 70-character state address of a named value.
fn address(name: &str) -> String {
    format!(
        "{}{}",
        address_prefix(),
        &hex_digest(name.as_bytes())[64..]
    )
}

// ============================================================================
// CLI
// ============================================================================

/// intkey example client for sawtooth-kit.
#[derive(Parser, Debug)]
#[command(name = "intkey", about = "intkey example client", version)]
struct Cli {
    /// Endpoint URL: the gateway (http://...) or, with --direct, a
    /// validator (tcp://host:port).
    #[arg(long, default_value = "http://localhost:8008")]
    url: String,

    /// Speak the binary protocol directly to a validator instead of the
    /// HTTP gateway.
    #[arg(long)]
    direct: bool,

    /// Private key file; defaults to ~/.sawtooth/keys/<user>.priv.
    #[arg(long)]
    key_file: Option<PathBuf>,

    /// Seconds to wait for the batch to commit; 0 submits without waiting.
    #[arg(long, default_value_t = 0)]
    wait: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every intkey entry.
    List,
    /// Show the value stored under a name.
    Show { name: String },
    /// Set a name to a value.
    Set { name: String, value: u32 },
    /// Increment a name by a value.
    Inc { name: String, value: u32 },
    /// Decrement a name by a value.
    Dec { name: String, value: u32 },
    /// Query the status of a submitted batch.
    Status { batch_id: String },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = if cli.direct {
        SawtoothBuilder::direct(&cli.url)
    } else {
        SawtoothBuilder::gateway(&cli.url)
    };
    if let Some(key_file) = &cli.key_file {
        builder = builder.key_file(key_file);
    }
    let client = builder.build(IntkeyCodec)?;

    match cli.command {
        Command::List => list(&client)?,
        Command::Show { name } => show(&client, &name)?,
        Command::Set { name, value } => submit(&client, cli.wait, "set", name, value)?,
        Command::Inc { name, value } => submit(&client, cli.wait, "inc", name, value)?,
        Command::Dec { name, value } => submit(&client, cli.wait, "dec", name, value)?,
        Command::Status { batch_id } => {
            let status = client
                .transport()
                .batch_status(&batch_id, cli.wait as u32)?;
            println!("{}: {:?}", batch_id, status);
        }
    }

    Ok(())
}

fn list(client: &Sawtooth<IntkeyCodec>) -> Result<(), Box<dyn std::error::Error>> {
    let mut entries = client.transport().state_entries(&address_prefix(), 0, false);
    while entries.advance()? {
        let entry = entries.current()?;
        for (name, value) in client.codec().decode_state(&entry.data)? {
            println!("{}: {}", name, value);
        }
    }
    Ok(())
}

fn show(client: &Sawtooth<IntkeyCodec>, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let entry = client.transport().state(&address(name))?;
    let values = client.codec().decode_state(&entry.data)?;
    match values.get(name) {
        Some(value) => println!("{}: {}", name, value),
        None => return Err(format!("{} is not set", name).into()),
    }
    Ok(())
}

fn submit(
    client: &Sawtooth<IntkeyCodec>,
    wait: u64,
    verb: &str,
    name: String,
    value: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let payload = IntkeyPayload {
        verb: verb.to_string(),
        name,
        value,
    };

    if wait > 0 {
        let batch_id = client.execute_payload_sync(&payload, wait, 5)?;
        println!("committed: {}", batch_id);
    } else {
        let batch_id = client.execute_payload(&payload)?;
        println!("submitted: {}", batch_id);
    }

    Ok(())
}

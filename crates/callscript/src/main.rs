//! Run a simulated GP records-request call from the terminal.
//!
//! Acts as the reference host for the call-script engine: loads the call
//! context from JSON, applies the documented defaults for anything the
//! context omits, then plays counterpart turns from a file or from stdin.
//!
//! # Examples
//!
//! ```sh
//! # Scripted run: one counterpart line per row
//! callscript --context call.json --turns gp_lines.txt
//!
//! # Interactive: type the GP's side, Ctrl-D to hang up
//! callscript --context call.json
//!
//! # Keep the audit transcript
//! callscript --context call.json --turns gp_lines.txt --transcript-out audit.json
//! ```
//!
//! Context JSON matches the [`CallContextBuilder`] field names:
//!
//! ```json
//! {
//!   "patient_name": "Jane Doe",
//!   "patient_age": "72",
//!   "chief_complaint": "chest pain"
//! }
//! ```

use callscript::prelude::*;
use clap::Parser;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

/// Run a simulated GP records-request call from the terminal.
#[derive(Parser)]
#[command(name = "callscript")]
struct Cli {
    // ── Call input ─────────────────────────────────────────────
    /// Path to the call context JSON.
    #[arg(long)]
    context: PathBuf,

    /// File with one counterpart utterance per line. Without it, turns are
    /// read interactively from stdin.
    #[arg(long)]
    turns: Option<PathBuf>,

    // ── Host-side defaults ─────────────────────────────────────
    /// Records email applied when the context omits one.
    #[arg(long, default_value = callscript::DEFAULT_RECORDS_EMAIL)]
    records_email: String,

    /// Relay callback number applied when the context omits one.
    #[arg(long, default_value = callscript::DEFAULT_RELAY_CALLBACK_NUMBER)]
    relay_callback: String,

    /// Hospital callback number applied when the context omits one.
    #[arg(long, default_value = callscript::DEFAULT_HOSPITAL_CALLBACK_NUMBER)]
    hospital_callback: String,

    // ── Output ─────────────────────────────────────────────────
    /// Write the audit transcript JSON here after the call.
    #[arg(long)]
    transcript_out: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let json = std::fs::read_to_string(&cli.context)
        .map_err(|e| format!("failed to read context file: {e}"))?;
    let mut builder: CallContextBuilder =
        serde_json::from_str(&json).map_err(|e| format!("invalid context JSON: {e}"))?;

    // Defaulting is the host's responsibility; the core never defaults
    // silently.
    builder.records_email.get_or_insert(cli.records_email);
    builder.relay_callback_number.get_or_insert(cli.relay_callback);
    builder
        .hospital_callback_number
        .get_or_insert(cli.hospital_callback);

    let context = builder.build().map_err(|e| e.to_string())?;

    let engine = Arc::new(ScriptEngine::gp_records());
    let mut call = engine.start_call(context).with_observer(LoggingObserver);

    let opening = call.open().map_err(|e| e.to_string())?;
    println!("agent> {}", opening.text);
    let request = call.request_records().map_err(|e| e.to_string())?;
    println!("agent> {}", request.text);

    let classifier = KeywordClassifier::new();

    match &cli.turns {
        Some(path) => {
            let lines = std::fs::read_to_string(path)
                .map_err(|e| format!("failed to read turns file: {e}"))?;
            for line in lines.lines().map(str::trim).filter(|l| !l.is_empty()) {
                println!("gp> {line}");
                if respond(&mut call, &classifier, line)? {
                    break;
                }
            }
        }
        None => {
            let stdin = std::io::stdin();
            loop {
                print!("gp> ");
                std::io::stdout().flush().ok();
                let mut line = String::new();
                let read = stdin
                    .lock()
                    .read_line(&mut line)
                    .map_err(|e| format!("failed to read stdin: {e}"))?;
                if read == 0 {
                    break; // EOF: the counterpart hung up.
                }
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if respond(&mut call, &classifier, line)? {
                    break;
                }
            }
        }
    }

    // Turns exhausted without agreement: close out the call.
    if call.state() != CallState::Ended {
        let closing = call
            .handle(CounterpartTurn::hangup())
            .map_err(|e| e.to_string())?;
        println!("agent> {}", closing.text);
    }

    println!(
        "--- call ended after {} transcript turn(s) ---",
        call.transcript().len()
    );

    if let Some(path) = &cli.transcript_out {
        call.transcript()
            .save_json(path)
            .map_err(|e| e.to_string())?;
        println!("transcript written to {}", path.display());
    }

    Ok(())
}

/// Resolve one counterpart line. Returns `true` when the call has ended.
fn respond(
    call: &mut CallSession,
    classifier: &KeywordClassifier,
    line: &str,
) -> Result<bool, String> {
    let turn = match classifier.classify(line) {
        Classification::Question(request) => CounterpartTurn::question(line, request),
        Classification::Agreement => CounterpartTurn::agreement(line),
        // Unrecognized content still goes through the policy, which
        // withholds and offers the callback number.
        Classification::Unclassified => {
            CounterpartTurn::question(line, FactRequest::new("unclassified"))
        }
    };

    let utterance = call.handle(turn).map_err(|e| e.to_string())?;
    println!("agent> {}", utterance.text);
    Ok(utterance.state == CallState::Ended)
}

use std::io::{stderr, stdout, BufWriter, Write};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use wallet_token_engine::{
    MemoryClientStore, MemoryTokenStore, MemoryTransactionLog, MemoryWalletStore, Monetary,
    PaymentEngine
};

#[tokio::main]
async fn main() -> Result<()> {
    let log_level = std::env::args().nth(1)
        .map(|level| parse_log_level(&level)).unwrap_or(LevelFilter::INFO);

    setup_logging(log_level);

    let engine = PaymentEngine::new(
        Arc::new(MemoryClientStore::new()),
        Arc::new(MemoryWalletStore::new()),
        Arc::new(MemoryTokenStore::new()),
        Arc::new(MemoryTransactionLog::new())
    );

    let client = engine.register("1032456789", "Maria Lopez", "maria@example.com", "+57 300 555 0101").await;

    engine.recharge(client.id, Monetary::from_str("500.00")?, None).await?;

    let issued = engine.issue_token(client.id, Monetary::from_str("200.00")?, "demo-session".to_string()).await?;
    // A real deployment hands {token, amount, client} to its delivery
    // collaborator here; the demo just logs the value.
    info!("Token {} for {} issued to {}, expires at {}", issued.token, issued.amount, issued.client.email, issued.expires_at);

    let receipt = engine.confirm_payment(&issued.token, "demo-session").await?;
    info!("Payment confirmed: {} -> {}", receipt.previous_balance, receipt.new_balance);

    match engine.confirm_payment(&issued.token, "demo-session").await {
        Err(error) => info!("Replayed confirm rejected as expected: {}", error.redact()),
        Ok(_) => anyhow::bail!("A replayed confirm must never debit twice")
    }

    engine.sweep_expired_tokens().await;

    write_statement_to_stdout(&engine, &client.name, client.id).await?;

    Ok(())
}

fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'info'", level);
            LevelFilter::INFO
        }
    }
}

fn setup_logging(level: LevelFilter) {
    // The statement goes to stdout, so logging stays on stderr.
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry()
        .with(terminal_log)
        .init();
}

async fn write_statement_to_stdout(engine: &PaymentEngine, name: &str, client_id: wallet_token_engine::ClientId) -> Result<()> {
    let balance = engine.balance(client_id).await?;
    let history = engine.transactions(client_id, 1, 20, None).await?;

    let mut output = BufWriter::new(stdout().lock());

    writeln!(output, "Statement for {name}, balance {balance}")?;
    writeln!(output, "kind,amount,description,created_at")?;

    for transaction in &history.transactions {
        writeln!(
            output,
            "{:?},{},{},{}",
            transaction.kind,
            transaction.amount,
            transaction.description,
            transaction.created_at
        )?;
    }

    output.flush()?;

    Ok(())
}

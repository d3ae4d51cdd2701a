//! Thin CLI driver for the ACME dns-01 protocol engine.
//!
//! Wires `KeyMaterial` → `DirectoryCache` → `AcmeSession`, prints the DNS
//! TXT record value to publish, and waits for the operator to press
//! Enter before submitting the challenge. The menu/prompt flow itself
//! carries no protocol logic — it only drives the library.
use acme_rfc8555::prelude::*;
use clap::{Parser, Subcommand};
use std::io::Write;

#[derive(Parser)]
#[command(name = "acme-client", about = "ACME dns-01 certificate client")]
struct Cli {
    /// Path to a TOML config file (see `Config`); falls back to built-in
    /// defaults plus the `ACME_DIRECTORY_URL`/`ACME_STORAGE_DIR` env vars.
    #[arg(long)]
    config: Option<String>,

    /// ACME directory URL, overriding the config
    #[arg(long)]
    directory: Option<String>,

    /// Directory under which the account key, account state, orders and
    /// certificates are stored, overriding the config
    #[arg(long)]
    storage_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Obtain a certificate for one or more domains via dns-01.
    Obtain {
        /// Domain names to include on the certificate
        domains: Vec<String>,
        /// Contact email for account registration
        #[arg(long)]
        email: Option<String>,
    },
    /// Re-fetch and print the current account status.
    FetchAccount,
    /// Deactivate the locally-known account (asks for confirmation).
    Deactivate,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path).await?,
        None => {
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };
    if let Some(directory) = cli.directory {
        config.directory_url = directory;
    }
    if let Some(storage_dir) = cli.storage_dir {
        config.storage_dir = storage_dir;
    }

    let store = FileStore::new(&config.storage_dir);

    let key = load_or_generate_key(&store).await?;
    let mut session = match store.load_account().await? {
        Some(account) if !account.url.is_empty() => {
            AcmeSession::resume_with_config(config.directory_url.clone(), key, account.url, &config)
        }
        _ => AcmeSession::with_config(config.directory_url.clone(), key, &config),
    };

    match cli.command {
        Command::Obtain { domains, email } => obtain(&mut session, &store, domains, email).await,
        Command::FetchAccount => fetch_account(&mut session, &store).await,
        Command::Deactivate => deactivate(&mut session, &store).await,
    }
}

async fn load_or_generate_key(store: &FileStore) -> Result<KeyMaterial> {
    if let Some(pem) = store.load_account_key().await? {
        return KeyMaterial::from_pkcs8_pem(&pem);
    }

    let key = KeyMaterial::generate()?;
    store.save_account_key(&key.to_pkcs8_pem()?).await?;
    Ok(key)
}

async fn ensure_registered(session: &mut AcmeSession, store: &FileStore, email: Option<String>) -> Result<()> {
    if session.account_url().is_some() {
        return Ok(());
    }

    let contacts: Vec<Contact> = email.into_iter().map(Contact::email).collect();
    let account = session.register_account(&contacts, true).await?;
    store.save_account(&account).await?;
    Ok(())
}

async fn obtain(
    session: &mut AcmeSession,
    store: &FileStore,
    domains: Vec<String>,
    email: Option<String>,
) -> Result<()> {
    ensure_registered(session, store, email).await?;

    let (order_url, order) = session.new_order(&domains).await?;
    store.save_order(&order_url, &order).await?;
    tracing::info!(order = %order_url, "order created");

    for authorization_url in &order.authorizations {
        let authorization = session.get_authorization(authorization_url).await?;
        let challenge = authorization
            .get_challenge("dns-01")
            .ok_or_else(|| AcmeError::protocol("authorization has no dns-01 challenge".to_string()))?;

        let txt_value = session.compute_dns_key_authorization(&challenge.token)?;
        println!(
            "Publish a TXT record for _acme-challenge.{}:\n  {}",
            authorization.identifier.value, txt_value
        );
        print!("Press Enter once the DNS record is published... ");
        std::io::stdout().flush().ok();
        let mut line = String::new();
        std::io::stdin().read_line(&mut line).ok();

        session.submit_challenge(&challenge.url).await?;
    }

    let order = session
        .poll_order(&order_url, 30, std::time::Duration::from_secs(3))
        .await?;
    if !order.is_ready() {
        return Err(AcmeError::state(format!(
            "order not ready after authorization: {}",
            order.status
        )));
    }

    let (order, private_key_pem) = session.finalize(&order, &domains).await?;
    store.save_order(&order_url, &order).await?;

    let order = session
        .poll_order(&order_url, 30, std::time::Duration::from_secs(3))
        .await?;
    if !order.is_valid() {
        return Err(AcmeError::state(format!(
            "order not valid after finalization: {}",
            order.status
        )));
    }

    let certificate_url = order
        .certificate
        .clone()
        .ok_or_else(|| AcmeError::state("valid order has no certificate URL".to_string()))?;
    let certificate_pem = session.download_certificate(&certificate_url).await?;
    store.save_certificate(&order_url, &certificate_pem).await?;

    println!("Certificate issued for: {}", domains.join(", "));
    println!("Leaf private key (PEM):\n{}", private_key_pem);
    Ok(())
}

async fn fetch_account(session: &mut AcmeSession, store: &FileStore) -> Result<()> {
    if session.account_url().is_none() {
        println!("No locally-known account yet.");
        return Ok(());
    }
    let account = session.fetch_account().await?;
    store.save_account(&account).await?;
    println!("Account status: {}", account.status);
    Ok(())
}

async fn deactivate(session: &mut AcmeSession, store: &FileStore) -> Result<()> {
    if session.account_url().is_none() {
        println!("No locally-known account to deactivate.");
        return Ok(());
    }

    print!("Deactivate account {}? This cannot be undone [y/N]: ", session.account_url().unwrap());
    std::io::stdout().flush().ok();
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer).ok();
    if !answer.trim().eq_ignore_ascii_case("y") {
        println!("Aborted.");
        return Ok(());
    }

    let account = session.deactivate_account().await?;
    store.save_account(&account).await?;
    println!("Account deactivated: {}", account.status);
    Ok(())
}

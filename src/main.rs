use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use modulr_keys::keypair::generate_keypair_core;
use modulr_keys::signing::{sign_message_core, verify_message_core, VerifyOutput};
use modulr_keys::{CommandResult, DerivationPath};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "modulr-keys")]
#[command(about = "Derive Ed25519 keypairs from BIP-39 mnemonics", long_about = None)]
struct Cli {
    /// Log every pipeline stage to stderr (overrides RUST_LOG)
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive a keypair (generates a 24-word mnemonic when none is given)
    Generate {
        /// Existing mnemonic phrase (quoted)
        #[arg(long, default_value = "")]
        mnemonic: String,

        /// Optional BIP-39 passphrase
        #[arg(long, default_value = "")]
        passphrase: String,

        /// Four hardened components, e.g. 44,7337,0,0 or m/44'/7337'/0'/0'
        #[arg(long)]
        path: Option<DerivationPath>,
    },

    /// Sign a message with a base64 PKCS#8 private key
    Sign {
        /// Private key from the `prv` field
        #[arg(long)]
        private_key: String,

        /// Message to sign (UTF-8 string)
        #[arg(long)]
        message: String,
    },

    /// Verify a base64 signature against a base58 public key
    Verify {
        /// Public key from the `pub` field
        #[arg(long)]
        public_key: String,

        /// Signature (base64)
        #[arg(long)]
        signature: String,

        /// Message that was signed (UTF-8 string)
        #[arg(long)]
        message: String,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("modulr_keys=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_result(result: &CommandResult) {
    print!("{}", result.output);
    println!();
    println!("{}", result.result);
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Generate {
            mnemonic,
            passphrase,
            path,
        } => {
            let result = generate_keypair_core(&mnemonic, &passphrase, path)
                .context("keypair derivation failed")?;
            print_result(&result);
        }
        Commands::Sign {
            private_key,
            message,
        } => {
            let result =
                sign_message_core(&message, &private_key).context("signing failed")?;
            print_result(&result);
        }
        Commands::Verify {
            public_key,
            signature,
            message,
        } => {
            let result = verify_message_core(&message, &signature, &public_key)
                .context("verification failed")?;
            print_result(&result);
            let verdict: VerifyOutput = serde_json::from_str(&result.result)?;
            if !verdict.valid {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use mailvet::probe::DEFAULT_MAIL_FROM;
use mailvet::{PacingRange, ProbeOptions, VerifyConfig};

#[derive(Parser)]
#[command(name = "mailvet-cli", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,

    #[command(flatten)]
    pub verify: VerifyArgs,

    /// fichier journal (ajout en fin de fichier)
    #[arg(long, global = true, default_value = "email_verification.log")]
    pub log_file: PathBuf,

    /// trace le dialogue SMTP complet dans le journal
    #[arg(long, global = true)]
    pub smtp_debug: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// vérifie une seule adresse
    Check {
        email: String,
        /// format de sortie (human|json)
        #[arg(long, default_value = "human")]
        format: String,
    },
    /// vérifie une colonne d'un fichier CSV
    Batch {
        /// fichier CSV d'entrée (ligne d'en-tête requise)
        #[arg(long, default_value = "input_emails.csv")]
        input: PathBuf,
        /// nom de la colonne contenant les adresses
        #[arg(long, default_value = "Email")]
        column: String,
        /// fichier CSV de sortie
        #[arg(long, default_value = "verified_emails.csv")]
        output: PathBuf,
    },
}

#[derive(Args)]
pub struct VerifyArgs {
    /// timeout DNS (s)
    #[arg(long, global = true, default_value_t = 10)]
    pub dns_timeout: u64,

    /// timeout de connexion SMTP (s)
    #[arg(long, global = true, default_value_t = 10)]
    pub connect_timeout: u64,

    /// timeout par commande SMTP (s)
    #[arg(long, global = true, default_value_t = 10)]
    pub command_timeout: u64,

    /// pause minimale entre deux adresses (s)
    #[arg(long, global = true, default_value_t = 1.0)]
    pub min_delay: f64,

    /// pause maximale entre deux adresses (s)
    #[arg(long, global = true, default_value_t = 5.0)]
    pub max_delay: f64,

    /// enveloppe MAIL FROM
    #[arg(long = "from", global = true, default_value = DEFAULT_MAIL_FROM)]
    pub mail_from: String,

    /// nom utilisé pour EHLO/HELO (par défaut le domaine de --from)
    #[arg(long, global = true)]
    pub helo: Option<String>,

    /// port SMTP
    #[arg(long, global = true, default_value_t = 25)]
    pub port: u16,

    /// nombre maximum d'MX tentés quand le précédent est injoignable
    #[arg(long, global = true, default_value_t = 1)]
    pub max_hosts: usize,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

impl VerifyArgs {
    pub fn to_config(&self) -> Result<VerifyConfig> {
        let pacing = PacingRange::new(
            seconds("--min-delay", self.min_delay)?,
            seconds("--max-delay", self.max_delay)?,
        );
        if pacing.min > pacing.max {
            bail!("--min-delay must not exceed --max-delay");
        }
        if self.dns_timeout == 0 || self.connect_timeout == 0 || self.command_timeout == 0 {
            bail!("timeouts must be at least 1 second");
        }
        if self.max_hosts == 0 {
            bail!("--max-hosts must be at least 1");
        }

        let probe = ProbeOptions {
            port: self.port,
            helo_domain: self.helo.clone(),
            mail_from: self.mail_from.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout),
            command_timeout: Duration::from_secs(self.command_timeout),
            max_hosts: self.max_hosts,
        };
        Ok(VerifyConfig::new(
            Duration::from_secs(self.dns_timeout),
            probe,
            pacing,
        ))
    }
}

fn seconds(flag: &str, value: f64) -> Result<Duration> {
    match Duration::try_from_secs_f64(value) {
        Ok(d) => Ok(d),
        Err(_) => bail!("{flag} expects a non-negative number of seconds, got {value}"),
    }
}

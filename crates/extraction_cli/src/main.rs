mod console;

use anyhow::{Result, anyhow, bail};
use bpa_extraction::models::config::DEFAULT_API_URL;
use bpa_extraction::{
    ClientConfig, Cnes, Competencia, ConnectionStatus, Credential, ExtractionOrchestrator,
    ExtractionRequest, FACILITIES, HttpBackend, TrackerConfig,
};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "bpa-extract", version, about = "Extração BiServer (bi.eSUS) para BPA")]
struct Cli {
    /// Base URL of the BPA API
    #[arg(long, env = "BPA_API_URL", default_value = DEFAULT_API_URL, global = true)]
    api_url: String,

    /// Session token sent as `Authorization: Bearer`
    #[arg(long, env = "BPA_API_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract, separate and save one facility's production for a period
    Extract {
        /// Facility CNES (7 digits)
        #[arg(long)]
        cnes: Cnes,

        /// Period as YYYYMM, defaults to the current month
        #[arg(long)]
        competencia: Option<Competencia>,

        /// Maximum number of records (all when omitted)
        #[arg(long)]
        limit: Option<u32>,

        #[arg(long, default_value_t = 0)]
        offset: u32,

        /// Skip the pauses between phases
        #[arg(long)]
        no_pause: bool,
    },
    /// Test the connection to BiServer
    Check,
    /// List the registered facilities
    Facilities,
}

impl Cli {
    fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::new(self.api_url.clone());
        match &self.token {
            Some(token) => config.with_token(token.clone()),
            None => config,
        }
    }

    fn credential(&self) -> Result<Credential> {
        self.client_config()
            .credential()
            .ok_or_else(|| anyhow!("No session token: pass --token or set BPA_API_TOKEN"))
    }

    fn backend(&self) -> Result<HttpBackend> {
        Ok(HttpBackend::new(&self.client_config())?)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Command::Facilities => {
            println!("🏥 Estabelecimentos cadastrados");
            for facility in FACILITIES {
                println!(
                    "  {}  {:<22} {:<20} {}",
                    facility.cnes, facility.acronym, facility.kind, facility.name
                );
            }
            Ok(())
        }
        Command::Check => {
            let credential = cli.credential()?;
            let tracker = ExtractionOrchestrator::new(cli.backend()?);
            println!("🔌 Testando conexão com BiServer em {}...", cli.api_url);
            match tracker.check_connection(&credential).await {
                ConnectionStatus::Connected { mock: true, .. } => {
                    println!("ℹ️  Modo MOCK ativo - usando dados simulados para desenvolvimento");
                    Ok(())
                }
                ConnectionStatus::Connected { .. } => {
                    println!("✅ Conexão com BiServer estabelecida!");
                    Ok(())
                }
                ConnectionStatus::Failed(message) => bail!("Erro de conexão: {}", message),
            }
        }
        Command::Extract {
            cnes,
            competencia,
            limit,
            offset,
            no_pause,
        } => {
            let credential = cli.credential()?;
            let competencia = competencia.unwrap_or_else(Competencia::current);

            let mut request = ExtractionRequest::new(cnes.clone(), competencia).with_offset(*offset);
            if let Some(limit) = limit {
                request = request.with_limit(*limit);
            }

            let mut config = TrackerConfig::default();
            if *no_pause {
                config.connect_pause_ms = 0;
                config.step_pause_ms = 0;
            }

            println!(
                "🚀 Extração BiServer: CNES {} - {}",
                request.cnes,
                request.competencia.label()
            );
            let mut tracker = ExtractionOrchestrator::new(cli.backend()?)
                .with_config(config)
                .with_observer(console::live_console());

            let result = tracker.run(&request, &credential).await;
            console::print_summary(&result, tracker.state());

            if result.success {
                Ok(())
            } else {
                bail!("Extração falhou: {}", result.summary_message)
            }
        }
    }
}

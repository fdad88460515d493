use campaign_provisioner::{
    init_telemetry, AccessOutcome, HttpPageFetcher, HttpTracker, ProvisionError, ProvisionOptions,
    ProvisionReport, Provisioner, ProvisionerConfig, TrackerClient,
};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "provision-campaign")]
#[command(about = "Create a tracker campaign whose landing is a copy of the domain's front page")]
#[command(long_about = "Checks the tracker for an existing campaign with the same name or key, \
                       uploads https://<domain> as an integrated landing, creates a CPC campaign \
                       routed to it and optionally grants USER_ID_FOR_OPEN_ACCESS modify access. \
                       Requires TRACKER_ENTRYPOINT and TRACKER_API_KEY.")]
struct Cli {
    /// Domain to provision, e.g. example.com
    domain: Option<String>,

    /// Configuration file
    #[arg(long, value_name = "PATH", help = "Configuration file (default: campaign-provisioner.toml if present)")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            // Clap exits with 2, which is taken by ConfigurationError
            let _ = e.print();
            return fail(ProvisionError::Usage("invalid command line".into()));
        }
    };

    match run(cli) {
        Ok(report) => {
            print_report(&report);
            ExitCode::SUCCESS
        }
        Err(err) => fail(err),
    }
}

fn fail(err: ProvisionError) -> ExitCode {
    eprintln!("❌ {err}");
    if let Some(hint) = err.hint() {
        eprintln!("🔧 {hint}");
    }
    ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1))
}

fn run(cli: Cli) -> Result<ProvisionReport, ProvisionError> {
    ProvisionerConfig::load_env_file()?;
    let config = ProvisionerConfig::load(cli.config.as_deref())?;
    let tracker_settings = config.tracker_settings()?;

    let domain = match cli.domain.as_deref().map(str::trim) {
        Some(domain) if !domain.is_empty() => domain.to_string(),
        _ => {
            let _ = Cli::command().print_help();
            println!();
            return Err(ProvisionError::Usage("missing <DOMAIN> argument".into()));
        }
    };

    if let Err(e) = init_telemetry(&config.observability) {
        eprintln!("⚠️  Logging disabled: {e}");
    }

    let tracker = HttpTracker::new(TrackerClient::new(&tracker_settings)?);
    let fetcher = HttpPageFetcher::new(
        &config.source.page_url_template,
        tracker_settings.timeout,
        tracker_settings.max_redirects,
    )?;
    let provisioner = Provisioner::new(
        Arc::new(tracker),
        Arc::new(fetcher),
        ProvisionOptions::from_config(&config),
    );

    let runtime = tokio::runtime::Runtime::new().map_err(|source| ProvisionError::Io {
        context: "starting async runtime".into(),
        source,
    })?;
    runtime.block_on(provisioner.run(&domain))
}

fn print_report(report: &ProvisionReport) {
    println!("✅ Campaign provisioned for {}", report.domain);
    println!("   Campaign id:   {} (key {})", report.campaign_id, report.keyword);
    println!("   Landing id:    {} ({})", report.landing_id, report.landing_file);
    match &report.access {
        AccessOutcome::Skipped => println!("   Access:        not requested"),
        AccessOutcome::AlreadyGranted { user_id } => {
            println!("   Access:        user {user_id} already had modify access")
        }
        AccessOutcome::Granted { user_id, .. } => {
            println!("   Access:        modify access granted to user {user_id}")
        }
    }
}

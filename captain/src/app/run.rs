//! Command dispatch

use tracing::debug;

use crate::app::cli::{Cli, Command};
use crate::app::context::CaptainContext;
use crate::app::options::{CreateOptions, UpgradeOptions};
use crate::app::{create, get_manifest, upgrade};
use crate::errors::CaptainError;
use crate::utils::version_info;
use crate::watch::TokioClock;

/// Run the parsed command, returning what should go to stdout
pub async fn run(cli: Cli) -> Result<Option<String>, CaptainError> {
    if let Command::Version = cli.command {
        let version = version_info();
        return Ok(Some(format!(
            "kubectl-captain: {} (git {}, built {})\n",
            version.version, version.git_hash, version.build_time
        )));
    }

    let ctx = CaptainContext::new(&cli.kubeconfig_options(), cli.namespace.clone()).await?;
    let clock = TokioClock::new();
    debug!("Running {:?}", cli.command);

    match &cli.command {
        Command::Create(args) => {
            let options = CreateOptions::from(args);
            create::run(&ctx.client, &clock, &args.name, &ctx.namespace, &options).await?;
            Ok(None)
        }
        Command::Upgrade(args) => {
            let options = UpgradeOptions::from(args);
            upgrade::run(&ctx.client, &clock, &ctx.id(&args.name), &options).await?;
            Ok(None)
        }
        Command::GetManifest { name } => {
            let manifest = get_manifest::run(&ctx.client, &ctx.id(name)).await?;
            Ok(Some(manifest))
        }
        Command::Version => Ok(None),
    }
}

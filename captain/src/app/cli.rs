//! Command line definition

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::app::options::{CreateOptions, SourceOptions, UpgradeOptions, WaitOptions};
use crate::kube::KubeconfigOptions;
use crate::logs::{LogLevel, LogOptions};
use crate::values::ValueOptions;

/// kubectl plugin managing HelmRequests
#[derive(Parser, Debug)]
#[command(name = "kubectl-captain")]
#[command(about = "Create, upgrade and inspect HelmRequests", long_about = None)]
pub struct Cli {
    /// Namespace of the HelmRequest
    #[arg(short, long, global = true)]
    pub namespace: Option<String>,

    /// Path to the kubeconfig file
    #[arg(long, global = true)]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use
    #[arg(long, global = true)]
    pub context: Option<String>,

    /// Log level, `RUST_LOG` takes precedence
    #[arg(long, global = true, value_enum, ignore_case = true, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn kubeconfig_options(&self) -> KubeconfigOptions {
        KubeconfigOptions {
            path: self.kubeconfig.clone(),
            context: self.context.clone(),
        }
    }

    pub fn log_options(&self) -> LogOptions {
        LogOptions {
            log_level: self.log_level,
            json_format: self.log_json,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a helmrequest
    #[command(after_help = "Example:\n  kubectl captain create foo --chart=stable/nginx-ingress -v 1.5.0 --set=a=b -f=values.yaml")]
    Create(CreateArgs),

    /// Upgrade a helmrequest
    #[command(after_help = "Example:\n  kubectl captain upgrade foo -n default -v 1.5.0 --set=a=b -f=values.yaml")]
    Upgrade(UpgradeArgs),

    /// Get chart manifest for a helmrequest
    #[command(after_help = "Example:\n  kubectl captain get-manifest foo -n default > foo.yaml")]
    GetManifest {
        /// HelmRequest name
        name: String,
    },

    /// Print the version of kubectl-captain
    Version,
}

/// `-f` and `--set`
#[derive(Args, Debug, Clone)]
pub struct ValueArgs {
    /// Custom values, `key=value[,key=value]`
    #[arg(short, long = "set")]
    pub set: Vec<String>,

    /// Values in a YAML file or a URL (can specify multiple)
    #[arg(short = 'f', long = "values")]
    pub values: Vec<String>,

    /// ConfigMap to obtain values from, it must contain a key called 'values.yaml'
    #[arg(long = "configmap")]
    pub config_map: Option<String>,
}

impl From<&ValueArgs> for ValueOptions {
    fn from(args: &ValueArgs) -> Self {
        ValueOptions {
            value_files: args.values.clone(),
            values: args.set.clone(),
        }
    }
}

/// `--source-*`
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Chart source type: CHART, HTTP or OCI
    #[arg(long, default_value = "")]
    pub source_type: String,

    /// URL of the http(s) endpoint or repo of the oci artifact
    #[arg(long, default_value = "")]
    pub source_address: String,

    /// Secret holding the credentials of the source
    #[arg(long, default_value = "")]
    pub source_secret_ref: String,
}

impl From<&SourceArgs> for SourceOptions {
    fn from(args: &SourceArgs) -> Self {
        SourceOptions {
            source_type: args.source_type.clone(),
            address: args.source_address.clone(),
            secret_ref: args.source_secret_ref.clone(),
        }
    }
}

/// `--wait` and friends
#[derive(Args, Debug, Clone)]
pub struct WaitArgs {
    /// Wait for the helmrequest to be synced
    #[arg(short, long)]
    pub wait: bool,

    /// Timeout for the wait in seconds, 0 waits forever
    #[arg(short, long, default_value_t = 0)]
    pub timeout: u64,

    /// Failed observations tolerated while waiting
    #[arg(long)]
    pub failure_tolerance: Option<u32>,
}

impl From<&WaitArgs> for WaitOptions {
    fn from(args: &WaitArgs) -> Self {
        WaitOptions {
            wait: args.wait,
            timeout_secs: args.timeout,
            failure_tolerance: args.failure_tolerance,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    /// HelmRequest name
    pub name: String,

    /// Chart name, format: <repo>/<chart>
    #[arg(short, long)]
    pub chart: String,

    /// Chart version
    #[arg(short, long, default_value = "")]
    pub version: String,

    #[command(flatten)]
    pub values: ValueArgs,

    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub wait: WaitArgs,
}

impl From<&CreateArgs> for CreateOptions {
    fn from(args: &CreateArgs) -> Self {
        CreateOptions {
            chart: args.chart.clone(),
            version: args.version.clone(),
            values: (&args.values).into(),
            config_map: args.values.config_map.clone(),
            source: (&args.source).into(),
            wait: (&args.wait).into(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct UpgradeArgs {
    /// HelmRequest name
    pub name: String,

    /// Chart version
    #[arg(short, long)]
    pub version: Option<String>,

    /// Chart repo replacing the current one
    #[arg(short, long)]
    pub repo: Option<String>,

    /// Replace the stored values instead of merging into them
    #[arg(long)]
    pub replace_values: bool,

    #[command(flatten)]
    pub values: ValueArgs,

    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub wait: WaitArgs,
}

impl From<&UpgradeArgs> for UpgradeOptions {
    fn from(args: &UpgradeArgs) -> Self {
        UpgradeOptions {
            version: args.version.clone(),
            repo: args.repo.clone(),
            values: (&args.values).into(),
            replace_values: args.replace_values,
            config_map: args.values.config_map.clone(),
            source: (&args.source).into(),
            wait: (&args.wait).into(),
        }
    }
}

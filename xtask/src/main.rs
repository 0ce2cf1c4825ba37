use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{exit, Command};

use clap::{Parser, Subcommand, ValueEnum};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Parser)]
#[command(name = "xtask", about = "CI checks and Lambda packaging for this workspace")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run fmt, clippy and tests
    Ci {
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
    /// Build both custom resource handlers for `provided.al2023` and zip
    /// each binary as `bootstrap`
    LambdaPackage {
        #[arg(long, env = "LAMBDA_TARGET", default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        #[arg(long, default_value = "dist")]
        dist_dir: PathBuf,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    Lint,
    Test,
    Check,
}

/// Binary name and the zip it ships in.
const LAMBDA_ARTIFACTS: [(&str, &str); 2] = [
    ("gateway_lambda", "gateway.zip"),
    ("file_share_lambda", "file_share.zip"),
];

fn cargo(args: &[&str]) -> Result<(), String> {
    eprintln!("+ cargo {}", args.join(" "));
    let status = Command::new("cargo")
        .args(args)
        .status()
        .map_err(|error| format!("failed to start cargo: {error}"))?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("cargo {} exited with {status}", args[0]))
    }
}

fn ci(job: CiJob) -> Result<(), String> {
    if matches!(job, CiJob::Lint | CiJob::Check) {
        cargo(&["fmt", "--all", "--", "--check"])?;
        cargo(&["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"])?;
    }
    if matches!(job, CiJob::Test | CiJob::Check) {
        cargo(&["test", "--workspace"])?;
    }
    Ok(())
}

fn lambda_package(target: &str, dist_dir: &Path) -> Result<(), String> {
    let mut args = vec!["build", "--release", "-p", "sgw_provisioning_lambda", "--target", target];
    for (bin, _) in LAMBDA_ARTIFACTS {
        args.extend(["--bin", bin]);
    }
    cargo(&args)?;

    fs::create_dir_all(dist_dir)
        .map_err(|error| format!("cannot create {}: {error}", dist_dir.display()))?;
    let build_dir = Path::new("target").join(target).join("release");
    for (bin, zip_name) in LAMBDA_ARTIFACTS {
        let zip_path = dist_dir.join(zip_name);
        write_bootstrap_zip(&build_dir.join(bin), &zip_path)?;
        eprintln!("packaged {}", zip_path.display());
    }
    Ok(())
}

fn write_bootstrap_zip(binary: &Path, zip_path: &Path) -> Result<(), String> {
    let bytes =
        fs::read(binary).map_err(|error| format!("cannot read {}: {error}", binary.display()))?;
    let file = File::create(zip_path)
        .map_err(|error| format!("cannot create {}: {error}", zip_path.display()))?;

    let write = || -> zip::result::ZipResult<()> {
        let mut zip = ZipWriter::new(file);
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o755);
        zip.start_file("bootstrap", options)?;
        zip.write_all(&bytes)?;
        zip.finish()?;
        Ok(())
    };
    write().map_err(|error| format!("cannot write {}: {error}", zip_path.display()))
}

fn main() {
    let result = match Cli::parse().command {
        Commands::Ci { job } => ci(job),
        Commands::LambdaPackage { target, dist_dir } => lambda_package(&target, &dist_dir),
    };
    if let Err(message) = result {
        eprintln!("error: {message}");
        exit(1);
    }
}

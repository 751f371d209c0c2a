use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use ffplan::cli::{self, Commands};
use ffplan::config::PolicyConfig;
use ffplan::engine::{self, QUALITY_PROFILES};
use ffplan::probe;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::parse();

    let policy = match &cli.policy {
        Some(path) => PolicyConfig::load_from(path)?,
        None => PolicyConfig::load()?,
    };

    match cli.command {
        Commands::Plan { probe, json } => plan_one(&probe, &policy, json),
        Commands::Scan { directory } => {
            scan(&directory.unwrap_or_else(|| PathBuf::from(".")), &policy)
        }
        Commands::Profiles => {
            for profile in QUALITY_PROFILES {
                println!(
                    "{:<20} {}x{} @ {} kbps",
                    profile.label, profile.width, profile.height, profile.baseline_kbps
                );
            }
            Ok(())
        }
        Commands::InitConfig => init_config(),
    }
}

fn plan_one(probe_path: &Path, policy: &PolicyConfig, json: bool) -> Result<()> {
    let media = probe::load_probe(probe_path)
        .with_context(|| format!("Failed to load probe document: {}", probe_path.display()))?;
    let decision = engine::plan(&media, policy);

    if json {
        println!("{}", serde_json::to_string_pretty(&decision)?);
        return Ok(());
    }

    for line in &decision.log {
        println!("{line}");
    }
    if decision.should_process {
        println!();
        println!("ffmpeg -i <input> {} <output{}>",
            decision.command_line(),
            decision.output_extension.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

fn scan(directory: &Path, policy: &PolicyConfig) -> Result<()> {
    let mut transcode = 0usize;
    let mut skip = 0usize;

    for entry in WalkDir::new(directory)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
    {
        let media = match probe::load_probe(entry.path()) {
            Ok(media) => media,
            Err(err) => {
                warn!(path = %entry.path().display(), %err, "skipping unreadable probe document");
                continue;
            }
        };
        let decision = engine::plan(&media, policy);
        let verdict = if decision.should_process {
            transcode += 1;
            "transcode"
        } else {
            skip += 1;
            "skip"
        };
        println!("{:<9} {}", verdict, entry.path().display());
    }

    println!();
    println!("{transcode} to transcode, {skip} to skip");
    Ok(())
}

fn init_config() -> Result<()> {
    let path = PolicyConfig::config_path()?;
    if PolicyConfig::exists() {
        println!("Policy file already exists: {}", path.display());
    } else {
        PolicyConfig::default().save()?;
        println!("Created default policy: {}", path.display());
    }
    Ok(())
}

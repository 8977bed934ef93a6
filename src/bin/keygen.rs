//! hescore-keygen: generate a BFV key bundle for match scoring
//!
//! Writes secret, public, relinearization and Galois keys into the output
//! directory, plus a metadata.json summary of the profile.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Parser;
use eyre::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use hescore::keys::{KeyBundle, KEY_FILES};
use hescore::math::GaussianSampler;
use hescore::params::{SchemeParameters, SYSTEM_RING_DEGREE};

#[derive(Parser)]
#[command(name = "hescore-keygen")]
#[command(about = "Generate BFV keys for privacy-preserving match scoring")]
#[command(version)]
struct Args {
    /// Output directory for the key files
    #[arg(long, default_value = "keys")]
    output_dir: PathBuf,

    /// Ring degree (2048, 4096, 8192, 16384 or 32768)
    #[arg(long, default_value_t = SYSTEM_RING_DEGREE)]
    ring_dim: usize,

    /// Random seed for deterministic key generation (testing only)
    #[arg(long)]
    seed: Option<u64>,

    /// Reload the written bundle and check it against the secret key
    #[arg(long)]
    verify: bool,
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("hescore key generation");
    info!("Output directory: {}", args.output_dir.display());
    info!("Ring dimension: {}", args.ring_dim);

    let params = SchemeParameters::for_degree(args.ring_dim)
        .with_context(|| format!("Unsupported ring dimension {}", args.ring_dim))?;
    params
        .validate()
        .map_err(|e| eyre::eyre!("Invalid parameters: {}", e))?;

    let total_start = Instant::now();

    let mut sampler = match args.seed {
        Some(seed) => {
            info!("Using deterministic seed {} (not for production keys)", seed);
            GaussianSampler::with_seed(params.sigma, seed)
        }
        None => GaussianSampler::from_entropy(params.sigma),
    };

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message("Generating keys...");
    pb.enable_steady_tick(Duration::from_millis(100));

    let bundle = KeyBundle::generate(&params, &mut sampler)
        .with_context(|| "Failed to generate key bundle")?;
    pb.finish_with_message("Keys generated");
    info!("Generation time: {:.2?}", total_start.elapsed());

    bundle
        .save(&args.output_dir)
        .with_context(|| format!("Failed to write keys to {}", args.output_dir.display()))?;

    if args.verify {
        info!("Verifying bundle...");
        let loaded = KeyBundle::load(&args.output_dir, &params)
            .with_context(|| "Failed to reload key bundle")?;
        loaded
            .validate()
            .with_context(|| "Key bundle failed validation")?;
        info!("Bundle verified");
    }

    save_metadata(&args.output_dir, &params, &bundle)?;

    println!();
    println!("=== Key Generation Complete ===");
    println!("Output directory: {}", args.output_dir.display());
    println!("Key id: {}", bundle.key_id);
    println!("Ring dimension: {}", params.ring_degree);
    println!("Plain modulus: {}", params.plain_modulus);
    println!("Galois elements: {}", bundle.galois_keys.keys.len());
    for name in KEY_FILES {
        let size = fs::metadata(args.output_dir.join(name))?.len();
        println!("{}: {:.2} KB", name, size as f64 / 1024.0);
    }
    println!("Total time: {:.2?}", total_start.elapsed());

    Ok(())
}

fn save_metadata(output_dir: &Path, params: &SchemeParameters, bundle: &KeyBundle) -> Result<()> {
    #[derive(Serialize)]
    struct Metadata {
        key_id: String,
        profile_fingerprint: String,
        profile_version: u16,
        ring_dim: usize,
        moduli: Vec<u64>,
        plaintext_modulus: u64,
        gadget_base: u64,
        gadget_len: usize,
        galois_elements: Vec<usize>,
    }

    let metadata = Metadata {
        key_id: bundle.key_id.to_string(),
        profile_fingerprint: hex::encode(params.fingerprint()),
        profile_version: params.version,
        ring_dim: params.ring_degree,
        moduli: params.moduli.clone(),
        plaintext_modulus: params.plain_modulus,
        gadget_base: params.gadget_base,
        gadget_len: params.gadget_len,
        galois_elements: bundle.galois_keys.elements(),
    };

    let meta_path = output_dir.join("metadata.json");
    let meta_file = File::create(&meta_path)?;
    serde_json::to_writer_pretty(meta_file, &metadata)?;

    info!("Metadata saved to {}", meta_path.display());
    Ok(())
}

use anyhow::Result;
use clap::Parser;
use log::{debug, info};
use std::collections::HashSet;
use std::path::PathBuf;

/// Config docgen - Generate reStructuredText reference pages for configurable attributes
#[derive(Parser, Debug)]
#[command(name = "config-docgen")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Manifest file, or directory scanned for manifests
    #[arg(value_name = "MANIFEST_PATH")]
    pub manifest_path: PathBuf,

    /// Directory receiving one <name>.rst per target
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        default_value = "source/config/options"
    )]
    pub output_dir: PathBuf,

    /// Preamble paragraph placed before every document, overriding manifest preambles
    #[arg(long = "preamble", value_name = "TEXT")]
    pub preamble: Option<String>,

    /// Print documents to stdout instead of writing files
    #[arg(long = "stdout")]
    pub stdout: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.manifest_path.exists() {
        anyhow::bail!(
            "Manifest path does not exist: {}",
            args.manifest_path.display()
        );
    }

    if args.output_dir.is_file() {
        anyhow::bail!(
            "Output path is a file, not a directory: {}",
            args.output_dir.display()
        );
    }

    info!("Manifest path: {}", args.manifest_path.display());
    if args.stdout {
        info!("Output: stdout");
    } else {
        info!("Output directory: {}", args.output_dir.display());
    }

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    use crate::manifest::{LoadedManifest, ManifestLoader};
    use crate::renderer::render_document;
    use crate::scanner::ManifestScanner;
    use crate::writer::{touch_marker, write_document};

    info!("Starting configuration documentation generation...");

    // Step 1: Collect manifest files
    let manifest_files = if args.manifest_path.is_dir() {
        info!("Scanning manifest directory...");
        let scan_result = ManifestScanner::new(args.manifest_path.clone()).scan()?;
        for warning in &scan_result.warnings {
            log::warn!("{}", warning);
        }
        scan_result.manifest_files
    } else {
        vec![args.manifest_path.clone()]
    };

    info!("Found {} manifests", manifest_files.len());
    if manifest_files.is_empty() {
        anyhow::bail!("No manifests found in {}", args.manifest_path.display());
    }

    // Step 2: Load manifests; any broken definition aborts the run
    let mut targets: Vec<LoadedManifest> = Vec::new();
    for result in ManifestLoader::load_files(&manifest_files) {
        targets.push(result?);
    }

    let mut names = HashSet::new();
    for target in &targets {
        if !names.insert(target.name.as_str()) {
            anyhow::bail!(
                "Documentation target '{}' is defined more than once (again in {})",
                target.name,
                target.path.display()
            );
        }
    }

    // Step 3: Marker file for build tooling
    if !args.stdout {
        let marker = touch_marker(&args.output_dir)?;
        debug!("Touched {}", marker.display());
    }

    // Step 4: Render and emit each target
    for target in &targets {
        let preamble = args.preamble.as_deref().or(target.preamble.as_deref());
        info!("Rendering target {} ({})", target.name, target.application.name());
        let document = render_document(&target.application, preamble)?;

        if args.stdout {
            print!("{}", document);
        } else {
            let path = write_document(&args.output_dir, &target.name, &document)?;
            info!("Wrote {}", path.display());
        }
    }

    info!("Generation complete!");
    info!("  - Targets rendered: {}", targets.len());

    Ok(())
}

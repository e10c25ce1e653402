// extractor - chunk mesh extractor
// Entry point for:
// - single chunk extraction (pointer block -> vertices -> triparts -> OBJ)
// - batch extraction of every chunk listed in a JSON manifest

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use blinx_extractor::address::parse_number;
use blinx_extractor::extract::{create_output, open_image, write_batch, write_material_library};
use blinx_extractor::manifest::Manifest;
use blinx_extractor::settings::Settings;
use blinx_extractor::{Chunk, ChunkHeader, MaterialList, ObjWriter, Translation, Vec3};
use blinx_shared::config::Config;
use blinx_shared::log::{initialize_logging, map_log_level};
use blinx_shared::{CONFIG_ENV_PREFIX, DEFAULT_CONFIG};

#[derive(Parser, Debug)]
#[command(name = "extractor")]
#[command(about = "Extract chunk meshes from an executable image as Wavefront OBJ")]
#[command(version)]
struct Cli {
    /// Configuration file path (optional; defaults apply when missing)
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    config: String,

    /// Console log level override (0=Minimum, 1=Warnings, 2=Detail, 3=Full/Debug, 4=Trace)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<i32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a single chunk
    Chunk(ChunkArgs),
    /// Decode every chunk listed in a manifest into one OBJ file
    Batch(BatchArgs),
}

#[derive(Args, Debug)]
struct ChunkArgs {
    /// Executable image
    #[arg(short = 'x', long = "xbe")]
    xbe: PathBuf,

    /// Section the chunk lives in
    #[arg(short = 's', long = "section")]
    section: String,

    /// File offset of the chunk entry (used for naming)
    #[arg(long = "offset", value_parser = parse_offset)]
    offset: u32,

    /// Virtual address of the chunk's pointer block
    #[arg(long = "block", value_parser = parse_block)]
    block: i32,

    /// World coordinates of the chunk (x,y,z)
    #[arg(long = "world", default_value = "0,0,0", allow_hyphen_values = true)]
    world: Vec3,

    /// Coordinate offset inherited from parent nodes (x,y,z)
    #[arg(long = "parent", default_value = "0,0,0", allow_hyphen_values = true)]
    parent: Vec3,

    /// Texture list, one material name per line
    #[arg(short = 't', long = "texlist")]
    texlist: Option<PathBuf>,

    /// Output OBJ file (default: <chunk name>.obj)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Only decode and log the pointer block
    #[arg(long = "header-only")]
    header_only: bool,

    /// Keep chunk-local vertex coordinates
    #[arg(long = "local")]
    local: bool,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// JSON manifest listing the chunks
    #[arg(short = 'm', long = "manifest")]
    manifest: PathBuf,

    /// Output OBJ file (default: <image name>.obj next to the manifest)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,
}

fn parse_offset(input: &str) -> Result<u32, String> {
    parse_number(input).ok_or_else(|| format!("Invalid offset '{input}'"))
}

fn parse_block(input: &str) -> Result<i32, String> {
    let value = parse_offset(input)?;
    i32::try_from(value).map_err(|_| format!("Block address out of range '{input}'"))
}

fn load_settings(path: &str) -> anyhow::Result<Settings> {
    let mut config = Config::new(CONFIG_ENV_PREFIX);
    let loaded = config.set_source(path);
    let settings = Settings::from_config(&config)
        .with_context(|| format!("Invalid configuration {path}"))?;
    if !loaded {
        // Logging is not up yet.
        eprintln!(
            "Configuration file {} not found, using defaults",
            config.filename()
        );
    }
    Ok(settings)
}

fn init_logging(settings: &Settings, log_level: Option<i32>) {
    let console_level = map_log_level(log_level.unwrap_or(settings.log_level));
    initialize_logging(settings.logs_dir.as_deref(), console_level);
}

fn load_materials(path: Option<&Path>) -> anyhow::Result<Option<MaterialList>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let materials = MaterialList::load(path)
        .with_context(|| format!("Failed to read texlist {}", path.display()))?;
    if materials.is_empty() {
        tracing::warn!("Texlist {} lists no materials", path.display());
    } else {
        tracing::info!("Loaded {} materials from {}", materials.len(), path.display());
    }
    Ok(Some(materials))
}

fn run_chunk(args: ChunkArgs, mut settings: Settings) -> anyhow::Result<()> {
    if args.local {
        settings.decode.world_space = false;
    }

    let header = ChunkHeader {
        section: args.section,
        offset: args.offset,
        block: args.block,
        world_coords: args.world,
        parent_coords: args.parent,
    };

    let mut cursor = open_image(&args.xbe)?;

    if args.header_only {
        let chunk = Chunk::decode_header_only(&mut cursor, &settings.sections, &header)
            .with_context(|| format!("Failed to decode {}", header.name()))?;
        tracing::info!(
            "{}: vertices at {:#x} (virtual {:#x}), triangles at {:#x} (virtual {:#x}), params {:?}",
            chunk.name,
            chunk.vertex_offset,
            chunk.block.vertex_data_offset,
            chunk.triangle_offset,
            chunk.block.triangle_data_offset,
            chunk.block.float_params
        );
        return Ok(());
    }

    let chunk = Chunk::decode(
        &mut cursor,
        &settings.sections,
        &header,
        &Translation,
        &settings.decode,
    )
    .with_context(|| format!("Failed to decode {}", header.name()))?;
    drop(cursor);

    let materials = load_materials(args.texlist.as_deref())?;
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("{}.obj", chunk.name)));

    tracing::info!("Writing {} to {}", chunk.name, output.display());
    let mut writer = ObjWriter::new(create_output(&output)?);
    writer.write_standalone(&chunk, materials.as_ref())?;
    writer.flush()?;

    if let Some(materials) = &materials {
        let mtl = write_material_library(&output, materials, &settings.texture_extension)?;
        tracing::info!("Wrote material library {}", mtl.display());
    }

    Ok(())
}

fn run_batch(args: BatchArgs, settings: Settings) -> anyhow::Result<()> {
    let manifest = Manifest::load(&args.manifest)?;
    let materials = load_materials(manifest.texlist.as_deref())?;

    let output = args.output.unwrap_or_else(|| {
        let stem = manifest
            .xbe
            .file_stem()
            .map_or_else(|| "chunks".to_string(), |s| s.to_string_lossy().into_owned());
        args.manifest.with_file_name(format!("{stem}.obj"))
    });

    tracing::info!(
        "Batch: {} chunks from {} into {}",
        manifest.chunks.len(),
        manifest.xbe.display(),
        output.display()
    );

    let mut cursor = open_image(&manifest.xbe)?;
    let mut writer = ObjWriter::new(create_output(&output)?);
    let report = write_batch(
        &mut cursor,
        &manifest.chunks,
        &settings,
        materials.as_ref(),
        &mut writer,
    )?;

    if let Some(materials) = &materials {
        write_material_library(&output, materials, &settings.texture_extension)?;
    }

    tracing::info!(
        "Batch complete: {} written, {} failed",
        report.written,
        report.failed.len()
    );

    if !report.is_success() {
        anyhow::bail!("{} of {} chunks failed", report.failed.len(), manifest.chunks.len());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(&cli.config)?;
    init_logging(&settings, cli.log_level);
    if settings.sections.is_empty() {
        tracing::warn!("No sections configured, addresses cannot be resolved");
    }

    match cli.command {
        Command::Chunk(args) => run_chunk(args, settings),
        Command::Batch(args) => run_batch(args, settings),
    }
}

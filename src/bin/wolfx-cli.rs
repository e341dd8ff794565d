//! wolfx-cli - Command-line interface for wolfx
//!
//! Expands chunks that have already been cut out of the game's data files.

use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Instant;
use wolfx::{
    carmack_bytes, huffman_bytes, pic, rlew_bytes, AssetSource, GameVersion, HuffmanTree, Word,
    DEFAULT_RLEW_TAG,
};

#[derive(Parser)]
#[command(name = "wolfx-cli")]
#[command(about = "A CLI tool for expanding Wolfenstein 3D map and graphics chunks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Carmack-expand a chunk into little-endian words
    Carmack {
        /// Input compressed chunk
        input: PathBuf,

        /// Output file
        output: PathBuf,

        /// Number of words to produce
        #[arg(short, long)]
        length: usize,

        /// Force overwrite of output file
        #[arg(short, long)]
        force: bool,
    },

    /// RLEW-expand a chunk of little-endian words
    Rlew {
        /// Input compressed chunk
        input: PathBuf,

        /// Output file
        output: PathBuf,

        /// Number of words to produce
        #[arg(short, long)]
        length: usize,

        /// RLEW tag (decimal or 0x-prefixed hex)
        #[arg(short, long, value_parser = parse_word, default_value_t = DEFAULT_RLEW_TAG)]
        tag: Word,

        /// Force overwrite of output file
        #[arg(short, long)]
        force: bool,
    },

    /// Huffman-expand a graphics chunk
    Huffman {
        /// Input compressed chunk
        input: PathBuf,

        /// Output file
        output: PathBuf,

        /// Huffman dictionary file (VGADICT)
        #[arg(short, long)]
        dict: PathBuf,

        /// Number of bytes to produce; read from the 4-byte chunk prefix if omitted
        #[arg(short, long)]
        length: Option<usize>,

        /// Force overwrite of output file
        #[arg(short, long)]
        force: bool,
    },

    /// Expand one stored map plane (Carmack then RLEW)
    MapPlane {
        /// Input plane chunk, starting at its length prefix
        input: PathBuf,

        /// Output file of width * height little-endian words
        output: PathBuf,

        /// Level width in tiles
        #[arg(long, default_value_t = 64)]
        width: u16,

        /// Level height in tiles
        #[arg(long, default_value_t = 64)]
        height: u16,

        /// RLEW tag from the map atlas (decimal or 0x-prefixed hex)
        #[arg(short, long, value_parser = parse_word, default_value_t = DEFAULT_RLEW_TAG)]
        tag: Word,

        /// Force overwrite of output file
        #[arg(short, long)]
        force: bool,
    },

    /// Print the picture-size table
    PicTable {
        /// Graphics chunk 0
        input: PathBuf,

        /// Huffman dictionary file (VGADICT)
        #[arg(short, long)]
        dict: PathBuf,

        /// Game version the files belong to
        #[arg(long, value_enum, default_value_t = CliGameVersion::Wl6)]
        game: CliGameVersion,
    },

    /// Decode a run of picture chunks
    Pictures {
        /// Picture chunks, in chunk order starting at --first
        inputs: Vec<PathBuf>,

        /// Huffman dictionary file (VGADICT)
        #[arg(short, long)]
        dict: PathBuf,

        /// Picture table chunk (graphics chunk 0)
        #[arg(short, long)]
        table: PathBuf,

        /// Directory to write the decoded pictures to
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Magic number of the first input; defaults to the version's first picture
        #[arg(long)]
        first: Option<u32>,

        /// Game version the files belong to
        #[arg(long, value_enum, default_value_t = CliGameVersion::Wl6)]
        game: CliGameVersion,

        /// Write row-major texels instead of the planar VGA layout
        #[arg(long)]
        linear: bool,

        /// Force overwrite of output files
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum CliGameVersion {
    /// Shareware (WL1)
    Wl1,
    /// Registered, three episodes (WL3)
    Wl3,
    /// Registered, six episodes (WL6) - Default
    Wl6,
}

impl From<CliGameVersion> for GameVersion {
    fn from(version: CliGameVersion) -> Self {
        match version {
            CliGameVersion::Wl1 => GameVersion::WL1,
            CliGameVersion::Wl3 => GameVersion::WL3,
            CliGameVersion::Wl6 => GameVersion::WL6,
        }
    }
}

/// Options shared by every subcommand
#[derive(Clone, Copy)]
struct Output {
    verbose: bool,
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    let out = Output {
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    let result = match cli.command {
        Commands::Carmack {
            input,
            output,
            length,
            force,
        } => carmack_file(&input, &output, length, force, out),
        Commands::Rlew {
            input,
            output,
            length,
            tag,
            force,
        } => rlew_file(&input, &output, length, tag, force, out),
        Commands::Huffman {
            input,
            output,
            dict,
            length,
            force,
        } => huffman_file(&input, &output, &dict, length, force, out),
        Commands::MapPlane {
            input,
            output,
            width,
            height,
            tag,
            force,
        } => map_plane_file(&input, &output, width, height, tag, force, out),
        Commands::PicTable { input, dict, game } => show_picture_table(&input, &dict, game.into()),
        Commands::Pictures {
            inputs,
            dict,
            table,
            output_dir,
            first,
            game,
            linear,
            force,
        } => extract_pictures(
            &PictureJob {
                inputs,
                dict,
                table,
                output_dir,
                first,
                version: game.into(),
                linear,
                force,
            },
            out,
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn parse_word(s: &str) -> Result<Word, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => Word::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid 16-bit value '{}': {}", s, e))
}

fn check_paths(
    input: &Path,
    output: &Path,
    force: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !input.exists() {
        return Err(format!("Input file '{}' does not exist", input.display()).into());
    }
    if output.exists() && !force {
        return Err(format!(
            "Output file '{}' already exists. Use --force to overwrite",
            output.display()
        )
        .into());
    }
    Ok(())
}

fn words_to_bytes(words: &[Word]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

fn load_tree(dict: &Path) -> Result<HuffmanTree, Box<dyn std::error::Error>> {
    if !dict.exists() {
        return Err(format!("Dictionary file '{}' does not exist", dict.display()).into());
    }
    Ok(HuffmanTree::from_reader(File::open(dict)?)?)
}

fn report(input_size: usize, output_size: usize, start_time: Instant, out: Output) {
    if !out.quiet {
        println!("✓ Expansion successful!");
        println!("  Input:  {} bytes", input_size);
        println!("  Output: {} bytes", output_size);
        println!("  Time:   {:.2?}", start_time.elapsed());
    }
}

fn carmack_file(
    input: &Path,
    output: &Path,
    length: usize,
    force: bool,
    out: Output,
) -> Result<(), Box<dyn std::error::Error>> {
    check_paths(input, output, force)?;
    if out.verbose {
        println!("Carmack-expanding '{}' to {} words", input.display(), length);
    }

    let start_time = Instant::now();
    let data = fs::read(input)?;
    let words = carmack_bytes(&data, length).map_err(|e| format!("Expansion failed: {}", e))?;
    let bytes = words_to_bytes(&words);
    fs::write(output, &bytes)?;

    report(data.len(), bytes.len(), start_time, out);
    Ok(())
}

fn rlew_file(
    input: &Path,
    output: &Path,
    length: usize,
    tag: Word,
    force: bool,
    out: Output,
) -> Result<(), Box<dyn std::error::Error>> {
    check_paths(input, output, force)?;
    if out.verbose {
        println!(
            "RLEW-expanding '{}' to {} words, tag {:#06x}",
            input.display(),
            length,
            tag
        );
    }

    let start_time = Instant::now();
    let data = fs::read(input)?;
    let words = rlew_bytes(&data, length, tag).map_err(|e| format!("Expansion failed: {}", e))?;
    let bytes = words_to_bytes(&words);
    fs::write(output, &bytes)?;

    report(data.len(), bytes.len(), start_time, out);
    Ok(())
}

fn huffman_file(
    input: &Path,
    output: &Path,
    dict: &Path,
    length: Option<usize>,
    force: bool,
    out: Output,
) -> Result<(), Box<dyn std::error::Error>> {
    check_paths(input, output, force)?;
    let tree = load_tree(dict)?;

    let start_time = Instant::now();
    let data = fs::read(input)?;
    let (length, payload) = match length {
        Some(length) => (length, &data[..]),
        None => pic::split_chunk(&data)?,
    };
    if out.verbose {
        println!("Huffman-expanding '{}' to {} bytes", input.display(), length);
    }

    let bytes =
        huffman_bytes(payload, length, &tree).map_err(|e| format!("Expansion failed: {}", e))?;
    fs::write(output, &bytes)?;

    report(data.len(), bytes.len(), start_time, out);
    Ok(())
}

fn map_plane_file(
    input: &Path,
    output: &Path,
    width: u16,
    height: u16,
    tag: Word,
    force: bool,
    out: Output,
) -> Result<(), Box<dyn std::error::Error>> {
    check_paths(input, output, force)?;
    if out.verbose {
        println!(
            "Expanding {}x{} map plane '{}', tag {:#06x}",
            width,
            height,
            input.display(),
            tag
        );
    }

    let start_time = Instant::now();
    let data = fs::read(input)?;
    let source = AssetSource::default().with_rlew_tag(tag);
    let plane = source
        .decompress_map_plane(&data, data.len(), width, height)
        .map_err(|e| format!("Map plane expansion failed: {}", e))?;
    let bytes = plane.to_le_bytes();
    fs::write(output, &bytes)?;

    report(data.len(), bytes.len(), start_time, out);
    Ok(())
}

fn load_source(
    dict: &Path,
    table: &Path,
    version: GameVersion,
) -> Result<AssetSource, Box<dyn std::error::Error>> {
    let mut source = AssetSource::new(version);
    source.set_huffman_tree(load_tree(dict)?);
    if !table.exists() {
        return Err(format!("Picture table '{}' does not exist", table.display()).into());
    }
    source
        .load_picture_table(&fs::read(table)?)
        .map_err(|e| format!("Could not decode picture table: {}", e))?;
    Ok(source)
}

fn show_picture_table(
    input: &Path,
    dict: &Path,
    version: GameVersion,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = load_source(dict, input, version)?;
    let table = source.picture_table().unwrap_or_default();

    println!("Picture table ({}):", version);
    for (index, size) in table.iter().enumerate() {
        println!(
            "  {:3}: {:4} x {:4}",
            version.pic_start() as usize + index,
            size.width,
            size.height
        );
    }
    Ok(())
}

struct PictureJob {
    inputs: Vec<PathBuf>,
    dict: PathBuf,
    table: PathBuf,
    output_dir: PathBuf,
    first: Option<u32>,
    version: GameVersion,
    linear: bool,
    force: bool,
}

fn extract_pictures(job: &PictureJob, out: Output) -> Result<(), Box<dyn std::error::Error>> {
    let source = load_source(&job.dict, &job.table, job.version)?;
    fs::create_dir_all(&job.output_dir)?;
    let first = job.first.unwrap_or(job.version.pic_start());

    if out.verbose {
        println!(
            "Decoding {} pictures from magic {} into '{}'",
            job.inputs.len(),
            first,
            job.output_dir.display()
        );
    }

    let start_time = Instant::now();
    let progress = if !out.quiet {
        let pb = ProgressBar::new(job.inputs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}",
                )?
                .progress_chars("#>-"),
        );
        pb.set_message("Decoding...");
        Some(pb)
    } else {
        None
    };

    let mut failed = Vec::new();
    let mut written = 0;
    for (magic, input) in (first..).zip(&job.inputs) {
        if let Err(e) = extract_picture(&source, magic, input, job) {
            eprintln!("Could not decode picture {}: {}", magic, e);
            failed.push(magic);
        } else {
            written += 1;
        }
        if let Some(ref pb) = progress {
            pb.inc(1);
        }
    }

    if let Some(ref pb) = progress {
        pb.finish_with_message("Decoding complete");
    }

    if !out.quiet {
        println!("  Written: {} pictures", written);
        println!("  Failed:  {} pictures", failed.len());
        println!("  Time:    {:.2?}", start_time.elapsed());
    }

    if !failed.is_empty() {
        return Err(format!("{} of {} pictures failed", failed.len(), job.inputs.len()).into());
    }
    Ok(())
}

fn extract_picture(
    source: &AssetSource,
    magic: u32,
    input: &Path,
    job: &PictureJob,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = job.output_dir.join(format!("pic{:03}.vga", magic));
    check_paths(input, &output, job.force)?;

    let mut picture = source.decompress_picture(magic, &fs::read(input)?)?;
    if job.linear {
        picture.texels = picture
            .to_linear()
            .ok_or_else(|| format!("{}x{} is not a planar size", picture.width, picture.height))?;
    }
    fs::write(output, picture.to_vga_bytes())?;
    Ok(())
}

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use argh::FromArgs;
use chrono::NaiveDateTime;
use colored::Colorize;
use vmufs::format::{validate_target_name, TIMESTAMP_FORMAT};
use vmufs::{FatChain, FormatOptions, Volume};

mod logger;

#[derive(FromArgs)]
/// Inspect and create VMU memory-card images.
struct Args {
    /// log debug output to stderr
    #[argh(switch, short = 'v')]
    verbose: bool,

    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Mkfs(MkfsArgs),
    Ls(LsArgs),
    Cat(CatArgs),
    Stat(StatArgs),
    Info(InfoArgs),
}

#[derive(FromArgs)]
/// Write a blank image in the current directory.
#[argh(subcommand, name = "mkfs")]
struct MkfsArgs {
    /// timestamp for the root block, "YYYY-MM-DD HH:MM:SS"
    #[argh(option)]
    timestamp: Option<String>,

    /// TOML file with a [format] section
    #[argh(option)]
    config: Option<PathBuf>,

    /// name of the image to create
    #[argh(positional)]
    name: String,
}

#[derive(FromArgs)]
/// List the files in an image.
#[argh(subcommand, name = "ls")]
struct LsArgs {
    /// image file
    #[argh(positional)]
    image: PathBuf,
}

#[derive(FromArgs)]
/// Write a file from an image to stdout.
#[argh(subcommand, name = "cat")]
struct CatArgs {
    /// image file
    #[argh(positional)]
    image: PathBuf,

    /// file name inside the image
    #[argh(positional)]
    name: String,
}

#[derive(FromArgs)]
/// Show the attributes of a file in an image.
#[argh(subcommand, name = "stat")]
struct StatArgs {
    /// image file
    #[argh(positional)]
    image: PathBuf,

    /// file name inside the image, or "/" for the root directory
    #[argh(positional)]
    name: String,
}

#[derive(FromArgs)]
/// Show the root block and free space of an image.
#[argh(subcommand, name = "info")]
struct InfoArgs {
    /// image file
    #[argh(positional)]
    image: PathBuf,
}

fn main() -> ExitCode {
    let args: Args = argh::from_env();
    logger::init(args.verbose);

    let result = match args.command {
        Command::Mkfs(args) => mkfs(args),
        Command::Ls(args) => ls(args),
        Command::Cat(args) => cat(args),
        Command::Stat(args) => stat(args),
        Command::Info(args) => info(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err}", "Error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn mkfs(args: MkfsArgs) -> Result<(), vmufs::Error> {
    validate_target_name(&args.name)?;

    let mut options = match &args.config {
        Some(config) => vmufs::load_options(config)?,
        None => FormatOptions::default(),
    };
    if let Some(timestamp) = &args.timestamp {
        let timestamp = NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT)
            .map_err(|e| vmufs::Error::InvalidArgument(format!("{timestamp}: {e}")))?;
        options.timestamp = Some(timestamp);
    }

    let target = PathBuf::from(&args.name);
    vmufs::create_with_options(&target, &options).map_err(|err| match err {
        vmufs::Error::AlreadyExists => {
            vmufs::Error::InvalidArgument(format!("{} already exists", args.name))
        }
        err => err,
    })?;

    println!("+ {} {}", "Created", args.name.green());
    Ok(())
}

fn ls(args: LsArgs) -> Result<(), vmufs::Error> {
    let snapshot = vmufs::load(&args.image)?;
    for (slot, name) in vmufs::list_occupied(&snapshot) {
        let attributes = vmufs::get_attributes(&snapshot, slot)?;
        let blocks = snapshot.chain(slot).map(FatChain::len).unwrap_or(0);
        let created = snapshot
            .entry(slot)
            .and_then(|entry| entry.created())
            .map(|timestamp| timestamp.format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{} {:>6} {:>3} {:19} {}",
            format!("{slot:3}").dimmed(),
            attributes.size,
            blocks,
            created,
            name
        );
    }
    println!(
        "{}",
        format!("{} blocks free", snapshot.free_blocks()).dimmed()
    );
    Ok(())
}

fn cat(args: CatArgs) -> Result<(), vmufs::Error> {
    let volume = Volume::new(args.image);
    let path = format!("/{}", args.name);
    let attributes = volume.get_attributes(&path)?;
    let data = volume.read(&path, attributes.size as usize, 0)?;
    std::io::stdout().lock().write_all(&data)?;
    Ok(())
}

fn stat(args: StatArgs) -> Result<(), vmufs::Error> {
    let volume = Volume::new(args.image);
    let path = if args.name == "/" {
        args.name.clone()
    } else {
        format!("/{}", args.name)
    };
    let attributes = volume.get_attributes(&path)?;
    println!("{}", args.name.bold());
    println!("  kind:  {:?}", attributes.kind);
    println!("  size:  {}", attributes.size);
    println!("  mode:  {:o}", attributes.permissions.bits());
    println!("  links: {}", attributes.nlink);
    Ok(())
}

fn info(args: InfoArgs) -> Result<(), vmufs::Error> {
    let root = vmufs::read_root(&args.image)?;
    let snapshot = vmufs::load(&args.image)?;

    let formatted = root
        .formatted_at()
        .map(|timestamp| timestamp.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| "unknown".to_string());
    println!("{}", args.image.display().to_string().bold());
    println!("  formatted:   {formatted}");
    println!("  fat block:   {} ({} blocks)", root.fat_block, root.fat_size);
    println!("  directory:   {} ({} blocks)", root.dir_block, root.dir_size);
    println!("  user blocks: {}", root.user_blocks);
    println!("  files:       {}", vmufs::list_occupied(&snapshot).count());
    println!("  free blocks: {}", snapshot.free_blocks());
    Ok(())
}

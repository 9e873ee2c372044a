use clap::{Args, CommandFactory, Parser, Subcommand};
use git_scribe::{Decoder, select_lines};
use log::LevelFilter;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "git-scribe", version)]
#[command(about = "Decode git porcelain output and stage selected lines of a patch")]
struct Cli {
    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Input {
    /// File holding the command output; standard input when omitted
    file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode `git status --porcelain -b`
    Status(Input),
    /// Decode `git diff --numstat`
    Numstat(Input),
    /// Decode `git log --decorate=full --pretty=fuller --parents --numstat`
    Log(Input),
    /// Decode `git config --list`
    Config(Input),
    /// Decode `git branch`
    Branches(Input),
    /// Decode `git tag`
    Tags(Input),
    /// Decode `git remote`
    Remotes(Input),
    /// Decode `git ls-remote`
    LsRemote(Input),
    /// Decode `git stash show --stat`
    StashShow(Input),
    /// Decode a `.gitmodules` file
    Submodules(Input),
    /// Keep only the selected modified lines of a unified diff
    Select {
        /// One flag per `+`/`-` line in diff order (e.g. 1,0,1)
        #[arg(long, value_delimiter = ',', value_parser = parse_flag)]
        lines: Vec<bool>,

        #[command(flatten)]
        input: Input,
    },
    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Print the man page
    Man,
}

impl Commands {
    fn decoder(&self) -> Option<(Decoder, &Input)> {
        let decoder = match self {
            Commands::Status(input) => (Decoder::Status, input),
            Commands::Numstat(input) => (Decoder::Numstat, input),
            Commands::Log(input) => (Decoder::Log, input),
            Commands::Config(input) => (Decoder::Config, input),
            Commands::Branches(input) => (Decoder::Branches, input),
            Commands::Tags(input) => (Decoder::Tags, input),
            Commands::Remotes(input) => (Decoder::Remotes, input),
            Commands::LsRemote(input) => (Decoder::LsRemote, input),
            Commands::StashShow(input) => (Decoder::StashShow, input),
            Commands::Submodules(input) => (Decoder::Submodules, input),
            Commands::Select { .. } | Commands::Completions { .. } | Commands::Man => return None,
        };
        Some(decoder)
    }
}

fn parse_flag(value: &str) -> Result<bool, String> {
    match value.trim() {
        "1" | "true" | "y" => Ok(true),
        "0" | "false" | "n" => Ok(false),
        other => Err(format!("expected 1 or 0, got '{other}'")),
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn read_input(file: Option<&Path>) -> io::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some((decoder, input)) = cli.command.decoder() {
        let text = read_input(input.file.as_deref())?;
        let records = decoder.decode(&text)?;
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(ExitCode::SUCCESS);
    }

    match cli.command {
        Commands::Select { lines, input } => {
            let diff = read_input(input.file.as_deref())?;
            let outcome = select_lines(lines, &diff)?;
            log::debug!(
                "selected {} lines ({} missing flags, {} unused)",
                outcome.selected_lines,
                outcome.missing_flags,
                outcome.unused_flags
            );
            let Some(patch) = outcome.patch else {
                eprintln!("no changes selected");
                return Ok(ExitCode::FAILURE);
            };
            io::stdout().write_all(patch.as_bytes())?;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut io::stdout());
        }
        Commands::Man => {
            clap_mangen::Man::new(Cli::command()).render(&mut io::stdout())?;
        }
        _ => {}
    }

    Ok(ExitCode::SUCCESS)
}

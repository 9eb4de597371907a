// Command-line interface for the patch pipeline.
//
// Subcommands mirror the pipeline stages: `decompress` and `apply` expose
// the two cores individually, `unpack` runs the full pack pipeline, and
// `info` prints envelope/patch metadata without touching any asset.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use crate::io::{self, ApplyStats, DecompressStats, IoError};
use crate::pack::{PACK_HEADER_LEN, PackHeader};
use crate::patch::PatchHeader;

/// Delta patch application and payload decompression.
#[derive(Parser, Debug)]
#[command(
    name = "airpatch",
    version,
    about = "Apply binary delta patches to assets",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Output stats as JSON to stdout.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Decompress a bzip2 payload file.
    Decompress {
        /// Compressed input file.
        input: PathBuf,
        /// Decompressed output file.
        output: PathBuf,
    },
    /// Apply a raw patch file to an original asset.
    Apply {
        /// Original asset file.
        original: PathBuf,
        /// Raw (decompressed) patch file.
        patch: PathBuf,
        /// Reconstructed output file.
        output: PathBuf,
    },
    /// Verify a pack envelope and apply its payload to an original asset.
    Unpack {
        /// Original asset file.
        original: PathBuf,
        /// Pack file (envelope + compressed payload).
        pack: PathBuf,
        /// Reconstructed output file.
        output: PathBuf,
    },
    /// Print envelope and patch metadata from a pack file.
    Info {
        /// Pack file to inspect.
        pack: PathBuf,
    },
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn refuse_overwrite(output: &Path, force: bool) -> Result<(), String> {
    if output.exists() && !force {
        return Err(format!(
            "output file {} exists; use --force to overwrite",
            output.display()
        ));
    }
    Ok(())
}

fn report_decompress(cli: &Cli, stats: &DecompressStats) {
    if cli.json_output {
        println!(
            "{}",
            serde_json::json!({
                "input_bytes": stats.input_size,
                "output_bytes": stats.output_size,
                "output_sha256": hex(&stats.output_sha256),
            })
        );
    } else if !cli.quiet {
        println!(
            "decompressed {} -> {} bytes (sha256 {})",
            stats.input_size,
            stats.output_size,
            hex(&stats.output_sha256)
        );
    }
}

fn report_apply(cli: &Cli, stats: &ApplyStats) {
    if cli.json_output {
        println!(
            "{}",
            serde_json::json!({
                "original_bytes": stats.original_size,
                "patch_bytes": stats.patch_size,
                "output_bytes": stats.output_size,
                "output_sha256": hex(&stats.output_sha256),
            })
        );
    } else if !cli.quiet {
        println!(
            "reconstructed {} bytes from {} original + {} patch (sha256 {})",
            stats.output_size,
            stats.original_size,
            stats.patch_size,
            hex(&stats.output_sha256)
        );
    }
}

fn cmd_info(cli: &Cli, pack_path: &Path) -> Result<(), String> {
    let pack = std::fs::read(pack_path).map_err(|e| e.to_string())?;
    let header = PackHeader::parse(&pack).map_err(|e| e.to_string())?;
    let verified = header.verify(&pack).is_ok();

    // The payload is a patch for incremental packs and a full asset for
    // bootstrap packs; report the patch header only when one is present.
    let patch_header = crate::decompress(&pack[PACK_HEADER_LEN..])
        .ok()
        .and_then(|raw| PatchHeader::parse(&raw).ok());

    if cli.json_output {
        println!(
            "{}",
            serde_json::json!({
                "pack_version": header.pack_version,
                "bundle_version": header.bundle_version,
                "checksum": hex(&header.checksum),
                "checksum_ok": verified,
                "payload_bytes": pack.len() - PACK_HEADER_LEN,
                "patch": patch_header.map(|h| serde_json::json!({
                    "ctrl_bytes": h.ctrl_len,
                    "diff_bytes": h.diff_len,
                    "target_bytes": h.new_size,
                })),
            })
        );
    } else {
        println!("pack version:    {}", header.pack_version);
        println!("bundle version:  {}", header.bundle_version);
        println!("checksum:        {}", hex(&header.checksum));
        println!("checksum ok:     {verified}");
        println!("payload bytes:   {}", pack.len() - PACK_HEADER_LEN);
        match patch_header {
            Some(h) => println!(
                "patch:           ctrl {} / diff {} / target {} bytes",
                h.ctrl_len, h.diff_len, h.new_size
            ),
            None => println!("patch:           payload is not a delta patch"),
        }
    }
    Ok(())
}

fn execute(cli: &Cli) -> Result<(), String> {
    let io_err = |e: IoError| e.to_string();
    match &cli.command {
        Cmd::Decompress { input, output } => {
            refuse_overwrite(output, cli.force)?;
            let stats = io::decompress_file(input, output).map_err(io_err)?;
            report_decompress(cli, &stats);
            Ok(())
        }
        Cmd::Apply {
            original,
            patch,
            output,
        } => {
            refuse_overwrite(output, cli.force)?;
            let stats = io::apply_file(original, patch, output).map_err(io_err)?;
            report_apply(cli, &stats);
            Ok(())
        }
        Cmd::Unpack {
            original,
            pack,
            output,
        } => {
            refuse_overwrite(output, cli.force)?;
            let stats = io::unpack_file(original, pack, output).map_err(io_err)?;
            report_apply(cli, &stats);
            Ok(())
        }
        Cmd::Info { pack } => cmd_info(cli, pack),
    }
}

/// CLI entry point.
pub fn run() -> ! {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = Cli::parse();
    match execute(&cli) {
        Ok(()) => process::exit(0),
        Err(msg) => {
            eprintln!("airpatch: {msg}");
            process::exit(1);
        }
    }
}

/// Fuzzing hook: parse arbitrary argument vectors without executing.
#[cfg(feature = "fuzzing")]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("airpatch".to_string())
        .chain(args.iter().cloned())
        .collect();
    let _ = Cli::try_parse_from(argv);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let argv: Vec<String> = std::iter::once("airpatch")
            .chain(args.iter().copied())
            .map(str::to_string)
            .collect();
        Cli::try_parse_from(argv).expect("parse failed")
    }

    #[test]
    fn decompress_args_map() {
        let cli = parse(&["decompress", "in.bz2", "out.raw"]);
        match cli.command {
            Cmd::Decompress { input, output } => {
                assert_eq!(input, PathBuf::from("in.bz2"));
                assert_eq!(output, PathBuf::from("out.raw"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn unpack_args_map() {
        let cli = parse(&["--force", "unpack", "old.bin", "patch.pack", "new.bin"]);
        assert!(cli.force);
        match cli.command {
            Cmd::Unpack {
                original,
                pack,
                output,
            } => {
                assert_eq!(original, PathBuf::from("old.bin"));
                assert_eq!(pack, PathBuf::from("patch.pack"));
                assert_eq!(output, PathBuf::from("new.bin"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = parse(&["info", "patch.pack", "--json"]);
        assert!(cli.json_output);
    }

    #[test]
    fn missing_args_are_rejected() {
        let argv = ["airpatch", "apply", "only-one"].map(str::to_string);
        assert!(Cli::try_parse_from(argv).is_err());
    }
}

fn main() {
    #[cfg(feature = "cli")]
    airpatch::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("airpatch: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}

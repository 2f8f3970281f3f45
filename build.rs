// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: package list file
fn file_arg() -> Arg {
    Arg::new("file")
        .short('f')
        .long("file")
        .value_name("FILE")
        .required(true)
        .help("File with one package name per line (Rcpp or r-rcpp)")
}

/// Common argument: dry run
fn dry_run_arg() -> Arg {
    Arg::new("dry_run")
        .long("dry-run")
        .action(ArgAction::SetTrue)
        .help("Show what would change without writing")
}

/// Common argument: live metadata
fn live_arg() -> Arg {
    Arg::new("live")
        .long("live")
        .action(ArgAction::SetTrue)
        .help("Fetch metadata from the mirrors instead of the database")
}

fn path_arg(name: &'static str, long: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(long)
        .value_name("PATH")
        .global(true)
        .help(help)
}

fn build_cli() -> Command {
    Command::new("bioarch-sync")
        .version(env!("CARGO_PKG_VERSION"))
        .author("BioArchLinux Project")
        .about("Keep R package PKGBUILDs in sync with CRAN and Bioconductor")
        .subcommand_required(true)
        .arg(path_arg("config", "config", "Configuration file"))
        .arg(path_arg("db_path", "db", "Path to the metadata database file").short('d'))
        .arg(path_arg("meta_path", "meta-path", "Path to the local metadata mirror").short('m'))
        .arg(path_arg("bioarch_path", "bioarch-path", "Root of the recipe tree").short('p'))
        .arg(
            Arg::new("bioc_min_ver")
                .long("bioc-min-ver")
                .value_name("VERSION")
                .global(true)
                .help("Oldest Bioconductor release to mirror and index"),
        )
        .arg(
            Arg::new("bioc_meta_mirror")
                .long("bioc-meta-mirror")
                .value_name("URL")
                .global(true)
                .help("Server publishing the Bioconductor release list"),
        )
        .arg(
            Arg::new("bioc_mirror")
                .long("bioc-mirror")
                .value_name("URL")
                .global(true)
                .help("Bioconductor mirror"),
        )
        .arg(
            Arg::new("cran_mirror")
                .long("cran-mirror")
                .value_name("URL")
                .global(true)
                .help("CRAN mirror"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Enable debug logging"),
        )
        .subcommand(
            Command::new("sync-meta")
                .about("Mirror CRAN and Bioconductor package indexes to the local metadata path"),
        )
        .subcommand(
            Command::new("build-db").about("Build the metadata database from the local mirror"),
        )
        .subcommand(
            Command::new("update-depends")
                .about("Update depends/optdepends of the packages listed in a file")
                .arg(file_arg())
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .default_value("added_depends.txt")
                        .help("Where to write newly required upstream packages"),
                )
                .arg(
                    Arg::new("auto_archive")
                        .long("auto-archive")
                        .action(ArgAction::SetTrue)
                        .help("Point packages no longer listed upstream at archived sources"),
                )
                .arg(
                    Arg::new("no_auto_unarchive")
                        .long("no-auto-unarchive")
                        .action(ArgAction::SetTrue)
                        .help("Keep CRAN archive urls even when the package is listed again"),
                )
                .arg(
                    Arg::new("jobs")
                        .short('j')
                        .long("jobs")
                        .help("Worker threads (0 = one per CPU)"),
                )
                .arg(dry_run_arg())
                .arg(live_arg()),
        )
        .subcommand(
            Command::new("archive")
                .about("Point the packages listed in a file at archived sources")
                .arg(file_arg())
                .arg(
                    Arg::new("bioc_ver")
                        .long("bioc-ver")
                        .default_value("3.15")
                        .help("Bioconductor release to pin sources to"),
                )
                .arg(dry_run_arg()),
        )
        .subcommand(
            Command::new("bump-pkgrel")
                .about("Bump pkgrel of the packages listed in a file")
                .arg(file_arg())
                .arg(dry_run_arg()),
        )
        .subcommand(
            Command::new("show")
                .about("Show upstream metadata and the reconciliation preview for one recipe")
                .arg(Arg::new("package").required(true).help("Package name (edgeR or r-edger)"))
                .arg(live_arg()),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completions")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "zsh", "fish", "powershell", "elvish"])
                        .help("Shell to generate completions for"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory - use CARGO_MANIFEST_DIR which is always set by cargo
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();
    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("bioarch-sync.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}

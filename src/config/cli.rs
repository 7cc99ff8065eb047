use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "immo-sheets-export")]
#[command(about = "Export property listings to a Google Sheets tab")]
pub struct CliArgs {
    /// Path to a TOML configuration file; built-in defaults are used without it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the table to a local CSV file instead of the spreadsheet
    #[arg(long, value_name = "PATH")]
    pub output_csv: Option<PathBuf>,

    /// Print the effective configuration (secret masked) and exit
    #[arg(long)]
    pub print_config: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit JSON log lines
    #[arg(long)]
    pub log_json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dry_run_flags() {
        let args = CliArgs::parse_from([
            "immo-sheets-export",
            "--config",
            "export.toml",
            "--output-csv",
            "out/biens.csv",
            "-v",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("export.toml")));
        assert_eq!(args.output_csv, Some(PathBuf::from("out/biens.csv")));
        assert!(args.verbose);
        assert!(!args.log_json);
        assert!(!args.print_config);
    }

    #[test]
    fn test_defaults_without_flags() {
        let args = CliArgs::parse_from(["immo-sheets-export"]);
        assert!(args.config.is_none());
        assert!(args.output_csv.is_none());
    }
}

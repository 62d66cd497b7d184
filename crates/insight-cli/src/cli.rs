use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "program-insight",
    about = "Program Insight: resolve program descriptors and their bundled packages",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Where descriptors are looked up and how templates expand.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Root directory for relative program and package paths
    #[arg(long)]
    pub root: Option<String>,

    /// Variable for lookup templates, as NAME=VALUE (repeatable)
    #[arg(long = "env", value_name = "NAME=VALUE", value_parser = parse_env_pair)]
    pub env: Vec<(String, String)>,

    /// Seed template variables from the process environment
    #[arg(long)]
    pub inherit_env: bool,

    /// Lookup template, replaces the default list (repeatable, base first)
    #[arg(long = "lookup", value_name = "TEMPLATE")]
    pub lookup: Vec<String>,

    /// TOML config file; flags override its values
    #[arg(long)]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a program directory and walk its packages
    Parse {
        /// Program directory
        program: String,

        #[command(flatten)]
        source: SourceArgs,

        /// Follow bundled dependencies of every package, not just the boot package
        #[arg(long)]
        include_packages: bool,

        /// Record missing packages as empty entries instead of warnings
        #[arg(long)]
        strict_packages: bool,

        /// Log the resolved program path
        #[arg(long)]
        debug: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Exit 1 when any descriptor recorded errors
        #[arg(long)]
        deny_errors: bool,
    },

    /// Load and normalize a single descriptor file
    Descriptor {
        /// Descriptor file
        file: String,

        /// Root directory for a relative file path
        #[arg(long)]
        root: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Exit 1 when the descriptor recorded errors
        #[arg(long)]
        deny_errors: bool,
    },

    /// Print the candidate descriptor paths for a program without reading them
    Lookup {
        /// Program directory
        program: String,

        #[command(flatten)]
        source: SourceArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    pub fn debug(&self) -> bool {
        matches!(self, Commands::Parse { debug: true, .. })
    }
}

fn parse_env_pair(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    if name.is_empty() {
        return Err(format!("missing variable name in '{raw}'"));
    }
    Ok((name.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_pairs_split_on_first_equals() {
        assert_eq!(
            parse_env_pair("PINF_MODE=dev"),
            Ok(("PINF_MODE".to_string(), "dev".to_string()))
        );
        assert_eq!(
            parse_env_pair("A=b=c"),
            Ok(("A".to_string(), "b=c".to_string()))
        );
        assert_eq!(parse_env_pair("EMPTY="), Ok(("EMPTY".to_string(), String::new())));
        assert!(parse_env_pair("novalue").is_err());
        assert!(parse_env_pair("=x").is_err());
    }

    #[test]
    fn parse_flags_map_onto_fields() {
        let cli = Cli::parse_from([
            "program-insight",
            "parse",
            "app",
            "--root",
            "/srv",
            "--env",
            "PINF_MODE=dev",
            "--lookup",
            "program.json",
            "--lookup",
            "program.${PINF_MODE}.json",
            "--include-packages",
            "--debug",
        ]);
        assert!(cli.command.debug());
        let Commands::Parse {
            program,
            source,
            include_packages,
            strict_packages,
            ..
        } = cli.command
        else {
            panic!("expected parse command");
        };
        assert_eq!(program, "app");
        assert_eq!(source.root.as_deref(), Some("/srv"));
        assert_eq!(source.env, vec![("PINF_MODE".to_string(), "dev".to_string())]);
        assert_eq!(source.lookup.len(), 2);
        assert!(include_packages);
        assert!(!strict_packages);
    }
}

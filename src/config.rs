use crate::{ContentPolicy, FilterRules, Layout, SplitOptions};
use clap::{crate_authors, crate_description, crate_name, crate_version};
use clap::{App, Arg};
use color_eyre::Result;
use eyre::eyre;
use eyre::WrapErr;
use json_comments::StripComments;
use serde::Deserialize;
use std::fs::File;
use std::io::Write;

use termcolor::ColorChoice;

use std::path::{Path, PathBuf};

/// Represents a unified configuration for a run of tweesplit.
///
/// Compiled from the configuration file and command-line arguments given
pub struct Config {
    /// The story file to split
    pub input: PathBuf,

    /// Root of the output directory tree. Only optional when printing the tree
    pub output: Option<PathBuf>,

    /// True if the project tree should be printed instead of written
    pub print_tree: bool,

    /// Filtering rules, on-disk layout, and stray content policy
    pub options: SplitOptions,

    /// List of allowed (ignored) warning names
    pub allowed: Vec<String>,

    /// List of denied (treated as errors) warning names
    pub denied: Vec<String>,

    /// Whether or not to use color output
    pub use_color: ColorChoice,

    /// If true, use compact output format
    pub compact: bool,

    /// Number of times `-v` was given
    pub verbosity: u64,
}

impl Config {
    /// Parses the [`CliConfig`], loads the [`ConfigFile`] it points to, and
    /// produces a unified `Config`
    ///
    /// [`CliConfig`]: struct.CliConfig.html
    /// [`ConfigFile`]: struct.ConfigFile.html
    pub fn build() -> Result<Self> {
        let cli_config = CliConfig::from_args();
        let config_file = ConfigFile::load(cli_config.config_file.as_deref())?;
        Config::layer(config_file, cli_config)
    }

    /// Creates a unified `Config` from the given [`ConfigFile`] and
    /// [`CliConfig`]. Command-line values take precedence, and allow/deny
    /// lists are combined
    ///
    /// [`CliConfig`]: struct.CliConfig.html
    /// [`ConfigFile`]: struct.ConfigFile.html
    pub fn layer(config_file: ConfigFile, cli_config: CliConfig) -> Result<Self> {
        let mut rules = config_file.rules;
        if let Some(namespace) = cli_config.namespace {
            rules.project_namespace = namespace;
        }
        if rules.project_namespace.is_empty() {
            let message = "project namespace must not be empty".to_string();
            return Err(crate::Error::Config(message).into());
        }
        if config_file.layout.includes_file.is_empty() {
            let message = "includes file name must not be empty".to_string();
            return Err(crate::Error::Config(message).into());
        }

        let policy = if cli_config.permissive || config_file.permissive {
            ContentPolicy::Permissive
        } else {
            ContentPolicy::Strict
        };

        if cli_config.output.is_none() && !cli_config.print_tree {
            return Err(eyre!("An output directory is required unless --tree is given"));
        }

        let mut allowed = cli_config.allowed;
        allowed.extend(config_file.allow);
        let mut denied = cli_config.denied;
        denied.extend(config_file.deny);

        Ok(Config {
            input: cli_config.input,
            output: cli_config.output,
            print_tree: cli_config.print_tree,
            options: SplitOptions {
                rules,
                layout: config_file.layout,
                policy,
            },
            allowed,
            denied,
            use_color: cli_config.use_color,
            compact: cli_config.compact,
            verbosity: cli_config.verbosity,
        })
    }
}

/// The configuration written on first run
pub const DEFAULT_CONFIG: &str = r#"// This file defines the configuration for tweesplit
// It is mostly standard JSON, but supports //, /**/, and # style comments.
{
  "rules": {
    // Namespace that project-level passages (StoryInit, widgets, ...) are
    // moved into
    "project_namespace": "stella"
    // "special_passages", "special_tags", "project_passages", and
    // "project_tags" can also be set here to replace the built-in lists
  },
  "layout": {
    // Second-level groups at least this deep get their own directory
    "submodule_height": 3,
    // Extension of passage content files
    "extension": "tw2",
    // Name of the manifest written to every directory
    "includes_file": "includes.txt"
  },
  // Drop content before the first passage instead of failing
  "permissive": false,
  // Warnings to ignore ("allow")
  "allow": [],
  // Warnings to treat as errors ("deny")
  "deny": []
}"#;

/// Settings parsed from the tweesplit config file
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub rules: FilterRules,

    #[serde(default)]
    pub layout: Layout,

    #[serde(default)]
    pub permissive: bool,

    #[serde(default)]
    pub allow: Vec<String>,

    #[serde(default)]
    pub deny: Vec<String>,
}

impl ConfigFile {
    /// Loads the config file
    ///
    /// An explicit path must exist. Otherwise the file in the user's config
    /// directory is used, and a default one is created there if it does not
    /// exist yet
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let config_path = dirs_next::config_dir()
                    .ok_or_else(|| eyre!("Error getting config directory"))?
                    .join("tweesplit/config.json");
                if !config_path.exists() {
                    ConfigFile::create_default(&config_path)?;
                }
                config_path
            }
        };

        let contents = std::fs::read_to_string(&config_path)
            .wrap_err_with(|| format!("Error reading config file: {:?}", config_path))?;
        let config_file = ConfigFile::parse(&contents)
            .wrap_err_with(|| format!("Error parsing config file: {:?}", config_path))?;
        tracing::debug!(?config_file, "loaded config");
        Ok(config_file)
    }

    /// Parses the contents of a config file
    pub fn parse(contents: &str) -> Result<Self> {
        // Strip the comments from the input (use `as_bytes()` to get a `Read`).
        let stripped = StripComments::new(contents.as_bytes());
        let config_file = serde_json::from_reader(stripped)?;
        Ok(config_file)
    }

    fn create_default(config_path: &Path) -> Result<()> {
        if let Some(prefix) = config_path.parent() {
            std::fs::create_dir_all(prefix)
                .wrap_err_with(|| format!("Error creating config directory: {:?}", prefix))?;
        }
        let mut config_file = File::create(config_path)?;
        config_file.write_all(DEFAULT_CONFIG.as_bytes())?;
        Ok(())
    }
}

/// The command line options supplied by the user
pub struct CliConfig {
    /// The story file to split
    pub input: PathBuf,

    /// The root of the output directory tree
    pub output: Option<PathBuf>,

    /// If true, print the project tree and exit
    pub print_tree: bool,

    /// Overrides the project namespace
    pub namespace: Option<String>,

    /// If true, drop content before the first passage instead of failing
    pub permissive: bool,

    /// An explicit config file to use
    pub config_file: Option<PathBuf>,

    /// List of allowed (ignored) warnings, by name
    pub allowed: Vec<String>,

    /// List of denied (treated as errors) warnings, by name
    pub denied: Vec<String>,

    /// Controls color output
    pub use_color: ColorChoice,

    /// If true, use compact warning and error output
    pub compact: bool,

    /// Logging verbosity
    pub verbosity: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            input: PathBuf::new(),
            output: None,
            print_tree: false,
            namespace: None,
            permissive: false,
            config_file: None,
            allowed: Vec::new(),
            denied: Vec::new(),
            use_color: ColorChoice::Never,
            compact: false,
            verbosity: 0,
        }
    }
}

impl CliConfig {
    /// Parses the command line arguments
    #[allow(unknown_lints, dangerous_implicit_autorefs)]
    pub fn from_args() -> Self {
        #[allow(deprecated)]
        let m = App::new(crate_name!())
            .about(crate_description!())
            .author(crate_authors!("\n"))
            .version(crate_version!())
            .arg(
                Arg::with_name("allow")
                    .help("Specifies warnings to ignore. Overrides deny.")
                    .short("a")
                    .long("allow")
                    .takes_value(true)
                    .multiple(true),
            )
            .arg(
                Arg::with_name("color")
                    .help("Turns on colored output")
                    .long("color")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("compact")
                    .help("Turns on compact error and warning output")
                    .long("compact"),
            )
            .arg(
                Arg::with_name("config")
                    .help("Uses the given config file instead of the default one")
                    .short("c")
                    .long("config")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("deny")
                    .help("Specifies warnings to treat as errors")
                    .short("D")
                    .long("deny")
                    .takes_value(true)
                    .multiple(true),
            )
            .arg(
                Arg::with_name("namespace")
                    .help("Sets the namespace that project-level passages are moved into")
                    .short("n")
                    .long("namespace")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("permissive")
                    .help("Drops content before the first passage instead of failing")
                    .long("permissive"),
            )
            .arg(
                Arg::with_name("tree")
                    .help("Prints the project tree without writing anything")
                    .short("t")
                    .long("tree"),
            )
            .arg(
                Arg::with_name("verbose")
                    .help("Logs more detail to stderr (repeat for more)")
                    .short("v")
                    .multiple(true),
            )
            .arg(
                Arg::with_name("INPUT")
                    .help("Sets the Twee 2 story file to split")
                    .required(true)
                    .index(1),
            )
            .arg(
                Arg::with_name("OUTPUT")
                    .help("Sets the root of the output directory tree")
                    .required_unless("tree")
                    .index(2),
            )
            .get_matches();

        let input = m.value_of("INPUT").map(PathBuf::from).unwrap_or_default();
        let output = m.value_of("OUTPUT").map(PathBuf::from);
        let print_tree = m.is_present("tree");
        let namespace = m.value_of("namespace").map(|s| s.to_string());
        let permissive = m.is_present("permissive");
        let config_file = m.value_of("config").map(PathBuf::from);
        let allowed = m
            .values_of("allow")
            .unwrap_or_default()
            .map(|s| s.to_string())
            .collect();
        let denied = m
            .values_of("deny")
            .unwrap_or_default()
            .map(|s| s.to_string())
            .collect();
        let use_color = match m.value_of("color").unwrap_or("auto") {
            "always" => ColorChoice::Always,
            "ansi" => ColorChoice::AlwaysAnsi,
            "auto" => {
                if atty::is(atty::Stream::Stdout) {
                    ColorChoice::Auto
                } else {
                    ColorChoice::Never
                }
            }
            _ => ColorChoice::Never,
        };
        let compact = m.is_present("compact");
        let verbosity = m.occurrences_of("verbose");

        CliConfig {
            input,
            output,
            print_tree,
            namespace,
            permissive,
            config_file,
            allowed,
            denied,
            use_color,
            compact,
            verbosity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli() -> CliConfig {
        CliConfig {
            input: "story.tw2".into(),
            output: Some("out".into()),
            ..CliConfig::default()
        }
    }

    #[test]
    fn default_config_parses_to_defaults() {
        let config_file = ConfigFile::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(config_file.rules.project_namespace, "stella");
        assert_eq!(
            config_file.rules.special_tags,
            FilterRules::default().special_tags
        );
        assert_eq!(config_file.layout, Layout::default());
        assert!(!config_file.permissive);
        assert!(config_file.allow.is_empty());
    }

    #[test]
    fn empty_config_is_default() {
        let config_file = ConfigFile::parse("{}").unwrap();
        assert_eq!(config_file.layout, Layout::default());
        assert_eq!(config_file.rules.project_namespace, "stella");
    }

    #[test]
    fn partial_layout() {
        let config_file = ConfigFile::parse(
            r#"{
              # hash comments work too
              "layout": { "submodule_height": 2 }
            }"#,
        )
        .unwrap();
        assert_eq!(config_file.layout.submodule_height, 2);
        assert_eq!(config_file.layout.extension, "tw2");
    }

    #[test]
    fn cli_overrides_file() {
        let config_file = ConfigFile::parse(
            r#"{ "rules": { "project_namespace": "file" }, "allow": ["StrayContent"] }"#,
        )
        .unwrap();
        let cli_config = CliConfig {
            namespace: Some("cli".to_string()),
            permissive: true,
            allowed: vec!["DuplicatePassage".to_string()],
            ..cli()
        };
        let config = Config::layer(config_file, cli_config).unwrap();
        assert_eq!(config.options.rules.project_namespace, "cli");
        assert_eq!(config.options.policy, ContentPolicy::Permissive);
        assert_eq!(config.allowed, vec!["DuplicatePassage", "StrayContent"]);
    }

    #[test]
    fn strict_by_default() {
        let config = Config::layer(ConfigFile::default(), cli()).unwrap();
        assert_eq!(config.options.policy, ContentPolicy::Strict);
        assert_eq!(config.options.rules.project_namespace, "stella");
    }

    #[test]
    fn rejects_empty_namespace() {
        let cli_config = CliConfig {
            namespace: Some(String::new()),
            ..cli()
        };
        assert!(Config::layer(ConfigFile::default(), cli_config).is_err());
    }

    #[test]
    fn output_required_unless_printing() {
        let cli_config = CliConfig {
            output: None,
            ..cli()
        };
        assert!(Config::layer(ConfigFile::default(), cli_config).is_err());

        let cli_config = CliConfig {
            output: None,
            print_tree: true,
            ..cli()
        };
        assert!(Config::layer(ConfigFile::default(), cli_config).is_ok());
    }

    #[test]
    fn explicit_config_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(ConfigFile::load(Some(missing.as_path())).is_err());

        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "permissive": true }"#).unwrap();
        assert!(ConfigFile::load(Some(path.as_path())).unwrap().permissive);
    }
}

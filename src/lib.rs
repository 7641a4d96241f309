//! Tweesplit splits a monolithic Twee 2 story file into a structured project
//!
//! Passage names are read as dotted paths. The first segment of a name picks
//! a module directory, second-level groups with deep enough subtrees become
//! submodule directories, and everything else is collected into `.tw2` files.
//! Every directory gets an `includes.txt` manifest listing its child
//! directories and files, for use by a Twee 2 build.
//!
//! The pipeline runs in stages:
//! - [`parser`] assembles passages from lines
//! - [`filter`] orders them, drops special passages, and moves project-level
//!   passages into the project namespace
//! - [`project`] builds and classifies the namespace tree
//! - [`reconstruct`] plans and performs the filesystem writes
//!
//! [`parser`]: parser/index.html
//! [`filter`]: filter/index.html
//! [`project`]: project/index.html
//! [`reconstruct`]: reconstruct/index.html

mod config;
pub use config::CliConfig;
pub use config::Config;
pub use config::ConfigFile;

mod error;
pub use error::Error;
pub use error::Result;

pub mod issue;
pub use issue::Issue;

pub mod passage;
pub use passage::Header;
pub use passage::Passage;

pub mod parser;
pub use parser::ContentPolicy;

pub mod filter;
pub use filter::FilterRules;
pub use filter::PassageMap;

pub mod project;
pub use project::Layout;
pub use project::ProjectTree;

pub mod reconstruct;

mod split;
pub use split::split_file;
pub use split::split_lines;
pub use split::Split;
pub use split::SplitOptions;

pub mod utils;

pub mod report;

pub mod run;

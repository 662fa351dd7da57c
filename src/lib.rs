//! Obsidian vault to Hugo content converter.

mod config;
mod images;
mod markdown;
mod pipeline;
mod process;
mod vault;
mod watch;

pub use config::{Config, NetlifyConfig, Secret, VercelConfig};
pub use markdown::{LinkResolver, MarkupRewriter, Resolution};
pub use pipeline::{convert_all, convert_one};
pub use process::{run, write_vercel_project};
pub use vault::{PageIndex, VAULT_CONFIG_DIR, page_key};
pub use watch::VaultWatcher;

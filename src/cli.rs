//! Command-line interface / 命令行参数
//!
//! Flags override values from the configuration file.

use clap::Parser;
use std::path::PathBuf;

use crate::config::AppConfig;

/// Full-text index and search server for HTML files and static sites
#[derive(Parser, Debug, Default)]
#[command(name = "fts5-index")]
#[command(about = "Index HTML files or a static site into SQLite FTS5 and serve a search page", long_about = None)]
#[command(version)]
pub struct Cli {
    /// JSON configuration file
    #[arg(short, long, env = "FTS5_INDEX_CONFIG")]
    pub config: Option<PathBuf>,

    /// SQLite index database
    #[arg(long, env = "FTS5_INDEX_DB")]
    pub db: Option<PathBuf>,

    /// Listen address, `host:port` or `:port`
    #[arg(long)]
    pub listen: Option<String>,

    /// Search page template (implies --serve)
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Index HTML files under --root
    #[arg(long)]
    pub html: bool,

    /// Index the static site content under --root
    #[arg(long)]
    pub site: bool,

    /// Directory to index
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Override the site's baseURL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Start the web server
    #[arg(long)]
    pub serve: bool,

    /// Drop the existing index and reindex every document
    #[arg(long)]
    pub rebuild: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Apply flags on top of the loaded configuration / 用命令行参数覆盖配置
    pub fn apply_to(&self, config: &mut AppConfig) -> Result<(), String> {
        if let Some(db) = &self.db {
            config.database.db_file = db.clone();
        }
        if let Some(listen) = &self.listen {
            let (host, port) = parse_listen(listen)?;
            if let Some(host) = host {
                config.server.host = host;
            }
            config.server.port = port;
        }
        if let Some(template) = &self.template {
            config.web.template = Some(template.clone());
        }
        if let Some(root) = &self.root {
            config.index.root = root.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.index.base_url = Some(base_url.clone());
        }
        config.index.html |= self.html;
        config.index.site |= self.site;
        config.web.serve |= self.serve;
        config.verbose |= self.verbose;
        Ok(())
    }
}

/// `host:port`, `:port` (all interfaces) or a bare port / 解析监听地址
fn parse_listen(listen: &str) -> Result<(Option<String>, u16), String> {
    let (host, port) = match listen.rsplit_once(':') {
        Some((host, port)) => (host, port),
        None => ("", listen),
    };
    let port = port
        .parse::<u16>()
        .map_err(|_| format!("Invalid listen address {:?}", listen))?;

    let host = if host.is_empty() {
        if listen.contains(':') {
            Some("0.0.0.0".to_string())
        } else {
            None
        }
    } else {
        Some(host.trim_start_matches('[').trim_end_matches(']').to_string())
    };
    Ok((host, port))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("fts5-index").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_flags() {
        let cli = parse(&["--html", "--root", "public", "--db", "idx.db", "-v", "--rebuild"]);
        assert!(cli.html);
        assert!(cli.rebuild);
        assert!(!cli.site);
        assert_eq!(cli.root, Some(PathBuf::from("public")));
        assert_eq!(cli.db, Some(PathBuf::from("idx.db")));
        assert!(cli.verbose);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["fts5-index", "--verbose", "--quiet"]).is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = AppConfig::default();
        config.index.batch_size = 50;

        let cli = parse(&["--site", "--listen", "127.0.0.1:9000", "--template", "t.html", "--base-url", "/"]);
        cli.apply_to(&mut config).unwrap();

        assert!(config.index.site);
        assert_eq!(config.get_bind_address(), "127.0.0.1:9000");
        assert_eq!(config.web.template, Some(PathBuf::from("t.html")));
        assert_eq!(config.index.base_url.as_deref(), Some("/"));
        assert_eq!(config.index.batch_size, 50);
        assert!(config.should_serve());
        assert!(config.should_index());
    }

    #[test]
    fn test_flags_do_not_clear_config() {
        let mut config = AppConfig::default();
        config.index.html = true;
        config.web.serve = true;
        Cli::default().apply_to(&mut config).unwrap();
        assert!(config.index.html);
        assert!(config.web.serve);
    }

    #[test]
    fn test_parse_listen() {
        assert_eq!(parse_listen(":8086").unwrap(), (Some("0.0.0.0".to_string()), 8086));
        assert_eq!(parse_listen("localhost:80").unwrap(), (Some("localhost".to_string()), 80));
        assert_eq!(parse_listen("[::1]:8080").unwrap(), (Some("::1".to_string()), 8080));
        assert_eq!(parse_listen("9000").unwrap(), (None, 9000));
        assert!(parse_listen("localhost").is_err());
        assert!(parse_listen(":99999").is_err());
    }
}

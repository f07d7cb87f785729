//! Use this to see what the pipeline makes of a file or folder.
//!
//! `cargo run --example extract -- <path> [config.toml]`
//!
//! With no path, it looks at your pictures folder (or home folder).

use camino::Utf8PathBuf;
use tracing::Level;

use metascan::{select, Config, Extractor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::fmt()
        .with_max_level(Level::DEBUG)
        .init();

    let mut args = std::env::args().skip(1);
    let root = match args.next() {
        Some(path) => Utf8PathBuf::from(path),
        None => dirs::picture_dir()
            .or_else(dirs::home_dir)
            .and_then(|p| Utf8PathBuf::from_path_buf(p).ok())
            .ok_or_else(|| anyhow::anyhow!("no path given, and no pictures folder found"))?,
    };

    let config = match args.next() {
        Some(conf_path) => Config::from_disk(&Utf8PathBuf::from(conf_path)).await?,
        None => Config::default(),
    };

    // same check a file picker would do before handing the path over
    let selection = select::validate(&root, &config).await?;

    let extraction = Extractor::new(config).extract(selection.root()).await?;
    for skipped in extraction.skipped() {
        println!(
            "skipped {}: {}",
            skipped.path.as_deref().unwrap_or("<unknown>"),
            skipped.reason
        );
    }

    let results = extraction.into_result_set();
    println!("{:<32} {:>12} {:>12} {:>6} {:>14}", "Name", "Res", "DPI", "Depth", "Compression");
    for row in results.summary_rows() {
        let col = |c: &Option<String>| c.clone().unwrap_or_else(|| "-".into());
        println!(
            "{:<32} {:>12} {:>12} {:>6} {:>14}",
            col(&row.name),
            col(&row.size),
            col(&row.dpi),
            col(&row.depth),
            col(&row.compression),
        );
    }

    Ok(())
}

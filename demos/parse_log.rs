// Example usage of the run parser and directive extractor

use labnote::{extract_directives, LogStore, Result};
use tracing::{debug, info, Level};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .init();

    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "data/bench.log".to_string());
    let format = args.next().unwrap_or_else(|| "putty".to_string());

    // Locate runs; nothing is parsed yet
    let mut store = LogStore::open(&path, &format)?;
    info!("{} runs in {}", store.run_count(), path);

    if !store.header().is_empty() {
        info!("Header:\n{}", store.header());
    }

    for index in 0..store.run_count() {
        let run = store.get(index)?;
        let range = store.ranges()[index];
        info!(
            "[{}] bytes {}..{}  date={:?} start={:?}",
            index, range.start, range.end, run.date, run.start_time
        );
        if let Some(started) = run.started_at() {
            debug!("      started at {}", started);
        }

        for column in &run.data.named {
            let finite = column.values.iter().filter(|v| v.is_finite()).count();
            info!(
                "      {}: {} samples ({} missing)",
                column.name,
                column.values.len(),
                column.values.len() - finite
            );
        }
        let extra: usize = run.data.unnamed.iter().map(Vec::len).sum();
        if extra > 0 {
            info!("      {} unnamed samples", extra);
        }

        // Directives in this run's notes, defaulting to this run
        let found = extract_directives(&run.notes, &[index])?;
        for request in &found.requests {
            info!(
                "      plot {:?}: x={} y={:?}",
                request.artifact,
                request.x.name,
                request.y.iter().map(|y| (&y.name, &y.runs)).collect::<Vec<_>>()
            );
        }
    }

    Ok(())
}

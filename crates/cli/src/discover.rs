use crate::cache::EntryRow;
use classcope_api::{ContextRef, MatchMode};
use classcope_core::{ClasspathDiscovery, DiscoveryOptions};
use tabled::Table;

pub fn run(
    context: ContextRef,
    required: &[String],
    mode: MatchMode,
    options: &DiscoveryOptions,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let discovery = ClasspathDiscovery::new(options);

    // Nothing required: show every candidate and where it came from
    if required.is_empty() {
        let candidates = discovery.candidates(&context)?;
        if json {
            println!("{}", serde_json::to_string_pretty(&candidates)?);
        } else if candidates.is_empty() {
            println!("No candidates found.");
        } else {
            let rows: Vec<EntryRow> = candidates.iter().map(EntryRow::from).collect();
            println!("{}", Table::new(rows));
        }
        return Ok(());
    }

    let classpath = discovery
        .discover(&context, required, mode)?
        .ok_or_else(|| format!("No classpath satisfies [{}]", required.join(", ")))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&classpath)?);
    } else {
        for path in &classpath {
            println!("{}", path.display());
        }
    }
    Ok(())
}

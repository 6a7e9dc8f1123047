use classcope_api::ContextRef;
use classcope_core::resolver::catalog;
use classcope_core::{DiscoveryOptions, KnownLibraryResolver, Properties};
use std::path::PathBuf;

pub fn run(
    target: &str,
    properties: Properties,
    options: DiscoveryOptions,
    context: Option<ContextRef>,
    marker_home: Option<ContextRef>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut resolver = KnownLibraryResolver::with_options(properties, options);
    if let Some(context) = context {
        resolver = resolver.with_ambient_context(context);
    }
    if let Some(home) = marker_home {
        resolver = resolver.with_marker_home(home);
    }

    let classpath = match target {
        "compiler-classpath" => resolver.compiler_classpath()?,
        "script-classpath" => resolver.script_classpath()?,
        id => {
            let library = catalog::by_id(id).ok_or_else(|| {
                let known: Vec<&str> = catalog::ALL.iter().map(|l| l.id).collect();
                format!("Unknown library '{}', expected one of: {}", id, known.join(", "))
            })?;
            let found = resolver.require(&library)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&found)?);
            } else {
                println!("{} ({})", found.path.display(), found.origin);
            }
            return Ok(());
        }
    };

    print_paths(&classpath, json)
}

fn print_paths(paths: &[PathBuf], json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(paths)?);
    } else {
        for path in paths {
            println!("{}", path.display());
        }
    }
    Ok(())
}

//! Example: Load and display site definitions from the site-definitions directory.

use lookout_sites::{HttpMethod, SiteLoader, SiteRegistry};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading site definitions from site-definitions/...\n");

    let loader = match SiteLoader::with_default_dir() {
        Ok(loader) => loader,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("\nMake sure you're running this from the workspace root!");
            return Err(Box::new(e));
        }
    };

    let registry = SiteRegistry::load_from(&loader)?;
    println!("Loaded {} site definitions:\n", registry.count());

    for def in registry.get_all() {
        let method = match def.request.method {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        };

        println!("  {} ({})", def.name(), def.site.domain);
        println!("    Check: {}", def.site.method);
        println!("    Request: {method} {}", def.request.url);
        if let Some(pointer) = &def.response.exists_json_pointer {
            println!("    Exists when {pointer} is present");
        }
        if def.site.frequent_rate_limit {
            println!("    Frequently rate limited");
        }
        println!();
    }

    Ok(())
}

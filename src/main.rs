//! Site Composer CLI
//!
//! Usage:
//!   site-composer [OPTIONS] [TEMPLATE]
//!
//! Options:
//!   -c, --config <FILE>    Composer manifest (TOML, default composer.toml)
//!   -C, --context <JSON>   Extra context as a JSON object
//!   -p, --parts <NAME>     Aggregate the named part across all components
//!       --component <NAME> Render through the named component's resolver
//!   -h, --help             Print help

use std::path::PathBuf;
use std::process;

use clap::Parser;

use site_composer::{compose_from_config, Context, RequestScope};

#[derive(Parser)]
#[command(name = "site-composer")]
#[command(about = "Compose templated pages from component-owned template trees")]
struct Cli {
    /// Template to render through the application-wide resolver
    template: Option<String>,

    /// Composer manifest (TOML)
    #[arg(short, long, default_value = "composer.toml")]
    config: PathBuf,

    /// Extra context as a JSON object, e.g. '{"title": "Home"}'
    #[arg(short = 'C', long)]
    context: Option<String>,

    /// Aggregate the named part across all components instead of rendering
    /// a template
    #[arg(short, long)]
    parts: Option<String>,

    /// Render through the named component's resolver (component templates
    /// shadow application-wide ones)
    #[arg(long)]
    component: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let composer = match compose_from_config(&cli.config) {
        Ok(composer) => composer,
        Err(e) => {
            eprintln!("Error loading config '{}': {}", cli.config.display(), e);
            process::exit(1);
        }
    };

    let context = match parse_context(cli.context.as_deref()) {
        Ok(context) => context,
        Err(e) => {
            eprintln!("Error parsing context: {}", e);
            process::exit(1);
        }
    };

    if let Some(part) = &cli.parts {
        let mut scope = RequestScope::new();
        match composer.aggregate_parts(&mut scope, part) {
            Ok(parts) => {
                for part in parts {
                    println!("{}", part);
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    let Some(template) = &cli.template else {
        eprintln!("Nothing to do: pass a template name or --parts <NAME>");
        process::exit(2);
    };

    let result = match &cli.component {
        Some(name) => match composer.component(name) {
            Some(component) => component.render_template(template, &context),
            None => {
                eprintln!("Error: no component named '{}'", name);
                process::exit(1);
            }
        },
        None => composer.render_template(template, &context),
    };

    match result {
        Ok(html) => println!("{}", html),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn parse_context(raw: Option<&str>) -> Result<Context, String> {
    let Some(raw) = raw else {
        return Ok(Context::new());
    };
    let value: serde_json::Value = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    let serde_json::Value::Object(map) = value else {
        return Err("context must be a JSON object".to_string());
    };
    Ok(map.into_iter().collect())
}
